//! IPC Server for daemon
//!
//! Listens on Unix socket and handles client requests.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{watch, Semaphore};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::protocol::*;
use crate::config::AppConfig;
use crate::device::Device;
use crate::features::HapticFeedback;
use crate::Result;

/// Maximum number of requests processed at the same time
const MAX_CONCURRENT_REQUESTS: usize = 10;

struct ServerState {
    device: Arc<Device>,
    start_time: Instant,
    started_at: DateTime<Utc>,
}

/// IPC Server that handles client connections
pub struct DaemonServer {
    state: Arc<ServerState>,
    socket_path: PathBuf,
    /// Semaphore to limit concurrent request processing
    request_semaphore: Arc<Semaphore>,
}

impl DaemonServer {
    pub fn new(device: Arc<Device>, config: &AppConfig) -> Self {
        Self {
            state: Arc::new(ServerState {
                device,
                start_time: Instant::now(),
                started_at: Utc::now(),
            }),
            socket_path: config.socket_path(),
            request_semaphore: Arc::new(Semaphore::new(MAX_CONCURRENT_REQUESTS)),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Run the IPC server until `shutdown_rx` flips to true
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> Result<()> {
        // Remove old socket file if exists
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)?;
        }

        // Ensure parent directory exists
        if let Some(parent) = self.socket_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let listener = UnixListener::bind(&self.socket_path)?;
        info!("IPC server listening on: {}", self.socket_path.display());

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, _)) => {
                            let state = self.state.clone();
                            let semaphore = self.request_semaphore.clone();
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, state, semaphore).await {
                                    warn!("Error handling connection: {}", e);
                                }
                            });
                        }
                        Err(e) => {
                            error!("Failed to accept connection: {}", e);
                        }
                    }
                }
                result = shutdown_rx.changed() => {
                    if result.is_err() || *shutdown_rx.borrow() {
                        info!("IPC server shutting down");
                        break;
                    }
                }
            }
        }

        // Cleanup socket file
        if let Err(e) = std::fs::remove_file(&self.socket_path) {
            debug!("Failed to remove socket file: {}", e);
        }
        Ok(())
    }
}

async fn handle_connection(
    stream: UnixStream,
    state: Arc<ServerState>,
    semaphore: Arc<Semaphore>,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            break; // Connection closed
        }

        let _permit = semaphore.acquire().await.map_err(|e| {
            crate::Error::Ipc(format!("Failed to acquire semaphore: {}", e))
        })?;

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => {
                debug!("Received request: {} (id: {})", request.method, request.id);
                handle_request(request, &state).await
            }
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                Response::error(Uuid::nil(), ERR_PARSE, format!("Parse error: {}", e))
            }
        };

        let response_json = serde_json::to_string(&response)?;
        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    Ok(())
}

fn parse_params<T: DeserializeOwned>(
    id: Uuid,
    params: serde_json::Value,
) -> std::result::Result<T, Response> {
    serde_json::from_value(params).map_err(|e| Response::error(id, ERR_INVALID_PARAMS, e.to_string()))
}

fn haptic(id: Uuid, state: &ServerState) -> std::result::Result<&HapticFeedback, Response> {
    state.device.haptic().map(|haptic| haptic.as_ref()).ok_or_else(|| {
        Response::error(
            id,
            ERR_FEATURE_UNAVAILABLE,
            "Haptic feedback is not supported by this device",
        )
    })
}

/// Turn a setter outcome into the response sent back to the client
fn applied(id: Uuid, result: Result<()>) -> Response {
    match result {
        Ok(()) => Response::ok(id),
        Err(e) => Response::error(id, ERR_INTERNAL, e.to_string()),
    }
}

async fn handle_request(request: Request, state: &ServerState) -> Response {
    let id = request.id;

    if request.method.is_empty() {
        return Response::error(id, ERR_INVALID_REQUEST, "Missing method");
    }

    let outcome = match request.method.as_str() {
        methods::PING => Ok(Response::success(id, serde_json::json!({"ok": true}))),

        methods::STATUS => Ok(Response::success(
            id,
            serde_json::json!({
                "running": true,
                "uptime_secs": state.start_time.elapsed().as_secs(),
                "started_at": state.started_at,
                "device": state.device.name(),
                "features": state.device.feature_names(),
            }),
        )),

        methods::SCROLL_GET => {
            let scroll = state.device.scroll();
            Ok(Response::success(
                id,
                serde_json::json!({
                    "interval": scroll.interval_ms(),
                    "steps": scroll.steps(),
                }),
            ))
        }

        methods::SCROLL_SET_INTERVAL => {
            parse_params::<ScrollIntervalParams>(id, request.params).map(|params| {
                state.device.scroll().set_interval_ms(params.interval);
                Response::ok(id)
            })
        }

        methods::SCROLL_SET_STEPS => {
            parse_params::<ScrollStepsParams>(id, request.params).map(|params| {
                state.device.scroll().set_steps(params.steps);
                Response::ok(id)
            })
        }

        methods::HAPTIC_GET => haptic(id, state).map(|haptic| {
            Response::success(
                id,
                serde_json::json!({
                    "enabled": haptic.enabled(),
                    "strength": haptic.strength(),
                    "battery_saving": haptic.battery_saving(),
                }),
            )
        }),

        methods::HAPTIC_SET_ENABLED => {
            match (haptic(id, state), parse_params::<HapticEnabledParams>(id, request.params)) {
                (Ok(haptic), Ok(params)) => Ok(applied(id, haptic.set_enabled(params.enabled).await)),
                (Err(resp), _) | (_, Err(resp)) => Err(resp),
            }
        }

        methods::HAPTIC_SET_STRENGTH => {
            match (haptic(id, state), parse_params::<HapticStrengthParams>(id, request.params)) {
                (Ok(haptic), Ok(params)) => {
                    Ok(applied(id, haptic.set_strength(params.strength).await))
                }
                (Err(resp), _) | (_, Err(resp)) => Err(resp),
            }
        }

        methods::HAPTIC_SET_BATTERY_SAVING => {
            match (
                haptic(id, state),
                parse_params::<HapticBatterySavingParams>(id, request.params),
            ) {
                (Ok(haptic), Ok(params)) => Ok(applied(
                    id,
                    haptic.set_battery_saving(params.battery_saving).await,
                )),
                (Err(resp), _) | (_, Err(resp)) => Err(resp),
            }
        }

        methods::HAPTIC_PLAY_EFFECT => {
            match (haptic(id, state), parse_params::<HapticEffectParams>(id, request.params)) {
                (Ok(haptic), Ok(params)) => match haptic.play_effect(params.effect).await {
                    Ok(played) => Ok(Response::success(id, serde_json::json!({ "played": played }))),
                    Err(e) => Ok(Response::error(id, ERR_INTERNAL, e.to_string())),
                },
                (Err(resp), _) | (_, Err(resp)) => Err(resp),
            }
        }

        _ => Err(Response::error(id, ERR_METHOD_NOT_FOUND, "Method not found")),
    };

    match outcome {
        Ok(response) | Err(response) => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LoggingHapticBackend;
    use crate::config::DeviceProfile;
    use crate::ipc::DaemonClient;
    use crate::scheduler::manual::ManualScheduler;
    use std::time::Duration;

    fn state(haptics: bool) -> ServerState {
        let backend = if haptics {
            LoggingHapticBackend::new()
        } else {
            LoggingHapticBackend::unsupported()
        };
        let device = Device::new(
            "test-mouse",
            &DeviceProfile::default(),
            Arc::new(ManualScheduler::new()),
            Arc::new(backend),
        )
        .unwrap();

        ServerState {
            device: Arc::new(device),
            start_time: Instant::now(),
            started_at: Utc::now(),
        }
    }

    fn request(method: &str, params: serde_json::Value) -> Request {
        Request::new(method).with_params(params)
    }

    #[tokio::test]
    async fn test_scroll_get_and_set() {
        let state = state(true);

        let resp = handle_request(request(methods::SCROLL_GET, serde_json::Value::Null), &state).await;
        let body: SmoothScrollResponse = serde_json::from_value(resp.result.unwrap()).unwrap();
        assert_eq!(body, SmoothScrollResponse { interval: 8, steps: 10 });

        let resp = handle_request(
            request(methods::SCROLL_SET_STEPS, serde_json::json!({ "steps": -5 })),
            &state,
        )
        .await;
        assert!(resp.is_success());
        assert_eq!(state.device.scroll().steps(), 1);

        let resp = handle_request(
            request(methods::SCROLL_SET_INTERVAL, serde_json::json!({ "interval": 16 })),
            &state,
        )
        .await;
        assert!(resp.is_success());
        assert_eq!(state.device.scroll().interval_ms(), 16);
    }

    #[tokio::test]
    async fn test_invalid_params() {
        let state = state(true);
        let resp = handle_request(
            request(methods::SCROLL_SET_STEPS, serde_json::json!({ "count": 3 })),
            &state,
        )
        .await;
        assert_eq!(resp.error.unwrap().code, ERR_INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_unknown_and_empty_method() {
        let state = state(true);

        let resp = handle_request(request("scroll.feed", serde_json::Value::Null), &state).await;
        assert_eq!(resp.error.unwrap().code, ERR_METHOD_NOT_FOUND);

        let resp = handle_request(request("", serde_json::Value::Null), &state).await;
        assert_eq!(resp.error.unwrap().code, ERR_INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_haptic_methods() {
        let state = state(true);

        let resp = handle_request(
            request(methods::HAPTIC_SET_STRENGTH, serde_json::json!({ "strength": 0 })),
            &state,
        )
        .await;
        assert!(resp.is_success());

        let resp = handle_request(request(methods::HAPTIC_GET, serde_json::Value::Null), &state).await;
        let body: HapticStateResponse = serde_json::from_value(resp.result.unwrap()).unwrap();
        assert_eq!(
            body,
            HapticStateResponse {
                enabled: true,
                strength: 1,
                battery_saving: false,
            }
        );

        let resp = handle_request(
            request(methods::HAPTIC_PLAY_EFFECT, serde_json::json!({ "effect": 20 })),
            &state,
        )
        .await;
        let body: PlayEffectResponse = serde_json::from_value(resp.result.unwrap()).unwrap();
        assert!(!body.played);
    }

    #[tokio::test]
    async fn test_haptic_unavailable() {
        let state = state(false);
        let resp = handle_request(
            request(methods::HAPTIC_SET_ENABLED, serde_json::json!({ "enabled": false })),
            &state,
        )
        .await;
        assert_eq!(resp.error.unwrap().code, ERR_FEATURE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_socket_round_trip() {
        let data_dir = std::env::temp_dir().join(format!("peripherald-{}", Uuid::new_v4().simple()));
        let mut config = AppConfig::default();
        config.general.data_dir = data_dir.clone();

        let server = Arc::new(DaemonServer::new(state(true).device, &config));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let running = {
            let server = server.clone();
            tokio::spawn(async move { server.run(shutdown_rx).await })
        };

        let client = DaemonClient::new(config.socket_path());
        let mut attempts = 0;
        while !client.ping().await.unwrap() {
            attempts += 1;
            assert!(attempts < 200, "server never came up");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        client.set_scroll_steps(4).await.unwrap();
        client.set_scroll_interval(0).await.unwrap();
        let scroll = client.smooth_scroll().await.unwrap();
        assert_eq!(scroll, SmoothScrollResponse { interval: 1, steps: 4 });

        let status = client.status().await.unwrap();
        assert!(status.running);
        assert_eq!(status.device, "test-mouse");
        assert_eq!(status.features, vec!["scroll_smoother", "haptic_feedback"]);

        assert!(client.play_haptic_effect(2).await.unwrap());
        client.set_haptic_enabled(false).await.unwrap();
        assert!(!client.haptic_state().await.unwrap().enabled);
        assert!(!client.play_haptic_effect(2).await.unwrap());

        shutdown_tx.send(true).unwrap();
        running.await.unwrap().unwrap();
        assert!(!config.socket_path().exists());
        let _ = std::fs::remove_dir_all(data_dir);
    }
}
