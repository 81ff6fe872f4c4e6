//! IPC Client for connecting to daemon
//!
//! Provides a type-safe interface for communicating with the daemon.

use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use super::protocol::*;
use crate::{Error, Result};

/// Client for communicating with the daemon
#[derive(Debug, Clone)]
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// Create a new daemon client
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    /// Check if daemon is running by sending a ping
    pub async fn ping(&self) -> Result<bool> {
        match self.call(methods::PING, serde_json::Value::Null).await {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }

    /// Get daemon status
    pub async fn status(&self) -> Result<StatusResponse> {
        let result = self.call(methods::STATUS, serde_json::Value::Null).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Current scroll smoothing interval and steps
    pub async fn smooth_scroll(&self) -> Result<SmoothScrollResponse> {
        let result = self.call(methods::SCROLL_GET, serde_json::Value::Null).await?;
        Ok(serde_json::from_value(result)?)
    }

    pub async fn set_scroll_interval(&self, interval: i32) -> Result<()> {
        let params = serde_json::json!({ "interval": interval });
        self.call(methods::SCROLL_SET_INTERVAL, params).await?;
        Ok(())
    }

    pub async fn set_scroll_steps(&self, steps: i32) -> Result<()> {
        let params = serde_json::json!({ "steps": steps });
        self.call(methods::SCROLL_SET_STEPS, params).await?;
        Ok(())
    }

    /// Current haptic settings
    pub async fn haptic_state(&self) -> Result<HapticStateResponse> {
        let result = self.call(methods::HAPTIC_GET, serde_json::Value::Null).await?;
        Ok(serde_json::from_value(result)?)
    }

    pub async fn set_haptic_enabled(&self, enabled: bool) -> Result<()> {
        let params = serde_json::json!({ "enabled": enabled });
        self.call(methods::HAPTIC_SET_ENABLED, params).await?;
        Ok(())
    }

    pub async fn set_haptic_strength(&self, strength: i32) -> Result<()> {
        let params = serde_json::json!({ "strength": strength });
        self.call(methods::HAPTIC_SET_STRENGTH, params).await?;
        Ok(())
    }

    pub async fn set_haptic_battery_saving(&self, battery_saving: bool) -> Result<()> {
        let params = serde_json::json!({ "battery_saving": battery_saving });
        self.call(methods::HAPTIC_SET_BATTERY_SAVING, params).await?;
        Ok(())
    }

    /// Play a haptic effect; returns whether the device accepted it
    pub async fn play_haptic_effect(&self, effect: u8) -> Result<bool> {
        let params = serde_json::json!({ "effect": effect });
        let result = self.call(methods::HAPTIC_PLAY_EFFECT, params).await?;
        let response: PlayEffectResponse = serde_json::from_value(result)?;
        Ok(response.played)
    }

    /// Send a request and receive a response
    async fn call(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        let stream = UnixStream::connect(&self.socket_path).await.map_err(|e| {
            Error::Ipc(format!(
                "Failed to connect to daemon at {}: {}. Is the daemon running?",
                self.socket_path.display(),
                e
            ))
        })?;

        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        // Build request
        let request = Request::new(method).with_params(params);
        let request_json = serde_json::to_string(&request)?;

        // Send request
        writer.write_all(request_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        // Read response
        let mut response_line = String::new();
        if reader.read_line(&mut response_line).await? == 0 {
            return Err(Error::Ipc("Daemon closed the connection".to_string()));
        }

        let response: Response = serde_json::from_str(&response_line)?;

        if let Some(error) = response.error {
            return Err(Error::Ipc(format!(
                "RPC error {}: {}",
                error.code, error.message
            )));
        }

        response.result.ok_or_else(|| Error::Ipc("Empty response".to_string()))
    }
}

/// Check if daemon is reachable
pub async fn is_daemon_running(socket_path: &std::path::Path) -> bool {
    let client = DaemonClient::new(socket_path.to_path_buf());
    client.ping().await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_daemon() {
        let socket = std::env::temp_dir()
            .join(format!("peripherald-missing-{}.sock", uuid::Uuid::new_v4().simple()));
        assert!(!is_daemon_running(&socket).await);

        let client = DaemonClient::new(socket);
        let err = client.smooth_scroll().await.unwrap_err();
        assert!(matches!(err, Error::Ipc(_)));
    }
}
