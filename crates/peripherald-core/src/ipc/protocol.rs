//! IPC Protocol definitions for daemon-client communication
//!
//! Uses JSON-RPC style request/response format over Unix socket, one JSON
//! document per line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JSON-RPC style request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: Uuid,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl Request {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            method: method.into(),
            params: serde_json::Value::Null,
        }
    }

    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }
}

/// JSON-RPC style response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Response {
    pub fn success(id: Uuid, result: serde_json::Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Uuid, code: i32, message: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }

    pub fn ok(id: Uuid) -> Self {
        Self::success(id, serde_json::json!({"ok": true}))
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// RPC error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

// Error codes
pub const ERR_PARSE: i32 = -32700;
pub const ERR_INVALID_REQUEST: i32 = -32600;
pub const ERR_METHOD_NOT_FOUND: i32 = -32601;
pub const ERR_INVALID_PARAMS: i32 = -32602;
pub const ERR_INTERNAL: i32 = -32603;
pub const ERR_FEATURE_UNAVAILABLE: i32 = -32001;

// Method names
pub mod methods {
    pub const PING: &str = "ping";
    pub const STATUS: &str = "status";

    // Scroll smoothing
    pub const SCROLL_GET: &str = "scroll.get";
    pub const SCROLL_SET_INTERVAL: &str = "scroll.set_interval";
    pub const SCROLL_SET_STEPS: &str = "scroll.set_steps";

    // Haptic feedback
    pub const HAPTIC_GET: &str = "haptic.get";
    pub const HAPTIC_SET_ENABLED: &str = "haptic.set_enabled";
    pub const HAPTIC_SET_STRENGTH: &str = "haptic.set_strength";
    pub const HAPTIC_SET_BATTERY_SAVING: &str = "haptic.set_battery_saving";
    pub const HAPTIC_PLAY_EFFECT: &str = "haptic.play_effect";
}

// Parameter structures

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollIntervalParams {
    pub interval: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollStepsParams {
    pub steps: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HapticEnabledParams {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HapticStrengthParams {
    pub strength: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HapticBatterySavingParams {
    pub battery_saving: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HapticEffectParams {
    pub effect: u8,
}

// Response structures

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub uptime_secs: u64,
    pub started_at: DateTime<Utc>,
    pub device: String,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmoothScrollResponse {
    pub interval: u32,
    pub steps: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HapticStateResponse {
    pub enabled: bool,
    pub strength: u8,
    pub battery_saving: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayEffectResponse {
    pub played: bool,
}
