use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::info;

use crate::Result;

/// Haptic capability of a device
#[async_trait]
pub trait HapticBackend: Send + Sync {
    /// Whether the device exposes the haptic capability at all
    fn is_supported(&self) -> bool;

    /// Push strength and mode flags to the device
    async fn set_strength(&self, strength: u8, enabled: bool, battery_saving: bool) -> Result<()>;

    /// Trigger an effect by id
    async fn play_effect(&self, effect: u8) -> Result<()>;
}

/// Settings last pushed through [`HapticBackend::set_strength`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HapticSettings {
    pub strength: u8,
    pub enabled: bool,
    pub battery_saving: bool,
}

#[derive(Debug, Default)]
struct Recorded {
    settings: Option<HapticSettings>,
    effects: Vec<u8>,
}

/// Backend used when no hardware transport is attached
///
/// Logs every request and remembers what was sent, which also makes it the
/// backend of choice in tests.
#[derive(Debug)]
pub struct LoggingHapticBackend {
    supported: bool,
    recorded: Mutex<Recorded>,
}

impl Default for LoggingHapticBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingHapticBackend {
    pub fn new() -> Self {
        Self {
            supported: true,
            recorded: Mutex::new(Recorded::default()),
        }
    }

    /// A backend for a device without haptics
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// Most recent settings pushed to the device
    pub fn settings(&self) -> Option<HapticSettings> {
        self.recorded().settings
    }

    /// Every effect played so far, oldest first
    pub fn effects(&self) -> Vec<u8> {
        self.recorded().effects.clone()
    }

    fn recorded(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl HapticBackend for LoggingHapticBackend {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn set_strength(&self, strength: u8, enabled: bool, battery_saving: bool) -> Result<()> {
        info!(strength, enabled, battery_saving, "Haptic settings applied");
        self.recorded().settings = Some(HapticSettings {
            strength,
            enabled,
            battery_saving,
        });
        Ok(())
    }

    async fn play_effect(&self, effect: u8) -> Result<()> {
        info!(effect, "Haptic effect played");
        self.recorded().effects.push(effect);
        Ok(())
    }
}
