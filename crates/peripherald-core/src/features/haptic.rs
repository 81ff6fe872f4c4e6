use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::DeviceFeature;
use crate::backend::HapticBackend;
use crate::config::DeviceProfile;
use crate::{Error, Result};

/// Highest effect id the device accepts
pub const MAX_EFFECT: u8 = 14;
pub const DEFAULT_STRENGTH: u8 = 60;

fn clamp_strength(strength: i32) -> u8 {
    strength.clamp(1, 100) as u8
}

/// Haptic feedback feature
///
/// Every setter stores the new value and immediately pushes the full
/// configuration to the device.
pub struct HapticFeedback {
    enabled: AtomicBool,
    strength: AtomicU8,
    battery_saving: AtomicBool,
    backend: Arc<dyn HapticBackend>,
}

impl HapticFeedback {
    /// Fails with [`Error::UnsupportedFeature`] if the device has no haptics
    pub fn new(backend: Arc<dyn HapticBackend>) -> Result<Self> {
        if !backend.is_supported() {
            return Err(Error::UnsupportedFeature("haptic feedback".to_string()));
        }

        Ok(Self {
            enabled: AtomicBool::new(true),
            strength: AtomicU8::new(DEFAULT_STRENGTH),
            battery_saving: AtomicBool::new(false),
            backend,
        })
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.enabled.store(enabled, Ordering::Relaxed);
        self.configure().await
    }

    pub fn strength(&self) -> u8 {
        self.strength.load(Ordering::Relaxed)
    }

    /// Set effect strength; clamped to 1..=100
    pub async fn set_strength(&self, strength: i32) -> Result<()> {
        self.strength.store(clamp_strength(strength), Ordering::Relaxed);
        self.configure().await
    }

    pub fn battery_saving(&self) -> bool {
        self.battery_saving.load(Ordering::Relaxed)
    }

    pub async fn set_battery_saving(&self, battery_saving: bool) -> Result<()> {
        self.battery_saving.store(battery_saving, Ordering::Relaxed);
        self.configure().await
    }

    /// Play an effect if haptics are enabled and the id is in range
    ///
    /// Returns whether the effect was sent to the device.
    pub async fn play_effect(&self, effect: u8) -> Result<bool> {
        if !self.enabled() || effect > MAX_EFFECT {
            debug!(effect, enabled = self.enabled(), "Haptic effect skipped");
            return Ok(false);
        }

        self.backend.play_effect(effect).await?;
        Ok(true)
    }
}

#[async_trait]
impl DeviceFeature for HapticFeedback {
    fn name(&self) -> &'static str {
        "haptic_feedback"
    }

    async fn configure(&self) -> Result<()> {
        self.backend
            .set_strength(self.strength(), self.enabled(), self.battery_saving())
            .await
    }

    async fn listen(&self) -> Result<()> {
        Ok(())
    }

    fn set_profile(&self, profile: &DeviceProfile) {
        let haptic = &profile.haptic;
        self.enabled.store(haptic.enabled, Ordering::Relaxed);
        self.strength.store(clamp_strength(haptic.strength), Ordering::Relaxed);
        self.battery_saving.store(haptic.battery_saving, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{HapticSettings, LoggingHapticBackend};
    use crate::config::HapticConfig;

    fn feature() -> (Arc<LoggingHapticBackend>, HapticFeedback) {
        let backend = Arc::new(LoggingHapticBackend::new());
        let haptic = HapticFeedback::new(backend.clone()).unwrap();
        (backend, haptic)
    }

    #[test]
    fn test_unsupported_backend() {
        let result = HapticFeedback::new(Arc::new(LoggingHapticBackend::unsupported()));
        assert!(matches!(result, Err(Error::UnsupportedFeature(_))));
    }

    #[test]
    fn test_clamp_strength() {
        assert_eq!(clamp_strength(-20), 1);
        assert_eq!(clamp_strength(0), 1);
        assert_eq!(clamp_strength(55), 55);
        assert_eq!(clamp_strength(100), 100);
        assert_eq!(clamp_strength(250), 100);
    }

    #[tokio::test]
    async fn test_setters_push_configuration() {
        let (backend, haptic) = feature();
        assert_eq!(backend.settings(), None);

        haptic.set_strength(500).await.unwrap();
        assert_eq!(
            backend.settings(),
            Some(HapticSettings {
                strength: 100,
                enabled: true,
                battery_saving: false,
            })
        );

        haptic.set_battery_saving(true).await.unwrap();
        haptic.set_enabled(false).await.unwrap();
        assert_eq!(
            backend.settings(),
            Some(HapticSettings {
                strength: 100,
                enabled: false,
                battery_saving: true,
            })
        );
    }

    #[tokio::test]
    async fn test_play_effect_gating() {
        let (backend, haptic) = feature();

        assert!(haptic.play_effect(0).await.unwrap());
        assert!(haptic.play_effect(MAX_EFFECT).await.unwrap());
        assert!(!haptic.play_effect(MAX_EFFECT + 1).await.unwrap());

        haptic.set_enabled(false).await.unwrap();
        assert!(!haptic.play_effect(3).await.unwrap());

        assert_eq!(backend.effects(), vec![0, MAX_EFFECT]);
    }

    #[tokio::test]
    async fn test_profile_then_configure() {
        let (backend, haptic) = feature();
        let profile = DeviceProfile {
            haptic: HapticConfig {
                enabled: true,
                strength: 0,
                battery_saving: true,
            },
            ..Default::default()
        };

        haptic.set_profile(&profile);
        assert_eq!(haptic.strength(), 1);
        haptic.configure().await.unwrap();
        assert_eq!(
            backend.settings(),
            Some(HapticSettings {
                strength: 1,
                enabled: true,
                battery_saving: true,
            })
        );
    }
}
