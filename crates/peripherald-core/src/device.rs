use std::sync::Arc;

use tracing::{info, warn};

use crate::backend::HapticBackend;
use crate::config::DeviceProfile;
use crate::features::{DeviceFeature, HapticFeedback};
use crate::scheduler::TaskScheduler;
use crate::smoother::ScrollSmoother;
use crate::{Error, Result};

/// Feature set of one input device
pub struct Device {
    name: String,
    scroll: Arc<ScrollSmoother>,
    haptic: Option<Arc<HapticFeedback>>,
}

impl Device {
    /// Build every feature the device supports and apply `profile` to them
    pub fn new(
        name: impl Into<String>,
        profile: &DeviceProfile,
        scheduler: Arc<dyn TaskScheduler>,
        haptic_backend: Arc<dyn HapticBackend>,
    ) -> Result<Self> {
        let name = name.into();
        let scroll = ScrollSmoother::new(scheduler);

        let haptic = match HapticFeedback::new(haptic_backend) {
            Ok(haptic) => Some(Arc::new(haptic)),
            Err(Error::UnsupportedFeature(feature)) => {
                info!("Device '{}' does not support {}", name, feature);
                None
            }
            Err(e) => return Err(e),
        };

        let device = Self {
            name,
            scroll,
            haptic,
        };
        device.apply_profile(profile);
        Ok(device)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scroll(&self) -> &Arc<ScrollSmoother> {
        &self.scroll
    }

    pub fn haptic(&self) -> Option<&Arc<HapticFeedback>> {
        self.haptic.as_ref()
    }

    pub fn features(&self) -> Vec<Arc<dyn DeviceFeature>> {
        let mut features: Vec<Arc<dyn DeviceFeature>> = Vec::with_capacity(2);
        features.push(self.scroll.clone());
        if let Some(haptic) = &self.haptic {
            features.push(haptic.clone());
        }
        features
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.features()
            .iter()
            .map(|feature| feature.name().to_string())
            .collect()
    }

    pub fn apply_profile(&self, profile: &DeviceProfile) {
        for feature in self.features() {
            feature.set_profile(profile);
        }
    }

    /// Push configuration to the device and start listening on every feature
    ///
    /// A failing feature is logged and skipped; the error of the first
    /// failure is returned once all features have been attempted.
    pub async fn configure_all(&self) -> Result<()> {
        let mut first_error = None;

        for feature in self.features() {
            let result = match feature.configure().await {
                Ok(()) => feature.listen().await,
                Err(e) => Err(e),
            };

            if let Err(e) = result {
                warn!("Feature '{}' on '{}' failed: {}", feature.name(), self.name, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{HapticSettings, LoggingHapticBackend};
    use crate::config::{HapticConfig, ScrollConfig};
    use crate::scheduler::manual::ManualScheduler;

    fn profile() -> DeviceProfile {
        DeviceProfile {
            scroll: ScrollConfig {
                interval_ms: 12,
                steps: 5,
            },
            haptic: HapticConfig {
                enabled: true,
                strength: 80,
                battery_saving: false,
            },
        }
    }

    #[tokio::test]
    async fn test_device_with_haptics() {
        let backend = Arc::new(LoggingHapticBackend::new());
        let device = Device::new(
            "test-mouse",
            &profile(),
            Arc::new(ManualScheduler::new()),
            backend.clone(),
        )
        .unwrap();

        assert_eq!(device.name(), "test-mouse");
        assert_eq!(device.feature_names(), vec!["scroll_smoother", "haptic_feedback"]);
        assert_eq!(device.scroll().interval_ms(), 12);
        assert_eq!(device.scroll().steps(), 5);
        assert_eq!(device.haptic().unwrap().strength(), 80);

        device.configure_all().await.unwrap();
        assert_eq!(
            backend.settings(),
            Some(HapticSettings {
                strength: 80,
                enabled: true,
                battery_saving: false,
            })
        );
    }

    #[tokio::test]
    async fn test_device_without_haptics() {
        let device = Device::new(
            "plain-mouse",
            &DeviceProfile::default(),
            Arc::new(ManualScheduler::new()),
            Arc::new(LoggingHapticBackend::unsupported()),
        )
        .unwrap();

        assert!(device.haptic().is_none());
        assert_eq!(device.feature_names(), vec!["scroll_smoother"]);
        device.configure_all().await.unwrap();
    }
}
