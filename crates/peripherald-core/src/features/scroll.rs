use async_trait::async_trait;
use tracing::debug;

use super::DeviceFeature;
use crate::config::DeviceProfile;
use crate::smoother::ScrollSmoother;
use crate::Result;

#[async_trait]
impl DeviceFeature for ScrollSmoother {
    fn name(&self) -> &'static str {
        "scroll_smoother"
    }

    // Pacing is applied in software, nothing to send to the device.
    async fn configure(&self) -> Result<()> {
        Ok(())
    }

    async fn listen(&self) -> Result<()> {
        Ok(())
    }

    fn set_profile(&self, profile: &DeviceProfile) {
        self.set_interval_ms(profile.scroll.interval_ms);
        self.set_steps(profile.scroll.steps);
        debug!(
            interval_ms = self.interval_ms(),
            steps = self.steps(),
            "Scroll profile applied"
        );
    }
}
