//! Device features
//!
//! A feature wraps one hardware capability. The daemon drives every feature
//! through the same lifecycle: apply a profile, push configuration to the
//! device, then listen for device events.

mod haptic;
mod scroll;

use async_trait::async_trait;

use crate::config::DeviceProfile;
use crate::Result;

pub use haptic::{HapticFeedback, DEFAULT_STRENGTH, MAX_EFFECT};

/// Lifecycle shared by all device features
#[async_trait]
pub trait DeviceFeature: Send + Sync {
    /// Stable feature name, used in logs and status replies
    fn name(&self) -> &'static str;

    /// Push the current state to the device
    async fn configure(&self) -> Result<()>;

    /// Start reacting to device events
    async fn listen(&self) -> Result<()>;

    /// Apply the profile's settings for this feature
    fn set_profile(&self, profile: &DeviceProfile);
}
