pub mod config;
pub mod error;
pub mod backend;
pub mod scheduler;
pub mod smoother;
pub mod features;
pub mod device;
pub mod ipc;

pub use config::{AppConfig, DeviceProfile, HapticConfig, ScrollConfig};
pub use device::Device;
pub use error::{Error, Result};
pub use ipc::{DaemonClient, DaemonServer};
pub use smoother::ScrollSmoother;
