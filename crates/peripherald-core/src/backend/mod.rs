//! Hardware protocol boundary
//!
//! Features talk to the device only through these traits. Frame encoding and
//! transport live behind them.

mod haptic;

pub use haptic::{HapticBackend, HapticSettings, LoggingHapticBackend};
