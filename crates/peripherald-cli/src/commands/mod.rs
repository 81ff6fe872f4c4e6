pub mod daemon;
pub mod haptic;
pub mod scroll;
pub mod simulate;
