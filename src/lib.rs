//! Finger-counting hand teleoperation.
//!
//! The pipeline is a single synchronous loop: grab a camera frame, estimate the
//! 21 hand landmarks with a pretrained network, classify which fingers are
//! extended from landmark geometry, and map the extended-finger count to a
//! velocity command that gets published to the robot's motion topic.
//!
//! # Coordinates
//!
//! Landmark coordinates are pixel coordinates in the captured frame: X points
//! right, Y points *down*. The finger-extension rules in [`hand::fingers`]
//! depend on this orientation.

use log::LevelFilter;

pub mod camera;
pub mod cmd;
pub mod hand;
pub mod nn;
pub mod resolution;
pub mod teleop;
pub mod timer;
pub mod transport;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_PKG_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and this library will log at *debug* level; everything
/// else stays at the `env_logger` default unless overridden via `RUST_LOG`.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
