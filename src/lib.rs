use pretty_env_logger;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn _setup_pretty_env_logger_default() {
    INIT.call_once(|| {
        pretty_env_logger::init();
    });
}

pub use config::{VnavConfig, VnavDescentMode};
pub use parameters::{ComputationParameters, ComputationParametersBuilder, GuidanceSnapshot};
pub use vnav::VnavDriver;
pub mod common;
pub mod config;
pub mod geometry;
pub mod parameters;
pub mod physics;
pub mod pseudo_waypoints;
pub mod scenario;
pub mod scheduler;
pub mod vnav;
