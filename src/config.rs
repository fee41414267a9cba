// fmgc-vnav/src/config.rs

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VnavDescentMode {
    #[default]
    Normal,
    /// Continuous descent approach.
    Cda,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VnavConfig {
    /// Dumps every computed profile at debug level.
    pub debug_profile: bool,
    pub descent_mode: VnavDescentMode,
    /// Emit FLAP1/FLAP2 pseudo waypoints when flying a CDA.
    pub emit_cda_flap_pwp: bool,
    /// Requested time markers, in seconds.
    pub time_markers: Vec<u32>,
    /// Flight path angle of the geometric descent, in degrees.
    pub descent_flight_path_angle: f64,
    pub descent_speed: f64,
}

impl Default for VnavConfig {
    fn default() -> Self {
        Self {
            debug_profile: false,
            descent_mode: VnavDescentMode::Normal,
            emit_cda_flap_pwp: true,
            time_markers: vec![10_000],
            descent_flight_path_angle: 3.,
            descent_speed: 290.,
        }
    }
}

impl VnavConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, VnavConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: VnavConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), VnavConfigError> {
        if !(self.descent_flight_path_angle > 0. && self.descent_flight_path_angle < 90.) {
            return Err(VnavConfigError::InvalidFlightPathAngle(
                self.descent_flight_path_angle,
            ));
        }
        if !(self.descent_speed > 0.) {
            return Err(VnavConfigError::InvalidDescentSpeed(self.descent_speed));
        }
        Ok(())
    }

    pub fn emits_cda_flap_pseudo_waypoints(&self) -> bool {
        self.descent_mode == VnavDescentMode::Cda && self.emit_cda_flap_pwp
    }
}

#[derive(Error, Debug)]
pub enum VnavConfigError {
    #[error("File IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("descent flight path angle must be in (0, 90) degrees, but got {0}")]
    InvalidFlightPathAngle(f64),
    #[error("descent speed must be > 0, but got {0}")]
    InvalidDescentSpeed(f64),
}
