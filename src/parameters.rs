// fmgc-vnav/src/parameters.rs

use crate::common::FlapConf;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LateralMode {
    #[default]
    None,
    Hdg,
    Trk,
    Nav,
    LocCpt,
    LocTrack,
    Land,
    Rwy,
    Ga,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalMode {
    #[default]
    None,
    Srs,
    Clb,
    OpClb,
    Vs,
    Fpa,
    AltCpt,
    Alt,
    AltCst,
    AltCstCpt,
    Des,
    OpDes,
    Gs,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlightPhase {
    #[default]
    Preflight,
    Takeoff,
    Climb,
    Cruise,
    Descent,
    Approach,
    GoAround,
    Done,
}

/// Speed cap applying below `under_altitude`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedLimit {
    pub under_altitude: f64,
    pub speed: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PresentPosition {
    pub lat: f64,
    pub long: f64,
    pub alt: f64,
}

/// Flight plan and performance inputs of one profile computation.
///
/// Weights are in tonnes, altitudes in feet and speeds in knots.
#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComputationParameters {
    pub cruise_altitude: f64,
    #[builder(default)]
    #[serde(default)]
    pub origin_airfield_elevation: f64,
    #[builder(default)]
    #[serde(default)]
    pub destination_airfield_elevation: f64,
    pub thrust_reduction_altitude: f64,
    pub acceleration_altitude: f64,
    pub v2_speed: f64,
    pub zero_fuel_weight: f64,
    pub fuel_on_board: f64,
    #[builder(default)]
    #[serde(default)]
    pub speed_limit: Option<SpeedLimit>,
    #[builder(default)]
    #[serde(default)]
    pub perf_factor: f64,
    #[builder(default = "36089.")]
    #[serde(default = "default_tropopause")]
    pub tropopause: f64,
    pub managed_climb_speed: f64,
    #[builder(default)]
    #[serde(default)]
    pub fcu_lateral_mode: LateralMode,
    #[builder(default)]
    #[serde(default)]
    pub fcu_vertical_mode: VerticalMode,
    #[builder(default)]
    #[serde(default)]
    pub flight_phase: FlightPhase,
    #[builder(default)]
    #[serde(default)]
    pub present_position: PresentPosition,
}

fn default_tropopause() -> f64 {
    36089.
}

impl ComputationParameters {
    /// Checks the snapshot is complete enough to build a profile from.
    pub fn can_compute_profile(&self) -> Result<(), ParametersError> {
        Self::validate_positive("cruise_altitude", self.cruise_altitude)?;
        Self::validate_positive("v2_speed", self.v2_speed)?;
        Self::validate_positive("zero_fuel_weight", self.zero_fuel_weight)?;
        Self::validate_positive("fuel_on_board", self.fuel_on_board)?;
        Self::validate_positive("managed_climb_speed", self.managed_climb_speed)?;
        if self.thrust_reduction_altitude < self.origin_airfield_elevation {
            return Err(ParametersError::ThrustReductionBelowOrigin(
                self.thrust_reduction_altitude,
                self.origin_airfield_elevation,
            ));
        }
        if self.acceleration_altitude < self.thrust_reduction_altitude {
            return Err(ParametersError::AccelerationBelowThrustReduction(
                self.acceleration_altitude,
                self.thrust_reduction_altitude,
            ));
        }
        Ok(())
    }

    fn validate_positive(name: &'static str, value: f64) -> Result<(), ParametersError> {
        if !(value > 0.) {
            return Err(ParametersError::NotAvailable(name, value));
        }
        Ok(())
    }

    /// Speed target below/above the speed limit altitude.
    pub fn climb_speed_at(&self, altitude: f64) -> f64 {
        match self.speed_limit {
            Some(limit) if altitude < limit.under_altitude => limit.speed,
            _ => self.managed_climb_speed,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ParametersError {
    #[error("{0} is not available yet (got {1})")]
    NotAvailable(&'static str, f64),
    #[error("thrust reduction altitude {0} ft is below the origin elevation {1} ft")]
    ThrustReductionBelowOrigin(f64, f64),
    #[error("acceleration altitude {0} ft is below the thrust reduction altitude {1} ft")]
    AccelerationBelowThrustReduction(f64, f64),
}

/// Simulator variables read once per tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentSnapshot {
    pub on_ground: bool,
    pub indicated_airspeed: f64,
    /// TOGA thrust limit, N1 percent.
    pub toga_thrust_limit: f64,
    pub takeoff_flaps: FlapConf,
    /// Seconds since midnight UTC.
    pub zulu_time: f64,
    pub altitude_above_ground: f64,
    pub fma_lateral_mode: LateralMode,
    /// Static air temperature in degrees Celsius.
    pub ambient_temperature: f64,
    pub pressure_altitude: f64,
}

/// Lateral guidance state relevant to pseudo waypoint sequencing and display.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceState {
    pub active_leg_index: usize,
    /// Remaining path distance on the active leg, as seen by guidance.
    pub active_leg_complete_leg_path_dtg: f64,
    /// Remaining path distance on the leg shown as active on the displays.
    pub display_active_leg_complete_leg_path_dtg: f64,
    pub distance_to_active_waypoint: f64,
}

/// Everything the vertical navigation reads in one tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuidanceSnapshot {
    pub parameters: ComputationParameters,
    #[serde(default)]
    pub environment: EnvironmentSnapshot,
    #[serde(default)]
    pub guidance: GuidanceState,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parameters() -> ComputationParameters {
        ComputationParametersBuilder::default()
            .cruise_altitude(35000.)
            .thrust_reduction_altitude(1500.)
            .acceleration_altitude(1500.)
            .v2_speed(140.)
            .zero_fuel_weight(60.)
            .fuel_on_board(10.)
            .managed_climb_speed(290.)
            .speed_limit(Some(SpeedLimit {
                under_altitude: 10000.,
                speed: 250.,
            }))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let parameters = parameters();
        assert_eq!(parameters.tropopause, 36089.);
        assert_eq!(parameters.flight_phase, FlightPhase::Preflight);
        assert!(parameters.can_compute_profile().is_ok());
    }

    #[test]
    fn test_builder_requires_cruise_altitude() {
        let result = ComputationParametersBuilder::default()
            .v2_speed(140.)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_cannot_compute_without_v2() {
        let mut parameters = parameters();
        parameters.v2_speed = 0.;
        assert_eq!(
            parameters.can_compute_profile(),
            Err(ParametersError::NotAvailable("v2_speed", 0.))
        );
    }

    #[test]
    fn test_acceleration_below_thrust_reduction() {
        let mut parameters = parameters();
        parameters.acceleration_altitude = 1000.;
        assert!(matches!(
            parameters.can_compute_profile(),
            Err(ParametersError::AccelerationBelowThrustReduction(..))
        ));
    }

    #[test]
    fn test_climb_speed_at() {
        let parameters = parameters();
        assert_eq!(parameters.climb_speed_at(5000.), 250.);
        assert_eq!(parameters.climb_speed_at(10000.), 290.);
    }
}
