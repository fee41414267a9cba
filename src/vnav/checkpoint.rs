// fmgc-vnav/src/vnav/checkpoint.rs

use crate::geometry::{AltitudeConstraint, SpeedConstraint};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerticalCheckpointReason {
    Liftoff,
    ThrustReductionAltitude,
    AccelerationAltitude,
    TopOfClimb,
    AtmosphericConditions,
    PresentPosition,
    LevelOffForConstraint,
    WaypointWithConstraint,
    ContinueClimb,
    CrossingSpeedLimit,
    SpeedConstraint,

    // Descent
    TopOfDescent,
    IdlePathEnd,

    // Approach
    Decel,
    Flaps1,
    Flaps2,
    Flaps3,
    FlapsFull,
    Landing,
}

/// Predicted vertical state at one distance along the path.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerticalCheckpoint {
    pub reason: VerticalCheckpointReason,
    /// Nautical miles from the start of the path.
    pub distance_from_start: f64,
    pub seconds_from_present: f64,
    /// Feet.
    pub altitude: f64,
    /// Knots.
    pub speed: f64,
    /// Pounds.
    pub remaining_fuel_on_board: f64,
}

/// Upper bound on altitude from `distance_from_start` on.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaxAltitudeConstraint {
    pub distance_from_start: f64,
    pub max_altitude: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaxSpeedConstraint {
    pub distance_from_start: f64,
    pub max_speed: f64,
}

/// Interpolated state without speed or reason.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProfileSample {
    pub distance_from_start: f64,
    pub seconds_from_present: f64,
    pub altitude: f64,
    pub remaining_fuel_on_board: f64,
}

impl ProfileSample {
    pub fn with(self, speed: f64, reason: VerticalCheckpointReason) -> VerticalCheckpoint {
        VerticalCheckpoint {
            reason,
            distance_from_start: self.distance_from_start,
            seconds_from_present: self.seconds_from_present,
            altitude: self.altitude,
            speed,
            remaining_fuel_on_board: self.remaining_fuel_on_board,
        }
    }
}

/// Predictions at the termination of one leg.
#[derive(Clone, Debug, PartialEq)]
pub struct VerticalWaypointPrediction {
    pub waypoint_index: usize,
    pub distance_from_start: f64,
    pub seconds_from_present: f64,
    pub altitude: f64,
    pub speed: f64,
    pub altitude_constraint: Option<AltitudeConstraint>,
    pub speed_constraint: Option<SpeedConstraint>,
    pub is_altitude_constraint_met: bool,
    pub is_speed_constraint_met: bool,
}

/// Vertical information attached to a pseudo waypoint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PseudoWaypointFlightPlanInfo {
    pub distance_from_start: f64,
    pub seconds_from_present: f64,
    pub altitude: f64,
    pub speed: f64,
}

impl From<&VerticalCheckpoint> for PseudoWaypointFlightPlanInfo {
    fn from(checkpoint: &VerticalCheckpoint) -> Self {
        Self {
            distance_from_start: checkpoint.distance_from_start,
            seconds_from_present: checkpoint.seconds_from_present,
            altitude: checkpoint.altitude,
            speed: checkpoint.speed,
        }
    }
}
