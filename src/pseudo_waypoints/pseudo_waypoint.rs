// fmgc-vnav/src/pseudo_waypoints/pseudo_waypoint.rs

use crate::geometry::{Coordinates, Leg};
use crate::vnav::PseudoWaypointFlightPlanInfo;
use serde::Serialize;

/// Symbol drawn for a pseudo waypoint on the navigation display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PwpSymbol {
    LevelOffForRestriction,
    ContinueClimb,
    SpeedChange,
    SpeedLimit,
    TopOfClimb,
    TimeMarker,
    TopOfDescent,
    Decel,
    CdaFlap1,
    CdaFlap2,
}

/// Action requested from autoflight when a pseudo waypoint is sequenced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SequencingAction {
    TodReached,
    ApproachPhaseAutoEngage,
}

/// Output of sequencing, consumed by the autoflight collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum AutoflightAction {
    TopOfDescentReached,
    SetApproachPhaseEnabled(bool),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WaypointStats {
    pub ident: String,
    /// Distance from the start of the leg, nm.
    pub distance_in_fp: f64,
    pub time_from_present: Option<f64>,
}

impl WaypointStats {
    pub fn compute(
        ident: &str,
        leg: &dyn Leg,
        distance_from_leg_termination: f64,
        flight_plan_info: Option<&PseudoWaypointFlightPlanInfo>,
    ) -> Self {
        Self {
            ident: ident.to_string(),
            distance_in_fp: leg.distance() - distance_from_leg_termination,
            time_from_present: flight_plan_info.map(|info| info.seconds_from_present),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PseudoWaypoint {
    pub ident: String,
    pub along_leg_index: usize,
    pub distance_from_leg_termination: f64,
    pub symbol: PwpSymbol,
    pub coordinate: Coordinates,
    pub displayed_on_mcdu: bool,
    pub mcdu_ident: Option<String>,
    pub mcdu_header: Option<String>,
    pub sequencing_action: Option<SequencingAction>,
    pub stats: WaypointStats,
    pub flight_plan_info: Option<PseudoWaypointFlightPlanInfo>,
}
