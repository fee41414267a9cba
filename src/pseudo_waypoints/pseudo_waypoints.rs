// fmgc-vnav/src/pseudo_waypoints/pseudo_waypoints.rs

use super::placement::place_from_path_end;
use super::pseudo_waypoint::{
    AutoflightAction, PseudoWaypoint, PwpSymbol, SequencingAction, WaypointStats,
};
use crate::common::format_seconds;
use crate::config::VnavConfig;
use crate::geometry::Geometry;
use crate::parameters::{EnvironmentSnapshot, GuidanceState, LateralMode};
use crate::scheduler::{TaskScheduler, TaskToken};
use crate::vnav::{GeometryProfile, PseudoWaypointFlightPlanInfo, VerticalCheckpointReason};
use log::{debug, info};
use std::collections::BTreeMap;
use std::time::Duration;

const PWP_IDENT_LEVEL_OFF: &str = "Level off";
const PWP_IDENT_CONTINUE_CLIMB: &str = "Continue Climb";
const PWP_IDENT_SPEED_CHANGE: &str = "Speed change";
const PWP_IDENT_TOC: &str = "(T/C)";
const PWP_IDENT_SPD_LIM: &str = "(LIM)";
const PWP_IDENT_TOD: &str = "(T/D)";
const PWP_IDENT_DECEL: &str = "(DECEL)";
const PWP_IDENT_FLAP1: &str = "(FLAP1)";
const PWP_IDENT_FLAP2: &str = "(FLAP2)";

const APPROACH_PHASE_MAX_ALTITUDE_ABOVE_GROUND: f64 = 9500.;
const APPROACH_PHASE_REQUEST_DURATION: Duration = Duration::from_secs(5);
const SECONDS_PER_DAY: f64 = 86_400.;

/// Pseudo waypoints placed from the current vertical profile, and the subset
/// still ahead of the aircraft.
#[derive(Default)]
pub struct PseudoWaypoints {
    pseudo_waypoints: Vec<PseudoWaypoint>,
    current_pseudo_waypoints: Vec<PseudoWaypoint>,
    approach_phase_revert: Option<TaskToken>,
}

impl PseudoWaypoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every placed pseudo waypoint, in emission order.
    pub fn pseudo_waypoints(&self) -> &[PseudoWaypoint] {
        &self.pseudo_waypoints
    }

    /// Pseudo waypoints not yet passed, as of the last [`Self::update`].
    pub fn current_pseudo_waypoints(&self) -> &[PseudoWaypoint] {
        &self.current_pseudo_waypoints
    }

    /// Rebuilds the list from a finalized profile.
    ///
    /// An empty path clears the list. A profile not yet finalized leaves the
    /// previous list in place. Time markers are named after the UTC time at
    /// which they are reached, `computed_at` being the zulu time of the profile.
    pub fn recompute(
        &mut self,
        profile: &GeometryProfile,
        time_markers: &BTreeMap<u32, Option<PseudoWaypointFlightPlanInfo>>,
        computed_at: f64,
        config: &VnavConfig,
    ) {
        let geometry = profile.geometry();
        if geometry.is_empty() {
            self.pseudo_waypoints.clear();
            return;
        }

        if !profile.is_ready_to_display() {
            debug!("Profile not ready, keeping previous pseudo waypoints");
            return;
        }

        let total_distance = profile.total_flight_plan_distance();
        let from_checkpoint = |reason: VerticalCheckpointReason, ident: &str, symbol: PwpSymbol| {
            profile.find_vertical_checkpoint(reason).and_then(|checkpoint| {
                Self::place(
                    geometry,
                    total_distance - checkpoint.distance_from_start,
                    ident,
                    symbol,
                    Some(checkpoint.into()),
                )
            })
        };

        let mut new_pseudo_waypoints = Vec::new();

        new_pseudo_waypoints.extend(from_checkpoint(
            VerticalCheckpointReason::LevelOffForConstraint,
            PWP_IDENT_LEVEL_OFF,
            PwpSymbol::LevelOffForRestriction,
        ));

        new_pseudo_waypoints.extend(from_checkpoint(
            VerticalCheckpointReason::ContinueClimb,
            PWP_IDENT_CONTINUE_CLIMB,
            PwpSymbol::ContinueClimb,
        ));

        if let Some(&first_speed_change) = profile.find_distances_from_end_to_speed_changes().first() {
            new_pseudo_waypoints.extend(Self::place(
                geometry,
                first_speed_change,
                PWP_IDENT_SPEED_CHANGE,
                PwpSymbol::SpeedChange,
                None,
            ));
        }

        new_pseudo_waypoints.extend(
            from_checkpoint(
                VerticalCheckpointReason::CrossingSpeedLimit,
                PWP_IDENT_SPD_LIM,
                PwpSymbol::SpeedLimit,
            )
            .map(|pseudo_waypoint| PseudoWaypoint {
                displayed_on_mcdu: true,
                mcdu_header: Some("(SPD)".to_string()),
                ..pseudo_waypoint
            }),
        );

        new_pseudo_waypoints.extend(
            from_checkpoint(
                VerticalCheckpointReason::TopOfClimb,
                PWP_IDENT_TOC,
                PwpSymbol::TopOfClimb,
            )
            .map(Self::on_mcdu),
        );

        for prediction in time_markers.values() {
            let Some(prediction) = prediction else {
                continue;
            };
            let reached_at = (computed_at + prediction.seconds_from_present).rem_euclid(SECONDS_PER_DAY);
            let ident = format_seconds(reached_at.round() as u32);
            let placed = Self::place(
                geometry,
                total_distance - prediction.distance_from_start,
                &ident,
                PwpSymbol::TimeMarker,
                Some(*prediction),
            );
            new_pseudo_waypoints.extend(placed.map(|pseudo_waypoint| PseudoWaypoint {
                displayed_on_mcdu: true,
                mcdu_ident: Some(format!("({})", &ident[..5])),
                mcdu_header: Some("(UTC)".to_string()),
                ..pseudo_waypoint
            }));
        }

        new_pseudo_waypoints.extend(
            from_checkpoint(
                VerticalCheckpointReason::TopOfDescent,
                PWP_IDENT_TOD,
                PwpSymbol::TopOfDescent,
            )
            .map(|pseudo_waypoint| PseudoWaypoint {
                sequencing_action: Some(SequencingAction::TodReached),
                ..Self::on_mcdu(pseudo_waypoint)
            }),
        );

        new_pseudo_waypoints.extend(
            from_checkpoint(
                VerticalCheckpointReason::Decel,
                PWP_IDENT_DECEL,
                PwpSymbol::Decel,
            )
            .map(|pseudo_waypoint| PseudoWaypoint {
                sequencing_action: Some(SequencingAction::ApproachPhaseAutoEngage),
                ..Self::on_mcdu(pseudo_waypoint)
            }),
        );

        if config.emits_cda_flap_pseudo_waypoints() {
            new_pseudo_waypoints.extend(
                from_checkpoint(
                    VerticalCheckpointReason::Flaps1,
                    PWP_IDENT_FLAP1,
                    PwpSymbol::CdaFlap1,
                )
                .map(Self::on_mcdu),
            );
            new_pseudo_waypoints.extend(
                from_checkpoint(
                    VerticalCheckpointReason::Flaps2,
                    PWP_IDENT_FLAP2,
                    PwpSymbol::CdaFlap2,
                )
                .map(Self::on_mcdu),
            );
        }

        debug!(
            "Placed {} pseudo waypoints: {:?}",
            new_pseudo_waypoints.len(),
            new_pseudo_waypoints
                .iter()
                .map(|pseudo_waypoint| pseudo_waypoint.ident.as_str())
                .collect::<Vec<_>>()
        );

        self.pseudo_waypoints = new_pseudo_waypoints;
    }

    fn place(
        geometry: &Geometry,
        distance_from_end: f64,
        ident: &str,
        symbol: PwpSymbol,
        flight_plan_info: Option<PseudoWaypointFlightPlanInfo>,
    ) -> Option<PseudoWaypoint> {
        let placed = place_from_path_end(geometry, geometry.leg_count(), distance_from_end, ident)?;
        let leg = geometry.leg(placed.leg_index)?;

        Some(PseudoWaypoint {
            ident: ident.to_string(),
            along_leg_index: placed.leg_index,
            distance_from_leg_termination: placed.distance_from_leg_termination,
            symbol,
            coordinate: placed.coordinate,
            displayed_on_mcdu: false,
            mcdu_ident: None,
            mcdu_header: None,
            sequencing_action: None,
            stats: WaypointStats::compute(
                ident,
                leg,
                placed.distance_from_leg_termination,
                flight_plan_info.as_ref(),
            ),
            flight_plan_info,
        })
    }

    fn on_mcdu(pseudo_waypoint: PseudoWaypoint) -> PseudoWaypoint {
        PseudoWaypoint {
            displayed_on_mcdu: true,
            ..pseudo_waypoint
        }
    }

    /// Refreshes the list of pseudo waypoints still ahead.
    ///
    /// Returns the pseudo waypoints carrying a sequencing action that were
    /// passed since the previous call.
    pub fn update(&mut self, guidance: &GuidanceState) -> Vec<PseudoWaypoint> {
        let current = self
            .pseudo_waypoints
            .iter()
            .filter(|pseudo_waypoint| Self::is_ahead(pseudo_waypoint, guidance))
            .cloned()
            .collect::<Vec<_>>();

        let passed = self
            .current_pseudo_waypoints
            .iter()
            .filter(|previous| previous.sequencing_action.is_some())
            .filter_map(|previous| {
                self.pseudo_waypoints
                    .iter()
                    .find(|pseudo_waypoint| pseudo_waypoint.ident == previous.ident)
            })
            .filter(|pseudo_waypoint| {
                pseudo_waypoint.along_leg_index <= guidance.active_leg_index
                    && !current
                        .iter()
                        .any(|visible| visible.ident == pseudo_waypoint.ident)
            })
            .cloned()
            .collect::<Vec<_>>();

        self.current_pseudo_waypoints = current;
        passed
    }

    /// The previous leg is still considered active when the displays sequence
    /// a fixed radius transition later than guidance does.
    fn is_ahead(pseudo_waypoint: &PseudoWaypoint, guidance: &GuidanceState) -> bool {
        let active_leg_index = guidance.active_leg_index;
        let on_previous_leg = pseudo_waypoint.along_leg_index + 1 == active_leg_index;
        let on_active_leg = pseudo_waypoint.along_leg_index == active_leg_index;
        let after_active_leg = pseudo_waypoint.along_leg_index > active_leg_index;

        after_active_leg
            || (on_previous_leg
                && guidance.display_active_leg_complete_leg_path_dtg
                    > pseudo_waypoint.distance_from_leg_termination)
            || (on_active_leg
                && guidance.active_leg_complete_leg_path_dtg
                    > pseudo_waypoint.distance_from_leg_termination)
    }

    /// Emits the autoflight action of a pseudo waypoint that was just passed.
    ///
    /// Approach phase engagement is requested for five seconds; the revert is
    /// left to `scheduler`.
    pub fn sequence_pseudo_waypoint(
        &mut self,
        pseudo_waypoint: &PseudoWaypoint,
        environment: &EnvironmentSnapshot,
        scheduler: &mut dyn TaskScheduler<AutoflightAction>,
    ) -> Option<AutoflightAction> {
        info!("Pseudo-waypoint '{}' sequenced", pseudo_waypoint.ident);

        match pseudo_waypoint.sequencing_action? {
            SequencingAction::TodReached => Some(AutoflightAction::TopOfDescentReached),
            SequencingAction::ApproachPhaseAutoEngage => {
                let lateral_mode_allows = matches!(
                    environment.fma_lateral_mode,
                    LateralMode::Nav | LateralMode::LocCpt | LateralMode::LocTrack
                );
                if environment.altitude_above_ground >= APPROACH_PHASE_MAX_ALTITUDE_ABOVE_GROUND
                    || !lateral_mode_allows
                {
                    debug!(
                        "Approach phase not engaged: {:.0} ft AGL in {:?}",
                        environment.altitude_above_ground, environment.fma_lateral_mode
                    );
                    return None;
                }

                if let Some(token) = self.approach_phase_revert.take() {
                    scheduler.cancel(token);
                }
                self.approach_phase_revert = Some(scheduler.schedule(
                    AutoflightAction::SetApproachPhaseEnabled(false),
                    APPROACH_PHASE_REQUEST_DURATION,
                ));
                Some(AutoflightAction::SetApproachPhaseEnabled(true))
            }
        }
    }
}
