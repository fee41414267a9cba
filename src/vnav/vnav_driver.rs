// fmgc-vnav/src/vnav/vnav_driver.rs

use super::checkpoint::PseudoWaypointFlightPlanInfo;
use super::climb_path_builder::ClimbPathBuilder;
use super::decel_path_builder::{DecelPathBuilder, DecelPathCharacteristics};
use super::descent_path_builder::{DescentPathBuilder, TheoreticalDescentPathCharacteristics};
use super::errors::ProfileComputationError;
use super::geometry_profile::GeometryProfile;
use crate::config::VnavConfig;
use crate::geometry::Geometry;
use crate::parameters::{GuidanceSnapshot, LateralMode};
use crate::physics::PerformanceModel;
use crate::pseudo_waypoints::{AutoflightAction, PseudoWaypoints};
use crate::scheduler::TaskScheduler;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Instant;

const SECONDS_PER_DAY: f64 = 86_400.;

/// Owns the current vertical profile and the pseudo waypoints placed from it.
///
/// A profile is only ever replaced whole, after it was finalized. When a
/// recomputation cannot run the previous profile stays current.
pub struct VnavDriver {
    config: VnavConfig,
    climb_path_builder: ClimbPathBuilder,
    active_geometry: Option<Rc<Geometry>>,
    current_geometry_profile: Option<Rc<GeometryProfile>>,
    current_descent_profile: TheoreticalDescentPathCharacteristics,
    current_approach_profile: DecelPathCharacteristics,
    /// Zulu time at which the current profile was computed.
    profile_computed_at: f64,
    last_cruise_altitude: f64,
    time_markers: BTreeMap<u32, Option<PseudoWaypointFlightPlanInfo>>,
    pseudo_waypoints: PseudoWaypoints,
}

impl VnavDriver {
    pub fn new(config: VnavConfig, model: Rc<dyn PerformanceModel>) -> Self {
        let time_markers = config
            .time_markers
            .iter()
            .map(|&time| (time, None))
            .collect();
        info!("VnavDriver initialized");

        Self {
            config,
            climb_path_builder: ClimbPathBuilder::new(model),
            active_geometry: None,
            current_geometry_profile: None,
            current_descent_profile: TheoreticalDescentPathCharacteristics::default(),
            current_approach_profile: DecelPathCharacteristics::default(),
            profile_computed_at: 0.,
            last_cruise_altitude: 0.,
            time_markers,
            pseudo_waypoints: PseudoWaypoints::new(),
        }
    }

    pub fn config(&self) -> &VnavConfig {
        &self.config
    }

    pub fn current_geometry_profile(&self) -> Option<Rc<GeometryProfile>> {
        self.current_geometry_profile.clone()
    }

    pub fn current_descent_profile(&self) -> TheoreticalDescentPathCharacteristics {
        self.current_descent_profile
    }

    pub fn current_approach_profile(&self) -> DecelPathCharacteristics {
        self.current_approach_profile
    }

    pub fn time_markers(&self) -> &BTreeMap<u32, Option<PseudoWaypointFlightPlanInfo>> {
        &self.time_markers
    }

    pub fn pseudo_waypoints(&self) -> &PseudoWaypoints {
        &self.pseudo_waypoints
    }

    /// New lateral path: always recomputes.
    pub fn accept_multiple_leg_geometry(&mut self, geometry: Rc<Geometry>, snapshot: &GuidanceSnapshot) {
        self.climb_path_builder.update(&snapshot.environment);
        self.active_geometry = Some(geometry);
        self.recompute(snapshot);
    }

    /// Per-frame update.
    ///
    /// Recomputes when the cruise altitude changed, refreshes the time markers
    /// and the visible pseudo waypoints, and returns the autoflight actions of
    /// the pseudo waypoints passed since the previous frame.
    pub fn update(
        &mut self,
        snapshot: &GuidanceSnapshot,
        scheduler: &mut dyn TaskScheduler<AutoflightAction>,
    ) -> Vec<AutoflightAction> {
        let new_cruise_altitude = snapshot.parameters.cruise_altitude;
        if new_cruise_altitude != self.last_cruise_altitude {
            self.last_cruise_altitude = new_cruise_altitude;
            if self.config.debug_profile {
                debug!("Computing new vertical profile because of new cruise altitude");
            }
            self.recompute(snapshot);
        }

        self.update_time_markers(snapshot.environment.zulu_time);

        let passed = self.pseudo_waypoints.update(&snapshot.guidance);
        passed
            .iter()
            .filter_map(|pseudo_waypoint| {
                self.pseudo_waypoints.sequence_pseudo_waypoint(
                    pseudo_waypoint,
                    &snapshot.environment,
                    scheduler,
                )
            })
            .collect()
    }

    fn update_time_markers(&mut self, zulu_time: f64) {
        let Some(profile) = &self.current_geometry_profile else {
            return;
        };
        if !profile.is_ready_to_display() {
            return;
        }

        let mut elapsed = zulu_time - self.profile_computed_at;
        if elapsed < 0. {
            elapsed += SECONDS_PER_DAY;
        }

        for (&time, prediction) in self.time_markers.iter_mut() {
            *prediction = profile.predict_at_time(elapsed + f64::from(time));
        }
    }

    fn recompute(&mut self, snapshot: &GuidanceSnapshot) {
        let Some(geometry) = self.active_geometry.clone() else {
            debug!("No lateral geometry yet");
            return;
        };

        let start = Instant::now();
        match self.compute_vertical_profile(&geometry, snapshot) {
            Ok((profile, descent, approach)) => {
                debug!(
                    "Vertical profile computed in {}",
                    humantime::format_duration(start.elapsed())
                );
                if self.config.debug_profile {
                    debug!("{:#?}", profile.checkpoints());
                }

                self.current_geometry_profile = Some(Rc::new(profile));
                self.current_descent_profile = descent;
                self.current_approach_profile = approach;
                self.profile_computed_at = snapshot.environment.zulu_time;
                self.update_time_markers(snapshot.environment.zulu_time);

                if let Some(profile) = &self.current_geometry_profile {
                    self.pseudo_waypoints.recompute(
                        profile,
                        &self.time_markers,
                        self.profile_computed_at,
                        &self.config,
                    );
                }
            }
            Err(err) => {
                warn!("Did not compute vertical profile. Reason: {}", err);
            }
        }
    }

    /// One complete computation pass over an immutable snapshot.
    pub fn compute_vertical_profile(
        &self,
        geometry: &Rc<Geometry>,
        snapshot: &GuidanceSnapshot,
    ) -> Result<
        (
            GeometryProfile,
            TheoreticalDescentPathCharacteristics,
            DecelPathCharacteristics,
        ),
        ProfileComputationError,
    > {
        if geometry.is_empty() {
            return Err(ProfileComputationError::NoLegs);
        }
        let parameters = &snapshot.parameters;
        parameters.can_compute_profile()?;

        info!("Computing vertical profile over {} legs", geometry.leg_count());

        let mut profile = GeometryProfile::new(
            Rc::clone(geometry),
            snapshot.guidance.distance_to_active_waypoint,
            snapshot.guidance.active_leg_index,
            parameters.fcu_lateral_mode == LateralMode::Nav,
        );

        self.climb_path_builder
            .compute_climb_path(&mut profile, parameters, &snapshot.environment);

        let approach = DecelPathBuilder::compute_decel_path(
            &mut profile,
            parameters.destination_airfield_elevation,
        );
        let descent = DescentPathBuilder::compute_descent_path(
            &mut profile,
            parameters.cruise_altitude,
            self.config.descent_flight_path_angle,
            self.config.descent_speed,
        );

        profile.finalize_profile();

        Ok((profile, descent, approach))
    }
}
