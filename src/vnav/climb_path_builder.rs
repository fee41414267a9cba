// fmgc-vnav/src/vnav/climb_path_builder.rs

use super::checkpoint::{MaxAltitudeConstraint, VerticalCheckpoint, VerticalCheckpointReason};
use super::geometry_profile::GeometryProfile;
use crate::common::{FlapConf, TONS_TO_POUNDS};
use crate::parameters::{ComputationParameters, EnvironmentSnapshot, FlightPhase, VerticalMode};
use crate::physics::{
    AltitudeStepInput, AtmosphericConditions, EngineModel, LevelFlightStepInput, PerformanceModel,
    StepResults,
};
use log::{debug, trace};
use std::rc::Rc;

const CLIMB_STEP_SIZE: f64 = 1500.;
const LIFTOFF_DISTANCE: f64 = 0.6;
const LIFTOFF_SECONDS: f64 = 20.;

/// Vertical modes in which a live climb prediction is drawn.
const VERTICAL_MODES_TO_COMPUTE_PROFILE_FOR: [VerticalMode; 7] = [
    VerticalMode::Clb,
    VerticalMode::OpClb,
    VerticalMode::Vs,
    VerticalMode::AltCpt,
    VerticalMode::AltCstCpt,
    VerticalMode::AltCst,
    VerticalMode::Srs,
];

const VERTICAL_MODES_TO_APPLY_ALTITUDE_CONSTRAINTS_FOR: [VerticalMode; 4] = [
    VerticalMode::AltCpt,
    VerticalMode::AltCstCpt,
    VerticalMode::Clb,
    VerticalMode::AltCst,
];

/// Forward integrator from liftoff or present position to top of climb.
pub struct ClimbPathBuilder {
    atmospheric_conditions: AtmosphericConditions,
    model: Rc<dyn PerformanceModel>,
}

impl ClimbPathBuilder {
    pub fn new(model: Rc<dyn PerformanceModel>) -> Self {
        Self {
            atmospheric_conditions: AtmosphericConditions::default(),
            model,
        }
    }

    pub fn update(&mut self, environment: &EnvironmentSnapshot) {
        self.atmospheric_conditions.update(environment);
    }

    pub fn compute_climb_path(
        &self,
        profile: &mut GeometryProfile,
        parameters: &ComputationParameters,
        environment: &EnvironmentSnapshot,
    ) {
        if environment.on_ground {
            self.compute_preflight_prediction(profile, parameters, environment);
            return;
        }

        if VERTICAL_MODES_TO_COMPUTE_PROFILE_FOR.contains(&parameters.fcu_vertical_mode) {
            self.compute_live_prediction(profile, parameters, environment);
        } else {
            debug!(
                "No climb prediction in vertical mode {:?}",
                parameters.fcu_vertical_mode
            );
        }
    }

    pub fn compute_preflight_prediction(
        &self,
        profile: &mut GeometryProfile,
        parameters: &ComputationParameters,
        environment: &EnvironmentSnapshot,
    ) {
        self.add_takeoff_roll_checkpoint(profile, parameters);
        self.add_takeoff_step_checkpoint(profile, parameters, environment);
        self.add_acceleration_altitude_step(profile, parameters);

        let altitude_constraints = Self::altitude_constraints_for_vertical_mode(profile, parameters, environment);
        if let Some(limit) = parameters.speed_limit {
            if limit.under_altitude > parameters.acceleration_altitude
                && limit.under_altitude < parameters.cruise_altitude
            {
                self.add_climb_steps(
                    profile,
                    parameters,
                    &altitude_constraints,
                    limit.under_altitude,
                    VerticalCheckpointReason::CrossingSpeedLimit,
                );
            }
        }

        self.add_climb_steps(
            profile,
            parameters,
            &altitude_constraints,
            parameters.cruise_altitude,
            VerticalCheckpointReason::TopOfClimb,
        );
        Self::add_speed_constraints_as_checkpoints(profile);
    }

    /// Climb thrust all the way to top of climb, regardless of thrust reduction
    /// and acceleration altitudes.
    pub fn compute_live_prediction(
        &self,
        profile: &mut GeometryProfile,
        parameters: &ComputationParameters,
        environment: &EnvironmentSnapshot,
    ) {
        let present_altitude = parameters.present_position.alt;
        Self::add_present_position_checkpoint(profile, parameters, environment);

        let altitude_constraints = Self::altitude_constraints_for_vertical_mode(profile, parameters, environment);
        if let Some(limit) = parameters.speed_limit {
            if limit.under_altitude > present_altitude && limit.under_altitude < parameters.cruise_altitude {
                self.add_climb_steps(
                    profile,
                    parameters,
                    &altitude_constraints,
                    limit.under_altitude,
                    VerticalCheckpointReason::CrossingSpeedLimit,
                );
            }
        }

        self.add_climb_steps(
            profile,
            parameters,
            &altitude_constraints,
            parameters.cruise_altitude,
            VerticalCheckpointReason::TopOfClimb,
        );
        Self::add_speed_constraints_as_checkpoints(profile);
    }

    fn add_present_position_checkpoint(
        profile: &mut GeometryProfile,
        parameters: &ComputationParameters,
        environment: &EnvironmentSnapshot,
    ) {
        let distance_from_start = if profile.should_draw_pwp_along_nav_path() {
            profile.distance_to_present_position()
        } else {
            0.
        };

        profile.push_checkpoint(VerticalCheckpoint {
            reason: VerticalCheckpointReason::PresentPosition,
            distance_from_start,
            seconds_from_present: 0.,
            altitude: parameters.present_position.alt,
            speed: environment.indicated_airspeed,
            remaining_fuel_on_board: parameters.fuel_on_board * TONS_TO_POUNDS,
        });
    }

    fn add_takeoff_roll_checkpoint(&self, profile: &mut GeometryProfile, parameters: &ComputationParameters) {
        profile.push_checkpoint(VerticalCheckpoint {
            reason: VerticalCheckpointReason::Liftoff,
            distance_from_start: LIFTOFF_DISTANCE,
            seconds_from_present: LIFTOFF_SECONDS,
            altitude: parameters.origin_airfield_elevation,
            speed: parameters.v2_speed + 10.,
            remaining_fuel_on_board: parameters.fuel_on_board * TONS_TO_POUNDS,
        });
    }

    fn add_takeoff_step_checkpoint(
        &self,
        profile: &mut GeometryProfile,
        parameters: &ComputationParameters,
        environment: &EnvironmentSnapshot,
    ) {
        let ground_altitude = parameters.origin_airfield_elevation;
        let thrust_reduction_altitude = parameters.thrust_reduction_altitude;
        let speed = parameters.v2_speed + 10.;
        let midway_altitude = (thrust_reduction_altitude + ground_altitude) / 2.;
        let mach = self
            .atmospheric_conditions
            .compute_mach_from_cas(midway_altitude, speed);

        let model = Rc::clone(&self.model);
        profile.add_checkpoint_from_last(|last| {
            let step = model.altitude_step(&AltitudeStepInput {
                initial_altitude: ground_altitude,
                step_size: thrust_reduction_altitude - ground_altitude,
                econ_cas: speed,
                econ_mach: mach,
                commanded_n1: environment.toga_thrust_limit,
                zero_fuel_weight: parameters.zero_fuel_weight * TONS_TO_POUNDS,
                initial_fuel_weight: last.remaining_fuel_on_board,
                head_wind: 0.,
                isa_deviation: self.atmospheric_conditions.isa_deviation(),
                tropopause: parameters.tropopause,
                speedbrakes_extended: false,
                flap_config: environment.takeoff_flaps,
                perf_factor: parameters.perf_factor,
            });
            Self::advance(last, &step, VerticalCheckpointReason::ThrustReductionAltitude, thrust_reduction_altitude, speed)
        });
    }

    fn add_acceleration_altitude_step(&self, profile: &mut GeometryProfile, parameters: &ComputationParameters) {
        let speed = parameters.v2_speed + 10.;
        profile.add_checkpoint_from_last(|last| {
            let step = self.compute_climb_segment_prediction(
                parameters,
                parameters.thrust_reduction_altitude,
                parameters.acceleration_altitude,
                speed,
                last.remaining_fuel_on_board,
            );
            Self::advance(
                last,
                &step,
                VerticalCheckpointReason::AccelerationAltitude,
                parameters.acceleration_altitude,
                speed,
            )
        });
    }

    /// Climbs to `final_altitude` through the altitude constraint envelope.
    fn add_climb_steps(
        &self,
        profile: &mut GeometryProfile,
        parameters: &ComputationParameters,
        altitude_constraints: &[MaxAltitudeConstraint],
        final_altitude: f64,
        final_altitude_reason: VerticalCheckpointReason,
    ) {
        for constraint in altitude_constraints {
            if constraint.max_altitude >= final_altitude {
                break;
            }

            let Some(last_altitude) = profile.last_checkpoint().map(|last| last.altitude) else {
                return;
            };

            if constraint.max_altitude > last_altitude {
                Self::continue_climb(profile);
                self.build_iterated_climb_segment(profile, parameters, last_altitude, constraint.max_altitude);

                // Reached the constraint altitude before its waypoint.
                if let Some(last) = profile.last_checkpoint_mut() {
                    if last.distance_from_start < constraint.distance_from_start {
                        last.reason = VerticalCheckpointReason::LevelOffForConstraint;
                        self.add_level_segment_steps(profile, parameters, constraint.distance_from_start);
                    }
                }
            } else if (last_altitude - constraint.max_altitude).abs() < 1. {
                self.add_level_segment_steps(profile, parameters, constraint.distance_from_start);
            }
        }

        Self::continue_climb(profile);

        let Some(last_altitude) = profile.last_checkpoint().map(|last| last.altitude) else {
            return;
        };
        self.build_iterated_climb_segment(profile, parameters, last_altitude, final_altitude);
        if let Some(last) = profile.last_checkpoint_mut() {
            last.reason = final_altitude_reason;
        }
    }

    fn continue_climb(profile: &mut GeometryProfile) {
        if let Some(last) = profile.last_checkpoint_mut() {
            if last.reason == VerticalCheckpointReason::WaypointWithConstraint {
                last.reason = VerticalCheckpointReason::ContinueClimb;
            }
        }
    }

    fn build_iterated_climb_segment(
        &self,
        profile: &mut GeometryProfile,
        parameters: &ComputationParameters,
        starting_altitude: f64,
        target_altitude: f64,
    ) {
        let mut altitude = starting_altitude;
        while altitude < target_altitude {
            let Some(last) = profile.last_checkpoint().copied() else {
                return;
            };

            let speed_target = parameters.climb_speed_at(altitude);
            let climb_speed = speed_target.min(last.speed);
            let segment_target_altitude = (altitude + CLIMB_STEP_SIZE).min(target_altitude);

            let step = self.compute_climb_segment_prediction(
                parameters,
                altitude,
                segment_target_altitude,
                climb_speed,
                last.remaining_fuel_on_board,
            );
            let distance_from_start = last.distance_from_start + step.distance_traveled;
            let speed = speed_target.min(Self::find_max_speed_at_distance_along_track(profile, distance_from_start));

            trace!(
                "Climb step {:.0} -> {:.0} ft over {:.2} nm",
                altitude,
                segment_target_altitude,
                step.distance_traveled
            );

            profile.push_checkpoint(Self::advance(
                &last,
                &step,
                VerticalCheckpointReason::AtmosphericConditions,
                segment_target_altitude,
                speed,
            ));

            altitude = segment_target_altitude;
        }
    }

    /// Level flight to `to_distance_from_start`, with one checkpoint per speed
    /// constraint crossed on the way.
    fn add_level_segment_steps(
        &self,
        profile: &mut GeometryProfile,
        parameters: &ComputationParameters,
        to_distance_from_start: f64,
    ) {
        let Some(altitude) = profile.last_checkpoint().map(|last| last.altitude) else {
            return;
        };
        let speed_target = parameters.climb_speed_at(altitude);

        let speed_constraints = profile.max_speed_constraints().to_vec();
        for constraint in speed_constraints {
            let Some(last) = profile.last_checkpoint().copied() else {
                return;
            };
            if last.distance_from_start >= constraint.distance_from_start
                || to_distance_from_start <= constraint.distance_from_start
            {
                continue;
            }

            let speed = speed_target.min(constraint.max_speed);
            profile.push_checkpoint(self.level_flight_checkpoint(
                parameters,
                &last,
                constraint.distance_from_start,
                speed,
            ));
        }

        if let Some(last) = profile.last_checkpoint().copied() {
            profile.push_checkpoint(self.level_flight_checkpoint(
                parameters,
                &last,
                to_distance_from_start,
                speed_target,
            ));
        }
    }

    fn level_flight_checkpoint(
        &self,
        parameters: &ComputationParameters,
        last: &VerticalCheckpoint,
        distance_from_start: f64,
        speed: f64,
    ) -> VerticalCheckpoint {
        let step = self.model.level_flight_step(&LevelFlightStepInput {
            altitude: last.altitude,
            step_size: distance_from_start - last.distance_from_start,
            econ_cas: speed,
            econ_mach: self
                .atmospheric_conditions
                .compute_mach_from_cas(last.altitude, speed),
            zero_fuel_weight: parameters.zero_fuel_weight * TONS_TO_POUNDS,
            initial_fuel_weight: last.remaining_fuel_on_board,
            head_wind: 0.,
            isa_deviation: self.atmospheric_conditions.isa_deviation(),
        });

        VerticalCheckpoint {
            reason: VerticalCheckpointReason::WaypointWithConstraint,
            distance_from_start,
            seconds_from_present: last.seconds_from_present + step.time_elapsed * 60.,
            altitude: last.altitude,
            speed,
            remaining_fuel_on_board: last.remaining_fuel_on_board - step.fuel_burned,
        }
    }

    /// One climb step evaluated at the midway altitude.
    fn compute_climb_segment_prediction(
        &self,
        parameters: &ComputationParameters,
        starting_altitude: f64,
        target_altitude: f64,
        climb_speed: f64,
        remaining_fuel_on_board: f64,
    ) -> StepResults {
        let midway_altitude = (starting_altitude + target_altitude) / 2.;
        let mach = self
            .atmospheric_conditions
            .compute_mach_from_cas(midway_altitude, climb_speed);
        let estimated_tat = self
            .atmospheric_conditions
            .total_air_temperature_from_mach(midway_altitude, mach);
        let predicted_n1 = EngineModel::climb_thrust_n1_limit(estimated_tat, midway_altitude);

        self.model.altitude_step(&AltitudeStepInput {
            initial_altitude: starting_altitude,
            step_size: target_altitude - starting_altitude,
            econ_cas: climb_speed,
            econ_mach: mach,
            commanded_n1: predicted_n1,
            zero_fuel_weight: parameters.zero_fuel_weight * TONS_TO_POUNDS,
            initial_fuel_weight: remaining_fuel_on_board,
            head_wind: 0.,
            isa_deviation: self.atmospheric_conditions.isa_deviation(),
            tropopause: parameters.tropopause,
            speedbrakes_extended: false,
            flap_config: FlapConf::Clean,
            perf_factor: parameters.perf_factor,
        })
    }

    fn advance(
        last: &VerticalCheckpoint,
        step: &StepResults,
        reason: VerticalCheckpointReason,
        altitude: f64,
        speed: f64,
    ) -> VerticalCheckpoint {
        VerticalCheckpoint {
            reason,
            distance_from_start: last.distance_from_start + step.distance_traveled,
            seconds_from_present: last.seconds_from_present + step.time_elapsed * 60.,
            altitude,
            speed,
            remaining_fuel_on_board: last.remaining_fuel_on_board - step.fuel_burned,
        }
    }

    /// Lowest speed constraint at or beyond `distance_along_track`.
    pub fn find_max_speed_at_distance_along_track(profile: &GeometryProfile, distance_along_track: f64) -> f64 {
        profile
            .max_speed_constraints()
            .iter()
            .filter(|constraint| distance_along_track <= constraint.distance_from_start)
            .map(|constraint| constraint.max_speed)
            .fold(f64::INFINITY, f64::min)
    }

    fn add_speed_constraints_as_checkpoints(profile: &mut GeometryProfile) {
        let speed_constraints = profile.max_speed_constraints().to_vec();
        for constraint in speed_constraints {
            profile.add_speed_checkpoint(
                constraint.distance_from_start,
                constraint.max_speed,
                VerticalCheckpointReason::SpeedConstraint,
            );
        }
    }

    fn altitude_constraints_for_vertical_mode(
        profile: &GeometryProfile,
        parameters: &ComputationParameters,
        environment: &EnvironmentSnapshot,
    ) -> Vec<MaxAltitudeConstraint> {
        if environment.on_ground
            || parameters.flight_phase == FlightPhase::Preflight
            || VERTICAL_MODES_TO_APPLY_ALTITUDE_CONSTRAINTS_FOR.contains(&parameters.fcu_vertical_mode)
        {
            profile.max_altitude_constraints().to_vec()
        } else {
            Vec::new()
        }
    }
}
