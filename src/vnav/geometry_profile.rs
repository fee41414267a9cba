// fmgc-vnav/src/vnav/geometry_profile.rs

use super::checkpoint::{
    MaxAltitudeConstraint, MaxSpeedConstraint, ProfileSample, PseudoWaypointFlightPlanInfo,
    VerticalCheckpoint, VerticalCheckpointReason, VerticalWaypointPrediction,
};
use crate::common::interpolate;
use crate::geometry::{
    AltitudeConstraint, AltitudeConstraintType, Geometry, SpeedConstraint, SpeedConstraintType,
};
use log::{debug, error};
use plotly::color::NamedColor;
use plotly::common::{Line, Marker, Mode};
use plotly::{Plot, Scatter};
use std::collections::BTreeMap;
use std::io::Write;
use std::rc::Rc;

/// Speed constraints at or below this value are defaults, not real restrictions.
const MIN_VALID_SPEED_CONSTRAINT: f64 = 100.;
const ALTITUDE_CONSTRAINT_TOLERANCE: f64 = 250.;
const SPEED_CONSTRAINT_TOLERANCE: f64 = 5.;

/// Vertical profile along a lateral geometry.
///
/// Built by the path builders during one computation pass, then frozen with
/// [`GeometryProfile::finalize_profile`]. Queries are only meaningful once
/// [`GeometryProfile::is_ready_to_display`] is set.
pub struct GeometryProfile {
    geometry: Rc<Geometry>,
    is_ready_to_display: bool,
    total_flight_plan_distance: f64,
    distance_to_present_position: f64,
    should_draw_pwp_along_nav_path: bool,
    checkpoints: Vec<VerticalCheckpoint>,
    max_altitude_constraints: Vec<MaxAltitudeConstraint>,
    max_speed_constraints: Vec<MaxSpeedConstraint>,
}

impl GeometryProfile {
    pub fn new(
        geometry: Rc<Geometry>,
        distance_to_active_waypoint: f64,
        active_leg_index: usize,
        should_draw_pwp_along_nav_path: bool,
    ) -> Self {
        let mut profile = Self {
            geometry,
            is_ready_to_display: false,
            total_flight_plan_distance: 0.,
            distance_to_present_position: 0.,
            should_draw_pwp_along_nav_path,
            checkpoints: Vec::new(),
            max_altitude_constraints: Vec::new(),
            max_speed_constraints: Vec::new(),
        };
        profile.extract_constraints(distance_to_active_waypoint, active_leg_index);

        debug!(
            "Altitude constraints: {:?}",
            profile.max_altitude_constraints
        );
        debug!("Speed constraints: {:?}", profile.max_speed_constraints);

        profile
    }

    /// Accumulates path lengths and builds the climb constraint envelopes.
    ///
    /// Only origin and departure legs contribute to the envelopes, and a
    /// constraint is only retained when it does not lower the envelope.
    pub fn extract_constraints(&mut self, distance_to_active_waypoint: f64, active_leg_index: usize) {
        self.total_flight_plan_distance = 0.;
        self.distance_to_present_position = -distance_to_active_waypoint;
        self.max_altitude_constraints.clear();
        self.max_speed_constraints.clear();

        let geometry = Rc::clone(&self.geometry);
        for (i, leg) in geometry.legs() {
            let leg_distance: f64 = geometry
                .leg_path_lengths(i)
                .map(|lengths| lengths.iter().sum())
                .unwrap_or(0.);
            self.total_flight_plan_distance += leg_distance;

            if i <= active_leg_index {
                self.distance_to_present_position += leg_distance;
            }

            if !leg.segment().is_origin_or_departure() {
                continue;
            }

            if let Some(constraint) = leg.altitude_constraint() {
                if constraint.constraint_type != AltitudeConstraintType::AtOrAbove {
                    let raises_envelope = self
                        .max_altitude_constraints
                        .last()
                        .map_or(true, |last| constraint.altitude1 >= last.max_altitude);
                    if raises_envelope {
                        self.max_altitude_constraints.push(MaxAltitudeConstraint {
                            distance_from_start: self.total_flight_plan_distance,
                            max_altitude: constraint.altitude1,
                        });
                    }
                }
            }

            if let Some(constraint) = leg.speed_constraint() {
                if constraint.speed > MIN_VALID_SPEED_CONSTRAINT
                    && constraint.constraint_type != SpeedConstraintType::AtOrAbove
                {
                    let raises_envelope = self
                        .max_speed_constraints
                        .last()
                        .map_or(true, |last| constraint.speed >= last.max_speed);
                    if raises_envelope {
                        self.max_speed_constraints.push(MaxSpeedConstraint {
                            distance_from_start: self.total_flight_plan_distance,
                            max_speed: constraint.speed,
                        });
                    }
                }
            }
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn is_ready_to_display(&self) -> bool {
        self.is_ready_to_display
    }

    pub fn total_flight_plan_distance(&self) -> f64 {
        self.total_flight_plan_distance
    }

    pub fn distance_to_present_position(&self) -> f64 {
        self.distance_to_present_position
    }

    pub fn should_draw_pwp_along_nav_path(&self) -> bool {
        self.should_draw_pwp_along_nav_path
    }

    pub fn checkpoints(&self) -> &[VerticalCheckpoint] {
        &self.checkpoints
    }

    pub fn max_altitude_constraints(&self) -> &[MaxAltitudeConstraint] {
        &self.max_altitude_constraints
    }

    pub fn max_speed_constraints(&self) -> &[MaxSpeedConstraint] {
        &self.max_speed_constraints
    }

    pub fn last_checkpoint(&self) -> Option<&VerticalCheckpoint> {
        self.checkpoints.last()
    }

    pub fn last_checkpoint_mut(&mut self) -> Option<&mut VerticalCheckpoint> {
        self.checkpoints.last_mut()
    }

    pub fn push_checkpoint(&mut self, checkpoint: VerticalCheckpoint) {
        self.checkpoints.push(checkpoint);
    }

    /// Appends a checkpoint derived from the current last one.
    ///
    /// Returns `false` when there is no checkpoint to derive from.
    pub fn add_checkpoint_from_last<F>(&mut self, builder: F) -> bool
    where
        F: FnOnce(&VerticalCheckpoint) -> VerticalCheckpoint,
    {
        match self.checkpoints.last() {
            Some(last) => {
                let checkpoint = builder(last);
                self.checkpoints.push(checkpoint);
                true
            }
            None => false,
        }
    }

    /// Inserts a checkpoint at `distance_from_start` with the given speed,
    /// interpolating everything else from its neighbours.
    pub fn add_speed_checkpoint(
        &mut self,
        distance_from_start: f64,
        speed: f64,
        reason: VerticalCheckpointReason,
    ) {
        let Some(sample) = self.interpolate_everything_from_start(distance_from_start) else {
            error!(
                "Cannot add speed checkpoint at {:.1} nm to an empty profile",
                distance_from_start
            );
            return;
        };
        let checkpoint = sample.with(speed, reason);

        if distance_from_start < self.checkpoints[0].distance_from_start {
            self.checkpoints.insert(0, checkpoint);
            return;
        }

        for i in 0..self.checkpoints.len() - 1 {
            if distance_from_start >= self.checkpoints[i].distance_from_start
                && distance_from_start < self.checkpoints[i + 1].distance_from_start
            {
                self.checkpoints.insert(i + 1, checkpoint);
                return;
            }
        }

        self.checkpoints.push(checkpoint);
    }

    /// Piecewise linear lookup of `value` against `key` over the checkpoints.
    ///
    /// Keys outside the covered range clamp to the nearest end.
    pub fn interpolate_from_checkpoints<K, V>(&self, index_value: f64, key: K, value: V) -> Option<f64>
    where
        K: Fn(&VerticalCheckpoint) -> f64,
        V: Fn(&VerticalCheckpoint) -> f64,
    {
        let first = self.checkpoints.first()?;
        if index_value < key(first) {
            return Some(value(first));
        }

        for pair in self.checkpoints.windows(2) {
            let (current, next) = (&pair[0], &pair[1]);
            if index_value >= key(current) && index_value < key(next) {
                return Some(interpolate(
                    index_value,
                    key(current),
                    key(next),
                    value(current),
                    value(next),
                ));
            }
        }

        self.checkpoints.last().map(value)
    }

    /// Predicted seconds from present at a distance along the path.
    pub fn interpolate_time_at_distance(&self, distance_from_start: f64) -> Option<f64> {
        self.interpolate_from_checkpoints(
            distance_from_start,
            |checkpoint| checkpoint.distance_from_start,
            |checkpoint| checkpoint.seconds_from_present,
        )
    }

    pub fn interpolate_altitude_at_distance(&self, distance_from_start: f64) -> Option<f64> {
        self.interpolate_from_checkpoints(
            distance_from_start,
            |checkpoint| checkpoint.distance_from_start,
            |checkpoint| checkpoint.altitude,
        )
    }

    pub fn interpolate_distance_at_time(&self, seconds_from_present: f64) -> Option<f64> {
        self.interpolate_from_checkpoints(
            seconds_from_present,
            |checkpoint| checkpoint.seconds_from_present,
            |checkpoint| checkpoint.distance_from_start,
        )
    }

    pub fn interpolate_everything_from_start(&self, distance_from_start: f64) -> Option<ProfileSample> {
        let by_distance = |checkpoint: &VerticalCheckpoint| checkpoint.distance_from_start;
        Some(ProfileSample {
            distance_from_start,
            seconds_from_present: self.interpolate_from_checkpoints(
                distance_from_start,
                by_distance,
                |checkpoint| checkpoint.seconds_from_present,
            )?,
            altitude: self.interpolate_from_checkpoints(
                distance_from_start,
                by_distance,
                |checkpoint| checkpoint.altitude,
            )?,
            remaining_fuel_on_board: self.interpolate_from_checkpoints(
                distance_from_start,
                by_distance,
                |checkpoint| checkpoint.remaining_fuel_on_board,
            )?,
        })
    }

    /// Time and fuel at a distance no builder integrated to.
    ///
    /// Anchors on the furthest checkpoint at or before `distance_from_start`,
    /// regardless of sequence order, and extrapolates time at its speed.
    pub fn estimate_at_distance(&self, distance_from_start: f64) -> Option<ProfileSample> {
        let anchor = self
            .checkpoints
            .iter()
            .filter(|checkpoint| checkpoint.distance_from_start <= distance_from_start)
            .max_by(|a, b| a.distance_from_start.total_cmp(&b.distance_from_start))
            .or_else(|| {
                self.checkpoints
                    .iter()
                    .min_by(|a, b| a.distance_from_start.total_cmp(&b.distance_from_start))
            })?;

        let ahead = (distance_from_start - anchor.distance_from_start).max(0.);
        let seconds_ahead = if anchor.speed > 0. {
            ahead / anchor.speed * 3600.
        } else {
            0.
        };

        Some(ProfileSample {
            distance_from_start,
            seconds_from_present: anchor.seconds_from_present + seconds_ahead,
            altitude: anchor.altitude,
            remaining_fuel_on_board: anchor.remaining_fuel_on_board,
        })
    }

    /// Speed target when reaching `distance_from_start`.
    pub fn find_speed_target(&self, distance_from_start: f64) -> Option<f64> {
        let last = self.checkpoints.last()?;

        // There is no speed change point upon reaching acceleration altitude.
        let start_index = self
            .checkpoints
            .iter()
            .position(|checkpoint| checkpoint.reason == VerticalCheckpointReason::AccelerationAltitude)
            .map_or(0, |index| index + 1)
            .min(self.checkpoints.len() - 1);

        if distance_from_start <= self.checkpoints[start_index].distance_from_start {
            return Some(self.checkpoints[start_index].speed);
        }

        for pair in self.checkpoints[start_index..].windows(2) {
            if distance_from_start > pair[0].distance_from_start
                && distance_from_start <= pair[1].distance_from_start
            {
                return Some(pair[1].speed);
            }
        }

        Some(last.speed)
    }

    /// Prediction `seconds_from_present` from now, or `None` past the end of the profile.
    pub fn predict_at_time(&self, seconds_from_present: f64) -> Option<PseudoWaypointFlightPlanInfo> {
        if seconds_from_present > self.checkpoints.last()?.seconds_from_present {
            return None;
        }
        let distance_from_start = self.interpolate_distance_at_time(seconds_from_present)?;
        Some(PseudoWaypointFlightPlanInfo {
            distance_from_start,
            seconds_from_present,
            altitude: self.interpolate_altitude_at_distance(distance_from_start)?,
            speed: self.find_speed_target(distance_from_start)?,
        })
    }

    fn has_speed_change(&self, distance_from_start: f64, max_speed: f64) -> bool {
        for pair in self.checkpoints.windows(2) {
            if distance_from_start >= pair[0].distance_from_start
                && distance_from_start < pair[1].distance_from_start
            {
                return pair[1].speed > max_speed;
            }
        }
        false
    }

    /// Predictions at the termination of every leg, keyed by leg index.
    pub fn compute_predictions_at_waypoints(&self) -> BTreeMap<usize, VerticalWaypointPrediction> {
        let mut predictions = BTreeMap::new();

        if !self.is_ready_to_display {
            return predictions;
        }

        let mut total_distance = 0.;
        for (i, leg) in self.geometry.legs() {
            total_distance += self
                .geometry
                .leg_path_lengths(i)
                .map(|lengths| lengths.iter().sum::<f64>())
                .unwrap_or(0.);

            let (Some(seconds_from_present), Some(altitude), Some(speed)) = (
                self.interpolate_time_at_distance(total_distance),
                self.interpolate_altitude_at_distance(total_distance),
                self.find_speed_target(total_distance),
            ) else {
                continue;
            };

            let altitude_constraint = leg.altitude_constraint().copied();
            let speed_constraint = leg.speed_constraint().copied();

            predictions.insert(
                i,
                VerticalWaypointPrediction {
                    waypoint_index: i,
                    distance_from_start: total_distance,
                    seconds_from_present,
                    altitude,
                    speed,
                    altitude_constraint,
                    speed_constraint,
                    is_altitude_constraint_met: Self::is_altitude_constraint_met(
                        altitude,
                        altitude_constraint.as_ref(),
                    ),
                    is_speed_constraint_met: Self::is_speed_constraint_met(
                        speed,
                        speed_constraint.as_ref(),
                    ),
                },
            );
        }

        predictions
    }

    /// First checkpoint with the given reason, in sequence order.
    pub fn find_vertical_checkpoint(
        &self,
        reason: VerticalCheckpointReason,
    ) -> Option<&VerticalCheckpoint> {
        self.checkpoints
            .iter()
            .find(|checkpoint| checkpoint.reason == reason)
    }

    /// Distance and speed where the speed limit altitude is crossed.
    pub fn find_speed_limit_crossing(&self) -> Option<(f64, f64)> {
        self.find_vertical_checkpoint(VerticalCheckpointReason::CrossingSpeedLimit)
            .map(|checkpoint| (checkpoint.distance_from_start, checkpoint.speed))
    }

    /// Distances from the end of the path at which speed is predicted to increase.
    ///
    /// Two independent heuristics: the speed limit crossing when the next leg
    /// is flown faster than the limit, and any waypoint speed constraint the
    /// next checkpoint exceeds.
    pub fn find_distances_from_end_to_speed_changes(&self) -> Vec<f64> {
        let mut result = Vec::new();

        let predictions = self.compute_predictions_at_waypoints();
        let speed_limit_crossing = self.find_speed_limit_crossing();
        if speed_limit_crossing.is_none() {
            debug!("No speed limit crossing found");
        }

        for (i, prediction) in &predictions {
            let Some(next) = predictions.get(&(i + 1)) else {
                continue;
            };

            if let Some((speed_limit_distance, speed_limit_speed)) = speed_limit_crossing {
                if prediction.distance_from_start < speed_limit_distance
                    && next.distance_from_start > speed_limit_distance
                    && speed_limit_speed < next.speed
                {
                    result.push(self.total_flight_plan_distance - speed_limit_distance);
                }
            }

            if let Some(constraint) = &prediction.speed_constraint {
                if constraint.speed > MIN_VALID_SPEED_CONSTRAINT
                    && self.has_speed_change(prediction.distance_from_start, constraint.speed)
                {
                    result.push(self.total_flight_plan_distance - prediction.distance_from_start);
                }
            }
        }

        result
    }

    pub fn is_altitude_constraint_met(altitude: f64, constraint: Option<&AltitudeConstraint>) -> bool {
        let Some(constraint) = constraint else {
            return true;
        };

        match constraint.constraint_type {
            AltitudeConstraintType::At => {
                (altitude - constraint.altitude1).abs() < ALTITUDE_CONSTRAINT_TOLERANCE
            }
            AltitudeConstraintType::AtOrAbove => {
                altitude - constraint.altitude1 > -ALTITUDE_CONSTRAINT_TOLERANCE
            }
            AltitudeConstraintType::AtOrBelow => {
                altitude - constraint.altitude1 < ALTITUDE_CONSTRAINT_TOLERANCE
            }
            AltitudeConstraintType::Range => match constraint.altitude2 {
                Some(lower) => {
                    altitude - lower > -ALTITUDE_CONSTRAINT_TOLERANCE
                        && altitude - constraint.altitude1 < ALTITUDE_CONSTRAINT_TOLERANCE
                }
                None => {
                    error!("Range altitude constraint without a lower bound: {:?}", constraint);
                    false
                }
            },
        }
    }

    pub fn is_speed_constraint_met(speed: f64, constraint: Option<&SpeedConstraint>) -> bool {
        let Some(constraint) = constraint else {
            return true;
        };

        match constraint.constraint_type {
            SpeedConstraintType::At => (speed - constraint.speed).abs() < SPEED_CONSTRAINT_TOLERANCE,
            SpeedConstraintType::AtOrBelow => speed - constraint.speed < SPEED_CONSTRAINT_TOLERANCE,
            SpeedConstraintType::AtOrAbove => speed - constraint.speed > -SPEED_CONSTRAINT_TOLERANCE,
        }
    }

    /// Sorts checkpoints by distance and releases the profile to consumers.
    pub fn finalize_profile(&mut self) {
        self.checkpoints
            .sort_by(|a, b| a.distance_from_start.total_cmp(&b.distance_from_start));

        self.is_ready_to_display = true;
    }

    pub fn write_checkpoints_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(writer);
        for checkpoint in &self.checkpoints {
            writer.serialize(checkpoint)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Altitude against distance from start.
    pub fn make_profile_plot(&self) -> Plot {
        let mut plot = Plot::new();
        let distances = self
            .checkpoints
            .iter()
            .map(|checkpoint| checkpoint.distance_from_start)
            .collect::<Vec<_>>();
        let altitudes = self
            .checkpoints
            .iter()
            .map(|checkpoint| checkpoint.altitude)
            .collect::<Vec<_>>();
        let trace = Scatter::new(distances, altitudes)
            .mode(Mode::LinesMarkers)
            .line(Line::new().color(NamedColor::Blue))
            .marker(Marker::new().color(NamedColor::Black));
        plot.add_trace(trace);
        plot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{checkpoint, FixedLengthLeg};
    use approx::assert_abs_diff_eq;

    fn departure_geometry(altitudes: &[f64]) -> Rc<Geometry> {
        let mut geometry = Geometry::new();
        for (i, &altitude) in altitudes.iter().enumerate() {
            geometry.add_leg(
                i,
                Box::new(FixedLengthLeg::new(10.).with_altitude(AltitudeConstraint {
                    constraint_type: AltitudeConstraintType::AtOrBelow,
                    altitude1: altitude,
                    altitude2: None,
                })),
            );
        }
        Rc::new(geometry)
    }

    fn profile_with(checkpoints: &[VerticalCheckpoint]) -> GeometryProfile {
        let mut profile = GeometryProfile::new(Rc::new(Geometry::new()), 0., 0, false);
        for &checkpoint in checkpoints {
            profile.push_checkpoint(checkpoint);
        }
        profile
    }

    #[test]
    fn test_altitude_envelope_is_monotonic() {
        let profile = GeometryProfile::new(departure_geometry(&[4000., 3000., 6000.]), 0., 0, true);
        let envelope = profile
            .max_altitude_constraints()
            .iter()
            .map(|constraint| (constraint.distance_from_start, constraint.max_altitude))
            .collect::<Vec<_>>();
        assert_eq!(envelope, vec![(10., 4000.), (30., 6000.)]);
        assert_abs_diff_eq!(profile.total_flight_plan_distance(), 30.);
    }

    #[test]
    fn test_envelope_ignores_at_or_above_and_enroute() {
        let mut geometry = Geometry::new();
        geometry
            .add_leg(
                0,
                Box::new(FixedLengthLeg::new(5.).with_altitude(AltitudeConstraint {
                    constraint_type: AltitudeConstraintType::AtOrAbove,
                    altitude1: 3000.,
                    altitude2: None,
                })),
            )
            .add_leg(
                1,
                Box::new(
                    FixedLengthLeg::new(5.)
                        .with_segment(crate::geometry::SegmentType::Enroute)
                        .with_altitude(AltitudeConstraint {
                            constraint_type: AltitudeConstraintType::At,
                            altitude1: 9000.,
                            altitude2: None,
                        }),
                ),
            );
        let profile = GeometryProfile::new(Rc::new(geometry), 0., 0, true);
        assert!(profile.max_altitude_constraints().is_empty());
    }

    #[test]
    fn test_speed_envelope_filters_default_values() {
        let mut geometry = Geometry::new();
        for (i, speed) in [90., 220., 210., 250.].into_iter().enumerate() {
            geometry.add_leg(
                i,
                Box::new(FixedLengthLeg::new(10.).with_speed(SpeedConstraint {
                    constraint_type: SpeedConstraintType::AtOrBelow,
                    speed,
                })),
            );
        }
        let profile = GeometryProfile::new(Rc::new(geometry), 0., 0, true);
        let speeds = profile
            .max_speed_constraints()
            .iter()
            .map(|constraint| constraint.max_speed)
            .collect::<Vec<_>>();
        assert_eq!(speeds, vec![220., 250.]);
    }

    #[test]
    fn test_distance_to_present_position() {
        let profile = GeometryProfile::new(departure_geometry(&[4000., 5000., 6000.]), 4., 1, true);
        assert_abs_diff_eq!(profile.distance_to_present_position(), 16.);
    }

    #[test]
    fn test_finalize_sorts_checkpoints() {
        let mut profile = profile_with(&[
            checkpoint(VerticalCheckpointReason::Liftoff, 0.6, 1000.),
            checkpoint(VerticalCheckpointReason::TopOfDescent, 120., 35000.),
            checkpoint(VerticalCheckpointReason::TopOfClimb, 80., 35000.),
            checkpoint(VerticalCheckpointReason::Decel, 150., 3000.),
        ]);
        assert!(!profile.is_ready_to_display());
        profile.finalize_profile();
        assert!(profile.is_ready_to_display());
        assert!(profile
            .checkpoints()
            .windows(2)
            .all(|pair| pair[0].distance_from_start <= pair[1].distance_from_start));
    }

    #[test]
    fn test_interpolation_exact_at_checkpoints() {
        let profile = profile_with(&[
            checkpoint(VerticalCheckpointReason::Liftoff, 0.6, 1000.),
            checkpoint(VerticalCheckpointReason::AtmosphericConditions, 5., 2500.),
            checkpoint(VerticalCheckpointReason::AtmosphericConditions, 9., 4000.),
            checkpoint(VerticalCheckpointReason::TopOfClimb, 80., 35000.),
        ]);
        for checkpoint in profile.checkpoints() {
            assert_eq!(
                profile.interpolate_altitude_at_distance(checkpoint.distance_from_start),
                Some(checkpoint.altitude)
            );
        }
    }

    #[test]
    fn test_interpolation_clamps_outside_range() {
        let profile = profile_with(&[
            checkpoint(VerticalCheckpointReason::Liftoff, 1., 1000.),
            checkpoint(VerticalCheckpointReason::TopOfClimb, 11., 11000.),
        ]);
        assert_eq!(profile.interpolate_altitude_at_distance(0.), Some(1000.));
        assert_eq!(profile.interpolate_altitude_at_distance(6.), Some(6000.));
        assert_eq!(profile.interpolate_altitude_at_distance(50.), Some(11000.));
        assert_eq!(profile_with(&[]).interpolate_altitude_at_distance(5.), None);
    }

    #[test]
    fn test_distance_at_time() {
        let mut first = checkpoint(VerticalCheckpointReason::PresentPosition, 0., 5000.);
        first.seconds_from_present = 0.;
        let mut second = checkpoint(VerticalCheckpointReason::TopOfClimb, 40., 35000.);
        second.seconds_from_present = 600.;
        let profile = profile_with(&[first, second]);
        assert_eq!(profile.interpolate_distance_at_time(300.), Some(20.));
    }

    #[test]
    fn test_add_speed_checkpoint_between_neighbours() {
        let mut profile = profile_with(&[
            checkpoint(VerticalCheckpointReason::Liftoff, 0., 1000.),
            checkpoint(VerticalCheckpointReason::AtmosphericConditions, 10., 5000.),
            checkpoint(VerticalCheckpointReason::TopOfClimb, 20., 9000.),
        ]);
        profile.add_speed_checkpoint(15., 220., VerticalCheckpointReason::SpeedConstraint);

        let inserted = &profile.checkpoints()[2];
        assert_eq!(inserted.reason, VerticalCheckpointReason::SpeedConstraint);
        assert_eq!(inserted.speed, 220.);
        assert_abs_diff_eq!(inserted.altitude, 7000.);
        assert_eq!(profile.checkpoints().len(), 4);
        assert!(profile
            .checkpoints()
            .windows(2)
            .all(|pair| pair[0].distance_from_start <= pair[1].distance_from_start));
    }

    #[test]
    fn test_add_speed_checkpoint_at_boundaries() {
        let mut profile = profile_with(&[
            checkpoint(VerticalCheckpointReason::Liftoff, 5., 1000.),
            checkpoint(VerticalCheckpointReason::TopOfClimb, 20., 9000.),
        ]);
        profile.add_speed_checkpoint(1., 180., VerticalCheckpointReason::SpeedConstraint);
        profile.add_speed_checkpoint(30., 300., VerticalCheckpointReason::SpeedConstraint);

        let checkpoints = profile.checkpoints();
        assert_eq!(checkpoints[0].distance_from_start, 1.);
        assert_eq!(checkpoints[0].altitude, 1000.);
        assert_eq!(checkpoints[3].distance_from_start, 30.);
        assert_eq!(checkpoints[3].altitude, 9000.);
    }

    #[test]
    fn test_add_checkpoint_from_last_overlays_fields() {
        let mut profile = profile_with(&[checkpoint(VerticalCheckpointReason::Liftoff, 0.6, 1000.)]);
        assert!(profile.add_checkpoint_from_last(|last| VerticalCheckpoint {
            reason: VerticalCheckpointReason::ThrustReductionAltitude,
            altitude: 1500.,
            ..*last
        }));
        let last = profile.last_checkpoint().unwrap();
        assert_eq!(last.altitude, 1500.);
        assert_eq!(last.distance_from_start, 0.6);

        assert!(!profile_with(&[]).add_checkpoint_from_last(|last| *last));
    }

    #[test]
    fn test_find_vertical_checkpoint_returns_first_match() {
        let profile = profile_with(&[
            checkpoint(VerticalCheckpointReason::ContinueClimb, 10., 5000.),
            checkpoint(VerticalCheckpointReason::ContinueClimb, 20., 7000.),
        ]);
        let found = profile
            .find_vertical_checkpoint(VerticalCheckpointReason::ContinueClimb)
            .unwrap();
        assert_eq!(found.distance_from_start, 10.);
        assert!(profile
            .find_vertical_checkpoint(VerticalCheckpointReason::TopOfDescent)
            .is_none());
    }

    #[test]
    fn test_find_speed_target_skips_acceleration_altitude() {
        let mut acceleration = checkpoint(VerticalCheckpointReason::AccelerationAltitude, 3., 1500.);
        acceleration.speed = 150.;
        let mut next = checkpoint(VerticalCheckpointReason::AtmosphericConditions, 8., 3000.);
        next.speed = 250.;
        let profile = profile_with(&[acceleration, next]);
        assert_eq!(profile.find_speed_target(1.), Some(250.));
        assert_eq!(profile.find_speed_target(100.), Some(250.));
    }

    #[test]
    fn test_altitude_constraint_tolerances() {
        let at = AltitudeConstraint {
            constraint_type: AltitudeConstraintType::At,
            altitude1: 5000.,
            altitude2: None,
        };
        assert!(GeometryProfile::is_altitude_constraint_met(5200., Some(&at)));
        assert!(!GeometryProfile::is_altitude_constraint_met(5300., Some(&at)));

        let range = AltitudeConstraint {
            constraint_type: AltitudeConstraintType::Range,
            altitude1: 8000.,
            altitude2: Some(6000.),
        };
        assert!(GeometryProfile::is_altitude_constraint_met(5800., Some(&range)));
        assert!(!GeometryProfile::is_altitude_constraint_met(5700., Some(&range)));
        assert!(!GeometryProfile::is_altitude_constraint_met(8300., Some(&range)));

        let broken_range = AltitudeConstraint {
            altitude2: None,
            ..range
        };
        assert!(!GeometryProfile::is_altitude_constraint_met(7000., Some(&broken_range)));
        assert!(GeometryProfile::is_altitude_constraint_met(7000., None));
    }

    #[test]
    fn test_speed_constraint_tolerances() {
        let below = SpeedConstraint {
            constraint_type: SpeedConstraintType::AtOrBelow,
            speed: 250.,
        };
        assert!(GeometryProfile::is_speed_constraint_met(254., Some(&below)));
        assert!(!GeometryProfile::is_speed_constraint_met(255., Some(&below)));

        let above = SpeedConstraint {
            constraint_type: SpeedConstraintType::AtOrAbove,
            speed: 250.,
        };
        assert!(GeometryProfile::is_speed_constraint_met(246., Some(&above)));
        assert!(!GeometryProfile::is_speed_constraint_met(245., Some(&above)));
    }

    #[test]
    fn test_estimate_at_distance_extrapolates_from_preceding_checkpoint() {
        let mut top_of_climb = checkpoint(VerticalCheckpointReason::TopOfClimb, 100., 35000.);
        top_of_climb.seconds_from_present = 1200.;
        top_of_climb.speed = 300.;
        let profile = profile_with(&[
            checkpoint(VerticalCheckpointReason::Liftoff, 0.6, 1000.),
            top_of_climb,
        ]);
        let sample = profile.estimate_at_distance(130.).unwrap();
        assert_abs_diff_eq!(sample.seconds_from_present, 1200. + 360.);
        assert_eq!(sample.remaining_fuel_on_board, top_of_climb.remaining_fuel_on_board);
    }

    fn at_speed(mut checkpoint: VerticalCheckpoint, speed: f64) -> VerticalCheckpoint {
        checkpoint.speed = speed;
        checkpoint
    }

    fn below(speed: f64) -> SpeedConstraint {
        SpeedConstraint {
            constraint_type: SpeedConstraintType::AtOrBelow,
            speed,
        }
    }

    fn finalized(geometry: Geometry, checkpoints: &[VerticalCheckpoint]) -> GeometryProfile {
        let mut profile = GeometryProfile::new(Rc::new(geometry), 0., 0, false);
        for &checkpoint in checkpoints {
            profile.push_checkpoint(checkpoint);
        }
        profile.finalize_profile();
        profile
    }

    #[test]
    fn test_predictions_at_waypoints() {
        let mut geometry = Geometry::new();
        geometry
            .add_leg(0, Box::new(FixedLengthLeg::new(10.)))
            .add_leg(1, Box::new(FixedLengthLeg::new(10.).with_speed(below(250.))))
            .add_leg(
                2,
                Box::new(FixedLengthLeg::new(10.).with_altitude(AltitudeConstraint {
                    constraint_type: AltitudeConstraintType::At,
                    altitude1: 9000.,
                    altitude2: None,
                })),
            );
        let profile = finalized(
            geometry,
            &[
                checkpoint(VerticalCheckpointReason::Liftoff, 0., 1000.),
                at_speed(checkpoint(VerticalCheckpointReason::SpeedConstraint, 15., 4000.), 250.),
                checkpoint(VerticalCheckpointReason::TopOfClimb, 40., 10000.),
            ],
        );

        let predictions = profile.compute_predictions_at_waypoints();
        assert_eq!(predictions.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);

        let first = &predictions[&0];
        assert_abs_diff_eq!(first.distance_from_start, 10.);
        assert_abs_diff_eq!(first.seconds_from_present, 120., epsilon = 1e-9);
        assert_abs_diff_eq!(first.altitude, 3000., epsilon = 1e-9);
        assert_eq!(first.speed, 250.);
        assert!(first.is_altitude_constraint_met && first.is_speed_constraint_met);

        let second = &predictions[&1];
        assert_abs_diff_eq!(second.seconds_from_present, 240., epsilon = 1e-9);
        assert_abs_diff_eq!(second.altitude, 5200., epsilon = 1e-9);
        assert_eq!(second.speed, 300.);
        assert!(!second.is_speed_constraint_met);

        let third = &predictions[&2];
        assert_abs_diff_eq!(third.altitude, 7600., epsilon = 1e-9);
        assert!(!third.is_altitude_constraint_met);
        assert!(third.is_speed_constraint_met);
    }

    #[test]
    fn test_no_predictions_before_finalize() {
        let mut geometry = Geometry::new();
        geometry.add_leg(0, Box::new(FixedLengthLeg::new(10.)));
        let mut profile = GeometryProfile::new(Rc::new(geometry), 0., 0, false);
        profile.push_checkpoint(checkpoint(VerticalCheckpointReason::Liftoff, 0., 1000.));
        assert!(profile.compute_predictions_at_waypoints().is_empty());
    }

    #[test]
    fn test_distances_to_speed_changes() {
        let mut geometry = Geometry::new();
        geometry
            .add_leg(0, Box::new(FixedLengthLeg::new(10.).with_speed(below(220.))))
            .add_leg(1, Box::new(FixedLengthLeg::new(10.).with_speed(below(90.))))
            .add_leg(2, Box::new(FixedLengthLeg::new(10.).with_speed(below(310.))))
            .add_leg(3, Box::new(FixedLengthLeg::new(10.)));
        let profile = finalized(
            geometry,
            &[
                at_speed(checkpoint(VerticalCheckpointReason::Liftoff, 0., 1000.), 180.),
                at_speed(checkpoint(VerticalCheckpointReason::AtmosphericConditions, 5., 3000.), 220.),
                at_speed(checkpoint(VerticalCheckpointReason::CrossingSpeedLimit, 25., 10000.), 250.),
                at_speed(checkpoint(VerticalCheckpointReason::TopOfClimb, 35., 14000.), 300.),
            ],
        );

        assert_eq!(profile.find_speed_limit_crossing(), Some((25., 250.)));
        // Leg 0 accelerates past its 220 kt constraint, then the speed limit
        // is crossed on leg 2. Leg 1 only carries a default value.
        assert_eq!(profile.find_distances_from_end_to_speed_changes(), vec![30., 15.]);
    }

    #[test]
    fn test_has_speed_change() {
        let profile = profile_with(&[
            at_speed(checkpoint(VerticalCheckpointReason::Liftoff, 0., 1000.), 180.),
            at_speed(checkpoint(VerticalCheckpointReason::SpeedConstraint, 10., 5000.), 250.),
            at_speed(checkpoint(VerticalCheckpointReason::TopOfClimb, 20., 9000.), 300.),
        ]);
        assert!(profile.has_speed_change(5., 220.));
        assert!(!profile.has_speed_change(5., 250.));
        assert!(profile.has_speed_change(10., 250.));
        assert!(!profile.has_speed_change(20., 100.));
        assert!(!profile.has_speed_change(-1., 100.));
    }

    #[test]
    fn test_csv_export_has_header_and_rows() {
        let profile = profile_with(&[
            checkpoint(VerticalCheckpointReason::Liftoff, 0.6, 1000.),
            checkpoint(VerticalCheckpointReason::TopOfClimb, 80., 35000.),
        ]);
        let mut buffer = Vec::new();
        profile.write_checkpoints_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("reason,distance_from_start"));
        assert!(lines[2].starts_with("TopOfClimb,80"));
    }
}
