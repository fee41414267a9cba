// fmgc-vnav/src/vnav/descent_path_builder.rs

use super::checkpoint::{VerticalCheckpoint, VerticalCheckpointReason};
use super::geometry_profile::GeometryProfile;
use crate::common::FEET_TO_NAUTICAL_MILES;
use log::debug;
use std::f64::consts::PI;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TheoreticalDescentPathCharacteristics {
    /// Distance from start of the top of descent, when it could be placed.
    pub tod: Option<f64>,
}

pub struct DescentPathBuilder;

impl DescentPathBuilder {
    /// Back-solves the top of descent from the decel point on a constant
    /// flight path angle, in degrees.
    pub fn compute_descent_path(
        profile: &mut GeometryProfile,
        cruise_altitude: f64,
        flight_path_angle: f64,
        descent_speed: f64,
    ) -> TheoreticalDescentPathCharacteristics {
        let Some(decel) = profile
            .find_vertical_checkpoint(VerticalCheckpointReason::Decel)
            .copied()
        else {
            debug!("No decel checkpoint, no top of descent");
            return TheoreticalDescentPathCharacteristics { tod: None };
        };

        let tod = Self::top_of_descent_distance(
            decel.distance_from_start,
            decel.altitude,
            cruise_altitude,
            flight_path_angle,
        );
        debug!("T/D: {:.1} nm", tod);

        let Some(sample) = profile.estimate_at_distance(tod) else {
            return TheoreticalDescentPathCharacteristics { tod: None };
        };
        // The idle path ends where the approach takes over.
        profile.push_checkpoint(VerticalCheckpoint {
            reason: VerticalCheckpointReason::IdlePathEnd,
            ..decel
        });

        let mut checkpoint = sample.with(descent_speed, VerticalCheckpointReason::TopOfDescent);
        checkpoint.altitude = cruise_altitude;
        profile.push_checkpoint(checkpoint);

        TheoreticalDescentPathCharacteristics { tod: Some(tod) }
    }

    pub fn top_of_descent_distance(
        decel_distance: f64,
        decel_altitude: f64,
        cruise_altitude: f64,
        flight_path_angle: f64,
    ) -> f64 {
        let vertical_distance = cruise_altitude - decel_altitude;
        decel_distance
            - vertical_distance / libm::tan(flight_path_angle * PI / 180.) * FEET_TO_NAUTICAL_MILES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::test_utils::checkpoint;
    use approx::assert_abs_diff_eq;
    use std::rc::Rc;

    #[test]
    fn test_top_of_descent_formula() {
        let mut profile = GeometryProfile::new(Rc::new(Geometry::new()), 0., 0, false);
        profile.push_checkpoint(checkpoint(VerticalCheckpointReason::Liftoff, 0.6, 0.));
        profile.push_checkpoint(checkpoint(VerticalCheckpointReason::Decel, 50., 3000.));

        let result = DescentPathBuilder::compute_descent_path(&mut profile, 35000., 3., 290.);
        let expected = 50. - (32000. / (3f64.to_radians()).tan()) * 0.000164579;
        assert_abs_diff_eq!(result.tod.unwrap(), expected, epsilon = 1e-6);

        let top_of_descent = profile.last_checkpoint().unwrap();
        assert_eq!(top_of_descent.reason, VerticalCheckpointReason::TopOfDescent);
        assert_eq!(top_of_descent.altitude, 35000.);
        assert_eq!(top_of_descent.speed, 290.);
        assert_abs_diff_eq!(top_of_descent.distance_from_start, expected, epsilon = 1e-6);
    }

    #[test]
    fn test_idle_path_ends_at_decel() {
        let mut profile = GeometryProfile::new(Rc::new(Geometry::new()), 0., 0, false);
        profile.push_checkpoint(checkpoint(VerticalCheckpointReason::Liftoff, 0.6, 0.));
        profile.push_checkpoint(checkpoint(VerticalCheckpointReason::Decel, 50., 3000.));

        DescentPathBuilder::compute_descent_path(&mut profile, 35000., 3., 290.);
        let idle_path_end = profile
            .find_vertical_checkpoint(VerticalCheckpointReason::IdlePathEnd)
            .unwrap();
        assert_abs_diff_eq!(idle_path_end.distance_from_start, 50.);
        assert_abs_diff_eq!(idle_path_end.altitude, 3000.);
        assert_abs_diff_eq!(idle_path_end.seconds_from_present, 600.);
        assert_eq!(profile.checkpoints().len(), 4);
    }

    #[test]
    fn test_no_decel_is_a_no_op() {
        let mut profile = GeometryProfile::new(Rc::new(Geometry::new()), 0., 0, false);
        profile.push_checkpoint(checkpoint(VerticalCheckpointReason::TopOfClimb, 80., 35000.));

        let result = DescentPathBuilder::compute_descent_path(&mut profile, 35000., 3., 290.);
        assert_eq!(result.tod, None);
        assert_eq!(profile.checkpoints().len(), 1);
    }
}
