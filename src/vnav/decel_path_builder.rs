// fmgc-vnav/src/vnav/decel_path_builder.rs

use super::checkpoint::VerticalCheckpointReason;
use super::geometry_profile::GeometryProfile;
use crate::common::FEET_TO_NAUTICAL_MILES;
use log::{debug, warn};
use std::f64::consts::PI;

const APPROACH_FLIGHT_PATH_ANGLE: f64 = 3.;

/// Approach configuration points as (reason, nm before end of path, speed).
const APPROACH_POINTS: [(VerticalCheckpointReason, f64, f64); 6] = [
    (VerticalCheckpointReason::Decel, 16., 250.),
    (VerticalCheckpointReason::Flaps1, 11., 210.),
    (VerticalCheckpointReason::Flaps2, 8., 185.),
    (VerticalCheckpointReason::Flaps3, 6.5, 165.),
    (VerticalCheckpointReason::FlapsFull, 5., 140.),
    (VerticalCheckpointReason::Landing, 0., 135.),
];

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DecelPathCharacteristics {
    pub decel: Option<f64>,
}

pub struct DecelPathBuilder;

impl DecelPathBuilder {
    /// Places the approach checkpoints back from the end of the path on a
    /// fixed slope above the destination elevation.
    pub fn compute_decel_path(
        profile: &mut GeometryProfile,
        destination_elevation: f64,
    ) -> DecelPathCharacteristics {
        let total_distance = profile.total_flight_plan_distance();
        let (_, decel_distance_before_end, _) = APPROACH_POINTS[0];
        if total_distance < decel_distance_before_end {
            warn!(
                "Path of {:.1} nm is too short for an approach, no decel point",
                total_distance
            );
            return DecelPathCharacteristics { decel: None };
        }

        for (reason, distance_before_end, speed) in APPROACH_POINTS {
            let distance_from_start = total_distance - distance_before_end;
            let Some(sample) = profile.estimate_at_distance(distance_from_start) else {
                debug!("Empty profile, no approach checkpoints");
                return DecelPathCharacteristics { decel: None };
            };

            let mut checkpoint = sample.with(speed, reason);
            checkpoint.altitude =
                destination_elevation + Self::height_above_threshold(distance_before_end);
            profile.push_checkpoint(checkpoint);
        }

        DecelPathCharacteristics {
            decel: Some(total_distance - decel_distance_before_end),
        }
    }

    fn height_above_threshold(distance_before_end: f64) -> f64 {
        distance_before_end / FEET_TO_NAUTICAL_MILES
            * libm::tan(APPROACH_FLIGHT_PATH_ANGLE * PI / 180.)
    }
}
