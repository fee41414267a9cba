// fmgc-vnav/src/pseudo_waypoints/placement.rs

use crate::geometry::{Coordinates, Geometry};
use log::{error, trace, warn};

/// Lateral position of a point given as a distance from the end of the path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedPosition {
    pub coordinate: Coordinates,
    pub distance_from_leg_termination: f64,
    pub leg_index: usize,
}

/// Walks the path backwards from its last leg to find the point
/// `distance_from_end` nm before its end.
///
/// Returns `None` for negative or NaN distances, for distances beyond the
/// start of the path, and when the segment holding the point cannot locate it.
pub fn place_from_path_end(
    path: &Geometry,
    leg_count: usize,
    distance_from_end: f64,
    label: &str,
) -> Option<PlacedPosition> {
    if distance_from_end.is_nan() || distance_from_end < 0. {
        warn!(
            "Distance from end for '{}' was negative or undefined: {}",
            label, distance_from_end
        );
        return None;
    }

    let total_path_length = path.total_path_length();
    if distance_from_end >= total_path_length {
        error!(
            "{:.2} nm is larger than the total lateral path of {:.2} nm ('{}')",
            distance_from_end, total_path_length, label
        );
        return None;
    }

    trace!(
        "Starting placement of '{}': dist: {:.2} nm",
        label,
        distance_from_end
    );

    let mut accumulator = 0.;
    for i in (0..leg_count).rev() {
        let Some(leg) = path.leg(i) else {
            continue;
        };

        let inbound = path.inbound_transition(i);
        let outbound = path.transition(i).filter(|transition| transition.is_fixed_radius());

        let [inbound_length, leg_part_length, outbound_length] =
            Geometry::complete_leg_path_lengths(leg, inbound, outbound);
        let total_leg_path_length = inbound_length + leg_part_length + outbound_length;
        accumulator += total_leg_path_length;

        trace!(
            "Trying to place '{}' {:.2} along leg #{}; inb: {:.2}, leg: {:.2}, outb: {:.2}, acc: {:.2}",
            label,
            distance_from_end,
            i,
            inbound_length,
            leg_part_length,
            outbound_length,
            accumulator
        );

        if accumulator <= distance_from_end {
            continue;
        }

        let distance_from_end_of_leg = distance_from_end - (accumulator - total_leg_path_length);

        let coordinate = if distance_from_end_of_leg < outbound_length {
            trace!("Placed '{}' on leg #{} outbound segment", label, i);
            outbound.and_then(|transition| {
                transition.get_pseudo_waypoint_location(
                    transition.distance() / 2. + distance_from_end_of_leg,
                )
            })
        } else if distance_from_end_of_leg < outbound_length + leg_part_length {
            trace!("Placed '{}' on leg #{} leg segment", label, i);
            leg.get_pseudo_waypoint_location(distance_from_end_of_leg - outbound_length)
        } else {
            trace!("Placed '{}' on leg #{} inbound segment", label, i);
            inbound.and_then(|transition| {
                transition.get_pseudo_waypoint_location(
                    distance_from_end_of_leg - outbound_length - leg_part_length,
                )
            })
        };

        if coordinate.is_none() {
            warn!("Segment of leg #{} could not locate '{}'", i, label);
        }

        return coordinate.map(|coordinate| PlacedPosition {
            coordinate,
            distance_from_leg_termination: distance_from_end_of_leg,
            leg_index: i,
        });
    }

    warn!(
        "'{}' lies before the first of the {} legs walked",
        label, leg_count
    );
    None
}
