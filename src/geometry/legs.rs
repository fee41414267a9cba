// fmgc-vnav/src/geometry/legs.rs

use super::geo::{distance_nm, intermediate_point, Coordinates};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentType {
    Origin,
    Departure,
    Enroute,
    Arrival,
    Approach,
    MissedApproach,
    Destination,
}

impl SegmentType {
    pub fn is_origin_or_departure(&self) -> bool {
        matches!(self, SegmentType::Origin | SegmentType::Departure)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AltitudeConstraintType {
    At,
    AtOrAbove,
    AtOrBelow,
    Range,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AltitudeConstraint {
    #[serde(rename = "type")]
    pub constraint_type: AltitudeConstraintType,
    pub altitude1: f64,
    /// Lower bound of a `Range` constraint.
    #[serde(default)]
    pub altitude2: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedConstraintType {
    At,
    AtOrAbove,
    AtOrBelow,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedConstraint {
    #[serde(rename = "type")]
    pub constraint_type: SpeedConstraintType,
    pub speed: f64,
}

/// A lateral leg as seen by vertical navigation.
pub trait Leg {
    fn ident(&self) -> &str;

    /// Length of the leg between its inbound and outbound transitions, in nm.
    fn distance(&self) -> f64;

    fn segment(&self) -> SegmentType;

    fn altitude_constraint(&self) -> Option<&AltitudeConstraint>;

    fn speed_constraint(&self) -> Option<&SpeedConstraint>;

    /// Location `distance_before_terminator` nm before the end of the leg.
    fn get_pseudo_waypoint_location(&self, distance_before_terminator: f64) -> Option<Coordinates>;
}

/// Track to fix leg flown along the great circle between two points.
///
/// `from` and `to` are the points where the leg meets its transitions, not
/// necessarily the fixes themselves.
#[derive(Clone, Debug)]
pub struct TfLeg {
    ident: String,
    from: Coordinates,
    to: Coordinates,
    segment: SegmentType,
    altitude_constraint: Option<AltitudeConstraint>,
    speed_constraint: Option<SpeedConstraint>,
}

impl TfLeg {
    pub fn new(ident: &str, from: Coordinates, to: Coordinates, segment: SegmentType) -> Self {
        Self {
            ident: ident.to_string(),
            from,
            to,
            segment,
            altitude_constraint: None,
            speed_constraint: None,
        }
    }

    pub fn with_altitude_constraint(mut self, constraint: Option<AltitudeConstraint>) -> Self {
        self.altitude_constraint = constraint;
        self
    }

    pub fn with_speed_constraint(mut self, constraint: Option<SpeedConstraint>) -> Self {
        self.speed_constraint = constraint;
        self
    }
}

impl Leg for TfLeg {
    fn ident(&self) -> &str {
        &self.ident
    }

    fn distance(&self) -> f64 {
        distance_nm(&self.from, &self.to)
    }

    fn segment(&self) -> SegmentType {
        self.segment
    }

    fn altitude_constraint(&self) -> Option<&AltitudeConstraint> {
        self.altitude_constraint.as_ref()
    }

    fn speed_constraint(&self) -> Option<&SpeedConstraint> {
        self.speed_constraint.as_ref()
    }

    fn get_pseudo_waypoint_location(&self, distance_before_terminator: f64) -> Option<Coordinates> {
        let distance = self.distance();
        if distance_before_terminator < 0. || distance_before_terminator > distance {
            return None;
        }
        if distance <= 0. {
            return Some(self.to);
        }
        Some(intermediate_point(
            &self.to,
            &self.from,
            distance_before_terminator / distance,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_tf_leg_location_measured_from_terminator() {
        let leg = TfLeg::new(
            "WPT01",
            Coordinates::new(0., 0.),
            Coordinates::new(0., 1.),
            SegmentType::Enroute,
        );
        let at_end = leg.get_pseudo_waypoint_location(0.).unwrap();
        assert_abs_diff_eq!(at_end.long, 1., epsilon = 1e-9);

        let quarter = leg.get_pseudo_waypoint_location(leg.distance() / 4.).unwrap();
        assert_abs_diff_eq!(quarter.long, 0.75, epsilon = 1e-9);

        assert!(leg.get_pseudo_waypoint_location(leg.distance() + 1.).is_none());
        assert!(leg.get_pseudo_waypoint_location(-0.5).is_none());
    }

    #[test]
    fn test_origin_and_departure_segments() {
        assert!(SegmentType::Origin.is_origin_or_departure());
        assert!(SegmentType::Departure.is_origin_or_departure());
        assert!(!SegmentType::Enroute.is_origin_or_departure());
    }
}
