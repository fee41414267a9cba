// fmgc-vnav/src/geometry/transitions.rs

use super::geo::{intermediate_point, Coordinates};

pub trait Transition {
    /// Full length of the transition, in nm.
    fn distance(&self) -> f64;

    /// Fixed radius transitions are shared half and half by the legs they join.
    fn is_fixed_radius(&self) -> bool;

    /// Location `distance_before_terminator` nm before the end of the transition.
    fn get_pseudo_waypoint_location(&self, distance_before_terminator: f64) -> Option<Coordinates>;
}

/// Turn of constant radius flown across a fly-by fix.
#[derive(Clone, Debug)]
pub struct FixedRadiusTransition {
    entry: Coordinates,
    fix: Coordinates,
    exit: Coordinates,
    radius: f64,
    course_change: f64,
}

impl FixedRadiusTransition {
    /// `course_change` in degrees, sign gives the turn direction.
    pub fn new(
        entry: Coordinates,
        fix: Coordinates,
        exit: Coordinates,
        radius: f64,
        course_change: f64,
    ) -> Self {
        Self {
            entry,
            fix,
            exit,
            radius,
            course_change,
        }
    }

    /// Distance from the fix to the turn entry (and exit) along the legs.
    pub fn tangent_distance(radius: f64, course_change: f64) -> f64 {
        radius * (course_change.abs().to_radians() / 2.).tan()
    }
}

impl Transition for FixedRadiusTransition {
    fn distance(&self) -> f64 {
        self.radius * self.course_change.abs().to_radians()
    }

    fn is_fixed_radius(&self) -> bool {
        true
    }

    fn get_pseudo_waypoint_location(&self, distance_before_terminator: f64) -> Option<Coordinates> {
        let distance = self.distance();
        if distance_before_terminator < 0. || distance_before_terminator > distance {
            return None;
        }
        if distance <= 0. {
            return Some(self.exit);
        }

        // Quadratic curve with the fix as control point stays inside the turn.
        let t = 1. - distance_before_terminator / distance;
        let first = intermediate_point(&self.entry, &self.fix, t);
        let second = intermediate_point(&self.fix, &self.exit, t);
        Some(intermediate_point(&first, &second, t))
    }
}

/// Transition joining two legs that do not share a fix.
#[derive(Clone, Debug)]
pub struct PathCaptureTransition {
    from: Coordinates,
    to: Coordinates,
    distance: f64,
}

impl PathCaptureTransition {
    pub fn new(from: Coordinates, to: Coordinates, distance: f64) -> Self {
        Self { from, to, distance }
    }
}

impl Transition for PathCaptureTransition {
    fn distance(&self) -> f64 {
        self.distance
    }

    fn is_fixed_radius(&self) -> bool {
        false
    }

    fn get_pseudo_waypoint_location(&self, distance_before_terminator: f64) -> Option<Coordinates> {
        if distance_before_terminator < 0. || distance_before_terminator > self.distance {
            return None;
        }
        if self.distance <= 0. {
            return Some(self.to);
        }
        Some(intermediate_point(
            &self.to,
            &self.from,
            distance_before_terminator / self.distance,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_fixed_radius_distance() {
        let transition = FixedRadiusTransition::new(
            Coordinates::new(0., -0.1),
            Coordinates::new(0., 0.),
            Coordinates::new(0.1, 0.),
            2.,
            -90.,
        );
        assert_abs_diff_eq!(transition.distance(), std::f64::consts::PI, epsilon = 1e-12);
        assert!(transition.is_fixed_radius());
    }

    #[test]
    fn test_fixed_radius_location_endpoints() {
        let entry = Coordinates::new(0., -0.1);
        let exit = Coordinates::new(0.1, 0.);
        let transition = FixedRadiusTransition::new(entry, Coordinates::new(0., 0.), exit, 2., 90.);

        let end = transition.get_pseudo_waypoint_location(0.).unwrap();
        assert_abs_diff_eq!(end.lat, exit.lat, epsilon = 1e-9);
        assert_abs_diff_eq!(end.long, exit.long, epsilon = 1e-9);

        let start = transition
            .get_pseudo_waypoint_location(transition.distance())
            .unwrap();
        assert_abs_diff_eq!(start.lat, entry.lat, epsilon = 1e-9);
        assert_abs_diff_eq!(start.long, entry.long, epsilon = 1e-9);
    }

    #[test]
    fn test_tangent_distance() {
        assert_abs_diff_eq!(
            FixedRadiusTransition::tangent_distance(3., 90.),
            3.,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_path_capture_is_not_fixed_radius() {
        let transition =
            PathCaptureTransition::new(Coordinates::new(0., 0.), Coordinates::new(0., 1.), 60.);
        assert!(!transition.is_fixed_radius());
        assert!(transition.get_pseudo_waypoint_location(61.).is_none());
    }
}
