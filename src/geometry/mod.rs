// fmgc-vnav/src/geometry/mod.rs

pub use geo::Coordinates;
pub use geometry::Geometry;
pub use legs::{
    AltitudeConstraint, AltitudeConstraintType, Leg, SegmentType, SpeedConstraint,
    SpeedConstraintType, TfLeg,
};
pub use transitions::{FixedRadiusTransition, PathCaptureTransition, Transition};

pub mod geo;
pub mod geometry;
pub mod legs;
pub mod transitions;
