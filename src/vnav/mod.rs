// fmgc-vnav/src/vnav/mod.rs

mod checkpoint;
mod climb_path_builder;
mod decel_path_builder;
mod descent_path_builder;
mod errors;
mod geometry_profile;
mod vnav_driver;

pub use checkpoint::{
    MaxAltitudeConstraint, MaxSpeedConstraint, ProfileSample, PseudoWaypointFlightPlanInfo,
    VerticalCheckpoint, VerticalCheckpointReason, VerticalWaypointPrediction,
};
pub use climb_path_builder::ClimbPathBuilder;
pub use decel_path_builder::{DecelPathBuilder, DecelPathCharacteristics};
pub use descent_path_builder::{DescentPathBuilder, TheoreticalDescentPathCharacteristics};
pub use errors::ProfileComputationError;
pub use geometry_profile::GeometryProfile;
pub use vnav_driver::VnavDriver;
