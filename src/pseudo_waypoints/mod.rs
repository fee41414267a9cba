// fmgc-vnav/src/pseudo_waypoints/mod.rs

mod placement;
mod pseudo_waypoint;
mod pseudo_waypoints;

pub use placement::{place_from_path_end, PlacedPosition};
pub use pseudo_waypoint::{
    AutoflightAction, PseudoWaypoint, PwpSymbol, SequencingAction, WaypointStats,
};
pub use pseudo_waypoints::PseudoWaypoints;
