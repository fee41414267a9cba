// fmgc-vnav/src/physics/mod.rs

pub use atmosphere::AtmosphericConditions;
pub use engine::EngineModel;
pub use simplified::SimplifiedPerformanceModel;
pub use traits::{AltitudeStepInput, LevelFlightStepInput, PerformanceModel, StepResults};

pub mod atmosphere;
pub mod engine;
pub mod simplified;
pub mod traits;
