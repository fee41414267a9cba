// fmgc-vnav/src/physics/traits.rs

use crate::common::FlapConf;

/// Result of one integration step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepResults {
    /// Pounds.
    pub fuel_burned: f64,
    /// Nautical miles.
    pub distance_traveled: f64,
    /// Minutes.
    pub time_elapsed: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AltitudeStepInput {
    pub initial_altitude: f64,
    pub step_size: f64,
    pub econ_cas: f64,
    pub econ_mach: f64,
    /// N1 percent.
    pub commanded_n1: f64,
    /// Pounds.
    pub zero_fuel_weight: f64,
    /// Pounds.
    pub initial_fuel_weight: f64,
    pub head_wind: f64,
    pub isa_deviation: f64,
    pub tropopause: f64,
    pub speedbrakes_extended: bool,
    pub flap_config: FlapConf,
    pub perf_factor: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelFlightStepInput {
    pub altitude: f64,
    /// Nautical miles.
    pub step_size: f64,
    pub econ_cas: f64,
    pub econ_mach: f64,
    pub zero_fuel_weight: f64,
    pub initial_fuel_weight: f64,
    pub head_wind: f64,
    pub isa_deviation: f64,
}

/// Aerodynamic and fuel burn model used to integrate the vertical path.
pub trait PerformanceModel {
    /// Climb or descent through `step_size` feet.
    fn altitude_step(&self, input: &AltitudeStepInput) -> StepResults;

    /// Level flight over `step_size` nautical miles.
    fn level_flight_step(&self, input: &LevelFlightStepInput) -> StepResults;
}
