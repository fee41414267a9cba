// fmgc-vnav/src/physics/simplified.rs

use super::atmosphere::{density_ratio, true_airspeed_from_mach};
use super::traits::{AltitudeStepInput, LevelFlightStepInput, PerformanceModel, StepResults};
use crate::common::FlapConf;

/// Feet per minute of vertical speed per knot of true airspeed at sin(gamma) = 1.
const FPM_PER_KNOT: f64 = 101.268;

/// Thrust minus drag point-mass model of a twin-engine narrow body.
///
/// Coarse on purpose: it produces plausible climb gradients and fuel burns for
/// offline predictions and does not model compressibility or wind gradients.
#[derive(Clone, Debug)]
pub struct SimplifiedPerformanceModel {
    /// Sea level static thrust of all engines at 100% N1, lbf.
    pub max_thrust: f64,
    /// Thrust specific fuel consumption, lb per lbf per hour.
    pub tsfc: f64,
    pub clean_lift_to_drag: f64,
}

impl Default for SimplifiedPerformanceModel {
    fn default() -> Self {
        Self {
            max_thrust: 2. * 27_120.,
            tsfc: 0.58,
            clean_lift_to_drag: 17.,
        }
    }
}

impl SimplifiedPerformanceModel {
    fn lift_to_drag(&self, flap_config: FlapConf, speedbrakes_extended: bool) -> f64 {
        let lift_to_drag = match flap_config {
            FlapConf::Clean => self.clean_lift_to_drag,
            FlapConf::Conf1 => self.clean_lift_to_drag * 0.85,
            FlapConf::Conf2 => self.clean_lift_to_drag * 0.75,
            FlapConf::Conf3 => self.clean_lift_to_drag * 0.65,
            FlapConf::ConfFull => self.clean_lift_to_drag * 0.55,
        };
        if speedbrakes_extended {
            lift_to_drag * 0.8
        } else {
            lift_to_drag
        }
    }

    fn thrust(&self, n1: f64, altitude: f64, isa_deviation: f64) -> f64 {
        let n1_ratio = (n1 / 100.).clamp(0., 1.1);
        self.max_thrust * n1_ratio * n1_ratio * density_ratio(altitude, isa_deviation).powf(0.7)
    }

    /// Fuel flow multiplier for a performance factor given in percent.
    fn perf_factor_multiplier(perf_factor: f64) -> f64 {
        1. + perf_factor / 100.
    }
}

impl PerformanceModel for SimplifiedPerformanceModel {
    fn altitude_step(&self, input: &AltitudeStepInput) -> StepResults {
        let midway_altitude = input.initial_altitude + input.step_size / 2.;
        let weight = input.zero_fuel_weight + input.initial_fuel_weight;
        let tas = true_airspeed_from_mach(midway_altitude, input.econ_mach, input.isa_deviation);

        let thrust = self.thrust(input.commanded_n1, midway_altitude, input.isa_deviation);
        let drag = weight / self.lift_to_drag(input.flap_config, input.speedbrakes_extended);
        let sin_gamma = ((thrust - drag) / weight).clamp(0.005, 0.3);

        let vertical_speed = tas * FPM_PER_KNOT * sin_gamma;
        let time_elapsed = input.step_size.abs() / vertical_speed;
        let ground_speed = (tas - input.head_wind).max(1.);

        StepResults {
            fuel_burned: self.tsfc
                * thrust
                * (time_elapsed / 60.)
                * Self::perf_factor_multiplier(input.perf_factor),
            distance_traveled: ground_speed * time_elapsed / 60.,
            time_elapsed,
        }
    }

    fn level_flight_step(&self, input: &LevelFlightStepInput) -> StepResults {
        let weight = input.zero_fuel_weight + input.initial_fuel_weight;
        let tas = true_airspeed_from_mach(input.altitude, input.econ_mach, input.isa_deviation);
        let ground_speed = (tas - input.head_wind).max(1.);
        let drag = weight / self.clean_lift_to_drag;

        let time_elapsed = input.step_size / ground_speed * 60.;

        StepResults {
            fuel_burned: self.tsfc * drag * time_elapsed / 60.,
            distance_traveled: input.step_size,
            time_elapsed,
        }
    }
}
