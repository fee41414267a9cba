// fmgc-vnav/src/physics/atmosphere.rs

use crate::parameters::EnvironmentSnapshot;

const ISA_SEA_LEVEL_TEMPERATURE: f64 = 15.;
const KELVIN: f64 = 273.15;
const TROPOPAUSE: f64 = 36089.24;
const SEA_LEVEL_SPEED_OF_SOUND: f64 = 661.4786;

/// ISA static temperature in degrees Celsius.
pub fn isa_temperature(altitude: f64) -> f64 {
    if altitude < TROPOPAUSE {
        ISA_SEA_LEVEL_TEMPERATURE - 0.0019812 * altitude
    } else {
        -56.5
    }
}

/// Static pressure over sea level pressure.
pub fn pressure_ratio(altitude: f64) -> f64 {
    if altitude < TROPOPAUSE {
        (1. - 6.8755856e-6 * altitude).powf(5.2558797)
    } else {
        0.2233609 * (-4.806346e-5 * (altitude - TROPOPAUSE)).exp()
    }
}

/// Air density over sea level density.
pub fn density_ratio(altitude: f64, isa_deviation: f64) -> f64 {
    let temperature_ratio =
        (isa_temperature(altitude) + isa_deviation + KELVIN) / (ISA_SEA_LEVEL_TEMPERATURE + KELVIN);
    pressure_ratio(altitude) / temperature_ratio
}

/// Speed of sound in knots.
pub fn speed_of_sound(altitude: f64, isa_deviation: f64) -> f64 {
    38.967854 * (isa_temperature(altitude) + isa_deviation + KELVIN).sqrt()
}

pub fn true_airspeed_from_mach(altitude: f64, mach: f64, isa_deviation: f64) -> f64 {
    mach * speed_of_sound(altitude, isa_deviation)
}

/// Atmospheric state cached between profile computations.
#[derive(Clone, Debug, Default)]
pub struct AtmosphericConditions {
    isa_deviation: f64,
}

impl AtmosphericConditions {
    pub fn update(&mut self, environment: &EnvironmentSnapshot) {
        self.isa_deviation =
            environment.ambient_temperature - isa_temperature(environment.pressure_altitude);
    }

    pub fn isa_deviation(&self) -> f64 {
        self.isa_deviation
    }

    pub fn compute_mach_from_cas(&self, altitude: f64, cas: f64) -> f64 {
        let impact_pressure =
            (1. + 0.2 * (cas / SEA_LEVEL_SPEED_OF_SOUND).powi(2)).powf(3.5) - 1.;
        (5. * ((impact_pressure / pressure_ratio(altitude) + 1.).powf(2. / 7.) - 1.)).sqrt()
    }

    /// Total air temperature in degrees Celsius.
    pub fn total_air_temperature_from_mach(&self, altitude: f64, mach: f64) -> f64 {
        let static_temperature = isa_temperature(altitude) + self.isa_deviation + KELVIN;
        static_temperature * (1. + 0.2 * mach * mach) - KELVIN
    }
}
