// fmgc-vnav/src/common.rs

use serde::{Deserialize, Serialize};

pub const TONS_TO_POUNDS: f64 = 2204.62;

/// Nautical miles per foot.
pub const FEET_TO_NAUTICAL_MILES: f64 = 0.000164579;

/// Linear interpolation of `x` between `(x0, y0)` and `(x1, y1)`.
///
/// A degenerate interval yields `y0`.
pub fn interpolate(x: f64, x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
    if x1 == x0 {
        return y0;
    }
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlapConf {
    #[default]
    Clean,
    Conf1,
    Conf2,
    Conf3,
    ConfFull,
}

/// Formats a number of seconds as `HH:MM:SS`, wrapping at 24 hours.
pub fn format_seconds(seconds: u32) -> String {
    let seconds = seconds % 86_400;
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}
