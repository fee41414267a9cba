// fmgc-vnav/src/physics/engine.rs

use crate::common::interpolate;
use ndarray::{arr2, Array2, ArrayView1};

pub struct EngineModel;

impl EngineModel {
    /// Maximum climb N1 (percent).
    ///
    /// First row holds pressure altitudes (ft), first column total air
    /// temperatures (degrees Celsius).
    pub fn max_climb_thrust_table() -> Array2<f64> {
        arr2(&[
            [0., 0., 5000., 10000., 15000., 20000., 25000., 30000., 35000., 41000.],
            [-50., 79.0, 80.5, 82.0, 83.5, 85.0, 86.3, 87.5, 88.6, 89.4],
            [-30., 81.2, 82.6, 84.0, 85.4, 86.8, 88.0, 89.1, 90.1, 90.8],
            [-10., 83.3, 84.6, 85.9, 87.2, 88.5, 89.6, 90.6, 91.5, 92.1],
            [10., 85.2, 86.4, 87.6, 88.8, 90.0, 91.0, 91.9, 92.7, 93.2],
            [30., 86.8, 87.9, 89.0, 90.1, 91.2, 92.1, 92.9, 93.6, 94.0],
            [50., 86.0, 87.0, 88.0, 89.0, 90.0, 90.8, 91.5, 92.1, 92.5],
        ])
    }

    pub fn climb_thrust_n1_limit(tat: f64, pressure_altitude: f64) -> f64 {
        Self::table_interpolation(&Self::max_climb_thrust_table(), tat, pressure_altitude)
    }

    /// Bilinear lookup in a table laid out like [`Self::max_climb_thrust_table`].
    ///
    /// Keys outside the table are clamped to its edges.
    pub fn table_interpolation(table: &Array2<f64>, row_key: f64, column_key: f64) -> f64 {
        let row_keys = table.column(0);
        let column_keys = table.row(0);

        let (r0, r1) = Self::bracket(row_keys.slice(ndarray::s![1..]), row_key);
        let (c0, c1) = Self::bracket(column_keys.slice(ndarray::s![1..]), column_key);
        // Offset past the header row/column.
        let (r0, r1, c0, c1) = (r0 + 1, r1 + 1, c0 + 1, c1 + 1);

        let row_key = row_key.clamp(row_keys[r0].min(row_keys[r1]), row_keys[r0].max(row_keys[r1]));
        let column_key = column_key.clamp(
            column_keys[c0].min(column_keys[c1]),
            column_keys[c0].max(column_keys[c1]),
        );

        let low = interpolate(
            column_key,
            column_keys[c0],
            column_keys[c1],
            table[[r0, c0]],
            table[[r0, c1]],
        );
        let high = interpolate(
            column_key,
            column_keys[c0],
            column_keys[c1],
            table[[r1, c0]],
            table[[r1, c1]],
        );
        interpolate(row_key, row_keys[r0], row_keys[r1], low, high)
    }

    /// Indices of the two ascending keys surrounding `key`.
    fn bracket(keys: ArrayView1<f64>, key: f64) -> (usize, usize) {
        let last = keys.len().saturating_sub(1);
        if last == 0 || key <= keys[0] {
            return (0, 1.min(last));
        }
        for i in 0..last {
            if key >= keys[i] && key <= keys[i + 1] {
                return (i, i + 1);
            }
        }
        (last - 1, last)
    }
}
