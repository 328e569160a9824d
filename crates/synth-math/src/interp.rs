//! Bilinear interpolation on poloidal grids and rate tables.

use ndarray::{Array1, Array2};
use synth_types::state::PoloidalGrid;

/// Bilinear interpolation on a PoloidalGrid.
///
/// Returns the interpolated value of `field` [ny, nx] at `(x, y)`.
/// Clamps to grid boundaries if outside.
pub fn interp2d(field: &Array2<f64>, grid: &PoloidalGrid, x: f64, y: f64) -> f64 {
    let fx = (x - grid.x[0]) / grid.dx;
    let fy = (y - grid.y[0]) / grid.dy;

    let ix0 = (fx.floor() as isize).clamp(0, (grid.nx as isize) - 2) as usize;
    let iy0 = (fy.floor() as isize).clamp(0, (grid.ny as isize) - 2) as usize;
    let ix1 = ix0 + 1;
    let iy1 = iy0 + 1;

    let tx = (fx - ix0 as f64).clamp(0.0, 1.0);
    let ty = (fy - iy0 as f64).clamp(0.0, 1.0);

    let v00 = field[[iy0, ix0]];
    let v10 = field[[iy1, ix0]];
    let v01 = field[[iy0, ix1]];
    let v11 = field[[iy1, ix1]];

    (1.0 - ty) * ((1.0 - tx) * v00 + tx * v01) + ty * ((1.0 - tx) * v10 + tx * v11)
}

/// Cell index and fractional position of `v` on a monotonically
/// increasing axis. `clamped` reports whether `v` fell outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisPosition {
    pub index: usize,
    pub fraction: f64,
    pub clamped: bool,
}

pub fn locate(axis: &Array1<f64>, v: f64) -> AxisPosition {
    let n = axis.len();
    if n < 2 {
        return AxisPosition {
            index: 0,
            fraction: 0.0,
            clamped: n == 0 || v != axis[0],
        };
    }
    if v <= axis[0] {
        return AxisPosition {
            index: 0,
            fraction: 0.0,
            clamped: v < axis[0],
        };
    }
    if v >= axis[n - 1] {
        return AxisPosition {
            index: n - 2,
            fraction: 1.0,
            clamped: v > axis[n - 1],
        };
    }
    // Binary search for the cell containing v.
    let (mut lo, mut hi) = (0usize, n - 1);
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if axis[mid] <= v {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let width = axis[hi] - axis[lo];
    let fraction = if width > 0.0 { (v - axis[lo]) / width } else { 0.0 };
    AxisPosition {
        index: lo,
        fraction,
        clamped: false,
    }
}

/// Result of a rate-table lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableValue {
    pub value: f64,
    /// The query lay outside the tabulated range and was clamped.
    pub clamped: bool,
}

/// Log-log bilinear interpolation of a positive table [nx, ny] over
/// positive axes. Queries outside the axes are clamped to the edge.
pub fn loglog_bilinear(
    x_axis: &Array1<f64>,
    y_axis: &Array1<f64>,
    table: &Array2<f64>,
    x: f64,
    y: f64,
) -> TableValue {
    let lx = x_axis.mapv(|v| v.max(f64::MIN_POSITIVE).ln());
    let ly = y_axis.mapv(|v| v.max(f64::MIN_POSITIVE).ln());
    let px = locate(&lx, x.max(f64::MIN_POSITIVE).ln());
    let py = locate(&ly, y.max(f64::MIN_POSITIVE).ln());

    let ix1 = (px.index + 1).min(x_axis.len() - 1);
    let iy1 = (py.index + 1).min(y_axis.len() - 1);
    let ln = |v: f64| v.max(f64::MIN_POSITIVE).ln();
    let v00 = ln(table[[px.index, py.index]]);
    let v01 = ln(table[[px.index, iy1]]);
    let v10 = ln(table[[ix1, py.index]]);
    let v11 = ln(table[[ix1, iy1]]);

    let (tx, ty) = (px.fraction, py.fraction);
    let lv = (1.0 - tx) * ((1.0 - ty) * v00 + ty * v01) + tx * ((1.0 - ty) * v10 + ty * v11);
    TableValue {
        value: lv.exp(),
        clamped: px.clamped || py.clamped,
    }
}
