// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::config::ProfileGridConfig;
use crate::constants::DEUTERIUM_STAGES;
use crate::geometry::Point3;
use crate::species::Element;
use ndarray::{Array, Array1, Array2, Array3, Dimension};

/// Regular grid over the poloidal (x, y) plane at toroidal angle zero.
/// Arrays sampled on it are indexed [iy, ix].
#[derive(Debug, Clone)]
pub struct PoloidalGrid {
    pub nx: usize,
    pub ny: usize,
    pub x: Array1<f64>, // linspace(x_min, x_max, nx)
    pub y: Array1<f64>, // linspace(y_min, y_max, ny)
    pub dx: f64,
    pub dy: f64,
}

impl PoloidalGrid {
    pub fn new(nx: usize, ny: usize, x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        let x = Array1::linspace(x_min, x_max, nx);
        let y = Array1::linspace(y_min, y_max, ny);
        let dx = if nx > 1 { x[1] - x[0] } else { x_max - x_min };
        let dy = if ny > 1 { y[1] - y[0] } else { y_max - y_min };
        PoloidalGrid { nx, ny, x, y, dx, dy }
    }

    pub fn from_config(cfg: &ProfileGridConfig) -> Self {
        Self::new(
            cfg.points,
            cfg.points,
            cfg.x_range[0],
            cfg.x_range[1],
            cfg.y_range[0],
            cfg.y_range[1],
        )
    }

    /// 3-D sample point of grid node (iy, ix).
    pub fn point(&self, iy: usize, ix: usize) -> Point3 {
        Point3::new(self.x[ix], 0.0, self.y[iy])
    }
}

/// Sample buffer whose cells are `None` until a measurement is written.
pub type Channel<D> = Array<Option<f64>, D>;

/// Unset-aware helpers for [`Channel`] buffers.
pub trait ChannelExt<D: Dimension> {
    /// Dense copy with unset cells as NaN, for numeric containers.
    fn nan_filled(&self) -> Array<f64, D>;
    fn all_set(&self) -> bool;
    fn all_unset(&self) -> bool;
}

impl<D: Dimension> ChannelExt<D> for Channel<D> {
    fn nan_filled(&self) -> Array<f64, D> {
        self.mapv(|v| v.unwrap_or(f64::NAN))
    }

    fn all_set(&self) -> bool {
        self.iter().all(Option::is_some)
    }

    fn all_unset(&self) -> bool {
        self.iter().all(Option::is_none)
    }
}

/// Fibre bundle geometry recorded alongside the measurements.
#[derive(Debug, Clone)]
pub struct BundleGeometry {
    pub origin: Point3,
    /// Unit viewing directions [3, n_fibres].
    pub directions: Array2<f64>,
    /// Distance from origin to the first wall [n_fibres] [m].
    pub distance: Array1<f64>,
}

/// Impurity density along each line of sight, stages 0..=Z.
#[derive(Debug, Clone)]
pub struct ImpurityLos {
    pub element: &'static Element,
    /// [los_steps, n_fibres, Z + 1]
    pub density: Channel<ndarray::Ix3>,
}

/// Output of one fibre-bundle sampling run.
#[derive(Debug, Clone)]
pub struct DiagnosticResult {
    pub bundle: String,
    /// Spectral bin centres [bins] [nm].
    pub wavelengths: Array1<f64>,
    pub geometry: BundleGeometry,
    /// Distance of each LOS sample from the origin [los_steps, n_fibres] [m].
    pub los_distance: Channel<ndarray::Ix2>,
    /// Mean integrated power [n_fibres] [W].
    pub power: Channel<ndarray::Ix1>,
    /// Mean spectral radiance [bins, n_fibres] [W/m²/sr/nm].
    pub spectra: Channel<ndarray::Ix2>,
    /// Electron temperature [los_steps, n_fibres] [eV].
    pub te_los: Channel<ndarray::Ix2>,
    /// Electron density [los_steps, n_fibres] [m⁻³].
    pub ne_los: Channel<ndarray::Ix2>,
    /// Deuterium density by stage [los_steps, n_fibres, 2] [m⁻³].
    pub ni_los: Channel<ndarray::Ix3>,
    pub nz_los: Option<ImpurityLos>,
}

impl DiagnosticResult {
    /// Every channel starts unset.
    pub fn new(
        bundle: impl Into<String>,
        wavelengths: Array1<f64>,
        geometry: BundleGeometry,
        los_steps: usize,
        impurity: Option<&'static Element>,
    ) -> Self {
        let n_fibres = geometry.distance.len();
        let bins = wavelengths.len();
        DiagnosticResult {
            bundle: bundle.into(),
            wavelengths,
            geometry,
            los_distance: Array2::from_elem((los_steps, n_fibres), None),
            power: Array1::from_elem(n_fibres, None),
            spectra: Array2::from_elem((bins, n_fibres), None),
            te_los: Array2::from_elem((los_steps, n_fibres), None),
            ne_los: Array2::from_elem((los_steps, n_fibres), None),
            ni_los: Array3::from_elem((los_steps, n_fibres, DEUTERIUM_STAGES), None),
            nz_los: impurity.map(|element| ImpurityLos {
                element,
                density: Array3::from_elem((los_steps, n_fibres, element.stage_count()), None),
            }),
        }
    }

    pub fn n_fibres(&self) -> usize {
        self.power.len()
    }

    pub fn n_bins(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn los_steps(&self) -> usize {
        self.te_los.nrows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::CARBON;

    fn geometry(n: usize) -> BundleGeometry {
        BundleGeometry {
            origin: Point3::new(1.0, 0.0, -1.5),
            directions: Array2::zeros((3, n)),
            distance: Array1::ones(n),
        }
    }

    #[test]
    fn test_grid_creation() {
        let grid = PoloidalGrid::new(65, 33, 0.0, 2.5, -2.5, 2.5);
        assert_eq!(grid.x.len(), 65);
        assert_eq!(grid.y.len(), 33);
        assert!((grid.dx - 2.5 / 64.0).abs() < 1e-12);
        assert!((grid.dy - 5.0 / 32.0).abs() < 1e-12);
        let p = grid.point(32, 64);
        assert!((p.x - 2.5).abs() < 1e-12);
        assert_eq!(p.y, 0.0);
        assert!((p.z - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_result_starts_unset() {
        let result = DiagnosticResult::new(
            "lower",
            Array1::linspace(650.0, 660.0, 8),
            geometry(4),
            10,
            Some(&CARBON),
        );
        assert_eq!(result.n_fibres(), 4);
        assert_eq!(result.n_bins(), 8);
        assert_eq!(result.los_steps(), 10);
        assert_eq!(result.spectra.shape(), &[8, 4]);
        assert_eq!(result.ni_los.shape(), &[10, 4, 2]);
        let nz = result.nz_los.as_ref().unwrap();
        assert_eq!(nz.density.shape(), &[10, 4, 7]);
        assert!(result.power.all_unset());
        assert!(result.te_los.all_unset());
        assert!(nz.density.all_unset());
    }

    #[test]
    fn test_nan_filled_distinguishes_zero() {
        let mut channel: Channel<ndarray::Ix1> = Array1::from_elem(3, None);
        channel[1] = Some(0.0);
        let dense = channel.nan_filled();
        assert!(dense[0].is_nan());
        assert_eq!(dense[1], 0.0);
        assert!(!channel.all_set());
        assert!(!channel.all_unset());
    }
}
