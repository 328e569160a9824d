// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Spectral Window
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::config::WindowSpec;
use crate::error::{DiagError, DiagResult};
use ndarray::Array1;

/// Evenly binned wavelength range [nm].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralWindow {
    bins: usize,
    lower: f64,
    upper: f64,
}

impl SpectralWindow {
    pub fn new(bins: usize, lower: f64, upper: f64) -> DiagResult<Self> {
        if bins == 0 {
            return Err(DiagError::ConfigError(
                "spectral window needs at least one bin".into(),
            ));
        }
        if !lower.is_finite() || !upper.is_finite() || lower <= 0.0 || lower >= upper {
            return Err(DiagError::ConfigError(format!(
                "spectral window must satisfy 0 < lower < upper, got [{lower}, {upper}]"
            )));
        }
        Ok(SpectralWindow { bins, lower, upper })
    }

    /// Window of ±`half_width` around `centre`.
    pub fn centred(centre: f64, half_width: f64, bins: usize) -> DiagResult<Self> {
        Self::new(bins, centre - half_width, centre + half_width)
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn bin_width(&self) -> f64 {
        (self.upper - self.lower) / self.bins as f64
    }

    /// Bounds of bin `i`.
    pub fn bin_edges(&self, i: usize) -> (f64, f64) {
        let w = self.bin_width();
        (self.lower + w * i as f64, self.lower + w * (i + 1) as f64)
    }

    pub fn centres(&self) -> Array1<f64> {
        let w = self.bin_width();
        Array1::from_shape_fn(self.bins, |i| self.lower + w * (i as f64 + 0.5))
    }

    pub fn contains(&self, wavelength: f64) -> bool {
        wavelength >= self.lower && wavelength < self.upper
    }
}

impl TryFrom<WindowSpec> for SpectralWindow {
    type Error = DiagError;

    fn try_from(spec: WindowSpec) -> DiagResult<Self> {
        SpectralWindow::new(spec.bins, spec.lower, spec.upper)
    }
}
