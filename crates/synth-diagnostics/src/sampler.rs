// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Optical Sampler
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Fibre-optic observation by Monte-Carlo line integration.
//!
//! Each pixel sample picks a start point on the fibre aperture and a
//! direction inside the acceptance cone, then integrates the plasma's
//! spectral emissivity along the straight ray to the first wall (midpoint
//! rule, fixed step). Walls absorb; nothing is reflected or scattered.
//!
//! Power [W] = ∫ L(λ) dλ · étendue, with étendue = πr² · 2π(1 − cos θ).

use crate::fibres::FibrePose;
use crate::machine::Scene;
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, UnitDisc};
use std::f64::consts::PI;
use synth_plasma::plasma::Plasma;
use synth_types::error::{DiagError, DiagResult};
use synth_types::geometry::{Point3, Vec3};
use synth_types::spectrum::SpectralWindow;

/// Decorrelates per-fibre seeds (golden-ratio increment).
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Optical parameters shared by every fibre of a run.
#[derive(Debug, Clone, Copy)]
pub struct FibreParameters {
    /// Acceptance half-angle [deg].
    pub acceptance_angle: f64,
    /// Aperture radius [m].
    pub radius: f64,
    pub pixel_samples: usize,
    pub spectral_rays: usize,
    pub window: SpectralWindow,
}

impl FibreParameters {
    /// Solid angle of the acceptance cone [sr].
    pub fn solid_angle(&self) -> f64 {
        2.0 * PI * (1.0 - self.acceptance_angle.to_radians().cos())
    }

    /// Aperture area times acceptance solid angle [m² sr].
    pub fn etendue(&self) -> f64 {
        PI * self.radius * self.radius * self.solid_angle()
    }
}

/// Mean of a scalar Monte-Carlo estimate with its sample variance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleEstimate {
    pub mean: f64,
    pub variance: f64,
    pub samples: usize,
}

impl SampleEstimate {
    fn from_samples(values: &[f64]) -> Self {
        let n = values.len().max(1) as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = if values.len() > 1 {
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)
        } else {
            0.0
        };
        SampleEstimate {
            mean,
            variance,
            samples: values.len(),
        }
    }
}

/// Per-bin mean spectral radiance [W/m²/sr/nm] and its sample variance.
#[derive(Debug, Clone)]
pub struct SpectralEstimate {
    pub mean: Array1<f64>,
    pub variance: Array1<f64>,
    pub samples: usize,
}

/// Optical transport seam between the engine and the scene.
pub trait OpticalSampler {
    /// Spectral radiance [W/m²/sr/nm] collected along one ray.
    fn ray_radiance(
        &self,
        origin: Point3,
        direction: Vec3,
        scene: &dyn Scene,
        plasma: &Plasma,
        window: &SpectralWindow,
    ) -> DiagResult<Vec<f64>>;

    /// Mean collected power [W] of one fibre.
    fn observe_power(
        &self,
        pose: &FibrePose,
        params: &FibreParameters,
        scene: &dyn Scene,
        plasma: &Plasma,
    ) -> DiagResult<SampleEstimate>;

    /// Mean spectral radiance of one fibre.
    fn observe_radiance(
        &self,
        pose: &FibrePose,
        params: &FibreParameters,
        scene: &dyn Scene,
        plasma: &Plasma,
    ) -> DiagResult<SpectralEstimate>;
}

/// Reference sampler: straight rays, fixed-step midpoint integration.
#[derive(Debug, Clone, Copy)]
pub struct LineIntegralSampler {
    /// Integration step [m].
    pub step: f64,
    pub seed: u64,
}

impl LineIntegralSampler {
    pub fn new(step: f64, seed: u64) -> DiagResult<Self> {
        if !step.is_finite() || step <= 0.0 {
            return Err(DiagError::ConfigError(format!(
                "integration step must be finite and > 0, got {step}"
            )));
        }
        Ok(LineIntegralSampler { step, seed })
    }

    fn rng_for(&self, pose: &FibrePose, salt: u64) -> StdRng {
        StdRng::seed_from_u64(
            self.seed ^ (pose.number as u64).wrapping_mul(SEED_STRIDE) ^ salt,
        )
    }

    /// Random (start, direction) inside the fibre's aperture and cone.
    fn sample_ray(
        &self,
        pose: &FibrePose,
        params: &FibreParameters,
        rng: &mut StdRng,
    ) -> (Point3, Vec3) {
        let (right, up) = Vec3::orthonormal_basis(&pose.forward, &pose.up);

        let [dx, dy]: [f64; 2] = UnitDisc.sample(rng);
        let start = pose.origin + right * (dx * params.radius) + up * (dy * params.radius);

        // Uniform in solid angle within the cone.
        let cos_max = params.acceptance_angle.to_radians().cos();
        let cos_a = 1.0 - rng.gen::<f64>() * (1.0 - cos_max);
        let sin_a = (1.0 - cos_a * cos_a).max(0.0).sqrt();
        let phi = 2.0 * PI * rng.gen::<f64>();
        let direction =
            pose.forward * cos_a + right * (sin_a * phi.cos()) + up * (sin_a * phi.sin());
        (start, direction)
    }

    /// Contiguous bin ranges, one per spectral ray.
    fn spectral_chunks(window: &SpectralWindow, rays: usize) -> DiagResult<Vec<(usize, SpectralWindow)>> {
        let bins = window.bins();
        let rays = rays.clamp(1, bins);
        let mut chunks = Vec::with_capacity(rays);
        for c in 0..rays {
            let b0 = c * bins / rays;
            let b1 = (c + 1) * bins / rays;
            let lower = window.bin_edges(b0).0;
            let upper = window.bin_edges(b1 - 1).1;
            chunks.push((b0, SpectralWindow::new(b1 - b0, lower, upper)?));
        }
        Ok(chunks)
    }

    /// Per-sample full spectra, each chunk traced along its own ray.
    fn sample_spectra(
        &self,
        pose: &FibrePose,
        params: &FibreParameters,
        scene: &dyn Scene,
        plasma: &Plasma,
        salt: u64,
    ) -> DiagResult<Vec<Vec<f64>>> {
        if params.pixel_samples == 0 {
            return Err(DiagError::SamplingFailed(
                "fibre needs at least one pixel sample".into(),
            ));
        }
        let chunks = Self::spectral_chunks(&params.window, params.spectral_rays)?;
        let mut rng = self.rng_for(pose, salt);
        let mut spectra = Vec::with_capacity(params.pixel_samples);
        for _ in 0..params.pixel_samples {
            let mut spectrum = vec![0.0; params.window.bins()];
            for (offset, sub) in &chunks {
                let (start, direction) = self.sample_ray(pose, params, &mut rng);
                let part = self.ray_radiance(start, direction, scene, plasma, sub)?;
                spectrum[*offset..*offset + part.len()].copy_from_slice(&part);
            }
            spectra.push(spectrum);
        }
        Ok(spectra)
    }
}

impl OpticalSampler for LineIntegralSampler {
    fn ray_radiance(
        &self,
        origin: Point3,
        direction: Vec3,
        scene: &dyn Scene,
        plasma: &Plasma,
        window: &SpectralWindow,
    ) -> DiagResult<Vec<f64>> {
        let direction = direction
            .normalise()
            .ok_or_else(|| DiagError::SamplingFailed("zero ray direction".into()))?;
        let length = scene.distance_to_boundary(origin, direction)?;
        let mut radiance = vec![0.0; window.bins()];
        if length <= 0.0 {
            return Ok(radiance);
        }

        let steps = (length / self.step).ceil().max(1.0) as usize;
        let h = length / steps as f64;
        let mut emissivity = vec![0.0; window.bins()];
        for i in 0..steps {
            let p = origin + direction * ((i as f64 + 0.5) * h);
            emissivity.iter_mut().for_each(|e| *e = 0.0);
            plasma.spectral_emission(p, window, &mut emissivity)?;
            for (r, e) in radiance.iter_mut().zip(&emissivity) {
                *r += e * h;
            }
        }
        Ok(radiance)
    }

    fn observe_power(
        &self,
        pose: &FibrePose,
        params: &FibreParameters,
        scene: &dyn Scene,
        plasma: &Plasma,
    ) -> DiagResult<SampleEstimate> {
        let spectra = self.sample_spectra(pose, params, scene, plasma, 0)?;
        let width = params.window.bin_width();
        let etendue = params.etendue();
        let powers: Vec<f64> = spectra
            .iter()
            .map(|s| s.iter().sum::<f64>() * width * etendue)
            .collect();
        Ok(SampleEstimate::from_samples(&powers))
    }

    fn observe_radiance(
        &self,
        pose: &FibrePose,
        params: &FibreParameters,
        scene: &dyn Scene,
        plasma: &Plasma,
    ) -> DiagResult<SpectralEstimate> {
        let spectra = self.sample_spectra(pose, params, scene, plasma, 1)?;
        let bins = params.window.bins();
        let n = spectra.len();
        let mut mean = Array1::zeros(bins);
        let mut variance = Array1::zeros(bins);
        for b in 0..bins {
            let column: Vec<f64> = spectra.iter().map(|s| s[b]).collect();
            let est = SampleEstimate::from_samples(&column);
            mean[b] = est.mean;
            variance[b] = est.variance;
        }
        Ok(SpectralEstimate {
            mean,
            variance,
            samples: n,
        })
    }
}
