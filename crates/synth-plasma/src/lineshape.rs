// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Line Shapes
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Spectral line shapes.
//!
//! A shape distributes a line radiance [W/m³/sr] over the bins of a
//! spectral window, adding spectral radiance density [W/m³/sr/nm].
//!
//! - Doppler: Gaussian at the emitter temperature.
//! - Stark: pseudo-Voigt combining the Doppler core with Lorentzian Stark
//!   wings, FWHM_L = c · ne^a / Te^b (Lomanowski et al. 2015 fits).
//! - Multiplet: fixed component wavelengths and intensity ratios, each
//!   component Doppler broadened.

use synth_math::special::{gaussian_interval, lorentzian_interval};
use synth_types::config::{EmissionInstruction, MultipletSpec};
use synth_types::constants::{ELEMENTARY_CHARGE, SPEED_OF_LIGHT};
use synth_types::error::DiagResult;
use synth_types::spectrum::SpectralWindow;

/// Gaussian components are deposited within this many sigma of centre.
const GAUSSIAN_CUTOFF_SIGMA: f64 = 8.0;

/// FWHM / sigma for a Gaussian.
const GAUSSIAN_FWHM_PER_SIGMA: f64 = 2.354_820_045;

/// Stark broadening fit coefficients (upper, lower, c, a, b) for
/// hydrogen-isotope Balmer and Paschen lines.
static STARK_COEFFICIENTS: [(u32, u32, f64, f64, f64); 13] = [
    (3, 2, 3.71e-18, 0.7665, 0.064),
    (4, 2, 8.425e-18, 0.7803, 0.050),
    (5, 2, 1.31e-15, 0.6796, 0.030),
    (6, 2, 3.954e-16, 0.7149, 0.028),
    (7, 2, 6.258e-16, 0.712, 0.029),
    (8, 2, 7.378e-16, 0.7159, 0.032),
    (9, 2, 8.947e-16, 0.7177, 0.033),
    (4, 3, 1.330e-16, 0.7449, 0.045),
    (5, 3, 6.64e-16, 0.7356, 0.044),
    (6, 3, 2.481e-15, 0.7118, 0.016),
    (7, 3, 3.270e-15, 0.7137, 0.029),
    (8, 3, 4.343e-15, 0.7133, 0.032),
    (9, 3, 5.588e-15, 0.7165, 0.033),
];

/// Stark fit (c, a, b) for a transition, if tabulated.
pub fn stark_coefficients(upper: u32, lower: u32) -> Option<(f64, f64, f64)> {
    STARK_COEFFICIENTS
        .iter()
        .find(|(u, l, ..)| *u == upper && *l == lower)
        .map(|&(_, _, c, a, b)| (c, a, b))
}

#[derive(Debug, Clone, PartialEq)]
pub enum Lineshape {
    Doppler,
    StarkBroadened { upper: u32, lower: u32 },
    Multiplet { wavelengths: Vec<f64>, ratios: Vec<f64> },
}

/// Local plasma state a shape needs at one point.
#[derive(Debug, Clone, Copy)]
pub struct LocalConditions {
    /// Emitter temperature [eV].
    pub emitter_temperature: f64,
    /// Emitter mass [kg].
    pub emitter_mass: f64,
    pub te: f64,
    pub ne: f64,
}

impl Lineshape {
    /// Shape for one instruction: multiplet over Stark over Doppler.
    pub fn from_instruction(instruction: &EmissionInstruction) -> DiagResult<Self> {
        if let Some(multiplet) = &instruction.multiplet {
            return Self::multiplet(multiplet);
        }
        if instruction.stark {
            return Ok(Lineshape::StarkBroadened {
                upper: instruction.upper,
                lower: instruction.lower,
            });
        }
        Ok(Lineshape::Doppler)
    }

    /// Multiplet with ratios normalised to unit sum.
    pub fn multiplet(spec: &MultipletSpec) -> DiagResult<Self> {
        spec.validate()?;
        let total: f64 = spec.ratios.iter().sum();
        Ok(Lineshape::Multiplet {
            wavelengths: spec.wavelengths.clone(),
            ratios: spec.ratios.iter().map(|r| r / total).collect(),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Lineshape::Doppler => "doppler",
            Lineshape::StarkBroadened { .. } => "stark",
            Lineshape::Multiplet { .. } => "multiplet",
        }
    }

    /// Add `radiance` centred on `wavelength` [nm] into `out`.
    pub fn deposit(
        &self,
        radiance: f64,
        wavelength: f64,
        local: &LocalConditions,
        window: &SpectralWindow,
        out: &mut [f64],
    ) {
        if radiance == 0.0 {
            return;
        }
        match self {
            Lineshape::Doppler => {
                let sigma = doppler_sigma(wavelength, local);
                deposit_gaussian(radiance, wavelength, sigma, window, out);
            }
            Lineshape::StarkBroadened { upper, lower } => {
                let sigma = doppler_sigma(wavelength, local);
                match stark_coefficients(*upper, *lower) {
                    Some(coeffs) => {
                        let fwhm_l = stark_fwhm(coeffs, local.te, local.ne);
                        deposit_pseudo_voigt(radiance, wavelength, sigma, fwhm_l, window, out);
                    }
                    None => deposit_gaussian(radiance, wavelength, sigma, window, out),
                }
            }
            Lineshape::Multiplet {
                wavelengths,
                ratios,
            } => {
                for (&w, &r) in wavelengths.iter().zip(ratios) {
                    let sigma = doppler_sigma(w, local);
                    deposit_gaussian(radiance * r, w, sigma, window, out);
                }
            }
        }
    }
}

/// Doppler sigma [nm] of a line at `wavelength` [nm].
pub fn doppler_sigma(wavelength: f64, local: &LocalConditions) -> f64 {
    if local.emitter_mass <= 0.0 || local.emitter_temperature <= 0.0 {
        return 0.0;
    }
    wavelength * (ELEMENTARY_CHARGE * local.emitter_temperature / local.emitter_mass).sqrt()
        / SPEED_OF_LIGHT
}

/// Lorentzian Stark FWHM [nm] for ne [m⁻³] and Te [eV].
pub fn stark_fwhm((c, a, b): (f64, f64, f64), te: f64, ne: f64) -> f64 {
    if ne <= 0.0 || te <= 0.0 {
        return 0.0;
    }
    c * ne.powf(a) / te.powf(b)
}

fn deposit_gaussian(
    radiance: f64,
    centre: f64,
    sigma: f64,
    window: &SpectralWindow,
    out: &mut [f64],
) {
    let width = window.bin_width();
    if sigma <= 0.0 {
        if window.contains(centre) {
            let i = (((centre - window.lower()) / width) as usize).min(window.bins() - 1);
            out[i] += radiance / width;
        }
        return;
    }
    let reach = GAUSSIAN_CUTOFF_SIGMA * sigma;
    let first = ((centre - reach - window.lower()) / width).floor().max(0.0) as usize;
    let last = (((centre + reach - window.lower()) / width).ceil().max(0.0) as usize)
        .min(window.bins());
    for (i, slot) in out.iter_mut().enumerate().take(last).skip(first) {
        let (a, b) = window.bin_edges(i);
        *slot += radiance * gaussian_interval(centre, sigma, a, b) / width;
    }
}

/// Thompson-Cox-Hastings pseudo-Voigt.
fn deposit_pseudo_voigt(
    radiance: f64,
    centre: f64,
    sigma: f64,
    fwhm_l: f64,
    window: &SpectralWindow,
    out: &mut [f64],
) {
    let fg = GAUSSIAN_FWHM_PER_SIGMA * sigma;
    let fl = fwhm_l;
    if fl <= 0.0 {
        deposit_gaussian(radiance, centre, sigma, window, out);
        return;
    }
    let f = (fg.powi(5)
        + 2.69269 * fg.powi(4) * fl
        + 2.42843 * fg.powi(3) * fl.powi(2)
        + 4.47163 * fg.powi(2) * fl.powi(3)
        + 0.07842 * fg * fl.powi(4)
        + fl.powi(5))
    .powf(0.2);
    let q = fl / f;
    let eta = (1.36603 * q - 0.47719 * q * q + 0.11116 * q.powi(3)).clamp(0.0, 1.0);

    let width = window.bin_width();
    let gamma = f / 2.0;
    for (i, slot) in out.iter_mut().enumerate() {
        let (a, b) = window.bin_edges(i);
        *slot += radiance * eta * lorentzian_interval(centre, gamma, a, b) / width;
    }
    deposit_gaussian(
        radiance * (1.0 - eta),
        centre,
        f / GAUSSIAN_FWHM_PER_SIGMA,
        window,
        out,
    );
}
