// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Emission Models
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Volume emission models bound to a [`Plasma`].
//!
//! Line radiance [W/m³/sr]:
//!
//!   ε = PEC(Te, ne) · ne · n_target · hc/λ / 4π
//!
//! where the target is the emitting stage for excitation and the next
//! stage up for recombination. Bremsstrahlung is the free-free continuum
//! with unit Gaunt factor.

use crate::atomic::Line;
use crate::lineshape::{Lineshape, LocalConditions};
use crate::plasma::Plasma;
use std::f64::consts::PI;
use std::fmt;
use synth_types::config::TransitionKind;
use synth_types::constants::{EV_TO_KELVIN, PLANCK, SPEED_OF_LIGHT};
use synth_types::error::DiagResult;
use synth_types::geometry::Point3;
use synth_types::spectrum::SpectralWindow;

/// Free-free emissivity prefactor per steradian [W m³ K^½ / sr / Hz].
const BREMSSTRAHLUNG_COEFFICIENT: f64 = 5.44e-52;

/// Boltzmann constant [J/K].
const BOLTZMANN: f64 = 1.380_649e-23;

#[derive(Debug, Clone, PartialEq)]
pub struct LineModel {
    pub line: Line,
    pub transition: TransitionKind,
    pub lineshape: Lineshape,
}

impl LineModel {
    /// Stage whose density drives the emission.
    pub fn target_stage(&self) -> u32 {
        match self.transition {
            TransitionKind::Excitation => self.line.ionisation,
            TransitionKind::Recombination => self.line.ionisation + 1,
        }
    }

    fn emission(
        &self,
        plasma: &Plasma,
        p: Point3,
        window: &SpectralWindow,
        out: &mut [f64],
    ) -> DiagResult<()> {
        let te = plasma.electron_temperature(p);
        let ne = plasma.electron_density(p);
        if te <= 0.0 || ne <= 0.0 {
            return Ok(());
        }
        let target = plasma
            .composition()
            .get(self.line.element, self.target_stage())?;
        let n_target = target.distribution.density(p);
        if n_target <= 0.0 {
            return Ok(());
        }

        let atomic = plasma.atomic_data()?;
        let wavelength = atomic.wavelength(&self.line)?;
        let pec = atomic.pec(&self.line, self.transition, te, ne)?;
        let photon_energy = PLANCK * SPEED_OF_LIGHT / (wavelength * 1e-9);
        let radiance = pec * ne * n_target * photon_energy / (4.0 * PI);

        let local = LocalConditions {
            emitter_temperature: target.distribution.effective_temperature(p),
            emitter_mass: self.line.element.mass(),
            te,
            ne,
        };
        self.lineshape
            .deposit(radiance, wavelength, &local, window, out);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EmissionModel {
    Line(LineModel),
    Bremsstrahlung,
}

impl EmissionModel {
    /// Add this model's spectral emissivity at `p` into `out`.
    pub fn emission(
        &self,
        plasma: &Plasma,
        p: Point3,
        window: &SpectralWindow,
        out: &mut [f64],
    ) -> DiagResult<()> {
        match self {
            EmissionModel::Line(model) => model.emission(plasma, p, window, out),
            EmissionModel::Bremsstrahlung => {
                bremsstrahlung(plasma, p, window, out);
                Ok(())
            }
        }
    }
}

impl fmt::Display for EmissionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmissionModel::Line(m) => {
                let kind = match m.transition {
                    TransitionKind::Excitation => "excitation",
                    TransitionKind::Recombination => "recombination",
                };
                write!(f, "{kind} {} [{}]", m.line, m.lineshape.name())
            }
            EmissionModel::Bremsstrahlung => f.write_str("bremsstrahlung"),
        }
    }
}

/// Zeff = Σ n_k k² / ne over charged stages. Defaults to 1 when the
/// composition carries no ions.
pub fn effective_charge(plasma: &Plasma, p: Point3, ne: f64) -> f64 {
    if ne <= 0.0 {
        return 1.0;
    }
    let sum: f64 = plasma
        .composition()
        .iter()
        .filter(|s| s.ionisation > 0)
        .map(|s| {
            let z = s.ionisation as f64;
            s.distribution.density(p) * z * z
        })
        .sum();
    if sum > 0.0 {
        sum / ne
    } else {
        1.0
    }
}

fn bremsstrahlung(plasma: &Plasma, p: Point3, window: &SpectralWindow, out: &mut [f64]) {
    let te = plasma.electron_temperature(p);
    let ne = plasma.electron_density(p);
    if te <= 0.0 || ne <= 0.0 {
        return;
    }
    let zeff = effective_charge(plasma, p, ne);
    let t_kelvin = te * EV_TO_KELVIN;
    let prefactor = BREMSSTRAHLUNG_COEFFICIENT * zeff * ne * ne / t_kelvin.sqrt();

    for (slot, centre) in out.iter_mut().zip(window.centres().iter()) {
        let lambda = centre * 1e-9;
        let nu = SPEED_OF_LIGHT / lambda;
        let j_nu = prefactor * (-PLANCK * nu / (BOLTZMANN * t_kelvin)).exp();
        // per Hz -> per nm
        *slot += j_nu * SPEED_OF_LIGHT / (lambda * lambda) * 1e-9;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atomic::RateLibrary;
    use crate::composition::{Composition, Distribution, Species, Uniform};
    use std::sync::Arc;
    use synth_types::error::DiagError;
    use synth_types::species::DEUTERIUM;

    fn uniform(density: f64) -> Box<dyn Distribution> {
        Box::new(Uniform {
            density,
            temperature: 10.0,
        })
    }

    fn plasma(stages: &[u32]) -> Plasma {
        let mut comp = Composition::new();
        for &stage in stages {
            comp.add(Species {
                element: &DEUTERIUM,
                ionisation: stage,
                distribution: uniform(1e19),
            })
            .unwrap();
        }
        let mut plasma = Plasma::new("test", uniform(1e19), comp);
        plasma.set_atomic_data(Arc::new(RateLibrary::new(true)));
        plasma
    }

    fn line_model(transition: TransitionKind) -> EmissionModel {
        EmissionModel::Line(LineModel {
            line: Line::new(&DEUTERIUM, 0, 3, 2),
            transition,
            lineshape: Lineshape::Doppler,
        })
    }

    #[test]
    fn test_recombination_needs_next_stage() {
        let neutral_only = plasma(&[0]);
        let window = SpectralWindow::centred(656.1, 2.0, 20).unwrap();
        let mut out = vec![0.0; 20];
        let err = line_model(TransitionKind::Recombination)
            .emission(&neutral_only, Point3::default(), &window, &mut out)
            .unwrap_err();
        assert!(matches!(
            err,
            DiagError::MissingComposition { ionisation: 1, .. }
        ));
        line_model(TransitionKind::Excitation)
            .emission(&neutral_only, Point3::default(), &window, &mut out)
            .unwrap();
        assert!(out.iter().sum::<f64>() > 0.0);
    }

    #[test]
    fn test_bremsstrahlung_continuum() {
        let p = plasma(&[0, 1]);
        let window = SpectralWindow::new(10, 400.0, 700.0).unwrap();
        let mut out = vec![0.0; 10];
        EmissionModel::Bremsstrahlung
            .emission(&p, Point3::default(), &window, &mut out)
            .unwrap();
        assert!(out.iter().all(|&v| v > 0.0 && v.is_finite()));
        // At 10 eV the continuum still rises toward the blue.
        assert!(out[0] > out[9]);
        assert!((effective_charge(&p, Point3::default(), 1e19) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            line_model(TransitionKind::Excitation).to_string(),
            "excitation deuterium 0 (3 -> 2) [doppler]"
        );
        assert_eq!(EmissionModel::Bremsstrahlung.to_string(), "bremsstrahlung");
    }
}
