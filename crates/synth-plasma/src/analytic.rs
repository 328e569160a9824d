// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Analytic Edge Plasma
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Analytic pedestal/SOL background.
//!
//! Flux label from an elliptical boundary:
//!
//!   ρ = sqrt(((R − R0)/a)² + (z/(κa))²)
//!
//! Inside the separatrix (ρ ≤ 1) Te and ne follow a tanh pedestal from the
//! core value down to the separatrix value. Outside they decay
//! exponentially with the scrape-off-layer length. Quasi-neutrality sets
//! the D+ density after impurities are accounted for.

use crate::composition::{Composition, Distribution, Species};
use crate::plasma::Plasma;
use std::sync::Arc;
use synth_types::config::AnalyticPlasmaConfig;
use synth_types::error::{DiagError, DiagResult};
use synth_types::geometry::Point3;
use synth_types::species::{self, Element, DEUTERIUM};

/// Width of the Gaussian charge-state distribution, in charge units.
const CHARGE_STATE_SPREAD: f64 = 0.75;

/// Ionisation balance scale: mean charge Z·Te/(Te + k·Z²).
const IONISATION_BALANCE_SCALE: f64 = 5.0;

#[derive(Debug, Clone)]
pub struct AnalyticBackground {
    config: AnalyticPlasmaConfig,
    impurity: Option<(&'static Element, f64)>,
}

impl AnalyticBackground {
    pub fn new(config: &AnalyticPlasmaConfig) -> DiagResult<Self> {
        let checks = [
            ("major_radius", config.major_radius),
            ("minor_radius", config.minor_radius),
            ("elongation", config.elongation),
            ("te_core", config.te_core),
            ("te_separatrix", config.te_separatrix),
            ("ne_core", config.ne_core),
            ("ne_separatrix", config.ne_separatrix),
            ("pedestal_width", config.pedestal_width),
            ("decay_length", config.decay_length),
            ("neutral_penetration", config.neutral_penetration),
            ("neutral_temperature", config.neutral_temperature),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(DiagError::ConfigError(format!(
                    "plasma.edge.analytic.{name} must be finite and > 0, got {value}"
                )));
            }
        }
        if !(0.0..1.0).contains(&config.neutral_fraction) {
            return Err(DiagError::ConfigError(format!(
                "plasma.edge.analytic.neutral_fraction must be in [0, 1), got {}",
                config.neutral_fraction
            )));
        }

        let impurity = match &config.impurity {
            Some(imp) => {
                let element = species::lookup(&imp.species)?;
                // Fully stripped impurity must not exceed ne.
                let max = 1.0 / element.atomic_number as f64;
                if !(0.0..max).contains(&imp.concentration) {
                    return Err(DiagError::ConfigError(format!(
                        "impurity concentration for {element} must be in [0, {max:.3}), got {}",
                        imp.concentration
                    )));
                }
                Some((element, imp.concentration))
            }
            None => None,
        };

        Ok(AnalyticBackground {
            config: config.clone(),
            impurity,
        })
    }

    pub fn impurity(&self) -> Option<&'static Element> {
        self.impurity.map(|(e, _)| e)
    }

    /// Normalised flux label ρ at `p`.
    pub fn rho(&self, p: Point3) -> f64 {
        let c = &self.config;
        let dr = (p.major_radius() - c.major_radius) / c.minor_radius;
        let dz = p.z / (c.elongation * c.minor_radius);
        dr.hypot(dz)
    }

    /// 1 on axis, 0 at the separatrix.
    fn pedestal_shape(&self, rho: f64) -> f64 {
        let w = self.config.pedestal_width;
        ((1.0 - rho) / w).tanh() / (1.0 / w).tanh()
    }

    fn sol_decay(&self, rho: f64) -> f64 {
        (-(rho - 1.0) * self.config.minor_radius / self.config.decay_length).exp()
    }

    fn profile(&self, p: Point3, core: f64, separatrix: f64) -> f64 {
        let rho = self.rho(p);
        if rho <= 1.0 {
            separatrix + (core - separatrix).max(0.0) * self.pedestal_shape(rho)
        } else {
            separatrix * self.sol_decay(rho)
        }
    }

    pub fn electron_temperature(&self, p: Point3) -> f64 {
        self.profile(p, self.config.te_core, self.config.te_separatrix)
    }

    pub fn electron_density(&self, p: Point3) -> f64 {
        self.profile(p, self.config.ne_core, self.config.ne_separatrix)
    }

    /// Neutral deuterium: flat in the SOL at the separatrix level, decaying
    /// inward over the penetration length.
    pub fn neutral_density(&self, p: Point3) -> f64 {
        let c = &self.config;
        let edge = c.neutral_fraction * c.ne_separatrix;
        let rho = self.rho(p);
        if rho >= 1.0 {
            edge
        } else {
            edge * (-(1.0 - rho) * c.minor_radius / c.neutral_penetration).exp()
        }
    }

    /// Fractional abundance of each impurity stage 0..=Z at temperature `te`.
    pub fn charge_state_fractions(element: &Element, te: f64) -> Vec<f64> {
        let z = element.atomic_number as f64;
        let te = te.max(0.0);
        let mean = z * te / (te + IONISATION_BALANCE_SCALE * z * z);
        let weights: Vec<f64> = (0..element.stage_count())
            .map(|k| {
                let d = (k as f64 - mean) / CHARGE_STATE_SPREAD;
                (-0.5 * d * d).exp()
            })
            .collect();
        let total: f64 = weights.iter().sum();
        weights.into_iter().map(|w| w / total).collect()
    }

    pub fn impurity_density(&self, stage: u32, p: Point3) -> f64 {
        match self.impurity {
            Some((element, concentration)) => {
                let fractions = Self::charge_state_fractions(element, self.electron_temperature(p));
                fractions.get(stage as usize).copied().unwrap_or(0.0)
                    * concentration
                    * self.electron_density(p)
            }
            None => 0.0,
        }
    }

    /// D+ density from quasi-neutrality.
    pub fn ion_density(&self, p: Point3) -> f64 {
        let ne = self.electron_density(p);
        let impurity_electrons = match self.impurity {
            Some((element, concentration)) => {
                let fractions = Self::charge_state_fractions(element, self.electron_temperature(p));
                let mean_charge: f64 = fractions
                    .iter()
                    .enumerate()
                    .map(|(k, f)| k as f64 * f)
                    .sum();
                concentration * mean_charge * ne
            }
            None => 0.0,
        };
        (ne - impurity_electrons).max(0.0)
    }
}

/// Population a distribution reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Population {
    Electrons,
    DeuteriumNeutral,
    DeuteriumIon,
    Impurity(u32),
}

/// [`Distribution`] view of one population of a shared background.
#[derive(Debug, Clone)]
pub struct AnalyticDistribution {
    background: Arc<AnalyticBackground>,
    population: Population,
}

impl AnalyticDistribution {
    pub fn new(background: Arc<AnalyticBackground>, population: Population) -> Self {
        AnalyticDistribution {
            background,
            population,
        }
    }
}

impl Distribution for AnalyticDistribution {
    fn density(&self, p: Point3) -> f64 {
        match self.population {
            Population::Electrons => self.background.electron_density(p),
            Population::DeuteriumNeutral => self.background.neutral_density(p),
            Population::DeuteriumIon => self.background.ion_density(p),
            Population::Impurity(stage) => self.background.impurity_density(stage, p),
        }
    }

    fn effective_temperature(&self, p: Point3) -> f64 {
        match self.population {
            Population::DeuteriumNeutral => self.background.config.neutral_temperature,
            Population::Impurity(0) => self.background.config.neutral_temperature,
            // Ions thermalised with electrons.
            _ => self.background.electron_temperature(p),
        }
    }
}

/// Build a plasma with electrons, D0, D+ and, when configured, every
/// impurity stage.
pub fn analytic_plasma(config: &AnalyticPlasmaConfig) -> DiagResult<Plasma> {
    let background = Arc::new(AnalyticBackground::new(config)?);
    let view = |population| Box::new(AnalyticDistribution::new(background.clone(), population));

    let mut composition = Composition::new();
    composition.add(Species {
        element: &DEUTERIUM,
        ionisation: 0,
        distribution: view(Population::DeuteriumNeutral),
    })?;
    composition.add(Species {
        element: &DEUTERIUM,
        ionisation: 1,
        distribution: view(Population::DeuteriumIon),
    })?;
    if let Some(element) = background.impurity() {
        for stage in 0..=element.atomic_number {
            composition.add(Species {
                element,
                ionisation: stage,
                distribution: view(Population::Impurity(stage)),
            })?;
        }
    }
    Ok(Plasma::new(
        "analytic",
        view(Population::Electrons),
        composition,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use synth_types::config::ImpurityConfig;
    use synth_types::species::CARBON;

    fn background(impurity: Option<ImpurityConfig>) -> AnalyticBackground {
        let config = AnalyticPlasmaConfig {
            impurity,
            ..Default::default()
        };
        AnalyticBackground::new(&config).unwrap()
    }

    #[test]
    fn test_profiles_continuous_at_separatrix() {
        let bg = background(None);
        let cfg = AnalyticPlasmaConfig::default();
        let inside = Point3::new(cfg.major_radius + cfg.minor_radius - 1e-9, 0.0, 0.0);
        let outside = Point3::new(cfg.major_radius + cfg.minor_radius + 1e-9, 0.0, 0.0);
        let te_in = bg.electron_temperature(inside);
        let te_out = bg.electron_temperature(outside);
        assert!((te_in - cfg.te_separatrix).abs() < 1e-3);
        assert!((te_out - cfg.te_separatrix).abs() < 1e-3);

        let axis = Point3::new(cfg.major_radius, 0.0, 0.0);
        assert!((bg.electron_temperature(axis) - cfg.te_core).abs() < 1e-6);
        assert!((bg.electron_density(axis) - cfg.ne_core).abs() < 1e-6 * cfg.ne_core);
    }

    #[test]
    fn test_sol_decays() {
        let bg = background(None);
        let near = Point3::new(1.5, 0.0, 0.0);
        let far = Point3::new(1.9, 0.0, 0.0);
        assert!(bg.electron_density(far) < bg.electron_density(near));
        assert!(bg.electron_temperature(far) > 0.0);
    }

    #[test]
    fn test_toroidal_symmetry() {
        let bg = background(None);
        let a = Point3::new(1.2, 0.0, 0.3);
        let b = Point3::new(0.0, 1.2, 0.3);
        assert!((bg.electron_density(a) - bg.electron_density(b)).abs() < 1e-3);
    }

    #[test]
    fn test_fractions_normalised() {
        for te in [0.5, 10.0, 100.0, 5000.0] {
            let f = AnalyticBackground::charge_state_fractions(&CARBON, te);
            assert_eq!(f.len(), 7);
            assert!((f.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
        // Hotter plasma ionises further.
        let cold = AnalyticBackground::charge_state_fractions(&CARBON, 1.0);
        let hot = AnalyticBackground::charge_state_fractions(&CARBON, 5000.0);
        assert!(cold[0] > hot[0]);
        assert!(hot[6] > cold[6]);
    }

    #[test]
    fn test_quasi_neutrality() {
        let bg = background(Some(ImpurityConfig {
            species: "carbon".into(),
            concentration: 0.02,
        }));
        let p = Point3::new(1.0, 0.0, 0.2);
        let ne = bg.electron_density(p);
        let charge: f64 = bg.ion_density(p)
            + (0..=6)
                .map(|k| k as f64 * bg.impurity_density(k, p))
                .sum::<f64>();
        assert!((charge - ne).abs() / ne < 1e-9);
    }

    #[test]
    fn test_plasma_composition() {
        let config = AnalyticPlasmaConfig {
            impurity: Some(ImpurityConfig {
                species: "neon".into(),
                concentration: 0.01,
            }),
            ..Default::default()
        };
        let plasma = analytic_plasma(&config).unwrap();
        // D0, D+ and Ne 0..=10
        assert_eq!(plasma.composition().len(), 2 + 11);
        assert!(plasma.composition().contains(&DEUTERIUM, 1));

        let bad = AnalyticPlasmaConfig {
            impurity: Some(ImpurityConfig {
                species: "francium".into(),
                concentration: 0.01,
            }),
            ..Default::default()
        };
        assert!(matches!(
            analytic_plasma(&bad),
            Err(DiagError::InvalidSpecies(_))
        ));
    }
}
