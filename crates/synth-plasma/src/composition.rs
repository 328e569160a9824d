// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Plasma Composition
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Species-resolved plasma composition.

use synth_types::error::{DiagError, DiagResult};
use synth_types::geometry::Point3;
use synth_types::species::Element;

/// Spatial distribution of one plasma population.
pub trait Distribution: Send + Sync {
    /// Density [m⁻³] at `p`.
    fn density(&self, p: Point3) -> f64;
    /// Effective temperature [eV] at `p`.
    fn effective_temperature(&self, p: Point3) -> f64;
}

/// One (element, ionisation stage) population.
pub struct Species {
    pub element: &'static Element,
    pub ionisation: u32,
    pub distribution: Box<dyn Distribution>,
}

impl std::fmt::Debug for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Species")
            .field("element", &self.element.name)
            .field("ionisation", &self.ionisation)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct Composition {
    species: Vec<Species>,
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a population. Each (element, stage) pair may appear once.
    pub fn add(&mut self, species: Species) -> DiagResult<()> {
        if species.ionisation > species.element.atomic_number {
            return Err(DiagError::ConfigError(format!(
                "{} has no ionisation stage {}",
                species.element, species.ionisation
            )));
        }
        if self.contains(species.element, species.ionisation) {
            return Err(DiagError::ConfigError(format!(
                "duplicate composition entry {} {}",
                species.element, species.ionisation
            )));
        }
        self.species.push(species);
        Ok(())
    }

    pub fn contains(&self, element: &Element, ionisation: u32) -> bool {
        self.species
            .iter()
            .any(|s| s.element == element && s.ionisation == ionisation)
    }

    /// Population lookup; absent pairs are a `MissingComposition` error.
    pub fn get(&self, element: &Element, ionisation: u32) -> DiagResult<&Species> {
        self.species
            .iter()
            .find(|s| s.element == element && s.ionisation == ionisation)
            .ok_or_else(|| DiagError::MissingComposition {
                species: element.name.to_string(),
                ionisation,
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Species> {
        self.species.iter()
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

/// Spatially uniform population, mostly for tests and calibration runs.
#[derive(Debug, Clone, Copy)]
pub struct Uniform {
    pub density: f64,
    pub temperature: f64,
}

impl Distribution for Uniform {
    fn density(&self, _p: Point3) -> f64 {
        self.density
    }

    fn effective_temperature(&self, _p: Point3) -> f64 {
        self.temperature
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synth_types::species::{CARBON, DEUTERIUM, HYDROGEN};

    fn uniform(density: f64) -> Box<dyn Distribution> {
        Box::new(Uniform {
            density,
            temperature: 10.0,
        })
    }

    #[test]
    fn test_get_present_species() {
        let mut comp = Composition::new();
        comp.add(Species {
            element: &DEUTERIUM,
            ionisation: 1,
            distribution: uniform(1e19),
        })
        .unwrap();
        let s = comp.get(&DEUTERIUM, 1).unwrap();
        assert_eq!(s.distribution.density(Point3::default()), 1e19);
    }

    #[test]
    fn test_missing_stage_is_error() {
        let mut comp = Composition::new();
        comp.add(Species {
            element: &DEUTERIUM,
            ionisation: 1,
            distribution: uniform(1e19),
        })
        .unwrap();
        match comp.get(&DEUTERIUM, 0) {
            Err(DiagError::MissingComposition {
                species,
                ionisation,
            }) => {
                assert_eq!(species, "deuterium");
                assert_eq!(ionisation, 0);
            }
            other => panic!("expected MissingComposition, got {other:?}"),
        }
        // Hydrogen is a different population from deuterium.
        assert!(comp.get(&HYDROGEN, 1).is_err());
    }

    #[test]
    fn test_rejects_duplicates_and_impossible_stages() {
        let mut comp = Composition::new();
        comp.add(Species {
            element: &CARBON,
            ionisation: 6,
            distribution: uniform(1e17),
        })
        .unwrap();
        assert!(comp
            .add(Species {
                element: &CARBON,
                ionisation: 6,
                distribution: uniform(1e17),
            })
            .is_err());
        assert!(comp
            .add(Species {
                element: &CARBON,
                ionisation: 7,
                distribution: uniform(1e17),
            })
            .is_err());
        assert_eq!(comp.len(), 1);
    }
}
