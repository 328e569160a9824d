// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Plasma Field
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Plasma field: electrons, composition, atomic data and the active
//! emission models.

use crate::atomic::AtomicData;
use crate::composition::{Composition, Distribution};
use crate::emission::EmissionModel;
use std::fmt;
use std::sync::Arc;
use synth_types::error::{DiagError, DiagResult};
use synth_types::geometry::Point3;
use synth_types::species::Element;
use synth_types::spectrum::SpectralWindow;

pub struct Plasma {
    name: String,
    electrons: Box<dyn Distribution>,
    composition: Composition,
    atomic_data: Option<Arc<dyn AtomicData>>,
    models: Vec<EmissionModel>,
}

impl Plasma {
    pub fn new(
        name: impl Into<String>,
        electrons: Box<dyn Distribution>,
        composition: Composition,
    ) -> Self {
        Plasma {
            name: name.into(),
            electrons,
            composition,
            atomic_data: None,
            models: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Te [eV] at `p`.
    pub fn electron_temperature(&self, p: Point3) -> f64 {
        self.electrons.effective_temperature(p)
    }

    /// ne [m⁻³] at `p`.
    pub fn electron_density(&self, p: Point3) -> f64 {
        self.electrons.density(p)
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    /// Density [m⁻³] of one stage at `p`; absent stages are an error.
    pub fn species_density(&self, element: &Element, ionisation: u32, p: Point3) -> DiagResult<f64> {
        Ok(self
            .composition
            .get(element, ionisation)?
            .distribution
            .density(p))
    }

    pub fn set_atomic_data(&mut self, atomic_data: Arc<dyn AtomicData>) {
        self.atomic_data = Some(atomic_data);
    }

    pub fn atomic_data(&self) -> DiagResult<&dyn AtomicData> {
        self.atomic_data
            .as_deref()
            .ok_or_else(|| DiagError::AtomicData(format!("plasma '{}' has no atomic data", self.name)))
    }

    /// Replace the active model list, returning the previous one.
    pub fn set_models(&mut self, models: Vec<EmissionModel>) -> Vec<EmissionModel> {
        std::mem::replace(&mut self.models, models)
    }

    pub fn models(&self) -> &[EmissionModel] {
        &self.models
    }

    /// Add the spectral emissivity [W/m³/sr/nm] of every active model at
    /// `p` into `out` (one slot per window bin).
    pub fn spectral_emission(
        &self,
        p: Point3,
        window: &SpectralWindow,
        out: &mut [f64],
    ) -> DiagResult<()> {
        if out.len() != window.bins() {
            return Err(DiagError::SamplingFailed(format!(
                "emission buffer has {} slots for a {}-bin window",
                out.len(),
                window.bins()
            )));
        }
        for model in &self.models {
            model.emission(self, p, window, out)?;
        }
        Ok(())
    }

    /// Emissivity [W/m³/sr] integrated over `window`.
    pub fn integrated_emission(&self, p: Point3, window: &SpectralWindow) -> DiagResult<f64> {
        let mut spectrum = vec![0.0; window.bins()];
        self.spectral_emission(p, window, &mut spectrum)?;
        Ok(spectrum.iter().sum::<f64>() * window.bin_width())
    }
}

impl fmt::Debug for Plasma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plasma")
            .field("name", &self.name)
            .field("composition", &self.composition)
            .field("atomic_data", &self.atomic_data.is_some())
            .field("models", &self.models)
            .finish()
    }
}
