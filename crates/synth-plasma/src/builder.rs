// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Emission Model Builder
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Turns configured emission instructions into models bound to a plasma.
//!
//! The plasma is only touched once every instruction has been resolved:
//! atomic data and the full model list are assigned together at the end,
//! so a failed build leaves the plasma as it was.

use crate::atomic::{AtomicData, Line, RateLibrary};
use crate::emission::{EmissionModel, LineModel};
use crate::lineshape::{stark_coefficients, Lineshape};
use crate::plasma::Plasma;
use log::{debug, info};
use ndarray::Array2;
use std::sync::Arc;
use synth_types::config::{EmissionInstruction, PlasmaConfig, ProfileGridConfig, TransitionKind};
use synth_types::constants::PROFILE_HALF_WINDOW_NM;
use synth_types::error::{DiagError, DiagResult};
use synth_types::species;
use synth_types::spectrum::SpectralWindow;
use synth_types::state::PoloidalGrid;

/// Wavelength-integrated emissivity [W/m³/sr] on the poloidal plane,
/// indexed [iy, ix].
#[derive(Debug, Clone)]
pub struct EmissionProfile {
    pub grid: PoloidalGrid,
    pub values: Array2<f64>,
    /// Spectral bins used when integrating each line.
    pub bins: usize,
}

impl EmissionProfile {
    pub fn new(grid: PoloidalGrid, bins: usize) -> Self {
        let values = Array2::zeros((grid.ny, grid.nx));
        EmissionProfile { grid, values, bins }
    }

    pub fn from_config(cfg: &ProfileGridConfig) -> Self {
        Self::new(PoloidalGrid::from_config(cfg), cfg.emission_bins)
    }
}

/// Build every configured emission model and bind the list to `plasma`.
///
/// When `profile` is given, lines flagged `profile_2d` are integrated over
/// ±5 nm at every grid node and added into it.
pub fn build_emission(
    config: &PlasmaConfig,
    plasma: &mut Plasma,
    profile: Option<&mut EmissionProfile>,
) -> DiagResult<()> {
    let mut library = RateLibrary::new(config.atomic_data.permit_extrapolation);

    for install in &config.atomic_data.adf15 {
        let element = species::lookup(&install.species)?;
        let count = library.install_adf15(
            element,
            install.ionisation,
            &install.file,
            &install.excitation,
            &install.recombination,
        )?;
        info!(
            "ADF15 {}: {count} block(s) for {element} {}",
            install.file.display(),
            install.ionisation
        );
    }

    let mut models = Vec::with_capacity(config.emission_instructions.len() + 1);
    if config.bremsstrahlung {
        models.push(EmissionModel::Bremsstrahlung);
    }

    let mut profiled = Vec::new();
    for instruction in &config.emission_instructions {
        let model = line_model(instruction, plasma, &mut library)?;
        debug!("emission model: {model}");
        if instruction.profile_2d {
            profiled.push(models.len());
        }
        models.push(model);
    }

    info!("binding {} emission model(s) to plasma '{}'", models.len(), plasma.name());
    plasma.set_atomic_data(Arc::new(library));
    plasma.set_models(models);

    if let Some(profile) = profile {
        for index in profiled {
            let model = plasma.models()[index].clone();
            accumulate_profile(plasma, model, profile)?;
        }
    }
    Ok(())
}

fn line_model(
    instruction: &EmissionInstruction,
    plasma: &Plasma,
    library: &mut RateLibrary,
) -> DiagResult<EmissionModel> {
    instruction.validate()?;
    let element = species::lookup(&instruction.species)?;
    let line = Line::new(
        element,
        instruction.ionisation,
        instruction.upper,
        instruction.lower,
    );

    if let Some(wavelength) = instruction.wavelength_override() {
        library.set_wavelength(&line, wavelength)?;
    }

    // Fail here, not mid-run, when the background lacks the stage.
    let composition = plasma.composition();
    composition.get(element, instruction.ionisation)?;
    if instruction.kind == TransitionKind::Recombination {
        composition.get(element, instruction.ionisation + 1)?;
    }

    if !library.supports(&line, instruction.kind) {
        return Err(DiagError::AtomicData(format!(
            "no {:?} rate data for {line}",
            instruction.kind
        )));
    }
    library.wavelength(&line)?;

    let lineshape = Lineshape::from_instruction(instruction)?;
    if let Lineshape::StarkBroadened { upper, lower } = lineshape {
        if element.atomic_number != 1 || stark_coefficients(upper, lower).is_none() {
            return Err(DiagError::ConfigError(format!(
                "Stark broadening is not available for {line}"
            )));
        }
    }

    Ok(EmissionModel::Line(LineModel {
        line,
        transition: instruction.kind,
        lineshape,
    }))
}

/// Centre of the profile window for one model.
fn profile_centre(plasma: &Plasma, model: &LineModel) -> DiagResult<f64> {
    match &model.lineshape {
        Lineshape::Multiplet {
            wavelengths,
            ratios,
        } => Ok(wavelengths.iter().zip(ratios).map(|(w, r)| w * r).sum()),
        _ => plasma.atomic_data()?.wavelength(&model.line),
    }
}

/// Swap a single-model list onto the plasma, sample the grid, and put the
/// full list back whatever the outcome.
fn accumulate_profile(
    plasma: &mut Plasma,
    model: EmissionModel,
    profile: &mut EmissionProfile,
) -> DiagResult<()> {
    let EmissionModel::Line(line_model) = &model else {
        return Ok(());
    };
    let centre = profile_centre(plasma, line_model)?;
    let window = SpectralWindow::centred(centre, PROFILE_HALF_WINDOW_NM, profile.bins)?;
    info!("2-D emission profile for {model} ({centre:.2} nm)");

    let full = plasma.set_models(vec![model]);
    let result = sample_grid(plasma, &window, profile);
    plasma.set_models(full);
    result
}

fn sample_grid(
    plasma: &Plasma,
    window: &SpectralWindow,
    profile: &mut EmissionProfile,
) -> DiagResult<()> {
    let mut spectrum = vec![0.0; window.bins()];
    for iy in 0..profile.grid.ny {
        for ix in 0..profile.grid.nx {
            spectrum.iter_mut().for_each(|v| *v = 0.0);
            plasma.spectral_emission(profile.grid.point(iy, ix), window, &mut spectrum)?;
            profile.values[[iy, ix]] += spectrum.iter().sum::<f64>() * window.bin_width();
        }
    }
    Ok(())
}
