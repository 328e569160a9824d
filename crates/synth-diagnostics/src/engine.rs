// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — DMS Sampling Engine
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Divertor monitoring spectrometer (DMS) sampling.
//!
//! For every selected fibre the engine runs the enabled channels in order:
//! integrated power, spectral radiance, then plasma parameters along the
//! central line of sight. Channels that are switched off stay unset. Any
//! failure aborts the whole run.

use crate::fibres::{FibreBundle, FibreChoice, FibrePose};
use crate::machine::Scene;
use crate::sampler::{FibreParameters, OpticalSampler};
use log::{debug, info};
use synth_plasma::plasma::Plasma;
use synth_types::config::{DmsConfig, EdgeConfig};
use synth_types::constants::DEUTERIUM_STAGES;
use std::f64::consts::TAU;
use synth_types::error::{DiagError, DiagResult};
use synth_types::geometry::Vec3;
use synth_types::species::{self, Element, DEUTERIUM};
use synth_types::spectrum::SpectralWindow;
use synth_types::state::DiagnosticResult;

/// Channel switches and optics for one DMS run.
#[derive(Debug, Clone)]
pub struct DmsSettings {
    pub choice: FibreChoice,
    pub power: bool,
    pub radiance: bool,
    pub te_los: bool,
    pub ne_los: bool,
    pub ni_los: bool,
    pub impurity: Option<&'static Element>,
    pub los_steps: usize,
    pub acceptance_angle: f64,
    pub radius: f64,
    pub pixel_samples: usize,
    pub spectral_rays: usize,
}

impl DmsSettings {
    /// LOS channels need both `dms.los_profiles` and the matching edge flag.
    pub fn from_config(dms: &DmsConfig, edge: &EdgeConfig, numfibres: usize) -> DiagResult<Self> {
        let los = dms.los_profiles;
        let impurity = match edge.impurity_species() {
            Some(name) if los => Some(species::lookup(name)?),
            _ => None,
        };
        Ok(DmsSettings {
            choice: FibreChoice::parse(dms.fibre_choice, numfibres)?,
            power: dms.power_pipeline,
            radiance: dms.radiance_pipeline,
            te_los: los && edge.te_2d,
            ne_los: los && edge.ne_2d,
            ni_los: los && edge.ni_2d,
            impurity,
            los_steps: dms.los_steps,
            acceptance_angle: dms.acceptance_angle,
            radius: dms.radius,
            pixel_samples: dms.pixel_samples,
            spectral_rays: dms.spectral_rays,
        })
    }

    pub fn any_los(&self) -> bool {
        self.te_los || self.ne_los || self.ni_los || self.impurity.is_some()
    }

    fn parameters(&self, window: SpectralWindow) -> FibreParameters {
        FibreParameters {
            acceptance_angle: self.acceptance_angle,
            radius: self.radius,
            pixel_samples: self.pixel_samples,
            spectral_rays: self.spectral_rays,
            window,
        }
    }
}

/// Rim points tested when checking an aperture against the vessel.
const APERTURE_RIM_POINTS: usize = 16;

/// Ray starts are jittered over the aperture disc, so its rim must lie
/// inside the scene.
fn check_aperture(pose: &FibrePose, radius: f64, scene: &dyn Scene) -> DiagResult<()> {
    let (right, up) = Vec3::orthonormal_basis(&pose.forward, &pose.up);
    for k in 0..APERTURE_RIM_POINTS {
        let phi = TAU * k as f64 / APERTURE_RIM_POINTS as f64;
        let rim = pose.origin + right * (radius * phi.cos()) + up * (radius * phi.sin());
        if !scene.contains(rim) {
            return Err(DiagError::ConfigError(format!(
                "dms.radius = {radius} m puts the aperture of fibre {} outside the vessel",
                pose.number
            )));
        }
    }
    Ok(())
}

/// Distances of `steps` equally spaced points from 0 to `length` inclusive.
/// A single step samples the origin only.
pub fn los_positions(length: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![0.0],
        n => (0..n)
            .map(|j| j as f64 * length / (n - 1) as f64)
            .collect(),
    }
}

/// Sample every selected fibre of `bundle`.
pub fn sample(
    settings: &DmsSettings,
    scene: &dyn Scene,
    plasma: &Plasma,
    window: &SpectralWindow,
    bundle: &FibreBundle,
    sampler: &dyn OpticalSampler,
) -> DiagResult<DiagnosticResult> {
    // Wall distances are recorded for the whole bundle, so an unselected
    // fibre that misses the wall still fails the run.
    let geometry = bundle.geometry(scene)?;
    let mut result = DiagnosticResult::new(
        bundle.name(),
        window.centres(),
        geometry,
        settings.los_steps,
        settings.impurity,
    );
    let params = settings.parameters(*window);
    let numbers = settings.choice.numbers(bundle.numfibres());

    info!(
        "DMS '{}': {} of {} fibres, {} bins [{:.2}, {:.2}] nm",
        bundle.name(),
        numbers.len(),
        bundle.numfibres(),
        window.bins(),
        window.lower(),
        window.upper()
    );

    if settings.power || settings.radiance {
        for &number in &numbers {
            check_aperture(&bundle.pose(number)?, settings.radius, scene)?;
        }
    }

    for number in numbers {
        let pose = bundle.pose(number)?;
        info!("Sampling fibre {number}/{}", bundle.numfibres());
        sample_fibre(settings, &params, &pose, scene, plasma, sampler, &mut result)?;
    }
    Ok(result)
}

fn sample_fibre(
    settings: &DmsSettings,
    params: &FibreParameters,
    pose: &FibrePose,
    scene: &dyn Scene,
    plasma: &Plasma,
    sampler: &dyn OpticalSampler,
    result: &mut DiagnosticResult,
) -> DiagResult<()> {
    let arridx = pose.index();

    if settings.power {
        let estimate = sampler.observe_power(pose, params, scene, plasma)?;
        debug!(
            "fibre {}: power {:.4e} W (var {:.2e}, n={})",
            pose.number, estimate.mean, estimate.variance, estimate.samples
        );
        result.power[arridx] = Some(estimate.mean);
    }

    if settings.radiance {
        let estimate = sampler.observe_radiance(pose, params, scene, plasma)?;
        for (cell, value) in result
            .spectra
            .column_mut(arridx)
            .iter_mut()
            .zip(estimate.mean.iter())
        {
            *cell = Some(*value);
        }
    }

    if settings.any_los() {
        sample_los(settings, pose, scene, plasma, result)?;
    }
    Ok(())
}

fn sample_los(
    settings: &DmsSettings,
    pose: &FibrePose,
    scene: &dyn Scene,
    plasma: &Plasma,
    result: &mut DiagnosticResult,
) -> DiagResult<()> {
    let arridx = pose.index();
    let length = scene.distance_to_boundary(pose.origin, pose.forward)?;

    for (j, t) in los_positions(length, settings.los_steps).into_iter().enumerate() {
        let p = pose.origin + pose.forward * t;
        result.los_distance[[j, arridx]] = Some(t);

        if settings.te_los {
            result.te_los[[j, arridx]] = Some(plasma.electron_temperature(p));
        }
        if settings.ne_los {
            result.ne_los[[j, arridx]] = Some(plasma.electron_density(p));
        }
        if settings.ni_los {
            for stage in 0..DEUTERIUM_STAGES {
                let n = plasma.species_density(&DEUTERIUM, stage as u32, p)?;
                result.ni_los[[j, arridx, stage]] = Some(n);
            }
        }
        if let Some(nz) = result.nz_los.as_mut() {
            for stage in 0..nz.element.stage_count() {
                let n = plasma.species_density(nz.element, stage as u32, p)?;
                nz.density[[j, arridx, stage]] = Some(n);
            }
        }
    }
    Ok(())
}
