// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{DiagError, DiagResult};
use crate::geometry::{Point3, Vec3};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level simulation configuration.
/// Keeps the key names of the existing JSON run files, including the
/// mixed-case edge flags (`SOLPS_format`, `Te2D`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub machine: MachineConfig,
    pub plasma: PlasmaConfig,
    #[serde(default)]
    pub dms: DmsConfig,
    #[serde(default)]
    pub observer: ObserverConfig,
    #[serde(default)]
    pub raytracing: RaytracingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineConfig {
    pub name: String,
    /// Request reflecting first-wall materials.
    #[serde(default)]
    pub reflecting: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlasmaConfig {
    pub edge: EdgeConfig,
    #[serde(default)]
    pub emission_instructions: Vec<EmissionInstruction>,
    /// Append a continuum bremsstrahlung model.
    #[serde(default)]
    pub bremsstrahlung: bool,
    #[serde(default)]
    pub atomic_data: AtomicDataConfig,
    #[serde(default)]
    pub profiles: ProfileGridConfig,
}

/// Edge plasma background selection plus the profile channel flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeConfig {
    #[serde(default)]
    pub present: bool,
    /// Background type: "analytic", "gridded" or "SOLPS".
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(rename = "SOLPS_format", default, skip_serializing_if = "Option::is_none")]
    pub solps_format: Option<String>,
    /// File format of a gridded background ("npz").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytic: Option<AnalyticPlasmaConfig>,
    #[serde(rename = "Te2D", default = "default_true")]
    pub te_2d: bool,
    #[serde(rename = "ne2D", default = "default_true")]
    pub ne_2d: bool,
    #[serde(rename = "ni2D", default = "default_true")]
    pub ni_2d: bool,
    #[serde(rename = "nz2D", default)]
    pub nz_2d: bool,
    #[serde(rename = "nz2D_species", default, skip_serializing_if = "Option::is_none")]
    pub nz_2d_species: Option<String>,
}

impl EdgeConfig {
    /// Impurity species requested for profile output, if any.
    pub fn impurity_species(&self) -> Option<&str> {
        if self.nz_2d {
            self.nz_2d_species.as_deref()
        } else {
            None
        }
    }
}

/// Parameters of the analytic pedestal/SOL background.
/// Defaults describe a spherical-tokamak-sized plasma.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticPlasmaConfig {
    #[serde(default = "default_major_radius")]
    pub major_radius: f64,
    #[serde(default = "default_minor_radius")]
    pub minor_radius: f64,
    #[serde(default = "default_elongation")]
    pub elongation: f64,
    /// Core electron temperature [eV].
    #[serde(default = "default_te_core")]
    pub te_core: f64,
    /// Separatrix electron temperature [eV].
    #[serde(default = "default_te_sep")]
    pub te_separatrix: f64,
    /// Core electron density [m⁻³].
    #[serde(default = "default_ne_core")]
    pub ne_core: f64,
    /// Separatrix electron density [m⁻³].
    #[serde(default = "default_ne_sep")]
    pub ne_separatrix: f64,
    /// Pedestal width in normalised minor radius.
    #[serde(default = "default_pedestal_width")]
    pub pedestal_width: f64,
    /// Scrape-off-layer e-folding length [m].
    #[serde(default = "default_decay_length")]
    pub decay_length: f64,
    /// Neutral deuterium density at the separatrix relative to ne.
    #[serde(default = "default_neutral_fraction")]
    pub neutral_fraction: f64,
    /// Neutral penetration length inside the separatrix [m].
    #[serde(default = "default_neutral_penetration")]
    pub neutral_penetration: f64,
    /// Neutral temperature [eV].
    #[serde(default = "default_neutral_temperature")]
    pub neutral_temperature: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impurity: Option<ImpurityConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpurityConfig {
    pub species: String,
    /// Total impurity density relative to ne.
    pub concentration: f64,
}

fn default_major_radius() -> f64 {
    0.85
}
fn default_minor_radius() -> f64 {
    0.6
}
fn default_elongation() -> f64 {
    2.0
}
fn default_te_core() -> f64 {
    1000.0
}
fn default_te_sep() -> f64 {
    40.0
}
fn default_ne_core() -> f64 {
    4.0e19
}
fn default_ne_sep() -> f64 {
    1.0e19
}
fn default_pedestal_width() -> f64 {
    0.05
}
fn default_decay_length() -> f64 {
    0.1
}
fn default_neutral_fraction() -> f64 {
    0.01
}
fn default_neutral_penetration() -> f64 {
    0.05
}
fn default_neutral_temperature() -> f64 {
    2.0
}

impl Default for AnalyticPlasmaConfig {
    fn default() -> Self {
        AnalyticPlasmaConfig {
            major_radius: default_major_radius(),
            minor_radius: default_minor_radius(),
            elongation: default_elongation(),
            te_core: default_te_core(),
            te_separatrix: default_te_sep(),
            ne_core: default_ne_core(),
            ne_separatrix: default_ne_sep(),
            pedestal_width: default_pedestal_width(),
            decay_length: default_decay_length(),
            neutral_fraction: default_neutral_fraction(),
            neutral_penetration: default_neutral_penetration(),
            neutral_temperature: default_neutral_temperature(),
            impurity: None,
        }
    }
}

/// Atomic transition kind of an emission instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionKind {
    #[serde(rename = "ExcitationLine")]
    Excitation,
    #[serde(rename = "RecombinationLine")]
    Recombination,
}

/// Multiplet components: wavelengths [nm] with relative intensities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultipletSpec {
    pub wavelengths: Vec<f64>,
    pub ratios: Vec<f64>,
}

impl MultipletSpec {
    pub fn validate(&self) -> DiagResult<()> {
        if self.wavelengths.is_empty() || self.wavelengths.len() != self.ratios.len() {
            return Err(DiagError::ConfigError(format!(
                "multiplet needs matching non-empty wavelengths/ratios, got {} and {}",
                self.wavelengths.len(),
                self.ratios.len()
            )));
        }
        if self.wavelengths.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err(DiagError::ConfigError(
                "multiplet wavelengths must be finite and > 0".into(),
            ));
        }
        let total: f64 = self.ratios.iter().sum();
        if self.ratios.iter().any(|r| !r.is_finite() || *r < 0.0) || total <= 0.0 {
            return Err(DiagError::ConfigError(
                "multiplet ratios must be non-negative with a positive sum".into(),
            ));
        }
        Ok(())
    }
}

/// One configured request to include a transition's emission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmissionInstruction {
    pub species: String,
    pub ionisation: u32,
    pub upper: u32,
    pub lower: u32,
    #[serde(rename = "type")]
    pub kind: TransitionKind,
    /// Wavelength override [nm]. Zero means "use the atomic data".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wavelength: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplet: Option<MultipletSpec>,
    #[serde(default)]
    pub stark: bool,
    /// Accumulate this line into the 2-D emission profile.
    #[serde(default)]
    pub profile_2d: bool,
}

impl EmissionInstruction {
    /// Non-zero wavelength override, if any.
    pub fn wavelength_override(&self) -> Option<f64> {
        self.wavelength.filter(|w| *w != 0.0)
    }

    pub fn validate(&self) -> DiagResult<()> {
        if self.lower == 0 || self.upper <= self.lower {
            return Err(DiagError::ConfigError(format!(
                "emission line ({}, {}) for {} must have upper > lower >= 1",
                self.upper, self.lower, self.species
            )));
        }
        if let Some(w) = self.wavelength_override() {
            if !w.is_finite() || w < 0.0 {
                return Err(DiagError::ConfigError(format!(
                    "wavelength override must be finite and >= 0, got {w}"
                )));
            }
        }
        if let Some(multiplet) = &self.multiplet {
            multiplet.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtomicDataConfig {
    #[serde(default = "default_true")]
    pub permit_extrapolation: bool,
    /// ADF15 photon-emissivity tables installed before model construction.
    #[serde(default)]
    pub adf15: Vec<Adf15Install>,
}

impl Default for AtomicDataConfig {
    fn default() -> Self {
        AtomicDataConfig {
            permit_extrapolation: true,
            adf15: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adf15Install {
    pub species: String,
    pub ionisation: u32,
    pub file: PathBuf,
    #[serde(default)]
    pub excitation: Vec<BlockSelection>,
    #[serde(default)]
    pub recombination: Vec<BlockSelection>,
}

/// Maps a transition onto an ADF15 data block (1-based ISEL).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BlockSelection {
    pub upper: u32,
    pub lower: u32,
    pub isel: usize,
}

/// Poloidal (x, y) grid for 2-D profile output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileGridConfig {
    #[serde(default = "default_x_range")]
    pub x_range: [f64; 2],
    #[serde(default = "default_y_range")]
    pub y_range: [f64; 2],
    #[serde(default = "default_profile_points")]
    pub points: usize,
    /// Te clamp applied to the 2-D map [eV].
    #[serde(default = "default_te_ceiling")]
    pub te_ceiling: f64,
    /// Spectral bins across the ±5 nm emission-profile window.
    #[serde(default = "default_emission_bins")]
    pub emission_bins: usize,
}

fn default_x_range() -> [f64; 2] {
    [0.0, 2.5]
}
fn default_y_range() -> [f64; 2] {
    [-2.5, 2.5]
}
fn default_profile_points() -> usize {
    500
}
fn default_te_ceiling() -> f64 {
    50.0
}
fn default_emission_bins() -> usize {
    100
}

impl Default for ProfileGridConfig {
    fn default() -> Self {
        ProfileGridConfig {
            x_range: default_x_range(),
            y_range: default_y_range(),
            points: default_profile_points(),
            te_ceiling: default_te_ceiling(),
            emission_bins: default_emission_bins(),
        }
    }
}

/// Fan of fibres from a common origin to targets spaced evenly between
/// two end points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanSpec {
    pub origin: Point3,
    pub first_target: Point3,
    pub last_target: Point3,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowSpec {
    pub bins: usize,
    /// Lower wavelength bound [nm].
    pub lower: f64,
    /// Upper wavelength bound [nm].
    pub upper: f64,
}

/// Divertor monitoring spectrometer (DMS) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DmsConfig {
    #[serde(default)]
    pub simulate: bool,
    /// -1 samples every fibre; otherwise a 1-based fibre number.
    #[serde(default = "default_fibre_choice")]
    pub fibre_choice: i64,
    #[serde(default)]
    pub power_pipeline: bool,
    #[serde(default)]
    pub radiance_pipeline: bool,
    #[serde(default)]
    pub los_profiles: bool,
    /// Acceptance half-angle [deg].
    #[serde(default = "default_acceptance_angle")]
    pub acceptance_angle: f64,
    /// Fibre aperture radius [m].
    #[serde(default = "default_fibre_radius")]
    pub radius: f64,
    #[serde(default = "default_dms_pixel_samples")]
    pub pixel_samples: usize,
    #[serde(default = "default_spectral_rays")]
    pub spectral_rays: usize,
    #[serde(default = "default_los_steps")]
    pub los_steps: usize,
    /// Spectrometer setting name.
    #[serde(default = "default_spectrometer")]
    pub spectrometer: String,
    /// Fibre group name.
    #[serde(default = "default_fibres")]
    pub fibres: String,
    /// Inline fan replacing the catalogue group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<FanSpec>,
    /// Inline window replacing the spectrometer setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowSpec>,
    #[serde(default = "default_up_vector")]
    pub up_vector: Vec3,
}

fn default_fibre_choice() -> i64 {
    -1
}
fn default_acceptance_angle() -> f64 {
    1.0
}
fn default_fibre_radius() -> f64 {
    0.001
}
fn default_dms_pixel_samples() -> usize {
    5
}
fn default_spectral_rays() -> usize {
    1
}
fn default_los_steps() -> usize {
    100
}
fn default_spectrometer() -> String {
    "balmer_alpha".into()
}
fn default_fibres() -> String {
    "lower".into()
}
fn default_up_vector() -> Vec3 {
    Vec3::from(crate::constants::DEFAULT_UP_VECTOR)
}

impl Default for DmsConfig {
    fn default() -> Self {
        DmsConfig {
            simulate: false,
            fibre_choice: default_fibre_choice(),
            power_pipeline: false,
            radiance_pipeline: false,
            los_profiles: false,
            acceptance_angle: default_acceptance_angle(),
            radius: default_fibre_radius(),
            pixel_samples: default_dms_pixel_samples(),
            spectral_rays: default_spectral_rays(),
            los_steps: default_los_steps(),
            spectrometer: default_spectrometer(),
            fibres: default_fibres(),
            bundle: None,
            window: None,
            up_vector: default_up_vector(),
        }
    }
}

/// Filtered camera settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObserverConfig {
    #[serde(default)]
    pub simulate: bool,
    #[serde(default = "default_camera_id")]
    pub camera_id: String,
    #[serde(default = "default_stride")]
    pub stride: usize,
    #[serde(default)]
    pub display_progress: bool,
    #[serde(default = "default_true")]
    pub rgb_pipeline: bool,
    #[serde(default)]
    pub power_pipeline: bool,
    #[serde(default)]
    pub radiance_pipeline: bool,
    /// Overrides `raytracing.pixel_samples` for the camera.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_samples: Option<usize>,
    #[serde(default = "default_camera_bins")]
    pub spectral_bins: usize,
    /// Camera spectral range [nm].
    #[serde(default = "default_camera_range")]
    pub wavelength_range: [f64; 2],
}

fn default_camera_id() -> String {
    "mwi_lower".into()
}
fn default_stride() -> usize {
    1
}
fn default_camera_bins() -> usize {
    20
}
fn default_camera_range() -> [f64; 2] {
    [375.0, 740.0]
}

impl Default for ObserverConfig {
    fn default() -> Self {
        ObserverConfig {
            simulate: false,
            camera_id: default_camera_id(),
            stride: default_stride(),
            display_progress: false,
            rgb_pipeline: true,
            power_pipeline: false,
            radiance_pipeline: false,
            pixel_samples: None,
            spectral_bins: default_camera_bins(),
            wavelength_range: default_camera_range(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaytracingConfig {
    #[serde(default = "default_ray_pixel_samples")]
    pub pixel_samples: usize,
    /// Emission integration step along a ray [m].
    #[serde(default = "default_ray_step")]
    pub step: f64,
    #[serde(default)]
    pub seed: u64,
}

fn default_ray_pixel_samples() -> usize {
    100
}
fn default_ray_step() -> f64 {
    0.01
}

impl Default for RaytracingConfig {
    fn default() -> Self {
        RaytracingConfig {
            pixel_samples: default_ray_pixel_samples(),
            step: default_ray_step(),
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            directory: default_output_dir(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn positive(name: &str, value: f64) -> DiagResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(DiagError::ConfigError(format!(
            "{name} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}

fn at_least_one(name: &str, value: usize) -> DiagResult<()> {
    if value == 0 {
        return Err(DiagError::ConfigError(format!("{name} must be >= 1")));
    }
    Ok(())
}

impl SimulationConfig {
    /// Load from a JSON file and validate.
    pub fn from_file(path: impl AsRef<Path>) -> DiagResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> DiagResult<Self> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Structural checks. Registry and machine dispatch happen later, at
    /// the point where each name is used.
    pub fn validate(&self) -> DiagResult<()> {
        if self.machine.name.trim().is_empty() {
            return Err(DiagError::ConfigError("machine.name is empty".into()));
        }

        let dms = &self.dms;
        if dms.fibre_choice != -1 && dms.fibre_choice < 1 {
            return Err(DiagError::ConfigError(format!(
                "dms.fibre_choice must be -1 or a 1-based fibre number, got {}",
                dms.fibre_choice
            )));
        }
        positive("dms.acceptance_angle", dms.acceptance_angle)?;
        if dms.acceptance_angle > 90.0 {
            return Err(DiagError::ConfigError(format!(
                "dms.acceptance_angle is a half-angle in degrees and must be <= 90, got {}",
                dms.acceptance_angle
            )));
        }
        positive("dms.radius", dms.radius)?;
        at_least_one("dms.pixel_samples", dms.pixel_samples)?;
        at_least_one("dms.spectral_rays", dms.spectral_rays)?;
        at_least_one("dms.los_steps", dms.los_steps)?;
        if dms.up_vector.normalise().is_none() {
            return Err(DiagError::ConfigError(
                "dms.up_vector must be a finite non-zero vector".into(),
            ));
        }

        for instruction in &self.plasma.emission_instructions {
            instruction.validate()?;
        }

        let grid = &self.plasma.profiles;
        if grid.points < 2 {
            return Err(DiagError::ConfigError(
                "plasma.profiles.points must be >= 2".into(),
            ));
        }
        if !(grid.x_range[0] < grid.x_range[1]) || !(grid.y_range[0] < grid.y_range[1]) {
            return Err(DiagError::ConfigError(
                "plasma.profiles ranges must be increasing".into(),
            ));
        }
        positive("plasma.profiles.te_ceiling", grid.te_ceiling)?;
        at_least_one("plasma.profiles.emission_bins", grid.emission_bins)?;

        at_least_one("observer.stride", self.observer.stride)?;
        at_least_one("observer.spectral_bins", self.observer.spectral_bins)?;
        let [lo, hi] = self.observer.wavelength_range;
        if !(lo > 0.0 && lo < hi) {
            return Err(DiagError::ConfigError(format!(
                "observer.wavelength_range must satisfy 0 < lower < upper, got [{lo}, {hi}]"
            )));
        }

        at_least_one("raytracing.pixel_samples", self.raytracing.pixel_samples)?;
        positive("raytracing.step", self.raytracing.step)?;
        Ok(())
    }

    /// Camera pixel samples, preferring the observer override.
    pub fn camera_pixel_samples(&self) -> usize {
        self.observer
            .pixel_samples
            .unwrap_or(self.raytracing.pixel_samples)
    }
}
