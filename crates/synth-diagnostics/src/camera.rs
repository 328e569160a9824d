// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Filtered Camera
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Pinhole imaging camera with RGB, power and radiance pipelines.
//!
//! Every pixel is observed as a narrow fibre through the shared
//! [`OpticalSampler`]; pipelines reduce the pixel spectrum to their frame.

use crate::fibres::FibrePose;
use crate::machine::{Machine, Scene};
use crate::sampler::{FibreParameters, OpticalSampler};
use log::info;
use ndarray::{Array2, Array3};
use std::fmt;
use std::time::Instant;
use synth_plasma::plasma::Plasma;
use synth_types::config::SimulationConfig;
use synth_types::constants::{DISPLAY_UNSATURATED_FRACTION, DISPLAY_UPDATE_TIME};
use synth_types::error::{DiagError, DiagResult};
use synth_types::geometry::{Point3, Vec3};
use synth_types::spectrum::SpectralWindow;

/// MAST-U cameras: (id, pinhole, look-at, horizontal FOV [deg],
/// native (width, height), aperture radius [m]).
static MASTU_CAMERAS: [(&str, [f64; 3], [f64; 3], f64, (usize, usize), f64); 3] = [
    ("mwi_lower", [1.95, 0.0, -1.5], [0.9, 0.0, -1.9], 40.0, (640, 512), 0.002),
    ("mwi_upper", [1.95, 0.0, 1.5], [0.9, 0.0, 1.9], 40.0, (640, 512), 0.002),
    ("divcam_lower", [1.6, 0.3, -1.8], [0.7, 0.0, -2.0], 60.0, (256, 256), 0.0015),
];

pub fn camera_ids() -> impl Iterator<Item = &'static str> {
    MASTU_CAMERAS.iter().map(|c| c.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    Rgb,
    Power,
    Radiance,
}

impl PipelineKind {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineKind::Rgb => "sRGB",
            PipelineKind::Power => "Unfiltered Power (W)",
            PipelineKind::Radiance => "Unfiltered Radiance (W/m^2/str)",
        }
    }

    /// Identifier used for the output variable.
    pub fn key(&self) -> &'static str {
        match self {
            PipelineKind::Rgb => "rgb",
            PipelineKind::Power => "power",
            PipelineKind::Radiance => "radiance",
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub enum Frame {
    /// [ny, nx, 3], display-scaled to [0, 1].
    Rgb(Array3<f64>),
    /// [ny, nx]
    Scalar(Array2<f64>),
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    pub kind: PipelineKind,
    pub display_progress: bool,
    pub display_unsaturated_fraction: f64,
    /// Progress cadence [s].
    pub display_update_time: f64,
    pub frame: Option<Frame>,
}

impl Pipeline {
    pub fn new(kind: PipelineKind, display_progress: bool) -> Self {
        Pipeline {
            kind,
            display_progress,
            display_unsaturated_fraction: DISPLAY_UNSATURATED_FRACTION,
            display_update_time: DISPLAY_UPDATE_TIME,
            frame: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub id: String,
    pub origin: Point3,
    pub forward: Vec3,
    pub up: Vec3,
    /// Horizontal field of view [deg].
    pub fov: f64,
    /// (width, height) after striding.
    pub pixels: (usize, usize),
    pub pixel_samples: usize,
    pub aperture_radius: f64,
    pub window: SpectralWindow,
    pub pipelines: Vec<Pipeline>,
}

impl Camera {
    /// Unit direction through the centre of pixel (ix, iy); row 0 is the top.
    pub fn pixel_direction(&self, ix: usize, iy: usize) -> Vec3 {
        let (nx, ny) = self.pixels;
        let (right, up) = Vec3::orthonormal_basis(&self.forward, &self.up);
        let tan_h = (0.5 * self.fov).to_radians().tan();
        let tan_v = tan_h * ny as f64 / nx as f64;
        let u = ((ix as f64 + 0.5) / nx as f64 * 2.0 - 1.0) * tan_h;
        let v = (1.0 - (iy as f64 + 0.5) / ny as f64 * 2.0) * tan_v;
        let d = self.forward + right * u + up * v;
        d.normalise().unwrap_or(self.forward)
    }

    /// Optics of one pixel: the cone spans a single pixel pitch.
    pub fn pixel_parameters(&self) -> FibreParameters {
        FibreParameters {
            acceptance_angle: 0.5 * self.fov / self.pixels.0 as f64,
            radius: self.aperture_radius,
            pixel_samples: self.pixel_samples,
            spectral_rays: 1,
            window: self.window,
        }
    }

    fn display_progress(&self) -> bool {
        self.pipelines.iter().any(|p| p.display_progress)
    }

    /// Render every pixel and fill each attached pipeline's frame.
    pub fn observe(
        &mut self,
        plasma: &Plasma,
        scene: &dyn Scene,
        sampler: &dyn OpticalSampler,
    ) -> DiagResult<()> {
        let (nx, ny) = self.pixels;
        let params = self.pixel_parameters();
        let width = self.window.bin_width();
        let centres = self.window.centres();
        let cadence = self
            .pipelines
            .iter()
            .map(|p| p.display_update_time)
            .fold(DISPLAY_UPDATE_TIME, f64::min);
        let progress = self.display_progress();

        info!(
            "Camera '{}': {nx}x{ny} pixels, {} samples/pixel",
            self.id, self.pixel_samples
        );

        let mut radiance = Array2::<f64>::zeros((ny, nx));
        let mut xyz = Array3::<f64>::zeros((ny, nx, 3));
        let start = Instant::now();
        let mut last_report = start;

        for iy in 0..ny {
            for ix in 0..nx {
                let pose = FibrePose {
                    number: iy * nx + ix + 1,
                    origin: self.origin,
                    forward: self.pixel_direction(ix, iy),
                    up: self.up,
                };
                let spectrum = sampler.observe_radiance(&pose, &params, scene, plasma)?;
                radiance[[iy, ix]] = spectrum.mean.sum() * width;
                for (lambda, l) in centres.iter().zip(spectrum.mean.iter()) {
                    let [x, y, z] = cie1931(*lambda);
                    xyz[[iy, ix, 0]] += x * l * width;
                    xyz[[iy, ix, 1]] += y * l * width;
                    xyz[[iy, ix, 2]] += z * l * width;
                }
            }
            if progress && last_report.elapsed().as_secs_f64() >= cadence {
                last_report = Instant::now();
                info!(
                    "Camera '{}': {:.1}% after {:.0} s",
                    self.id,
                    100.0 * (iy + 1) as f64 / ny as f64,
                    start.elapsed().as_secs_f64()
                );
            }
        }

        let etendue = params.etendue();
        for pipeline in &mut self.pipelines {
            pipeline.frame = Some(match pipeline.kind {
                PipelineKind::Radiance => Frame::Scalar(radiance.clone()),
                PipelineKind::Power => Frame::Scalar(radiance.mapv(|l| l * etendue)),
                PipelineKind::Rgb => {
                    Frame::Rgb(display_srgb(&xyz, pipeline.display_unsaturated_fraction))
                }
            });
        }
        info!(
            "Camera '{}' done in {:.1} s",
            self.id,
            start.elapsed().as_secs_f64()
        );
        Ok(())
    }
}

/// Piecewise Gaussian with separate widths below and above `mu`.
fn lobe(x: f64, mu: f64, sigma_lo: f64, sigma_hi: f64) -> f64 {
    let s = if x < mu { sigma_lo } else { sigma_hi };
    (-0.5 * ((x - mu) / s).powi(2)).exp()
}

/// CIE 1931 2° colour-matching functions (multi-lobe fit) at `lambda` [nm].
pub fn cie1931(lambda: f64) -> [f64; 3] {
    let x = 1.056 * lobe(lambda, 599.8, 37.9, 31.0) + 0.362 * lobe(lambda, 442.0, 16.0, 26.7)
        - 0.065 * lobe(lambda, 501.1, 20.4, 26.2);
    let y = 0.821 * lobe(lambda, 568.8, 46.9, 40.5) + 0.286 * lobe(lambda, 530.9, 16.3, 31.1);
    let z = 1.217 * lobe(lambda, 437.0, 11.8, 36.0) + 0.681 * lobe(lambda, 459.0, 26.0, 13.8);
    [x, y, z]
}

fn xyz_to_linear_srgb([x, y, z]: [f64; 3]) -> [f64; 3] {
    [
        3.2406 * x - 1.5372 * y - 0.4986 * z,
        -0.9689 * x + 1.8758 * y + 0.0415 * z,
        0.0557 * x - 0.2040 * y + 1.0570 * z,
    ]
}

/// Value below which `fraction` of `values` lie.
fn quantile(values: &mut [f64], fraction: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let idx = ((values.len() - 1) as f64 * fraction.clamp(0.0, 1.0)).round() as usize;
    values[idx]
}

/// Linear sRGB scaled so the `fraction` luminance quantile is full scale.
pub fn display_srgb(xyz: &Array3<f64>, fraction: f64) -> Array3<f64> {
    let (ny, nx, _) = xyz.dim();
    let mut luminance: Vec<f64> = (0..ny)
        .flat_map(|iy| (0..nx).map(move |ix| (iy, ix)))
        .map(|(iy, ix)| xyz[[iy, ix, 1]])
        .collect();
    let peak = quantile(&mut luminance, fraction);
    let scale = if peak > 0.0 { 1.0 / peak } else { 0.0 };

    let mut rgb = Array3::zeros((ny, nx, 3));
    for iy in 0..ny {
        for ix in 0..nx {
            let c = xyz_to_linear_srgb([xyz[[iy, ix, 0]], xyz[[iy, ix, 1]], xyz[[iy, ix, 2]]]);
            for (k, v) in c.into_iter().enumerate() {
                rgb[[iy, ix, k]] = (v * scale).clamp(0.0, 1.0);
            }
        }
    }
    rgb
}

/// Camera `observer.camera_id` of the configured machine, with pipelines
/// and sampling parameters attached.
pub fn load_camera(config: &SimulationConfig) -> DiagResult<Camera> {
    let machine = Machine::from_name(&config.machine.name)?;
    if machine != Machine::MastU {
        return Err(DiagError::UnsupportedMachine(format!(
            "{machine} (no camera catalogue)"
        )));
    }
    let observer = &config.observer;
    let (id, origin, target, fov, (width, height), aperture) = MASTU_CAMERAS
        .iter()
        .find(|c| c.0 == observer.camera_id)
        .ok_or_else(|| {
            DiagError::ConfigError(format!(
                "unknown MAST-U camera '{}' (expected one of: {})",
                observer.camera_id,
                camera_ids().collect::<Vec<_>>().join(", ")
            ))
        })?;

    let stride = observer.stride.max(1);
    let pixels = (width.div_ceil(stride), height.div_ceil(stride));
    let origin = Vec3::from(*origin);
    let forward = (Vec3::from(*target) - origin)
        .normalise()
        .ok_or_else(|| DiagError::ConfigError(format!("camera '{id}' looks at its own pinhole")))?;

    let mut pipelines = Vec::new();
    for (enabled, kind) in [
        (observer.rgb_pipeline, PipelineKind::Rgb),
        (observer.power_pipeline, PipelineKind::Power),
        (observer.radiance_pipeline, PipelineKind::Radiance),
    ] {
        if enabled {
            pipelines.push(Pipeline::new(kind, observer.display_progress));
        }
    }
    if pipelines.is_empty() {
        return Err(DiagError::ConfigError(
            "camera has no pipelines enabled".into(),
        ));
    }

    let [lower, upper] = observer.wavelength_range;
    Ok(Camera {
        id: id.to_string(),
        origin,
        forward,
        up: config.dms.up_vector,
        fov: *fov,
        pixels,
        pixel_samples: config.camera_pixel_samples(),
        aperture_radius: *aperture,
        window: SpectralWindow::new(observer.spectral_bins, lower, upper)?,
        pipelines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(json: &str) -> SimulationConfig {
        SimulationConfig::from_json(json).unwrap()
    }

    const BASE: &str = r#"{
        "machine": {"name": "MAST-U"},
        "plasma": {"edge": {"present": true, "type": "analytic"}},
        "observer": {"simulate": true, "stride": 4, "power_pipeline": true,
                     "display_progress": true},
        "raytracing": {"pixel_samples": 7}
    }"#;

    #[test]
    fn test_load_mastu_camera() {
        let cam = load_camera(&config(BASE)).unwrap();
        assert_eq!(cam.id, "mwi_lower");
        assert_eq!(cam.pixels, (160, 128));
        assert_eq!(cam.pixel_samples, 7);
        let names: Vec<_> = cam.pipelines.iter().map(|p| p.kind.name()).collect();
        assert_eq!(names, vec!["sRGB", "Unfiltered Power (W)"]);
        for p in &cam.pipelines {
            assert_eq!(p.display_unsaturated_fraction, 0.96);
            assert_eq!(p.display_update_time, 15.0);
            assert!(p.display_progress);
        }
    }

    #[test]
    fn test_observer_pixel_samples_override() {
        let mut cfg = config(BASE);
        cfg.observer.pixel_samples = Some(3);
        assert_eq!(load_camera(&cfg).unwrap().pixel_samples, 3);
    }

    #[test]
    fn test_unsupported_machine() {
        let mut cfg = config(BASE);
        cfg.machine.name = "JET".into();
        assert!(matches!(
            load_camera(&cfg),
            Err(DiagError::UnsupportedMachine(_))
        ));
        cfg.machine.name = "XYZ".into();
        assert!(matches!(
            load_camera(&cfg),
            Err(DiagError::UnsupportedMachine(n)) if n == "XYZ"
        ));
    }

    #[test]
    fn test_unknown_camera() {
        let mut cfg = config(BASE);
        cfg.observer.camera_id = "ir_upper".into();
        assert!(matches!(load_camera(&cfg), Err(DiagError::ConfigError(_))));
    }

    #[test]
    fn test_centre_pixel_looks_forward() {
        let mut cam = load_camera(&config(BASE)).unwrap();
        cam.pixels = (3, 3);
        let d = cam.pixel_direction(1, 1);
        assert!((d.dot(&cam.forward) - 1.0).abs() < 1e-12);
        // Top row points above the optical axis.
        let top = cam.pixel_direction(1, 0);
        let (_, up) = Vec3::orthonormal_basis(&cam.forward, &cam.up);
        assert!(top.dot(&up) > 0.0);
    }

    #[test]
    fn test_cie_peaks() {
        let green = cie1931(555.0);
        assert!(green[1] > 0.95 && green[1] < 1.05);
        let blue = cie1931(445.0);
        assert!(blue[2] > blue[1]);
        let red = cie1931(650.0);
        assert!(red[0] > red[1] && red[0] > red[2]);
    }

    #[test]
    fn test_display_scaling_saturates_top() {
        let mut xyz = Array3::zeros((1, 100, 3));
        for ix in 0..100 {
            let y = ix as f64;
            xyz[[0, ix, 0]] = 0.9505 * y;
            xyz[[0, ix, 1]] = y;
            xyz[[0, ix, 2]] = 1.089 * y;
        }
        let rgb = display_srgb(&xyz, 0.96);
        // Pixel at the quantile maps to white, brighter pixels clip.
        assert!((rgb[[0, 95, 1]] - 1.0).abs() < 1e-2);
        assert_eq!(rgb[[0, 99, 1]], 1.0);
        assert_eq!(rgb[[0, 0, 1]], 0.0);
        assert!(rgb.iter().all(|v| (0.0..=1.0).contains(v)));
    }
}
