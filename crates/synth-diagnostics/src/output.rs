// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Result Writer
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Named result groups and their on-disk form.
//!
//! A group is a set of named dimensions plus variables laid out over them.
//! [`NpzResultWriter`] stores each group as `<group>.npz` (one `.npy` per
//! variable) with a `<group>.json` manifest carrying dimensions, labels and
//! units. Unset cells are written as NaN.

use crate::camera::{Camera, Frame};
use crate::profiles::PoloidalProfiles;
use log::info;
use ndarray::{ArrayD, IxDyn};
use ndarray_npy::NpzWriter;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use synth_plasma::builder::EmissionProfile;
use synth_types::error::{DiagError, DiagResult};
use synth_types::state::{ChannelExt, DiagnosticResult};

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub dims: Vec<String>,
    pub label: String,
    pub units: String,
    pub data: ArrayD<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct OutputGroup {
    pub name: String,
    dimensions: Vec<(String, usize)>,
    variables: Vec<Variable>,
}

impl OutputGroup {
    pub fn new(name: impl Into<String>) -> Self {
        OutputGroup {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_dimension(&mut self, name: &str, len: usize) -> DiagResult<()> {
        if self.dimension(name).is_some() {
            return Err(DiagError::Output(format!(
                "group '{}' already has dimension '{name}'",
                self.name
            )));
        }
        self.dimensions.push((name.to_string(), len));
        Ok(())
    }

    pub fn dimension(&self, name: &str) -> Option<usize> {
        self.dimensions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, len)| *len)
    }

    pub fn dimensions(&self) -> &[(String, usize)] {
        &self.dimensions
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Add a variable; its shape must match the named dimensions.
    pub fn add_variable(
        &mut self,
        name: &str,
        dims: &[&str],
        label: &str,
        units: &str,
        data: ArrayD<f64>,
    ) -> DiagResult<()> {
        if self.variable(name).is_some() {
            return Err(DiagError::Output(format!(
                "group '{}' already has variable '{name}'",
                self.name
            )));
        }
        let expected = dims
            .iter()
            .map(|d| {
                self.dimension(d).ok_or_else(|| {
                    DiagError::Output(format!(
                        "variable '{name}' uses undeclared dimension '{d}'"
                    ))
                })
            })
            .collect::<DiagResult<Vec<_>>>()?;
        if data.shape() != expected.as_slice() {
            return Err(DiagError::Output(format!(
                "variable '{name}' has shape {:?}, dimensions {dims:?} need {expected:?}",
                data.shape()
            )));
        }
        self.variables.push(Variable {
            name: name.to_string(),
            dims: dims.iter().map(|d| d.to_string()).collect(),
            label: label.to_string(),
            units: units.to_string(),
            data,
        });
        Ok(())
    }
}

/// Sink for result groups.
pub trait ResultWriter {
    fn write_group(&mut self, group: &OutputGroup) -> DiagResult<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionEntry {
    pub name: String,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableEntry {
    pub name: String,
    pub dims: Vec<String>,
    pub label: String,
    pub units: String,
}

/// Contents of `<group>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupManifest {
    pub group: String,
    pub dimensions: Vec<DimensionEntry>,
    pub variables: Vec<VariableEntry>,
}

impl From<&OutputGroup> for GroupManifest {
    fn from(group: &OutputGroup) -> Self {
        GroupManifest {
            group: group.name.clone(),
            dimensions: group
                .dimensions
                .iter()
                .map(|(name, len)| DimensionEntry {
                    name: name.clone(),
                    len: *len,
                })
                .collect(),
            variables: group
                .variables
                .iter()
                .map(|v| VariableEntry {
                    name: v.name.clone(),
                    dims: v.dims.clone(),
                    label: v.label.clone(),
                    units: v.units.clone(),
                })
                .collect(),
        }
    }
}

/// Writes groups into a directory as `.npz` archives plus JSON manifests.
#[derive(Debug, Clone)]
pub struct NpzResultWriter {
    directory: PathBuf,
}

impl NpzResultWriter {
    pub fn new(directory: impl Into<PathBuf>) -> DiagResult<Self> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory)?;
        Ok(NpzResultWriter { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn archive_path(&self, group: &str) -> PathBuf {
        self.directory.join(format!("{group}.npz"))
    }

    pub fn manifest_path(&self, group: &str) -> PathBuf {
        self.directory.join(format!("{group}.json"))
    }
}

impl ResultWriter for NpzResultWriter {
    fn write_group(&mut self, group: &OutputGroup) -> DiagResult<()> {
        let archive = self.archive_path(&group.name);
        let mut npz = NpzWriter::new(File::create(&archive)?);
        for variable in &group.variables {
            npz.add_array(format!("{}.npy", variable.name), &variable.data)
                .map_err(|e| {
                    DiagError::Output(format!(
                        "failed to write '{}' to {}: {e}",
                        variable.name,
                        archive.display()
                    ))
                })?;
        }
        npz.finish().map_err(|e| {
            DiagError::Output(format!("failed to finish {}: {e}", archive.display()))
        })?;

        let manifest = GroupManifest::from(group);
        let file = File::create(self.manifest_path(&group.name))?;
        serde_json::to_writer_pretty(file, &manifest)?;

        info!(
            "Wrote group '{}' ({} variables) to {}",
            group.name,
            group.variables.len(),
            archive.display()
        );
        Ok(())
    }
}

/// `DMS` group from a sampling result.
pub fn dms_group(result: &DiagnosticResult) -> DiagResult<OutputGroup> {
    let mut g = OutputGroup::new("DMS");
    g.add_dimension("nFibres", result.n_fibres())?;
    g.add_dimension("Wavelength", result.n_bins())?;
    g.add_dimension("nVec", 3)?;
    g.add_dimension("nSteps", result.los_steps())?;
    g.add_dimension("nIon", result.ni_los.shape()[2])?;
    if let Some(nz) = &result.nz_los {
        g.add_dimension("nImpurity", nz.density.shape()[2])?;
    }

    let fibres = ndarray::Array1::from_iter((1..=result.n_fibres()).map(|k| k as f64));
    g.add_variable("nFibres", &["nFibres"], "Fibre number", "", fibres.into_dyn())?;
    g.add_variable(
        "Wavelength",
        &["Wavelength"],
        "Wavelength",
        "nm",
        result.wavelengths.clone().into_dyn(),
    )?;
    let o = result.geometry.origin;
    g.add_variable(
        "origin",
        &["nVec"],
        "Fibre origin",
        "m",
        ndarray::arr1(&[o.x, o.y, o.z]).into_dyn(),
    )?;
    g.add_variable(
        "uVec",
        &["nVec", "nFibres"],
        "Fibre direction",
        "",
        result.geometry.directions.clone().into_dyn(),
    )?;
    g.add_variable(
        "distance",
        &["nFibres"],
        "Distance to wall",
        "m",
        result.geometry.distance.clone().into_dyn(),
    )?;
    g.add_variable(
        "line-integrated_power",
        &["nFibres"],
        "Line integrated power",
        "W",
        result.power.nan_filled().into_dyn(),
    )?;
    g.add_variable(
        "line-integrated_spectrum",
        &["Wavelength", "nFibres"],
        "Line integrated spectrum",
        "W/m^2/str/nm",
        result.spectra.nan_filled().into_dyn(),
    )?;
    g.add_variable(
        "los_distance",
        &["nSteps", "nFibres"],
        "Distance along line of sight",
        "m",
        result.los_distance.nan_filled().into_dyn(),
    )?;
    g.add_variable(
        "te_los",
        &["nSteps", "nFibres"],
        "Electron temperature",
        "eV",
        result.te_los.nan_filled().into_dyn(),
    )?;
    g.add_variable(
        "ne_los",
        &["nSteps", "nFibres"],
        "Electron density",
        "m^-3",
        result.ne_los.nan_filled().into_dyn(),
    )?;
    g.add_variable(
        "ni_los",
        &["nSteps", "nFibres", "nIon"],
        "Deuterium density",
        "m^-3",
        result.ni_los.nan_filled().into_dyn(),
    )?;
    if let Some(nz) = &result.nz_los {
        g.add_variable(
            "nz_los",
            &["nSteps", "nFibres", "nImpurity"],
            &format!("{} density", nz.element.name),
            "m^-3",
            nz.density.nan_filled().into_dyn(),
        )?;
    }
    Ok(g)
}

/// `camera` group with one image per pipeline.
pub fn camera_group(camera: &Camera) -> DiagResult<OutputGroup> {
    let (nx, ny) = camera.pixels;
    let mut g = OutputGroup::new("camera");
    g.add_dimension("xPixels", nx)?;
    g.add_dimension("yPixels", ny)?;

    for pipeline in &camera.pipelines {
        let frame = pipeline.frame.as_ref().ok_or_else(|| {
            DiagError::Output(format!(
                "camera pipeline '{}' has not been observed",
                pipeline.kind
            ))
        })?;
        match frame {
            Frame::Rgb(image) => {
                if g.dimension("rgb").is_none() {
                    g.add_dimension("rgb", 3)?;
                }
                g.add_variable(
                    pipeline.kind.key(),
                    &["yPixels", "xPixels", "rgb"],
                    pipeline.kind.name(),
                    "",
                    image.clone().into_dyn(),
                )?;
            }
            Frame::Scalar(image) => {
                let units = match pipeline.kind.key() {
                    "power" => "W",
                    _ => "W/m^2/str",
                };
                g.add_variable(
                    pipeline.kind.key(),
                    &["yPixels", "xPixels"],
                    pipeline.kind.name(),
                    units,
                    image.clone().into_dyn(),
                )?;
            }
        }
    }
    Ok(g)
}

/// `plasma` group from sampled profiles and, when built, the emission map.
pub fn plasma_group(
    profiles: &PoloidalProfiles,
    emission: Option<&EmissionProfile>,
) -> DiagResult<OutputGroup> {
    let grid = &profiles.grid;
    let mut g = OutputGroup::new("plasma");
    g.add_dimension("nDistributionX", grid.nx)?;
    g.add_dimension("nDistributionY", grid.ny)?;
    g.add_variable("x", &["nDistributionX"], "Major radius", "m", grid.x.clone().into_dyn())?;
    g.add_variable("y", &["nDistributionY"], "Height", "m", grid.y.clone().into_dyn())?;

    let plane = ["nDistributionY", "nDistributionX"];
    if let Some(te) = &profiles.te {
        g.add_variable("Te", &plane, "Electron temperature", "eV", te.clone().into_dyn())?;
    }
    if let Some(ne) = &profiles.ne {
        g.add_variable("Ne", &plane, "Electron density", "m^-3", ne.clone().into_dyn())?;
    }
    if let Some(ni) = &profiles.ni {
        g.add_dimension("nIon", ni.shape()[2])?;
        g.add_variable(
            "Ni",
            &["nDistributionY", "nDistributionX", "nIon"],
            "Deuterium density",
            "m^-3",
            ni.clone().into_dyn(),
        )?;
    }
    if let Some((element, nz)) = &profiles.nz {
        g.add_dimension("nImpurity", nz.shape()[2])?;
        g.add_variable(
            "Nz",
            &["nDistributionY", "nDistributionX", "nImpurity"],
            &format!("{} density", element.name),
            "m^-3",
            nz.clone().into_dyn(),
        )?;
    }
    if let Some(profile) = emission {
        if profile.values.dim() != (grid.ny, grid.nx) {
            return Err(DiagError::Output(format!(
                "emission profile shape {:?} does not match the {}x{} profile grid",
                profile.values.dim(),
                grid.ny,
                grid.nx
            )));
        }
        g.add_variable(
            "emission",
            &plane,
            "Integrated line emission",
            "W/m^3/str",
            profile.values.clone().into_dyn(),
        )?;
    }
    Ok(g)
}

/// Read one variable back from a written archive.
pub fn read_variable(path: &Path, name: &str) -> DiagResult<ArrayD<f64>> {
    let mut npz = ndarray_npy::NpzReader::new(File::open(path)?).map_err(|e| {
        DiagError::Output(format!("failed to open {}: {e}", path.display()))
    })?;
    npz.by_name::<ndarray::OwnedRepr<f64>, IxDyn>(&format!("{name}.npy"))
        .or_else(|_| npz.by_name::<ndarray::OwnedRepr<f64>, IxDyn>(name))
        .map_err(|e| DiagError::Output(format!("failed to read {name} from npz: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};
    use std::time::{SystemTime, UNIX_EPOCH};
    use synth_types::geometry::Point3;
    use synth_types::species::CARBON;
    use synth_types::state::BundleGeometry;

    fn scratch_dir(tag: &str) -> PathBuf {
        let epoch_ns = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "synthdiag_{tag}_{}_{}",
            std::process::id(),
            epoch_ns
        ))
    }

    fn result() -> DiagnosticResult {
        let geometry = BundleGeometry {
            origin: Point3::new(1.9, 0.0, -1.6),
            directions: Array2::zeros((3, 3)),
            distance: Array1::from_elem(3, 0.5),
        };
        let mut r = DiagnosticResult::new(
            "lower",
            Array1::linspace(655.0, 657.0, 4),
            geometry,
            5,
            Some(&CARBON),
        );
        r.power[1] = Some(2.5);
        r
    }

    #[test]
    fn test_rejects_shape_mismatch() {
        let mut g = OutputGroup::new("t");
        g.add_dimension("n", 3).unwrap();
        let err = g.add_variable("v", &["n"], "", "", Array1::zeros(4).into_dyn());
        assert!(matches!(err, Err(DiagError::Output(_))));
        let err = g.add_variable("w", &["m"], "", "", Array1::zeros(3).into_dyn());
        assert!(matches!(err, Err(DiagError::Output(_))));
        assert!(g.add_dimension("n", 2).is_err());
    }

    #[test]
    fn test_dms_group_layout() {
        let g = dms_group(&result()).unwrap();
        assert_eq!(g.dimension("nFibres"), Some(3));
        assert_eq!(g.dimension("nIon"), Some(2));
        assert_eq!(g.dimension("nImpurity"), Some(7));
        let power = &g.variable("line-integrated_power").unwrap().data;
        assert!(power[[0]].is_nan());
        assert_eq!(power[[1]], 2.5);
        assert_eq!(g.variable("nz_los").unwrap().data.shape(), &[5, 3, 7]);
        assert_eq!(g.variable("nFibres").unwrap().data[[2]], 3.0);
    }

    #[test]
    fn test_npz_writer_round_trip() {
        let dir = scratch_dir("dms");
        let mut writer = NpzResultWriter::new(&dir).unwrap();
        let g = dms_group(&result()).unwrap();
        writer.write_group(&g).unwrap();

        let power = read_variable(&writer.archive_path("DMS"), "line-integrated_power").unwrap();
        assert_eq!(power.shape(), &[3]);
        assert!(power[[0]].is_nan());
        assert_eq!(power[[1]], 2.5);

        let manifest: GroupManifest = serde_json::from_reader(
            File::open(writer.manifest_path("DMS")).unwrap(),
        )
        .unwrap();
        assert_eq!(manifest.group, "DMS");
        let te = manifest.variables.iter().find(|v| v.name == "te_los").unwrap();
        assert_eq!(te.units, "eV");
        assert_eq!(te.dims, vec!["nSteps", "nFibres"]);

        std::fs::remove_dir_all(dir).ok();
    }
}
