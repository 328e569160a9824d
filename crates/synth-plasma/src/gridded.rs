// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Gridded Edge Plasma
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Axisymmetric plasma from a NumPy `.npz` archive.
//!
//! Required arrays: `r` [nr], `z` [nz] (uniform, increasing), `te` and
//! `ne` [nz, nr]. Optional: `ti` [nz, nr] and species densities named
//! `n_<species>_<stage>` (e.g. `n_deuterium_1`). Fields are zero outside
//! the grid.

use crate::composition::{Composition, Distribution, Species};
use crate::plasma::Plasma;
use log::{debug, info};
use ndarray::{Array1, Array2};
use ndarray_npy::NpzReader;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use synth_math::interp::interp2d;
use synth_types::error::{DiagError, DiagResult};
use synth_types::geometry::Point3;
use synth_types::species;
use synth_types::state::PoloidalGrid;

const UNIFORMITY_TOLERANCE: f64 = 1e-6;

/// Density and temperature maps on a shared (R, z) grid.
#[derive(Debug)]
pub struct GriddedField {
    grid: Arc<PoloidalGrid>,
    density: Array2<f64>,
    temperature: Arc<Array2<f64>>,
}

impl GriddedField {
    fn inside(&self, r: f64, z: f64) -> bool {
        let g = &self.grid;
        r >= g.x[0] && r <= g.x[g.nx - 1] && z >= g.y[0] && z <= g.y[g.ny - 1]
    }

    fn sample(&self, field: &Array2<f64>, p: Point3) -> f64 {
        let r = p.major_radius();
        if !self.inside(r, p.z) {
            return 0.0;
        }
        interp2d(field, &self.grid, r, p.z).max(0.0)
    }
}

impl Distribution for GriddedField {
    fn density(&self, p: Point3) -> f64 {
        self.sample(&self.density, p)
    }

    fn effective_temperature(&self, p: Point3) -> f64 {
        self.sample(&self.temperature, p)
    }
}

fn read_array1(npz: &mut NpzReader<File>, key: &str) -> DiagResult<Array1<f64>> {
    npz.by_name::<ndarray::OwnedRepr<f64>, ndarray::Ix1>(&format!("{key}.npy"))
        .or_else(|_| npz.by_name::<ndarray::OwnedRepr<f64>, ndarray::Ix1>(key))
        .map_err(|e| DiagError::ConfigError(format!("Failed to read {key} from npz: {e}")))
}

fn read_array2(npz: &mut NpzReader<File>, key: &str) -> DiagResult<Array2<f64>> {
    npz.by_name::<ndarray::OwnedRepr<f64>, ndarray::Ix2>(&format!("{key}.npy"))
        .or_else(|_| npz.by_name::<ndarray::OwnedRepr<f64>, ndarray::Ix2>(key))
        .map_err(|e| DiagError::ConfigError(format!("Failed to read {key} from npz: {e}")))
}

/// Grid spanning `axis`, which must be uniform and increasing.
fn uniform_range(name: &str, axis: &Array1<f64>) -> DiagResult<(f64, f64)> {
    let n = axis.len();
    if n < 2 {
        return Err(DiagError::ConfigError(format!(
            "gridded plasma axis '{name}' needs at least 2 points"
        )));
    }
    let step = (axis[n - 1] - axis[0]) / (n - 1) as f64;
    if step <= 0.0 {
        return Err(DiagError::ConfigError(format!(
            "gridded plasma axis '{name}' must be increasing"
        )));
    }
    for (i, v) in axis.iter().enumerate() {
        let expected = axis[0] + step * i as f64;
        if (v - expected).abs() > UNIFORMITY_TOLERANCE * step.max(1.0) {
            return Err(DiagError::ConfigError(format!(
                "gridded plasma axis '{name}' is not uniform at index {i}"
            )));
        }
    }
    Ok((axis[0], axis[n - 1]))
}

/// `n_<species>_<stage>` → (species, stage).
fn parse_density_key(name: &str) -> Option<(&str, u32)> {
    let stem = name.strip_suffix(".npy").unwrap_or(name);
    let rest = stem.strip_prefix("n_")?;
    let (species, stage) = rest.rsplit_once('_')?;
    Some((species, stage.parse().ok()?))
}

pub fn load_gridded_plasma(path: &Path) -> DiagResult<Plasma> {
    let file = File::open(path)?;
    let mut npz = NpzReader::new(file).map_err(|e| {
        DiagError::ConfigError(format!("Failed to open npz '{}': {e}", path.display()))
    })?;

    let r = read_array1(&mut npz, "r")?;
    let z = read_array1(&mut npz, "z")?;
    let (r_min, r_max) = uniform_range("r", &r)?;
    let (z_min, z_max) = uniform_range("z", &z)?;
    let grid = Arc::new(PoloidalGrid::new(r.len(), z.len(), r_min, r_max, z_min, z_max));

    let shape = (z.len(), r.len());
    let checked = |key: &str, a: Array2<f64>| -> DiagResult<Array2<f64>> {
        if a.dim() != shape {
            return Err(DiagError::ConfigError(format!(
                "npz array '{key}' has shape {:?}, expected {shape:?} [z, r]",
                a.dim()
            )));
        }
        Ok(a)
    };

    let te = Arc::new(checked("te", read_array2(&mut npz, "te")?)?);
    let ne = checked("ne", read_array2(&mut npz, "ne")?)?;
    let names = npz
        .names()
        .map_err(|e| DiagError::ConfigError(format!("Failed to list npz entries: {e}")))?;
    let ti = if names.iter().any(|n| n == "ti" || n == "ti.npy") {
        Arc::new(checked("ti", read_array2(&mut npz, "ti")?)?)
    } else {
        te.clone()
    };

    let mut composition = Composition::new();
    for name in &names {
        let Some((species_name, stage)) = parse_density_key(name) else {
            continue;
        };
        let element = species::lookup(species_name)?;
        let key = name.strip_suffix(".npy").unwrap_or(name);
        let density = checked(key, read_array2(&mut npz, key)?)?;
        debug!("gridded plasma: {element} stage {stage} from '{key}'");
        composition.add(Species {
            element,
            ionisation: stage,
            distribution: Box::new(GriddedField {
                grid: grid.clone(),
                density,
                temperature: ti.clone(),
            }),
        })?;
    }

    info!(
        "gridded plasma {}: {}x{} (R {r_min:.3}..{r_max:.3} m, z {z_min:.3}..{z_max:.3} m), {} species stages",
        path.display(),
        r.len(),
        z.len(),
        composition.len()
    );

    let electrons = GriddedField {
        grid,
        density: ne,
        temperature: te,
    };
    Ok(Plasma::new("gridded", Box::new(electrons), composition))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_key() {
        assert_eq!(parse_density_key("n_deuterium_1"), Some(("deuterium", 1)));
        assert_eq!(parse_density_key("n_carbon_6.npy"), Some(("carbon", 6)));
        assert_eq!(parse_density_key("ne"), None);
        assert_eq!(parse_density_key("n_carbon_x"), None);
    }

    #[test]
    fn test_uniform_axis() {
        let good = Array1::from_shape_fn(10, |i| 0.25 + 0.25 * i as f64);
        assert_eq!(uniform_range("r", &good).unwrap(), (0.25, 2.5));
        let bad = Array1::from_vec(vec![0.0, 0.1, 0.5, 0.6]);
        assert!(uniform_range("r", &bad).is_err());
        let decreasing = Array1::from_vec(vec![1.0, 0.0]);
        assert!(uniform_range("r", &decreasing).is_err());
    }

    #[test]
    fn test_zero_outside_grid() {
        let grid = Arc::new(PoloidalGrid::new(3, 3, 1.0, 2.0, -1.0, 1.0));
        let field = GriddedField {
            grid,
            density: Array2::from_elem((3, 3), 5.0),
            temperature: Arc::new(Array2::from_elem((3, 3), 7.0)),
        };
        assert_eq!(field.density(Point3::new(1.5, 0.0, 0.0)), 5.0);
        // Same R on the y axis.
        assert_eq!(field.density(Point3::new(0.0, 1.5, 0.5)), 5.0);
        assert_eq!(field.effective_temperature(Point3::new(1.5, 0.0, 0.0)), 7.0);
        assert_eq!(field.density(Point3::new(0.5, 0.0, 0.0)), 0.0);
        assert_eq!(field.density(Point3::new(1.5, 0.0, 2.0)), 0.0);
    }
}
