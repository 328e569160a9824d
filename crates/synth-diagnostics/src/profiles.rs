// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Poloidal Profiles
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use log::info;
use ndarray::{Array2, Array3};
use synth_plasma::plasma::Plasma;
use synth_types::config::PlasmaConfig;
use synth_types::constants::DEUTERIUM_STAGES;
use synth_types::error::DiagResult;
use synth_types::species::{self, Element, DEUTERIUM};
use synth_types::state::PoloidalGrid;

/// Plasma parameters sampled on the poloidal plane, indexed [iy, ix].
/// Disabled channels are `None`.
#[derive(Debug, Clone)]
pub struct PoloidalProfiles {
    pub grid: PoloidalGrid,
    /// Electron temperature [eV], clamped to the display ceiling.
    pub te: Option<Array2<f64>>,
    pub ne: Option<Array2<f64>>,
    /// Deuterium stages 0..=1, [iy, ix, stage].
    pub ni: Option<Array3<f64>>,
    pub nz: Option<(&'static Element, Array3<f64>)>,
}

/// Sample `plasma` on the `plasma.profiles` grid at toroidal angle zero.
pub fn sample_profiles(config: &PlasmaConfig, plasma: &Plasma) -> DiagResult<PoloidalProfiles> {
    let edge = &config.edge;
    let grid = PoloidalGrid::from_config(&config.profiles);
    let ceiling = config.profiles.te_ceiling;
    let impurity = edge.impurity_species().map(species::lookup).transpose()?;
    let (ny, nx) = (grid.ny, grid.nx);

    info!("Sampling {nx}x{ny} poloidal profiles");

    let te = edge.te_2d.then(|| {
        Array2::from_shape_fn((ny, nx), |(iy, ix)| {
            plasma
                .electron_temperature(grid.point(iy, ix))
                .clamp(0.0, ceiling)
        })
    });
    let ne = edge.ne_2d.then(|| {
        Array2::from_shape_fn((ny, nx), |(iy, ix)| {
            plasma.electron_density(grid.point(iy, ix))
        })
    });

    let ni = if edge.ni_2d {
        Some(stage_densities(&grid, plasma, &DEUTERIUM, DEUTERIUM_STAGES)?)
    } else {
        None
    };
    let nz = match impurity {
        Some(element) => Some((
            element,
            stage_densities(&grid, plasma, element, element.stage_count())?,
        )),
        None => None,
    };

    Ok(PoloidalProfiles {
        grid,
        te,
        ne,
        ni,
        nz,
    })
}

fn stage_densities(
    grid: &PoloidalGrid,
    plasma: &Plasma,
    element: &Element,
    stages: usize,
) -> DiagResult<Array3<f64>> {
    let mut out = Array3::zeros((grid.ny, grid.nx, stages));
    for stage in 0..stages {
        for iy in 0..grid.ny {
            for ix in 0..grid.nx {
                out[[iy, ix, stage]] =
                    plasma.species_density(element, stage as u32, grid.point(iy, ix))?;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use synth_plasma::analytic::analytic_plasma;
    use synth_types::config::AnalyticPlasmaConfig;
    use synth_types::error::DiagError;

    fn plasma_config(edge: &str) -> PlasmaConfig {
        let json = format!(r#"{{"edge": {edge}, "profiles": {{"points": 12, "te_ceiling": 20.0}}}}"#);
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_channels_follow_flags() {
        let config = plasma_config(r#"{"present": true, "type": "analytic", "ne2D": false}"#);
        let plasma = analytic_plasma(&AnalyticPlasmaConfig::default()).unwrap();
        let profiles = sample_profiles(&config, &plasma).unwrap();
        let te = profiles.te.unwrap();
        assert_eq!(te.dim(), (12, 12));
        assert!(te.iter().all(|&t| (0.0..=20.0).contains(&t)));
        assert!(profiles.ne.is_none());
        assert_eq!(profiles.ni.unwrap().dim(), (12, 12, 2));
        assert!(profiles.nz.is_none());
    }

    #[test]
    fn test_impurity_stages() {
        let config = plasma_config(
            r#"{"present": true, "type": "analytic", "nz2D": true, "nz2D_species": "neon"}"#,
        );
        let analytic = AnalyticPlasmaConfig {
            impurity: Some(synth_types::config::ImpurityConfig {
                species: "neon".into(),
                concentration: 0.01,
            }),
            ..Default::default()
        };
        let plasma = analytic_plasma(&analytic).unwrap();
        let profiles = sample_profiles(&config, &plasma).unwrap();
        let (element, nz) = profiles.nz.unwrap();
        assert_eq!(element.name, "neon");
        assert_eq!(nz.dim(), (12, 12, 11));
    }

    #[test]
    fn test_missing_impurity_composition() {
        let config = plasma_config(
            r#"{"present": true, "type": "analytic", "nz2D": true, "nz2D_species": "argon"}"#,
        );
        let plasma = analytic_plasma(&AnalyticPlasmaConfig::default()).unwrap();
        assert!(matches!(
            sample_profiles(&config, &plasma),
            Err(DiagError::MissingComposition { .. })
        ));

        let bad = plasma_config(r#"{"nz2D": true, "nz2D_species": "francium"}"#);
        assert!(matches!(
            sample_profiles(&bad, &plasma),
            Err(DiagError::InvalidSpecies(_))
        ));
    }
}
