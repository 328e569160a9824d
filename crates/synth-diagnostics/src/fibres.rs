// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Fibre Bundles
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Spectrometer fibre bundles.
//!
//! A bundle is a fan of lines of sight from one origin. Fibres are
//! numbered 1..=N; [`FibreBundle::pose`] hands out an immutable pose per
//! fibre so callers never share a "current fibre" cursor.

use crate::machine::{Machine, Scene};
use ndarray::{Array1, Array2};
use synth_types::config::{DmsConfig, FanSpec};
use synth_types::error::{DiagError, DiagResult};
use synth_types::geometry::{Point3, Vec3};
use synth_types::state::BundleGeometry;

/// MAST-U divertor fans: (group, origin, first target, last target, count).
/// Origins sit near the outer wall; targets span the divertor floor/roof.
static MASTU_FANS: [(&str, [f64; 3], [f64; 3], [f64; 3], usize); 2] = [
    ("lower", [1.9, 0.0, -1.6], [0.6, 0.0, -2.0], [1.7, 0.0, -2.0], 20),
    ("upper", [1.9, 0.0, 1.6], [0.6, 0.0, 2.0], [1.7, 0.0, 2.0], 20),
];

/// Geometry of one fibre, detached from the bundle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FibrePose {
    /// 1-based fibre number.
    pub number: usize,
    pub origin: Point3,
    /// Unit viewing direction.
    pub forward: Vec3,
    /// Roll reference.
    pub up: Vec3,
}

impl FibrePose {
    /// Column of this fibre in result buffers.
    pub fn index(&self) -> usize {
        self.number - 1
    }
}

#[derive(Debug, Clone)]
pub struct FibreBundle {
    name: String,
    origin: Point3,
    directions: Vec<Vec3>,
    up: Vec3,
}

impl FibreBundle {
    /// Fan from `spec.origin` toward `spec.count` targets spaced evenly
    /// from `first_target` to `last_target`.
    pub fn fan(name: impl Into<String>, spec: &FanSpec, up: Vec3) -> DiagResult<Self> {
        let name = name.into();
        if spec.count == 0 {
            return Err(DiagError::ConfigError(format!(
                "fibre bundle '{name}' has no fibres"
            )));
        }
        let up = up.normalise().ok_or_else(|| {
            DiagError::ConfigError("fibre up vector must be non-zero".into())
        })?;
        let span = spec.last_target - spec.first_target;
        let mut directions = Vec::with_capacity(spec.count);
        for i in 0..spec.count {
            let t = if spec.count > 1 {
                i as f64 / (spec.count - 1) as f64
            } else {
                0.0
            };
            let target = spec.first_target + span * t;
            let forward = (target - spec.origin).normalise().ok_or_else(|| {
                DiagError::ConfigError(format!(
                    "fibre {} of '{name}' targets its own origin",
                    i + 1
                ))
            })?;
            directions.push(forward);
        }
        Ok(FibreBundle {
            name,
            origin: spec.origin,
            directions,
            up,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> Point3 {
        self.origin
    }

    pub fn numfibres(&self) -> usize {
        self.directions.len()
    }

    /// Pose of fibre `number` (1-based).
    pub fn pose(&self, number: usize) -> DiagResult<FibrePose> {
        let count = self.numfibres();
        if number == 0 || number > count {
            return Err(DiagError::FibreOutOfRange { number, count });
        }
        Ok(FibrePose {
            number,
            origin: self.origin,
            forward: self.directions[number - 1],
            up: self.up,
        })
    }

    pub fn poses(&self) -> impl Iterator<Item = FibrePose> + '_ {
        self.directions
            .iter()
            .enumerate()
            .map(move |(i, &forward)| FibrePose {
                number: i + 1,
                origin: self.origin,
                forward,
                up: self.up,
            })
    }

    /// Directions [3, N] and wall distances [N] for every fibre.
    pub fn geometry(&self, scene: &dyn Scene) -> DiagResult<BundleGeometry> {
        let n = self.numfibres();
        let mut directions = Array2::zeros((3, n));
        let mut distance = Array1::zeros(n);
        for (i, d) in self.directions.iter().enumerate() {
            directions[[0, i]] = d.x;
            directions[[1, i]] = d.y;
            directions[[2, i]] = d.z;
            distance[i] = scene.distance_to_boundary(self.origin, *d)?;
        }
        Ok(BundleGeometry {
            origin: self.origin,
            directions,
            distance,
        })
    }
}

/// Which fibres a run samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FibreChoice {
    All,
    Single(usize),
}

impl FibreChoice {
    /// −1 selects all fibres; k ≥ 1 selects fibre k of `count`.
    pub fn parse(choice: i64, count: usize) -> DiagResult<Self> {
        match choice {
            -1 => Ok(FibreChoice::All),
            k if k >= 1 => {
                let number = k as usize;
                if number > count {
                    return Err(DiagError::FibreOutOfRange { number, count });
                }
                Ok(FibreChoice::Single(number))
            }
            other => Err(DiagError::ConfigError(format!(
                "dms.fibre_choice must be -1 or a fibre number, got {other}"
            ))),
        }
    }

    /// Fibre numbers to sample, ascending.
    pub fn numbers(&self, count: usize) -> Vec<usize> {
        match *self {
            FibreChoice::All => (1..=count).collect(),
            FibreChoice::Single(k) => vec![k],
        }
    }
}

/// Bundle for `dms.fibres` on `machine`, or the inline `dms.bundle` fan.
pub fn load_fibres(machine: Machine, dms: &DmsConfig) -> DiagResult<FibreBundle> {
    if let Some(spec) = &dms.bundle {
        return FibreBundle::fan(dms.fibres.clone(), spec, dms.up_vector);
    }
    match machine {
        Machine::MastU => {
            let (_, origin, first, last, count) = MASTU_FANS
                .iter()
                .find(|(group, ..)| *group == dms.fibres)
                .ok_or_else(|| {
                    DiagError::ConfigError(format!(
                        "unknown MAST-U fibre group '{}' (expected lower or upper)",
                        dms.fibres
                    ))
                })?;
            let spec = FanSpec {
                origin: Vec3::from(*origin),
                first_target: Vec3::from(*first),
                last_target: Vec3::from(*last),
                count: *count,
            };
            FibreBundle::fan(dms.fibres.clone(), &spec, dms.up_vector)
        }
        other => Err(DiagError::UnsupportedMachine(format!(
            "{other} (no fibre catalogue)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::VesselScene;

    fn four_fibres() -> FibreBundle {
        let spec = FanSpec {
            origin: Point3::new(1.5, 0.0, -1.0),
            first_target: Point3::new(0.5, 0.0, -2.0),
            last_target: Point3::new(1.5, 0.0, -2.0),
            count: 4,
        };
        FibreBundle::fan("test", &spec, Vec3::new(0.0, 0.0, 1.0)).unwrap()
    }

    #[test]
    fn test_fan_directions_unit() {
        let bundle = four_fibres();
        assert_eq!(bundle.numfibres(), 4);
        for pose in bundle.poses() {
            assert!((pose.forward.length() - 1.0).abs() < 1e-12);
        }
        // Last fibre looks straight down.
        let last = bundle.pose(4).unwrap();
        assert!((last.forward.z + 1.0).abs() < 1e-12);
        assert_eq!(last.index(), 3);
    }

    #[test]
    fn test_pose_out_of_range() {
        let bundle = four_fibres();
        assert!(matches!(
            bundle.pose(0),
            Err(DiagError::FibreOutOfRange { number: 0, count: 4 })
        ));
        assert!(matches!(
            bundle.pose(5),
            Err(DiagError::FibreOutOfRange { number: 5, count: 4 })
        ));
    }

    #[test]
    fn test_fibre_choice() {
        assert_eq!(FibreChoice::parse(-1, 4).unwrap(), FibreChoice::All);
        assert_eq!(FibreChoice::parse(2, 4).unwrap(), FibreChoice::Single(2));
        assert!(FibreChoice::parse(0, 4).is_err());
        assert!(FibreChoice::parse(-2, 4).is_err());
        assert!(matches!(
            FibreChoice::parse(9, 4),
            Err(DiagError::FibreOutOfRange { number: 9, count: 4 })
        ));
        assert_eq!(FibreChoice::All.numbers(3), vec![1, 2, 3]);
        assert_eq!(FibreChoice::Single(2).numbers(3), vec![2]);
    }

    #[test]
    fn test_geometry_distances() {
        let bundle = four_fibres();
        let scene = VesselScene::for_machine(Machine::MastU);
        let geom = bundle.geometry(&scene).unwrap();
        assert_eq!(geom.directions.dim(), (3, 4));
        // Straight down from z = -1.0 to the floor at -2.2.
        assert!((geom.distance[3] - 1.2).abs() < 1e-9);
        assert!(geom.distance.iter().all(|&d| d > 0.0));
    }

    #[test]
    fn test_catalogue() {
        let dms = DmsConfig::default();
        let lower = load_fibres(Machine::MastU, &dms).unwrap();
        assert_eq!(lower.numfibres(), 20);
        assert_eq!(lower.name(), "lower");

        let upper = load_fibres(
            Machine::MastU,
            &DmsConfig {
                fibres: "upper".into(),
                ..DmsConfig::default()
            },
        )
        .unwrap();
        assert!(upper.pose(1).unwrap().forward.z > 0.0);

        let unknown = DmsConfig {
            fibres: "midplane".into(),
            ..DmsConfig::default()
        };
        assert!(matches!(
            load_fibres(Machine::MastU, &unknown),
            Err(DiagError::ConfigError(_))
        ));
        assert!(matches!(
            load_fibres(Machine::Jet, &dms),
            Err(DiagError::UnsupportedMachine(_))
        ));
    }
}
