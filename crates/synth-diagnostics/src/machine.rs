// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Machine Geometry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Machine dispatch and first-wall envelopes.
//!
//! Each supported device is reduced to a toroidal annulus: centre column
//! radius, outer wall radius and half height. Rays stop at the first wall
//! they meet; all surfaces are absorbing.

use log::{info, warn};
use std::fmt;
use synth_types::config::MachineConfig;
use synth_types::error::{DiagError, DiagResult};
use synth_types::geometry::{Point3, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Machine {
    MastU,
    Jet,
    Aug,
}

impl Machine {
    pub fn from_name(name: &str) -> DiagResult<Self> {
        match name {
            "MAST-U" => Ok(Machine::MastU),
            "JET" => Ok(Machine::Jet),
            "AUG" => Ok(Machine::Aug),
            other => Err(DiagError::UnsupportedMachine(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Machine::MastU => "MAST-U",
            Machine::Jet => "JET",
            Machine::Aug => "AUG",
        }
    }

    /// Nominal first wall (inner radius, outer radius, half height) [m].
    fn envelope(&self) -> (f64, f64, f64) {
        match self {
            Machine::MastU => (0.26, 2.0, 2.2),
            Machine::Jet => (1.7, 4.0, 2.0),
            Machine::Aug => (0.9, 2.7, 1.3),
        }
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Geometry rays are traced against.
pub trait Scene: Send + Sync {
    /// Distance [m] from `origin` along unit `direction` to the first wall.
    fn distance_to_boundary(&self, origin: Point3, direction: Vec3) -> DiagResult<f64>;

    fn contains(&self, p: Point3) -> bool;
}

/// Toroidal annulus vessel.
#[derive(Debug, Clone, PartialEq)]
pub struct VesselScene {
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub half_height: f64,
    /// Reflection was requested; not modelled.
    pub reflecting: bool,
}

impl VesselScene {
    pub fn new(inner_radius: f64, outer_radius: f64, half_height: f64) -> DiagResult<Self> {
        if !(inner_radius >= 0.0 && inner_radius < outer_radius && half_height > 0.0) {
            return Err(DiagError::ConfigError(format!(
                "vessel needs 0 <= inner < outer and half height > 0, got ({inner_radius}, {outer_radius}, {half_height})"
            )));
        }
        Ok(VesselScene {
            inner_radius,
            outer_radius,
            half_height,
            reflecting: false,
        })
    }

    pub fn for_machine(machine: Machine) -> Self {
        let (inner_radius, outer_radius, half_height) = machine.envelope();
        VesselScene {
            inner_radius,
            outer_radius,
            half_height,
            reflecting: false,
        }
    }
}

/// Roots of a t² + b t + c = 0 in ascending order.
fn quadratic_roots(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    if a.abs() < f64::EPSILON {
        return None;
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let t0 = (-b - sq) / (2.0 * a);
    let t1 = (-b + sq) / (2.0 * a);
    Some((t0.min(t1), t0.max(t1)))
}

impl Scene for VesselScene {
    fn distance_to_boundary(&self, origin: Point3, direction: Vec3) -> DiagResult<f64> {
        if !self.contains(origin) {
            return Err(DiagError::SamplingFailed(format!(
                "ray origin ({:.3}, {:.3}, {:.3}) lies outside the vessel",
                origin.x, origin.y, origin.z
            )));
        }
        let d = direction.normalise().ok_or_else(|| {
            DiagError::SamplingFailed("ray direction must be non-zero".into())
        })?;

        let a = d.x * d.x + d.y * d.y;
        let b = 2.0 * (origin.x * d.x + origin.y * d.y);
        let r2 = origin.x * origin.x + origin.y * origin.y;

        let mut hits = Vec::with_capacity(3);
        // Outer wall: origin inside, so the larger root is the exit.
        if let Some((_, t)) = quadratic_roots(a, b, r2 - self.outer_radius.powi(2)) {
            hits.push(t);
        }
        // Centre column: first entry in front of the origin.
        if self.inner_radius > 0.0 {
            if let Some((t, _)) = quadratic_roots(a, b, r2 - self.inner_radius.powi(2)) {
                if t > 0.0 {
                    hits.push(t);
                }
            }
        }
        if d.z > 0.0 {
            hits.push((self.half_height - origin.z) / d.z);
        } else if d.z < 0.0 {
            hits.push((-self.half_height - origin.z) / d.z);
        }

        hits.into_iter()
            .filter(|t| t.is_finite() && *t >= 0.0)
            .min_by(f64::total_cmp)
            .ok_or_else(|| DiagError::SamplingFailed("ray never reaches the vessel wall".into()))
    }

    fn contains(&self, p: Point3) -> bool {
        let r = p.major_radius();
        r >= self.inner_radius && r <= self.outer_radius && p.z.abs() <= self.half_height
    }
}

/// Dispatch `machine.name` to its vessel.
pub fn load_machine(config: &MachineConfig) -> DiagResult<VesselScene> {
    let machine = Machine::from_name(&config.name)?;
    let mut scene = VesselScene::for_machine(machine);
    if config.reflecting {
        warn!("{machine}: reflecting walls requested; walls are treated as absorbing");
        scene.reflecting = true;
    }
    info!(
        "{machine} vessel: R {:.2}..{:.2} m, |Z| <= {:.2} m",
        scene.inner_radius, scene.outer_radius, scene.half_height
    );
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mastu() -> VesselScene {
        VesselScene::for_machine(Machine::MastU)
    }

    #[test]
    fn test_dispatch() {
        for name in ["MAST-U", "JET", "AUG"] {
            assert_eq!(Machine::from_name(name).unwrap().name(), name);
        }
        match Machine::from_name("XYZ") {
            Err(DiagError::UnsupportedMachine(n)) => assert_eq!(n, "XYZ"),
            other => panic!("expected UnsupportedMachine, got {other:?}"),
        }
    }

    #[test]
    fn test_radial_hits_outer_wall() {
        let d = mastu()
            .distance_to_boundary(Point3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0))
            .unwrap();
        assert!((d - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inward_hits_centre_column() {
        let d = mastu()
            .distance_to_boundary(Point3::new(1.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0))
            .unwrap();
        assert!((d - 0.74).abs() < 1e-12);
    }

    #[test]
    fn test_vertical_hits_floor() {
        let d = mastu()
            .distance_to_boundary(Point3::new(1.0, 0.0, -1.6), Vec3::new(0.0, 0.0, -1.0))
            .unwrap();
        assert!((d - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_tangential_misses_column() {
        // Passes the column at R = 0.5 > 0.26 and exits the outer wall.
        let d = mastu()
            .distance_to_boundary(Point3::new(1.5, 0.5, 0.0), Vec3::new(-1.0, 0.0, 0.0))
            .unwrap();
        let expected = 1.5 + (2.0f64.powi(2) - 0.25).sqrt();
        assert!((d - expected).abs() < 1e-9, "d = {d}");
    }

    #[test]
    fn test_origin_outside() {
        assert!(mastu()
            .distance_to_boundary(Point3::new(3.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0))
            .is_err());
    }

    #[test]
    fn test_reflecting_recorded() {
        let scene = load_machine(&MachineConfig {
            name: "JET".into(),
            reflecting: true,
        })
        .unwrap();
        assert!(scene.reflecting);
        assert_eq!(scene.outer_radius, 4.0);
    }
}
