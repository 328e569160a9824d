// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Property-Based Tests (proptest) for synth-types
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for synth-types using proptest.
//!
//! Covers: species registry lookup, PoloidalGrid construction,
//! vector normalisation, result buffer shapes.

use ndarray::Array2;
use proptest::prelude::*;
use synth_types::error::DiagError;
use synth_types::geometry::{Point3, Vec3};
use synth_types::species::{self, lookup};
use synth_types::state::{BundleGeometry, ChannelExt, DiagnosticResult, PoloidalGrid};

// ── Species Registry ─────────────────────────────────────────────────

proptest! {
    /// Any string outside the registry fails with InvalidSpecies.
    #[test]
    fn unknown_names_rejected(name in "[a-zA-Z_]{0,12}") {
        prop_assume!(species::names().all(|n| n != name));
        match lookup(&name) {
            Err(DiagError::InvalidSpecies(n)) => prop_assert_eq!(n, name),
            other => prop_assert!(false, "expected InvalidSpecies, got {:?}", other),
        }
    }

    /// Every registered name resolves to a physical element.
    #[test]
    fn registered_names_resolve(idx in 0usize..9) {
        let name = species::REGISTRY[idx].name;
        let element = lookup(name).unwrap();
        prop_assert!(element.atomic_number >= 1);
        prop_assert_eq!(element.stage_count(), element.atomic_number as usize + 1);
        prop_assert!(element.atomic_weight > 0.0);
    }
}

// ── PoloidalGrid Construction Invariants ─────────────────────────────

proptest! {
    /// Grid boundary values and spacing are correct.
    #[test]
    fn grid_boundaries(
        nx in 3usize..128,
        ny in 3usize..128,
        x_min in 0.0f64..1.0,
        y_min in -3.0f64..0.0,
    ) {
        let x_max = x_min + 2.0;
        let y_max = y_min + 4.0;
        let grid = PoloidalGrid::new(nx, ny, x_min, x_max, y_min, y_max);

        prop_assert!((grid.x[0] - x_min).abs() < 1e-12);
        prop_assert!((grid.x[nx - 1] - x_max).abs() < 1e-12);
        prop_assert!((grid.y[0] - y_min).abs() < 1e-12);
        prop_assert!((grid.y[ny - 1] - y_max).abs() < 1e-12);
        for i in 1..nx {
            prop_assert!((grid.x[i] - grid.x[i - 1] - grid.dx).abs() < 1e-12);
        }
    }
}

// ── Vector Invariants ────────────────────────────────────────────────

proptest! {
    /// Normalised vectors have unit length and keep direction.
    #[test]
    fn normalise_unit_length(
        x in -10.0f64..10.0,
        y in -10.0f64..10.0,
        z in -10.0f64..10.0,
    ) {
        let v = Vec3::new(x, y, z);
        prop_assume!(v.length() > 1e-6);
        let u = v.normalise().unwrap();
        prop_assert!((u.length() - 1.0).abs() < 1e-12);
        prop_assert!(u.dot(&v) > 0.0);
    }
}

// ── Result Buffers ───────────────────────────────────────────────────

proptest! {
    /// Fresh results have the documented shapes and nothing set.
    #[test]
    fn result_shapes(n in 1usize..32, steps in 1usize..64, bins in 1usize..64) {
        let geometry = BundleGeometry {
            origin: Point3::default(),
            directions: Array2::zeros((3, n)),
            distance: ndarray::Array1::ones(n),
        };
        let result = DiagnosticResult::new(
            "fan",
            ndarray::Array1::linspace(400.0, 700.0, bins),
            geometry,
            steps,
            None,
        );
        prop_assert_eq!(result.power.shape(), &[n]);
        prop_assert_eq!(result.spectra.shape(), &[bins, n]);
        prop_assert_eq!(result.te_los.shape(), &[steps, n]);
        prop_assert_eq!(result.ne_los.shape(), &[steps, n]);
        prop_assert_eq!(result.ni_los.shape(), &[steps, n, 2]);
        prop_assert!(result.nz_los.is_none());
        prop_assert!(result.spectra.all_unset());
    }
}
