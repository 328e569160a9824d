// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Species Registry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Fixed registry of the atomic species a configuration may name.
//!
//! Elements are handed out as `&'static Element`, so identity comparison
//! and cheap sharing between emission models and plasma composition come
//! for free.

use crate::error::{DiagError, DiagResult};
use std::fmt;

/// Atomic species descriptor.
#[derive(Debug, PartialEq)]
pub struct Element {
    pub name: &'static str,
    pub symbol: &'static str,
    pub atomic_number: u32,
    /// Atomic weight [amu].
    pub atomic_weight: f64,
}

impl Element {
    /// Number of ionisation stages, neutral through fully stripped.
    pub fn stage_count(&self) -> usize {
        self.atomic_number as usize + 1
    }

    /// Whether `ionisation` leaves a single bound electron.
    pub fn is_hydrogenic(&self, ionisation: u32) -> bool {
        ionisation + 1 == self.atomic_number
    }

    /// Mass [kg].
    pub fn mass(&self) -> f64 {
        self.atomic_weight * crate::constants::ATOMIC_MASS
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

pub static HYDROGEN: Element = Element {
    name: "hydrogen",
    symbol: "H",
    atomic_number: 1,
    atomic_weight: 1.00784,
};

pub static DEUTERIUM: Element = Element {
    name: "deuterium",
    symbol: "D",
    atomic_number: 1,
    atomic_weight: 2.014_101_778,
};

pub static HELIUM: Element = Element {
    name: "helium",
    symbol: "He",
    atomic_number: 2,
    atomic_weight: 4.002602,
};

pub static CARBON: Element = Element {
    name: "carbon",
    symbol: "C",
    atomic_number: 6,
    atomic_weight: 12.0107,
};

pub static NITROGEN: Element = Element {
    name: "nitrogen",
    symbol: "N",
    atomic_number: 7,
    atomic_weight: 14.0067,
};

pub static NEON: Element = Element {
    name: "neon",
    symbol: "Ne",
    atomic_number: 10,
    atomic_weight: 20.1797,
};

pub static ARGON: Element = Element {
    name: "argon",
    symbol: "Ar",
    atomic_number: 18,
    atomic_weight: 39.948,
};

pub static KRYPTON: Element = Element {
    name: "krypton",
    symbol: "Kr",
    atomic_number: 36,
    atomic_weight: 83.798,
};

pub static XENON: Element = Element {
    name: "xenon",
    symbol: "Xe",
    atomic_number: 54,
    atomic_weight: 131.293,
};

/// Registry order is the order `species` listings print in.
pub static REGISTRY: [&Element; 9] = [
    &HYDROGEN, &DEUTERIUM, &HELIUM, &CARBON, &NITROGEN, &NEON, &ARGON, &KRYPTON, &XENON,
];

/// Resolve a configuration species name.
pub fn lookup(name: &str) -> DiagResult<&'static Element> {
    REGISTRY
        .iter()
        .copied()
        .find(|e| e.name == name)
        .ok_or_else(|| DiagError::InvalidSpecies(name.to_string()))
}

/// Names accepted by [`lookup`].
pub fn names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|e| e.name)
}
