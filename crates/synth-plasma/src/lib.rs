// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Plasma Crate
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Plasma backgrounds, atomic data and emission models.
//!
//! Backgrounds: analytic pedestal/SOL, gridded npz
//! Emission: line models with Doppler/Stark/multiplet shapes, bremsstrahlung

pub mod adf15;
pub mod analytic;
pub mod atomic;
pub mod builder;
pub mod composition;
pub mod emission;
pub mod gridded;
pub mod lineshape;
pub mod loader;
pub mod plasma;
