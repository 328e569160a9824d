// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Diagnostics Crate
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Synthetic diagnostic instruments.
//!
//! Machine scenes, fibre bundles and spectrometer windows, the DMS sampling
//! engine, the filtered camera and result output.

pub mod camera;
pub mod engine;
pub mod fibres;
pub mod machine;
pub mod output;
pub mod profiles;
pub mod sampler;
pub mod spectrometer;
