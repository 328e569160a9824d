// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Planck constant (J s).
pub const PLANCK: f64 = 6.626_070_15e-34;

/// Elementary charge (C), also J per eV.
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;

/// Atomic mass unit (kg).
pub const ATOMIC_MASS: f64 = 1.660_539_066_60e-27;

/// Electron mass in atomic mass units.
pub const ELECTRON_MASS_AMU: f64 = 5.485_799_090_65e-4;

/// Rydberg constant for infinite nuclear mass (1/m).
pub const RYDBERG_INF: f64 = 10_973_731.568_160;

/// Hydrogen ionisation energy (eV).
pub const RYDBERG_ENERGY_EV: f64 = 13.605_693_122_994;

/// Electron-volt to kelvin.
pub const EV_TO_KELVIN: f64 = 11_604.518_12;

/// Up reference for fibre poses when the configuration gives none.
pub const DEFAULT_UP_VECTOR: [f64; 3] = [0.0, 0.0, 1.0];

/// Ionisation stages sampled for the main deuterium ion (neutral, D+).
pub const DEUTERIUM_STAGES: usize = 2;

/// Camera display saturation quantile.
pub const DISPLAY_UNSATURATED_FRACTION: f64 = 0.96;

/// Camera display update cadence (s).
pub const DISPLAY_UPDATE_TIME: f64 = 15.0;

/// Half width of the window used for 2-D line emission profiles (nm).
pub const PROFILE_HALF_WINDOW_NM: f64 = 5.0;
