// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Atomic Data
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Line wavelengths and photon emissivity coefficients (PECs).
//!
//! [`RateLibrary`] answers from installed ADF15 tables first. One-electron
//! systems (H, D, He⁺, ...) fall back to Rydberg wavelengths and scaled
//! hydrogenic rate fits, so Balmer-line runs need no data files.

use crate::adf15::{self, PecBlock};
use log::debug;
use ndarray::{Array1, Array2};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use synth_math::interp::loglog_bilinear;
use synth_types::config::{BlockSelection, TransitionKind};
use synth_types::constants::{ELECTRON_MASS_AMU, RYDBERG_ENERGY_EV, RYDBERG_INF};
use synth_types::error::{DiagError, DiagResult};
use synth_types::species::Element;

/// Hydrogenic excitation PEC scale [m³/s].
const HYDROGENIC_EXCITATION_SCALE: f64 = 5.0e-14;

/// Hydrogenic recombination PEC scale [m³/s].
const HYDROGENIC_RECOMBINATION_SCALE: f64 = 3.0e-19;

/// Validity range of the hydrogenic fits.
const FIT_TE_RANGE: (f64, f64) = (0.2, 1.0e4);
const FIT_NE_RANGE: (f64, f64) = (1.0e14, 1.0e22);

/// A bound-bound transition of one ionisation stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub element: &'static Element,
    pub ionisation: u32,
    pub upper: u32,
    pub lower: u32,
}

impl Line {
    pub fn new(element: &'static Element, ionisation: u32, upper: u32, lower: u32) -> Self {
        Line {
            element,
            ionisation,
            upper,
            lower,
        }
    }

    fn key(&self) -> LineKey {
        LineKey {
            element: self.element.name,
            ionisation: self.ionisation,
            upper: self.upper,
            lower: self.lower,
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({} -> {})",
            self.element, self.ionisation, self.upper, self.lower
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct LineKey {
    element: &'static str,
    ionisation: u32,
    upper: u32,
    lower: u32,
}

/// Source of line wavelengths and rate coefficients.
pub trait AtomicData: Send + Sync {
    /// Line centre wavelength [nm].
    fn wavelength(&self, line: &Line) -> DiagResult<f64>;

    /// Photon emissivity coefficient [m³/s] at `te` [eV], `ne` [m⁻³].
    fn pec(&self, line: &Line, kind: TransitionKind, te: f64, ne: f64) -> DiagResult<f64>;

    /// Whether [`AtomicData::pec`] can answer for this line at all.
    fn supports(&self, line: &Line, kind: TransitionKind) -> bool;
}

/// Tabulated PEC over (ne, te), SI units.
#[derive(Debug, Clone)]
pub struct PecTable {
    pub wavelength: f64,
    pub density: Array1<f64>,
    pub temperature: Array1<f64>,
    /// [density, temperature]
    pub pec: Array2<f64>,
}

impl From<PecBlock> for PecTable {
    fn from(block: PecBlock) -> Self {
        PecTable {
            wavelength: block.wavelength,
            density: block.density,
            temperature: block.temperature,
            pec: block.pec,
        }
    }
}

/// Layered atomic data: wavelength overrides, installed tables,
/// hydrogenic fits.
#[derive(Debug, Default)]
pub struct RateLibrary {
    permit_extrapolation: bool,
    wavelengths: HashMap<LineKey, f64>,
    tables: HashMap<(LineKey, TransitionKind), PecTable>,
}

impl RateLibrary {
    pub fn new(permit_extrapolation: bool) -> Self {
        RateLibrary {
            permit_extrapolation,
            ..Default::default()
        }
    }

    /// Register a wavelength [nm] that replaces every other source.
    pub fn set_wavelength(&mut self, line: &Line, wavelength: f64) -> DiagResult<()> {
        if !wavelength.is_finite() || wavelength <= 0.0 {
            return Err(DiagError::AtomicData(format!(
                "wavelength override for {line} must be finite and > 0, got {wavelength}"
            )));
        }
        self.wavelengths.insert(line.key(), wavelength);
        Ok(())
    }

    pub fn install_table(&mut self, line: &Line, kind: TransitionKind, table: PecTable) {
        self.tables.insert((line.key(), kind), table);
    }

    /// Install the selected blocks of an ADF15 file for one stage.
    /// Returns the number of tables installed.
    pub fn install_adf15(
        &mut self,
        element: &'static Element,
        ionisation: u32,
        path: &Path,
        excitation: &[BlockSelection],
        recombination: &[BlockSelection],
    ) -> DiagResult<usize> {
        let blocks = adf15::read_adf15(path)?;
        let selections = excitation
            .iter()
            .map(|s| (s, TransitionKind::Excitation))
            .chain(recombination.iter().map(|s| (s, TransitionKind::Recombination)));

        let mut installed = 0;
        for (selection, kind) in selections {
            let block = blocks
                .iter()
                .find(|b| b.isel == selection.isel)
                .ok_or_else(|| {
                    DiagError::AtomicData(format!(
                        "{} has no ISEL {} block",
                        path.display(),
                        selection.isel
                    ))
                })?;
            let line = Line::new(element, ionisation, selection.upper, selection.lower);
            debug!(
                "installing ADF15 block {} ({:.2} nm) for {line} {kind:?}",
                block.isel, block.wavelength
            );
            self.install_table(&line, kind, PecTable::from(block.clone()));
            installed += 1;
        }
        Ok(installed)
    }

    fn check_range(
        &self,
        line: &Line,
        what: &str,
        value: f64,
        range: (f64, f64),
    ) -> DiagResult<()> {
        if !self.permit_extrapolation && (value < range.0 || value > range.1) {
            return Err(DiagError::AtomicData(format!(
                "{what} = {value:e} outside [{:e}, {:e}] for {line} and extrapolation is disabled",
                range.0, range.1
            )));
        }
        Ok(())
    }
}

impl AtomicData for RateLibrary {
    fn wavelength(&self, line: &Line) -> DiagResult<f64> {
        let key = line.key();
        if let Some(&w) = self.wavelengths.get(&key) {
            return Ok(w);
        }
        for kind in [TransitionKind::Excitation, TransitionKind::Recombination] {
            if let Some(table) = self.tables.get(&(key, kind)) {
                return Ok(table.wavelength);
            }
        }
        if line.element.is_hydrogenic(line.ionisation) {
            return Ok(hydrogenic_wavelength(line.element, line.upper, line.lower));
        }
        Err(DiagError::AtomicData(format!(
            "no wavelength available for {line}; supply a wavelength override or ADF15 data"
        )))
    }

    fn pec(&self, line: &Line, kind: TransitionKind, te: f64, ne: f64) -> DiagResult<f64> {
        if let Some(table) = self.tables.get(&(line.key(), kind)) {
            let looked_up = loglog_bilinear(&table.density, &table.temperature, &table.pec, ne, te);
            if looked_up.clamped && !self.permit_extrapolation {
                return Err(DiagError::AtomicData(format!(
                    "(te={te:e}, ne={ne:e}) outside the ADF15 table for {line} and extrapolation is disabled"
                )));
            }
            return Ok(looked_up.value);
        }
        if line.element.is_hydrogenic(line.ionisation) {
            self.check_range(line, "te", te, FIT_TE_RANGE)?;
            self.check_range(line, "ne", ne, FIT_NE_RANGE)?;
            let te = te.clamp(FIT_TE_RANGE.0, FIT_TE_RANGE.1);
            return Ok(match kind {
                TransitionKind::Excitation => {
                    hydrogenic_excitation_pec(line.element, line.upper, te)
                }
                TransitionKind::Recombination => {
                    hydrogenic_recombination_pec(line.element, line.upper, te)
                }
            });
        }
        Err(DiagError::AtomicData(format!(
            "no {kind:?} rate data for {line}; install an ADF15 file"
        )))
    }

    fn supports(&self, line: &Line, kind: TransitionKind) -> bool {
        self.tables.contains_key(&(line.key(), kind)) || line.element.is_hydrogenic(line.ionisation)
    }
}

/// Vacuum wavelength [nm] of a one-electron transition, reduced-mass
/// corrected.
pub fn hydrogenic_wavelength(element: &Element, upper: u32, lower: u32) -> f64 {
    let z = element.atomic_number as f64;
    let rydberg = RYDBERG_INF / (1.0 + ELECTRON_MASS_AMU / element.atomic_weight);
    let term = 1.0 / (lower as f64).powi(2) - 1.0 / (upper as f64).powi(2);
    1.0e9 / (z * z * rydberg * term)
}

/// Excitation from the ground state: threshold factor over a Born-like
/// 1/sqrt(te) fall-off, scaled by n_upper⁻³ and Z⁻³.
fn hydrogenic_excitation_pec(element: &Element, upper: u32, te: f64) -> f64 {
    let z = element.atomic_number as f64;
    let threshold = RYDBERG_ENERGY_EV * z * z * (1.0 - 1.0 / (upper as f64).powi(2));
    let n3 = (upper as f64).powi(3);
    HYDROGENIC_EXCITATION_SCALE / (n3 * z.powi(3))
        * (RYDBERG_ENERGY_EV * z * z / te).sqrt()
        * (-threshold / te).exp()
}

/// Radiative-cascade recombination, falling as te^-3/4.
fn hydrogenic_recombination_pec(element: &Element, upper: u32, te: f64) -> f64 {
    let z = element.atomic_number as f64;
    let n2 = (upper as f64).powi(2);
    HYDROGENIC_RECOMBINATION_SCALE * z / n2 * (RYDBERG_ENERGY_EV * z * z / te).powf(0.75)
}

#[cfg(test)]
mod tests {
    use super::*;
    use synth_types::species::{CARBON, DEUTERIUM, HELIUM, HYDROGEN};

    #[test]
    fn test_balmer_alpha_wavelengths() {
        // NIST vacuum wavelengths: H-alpha 656.47 nm, D-alpha 656.29 nm.
        let h = hydrogenic_wavelength(&HYDROGEN, 3, 2);
        let d = hydrogenic_wavelength(&DEUTERIUM, 3, 2);
        assert!((h - 656.47).abs() < 0.02, "H-alpha {h}");
        assert!((d - 656.29).abs() < 0.02, "D-alpha {d}");
        assert!(d < h, "isotope shift must be to the blue");
    }

    #[test]
    fn test_helium_ion_wavelength() {
        // He II 4 -> 3 at 468.7 nm (vacuum 468.71).
        let w = hydrogenic_wavelength(&HELIUM, 4, 3);
        assert!((w - 468.7).abs() < 0.1, "He II 4-3 {w}");
    }

    #[test]
    fn test_override_takes_precedence() {
        let mut lib = RateLibrary::new(true);
        let line = Line::new(&DEUTERIUM, 0, 3, 2);
        lib.set_wavelength(&line, 656.1).unwrap();
        assert_eq!(lib.wavelength(&line).unwrap(), 656.1);
        assert!(lib.set_wavelength(&line, -1.0).is_err());
    }

    #[test]
    fn test_non_hydrogenic_needs_data() {
        let lib = RateLibrary::new(true);
        let line = Line::new(&CARBON, 2, 4, 3);
        assert!(!lib.supports(&line, TransitionKind::Excitation));
        assert!(matches!(
            lib.wavelength(&line),
            Err(DiagError::AtomicData(_))
        ));
        assert!(lib
            .pec(&line, TransitionKind::Excitation, 10.0, 1e19)
            .is_err());
    }

    #[test]
    fn test_hydrogenic_rates_positive_and_shaped() {
        let lib = RateLibrary::new(true);
        let line = Line::new(&DEUTERIUM, 0, 3, 2);
        let cold = lib.pec(&line, TransitionKind::Excitation, 2.0, 1e19).unwrap();
        let warm = lib.pec(&line, TransitionKind::Excitation, 20.0, 1e19).unwrap();
        assert!(cold > 0.0 && warm > cold, "excitation rises through threshold");

        let rec_cold = lib.pec(&line, TransitionKind::Recombination, 1.0, 1e19).unwrap();
        let rec_warm = lib.pec(&line, TransitionKind::Recombination, 10.0, 1e19).unwrap();
        assert!(rec_cold > rec_warm, "recombination favours cold plasma");
    }

    #[test]
    fn test_extrapolation_guard() {
        let strict = RateLibrary::new(false);
        let line = Line::new(&DEUTERIUM, 0, 3, 2);
        assert!(strict
            .pec(&line, TransitionKind::Excitation, 0.01, 1e19)
            .is_err());
        let permissive = RateLibrary::new(true);
        assert!(permissive
            .pec(&line, TransitionKind::Excitation, 0.01, 1e19)
            .is_ok());
    }

    #[test]
    fn test_installed_table_lookup() {
        let mut lib = RateLibrary::new(false);
        let line = Line::new(&CARBON, 2, 4, 3);
        let table = PecTable {
            wavelength: 465.0,
            density: Array1::from_vec(vec![1e18, 1e20]),
            temperature: Array1::from_vec(vec![1.0, 100.0]),
            pec: Array2::from_elem((2, 2), 2.0e-16),
        };
        lib.install_table(&line, TransitionKind::Excitation, table);
        assert!(lib.supports(&line, TransitionKind::Excitation));
        assert!(!lib.supports(&line, TransitionKind::Recombination));
        assert_eq!(lib.wavelength(&line).unwrap(), 465.0);
        let pec = lib.pec(&line, TransitionKind::Excitation, 10.0, 1e19).unwrap();
        assert!((pec - 2.0e-16).abs() < 1e-28);
        assert!(lib
            .pec(&line, TransitionKind::Excitation, 500.0, 1e19)
            .is_err());
    }
}
