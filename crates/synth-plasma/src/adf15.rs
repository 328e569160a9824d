// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — ADF15 Reader
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Reader for ADAS ADF15 photon emissivity coefficient files.
//!
//! Layout:
//!
//! ```text
//!    2    /C 2 PHOTON EMISSIVITY COEFFICIENTS/
//!   4650.1 A    3    2 /TYPE = EXCIT /ISEL =    1
//!  1.00D+12 1.00D+13 1.00D+14      ne  [cm⁻³]
//!  1.00D+00 1.00D+01               Te  [eV]
//!  ...                             PEC [cm³/s], all Te per density
//! C  comment lines
//! ```
//!
//! Values are converted to nm, m⁻³ and m³/s on read.

use ndarray::{Array1, Array2};
use std::fs;
use std::path::Path;
use synth_types::config::TransitionKind;
use synth_types::error::{DiagError, DiagResult};

/// One PEC data block.
#[derive(Debug, Clone)]
pub struct PecBlock {
    /// 1-based block index.
    pub isel: usize,
    /// Wavelength [nm].
    pub wavelength: f64,
    /// `None` for block types other than EXCIT/RECOM (e.g. CHEXC).
    pub kind: Option<TransitionKind>,
    /// [m⁻³]
    pub density: Array1<f64>,
    /// [eV]
    pub temperature: Array1<f64>,
    /// [density, temperature] in m³/s.
    pub pec: Array2<f64>,
}

pub fn read_adf15(path: &Path) -> DiagResult<Vec<PecBlock>> {
    let contents = fs::read_to_string(path)?;
    parse_adf15(&contents)
        .map_err(|e| DiagError::AtomicData(format!("{}: {e}", path.display())))
}

/// Parse ADF15 text into blocks, in file order.
pub fn parse_adf15(contents: &str) -> DiagResult<Vec<PecBlock>> {
    let mut lines = contents.lines().filter(|l| !l.trim().is_empty());
    let first = lines
        .next()
        .ok_or_else(|| DiagError::AtomicData("empty ADF15 file".into()))?;
    let declared: usize = first
        .split_whitespace()
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| DiagError::AtomicData(format!("bad ADF15 first line '{first}'")))?;

    // Counts come from the file; never size an allocation from them directly.
    let mut blocks = Vec::with_capacity(declared.min(64));
    while blocks.len() < declared {
        let header = lines.next().ok_or_else(|| {
            DiagError::AtomicData(format!(
                "file declares {declared} blocks but ends after {}",
                blocks.len()
            ))
        })?;
        let (wavelength_a, nne, nte) = parse_header_counts(header)?;
        let kind = match field(header, "TYPE").as_deref() {
            Some("EXCIT") => Some(TransitionKind::Excitation),
            Some("RECOM") => Some(TransitionKind::Recombination),
            _ => None,
        };
        let isel = field(header, "ISEL")
            .and_then(|v| v.parse().ok())
            .unwrap_or(blocks.len() + 1);

        let needed = nne
            .checked_mul(nte)
            .and_then(|n| n.checked_add(nne))
            .and_then(|n| n.checked_add(nte))
            .ok_or_else(|| {
                DiagError::AtomicData(format!("block {isel} grid {nne}x{nte} is too large"))
            })?;
        let mut values = Vec::with_capacity(needed.min(4096));
        while values.len() < needed {
            let line = lines.next().ok_or_else(|| {
                DiagError::AtomicData(format!(
                    "block {isel} truncated ({} of {needed} values)",
                    values.len()
                ))
            })?;
            for token in line.split_whitespace() {
                values.push(parse_fortran_float(token)?);
            }
        }
        if values.len() != needed {
            return Err(DiagError::AtomicData(format!(
                "block {isel} has {} values, expected {needed}",
                values.len()
            )));
        }

        let density = Array1::from_iter(values[..nne].iter().map(|n| n * 1e6));
        let temperature = Array1::from_iter(values[nne..nne + nte].iter().copied());
        let pec_values = values[nne + nte..].iter().map(|v| v * 1e-6).collect();
        let pec = Array2::from_shape_vec((nne, nte), pec_values)
            .map_err(|e| DiagError::AtomicData(format!("block {isel}: {e}")))?;

        blocks.push(PecBlock {
            isel,
            wavelength: wavelength_a / 10.0,
            kind,
            density,
            temperature,
            pec,
        });
    }
    Ok(blocks)
}

/// (wavelength [Å], nne, nte) from a block header.
fn parse_header_counts(header: &str) -> DiagResult<(f64, usize, usize)> {
    let leading = header.split('/').next().unwrap_or_default();
    let tokens: Vec<&str> = leading
        .split_whitespace()
        .filter(|t| !t.eq_ignore_ascii_case("A"))
        .collect();
    let bad = || DiagError::AtomicData(format!("bad ADF15 block header '{}'", header.trim()));
    if tokens.len() < 3 {
        return Err(bad());
    }
    let wavelength = parse_fortran_float(tokens[0].trim_end_matches(['A', 'a']))?;
    let nne = tokens[1].parse().map_err(|_| bad())?;
    let nte = tokens[2].parse().map_err(|_| bad())?;
    if nne == 0 || nte == 0 {
        return Err(bad());
    }
    Ok((wavelength, nne, nte))
}

/// Value of a `/KEY = value` header field.
fn field(header: &str, key: &str) -> Option<String> {
    header.split('/').find_map(|part| {
        let (k, v) = part.split_once('=')?;
        (k.trim().eq_ignore_ascii_case(key)).then(|| v.trim().to_ascii_uppercase())
    })
}

/// Fortran real: accepts `D` exponents and the exponent-without-letter
/// form `1.234-13`.
fn parse_fortran_float(token: &str) -> DiagResult<f64> {
    let normalised = token.replace(['D', 'd'], "E");
    if let Ok(v) = normalised.parse::<f64>() {
        return Ok(v);
    }
    // Find a sign that follows a digit and is not already after an E.
    let bytes = normalised.as_bytes();
    for i in 1..bytes.len() {
        if (bytes[i] == b'+' || bytes[i] == b'-') && bytes[i - 1].is_ascii_digit() {
            let fixed = format!("{}E{}", &normalised[..i], &normalised[i..]);
            if let Ok(v) = fixed.parse::<f64>() {
                return Ok(v);
            }
        }
    }
    Err(DiagError::AtomicData(format!("bad number '{token}'")))
}

/// Two-block carbon file shared by the tests of this crate.
#[cfg(test)]
pub(crate) const SAMPLE: &str = "\
    2    /C 2 PHOTON EMISSIVITY COEFFICIENTS/
  4650.1 A    3    2 /FILMEM = bndc2/TYPE = EXCIT /INDM = T /ISEL =    1
 1.00D+12 1.00D+13 1.00D+14
 1.00D+00 1.00D+01
 1.00D-13 2.00D-13
 1.10D-13 2.10D-13
 1.20D-13 2.20D-13
  4650.1 A    3    2 /FILMEM = bndc2/TYPE = RECOM /INDM = T /ISEL =    2
 1.00D+12 1.00D+13 1.00D+14
 1.00D+00 1.00D+01
 5.00-14 4.00-14 5.10-14
 4.10-14 5.20-14 4.20-14
C-----------------------------------------------------------------------
C  synthetic test file
";
