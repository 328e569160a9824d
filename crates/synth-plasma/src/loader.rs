// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Plasma Loader
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::analytic::analytic_plasma;
use crate::gridded::load_gridded_plasma;
use crate::plasma::Plasma;
use log::info;
use synth_types::config::EdgeConfig;
use synth_types::error::{DiagError, DiagResult};

/// Build the edge plasma background selected by `plasma.edge`.
pub fn load_plasma(edge: &EdgeConfig) -> DiagResult<Plasma> {
    if !edge.present {
        return Err(DiagError::ConfigError(
            "this configuration does not specify an edge plasma".into(),
        ));
    }

    match edge.kind.as_deref() {
        Some("analytic") => {
            let analytic = edge.analytic.clone().unwrap_or_default();
            info!(
                "analytic edge plasma: R0 = {} m, a = {} m, Te,sep = {} eV",
                analytic.major_radius, analytic.minor_radius, analytic.te_separatrix
            );
            analytic_plasma(&analytic)
        }
        Some("gridded") => {
            match edge.format.as_deref().unwrap_or("npz") {
                "npz" => {}
                other => {
                    return Err(DiagError::UnsupportedSimulationFormat(format!(
                        "gridded/{other}"
                    )))
                }
            }
            let file = edge.file.as_ref().ok_or_else(|| {
                DiagError::ConfigError("plasma.edge.file is required for a gridded plasma".into())
            })?;
            load_gridded_plasma(file)
        }
        // MDSplus and raw-output SOLPS readers are not bundled.
        Some("SOLPS") => Err(DiagError::UnsupportedSimulationFormat(format!(
            "SOLPS/{}",
            edge.solps_format.as_deref().unwrap_or("unspecified")
        ))),
        Some(other) => Err(DiagError::UnsupportedSimulationFormat(other.to_string())),
        None => Err(DiagError::ConfigError(
            "plasma.edge.type is missing".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(json: &str) -> EdgeConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_absent_edge() {
        assert!(matches!(
            load_plasma(&edge(r#"{"present": false}"#)),
            Err(DiagError::ConfigError(_))
        ));
        assert!(matches!(
            load_plasma(&edge("{}")),
            Err(DiagError::ConfigError(_))
        ));
    }

    #[test]
    fn test_solps_unsupported() {
        let cfg = edge(r#"{"present": true, "type": "SOLPS", "SOLPS_format": "MDSplus"}"#);
        match load_plasma(&cfg) {
            Err(DiagError::UnsupportedSimulationFormat(name)) => assert_eq!(name, "SOLPS/MDSplus"),
            other => panic!("expected UnsupportedSimulationFormat, got {other:?}"),
        }
        let odd = edge(r#"{"present": true, "type": "EDGE2D"}"#);
        assert!(matches!(
            load_plasma(&odd),
            Err(DiagError::UnsupportedSimulationFormat(_))
        ));
    }

    #[test]
    fn test_analytic_defaults() {
        let plasma = load_plasma(&edge(r#"{"present": true, "type": "analytic"}"#)).unwrap();
        assert_eq!(plasma.name(), "analytic");
        assert_eq!(plasma.composition().len(), 2);
    }

    #[test]
    fn test_gridded_needs_file() {
        let cfg = edge(r#"{"present": true, "type": "gridded"}"#);
        assert!(matches!(load_plasma(&cfg), Err(DiagError::ConfigError(_))));
        let missing = edge(r#"{"present": true, "type": "gridded", "file": "/nonexistent/plasma.npz"}"#);
        assert!(matches!(load_plasma(&missing), Err(DiagError::Io(_))));
    }
}
