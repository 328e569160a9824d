// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Spectrometer Settings
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use synth_types::config::DmsConfig;
use synth_types::error::{DiagError, DiagResult};
use synth_types::spectrum::SpectralWindow;

/// Named spectrometer settings: (name, bins, lower nm, upper nm).
static SETTINGS: [(&str, usize, f64, f64); 4] = [
    ("balmer_alpha", 512, 650.0, 662.0),
    ("balmer_beta", 512, 480.0, 492.0),
    ("balmer_gamma", 512, 428.0, 440.0),
    ("survey", 1024, 380.0, 700.0),
];

pub fn setting_names() -> impl Iterator<Item = &'static str> {
    SETTINGS.iter().map(|s| s.0)
}

/// Spectral window for a named setting.
pub fn setting(name: &str) -> DiagResult<SpectralWindow> {
    let (_, bins, lower, upper) = SETTINGS
        .iter()
        .find(|s| s.0 == name)
        .ok_or_else(|| {
            DiagError::ConfigError(format!(
                "unknown spectrometer setting '{name}' (expected one of: {})",
                setting_names().collect::<Vec<_>>().join(", ")
            ))
        })?;
    SpectralWindow::new(*bins, *lower, *upper)
}

/// Window from `dms.window` if given, else the `dms.spectrometer` setting.
pub fn load_spectrometer(dms: &DmsConfig) -> DiagResult<SpectralWindow> {
    match dms.window {
        Some(spec) => SpectralWindow::try_from(spec),
        None => setting(&dms.spectrometer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synth_types::config::WindowSpec;

    #[test]
    fn test_catalogue() {
        let alpha = setting("balmer_alpha").unwrap();
        assert_eq!(alpha.bins(), 512);
        assert!(alpha.contains(656.1));
        assert!(setting("balmer_beta").unwrap().contains(486.1));
        assert!(matches!(setting("lyman"), Err(DiagError::ConfigError(_))));
    }

    #[test]
    fn test_inline_window_wins() {
        let dms = DmsConfig {
            window: Some(WindowSpec {
                bins: 8,
                lower: 655.0,
                upper: 657.0,
            }),
            spectrometer: "nonexistent".into(),
            ..DmsConfig::default()
        };
        let w = load_spectrometer(&dms).unwrap();
        assert_eq!(w.bins(), 8);

        let bad = DmsConfig {
            window: Some(WindowSpec {
                bins: 0,
                lower: 655.0,
                upper: 657.0,
            }),
            ..DmsConfig::default()
        };
        assert!(load_spectrometer(&bad).is_err());
    }
}
