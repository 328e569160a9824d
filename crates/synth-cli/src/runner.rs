// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Run Orchestration
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use anyhow::Context;
use log::info;
use std::path::Path;
use synth_diagnostics::camera::{load_camera, Camera};
use synth_diagnostics::engine::{sample, DmsSettings};
use synth_diagnostics::fibres::load_fibres;
use synth_diagnostics::machine::{load_machine, Machine, VesselScene};
use synth_diagnostics::output::{camera_group, dms_group, plasma_group, NpzResultWriter, ResultWriter};
use synth_diagnostics::profiles::sample_profiles;
use synth_diagnostics::sampler::LineIntegralSampler;
use synth_diagnostics::spectrometer::load_spectrometer;
use synth_plasma::builder::{build_emission, EmissionProfile};
use synth_plasma::loader::load_plasma;
use synth_plasma::plasma::Plasma;
use synth_types::config::SimulationConfig;
use synth_types::species;

/// Machine, plasma and emission models, plus the 2-D emission map when any
/// instruction asks for one.
fn prepare(
    cfg: &SimulationConfig,
    with_profile: bool,
) -> anyhow::Result<(VesselScene, Plasma, Option<EmissionProfile>)> {
    let scene = load_machine(&cfg.machine).context("loading machine")?;
    let mut plasma = load_plasma(&cfg.plasma.edge).context("loading plasma")?;

    let wants_profile = with_profile
        && cfg
            .plasma
            .emission_instructions
            .iter()
            .any(|i| i.profile_2d);
    let mut profile = wants_profile.then(|| EmissionProfile::from_config(&cfg.plasma.profiles));
    build_emission(&cfg.plasma, &mut plasma, profile.as_mut()).context("building emission")?;
    info!(
        "Plasma '{}' with {} emission models",
        plasma.name(),
        plasma.models().len()
    );
    Ok((scene, plasma, profile))
}

fn sampler(cfg: &SimulationConfig) -> anyhow::Result<LineIntegralSampler> {
    Ok(LineIntegralSampler::new(
        cfg.raytracing.step,
        cfg.raytracing.seed,
    )?)
}

fn observe_camera(
    cfg: &SimulationConfig,
    scene: &VesselScene,
    plasma: &Plasma,
) -> anyhow::Result<Camera> {
    let mut camera = load_camera(cfg).context("loading camera")?;
    camera
        .observe(plasma, scene, &sampler(cfg)?)
        .context("observing camera")?;
    Ok(camera)
}

/// Full run. Returns the names of the groups written.
pub fn run(cfg: &SimulationConfig, out_dir: &Path) -> anyhow::Result<Vec<String>> {
    let (scene, plasma, profile) = prepare(cfg, true)?;
    let mut writer = NpzResultWriter::new(out_dir)?;
    let mut written = Vec::new();

    let profiles = sample_profiles(&cfg.plasma, &plasma).context("sampling plasma profiles")?;
    let group = plasma_group(&profiles, profile.as_ref())?;
    writer.write_group(&group)?;
    written.push(group.name);

    if cfg.dms.simulate {
        let machine = Machine::from_name(&cfg.machine.name)?;
        let bundle = load_fibres(machine, &cfg.dms).context("loading fibres")?;
        let window = load_spectrometer(&cfg.dms).context("loading spectrometer")?;
        let settings = DmsSettings::from_config(&cfg.dms, &cfg.plasma.edge, bundle.numfibres())?;
        let result = sample(&settings, &scene, &plasma, &window, &bundle, &sampler(cfg)?)
            .context("sampling DMS")?;
        let group = dms_group(&result)?;
        writer.write_group(&group)?;
        written.push(group.name);
    }

    if cfg.observer.simulate {
        let camera = observe_camera(cfg, &scene, &plasma)?;
        let group = camera_group(&camera)?;
        writer.write_group(&group)?;
        written.push(group.name);
    }
    Ok(written)
}

/// Camera-only run.
pub fn run_camera(cfg: &SimulationConfig, out_dir: &Path) -> anyhow::Result<()> {
    let (scene, plasma, _) = prepare(cfg, false)?;
    let camera = observe_camera(cfg, &scene, &plasma)?;
    NpzResultWriter::new(out_dir)?.write_group(&camera_group(&camera)?)?;
    Ok(())
}

/// Resolve every name in the configuration without sampling.
pub fn summary(cfg: &SimulationConfig) -> anyhow::Result<Vec<String>> {
    let machine = Machine::from_name(&cfg.machine.name)?;
    let mut lines = vec![format!("machine: {machine}")];

    let edge = &cfg.plasma.edge;
    lines.push(format!(
        "plasma: {}",
        edge.kind.as_deref().unwrap_or("<unset>")
    ));
    for instruction in &cfg.plasma.emission_instructions {
        let element = species::lookup(&instruction.species)?;
        lines.push(format!(
            "  {:?} {element} {} ({} -> {})",
            instruction.kind, instruction.ionisation, instruction.upper, instruction.lower
        ));
    }
    if let Some(name) = edge.impurity_species() {
        species::lookup(name)?;
    }

    if cfg.dms.simulate {
        let bundle = load_fibres(machine, &cfg.dms)?;
        let window = load_spectrometer(&cfg.dms)?;
        DmsSettings::from_config(&cfg.dms, edge, bundle.numfibres())?;
        lines.push(format!(
            "dms: '{}' {} fibres, {} bins [{}, {}] nm",
            bundle.name(),
            bundle.numfibres(),
            window.bins(),
            window.lower(),
            window.upper()
        ));
    }
    if cfg.observer.simulate {
        let camera = load_camera(cfg)?;
        lines.push(format!(
            "camera: '{}' {}x{} pixels, {} pipelines",
            camera.id,
            camera.pixels.0,
            camera.pixels.1,
            camera.pipelines.len()
        ));
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn config_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("configs")
            .join(name)
    }

    #[test]
    fn test_summary_of_fixture() {
        let cfg = SimulationConfig::from_file(config_path("mastu_dms.json")).unwrap();
        let lines = summary(&cfg).unwrap();
        assert_eq!(lines[0], "machine: MAST-U");
        assert!(lines.iter().any(|l| l.starts_with("dms: 'lower' 20 fibres")));
    }

    #[test]
    fn test_summary_rejects_unknown_machine() {
        let mut cfg = SimulationConfig::from_file(config_path("mastu_dms.json")).unwrap();
        cfg.machine.name = "XYZ".into();
        assert!(summary(&cfg).is_err());
    }

    #[test]
    fn test_small_run_writes_groups() {
        let mut cfg = SimulationConfig::from_file(config_path("mastu_dms.json")).unwrap();
        cfg.plasma.profiles.points = 16;
        cfg.plasma.profiles.emission_bins = 8;
        cfg.dms.fibre_choice = 3;
        cfg.dms.pixel_samples = 1;
        cfg.dms.los_steps = 8;
        cfg.raytracing.step = 0.1;

        let epoch_ns = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "synthdiag_run_{}_{}",
            std::process::id(),
            epoch_ns
        ));
        let written = run(&cfg, &dir).unwrap();
        assert_eq!(written, vec!["plasma".to_string(), "DMS".to_string()]);
        assert!(dir.join("plasma.npz").exists());
        assert!(dir.join("DMS.json").exists());
        std::fs::remove_dir_all(dir).ok();
    }
}
