// ─────────────────────────────────────────────────────────────────────
// SCPN Synthetic Diagnostics — Line-of-Sight Benchmark
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

use criterion::{criterion_group, criterion_main, Criterion};
use synth_diagnostics::engine::{sample, DmsSettings};
use synth_diagnostics::fibres::{FibreBundle, FibreChoice};
use synth_diagnostics::machine::{Machine, VesselScene};
use synth_diagnostics::sampler::LineIntegralSampler;
use synth_plasma::builder::build_emission;
use synth_plasma::loader::load_plasma;
use synth_plasma::plasma::Plasma;
use synth_types::config::{FanSpec, PlasmaConfig};
use synth_types::geometry::{Point3, Vec3};
use synth_types::spectrum::SpectralWindow;

fn balmer_alpha_plasma() -> Plasma {
    let config: PlasmaConfig = serde_json::from_str(
        r#"{
            "edge": {"present": true, "type": "analytic"},
            "emission_instructions": [
                {"species": "deuterium", "ionisation": 0, "upper": 3, "lower": 2,
                 "type": "ExcitationLine", "stark": true}
            ]
        }"#,
    )
    .unwrap();
    let mut plasma = load_plasma(&config.edge).unwrap();
    build_emission(&config, &mut plasma, None).unwrap();
    plasma
}

fn bundle(count: usize) -> FibreBundle {
    let spec = FanSpec {
        origin: Point3::new(1.9, 0.0, -1.6),
        first_target: Point3::new(0.6, 0.0, -2.0),
        last_target: Point3::new(1.7, 0.0, -2.0),
        count,
    };
    FibreBundle::fan("bench", &spec, Vec3::new(0.0, 0.0, 1.0)).unwrap()
}

fn settings(power: bool, los: bool) -> DmsSettings {
    DmsSettings {
        choice: FibreChoice::All,
        power,
        radiance: false,
        te_los: los,
        ne_los: los,
        ni_los: los,
        impurity: None,
        los_steps: 100,
        acceptance_angle: 1.0,
        radius: 0.001,
        pixel_samples: 5,
        spectral_rays: 1,
    }
}

/// LOS profiles only, 20 fibres × 100 steps.
fn bench_los_profiles_20(c: &mut Criterion) {
    let plasma = balmer_alpha_plasma();
    let scene = VesselScene::for_machine(Machine::MastU);
    let fibres = bundle(20);
    let window = SpectralWindow::new(512, 650.0, 662.0).unwrap();
    let sampler = LineIntegralSampler::new(0.01, 0).unwrap();
    let s = settings(false, true);
    c.bench_function("bench_los_profiles_20", |b| {
        b.iter(|| {
            std::hint::black_box(sample(&s, &scene, &plasma, &window, &fibres, &sampler).unwrap())
        });
    });
}

/// Power pipeline, 4 fibres, 5 samples per fibre, 64 bins.
fn bench_power_4(c: &mut Criterion) {
    let plasma = balmer_alpha_plasma();
    let scene = VesselScene::for_machine(Machine::MastU);
    let fibres = bundle(4);
    let window = SpectralWindow::new(64, 655.0, 657.5).unwrap();
    let sampler = LineIntegralSampler::new(0.02, 0).unwrap();
    let s = settings(true, false);
    c.bench_function("bench_power_4", |b| {
        b.iter(|| {
            std::hint::black_box(sample(&s, &scene, &plasma, &window, &fibres, &sampler).unwrap())
        });
    });
}

criterion_group!(benches, bench_los_profiles_20, bench_power_4);
criterion_main!(benches);
