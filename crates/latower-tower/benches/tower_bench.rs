//! Tower assembly benchmarks
//!
//! Run with: cargo bench -p latower-tower

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use latower_settings::TowerConfig;
use latower_tower::{LayerRemapper, MaterialProfile, SweepPlan, TemplateLayer, TowerAssembler};
use rust_decimal::Decimal;

fn template_lines() -> Vec<String> {
    let mut e = Decimal::new(100, 1);
    let mut lines = vec![";TYPE:WALL-OUTER".to_string()];
    for i in 0..40 {
        e += Decimal::new(15, 2);
        lines.push(format!("G1 X{} Y{} E{}", 20 + i % 20, 20 + i / 2, e));
    }
    lines
}

fn bench_sweep(c: &mut Criterion) {
    let plan = SweepPlan::from_config(&TowerConfig::default());
    c.bench_function("sweep_100_layers", |b| {
        b.iter(|| black_box(plan.layers().count()))
    });
}

fn bench_remap(c: &mut Criterion) {
    let template = TemplateLayer::parse(template_lines()).unwrap();
    let remapper = LayerRemapper::new(template, Decimal::new(100, 1), 5);
    c.bench_function("remap_100_layers", |b| {
        b.iter(|| black_box(remapper.remap_layers(Decimal::new(100, 1), 100).unwrap()))
    });
}

fn bench_assemble(c: &mut Criterion) {
    let data = tempfile::TempDir::new().unwrap();
    let dir = data.path().join("PLA");
    std::fs::create_dir_all(&dir).unwrap();
    for name in [
        "prep", "start", "before_raft", "before_meshes", "after_meshes", "end", "post",
    ] {
        std::fs::write(dir.join(format!("{name}.gcode")), "G0 X0 Y0\n").unwrap();
    }
    std::fs::write(dir.join("raft.gcode"), "G1 X10 Y10 E10.0\n").unwrap();
    std::fs::write(dir.join("square.gcode"), template_lines().join("\n")).unwrap();

    let config = TowerConfig {
        data_dir: data.path().to_path_buf(),
        ..TowerConfig::default()
    };
    let assembler = TowerAssembler::new(config).unwrap();
    let profile = MaterialProfile::locate(assembler.config()).unwrap();

    c.bench_function("assemble_default_tower", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(1 << 20);
            black_box(assembler.assemble(&profile, &mut out).unwrap())
        })
    });
}

criterion_group!(benches, bench_sweep, bench_remap, bench_assemble);
criterion_main!(benches);
