use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mado::models::{FilterCriteria, Position, Preset, Rule, Size, Window};
use mado::{filter_windows, resolve};
use std::num::NonZeroU32;

const APPS: [&str; 8] = [
    "Code", "Terminal", "Safari", "Finder", "Slack", "Mail", "Notes", "Music",
];

fn inventory(size: usize) -> Vec<Window> {
    (0..size)
        .map(|i| {
            let app = APPS[i % APPS.len()];
            let screen = (i % 2) as u32 + 1;
            Window::new(app, format!("{app} {i}"), 100 + i as u32, screen, format!("Display {screen}"))
                .on_desktop((i % 4) as u32)
        })
        .collect()
}

fn benchmark_filter_windows(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_windows");
    let criteria = FilterCriteria::new()
        .with_ignore_apps(["finder", "music"])
        .with_screen("display 2")
        .with_desktop(NonZeroU32::new(2).unwrap());

    for size in [50, 500, 5000] {
        let windows = inventory(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &windows, |b, windows| {
            b.iter(|| filter_windows(black_box(windows), black_box(&criteria)))
        });
    }
    group.finish();
}

fn benchmark_resolve(c: &mut Criterion) {
    let preset = Preset::new(
        "bench",
        APPS.iter()
            .enumerate()
            .map(|(i, app)| Rule::new(*app, Position::new(i as i32 * 100, 0), Size::new(800, 600)))
            .collect(),
    );
    let windows = inventory(500);

    c.bench_function("resolve_preset_500_windows", |b| {
        b.iter(|| resolve(black_box(&preset), black_box(&windows)))
    });
}

criterion_group!(benches, benchmark_filter_windows, benchmark_resolve);
criterion_main!(benches);
