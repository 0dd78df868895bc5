use std::time::{Duration, Instant};

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use scout_terminal::api::{parse_compare_json, parse_similar_json};
use scout_terminal::radar::{ChartController, ComparisonSeries, hit_test};
use scout_terminal::report::render_report;
use scout_terminal::state::RadarVector;

use ratatui::layout::Rect;

fn wide_radar(seed: usize) -> RadarVector {
    let labels: Vec<String> = (0..12).map(|i| format!("F{i}")).collect();
    let values = (0..12)
        .map(|i| Some(((seed * 7 + i * 13) % 100) as f64 / 100.0))
        .collect();
    RadarVector { labels, values }
}

fn sample_series(count: usize) -> Vec<ComparisonSeries> {
    (0..count)
        .map(|i| ComparisonSeries {
            id: Some(i.to_string()),
            name: format!("Player {i}"),
            radar: wide_radar(i + 1),
        })
        .collect()
}

fn bench_similar_parse(c: &mut Criterion) {
    c.bench_function("similar_parse", |b| {
        b.iter(|| {
            let reply = parse_similar_json(black_box(SIMILAR_JSON)).unwrap();
            black_box(reply.is_ok());
        })
    });
}

fn bench_compare_parse(c: &mut Criterion) {
    c.bench_function("compare_parse", |b| {
        b.iter(|| {
            let reply = parse_compare_json(black_box(COMPARE_JSON)).unwrap();
            black_box(reply.is_ok());
        })
    });
}

fn bench_chart_build(c: &mut Criterion) {
    let input = wide_radar(0);
    let series = sample_series(10);
    let now = Instant::now();
    c.bench_function("chart_build_10", |b| {
        b.iter(|| {
            let mut chart = ChartController::default();
            chart.build(black_box(&input), "Input", black_box(&series), now);
            black_box(chart.dataset_map().len());
        })
    });
}

fn bench_pulsate_frame(c: &mut Criterion) {
    let now = Instant::now();
    let mut chart = ChartController::default();
    chart.build(&wide_radar(0), "Input", &sample_series(10), now);
    chart.start_pulsate("3", now);
    let mut tick = 0u64;
    c.bench_function("pulsate_frame", |b| {
        b.iter(|| {
            tick += 1;
            chart.run_frame(now + Duration::from_millis(tick * 16));
            black_box(chart.frames().is_pending());
        })
    });
}

fn bench_hit_test(c: &mut Criterion) {
    let now = Instant::now();
    let mut chart = ChartController::default();
    chart.build(&wide_radar(0), "Input", &sample_series(10), now);
    let area = Rect::new(0, 0, 60, 24);
    c.bench_function("chart_hit_test", |b| {
        b.iter(|| {
            let rendered = chart.chart().unwrap();
            black_box(hit_test(rendered, area, black_box(30), black_box(4)));
        })
    });
}

fn bench_report_render(c: &mut Criterion) {
    c.bench_function("report_render", |b| {
        b.iter(|| black_box(render_report(black_box(REPORT_MD))))
    });
}

criterion_group!(
    perf,
    bench_similar_parse,
    bench_compare_parse,
    bench_chart_build,
    bench_pulsate_frame,
    bench_hit_test,
    bench_report_render
);
criterion_main!(perf);

static SIMILAR_JSON: &str = include_str!("../tests/fixtures/similar_players.json");
static COMPARE_JSON: &str = include_str!("../tests/fixtures/compare_players.json");
static REPORT_MD: &str = "## Verdict\n\n**Player A** edges it on *chance creation*.\n\n- Goals: A\n- Assists: B\n\n```\nxG 0.61 vs 0.58\n```\n";
