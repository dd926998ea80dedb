use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use workflow_viz::config::{LayoutConfig, RenderConfig, ViewportConfig};
use workflow_viz::contract::build_scene;
use workflow_viz::interaction::InteractionState;
use workflow_viz::layout::compute_layout;
use workflow_viz::render::render_svg;
use workflow_viz::theme::Theme;
use workflow_viz::workflow::parse_workflow;

/// A chain of `modules` with `extra` skip connections and a feedback edge
/// every `feedback_every` modules.
fn workflow_source(modules: usize, extra: usize, feedback_every: usize) -> String {
    let mut module_entries = Vec::with_capacity(modules);
    for i in 0..modules {
        module_entries.push(format!(r#"{{"id": "m{i}", "ref": "modules/step_{i}.json"}}"#));
    }

    let mut connections = Vec::new();
    let mut connect = |from: usize, to: usize| {
        connections.push(format!(
            r#"{{"from": {{"module": "m{from}", "output": "out"}}, "to": {{"module": "m{to}", "input": "in"}}}}"#
        ));
    };
    for i in 0..modules.saturating_sub(1) {
        connect(i, i + 1);
    }
    let mut count = 0usize;
    'outer: for i in 0..modules {
        for j in (i + 2)..modules {
            if count >= extra {
                break 'outer;
            }
            connect(i, j);
            count += 1;
        }
    }
    if feedback_every > 0 {
        for i in (feedback_every..modules).step_by(feedback_every) {
            connect(i, i - feedback_every);
        }
    }

    format!(
        r#"{{"workflow_id": "bench", "modules": [{}], "connections": [{}]}}"#,
        module_entries.join(","),
        connections.join(",")
    )
}

const CASES: [(&str, usize, usize, usize); 5] = [
    ("chain_10", 10, 0, 0),
    ("chain_100", 100, 0, 0),
    ("dense_40", 40, 120, 0),
    ("feedback_60", 60, 30, 6),
    ("wide_200", 200, 400, 25),
];

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, modules, extra, feedback) in CASES {
        let input = workflow_source(modules, extra, feedback);
        group.bench_with_input(BenchmarkId::from_parameter(name), &input, |b, data| {
            b.iter(|| {
                let graph = parse_workflow(black_box(data)).expect("parse failed");
                black_box(graph.nodes().len());
            });
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let config = LayoutConfig::default();
    for (name, modules, extra, feedback) in CASES {
        let graph = parse_workflow(&workflow_source(modules, extra, feedback)).expect("parse failed");
        group.bench_with_input(BenchmarkId::from_parameter(name), &graph, |b, graph| {
            b.iter(|| {
                let layout = compute_layout(black_box(graph), &config);
                black_box(layout.crossings());
            });
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let theme = Theme::workflow();
    let render = RenderConfig::default();
    for (name, modules, extra, feedback) in CASES {
        let graph = parse_workflow(&workflow_source(modules, extra, feedback)).expect("parse failed");
        let layout = compute_layout(&graph, &LayoutConfig::default());
        let state = InteractionState::new(&layout, &ViewportConfig::default());
        group.bench_with_input(BenchmarkId::from_parameter(name), &layout, |b, layout| {
            b.iter(|| {
                let scene = build_scene(black_box(layout), &state);
                black_box(render_svg(&scene, &theme, &render).len());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_layout, bench_render);
criterion_main!(benches);
