use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use infographic_renderer::config::Config;
use infographic_renderer::data::{Data, ItemDatum};
use infographic_renderer::layout::force::{Forces, initial_positions, simulate, star_links};
use infographic_renderer::layout::tree::{TreeOptions, build_hierarchy, layout_tree};
use infographic_renderer::render::{InfographicOptions, to_svg_with};
use infographic_renderer::text_metrics::FontMetrics;
use infographic_renderer::{compose, render_infographic};
use std::hint::black_box;

fn flat_items(count: usize) -> Data {
    Data {
        title: Some("Benchmark".to_string()),
        desc: Some("Generated dataset".to_string()),
        items: (0..count)
            .map(|i| {
                let mut datum = ItemDatum::labeled(&format!("Item {i}"));
                datum.desc = Some(format!("Description for item number {i}"));
                datum.icon = Some(format!("icon:{i}"));
                datum
            })
            .collect(),
        ..Data::default()
    }
}

fn nested_items(depth: usize, fanout: usize) -> Data {
    fn node(level: usize, depth: usize, fanout: usize) -> ItemDatum {
        let mut datum = ItemDatum::labeled(&format!("L{level}"));
        if level < depth {
            datum.children = (0..fanout).map(|_| node(level + 1, depth, fanout)).collect();
        }
        datum
    }
    Data {
        items: vec![node(0, depth, fanout)],
        ..Data::default()
    }
}

fn options(data: Data) -> InfographicOptions {
    InfographicOptions::new(data, Config::default())
}

fn bench_compose(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose");
    let measure = FontMetrics { fast: true };
    for structure in ["list-row", "list-grid", "sequence-steps", "relation-circle"] {
        let opts = options(flat_items(12));
        group.bench_with_input(BenchmarkId::from_parameter(structure), &opts, |b, opts| {
            b.iter(|| {
                let template = compose(black_box(structure), "simple", opts, &measure).expect("compose failed");
                black_box(template.root.children.len());
            });
        });
    }
    group.finish();
}

fn bench_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree");
    for (depth, fanout) in [(3, 3), (4, 4), (5, 3)] {
        let data = nested_items(depth, fanout);
        let Some(root) = build_hierarchy(&data.items) else {
            continue;
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{depth}x{fanout}")),
            &root,
            |b, root| {
                b.iter(|| {
                    let tree = layout_tree(black_box(root), &TreeOptions::default());
                    black_box(tree.nodes.len());
                });
            },
        );
    }
    group.finish();
}

fn bench_force(c: &mut Criterion) {
    let mut group = c.benchmark_group("force");
    for count in [8usize, 32, 64] {
        let nodes = initial_positions(count);
        let links = star_links(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &nodes, |b, nodes| {
            b.iter(|| {
                let positions = simulate(black_box(nodes), &links, &Forces::network(120.0, 60.0), 300);
                black_box(positions.len());
            });
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let measure = FontMetrics { fast: true };
    for (structure, data) in [
        ("list-column", flat_items(10)),
        ("hierarchy-tree", nested_items(3, 3)),
        ("relation-network", flat_items(8)),
    ] {
        let opts = options(data);
        group.bench_with_input(BenchmarkId::from_parameter(structure), &opts, |b, opts| {
            b.iter(|| {
                let document =
                    render_infographic(black_box(structure), "icon-badge", opts, &measure).expect("render failed");
                let svg = to_svg_with(&document, &measure);
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_compose, bench_tree, bench_force, bench_end_to_end
);
criterion_main!(benches);
