//! Criterion benchmarks for [`merge_deep`] on realistic configuration trees.
//!
//! Every load merges one stored copy onto a fresh baseline clone, so the
//! measured cost is clone + merge.
//!
//! Run with:
//! ```bash
//! cargo bench --package sitecfg-core --bench merge_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};
use sitecfg_core::{baseline, fresh_baseline, merge_deep};

/// Builds an overlay that replaces `n` project items and edits a few scalars.
fn overlay_with_n_projects(n: usize) -> Value {
    let items: Vec<Value> = (0..n)
        .map(|i| {
            json!({
                "title": format!("Projeto {i}"),
                "text": "Texto",
                "images": [{ "src": format!("assets/img/p{i:02}.jpg"), "alt": "", "recommended": { "width": 1600, "height": 1000 } }]
            })
        })
        .collect();
    json!({
        "hero": { "title": "Benchmark" },
        "projects": { "items": items },
        "contact": { "phone": "(11) 0000-0000" }
    })
}

fn bench_clone_baseline(c: &mut Criterion) {
    c.bench_function("fresh_baseline", |b| b.iter(|| black_box(fresh_baseline())));
}

fn bench_merge_onto_baseline(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_onto_baseline");
    for n in [0usize, 4, 32, 256] {
        let overlay = overlay_with_n_projects(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &overlay, |b, overlay| {
            b.iter(|| {
                let mut base = fresh_baseline();
                merge_deep(&mut base, black_box(overlay));
                black_box(base)
            })
        });
    }
    group.finish();
}

fn bench_merge_full_copy(c: &mut Criterion) {
    // A stored copy that is the full baseline: the common case after a save.
    let full = baseline().clone();
    c.bench_function("merge_full_copy", |b| {
        b.iter(|| {
            let mut base = fresh_baseline();
            merge_deep(&mut base, black_box(&full));
            black_box(base)
        })
    });
}

criterion_group!(
    benches,
    bench_clone_baseline,
    bench_merge_onto_baseline,
    bench_merge_full_copy
);
criterion_main!(benches);
