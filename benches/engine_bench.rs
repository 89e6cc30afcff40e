#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rulog::{EngineConfig, KnowledgeBase};

fn chain(length: usize, config: EngineConfig) -> KnowledgeBase {
    let mut kb = KnowledgeBase::with_config(config);
    for i in 0..length {
        let from = format!("node_{i}");
        let to = format!("node_{}", i + 1);
        kb.insert(kb.atom("edge", [from.as_str(), to.as_str()]));
    }
    kb
}

/// Benchmark for inserting facts
fn bench_insert_facts(c: &mut Criterion) {
    c.bench_function("insert_facts", |b| {
        b.iter(|| black_box(chain(black_box(1000), EngineConfig::default())));
    });
}

/// Benchmark for deriving the domain from stored facts
fn bench_domain(c: &mut Criterion) {
    let kb = chain(1000, EngineConfig::default());
    c.bench_function("domain", |b| {
        b.iter(|| black_box(kb.domain()));
    });
}

/// Benchmark for matching a fact with one and two free variables
fn bench_match_fact(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_fact");
    for length in [10, 20, 40] {
        let kb = chain(length, EngineConfig::atoms_only());
        let one = kb.fact("edge", ["node_0", "_to"]);
        let two = kb.fact("edge", ["_from", "_to"]);

        group.bench_with_input(BenchmarkId::new("one_variable", length), &kb, |b, kb| {
            b.iter(|| black_box(kb.match_fact(&one, false)));
        });
        group.bench_with_input(BenchmarkId::new("two_variables", length), &kb, |b, kb| {
            b.iter(|| black_box(kb.match_fact(&two, false)));
        });
        group.bench_with_input(BenchmarkId::new("negated", length), &kb, |b, kb| {
            b.iter(|| black_box(kb.match_fact(&two, true)));
        });
    }
    group.finish();
}

/// Benchmark for enumerating candidate argument lists
fn bench_bindable_objects(c: &mut Criterion) {
    let kb = chain(40, EngineConfig::default());
    let slots = [kb.term("_x"), kb.term("node_3"), kb.term("_y")];
    c.bench_function("match_bindable_objects", |b| {
        b.iter(|| black_box(kb.match_bindable_objects(&slots)));
    });
}

criterion_group!(
    benches,
    bench_insert_facts,
    bench_domain,
    bench_match_fact,
    bench_bindable_objects
);
criterion_main!(benches);
