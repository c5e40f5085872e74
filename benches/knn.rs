use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use vantage::generator::{generate, WorldPreset};
use vantage::{person_distance, BuildOptions, NaiveKnn, Person, VpTree};

fn population(n: usize) -> Vec<Person> {
    let mut people = generate(&WorldPreset::Small.world(), 0).unwrap();
    people.truncate(n);
    people
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &n in &[1_000, 10_000, 100_000] {
        let people = population(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &people, |b, people| {
            b.iter(|| VpTree::with_options(people.clone(), person_distance, &BuildOptions::seeded(1)))
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let people = population(100_000);
    let queries = generate(&WorldPreset::Test.world(), 1).unwrap();
    let tree = VpTree::with_options(people.clone(), person_distance, &BuildOptions::seeded(1));
    let naive = NaiveKnn::new(people, person_distance);

    let mut group = c.benchmark_group("search");
    for &k in &[1, 10, 100] {
        group.bench_with_input(BenchmarkId::new("vptree", k), &k, |b, &k| {
            let mut i = 0;
            b.iter(|| {
                i = (i + 1) % queries.len();
                black_box(tree.search(&queries[i], k).len())
            })
        });
    }
    group.bench_function("naive/10", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % queries.len();
            black_box(naive.search(&queries[i], 10).len())
        })
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_search);
criterion_main!(benches);
