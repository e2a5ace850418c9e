//! Search compilation benchmarks.
//!
//! Compilation runs once per user query, so these mostly guard against
//! accidental quadratic behaviour in the lexer or combinator.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use spanq_lib::core::TableConfig;
use spanq_lib::query::{tokenize, SearchCompiler};
use spanq_lib::sql::{escape_string, Flavor, SelectBuilder};
use std::time::Duration;

const QUERIES: [(&str, &str); 4] = [
    ("keyed", "span_name:gorm.Query"),
    ("bare", "asdf fdsa"),
    ("attributes", "http.url=attribute1 http.custom=attribute2 custom=attribute3"),
    (
        "complex",
        "span_name=\"Chris Schmitz\" duration>1us level:info source=(backend OR frontend) \
         OR (service_name!=private-graph span_name=gorm.Query span_name!=(testing OR testing2)) \
         AND (\"body query\" asdf)",
    ),
];

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");

    for (name, query) in QUERIES {
        group.bench_with_input(BenchmarkId::from_parameter(name), query, |b, query| {
            b.iter(|| black_box(tokenize(black_box(query)).unwrap()));
        });
    }

    group.finish();
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");
    let table = TableConfig::traces();
    let compiler = SearchCompiler::new(&table);

    for (name, query) in QUERIES {
        group.bench_with_input(BenchmarkId::from_parameter(name), query, |b, query| {
            b.iter(|| black_box(compiler.compile(black_box(query)).unwrap()));
        });
    }

    group.finish();
}

/// Long flat queries: cost should grow linearly with term count
fn bench_term_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("term_count");
    let table = TableConfig::traces();
    let compiler = SearchCompiler::new(&table);

    for terms in [10usize, 100, 1000] {
        let query = (0..terms)
            .map(|i| format!("custom{}=value{}", i, i))
            .collect::<Vec<_>>()
            .join(" OR ");

        group.bench_with_input(BenchmarkId::from_parameter(terms), &query, |b, query| {
            b.iter(|| black_box(compiler.compile(black_box(query)).unwrap()));
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let table = TableConfig::traces();
    let compiler = SearchCompiler::new(&table);
    let (_, complex) = QUERIES[3];

    group.bench_function("select_with_complex_where", |b| {
        b.iter(|| {
            let mut sb = SelectBuilder::new().select(&["*"]).from("t");
            compiler.assign(&mut sb, black_box(complex)).unwrap();
            black_box(sb.build_with_flavor(Flavor::ClickHouse).unwrap());
        });
    });

    group.bench_function("escape_string", |b| {
        let value = "it's a \\ tricky\n'value'\t".repeat(8);
        b.iter(|| black_box(escape_string(black_box(&value))));
    });

    group.finish();
}

criterion_group! {
    name = compile;
    config = Criterion::default()
        .significance_level(0.01)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(2));
    targets = bench_tokenize,
              bench_compile,
              bench_term_count,
              bench_render
}

criterion_main!(compile);
