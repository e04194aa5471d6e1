// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! WHERE-clause analysis benchmarks
//!
//! Run with: cargo bench --bench analyze_where
//!
//! Measures parsing plus extraction for typical predicates, and the
//! per-execution cost of resolving a runtime interval model.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use where_intrinsics::{
    parse_predicate, BoundParams, DataType, Schema, SchemaBuilder, WhereClauseAnalyzer,
};

const PREDICATES: &[(&str, &str)] = &[
    ("key+interval+filter", "sym in ('A', 'B', 'C') and timestamp in '2015-02-23' and bid > 100"),
    (
        "repeated shorthand",
        "timestamp in '2015-02-23T10:00;30m;1d;365' and timestamp != '2015-06-01T10:10'",
    ),
    (
        "not between chain",
        "timestamp in '2015-05-11' \
         and not (timestamp between '2015-05-11T15:00:00.000Z' and '2015-05-11T20:00:00.000Z') \
         and not (timestamp between '2015-05-11T12:00:00.000Z' and '2015-05-11T14:00:00.000Z')",
    ),
    (
        "or of keys",
        "(sym = 'A' or sym = 'B' or sym = 'C') and ex != 'X' and ask < bid",
    ),
];

fn schema() -> Schema {
    SchemaBuilder::new("quotes")
        .add("bid", DataType::Float)
        .add("ask", DataType::Float)
        .add_indexed_symbol("sym")
        .add_indexed_symbol("ex")
        .add_designated_timestamp("timestamp")
        .build()
}

fn bench_parse_and_extract(c: &mut Criterion) {
    let schema = schema();
    let analyzer = WhereClauseAnalyzer::for_table(&schema);
    let mut group = c.benchmark_group("Parse + extract");

    for (name, sql) in PREDICATES {
        group.bench_function(*name, |b| {
            b.iter(|| {
                let predicate = parse_predicate(black_box(sql)).unwrap();
                black_box(analyzer.extract_predicate(&predicate, None).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_extract_only(c: &mut Criterion) {
    let schema = schema();
    let analyzer = WhereClauseAnalyzer::for_table(&schema);
    let mut group = c.benchmark_group("Extract (pre-parsed)");

    for (name, sql) in PREDICATES {
        let predicate = parse_predicate(sql).unwrap();
        group.bench_function(*name, |b| {
            b.iter(|| black_box(analyzer.extract_predicate(black_box(&predicate), None).unwrap()));
        });
    }

    group.finish();
}

fn bench_runtime_evaluate(c: &mut Criterion) {
    let schema = schema();
    let predicate = parse_predicate(
        "timestamp in '2015-02;1h;1d;28' and timestamp >= $1 and timestamp < dateadd('d', 7, now())",
    )
    .unwrap();
    let model = WhereClauseAnalyzer::for_table(&schema)
        .extract_predicate(&predicate, None)
        .unwrap()
        .build_interval_model();
    let binds = BoundParams::new(("2015-02-10",));
    let now = 1_423_440_000_000_000; // 2015-02-09T00:00:00Z

    c.bench_function("Runtime interval evaluate", |b| {
        b.iter(|| black_box(model.evaluate(black_box(&binds), black_box(now))));
    });
}

criterion_group!(
    benches,
    bench_parse_and_extract,
    bench_extract_only,
    bench_runtime_evaluate
);
criterion_main!(benches);
