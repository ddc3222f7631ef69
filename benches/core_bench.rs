//! Benchmarks for stackform core operations.
//!
//! Run with: cargo bench
//!
//! Results include 95% confidence intervals via Criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stackform::core::{graph, parser};
use stackform::Stack;

/// A linear chain: `R0000 <- R0001 <- ... <- R{n-1}`, declared last-first so
/// every resolution recurses to the bottom of the chain.
fn chain_template(n: usize) -> String {
    let mut resources = Vec::with_capacity(n);
    for i in (0..n).rev() {
        let value = if i == 0 {
            r#""base""#.to_string()
        } else {
            format!(r#"{{"Fn::Join":["/",[{{"Ref":"R{:04}"}},"{}"]]}}"#, i - 1, i)
        };
        resources.push(format!(
            r#""R{:04}":{{"Type":"Local::Value","Properties":{{"Value":{}}}}}"#,
            i, value
        ));
    }
    format!(
        r#"{{"Resources":{{{}}},"Outputs":{{"tip":{{"Ref":"R{:04}"}}}}}}"#,
        resources.join(","),
        n - 1
    )
}

fn bench_parse_template(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_template_json");
    for n in [10, 100] {
        let json = chain_template(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &json, |b, json| {
            b.iter(|| {
                let template = parser::parse_template_json(black_box(json)).unwrap();
                black_box(template);
            });
        });
    }
    group.finish();
}

fn bench_build_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_chain");
    for n in [10, 50, 100] {
        let template = parser::parse_template_json(&chain_template(n)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &template, |b, template| {
            b.iter(|| {
                let mut stack = Stack::with_builtins();
                stack.build(black_box(template)).unwrap();
                black_box(stack.output::<String>("tip"));
            });
        });
    }
    group.finish();
}

fn no_inputs(_: &str) -> bool {
    false
}

fn bench_creation_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("creation_order");
    for n in [10, 50, 100] {
        let template = parser::parse_template_json(&chain_template(n)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &template, |b, template| {
            b.iter(|| {
                let order = graph::creation_order(black_box(template), &no_inputs).unwrap();
                black_box(order);
            });
        });
    }
    group.finish();
}

fn bench_blake3_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("fn_hash");
    for size in [64, 1024, 4096] {
        let input: String = "x".repeat(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| {
                let hash = stackform::functions::encode::hash_string(black_box(input));
                black_box(hash);
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_parse_template,
    bench_build_chain,
    bench_creation_order,
    bench_blake3_hash
);
criterion_main!(benches);
