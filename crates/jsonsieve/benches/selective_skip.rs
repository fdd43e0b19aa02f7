//! Benchmark – selective decoding versus a full `serde_json` parse
#![allow(missing_docs)]

use std::{fmt::Write, time::Duration};

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use jsonsieve::{EACH, Lexer, path};

/// A deterministic document with `records` bulky entries under `"records"`
/// and a small `"summary"` object at the end, which is all the selective
/// benchmarks read.
fn make_document(records: usize) -> String {
    let mut s = String::from("{\"records\":[");
    for i in 0..records {
        if i > 0 {
            s.push(',');
        }
        write!(
            s,
            r#"{{"id":{i},"name":"record-{i}","tags":["a","b","c"],"nested":{{"depth":[[{i}],[{{"x":null}}]],"flag":true}},"score":{i}.5}}"#
        )
        .unwrap();
    }
    s.push_str(r#"],"summary":{"count":"#);
    write!(s, "{records}").unwrap();
    s.push_str(r#","label":"bench"}}"#);
    s
}

fn selective_summary(doc: &[u8]) -> u64 {
    let mut count = 0u64;
    let mut lexer = Lexer::from_slice(doc);
    let mut session = lexer.session();
    session
        .bind_variable(path!["summary", "count"], &mut count)
        .unwrap();
    session.run().unwrap();
    count
}

fn selective_ids(doc: &[u8]) -> u64 {
    let mut sum = 0u64;
    let mut lexer = Lexer::from_slice(doc);
    let mut session = lexer.session();
    session
        .bind_callback(path!["records", EACH, "id"], |id| {
            sum += id.decode::<u64>()?;
            Ok(())
        })
        .unwrap();
    session.run().unwrap();
    sum
}

fn serde_summary(doc: &[u8]) -> u64 {
    let value: serde_json::Value = serde_json::from_slice(doc).unwrap();
    value["summary"]["count"].as_u64().unwrap()
}

fn bench_selective_skip(c: &mut Criterion) {
    let mut group = c.benchmark_group("selective_skip");

    for &records in &[100usize, 1_000, 10_000] {
        let doc = make_document(records);
        group.throughput(Throughput::Bytes(doc.len() as u64));

        group.bench_with_input(BenchmarkId::new("jsonsieve_summary", records), &doc, |b, doc| {
            b.iter(|| black_box(selective_summary(black_box(doc.as_bytes()))));
        });
        group.bench_with_input(BenchmarkId::new("jsonsieve_ids", records), &doc, |b, doc| {
            b.iter(|| black_box(selective_ids(black_box(doc.as_bytes()))));
        });
        group.bench_with_input(BenchmarkId::new("serde_json_value", records), &doc, |b, doc| {
            b.iter(|| black_box(serde_summary(black_box(doc.as_bytes()))));
        });
    }
    group.finish();
}

fn criterion() -> Criterion {
    let mut c = Criterion::default();
    if cfg!(feature = "bench-fast") {
        c = c
            .warm_up_time(Duration::from_millis(10))
            .measurement_time(Duration::from_millis(100))
            .sample_size(10);
    } else {
        c = c
            .warm_up_time(Duration::from_secs(3))
            .measurement_time(Duration::from_secs(5));
    }
    c
}

criterion_group! { name = benches; config = criterion(); targets = bench_selective_skip }
criterion_main!(benches);
