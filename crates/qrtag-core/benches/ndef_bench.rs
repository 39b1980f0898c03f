//! Criterion benchmarks for the NDEF codec and candidate selection.
//!
//! Both run once per tag touch or once per camera frame, so they only need to
//! stay far below a frame interval (33ms at 30fps).
//!
//! Run with:
//! ```bash
//! cargo bench --package qrtag-core --bench ndef_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use qrtag_core::ndef::{
    decode_message, encode_message,
    type2::{build_data_area, records_from_data_area},
    Record,
};
use qrtag_core::{select_candidate, UriPattern};

fn bench_uri_message(c: &mut Criterion) {
    let records = [Record::uri("https://connpass.com/event/123456/")];
    let encoded = encode_message(&records).unwrap();

    c.bench_function("encode_uri_message", |b| {
        b.iter(|| encode_message(black_box(&records)).unwrap())
    });
    c.bench_function("decode_uri_message", |b| {
        b.iter(|| decode_message(black_box(&encoded)).unwrap())
    });
}

fn bench_data_area(c: &mut Criterion) {
    let blank = vec![0u8; 144];
    let records = [Record::uri("https://connpass.com/event/123456/")];
    let area = build_data_area(&blank, &records, 144).unwrap();

    c.bench_function("build_ntag213_area", |b| {
        b.iter(|| build_data_area(black_box(&blank), black_box(&records), 144).unwrap())
    });
    c.bench_function("read_ntag213_area", |b| {
        b.iter(|| records_from_data_area(black_box(&area)).unwrap())
    });
}

fn bench_select_candidate(c: &mut Criterion) {
    let pattern = UriPattern::new(r"^https://connpass\.com/.*").unwrap();
    let decoded = vec![
        String::new(),
        "https://example.com".to_string(),
        "https://connpass.com/event/1".to_string(),
    ];

    c.bench_function("select_candidate_with_pattern", |b| {
        b.iter(|| select_candidate(black_box(&decoded), Some(&pattern)))
    });
}

criterion_group!(benches, bench_uri_message, bench_data_area, bench_select_candidate);
criterion_main!(benches);
