//! Benchmark – `peekstream::StreamParser`
#![allow(missing_docs)]

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use peekstream::{Decoded, ParserOptions, StreamParser};

/// A deterministic mix of ASCII, whitespace, newlines and multi-byte
/// characters, exactly `target_len` bytes long.
fn make_payload(target_len: usize) -> Vec<u8> {
    const PATTERN: &str = "{\"key\": \"value κόσμε\", \"n\": [1, 2, 3]}\n";
    let mut out = Vec::with_capacity(target_len + PATTERN.len());
    while out.len() < target_len {
        out.extend_from_slice(PATTERN.as_bytes());
    }
    out.truncate(target_len);
    out
}

fn consume_bytes(payload: &[u8], lookahead: usize) -> usize {
    let mut parser = StreamParser::with_options(
        None,
        payload,
        ParserOptions {
            lookahead,
            ..Default::default()
        },
    );
    let mut count = 0usize;
    while let Some(byte) = parser.consume().unwrap() {
        count += usize::from(byte);
    }
    count
}

fn consume_chars(payload: &[u8], lookahead: usize) -> usize {
    let mut parser = StreamParser::with_options(
        None,
        payload,
        ParserOptions {
            lookahead,
            ..Default::default()
        },
    );
    let mut count = 0usize;
    loop {
        match parser.consume_char().unwrap() {
            Decoded::EndOfStream => break,
            _ => count += 1,
        }
    }
    count
}

/// Peek-heavy scanning in the style of a tokenizer: skip whitespace, try a few
/// punctuation needles, otherwise take one character.
fn tokenize(payload: &[u8], lookahead: usize) -> usize {
    let mut parser = StreamParser::with_options(
        None,
        payload,
        ParserOptions {
            lookahead,
            ..Default::default()
        },
    );
    let mut tokens = 0usize;
    loop {
        parser.consume_whitespace().unwrap();
        if parser.peek(0).unwrap().is_none() {
            break;
        }
        if parser.peek_and_consume(b"\": ").unwrap() || parser.peek_and_consume(b", ").unwrap() {
            tokens += 1;
            continue;
        }
        parser.consume_char().unwrap();
    }
    tokens
}

fn bench_stream_parser(c: &mut Criterion) {
    let payload = make_payload(100_000);

    let mut group = c.benchmark_group("stream_parser");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    for &lookahead in &[64usize, 4096] {
        group.bench_with_input(BenchmarkId::new("bytes", lookahead), &lookahead, |b, &l| {
            b.iter(|| black_box(consume_bytes(black_box(&payload), l)));
        });
        group.bench_with_input(BenchmarkId::new("chars", lookahead), &lookahead, |b, &l| {
            b.iter(|| black_box(consume_chars(black_box(&payload), l)));
        });
        group.bench_with_input(BenchmarkId::new("tokens", lookahead), &lookahead, |b, &l| {
            b.iter(|| black_box(tokenize(black_box(&payload), l)));
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

criterion_group! { name = benches; config = criterion(); targets = bench_stream_parser }
criterion_main!(benches);
