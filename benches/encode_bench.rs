// In: benches/encode_bench.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use feather_bridge::encoding::{encode, RawValues};
use feather_bridge::null_handling::build_validity;
use feather_bridge::types::ScalarKind;

// --- Mock Host Data ---

fn generate_doubles(size: usize) -> Vec<f64> {
    (0..size).map(|i| (i as f64).sin() * 1000.0).collect()
}

/// Every seventh row is missing.
fn generate_mask(size: usize) -> Vec<bool> {
    (0..size).map(|i| i % 7 == 0).collect()
}

fn generate_words(size: usize) -> Vec<String> {
    (0..size).map(|i| format!("word-{}", i % 997)).collect()
}

// --- Benchmark Suite ---

const BENCH_ROWS: usize = 65536;

fn bench_column_encoder(c: &mut Criterion) {
    let doubles = generate_doubles(BENCH_ROWS);
    let mask = generate_mask(BENCH_ROWS);
    let words = generate_words(BENCH_ROWS);
    let word_rows: Vec<&[u8]> = words.iter().map(|w| w.as_bytes()).collect();
    let levels = ["low", "medium", "high"];
    let codes: Vec<i32> = (0..BENCH_ROWS as i32).map(|i| i % 3).collect();

    let mut group = c.benchmark_group("Column Encoder");
    group.throughput(criterion::Throughput::Elements(BENCH_ROWS as u64));

    group.bench_function("Null mask -> validity bitmap", |b| {
        b.iter(|| build_validity(black_box(Some(mask.as_slice())), BENCH_ROWS).unwrap())
    });

    group.bench_function("Encode double (no nulls)", |b| {
        b.iter(|| {
            let validity = build_validity(None, BENCH_ROWS).unwrap();
            encode(
                ScalarKind::Float64,
                RawValues::Float64(black_box(&doubles)),
                validity,
                BENCH_ROWS,
            )
            .unwrap()
        })
    });

    group.bench_function("Encode double (with nulls)", |b| {
        b.iter(|| {
            let validity = build_validity(Some(mask.as_slice()), BENCH_ROWS).unwrap();
            encode(
                ScalarKind::Float64,
                RawValues::Float64(black_box(&doubles)),
                validity,
                BENCH_ROWS,
            )
            .unwrap()
        })
    });

    group.bench_function("Encode string", |b| {
        b.iter(|| {
            let validity = build_validity(Some(mask.as_slice()), BENCH_ROWS).unwrap();
            encode(
                ScalarKind::Utf8,
                RawValues::Strings(black_box(&word_rows)),
                validity,
                BENCH_ROWS,
            )
            .unwrap()
        })
    });

    group.bench_function("Encode categorical", |b| {
        b.iter(|| {
            let validity = build_validity(None, BENCH_ROWS).unwrap();
            encode(
                ScalarKind::Categorical,
                RawValues::Categorical {
                    codes: black_box(&codes),
                    levels: &levels,
                },
                validity,
                BENCH_ROWS,
            )
            .unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_column_encoder);
criterion_main!(benches);
