// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Provider and aggregator microbenchmarks.
//!
//! Measures the built-in `pqcrypto` bindings through the same handles the
//! engine uses, plus the cost of summarizing a sample set.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pqbench_core::{
    AlgorithmHandle, AlgorithmKind, AlgorithmName, AlgorithmSpec, MessageSize, ProviderRegistry,
};
use pqbench_engine::StatSummary;
use std::time::Duration;

const KEMS: &[&str] = &["ML-KEM-512", "ML-KEM-768", "ML-KEM-1024"];
const SIGNERS: &[&str] = &["ML-DSA-44", "ML-DSA-65", "Falcon-512"];
const MESSAGE_SIZES: &[usize] = &[32, 1024, 16384];

fn resolve(registry: &ProviderRegistry, name: &str, kind: AlgorithmKind) -> AlgorithmHandle {
    let spec = AlgorithmSpec {
        name: AlgorithmName::new(name).expect("valid algorithm name"),
        kind,
        implementation: "pqcrypto".to_string(),
        sizes: vec![MessageSize::new(32).expect("valid size")],
    };
    registry.resolve(&spec).expect("built-in binding resolves")
}

/// Benchmark KEM keygen, encapsulate and decapsulate.
fn bench_kem(c: &mut Criterion) {
    let registry = ProviderRegistry::with_builtin().expect("Failed to build registry");
    let mut group = c.benchmark_group("kem");
    group.measurement_time(Duration::from_secs(3));

    for &name in KEMS {
        let AlgorithmHandle::Kem(mut kem) = resolve(&registry, name, AlgorithmKind::Kem) else {
            unreachable!("{name} is a KEM");
        };
        let keys = kem.keygen().expect("keygen");
        let encapsulated = kem.encapsulate(&keys.public_key).expect("encapsulate");

        group.bench_function(BenchmarkId::new("keygen", name), |b| {
            b.iter(|| black_box(kem.keygen().ok()))
        });
        group.bench_function(BenchmarkId::new("encaps", name), |b| {
            b.iter(|| black_box(kem.encapsulate(black_box(&keys.public_key)).ok()))
        });
        group.bench_function(BenchmarkId::new("decaps", name), |b| {
            b.iter(|| {
                black_box(
                    kem.decapsulate(black_box(&encapsulated.ciphertext), &keys.secret_key)
                        .ok(),
                )
            })
        });
    }

    group.finish();
}

/// Benchmark signing and verification at several message sizes.
fn bench_signatures(c: &mut Criterion) {
    let registry = ProviderRegistry::with_builtin().expect("Failed to build registry");
    let mut group = c.benchmark_group("sign");
    group.measurement_time(Duration::from_secs(3));

    for &name in SIGNERS {
        let AlgorithmHandle::Signature(mut signer) =
            resolve(&registry, name, AlgorithmKind::Signature)
        else {
            unreachable!("{name} is a signature scheme");
        };
        let keys = signer.keygen().expect("keygen");

        for &size in MESSAGE_SIZES {
            let message = vec![0x5Au8; size];
            let signature = signer.sign(&message, &keys.secret_key).expect("sign");
            group.throughput(Throughput::Bytes(size as u64));

            group.bench_with_input(
                BenchmarkId::new(format!("{name}/sign"), size),
                &message,
                |b, message| b.iter(|| black_box(signer.sign(message, &keys.secret_key).ok())),
            );
            group.bench_with_input(
                BenchmarkId::new(format!("{name}/verify"), size),
                &message,
                |b, message| {
                    b.iter(|| black_box(signer.verify(&keys.public_key, message, &signature)))
                },
            );
        }
    }

    group.finish();
}

/// Benchmark the statistics aggregator.
fn bench_stat_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("stat_summary");

    for &count in &[1_000usize, 10_000, 100_000] {
        let samples: Vec<u64> = (0..count as u64).map(|i| (i * 7919) % 50_000 + 1_000).collect();
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &samples, |b, samples| {
            b.iter(|| StatSummary::from_samples(black_box(samples.clone()), false))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_kem, bench_signatures, bench_stat_summary);
criterion_main!(benches);
