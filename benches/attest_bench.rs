//! Lockbridge benchmarks using Criterion
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use lockbridge_attest::{DepositMerkleTree, MAX_DEPTH};
use lockbridge_pkarm::{derive_challenge, derive_verifier, RecipientIdentity};
use lockbridge_primitives::{Address, DepositRecord, B256, U256};

fn sample_records(n: usize) -> Vec<DepositRecord> {
    (0..n)
        .map(|i| {
            let mut address = [0u8; 20];
            address[12..].copy_from_slice(&(i as u64).to_be_bytes());
            DepositRecord::new(
                Address::from(address),
                B256::from(U256::from(i as u64 * 7 + 1)),
                U256::from(1_000_000u64 * (i as u64 + 1)),
            )
        })
        .collect()
}

fn bench_leaf_hash(c: &mut Criterion) {
    let record = sample_records(1)[0];
    c.bench_function("leaf_hash", |b| b.iter(|| black_box(&record).leaf_hash()));
}

fn bench_tree_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_build");
    group.sample_size(10);

    for size in [16usize, 128, 1024].iter() {
        let records = sample_records(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("records", size), size, |b, _| {
            b.iter(|| DepositMerkleTree::from_records(black_box(records.clone())).unwrap())
        });
    }

    group.finish();
}

fn bench_witness_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("witness_verify");

    for size in [16usize, 1024].iter() {
        let tree = DepositMerkleTree::from_records(sample_records(*size)).unwrap();
        let witness = tree.witness(size / 2).unwrap().pad_to(MAX_DEPTH);

        group.bench_with_input(BenchmarkId::new("records", size), size, |b, _| {
            b.iter(|| black_box(&witness).verify().unwrap())
        });
    }

    group.finish();
}

fn bench_challenge(c: &mut Criterion) {
    let verifier = derive_verifier(&[9u8; 65]).unwrap();
    let recipient = RecipientIdentity::new([3u8; 32]);
    c.bench_function("derive_challenge", |b| {
        b.iter(|| derive_challenge(black_box(&verifier), black_box(&recipient)))
    });
}

criterion_group!(
    benches,
    bench_leaf_hash,
    bench_tree_build,
    bench_witness_verify,
    bench_challenge
);
criterion_main!(benches);
