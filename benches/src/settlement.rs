use std::sync::Arc;
use std::time::Duration;

use banknet::prelude::*;
use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tokio::runtime::Runtime;

/// Two banks with `accounts` well-funded accounts each
fn setup_network(accounts: usize) -> Arc<BankRegistry> {
    let registry = Arc::new(BankRegistry::with_currencies(&[Currency::USD, Currency::EUR]));
    for bank in registry.iter() {
        for _ in 0..accounts {
            bank.new_account(FixedPoint::from_units(1_000_000_000), FixedPoint::from_units(1_000));
        }
    }
    registry
}

fn transfers(count: u64, accounts: u32, cross_bank_every: u64) -> Vec<Transaction> {
    (0..count)
        .map(|i| {
            let from = (i as u32) % accounts;
            let to = (i as u32 + 1) % accounts;
            let (bank, currency) = if cross_bank_every > 0 && i % cross_bank_every == 0 {
                (1, Currency::EUR)
            } else {
                (0, Currency::USD)
            };
            Transaction::new(
                i,
                AccountRef::new(0, from),
                AccountRef::new(bank, to),
                FixedPoint::from_units(10),
                currency,
            )
            .unwrap()
        })
        .collect()
}

/// Raw settle throughput of a single processor
fn bench_settle(c: &mut Criterion) {
    let mut group = c.benchmark_group("settle");

    for (name, cross_bank_every) in [("domestic", 0), ("mixed", 4), ("cross_bank", 1)] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &cross_bank_every, |b, &every| {
            b.iter_batched(
                || {
                    let registry = setup_network(100);
                    let processor = PaymentProcessor::new(
                        0,
                        Arc::clone(registry.get(0).unwrap()),
                        Arc::clone(&registry),
                        Arc::new(StaticRateTable::new()),
                    );
                    (processor, transfers(1_000, 100, every))
                },
                |(processor, transactions)| {
                    for tx in &transactions {
                        black_box(processor.settle(tx).ok());
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// End-to-end queue throughput with several workers on one bank
fn bench_worker_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("worker_pool");
    let runtime = Runtime::new().unwrap();

    for workers in [1, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &workers| {
            b.to_async(&runtime).iter_batched(
                || (setup_network(64), transfers(2_000, 64, 8)),
                |(registry, transactions)| async move {
                    let bank = Arc::clone(registry.get(0).unwrap());
                    let pool = ProcessorPool::new(Arc::clone(&registry), Arc::new(StaticRateTable::new()), SilentSkip)
                        .with_workers(workers)
                        .spawn();

                    let count = transactions.len() as u64;
                    for tx in transactions {
                        bank.enqueue(tx);
                    }
                    while bank.metrics().processed + bank.metrics().failed < count {
                        tokio::time::sleep(Duration::from_micros(50)).await;
                    }

                    registry.shutdown_all();
                    black_box(pool.join().await);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_settle, bench_worker_pool);
criterion_main!(benches);
