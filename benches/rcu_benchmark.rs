/*!
 * RCU Provider Benchmarks
 *
 * Compare read-section and publish latency across the lock-free and
 * lock-based providers.
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use rcu_bench::{GraceRcu, Payload, RcuSync, RwLockRcu, VersionCell};

fn providers() -> Vec<(&'static str, Arc<dyn RcuSync>)> {
    vec![
        ("grace", Arc::new(GraceRcu::new())),
        ("rwlock", Arc::new(RwLockRcu::new())),
    ]
}

fn bench_uncontended_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("uncontended_read");

    for (name, provider) in providers() {
        let cell = VersionCell::new();
        provider.publish(&cell, Payload::live());

        provider.register_reader();
        group.bench_with_input(BenchmarkId::from_parameter(name), &provider, |b, provider| {
            b.iter(|| {
                provider.read_section_enter();
                black_box(provider.safe_read(&cell));
                provider.read_section_exit();
            });
        });
        provider.unregister_reader();
    }

    group.finish();
}

fn bench_publish(c: &mut Criterion) {
    let mut group = c.benchmark_group("publish");

    for (name, provider) in providers() {
        let cell = VersionCell::new();

        group.bench_with_input(BenchmarkId::from_parameter(name), &provider, |b, provider| {
            b.iter(|| {
                black_box(provider.publish(&cell, Payload::live()));
            });
        });
    }

    group.finish();
}

fn bench_read_under_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_under_writes");

    for (name, provider) in providers() {
        let cell = Arc::new(VersionCell::new());
        provider.publish(&cell, Payload::live());

        let stop = Arc::new(AtomicBool::new(false));
        let writer = {
            let provider = provider.clone();
            let cell = cell.clone();
            let stop = stop.clone();
            thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    provider.publish(&cell, Payload::live());
                    thread::sleep(Duration::from_micros(10));
                }
            })
        };

        provider.register_reader();
        group.bench_with_input(BenchmarkId::from_parameter(name), &provider, |b, provider| {
            b.iter(|| {
                provider.read_section_enter();
                black_box(provider.safe_read(&cell));
                provider.read_section_exit();
            });
        });
        provider.unregister_reader();

        stop.store(true, Ordering::Relaxed);
        writer.join().unwrap();
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_uncontended_read,
    bench_publish,
    bench_read_under_writes
);

criterion_main!(benches);
