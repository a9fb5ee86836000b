//! Performance benchmarks for the event router.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};
use socket_relay::{ActionStore, EventRouter, PassphraseAes, RelayConfig, SubscriberId};
use std::sync::Arc;

struct NamesOnlyStore {
    actions: Vec<String>,
}

impl ActionStore for NamesOnlyStore {
    fn action_names(&self) -> Option<Vec<String>> {
        Some(self.actions.clone())
    }

    fn dispatch(&self, name: &str, payload: &Value) {
        black_box((name, payload));
    }
}

/// Benchmark plain fan-out with a growing number of listeners
fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("fan_out");

    for listeners in [1, 10, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::new("listeners", listeners),
            &listeners,
            |b, &count| {
                let router = EventRouter::new(RelayConfig::default()).unwrap();
                for i in 0..count {
                    router.subscribe(
                        "message",
                        |payload| {
                            black_box(payload);
                            Ok(())
                        },
                        &SubscriberId::new(format!("listener-{i}")),
                    );
                }
                let payload = json!({"text": "hello", "from": "ana"});

                b.iter(|| {
                    black_box(router.handle("message", payload.clone()).unwrap());
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the decrypt gate against the plain path
fn bench_decrypt_gate(c: &mut Criterion) {
    let mut group = c.benchmark_group("decrypt_gate");
    let blob = PassphraseAes::new().seal(
        "bench-secret",
        &json!({"text": "hello", "items": (0..32).collect::<Vec<u32>>()}),
        *b"benchslt",
    );

    let router = EventRouter::new(RelayConfig::default().with_decryption("bench-secret", "msg"))
        .unwrap();
    let payload = json!({ "msg": [blob] });
    group.bench_function("encrypted", |b| {
        b.iter(|| black_box(router.handle("message", payload.clone()).unwrap()));
    });

    let plain = EventRouter::new(RelayConfig::default()).unwrap();
    group.bench_function("plain", |b| {
        b.iter(|| black_box(plain.handle("message", payload.clone()).unwrap()));
    });

    group.finish();
}

/// Benchmark store forwarding with a large action registry
fn bench_store_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_forward");

    for actions in [10, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::new("actions", actions),
            &actions,
            |b, &count| {
                let names = (0..count)
                    .map(|i| format!("module{}/SOCKET_event{}", i % 7, i))
                    .collect();
                let router = EventRouter::builder()
                    .store(Arc::new(NamesOnlyStore { actions: names }))
                    .build()
                    .unwrap();

                b.iter(|| black_box(router.handle("event3", json!(3)).unwrap()));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_fan_out, bench_decrypt_gate, bench_store_forward);
criterion_main!(benches);
