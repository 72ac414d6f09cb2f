use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cluster_core::{CircuitBreakerConfig, CircuitBreakerPolicy};
use std::time::Duration;

fn circuit_breaker_throughput_closed(c: &mut Criterion) {
    let breaker = CircuitBreakerPolicy::new(CircuitBreakerConfig {
        enabled: true,
        volume_threshold: 1_000_000,
        error_threshold: 0.5,
        sleep_window: Duration::from_secs(30),
        rolling_window: Duration::from_secs(10),
        half_open_max_calls: 1,
    });

    c.bench_function("circuit_breaker_track_and_succeed_closed", |b| {
        b.iter(|| {
            if black_box(breaker.track()) {
                breaker.mark_success();
            }
        });
    });
}

fn circuit_breaker_throughput_open(c: &mut Criterion) {
    let breaker = CircuitBreakerPolicy::new(CircuitBreakerConfig {
        enabled: true,
        volume_threshold: 1,
        error_threshold: 0.0,
        sleep_window: Duration::from_secs(30),
        rolling_window: Duration::from_secs(10),
        half_open_max_calls: 1,
    });
    breaker.track();
    breaker.mark_failure();

    c.bench_function("circuit_breaker_allows_request_open", |b| {
        b.iter(|| black_box(breaker.allows_request()));
    });
}

criterion_group!(benches, circuit_breaker_throughput_closed, circuit_breaker_throughput_open);
criterion_main!(benches);
