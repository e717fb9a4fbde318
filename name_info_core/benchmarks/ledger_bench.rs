use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use name_info_core::{CommandKind, RecentCommandLedger, UserId};

fn bench_mark_consume(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger");

    for users in [16usize, 256, 4096] {
        let ids: Vec<UserId> = (0..users)
            .map(|index| UserId::new(format!("7656119{index:010}@steam")))
            .collect();
        group.bench_with_input(BenchmarkId::new("mark_consume", users), &ids, |b, ids| {
            let ledger = RecentCommandLedger::new();
            b.iter(|| {
                for id in ids {
                    ledger.mark_handled(id, CommandKind::Name);
                }
                for id in ids {
                    let _ = ledger.consume_if_fresh(id, CommandKind::Name, Duration::from_secs(5));
                }
            })
        });
    }

    group.finish();
}

criterion_group!(ledger_benches, bench_mark_consume);
criterion_main!(ledger_benches);
