use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use plexus_nullables::{NullLedger, NullPowerStore};
use plexus_rewards::{AssetParams, RewardEngine};
use plexus_types::{AccountAddress, Coin, Coins, Dec, RewardParams, Timestamp, ValidatorId};

type Engine = RewardEngine<NullLedger, NullPowerStore>;

fn gov() -> AccountAddress {
    RewardParams::default().authority
}

fn base_engine() -> Engine {
    let mut engine = RewardEngine::new(
        RewardParams::default(),
        NullLedger::new(),
        NullPowerStore::with_validators(["val1"]),
    );
    engine
        .init_genesis(
            vec![AssetParams::new("ualpha", Dec::ONE, Dec::ZERO)],
            Timestamp::new(0),
        )
        .unwrap();
    engine
}

fn delegate(engine: &mut Engine, who: &str, amount: u128) {
    let who = AccountAddress::new(who);
    engine.ledger_mut().mint(&who, Coin::new("ualpha", amount));
    engine
        .delegate(&who, &ValidatorId::new("val1"), Coin::new("ualpha", amount))
        .unwrap();
}

fn fund(engine: &mut Engine, amount: u128) {
    let funder = AccountAddress::new("funder");
    engine.ledger_mut().mint(&funder, Coin::new("stake", amount));
    engine
        .add_to_reward_pool(&funder, &ValidatorId::new("val1"), &Coins::from(Coin::new("stake", amount)))
        .unwrap();
}

/// One delegation left behind `n` weight changes, each followed by a funding.
fn engine_with_pending_snapshots(n: usize) -> Engine {
    let mut engine = base_engine();
    delegate(&mut engine, "user0", 1_000_000);
    for i in 0..n {
        let weight = Dec::from_int(1 + (i as u128 % 7));
        engine
            .update_asset(&gov(), AssetParams::new("ualpha", weight, Dec::ZERO))
            .unwrap();
        fund(&mut engine, 1_000_000);
    }
    engine
}

fn bench_claimable_vs_snapshots(c: &mut Criterion) {
    let mut group = c.benchmark_group("claimable_rewards");
    let user = AccountAddress::new("user0");
    let validator = ValidatorId::new("val1");

    for pending in [0, 10, 100, 1000] {
        let engine = engine_with_pending_snapshots(pending);
        group.bench_with_input(BenchmarkId::new("pending_snapshots", pending), &pending, |b, _| {
            b.iter(|| {
                black_box(
                    engine
                        .claimable_rewards(black_box(&user), black_box(&validator), "ualpha")
                        .unwrap(),
                )
            });
        });
    }

    group.finish();
}

fn bench_funding_vs_delegations(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_to_reward_pool");

    for delegations in [1, 100, 10_000] {
        let mut engine = base_engine();
        for i in 0..delegations {
            delegate(&mut engine, &format!("user{i}"), 1_000);
        }
        group.bench_with_input(
            BenchmarkId::new("delegations", delegations),
            &delegations,
            |b, _| {
                b.iter(|| fund(black_box(&mut engine), black_box(1_000_000)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_claimable_vs_snapshots, bench_funding_vs_delegations);
criterion_main!(benches);
