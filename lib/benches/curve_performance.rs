//! Performance benchmarks for curve evaluation and trade previews
//!
//! Previews run on every keystroke of a trade form, so spot price, cost and
//! the share search are measured at representative supplies in each phase.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ignition_curve::{
    BondingCurve, Lamports, Market, MarketState, Price, Shares,
};

/// One supply per phase, plus the endgame.
const SUPPLIES: [u64; 4] = [10_000_000, 120_000_000, 500_000_000, 960_000_000];

fn bench_spot_price(c: &mut Criterion) {
    let mut group = c.benchmark_group("spot_price");
    let curve = BondingCurve::DEFAULT;

    for supply in SUPPLIES.iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(supply),
            supply,
            |b, &supply| {
                let supply = Shares::from_whole(supply);
                b.iter(|| curve.spot_price(black_box(supply)));
            },
        );
    }

    group.finish();
}

fn bench_cost(c: &mut Criterion) {
    let curve = BondingCurve::DEFAULT;
    let old = Shares::from_whole(150_000_000);
    let new = Shares::from_whole(250_000_000);

    c.bench_function("cost_across_phases", |b| {
        b.iter(|| curve.cost(black_box(old), black_box(new)));
    });
}

fn bench_share_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate_buy");
    let curve = BondingCurve::DEFAULT;

    for sol in [1, 100, 10_000].iter() {
        group.bench_with_input(
            BenchmarkId::new("empty_market", sol),
            sol,
            |b, &sol| {
                let state = MarketState::default();
                let amount = Lamports::from_sol_whole(sol);
                b.iter(|| curve.simulate_buy(black_box(amount), &state).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_simulate_sell(c: &mut Criterion) {
    let curve = BondingCurve::DEFAULT;
    let state = MarketState::new(Shares::from_whole(500_000_000));
    let shares = Shares::from_whole(1_000_000);

    c.bench_function("simulate_sell", |b| {
        b.iter(|| curve.simulate_sell(black_box(shares), &state).unwrap());
    });
}

fn bench_supply_for_price(c: &mut Criterion) {
    let mut group = c.benchmark_group("supply_for_price");
    let curve = BondingCurve::DEFAULT;

    for (name, price) in [
        ("linear", Price::from_units(3_000_000_000_000)),
        ("bridge", Price::from_units(12_000_000_000_000)),
        ("sigmoid", Price::from_units(200_000_000_000_000)),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| curve.supply_for_price(black_box(price)));
        });
    }

    group.finish();
}

fn bench_market_round(c: &mut Criterion) {
    c.bench_function("market_buy_sell_round", |b| {
        let market = Market::new(BondingCurve::DEFAULT, 2).unwrap();
        b.iter(|| {
            let bought = market
                .buy(0, Lamports::from_sol_whole(1), Shares::ZERO)
                .unwrap();
            market.sell(0, bought.shares, Lamports::ZERO).unwrap()
        });
    });
}

criterion_group!(
    curve_benchmarks,
    bench_spot_price,
    bench_cost,
    bench_share_search,
    bench_simulate_sell,
    bench_supply_for_price,
    bench_market_round
);

criterion_main!(curve_benchmarks);
