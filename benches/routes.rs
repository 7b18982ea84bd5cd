use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::str::FromStr;

use bigdecimal::BigDecimal;
use swap_routes::models::pool::Pool;
use swap_routes::models::token::Token;
use swap_routes::routes::calculator::SwapRoutesCalculator;

/// Generate a new random address
fn generate_random_address() -> String {
    format!("0x{:040x}", fastrand::u64(..))
}

/// Generate synthetic tokens and constant product pools between them
fn generate_benchmark_snapshot(pool_count: usize, token_count: usize) -> (Vec<Pool>, Vec<Token>) {
    let tokens: Vec<Token> = (0..token_count)
        .map(|_| Token::new(generate_random_address(), 6))
        .collect();
    let lp_fee = BigDecimal::from_str("0.003").unwrap();
    let dao_fee = BigDecimal::from_str("0.001").unwrap();

    let pools = (0..pool_count)
        .map(|_| {
            // Select two different random tokens
            let idx1 = fastrand::usize(0..token_count);
            let mut idx2 = fastrand::usize(0..token_count);
            while idx1 == idx2 {
                idx2 = fastrand::usize(0..token_count);
            }

            Pool::new(
                generate_random_address(),
                tokens[idx1].address.clone(),
                tokens[idx2].address.clone(),
                (
                    fastrand::u128(1_000_000_000..1_000_000_000_000),
                    fastrand::u128(1_000_000_000..1_000_000_000_000),
                ),
                lp_fee.clone(),
                dao_fee.clone(),
            )
        })
        .collect();

    (pools, tokens)
}

/// Forward and reverse route pricing over growing random graphs
fn bench_calculate_routes(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculate_routes");
    group.sample_size(10);
    group.measurement_time(std::time::Duration::from_secs(5));

    for pool_count in [50, 200, 500] {
        let token_count = (pool_count / 5).max(10);
        let (pools, tokens) = generate_benchmark_snapshot(pool_count, token_count);
        let start = pools[0].token0.clone();
        // a pool never pairs a token with itself, so one side differs from start
        let pool = &pools[fastrand::usize(1..pool_count)];
        let end = if pool.token1 == start {
            pool.token0.clone()
        } else {
            pool.token1.clone()
        };
        assert_ne!(start, end);

        let calculator = SwapRoutesCalculator::new(pools, tokens, 1);
        let paths = calculator.get_possible_paths(&start, &end, 3);
        println!("{pool_count} pools, {token_count} tokens: {} paths", paths.len());

        group.throughput(criterion::Throughput::Elements(pool_count as u64));
        for is_reverse in [false, true] {
            let id = format!("{pool_count}/{}", if is_reverse { "reverse" } else { "forward" });
            group.bench_with_input(BenchmarkId::from_parameter(id), &is_reverse, |b, &is_reverse| {
                b.iter_batched(
                    // fresh cache per sample, so every hop is actually priced
                    || calculator.clone(),
                    |mut calculator| {
                        black_box(calculator.calculate_routes(1_000_000, &start, &end, 3, is_reverse))
                    },
                    criterion::BatchSize::SmallInput,
                );
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_calculate_routes);
criterion_main!(benches);
