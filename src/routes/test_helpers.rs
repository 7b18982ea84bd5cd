use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::models::pool::{Pool, StableParams};
use crate::models::token::Token;
use crate::routes::calculator::SwapRoutesCalculator;

#[allow(dead_code)]
pub fn dec(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap()
}

/// Constant product pool with a 1% LP fee and a 2% DAO fee
#[allow(dead_code)]
pub fn cp_pool(address: &str, token0: &str, token1: &str, reserve0: u128, reserve1: u128) -> Pool {
    Pool::new(
        address,
        token0,
        token1,
        (reserve0, reserve1),
        dec("0.01"),
        dec("0.02"),
    )
}

/// Parameters of the K-L pool: one token1 is worth three token0
#[allow(dead_code)]
pub fn stable_params() -> StableParams {
    StableParams {
        price_ratio: dec("3"),
        alpha: dec("10"),
        gamma1: dec("4"),
        gamma2: dec("5"),
        min_trade_size_0_for_1: dec("0"),
        min_trade_size_1_for_0: dec("0"),
        price_impact_limit: dec("100"),
        token0_oracle_key: "K_ORACLE".to_string(),
        token1_oracle_key: "L_ORACLE".to_string(),
    }
}

/// Stable pool with 1% LP and DAO fees and the K-L curve parameters
#[allow(dead_code)]
pub fn stable_pool(
    address: &str,
    token0: &str,
    token1: &str,
    reserve0: u128,
    reserve1: u128,
) -> Pool {
    Pool::new(
        address,
        token0,
        token1,
        (reserve0, reserve1),
        dec("0.01"),
        dec("0.01"),
    )
    .with_stable_params(stable_params())
}

#[allow(dead_code)]
pub fn tokens(args: &[(&str, u32)]) -> Vec<Token> {
    args.iter()
        .map(|(address, decimals)| Token::new(*address, *decimals))
        .collect()
}

/// Calculator over constant product pools whose tokens all carry 6 decimals
#[allow(dead_code)]
pub fn calculator(pool_args: &[(&str, &str, &str, u128, u128)]) -> SwapRoutesCalculator {
    let pools: Vec<Pool> = pool_args
        .iter()
        .map(|(address, token0, token1, reserve0, reserve1)| {
            cp_pool(address, token0, token1, *reserve0, *reserve1)
        })
        .collect();
    let mut symbols: Vec<&str> = pools
        .iter()
        .flat_map(|pool| [pool.token0.as_str(), pool.token1.as_str()])
        .collect();
    symbols.sort_unstable();
    symbols.dedup();
    let tokens: Vec<Token> = symbols.iter().map(|symbol| Token::new(*symbol, 6)).collect();
    SwapRoutesCalculator::new(pools, tokens, 1)
}
