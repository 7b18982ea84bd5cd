use std::collections::HashMap;

use bigdecimal::BigDecimal;
use log::trace;

use crate::curves::constant_product::{ConstantProductCurve, ConstantProductQuote};
use crate::curves::stable::StableCurve;
use crate::curves::{CurveKind, Direction};
use crate::error::SwapError;
use crate::math::decimal::{from_raw, to_raw};
use crate::models::pool::Pool;
use crate::routes::cache::{InvariantKey, InvariantMemo};
use crate::routes::types::{HopQuote, TokenAddress};

/// Prices one hop through one pool.
///
/// Takes raw amounts, converts them to human-readable units with the tokens'
/// decimals, runs the pool's curve and converts the result back, rounding to
/// the nearest raw unit.
#[derive(Debug, Clone, Copy)]
pub struct SingleHopCalculator<'a> {
    /// Decimals per token address
    decimals: &'a HashMap<TokenAddress, u32>,
}

impl<'a> SingleHopCalculator<'a> {
    /// Create a new calculator over a decimals map
    #[must_use]
    pub const fn new(decimals: &'a HashMap<TokenAddress, u32>) -> Self {
        Self { decimals }
    }

    /// Output of selling `amount_in` of `token_in` into `pool`.
    ///
    /// # Arguments
    /// * `amount_in` - Raw input amount
    /// * `token_in` - Token sold into the pool
    /// * `pool` - The pool to trade through
    /// * `invariants` - Memo of solved stable invariants
    ///
    /// # Errors
    /// * `TokenNotInPool`, `UnknownToken`, or any curve error
    pub fn forward(
        &self,
        amount_in: u128,
        token_in: &str,
        pool: &Pool,
        invariants: &mut InvariantMemo,
    ) -> Result<HopQuote, SwapError> {
        let direction = pool.direction_from(token_in)?;
        let token_out = pool.other_token(token_in)?;
        let (decimals_in, decimals_out) = self.decimals_for(pool, direction)?;
        let human_in = from_raw(amount_in, decimals_in);

        let (amount_out, price_impact, iterations) = match pool.curve_kind() {
            CurveKind::ConstantProduct => {
                let quote = self.constant_product(pool, direction)?.forward(&human_in)?;
                let impact = percent(&quote);
                (to_raw(&quote.amount_out, decimals_out)?, impact, 0)
            }
            CurveKind::Stable => {
                let curve = self.stable_curve(pool, invariants)?;
                let trade = curve.simulate_forward(direction, &human_in)?;
                let iterations = curve.invariant_iterations() + trade.iterations;
                (to_raw(&trade.trade_return, decimals_out)?, trade.price_impact, iterations)
            }
        };
        trace!(
            "{} {direction}: {amount_in} {token_in} -> {amount_out} {token_out}",
            pool.address
        );

        Ok(Self::quote(
            pool,
            (token_in, token_out),
            (amount_in, amount_out),
            price_impact,
            iterations,
        ))
    }

    /// Input of the other token needed to receive `amount_out` of `token_out`
    /// from `pool`, after fees.
    ///
    /// # Errors
    /// * `TokenNotInPool`, `UnknownToken`, `InsufficientLiquidity`, or any
    ///   curve error
    pub fn reverse(
        &self,
        amount_out: u128,
        token_out: &str,
        pool: &Pool,
        invariants: &mut InvariantMemo,
    ) -> Result<HopQuote, SwapError> {
        let direction = pool.direction_to(token_out)?;
        let token_in = pool.other_token(token_out)?;
        let (decimals_in, decimals_out) = self.decimals_for(pool, direction)?;
        let human_out = from_raw(amount_out, decimals_out);

        let (amount_in, price_impact, iterations) = match pool.curve_kind() {
            CurveKind::ConstantProduct => {
                let quote = self.constant_product(pool, direction)?.reverse(&human_out)?;
                let impact = percent(&quote);
                (to_raw(&quote.amount_in, decimals_in)?, impact, 0)
            }
            CurveKind::Stable => {
                let curve = self.stable_curve(pool, invariants)?;
                let trade = curve.simulate_reverse(direction, &human_out)?;
                let iterations = curve.invariant_iterations() + trade.iterations;
                (to_raw(&trade.trade_input, decimals_in)?, trade.price_impact, iterations)
            }
        };
        trace!(
            "{} {direction} reverse: {amount_in} {token_in} -> {amount_out} {token_out}",
            pool.address
        );

        Ok(Self::quote(
            pool,
            (token_in, token_out),
            (amount_in, amount_out),
            price_impact,
            iterations,
        ))
    }

    /// Decimals of the (in, out) tokens for a direction.
    fn decimals_for(&self, pool: &Pool, direction: Direction) -> Result<(u32, u32), SwapError> {
        let decimals0 = self.token_decimals(&pool.token0)?;
        let decimals1 = self.token_decimals(&pool.token1)?;
        Ok(match direction {
            Direction::ZeroForOne => (decimals0, decimals1),
            Direction::OneForZero => (decimals1, decimals0),
        })
    }

    /// Decimals of `token`, `UnknownToken` if missing
    fn token_decimals(&self, token: &str) -> Result<u32, SwapError> {
        self.decimals
            .get(token)
            .copied()
            .ok_or_else(|| SwapError::UnknownToken(token.to_string()))
    }

    /// Constant product curve oriented for `direction`, in human-readable units.
    fn constant_product(
        &self,
        pool: &Pool,
        direction: Direction,
    ) -> Result<ConstantProductCurve, SwapError> {
        let (decimals_in, decimals_out) = self.decimals_for(pool, direction)?;
        let (reserve_in, reserve_out) = pool.reserves(&direction);
        Ok(ConstantProductCurve {
            reserve_in: from_raw(reserve_in, decimals_in),
            reserve_out: from_raw(reserve_out, decimals_out),
            lp_fee: pool.lp_fee.clone(),
            dao_fee: pool.dao_fee.clone(),
        })
    }

    /// Stable curve for the pool, reusing a memoised invariant when the same
    /// reserves were solved before.
    fn stable_curve(
        &self,
        pool: &Pool,
        invariants: &mut InvariantMemo,
    ) -> Result<StableCurve, SwapError> {
        let params = pool.stable_params()?;
        let pool0_size = from_raw(pool.reserve0, self.token_decimals(&pool.token0)?);
        let pool1_size = from_raw(pool.reserve1, self.token_decimals(&pool.token1)?);
        let key = InvariantKey {
            pool: pool.address.clone(),
            reserve0: pool.reserve0,
            reserve1: pool.reserve1,
        };

        if let Some(memo) = invariants.get(&key) {
            return StableCurve::with_invariant(
                pool0_size,
                pool1_size,
                params,
                pool.lp_fee.clone(),
                pool.dao_fee.clone(),
                memo.clone(),
            );
        }

        let curve = StableCurve::new(
            pool0_size,
            pool1_size,
            params,
            pool.lp_fee.clone(),
            pool.dao_fee.clone(),
        )?;
        invariants.insert(
            key,
            (curve.invariant().clone(), curve.invariant_iterations()),
        );
        Ok(curve)
    }

    /// Assembles the hop quote in raw units
    fn quote(
        pool: &Pool,
        (token_in, token_out): (&str, &str),
        (amount_in, amount_out): (u128, u128),
        price_impact: BigDecimal,
        iterations: u32,
    ) -> HopQuote {
        HopQuote {
            pool_address: pool.address.clone(),
            token_in: token_in.to_string(),
            token_out: token_out.to_string(),
            amount_in,
            amount_out,
            lp_fee: pool.lp_fee.clone(),
            dao_fee: pool.dao_fee.clone(),
            price_impact,
            iterations,
            curve: pool.curve_kind(),
            oracle_keys: pool.oracle_keys(),
        }
    }
}

/// Constant product impact is a fraction; hops report percent.
fn percent(quote: &ConstantProductQuote) -> BigDecimal {
    &quote.price_impact * BigDecimal::from(100)
}
