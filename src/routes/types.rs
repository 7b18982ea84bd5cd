use bigdecimal::BigDecimal;
use serde::Serialize;

use crate::curves::CurveKind;
use crate::utils::constants::{
    GAS_BASE, GAS_CONSTANT_PRODUCT_HOP, GAS_PER_ITERATION, GAS_STABLE_HOP,
};

/// Type alias for a pool address, represented as a string.
pub type PoolAddress = String;

/// Type alias for a token address, represented as a string.
pub type TokenAddress = String;

/// Result of swapping through one pool, in raw units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HopQuote {
    /// The pool traded through
    pub pool_address: PoolAddress,
    /// Token sold into the pool
    pub token_in: TokenAddress,
    /// Token bought from the pool
    pub token_out: TokenAddress,
    /// Raw amount sold
    pub amount_in: u128,
    /// Raw amount received after fees
    pub amount_out: u128,
    /// LP fee rate of the pool
    pub lp_fee: BigDecimal,
    /// DAO fee rate of the pool
    pub dao_fee: BigDecimal,
    /// Price impact in percent
    pub price_impact: BigDecimal,
    /// Solver iterations, zero for constant product pools
    pub iterations: u32,
    /// Curve that priced the hop
    pub curve: CurveKind,
    /// Oracle keys of a stable pool
    pub oracle_keys: Option<(String, String)>,
}

/// Per-hop metadata carried on a [`Route`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteHop {
    /// The pool traded through
    pub pool_address: PoolAddress,
    /// Token sold into the pool
    pub token_in: TokenAddress,
    /// Token bought from the pool
    pub token_out: TokenAddress,
    /// Raw amount sold
    pub amount_in: u128,
    /// Raw amount received
    pub amount_out: u128,
    /// Curve that priced the hop
    pub curve: CurveKind,
    /// Oracle keys of a stable pool
    pub oracle_keys: Option<(String, String)>,
}

impl From<&HopQuote> for RouteHop {
    fn from(quote: &HopQuote) -> Self {
        Self {
            pool_address: quote.pool_address.clone(),
            token_in: quote.token_in.clone(),
            token_out: quote.token_out.clone(),
            amount_in: quote.amount_in,
            amount_out: quote.amount_out,
            curve: quote.curve,
            oracle_keys: quote.oracle_keys.clone(),
        }
    }
}

/// A priced path from one token to another.
///
/// Fees and price impact are plain sums over the hops, not compounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    /// Token sold at the first hop
    pub input_token: TokenAddress,
    /// Token received at the last hop
    pub output_token: TokenAddress,
    /// Raw amount sold
    pub input_amount: u128,
    /// Raw amount received
    pub quote_output_amount: u128,
    /// Sum of the hops' LP fee rates
    pub quote_lp_fee: BigDecimal,
    /// Sum of the hops' DAO fee rates
    pub quote_dao_fee: BigDecimal,
    /// Sum of the hops' price impacts, in percent
    pub price_impact: BigDecimal,
    /// Hops in trading order
    pub hops: Vec<RouteHop>,
    /// Solver iterations over all hops
    pub iterations_count: u32,
}

impl Route {
    /// Folds hop quotes, given in trading order, into a route.
    ///
    /// # Returns
    /// * `None` if `quotes` is empty
    #[must_use]
    pub fn from_hops(quotes: &[HopQuote]) -> Option<Self> {
        let first = quotes.first()?;
        let last = quotes.last()?;
        Some(Self {
            input_token: first.token_in.clone(),
            output_token: last.token_out.clone(),
            input_amount: first.amount_in,
            quote_output_amount: last.amount_out,
            quote_lp_fee: quotes.iter().map(|quote| &quote.lp_fee).sum(),
            quote_dao_fee: quotes.iter().map(|quote| &quote.dao_fee).sum(),
            price_impact: quotes.iter().map(|quote| &quote.price_impact).sum(),
            hops: quotes.iter().map(RouteHop::from).collect(),
            iterations_count: quotes.iter().map(|quote| quote.iterations).sum(),
        })
    }

    /// Pool addresses in trading order
    #[must_use]
    pub fn path(&self) -> Vec<PoolAddress> {
        self.hops.iter().map(|hop| hop.pool_address.clone()).collect()
    }

    /// LP plus DAO fee
    #[must_use]
    pub fn combined_fee(&self) -> BigDecimal {
        &self.quote_lp_fee + &self.quote_dao_fee
    }

    /// Number of hops
    #[must_use]
    pub fn hop_count(&self) -> usize {
        self.hops.len()
    }

    /// Cost proxy: one unit per hop plus one per solver iteration
    #[must_use]
    pub fn gas_multiplier(&self) -> u64 {
        (self.hops.len() as u64).saturating_add(u64::from(self.iterations_count))
    }

    /// Estimated gas to execute the route on-chain, saturating at `u64::MAX`.
    #[must_use]
    pub fn estimated_gas(&self, gas: &GasModel) -> u64 {
        let hops = self
            .hops
            .iter()
            .map(|hop| match hop.curve {
                CurveKind::ConstantProduct => gas.constant_product_hop,
                CurveKind::Stable => gas.stable_hop,
            })
            .fold(0_u64, u64::saturating_add);
        let iterations = u64::from(self.iterations_count).saturating_mul(gas.per_iteration);
        gas.base.saturating_add(hops).saturating_add(iterations)
    }
}

/// Gas costs used by [`Route::estimated_gas`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasModel {
    /// Fixed overhead per routed swap
    pub base: u64,
    /// Cost of a constant product hop
    pub constant_product_hop: u64,
    /// Cost of a stable hop, before iterations
    pub stable_hop: u64,
    /// Cost of one solver iteration
    pub per_iteration: u64,
}

impl Default for GasModel {
    fn default() -> Self {
        Self {
            base: GAS_BASE,
            constant_product_hop: GAS_CONSTANT_PRODUCT_HOP,
            stable_hop: GAS_STABLE_HOP,
            per_iteration: GAS_PER_ITERATION,
        }
    }
}
