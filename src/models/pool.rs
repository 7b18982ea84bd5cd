use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::curves::{CurveKind, Direction};
use crate::error::SwapError;
use crate::routes::types::{PoolAddress, TokenAddress};

/// Parameters of a stableswap pool.
///
/// Trade sizes are in human-readable units of the input token; the price impact
/// limit is in percent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StableParams {
    /// Value of one token1 expressed in token0
    pub price_ratio: BigDecimal,
    /// Flatness of the curve around equilibrium
    pub alpha: BigDecimal,
    /// Steepness exponent while pool0 <= pool1 (in token0 units)
    pub gamma1: BigDecimal,
    /// Steepness exponent while pool0 > pool1 (in token0 units)
    pub gamma2: BigDecimal,
    /// Smallest accepted token0 -> token1 input
    pub min_trade_size_0_for_1: BigDecimal,
    /// Smallest accepted token1 -> token0 input
    pub min_trade_size_1_for_0: BigDecimal,
    /// Largest accepted price impact, in percent
    pub price_impact_limit: BigDecimal,
    /// Oracle key for token0 (metadata only)
    pub token0_oracle_key: String,
    /// Oracle key for token1 (metadata only)
    pub token1_oracle_key: String,
}

/// A liquidity pool as supplied by the caller's snapshot.
///
/// The router never mutates a `Pool`; simulated trades produce new curve states
/// instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    /// The address of the pool
    pub address: PoolAddress,
    /// The address of the first token in the pool
    pub token0: TokenAddress,
    /// The address of the second token in the pool
    pub token1: TokenAddress,
    /// Raw reserve of the first token
    pub reserve0: u128,
    /// Raw reserve of the second token
    pub reserve1: u128,
    /// Liquidity provider fee rate (0..1)
    pub lp_fee: BigDecimal,
    /// DAO fee rate (0..1)
    pub dao_fee: BigDecimal,
    /// Whether the pool trades on the stableswap curve
    #[serde(default)]
    pub is_stable: bool,
    /// Curve parameters, present for stable pools
    #[serde(default)]
    pub stable_params: Option<StableParams>,
}

impl Pool {
    /// Create a new constant product pool
    #[must_use]
    pub fn new(
        address: impl Into<PoolAddress>,
        token0: impl Into<TokenAddress>,
        token1: impl Into<TokenAddress>,
        (reserve0, reserve1): (u128, u128),
        lp_fee: BigDecimal,
        dao_fee: BigDecimal,
    ) -> Self {
        Self {
            address: address.into(),
            token0: token0.into(),
            token1: token1.into(),
            reserve0,
            reserve1,
            lp_fee,
            dao_fee,
            is_stable: false,
            stable_params: None,
        }
    }

    /// Turns this pool into a stableswap pool with the given parameters
    #[must_use]
    pub fn with_stable_params(mut self, params: StableParams) -> Self {
        self.is_stable = true;
        self.stable_params = Some(params);
        self
    }

    /// Which curve prices this pool
    #[must_use]
    pub const fn curve_kind(&self) -> CurveKind {
        if self.is_stable {
            CurveKind::Stable
        } else {
            CurveKind::ConstantProduct
        }
    }

    /// The token on the other side of `token`
    ///
    /// # Errors
    /// * `TokenNotInPool` if the pool does not hold `token`
    pub fn other_token(&self, token: &str) -> Result<&TokenAddress, SwapError> {
        match self.direction_from(token)? {
            Direction::ZeroForOne => Ok(&self.token1),
            Direction::OneForZero => Ok(&self.token0),
        }
    }

    /// The swap direction when `token_in` is sold into the pool
    ///
    /// # Errors
    /// * `TokenNotInPool` if the pool does not hold `token_in`
    pub fn direction_from(&self, token_in: &str) -> Result<Direction, SwapError> {
        if self.token0 == token_in {
            Ok(Direction::ZeroForOne)
        } else if self.token1 == token_in {
            Ok(Direction::OneForZero)
        } else {
            Err(SwapError::TokenNotInPool {
                token: token_in.to_string(),
                pool: self.address.clone(),
            })
        }
    }

    /// The swap direction when `token_out` is bought from the pool
    ///
    /// # Errors
    /// * `TokenNotInPool` if the pool does not hold `token_out`
    pub fn direction_to(&self, token_out: &str) -> Result<Direction, SwapError> {
        self.direction_from(token_out).map(|direction| direction.opposite())
    }

    /// Stable parameters of a stable pool
    ///
    /// # Errors
    /// * `MissingStableParams` if the pool is flagged stable but has none
    pub fn stable_params(&self) -> Result<&StableParams, SwapError> {
        self.stable_params
            .as_ref()
            .ok_or_else(|| SwapError::MissingStableParams(self.address.clone()))
    }

    /// Oracle keys of a stable pool, `None` for constant product pools
    #[must_use]
    pub fn oracle_keys(&self) -> Option<(String, String)> {
        self.stable_params
            .as_ref()
            .filter(|_| self.is_stable)
            .map(|params| {
                (
                    params.token0_oracle_key.clone(),
                    params.token1_oracle_key.clone(),
                )
            })
    }

    /// Raw reserves ordered as (in, out) for a swap direction
    #[must_use]
    pub const fn reserves(&self, direction: &Direction) -> (u128, u128) {
        match direction {
            Direction::ZeroForOne => (self.reserve0, self.reserve1),
            Direction::OneForZero => (self.reserve1, self.reserve0),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::routes::test_helpers::*;

    #[test]
    fn test_directions() {
        let pool = cp_pool("P1", "A", "B", 100, 200);
        assert_eq!(pool.direction_from("A").unwrap(), Direction::ZeroForOne);
        assert_eq!(pool.direction_from("B").unwrap(), Direction::OneForZero);
        assert_eq!(pool.direction_to("B").unwrap(), Direction::ZeroForOne);
        assert_eq!(pool.other_token("A").unwrap(), "B");
        assert_eq!(pool.reserves(&Direction::OneForZero), (200, 100));
    }

    #[test]
    fn test_token_not_in_pool() {
        let pool = cp_pool("P1", "A", "B", 100, 200);
        assert_eq!(
            pool.direction_from("C").err().unwrap().to_string(),
            "Token C is not in pool P1"
        );
    }

    #[test]
    fn test_missing_stable_params() {
        let mut pool = cp_pool("P1", "A", "B", 100, 200);
        pool.is_stable = true;
        assert_eq!(pool.curve_kind(), CurveKind::Stable);
        assert_eq!(
            pool.stable_params().err().unwrap(),
            SwapError::MissingStableParams("P1".to_string())
        );
        assert_eq!(pool.oracle_keys(), None);
    }

    #[test]
    fn test_deserialize() {
        let pool: Pool = serde_json::from_str(
            r#"{
                "address": "P1",
                "token0": "A",
                "token1": "B",
                "reserve0": 111111111000000,
                "reserve1": 222222222000000,
                "lp_fee": "0.01",
                "dao_fee": "0.02"
            }"#,
        )
        .unwrap();
        assert_eq!(pool, cp_pool("P1", "A", "B", 111_111_111_000_000, 222_222_222_000_000));
    }
}
