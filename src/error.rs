//! Error taxonomy for swap simulation and route discovery.
//!
//! Every failure a single hop or path can run into is a [`SwapError`]. None of
//! them are fatal to a route search: the accumulator turns them into "this path
//! yields no route" and moves on.

use bigdecimal::BigDecimal;
use derive_more::Display;
use thiserror::Error;

/// Coarse classification of a [`SwapError`], used when logging dropped paths.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Trade amounts that are non-positive or below a pool minimum
    Validation,
    /// The pool cannot pay out the requested amount
    Liquidity,
    /// The trade moves the price outside of the allowed band
    PriceImpact,
    /// The numerical root finder could not produce a root
    Solver,
    /// The path refers to pools or tokens that do not line up
    Graph,
    /// The snapshot itself is inconsistent or outdated
    Snapshot,
}

/// Errors raised while simulating swaps.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SwapError {
    /// The trade amount is zero or negative
    #[error("Trade size must be positive")]
    NonPositiveTrade,

    /// The trade amount does not exceed the pool's minimum trade size
    #[error("Trade size must be larger than minimum trade size of {min}")]
    BelowMinimumTrade {
        /// Minimum trade size for this direction, in human-readable units
        min: BigDecimal,
    },

    /// The requested output meets or exceeds the available reserve
    #[error("Not enough liquidity for swap")]
    InsufficientLiquidity,

    /// The trade's price impact is above the pool's limit
    #[error("The trade price impact {impact}% exceeds the price impact limit of {limit}%")]
    PriceImpactLimit {
        /// Computed price impact in percent
        impact: BigDecimal,
        /// Allowed price impact in percent
        limit: BigDecimal,
    },

    /// A negative price impact, which a convex curve can not produce
    #[error("Price impact {0}% is negative")]
    NegativePriceImpact(BigDecimal),

    /// Newton-Raphson hit a zero derivative or ran out of iterations
    #[error("Newton method failed: {0}")]
    NewtonMethod(String),

    /// Bisection was handed a bracket without a sign change
    #[error("Bisection endpoints must have different signs")]
    BisectionSigns,

    /// Bisection ran out of iterations
    #[error("Bisection method failed to converge after {0} iterations")]
    BisectionDiverged(u32),

    /// The solver landed on a non-positive pool size or output, typically a
    /// trade too small for the solver tolerance to resolve
    #[error("Solver produced non-positive amount {0}")]
    NonPositiveSolution(BigDecimal),

    /// No pool with this address exists in the snapshot
    #[error("Pool {0} not found")]
    PoolNotFound(String),

    /// More than one pool shares this address
    #[error("Duplicate pool address {0}")]
    DuplicatePool(String),

    /// A hop asked a pool to trade a token it does not hold
    #[error("Token {token} is not in pool {pool}")]
    TokenNotInPool {
        /// The token being traded
        token: String,
        /// The pool that was asked to trade it
        pool: String,
    },

    /// The token is missing from the decimals map
    #[error("Token {0} has no known decimals")]
    UnknownToken(String),

    /// A pool is flagged stable but carries no curve parameters
    #[error("Stable pool {0} has no curve parameters")]
    MissingStableParams(String),

    /// Pool state or parameters that no curve can work with
    #[error("Invalid pool: {0}")]
    InvalidPool(String),

    /// An amount that can not be expressed as a raw `u128`
    #[error("Amount {0} cannot be represented in raw units")]
    AmountOutOfRange(String),

    /// A snapshot update that goes back in time
    #[error("Snapshot version {new} is older than current version {current}")]
    StaleVersion {
        /// Version currently held by the calculator
        current: u64,
        /// Version the caller tried to install
        new: u64,
    },
}

impl SwapError {
    /// The error's class in the route-search taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NonPositiveTrade | Self::BelowMinimumTrade { .. } | Self::AmountOutOfRange(_) => {
                ErrorKind::Validation
            }
            Self::InsufficientLiquidity => ErrorKind::Liquidity,
            Self::PriceImpactLimit { .. } | Self::NegativePriceImpact(_) => ErrorKind::PriceImpact,
            Self::NewtonMethod(_)
            | Self::BisectionSigns
            | Self::BisectionDiverged(_)
            | Self::NonPositiveSolution(_) => ErrorKind::Solver,
            Self::PoolNotFound(_)
            | Self::DuplicatePool(_)
            | Self::TokenNotInPool { .. }
            | Self::UnknownToken(_) => ErrorKind::Graph,
            Self::MissingStableParams(_) | Self::InvalidPool(_) | Self::StaleVersion { .. } => {
                ErrorKind::Snapshot
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            SwapError::NonPositiveTrade.to_string(),
            "Trade size must be positive"
        );
        assert_eq!(
            SwapError::InsufficientLiquidity.to_string(),
            "Not enough liquidity for swap"
        );
        assert_eq!(
            SwapError::BisectionSigns.to_string(),
            "Bisection endpoints must have different signs"
        );
        assert_eq!(
            SwapError::BelowMinimumTrade {
                min: BigDecimal::from(5)
            }
            .to_string(),
            "Trade size must be larger than minimum trade size of 5"
        );
    }

    #[test]
    fn test_kinds() {
        for (error, expected) in [
            (SwapError::NonPositiveTrade, ErrorKind::Validation),
            (SwapError::InsufficientLiquidity, ErrorKind::Liquidity),
            (
                SwapError::NegativePriceImpact(BigDecimal::from(-1)),
                ErrorKind::PriceImpact,
            ),
            (SwapError::BisectionDiverged(150), ErrorKind::Solver),
            (
                SwapError::NonPositiveSolution(BigDecimal::from(-1)),
                ErrorKind::Solver,
            ),
            (SwapError::PoolNotFound("P1".to_string()), ErrorKind::Graph),
            (
                SwapError::StaleVersion { current: 2, new: 1 },
                ErrorKind::Snapshot,
            ),
        ] {
            assert_eq!(error.kind(), expected);
        }
    }
}
