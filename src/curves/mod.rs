//! # Curves Module
//!
//! Pricing curves for the two pool flavours: closed-form constant product
//! algebra and the stableswap curve, which needs the numerical solver.

use std::fmt::{self, Debug, Display};

use derive_more::Display as DeriveDisplay;
use serde::{Deserialize, Serialize};

/// Constant product (`x * y = k`) algebra
pub mod constant_product;
/// Stableswap curve state and trade simulation
pub mod stable;

/// The direction of a swap in a liquidity pool.
///
/// In a pool with two tokens (token0 and token1), a swap can go in either
/// direction: from token0 to token1 or from token1 to token0.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Direction {
    /// Swap from token0 to token1 in the pool
    ZeroForOne,
    /// Swap from token1 to token0 in the pool
    OneForZero,
}

impl Direction {
    /// The other direction
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::ZeroForOne => Self::OneForZero,
            Self::OneForZero => Self::ZeroForOne,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Debug for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroForOne => write!(f, "0>1"),
            Self::OneForZero => write!(f, "1>0"),
        }
    }
}

/// Which curve prices a pool.
#[derive(Debug, DeriveDisplay, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    /// `x * y = k`
    #[display("constant_product")]
    ConstantProduct,
    /// Stableswap invariant
    #[display("stable")]
    Stable,
}
