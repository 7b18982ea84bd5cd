//! # Math Module
//!
//! Decimal plumbing and the numerical root finder behind the stableswap curve.

/// Raw/human conversions, powers and working precision
pub mod decimal;
/// Newton-Raphson with bisection fallback
pub mod solver;
