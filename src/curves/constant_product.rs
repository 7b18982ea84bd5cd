//! Constant product (`x * y = k`) swap algebra.
//!
//! Closed form in both directions, no iteration. Fees are taken from the gross
//! output; price impact compares the realised price against the pool's spot
//! price and ignores fees.

use bigdecimal::{BigDecimal, One, Signed, Zero};

use crate::error::SwapError;

/// A constant product pool oriented for one swap direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantProductCurve {
    /// Reserve of the token sold into the pool
    pub reserve_in: BigDecimal,
    /// Reserve of the token bought from the pool
    pub reserve_out: BigDecimal,
    /// Liquidity provider fee rate
    pub lp_fee: BigDecimal,
    /// DAO fee rate
    pub dao_fee: BigDecimal,
}

/// Outcome of a constant product swap, in the same units as the reserves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantProductQuote {
    /// Amount sold into the pool
    pub amount_in: BigDecimal,
    /// Amount received after fees
    pub amount_out: BigDecimal,
    /// Amount leaving the curve before fees
    pub gross_amount_out: BigDecimal,
    /// Liquidity provider fee taken from the gross output
    pub lp_fee_amount: BigDecimal,
    /// DAO fee taken from the gross output
    pub dao_fee_amount: BigDecimal,
    /// `paid_price / market_price - 1`, as a fraction
    pub price_impact: BigDecimal,
}

impl ConstantProductCurve {
    /// Output for a given input.
    ///
    /// # Errors
    /// * `NonPositiveTrade` if `amount_in` is not positive
    /// * `InsufficientLiquidity` if either reserve is empty
    pub fn forward(&self, amount_in: &BigDecimal) -> Result<ConstantProductQuote, SwapError> {
        if !amount_in.is_positive() {
            return Err(SwapError::NonPositiveTrade);
        }
        self.check_reserves()?;

        let k = &self.reserve_in * &self.reserve_out;
        let gross = &self.reserve_out - k / (&self.reserve_in + amount_in);
        Ok(self.quote(amount_in.clone(), gross))
    }

    /// Input required to receive `amount_out` after fees.
    ///
    /// # Errors
    /// * `NonPositiveTrade` if `amount_out` is not positive
    /// * `InvalidPool` if the fees add up to 100% or more
    /// * `InsufficientLiquidity` if the pool can not pay the gross output
    pub fn reverse(&self, amount_out: &BigDecimal) -> Result<ConstantProductQuote, SwapError> {
        if !amount_out.is_positive() {
            return Err(SwapError::NonPositiveTrade);
        }
        self.check_reserves()?;

        let kept = BigDecimal::one() - &self.lp_fee - &self.dao_fee;
        if !kept.is_positive() {
            return Err(SwapError::InvalidPool(format!(
                "fees {} + {} leave nothing to trade",
                self.lp_fee, self.dao_fee
            )));
        }
        let gross = amount_out / kept;
        if gross >= self.reserve_out {
            return Err(SwapError::InsufficientLiquidity);
        }

        let amount_in = &self.reserve_in * &gross / (&self.reserve_out - &gross);
        Ok(self.quote(amount_in, gross))
    }

    /// Price impact of receiving `gross_amount_out` for `amount_in`, as a fraction.
    #[must_use]
    pub fn price_impact(&self, amount_in: &BigDecimal, gross_amount_out: &BigDecimal) -> BigDecimal {
        if gross_amount_out.is_zero() || self.reserve_out.is_zero() {
            return BigDecimal::zero();
        }
        let market_price = &self.reserve_in / &self.reserve_out;
        let paid_price = amount_in / gross_amount_out;
        paid_price / market_price - BigDecimal::one()
    }

    /// Both reserves must be positive
    fn check_reserves(&self) -> Result<(), SwapError> {
        if self.reserve_in.is_positive() && self.reserve_out.is_positive() {
            Ok(())
        } else {
            Err(SwapError::InsufficientLiquidity)
        }
    }

    /// Splits fees off the gross output
    fn quote(&self, amount_in: BigDecimal, gross: BigDecimal) -> ConstantProductQuote {
        let lp_fee_amount = &gross * &self.lp_fee;
        let dao_fee_amount = &gross * &self.dao_fee;
        let amount_out = &gross - &lp_fee_amount - &dao_fee_amount;
        let price_impact = self.price_impact(&amount_in, &gross);
        ConstantProductQuote {
            amount_in,
            amount_out,
            gross_amount_out: gross,
            lp_fee_amount,
            dao_fee_amount,
            price_impact,
        }
    }
}
