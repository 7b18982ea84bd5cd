//! Stableswap curve.
//!
//! With `x = pool0`, `y = pool1 * price_of_token1` (token1 priced in token0),
//! invariant `d` and `γ = gamma1` while `x <= y`, `gamma2` otherwise:
//!
//! ```text
//! χ = alpha * (4xy / d²)^γ
//! χ·d·(x + y) + x·y − χ·d² − d²/4 = 0
//! ```
//!
//! Far from equilibrium `χ` vanishes and the curve degrades to `xy = d²/4`;
//! close to it the curve flattens towards a constant sum. Neither the invariant
//! nor one side given the other has a closed form, so both go through
//! [`InvariantSolver`] in normalised coordinates.
//!
//! A [`StableCurve`] is a value: simulations never change it, and
//! [`StableCurve::execute`] returns the post-trade curve instead of mutating.

use bigdecimal::{BigDecimal, One, Signed, Zero};

use crate::curves::Direction;
use crate::error::SwapError;
use crate::math::decimal::{pow, sqrt, working};
use crate::math::solver::{InvariantSolver, LowerBound, Solution};
use crate::models::pool::StableParams;

/// One stableswap pool in human-readable units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StableCurve {
    /// Token0 held by the pool
    pool0_size: BigDecimal,
    /// Token1 held by the pool
    pool1_size: BigDecimal,
    /// Value of one token1 in token0
    price_of_token1: BigDecimal,
    /// Flatness of the curve
    alpha: BigDecimal,
    /// Exponent while pool0 <= pool1 in token0 units
    gamma1: BigDecimal,
    /// Exponent while pool0 > pool1 in token0 units
    gamma2: BigDecimal,
    /// LP fee rate, stays in the pool
    lp_fee: BigDecimal,
    /// DAO fee rate, leaves the pool
    dao_fee: BigDecimal,
    /// Inputs at or below this are rejected for 0>1
    min_trade_size_0_for_1: BigDecimal,
    /// Inputs at or below this are rejected for 1>0
    min_trade_size_1_for_0: BigDecimal,
    /// Largest accepted price impact in percent
    price_impact_limit: BigDecimal,
    /// Root of the invariant function for the current sizes and price
    invariant: BigDecimal,
    /// Solver iterations spent on `invariant`
    invariant_iterations: u32,
    /// Root finder settings
    solver: InvariantSolver,
}

/// Outcome of a simulated stableswap trade, forward or reverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeResult {
    /// Direction of the trade
    pub direction: Direction,
    /// Amount paid into the pool
    pub trade_input: BigDecimal,
    /// Amount received after fees
    pub trade_return: BigDecimal,
    /// Amount leaving the curve before fees
    pub gross_return: BigDecimal,
    /// LP share of the fee, kept by the pool
    pub lp_fee_amount: BigDecimal,
    /// DAO share of the fee
    pub dao_fee_amount: BigDecimal,
    /// Price impact in percent
    pub price_impact: BigDecimal,
    /// Pool0 size once the trade is executed
    pub new_pool0_size: BigDecimal,
    /// Pool1 size once the trade is executed
    pub new_pool1_size: BigDecimal,
    /// Solver iterations spent on the trade itself
    pub iterations: u32,
}

impl StableCurve {
    /// Builds the curve and solves its invariant.
    ///
    /// # Arguments
    /// * `pool0_size` - Token0 reserve in human-readable units
    /// * `pool1_size` - Token1 reserve in human-readable units
    /// * `params` - Curve parameters of the pool
    /// * `lp_fee` - LP fee rate
    /// * `dao_fee` - DAO fee rate
    ///
    /// # Errors
    /// * `InvalidPool` for non-positive sizes or price, `alpha <= 0`, a gamma
    ///   below one, or fees of 100% or more
    /// * Any solver error while finding the invariant
    pub fn new(
        pool0_size: BigDecimal,
        pool1_size: BigDecimal,
        params: &StableParams,
        lp_fee: BigDecimal,
        dao_fee: BigDecimal,
    ) -> Result<Self, SwapError> {
        let mut curve = Self::unsolved(pool0_size, pool1_size, params, lp_fee, dao_fee)?;
        curve.recompute_invariant()?;
        Ok(curve)
    }

    /// Builds the curve around an invariant solved earlier for the same state.
    ///
    /// # Errors
    /// * `InvalidPool` under the same conditions as [`StableCurve::new`]
    pub fn with_invariant(
        pool0_size: BigDecimal,
        pool1_size: BigDecimal,
        params: &StableParams,
        lp_fee: BigDecimal,
        dao_fee: BigDecimal,
        (invariant, invariant_iterations): (BigDecimal, u32),
    ) -> Result<Self, SwapError> {
        let mut curve = Self::unsolved(pool0_size, pool1_size, params, lp_fee, dao_fee)?;
        curve.invariant = invariant;
        curve.invariant_iterations = invariant_iterations;
        Ok(curve)
    }

    /// Validated state with a placeholder invariant.
    fn unsolved(
        pool0_size: BigDecimal,
        pool1_size: BigDecimal,
        params: &StableParams,
        lp_fee: BigDecimal,
        dao_fee: BigDecimal,
    ) -> Result<Self, SwapError> {
        let one = BigDecimal::one();
        let problem = if !pool0_size.is_positive() || !pool1_size.is_positive() {
            Some(format!("pool sizes {pool0_size} / {pool1_size} must be positive"))
        } else if !params.price_ratio.is_positive() {
            Some(format!("price ratio {} must be positive", params.price_ratio))
        } else if !params.alpha.is_positive() {
            Some(format!("alpha {} must be positive", params.alpha))
        } else if params.gamma1 < one || params.gamma2 < one {
            Some(format!(
                "gammas {} / {} must be at least one",
                params.gamma1, params.gamma2
            ))
        } else if &lp_fee + &dao_fee >= one || lp_fee.is_negative() || dao_fee.is_negative() {
            Some(format!("fees {lp_fee} + {dao_fee} out of range"))
        } else {
            None
        };
        if let Some(problem) = problem {
            return Err(SwapError::InvalidPool(problem));
        }

        Ok(Self {
            pool0_size,
            pool1_size,
            price_of_token1: params.price_ratio.clone(),
            alpha: params.alpha.clone(),
            gamma1: params.gamma1.clone(),
            gamma2: params.gamma2.clone(),
            lp_fee,
            dao_fee,
            min_trade_size_0_for_1: params.min_trade_size_0_for_1.clone(),
            min_trade_size_1_for_0: params.min_trade_size_1_for_0.clone(),
            price_impact_limit: params.price_impact_limit.clone(),
            invariant: BigDecimal::zero(),
            invariant_iterations: 0,
            solver: InvariantSolver::default(),
        })
    }

    /// Current invariant `d`
    #[must_use]
    pub const fn invariant(&self) -> &BigDecimal {
        &self.invariant
    }

    /// Iterations it took to solve the current invariant
    #[must_use]
    pub const fn invariant_iterations(&self) -> u32 {
        self.invariant_iterations
    }

    /// Token0 reserve
    #[must_use]
    pub const fn pool0_size(&self) -> &BigDecimal {
        &self.pool0_size
    }

    /// Token1 reserve
    #[must_use]
    pub const fn pool1_size(&self) -> &BigDecimal {
        &self.pool1_size
    }

    /// Value of one token1 in token0
    #[must_use]
    pub const fn price_of_token1(&self) -> &BigDecimal {
        &self.price_of_token1
    }

    /// Total value locked, in token0
    #[must_use]
    pub fn total_tvl(&self) -> BigDecimal {
        &self.pool0_size + self.pool1_in_units0()
    }

    /// `2 * sqrt(pool0 * pool1_in_units0)`, the invariant of the pure
    /// constant product limit and a lower bound on the real one.
    ///
    /// # Errors
    /// * `InvalidPool` if the product is negative
    pub fn geometric_mean_doubled(&self) -> Result<BigDecimal, SwapError> {
        let product = &self.pool0_size * self.pool1_in_units0();
        Ok(BigDecimal::from(2) * sqrt(&product)?)
    }

    /// Pool1 expressed in token0
    fn pool1_in_units0(&self) -> BigDecimal {
        &self.pool1_size * &self.price_of_token1
    }

    /// Exponent for the side of equilibrium the pool sits on.
    fn gamma(&self, pool0: &BigDecimal, pool1_in_units0: &BigDecimal) -> &BigDecimal {
        if pool0 <= pool1_in_units0 {
            &self.gamma1
        } else {
            &self.gamma2
        }
    }

    /// Solves the invariant for the current state, in `δ = d / tvl` space.
    fn solve_invariant(&self) -> Result<Solution, SwapError> {
        let tvl = self.total_tvl();
        let x = working(&(&self.pool0_size / &tvl));
        let y = working(&(self.pool1_in_units0() / &tvl));
        let xy = working(&(&x * &y));
        let gamma = self.gamma(&x, &y);
        let quarter = BigDecimal::one() / BigDecimal::from(4);

        let chi = |delta: &BigDecimal| -> Result<BigDecimal, SwapError> {
            if !delta.is_positive() {
                return Err(SwapError::InvalidPool(format!(
                    "invariant ratio {delta} must be positive"
                )));
            }
            let k = working(&(BigDecimal::from(4) * &xy / (delta * delta)));
            Ok(working(&(&self.alpha * pow(&k, gamma)?)))
        };
        let f = |delta: &BigDecimal| -> Result<BigDecimal, SwapError> {
            let chi = chi(delta)?;
            Ok(working(
                &(&chi / delta + &xy / (delta * delta) - &chi - &quarter),
            ))
        };
        let df = |delta: &BigDecimal| -> Result<BigDecimal, SwapError> {
            let chi = chi(delta)?;
            let squared = delta * delta;
            let cubed = &squared * delta;
            let two_gamma_chi = BigDecimal::from(2) * gamma * &chi;
            Ok(working(
                &(&two_gamma_chi / delta
                    - (&two_gamma_chi + &chi) / &squared
                    - BigDecimal::from(2) * &xy / cubed),
            ))
        };
        let lower = LowerBound::Lazy(Box::new(|| {
            Ok(working(&(self.geometric_mean_doubled()? / &tvl)))
        }));

        let one = BigDecimal::one();
        let solution = self.solver.find_root(f, df, &one, lower, &one, true)?;
        Ok(Solution {
            root: working(&(solution.root * &tvl)),
            iterations: solution.iterations,
        })
    }

    /// Solves for the side that is not `known`, in `u = known / d`,
    /// `v = unknown / d` space. Both sides are in token0 units.
    fn solve_other_side(&self, known: &BigDecimal, known_is_pool0: bool) -> Result<Solution, SwapError> {
        if !known.is_positive() {
            return Err(SwapError::InsufficientLiquidity);
        }
        let d = &self.invariant;
        let u = working(&(known / d));
        let four_u = BigDecimal::from(4) * &u;
        let quarter = BigDecimal::one() / BigDecimal::from(4);
        let one = BigDecimal::one();

        let gamma = |v: &BigDecimal| {
            if known_is_pool0 {
                self.gamma(&u, v)
            } else {
                self.gamma(v, &u)
            }
        };
        let f = |v: &BigDecimal| -> Result<BigDecimal, SwapError> {
            let chi = working(&(&self.alpha * pow(&working(&(&four_u * v)), gamma(v))?));
            Ok(working(&(chi * (&u + v - &one) + &u * v - &quarter)))
        };
        let df = |v: &BigDecimal| -> Result<BigDecimal, SwapError> {
            let gamma = gamma(v);
            let base = working(&(&four_u * v));
            let chi = working(&(&self.alpha * pow(&base, gamma)?));
            let chi_slope = working(&(&self.alpha * gamma * pow(&base, &(gamma - &one))? * &four_u));
            Ok(working(&(chi_slope * (&u + v - &one) + chi + &u)))
        };

        // Starts from the known side. That is also an upper bound while the
        // known side is the larger one; otherwise the unknown side can only
        // reach `xy = d²/4`.
        let hyperbola = working(&(&one / &four_u));
        let upper = if u >= hyperbola { u.clone() } else { hyperbola };
        let solution = self.solver.find_root(
            f,
            df,
            &u,
            LowerBound::Eager(BigDecimal::zero()),
            &upper,
            false,
        )?;
        if !solution.root.is_positive() {
            return Err(SwapError::NonPositiveSolution(solution.root));
        }
        Ok(Solution {
            root: working(&(solution.root * d)),
            iterations: solution.iterations,
        })
    }

    /// Pool1 size, in token0 units, that keeps the invariant for `pool0_size`.
    ///
    /// # Errors
    /// * `InsufficientLiquidity` for a non-positive `pool0_size`
    /// * Any solver error
    pub fn solve_for_pool1_size(&self, pool0_size: &BigDecimal) -> Result<Solution, SwapError> {
        self.solve_other_side(pool0_size, true)
    }

    /// Pool0 size that keeps the invariant for a pool1 size given in token0
    /// units.
    ///
    /// # Errors
    /// * `InsufficientLiquidity` for a non-positive `pool1_size_in_units0`
    /// * Any solver error
    pub fn solve_for_pool0_size(
        &self,
        pool1_size_in_units0: &BigDecimal,
    ) -> Result<Solution, SwapError> {
        self.solve_other_side(pool1_size_in_units0, false)
    }

    /// Marginal price of token1 in token0: the negative slope of the curve at
    /// the current sizes, scaled back to token1 units.
    ///
    /// # Errors
    /// * `InvalidPool` if the curve is degenerate at the current state
    pub fn price_token1(&self) -> Result<BigDecimal, SwapError> {
        let x = &self.pool0_size;
        let y = self.pool1_in_units0();
        let d = &self.invariant;
        let gamma = self.gamma(x, &y);
        let k = working(&(BigDecimal::from(4) * x * &y / (d * d)));
        let chi = working(&(&self.alpha * pow(&k, gamma)?));
        let shared = working(&(d * (x + &y - d)));
        let chi_d = &chi * d;

        let slope_x = working(&(gamma * &chi / x * &shared + &chi_d + &y));
        let slope_y = working(&(gamma * &chi / &y * &shared + &chi_d + x));
        if slope_x.is_zero() {
            return Err(SwapError::InvalidPool("curve has a vertical tangent".to_string()));
        }
        Ok(working(&(&self.price_of_token1 * slope_y / slope_x)))
    }

    /// Marginal price of token0 in token1.
    ///
    /// # Errors
    /// * `InvalidPool` if the curve is degenerate at the current state
    pub fn price_token0(&self) -> Result<BigDecimal, SwapError> {
        let price = self.price_token1()?;
        if price.is_zero() {
            return Err(SwapError::InvalidPool("token1 has zero price".to_string()));
        }
        Ok(working(&(BigDecimal::one() / price)))
    }

    /// Price impact in percent of selling `input` token0, before any limit check.
    ///
    /// # Errors
    /// * `NonPositiveTrade`, `BelowMinimumTrade`, or any solver error
    pub fn price_impact_forward_0_to_1(&self, input: &BigDecimal) -> Result<BigDecimal, SwapError> {
        let (gross, _) = self.gross_forward(Direction::ZeroForOne, input)?;
        self.price_impact(Direction::ZeroForOne, input, &gross)
    }

    /// Price impact in percent of selling `input` token1, before any limit check.
    ///
    /// # Errors
    /// * `NonPositiveTrade`, `BelowMinimumTrade`, or any solver error
    pub fn price_impact_forward_1_to_0(&self, input: &BigDecimal) -> Result<BigDecimal, SwapError> {
        let (gross, _) = self.gross_forward(Direction::OneForZero, input)?;
        self.price_impact(Direction::OneForZero, input, &gross)
    }

    /// Sells `input` token0 for token1.
    ///
    /// # Errors
    /// * `NonPositiveTrade` / `BelowMinimumTrade` for too small an input
    /// * `PriceImpactLimit` / `NegativePriceImpact` for an impact outside
    ///   `[0, limit]`
    /// * Any solver error
    pub fn simulate_forward_0_to_1(&self, input: &BigDecimal) -> Result<TradeResult, SwapError> {
        self.simulate_forward(Direction::ZeroForOne, input)
    }

    /// Sells `input` token1 for token0.
    ///
    /// # Errors
    /// Same as [`StableCurve::simulate_forward_0_to_1`].
    pub fn simulate_forward_1_to_0(&self, input: &BigDecimal) -> Result<TradeResult, SwapError> {
        self.simulate_forward(Direction::OneForZero, input)
    }

    /// Token0 input needed to receive `output` token1 after fees.
    ///
    /// # Errors
    /// * `NonPositiveTrade` for a non-positive `output`
    /// * `InsufficientLiquidity` if the gross output drains pool1
    /// * The validations of [`StableCurve::simulate_forward_0_to_1`] on the
    ///   implied input
    pub fn simulate_reverse_0_to_1(&self, output: &BigDecimal) -> Result<TradeResult, SwapError> {
        self.simulate_reverse(Direction::ZeroForOne, output)
    }

    /// Token1 input needed to receive `output` token0 after fees.
    ///
    /// # Errors
    /// Same as [`StableCurve::simulate_reverse_0_to_1`].
    pub fn simulate_reverse_1_to_0(&self, output: &BigDecimal) -> Result<TradeResult, SwapError> {
        self.simulate_reverse(Direction::OneForZero, output)
    }

    /// Sells `input` in the given direction.
    ///
    /// # Errors
    /// Same as [`StableCurve::simulate_forward_0_to_1`].
    pub fn simulate_forward(
        &self,
        direction: Direction,
        input: &BigDecimal,
    ) -> Result<TradeResult, SwapError> {
        let (gross, solution) = self.gross_forward(direction, input)?;
        self.settle(direction, input.clone(), gross, solution.iterations)
    }

    /// Input needed to receive `output` in the given direction.
    ///
    /// # Errors
    /// Same as [`StableCurve::simulate_reverse_0_to_1`].
    pub fn simulate_reverse(
        &self,
        direction: Direction,
        output: &BigDecimal,
    ) -> Result<TradeResult, SwapError> {
        if !output.is_positive() {
            return Err(SwapError::NonPositiveTrade);
        }
        let gross = working(&(output / (BigDecimal::one() - &self.lp_fee - &self.dao_fee)));

        let (input, solution) = match direction {
            Direction::ZeroForOne => {
                if gross >= self.pool1_size {
                    return Err(SwapError::InsufficientLiquidity);
                }
                let remaining = (&self.pool1_size - &gross) * &self.price_of_token1;
                let solution = self.solve_for_pool0_size(&remaining)?;
                (working(&(&solution.root - &self.pool0_size)), solution)
            }
            Direction::OneForZero => {
                if gross >= self.pool0_size {
                    return Err(SwapError::InsufficientLiquidity);
                }
                let solution = self.solve_for_pool1_size(&(&self.pool0_size - &gross))?;
                let pool1 = working(&(&solution.root / &self.price_of_token1));
                (working(&(pool1 - &self.pool1_size)), solution)
            }
        };
        self.check_trade_size(direction, &input)?;
        self.settle(direction, input, gross, solution.iterations)
    }

    /// The post-trade curve, with its invariant recomputed.
    ///
    /// # Errors
    /// * `InvalidPool` if the trade leaves a side empty
    /// * Any solver error
    pub fn execute(&self, trade: &TradeResult) -> Result<Self, SwapError> {
        if !trade.new_pool0_size.is_positive() || !trade.new_pool1_size.is_positive() {
            return Err(SwapError::InvalidPool(format!(
                "trade leaves pool sizes {} / {}",
                trade.new_pool0_size, trade.new_pool1_size
            )));
        }
        let mut next = self.clone();
        next.pool0_size = trade.new_pool0_size.clone();
        next.pool1_size = trade.new_pool1_size.clone();
        next.recompute_invariant()?;
        Ok(next)
    }

    /// The curve under a new token1 price, with its invariant recomputed.
    ///
    /// # Errors
    /// * `InvalidPool` for a non-positive price
    /// * Any solver error
    pub fn with_price_of_token1(&self, price: BigDecimal) -> Result<Self, SwapError> {
        if !price.is_positive() {
            return Err(SwapError::InvalidPool(format!(
                "price ratio {price} must be positive"
            )));
        }
        let mut next = self.clone();
        next.price_of_token1 = price;
        next.recompute_invariant()?;
        Ok(next)
    }

    /// Re-solves the invariant for the current state.
    fn recompute_invariant(&mut self) -> Result<(), SwapError> {
        let solution = self.solve_invariant()?;
        self.invariant = solution.root;
        self.invariant_iterations = solution.iterations;
        Ok(())
    }

    /// Rejects non-positive inputs and inputs at or below the pool minimum.
    fn check_trade_size(&self, direction: Direction, input: &BigDecimal) -> Result<(), SwapError> {
        let min = match direction {
            Direction::ZeroForOne => &self.min_trade_size_0_for_1,
            Direction::OneForZero => &self.min_trade_size_1_for_0,
        };
        if !input.is_positive() {
            Err(SwapError::NonPositiveTrade)
        } else if input <= min {
            Err(SwapError::BelowMinimumTrade { min: min.clone() })
        } else {
            Ok(())
        }
    }

    /// Gross output of selling `input`, with the solve that produced it.
    fn gross_forward(
        &self,
        direction: Direction,
        input: &BigDecimal,
    ) -> Result<(BigDecimal, Solution), SwapError> {
        self.check_trade_size(direction, input)?;
        let (gross, available, solution) = match direction {
            Direction::ZeroForOne => {
                let solution = self.solve_for_pool1_size(&(&self.pool0_size + input))?;
                let pool1 = working(&(&solution.root / &self.price_of_token1));
                (working(&(&self.pool1_size - pool1)), &self.pool1_size, solution)
            }
            Direction::OneForZero => {
                let pool1 = (&self.pool1_size + input) * &self.price_of_token1;
                let solution = self.solve_for_pool0_size(&pool1)?;
                let gross = working(&(&self.pool0_size - &solution.root));
                (gross, &self.pool0_size, solution)
            }
        };
        if !gross.is_positive() {
            return Err(SwapError::NonPositiveSolution(gross));
        }
        if gross >= *available {
            return Err(SwapError::InsufficientLiquidity);
        }
        Ok((gross, solution))
    }

    /// `(paid_price / market_price - 1) * 100`, fees excluded.
    fn price_impact(
        &self,
        direction: Direction,
        input: &BigDecimal,
        gross: &BigDecimal,
    ) -> Result<BigDecimal, SwapError> {
        if !gross.is_positive() {
            return Err(SwapError::NonPositiveSolution(gross.clone()));
        }
        let price_token1 = self.price_token1()?;
        let ratio = match direction {
            Direction::ZeroForOne => input / gross / price_token1,
            Direction::OneForZero => input / gross * price_token1,
        };
        Ok(working(&((ratio - BigDecimal::one()) * BigDecimal::from(100))))
    }

    /// Checks the impact band and splits fees off the gross output.
    fn settle(
        &self,
        direction: Direction,
        input: BigDecimal,
        gross: BigDecimal,
        iterations: u32,
    ) -> Result<TradeResult, SwapError> {
        let price_impact = self.price_impact(direction, &input, &gross)?;
        if price_impact.is_negative() {
            return Err(SwapError::NegativePriceImpact(price_impact));
        }
        if price_impact > self.price_impact_limit {
            return Err(SwapError::PriceImpactLimit {
                impact: price_impact,
                limit: self.price_impact_limit.clone(),
            });
        }

        let lp_fee_amount = working(&(&gross * &self.lp_fee));
        let dao_fee_amount = working(&(&gross * &self.dao_fee));
        let trade_return = &gross - &lp_fee_amount - &dao_fee_amount;
        let (new_pool0_size, new_pool1_size) = match direction {
            Direction::ZeroForOne => (
                &self.pool0_size + &input,
                &self.pool1_size - &gross + &lp_fee_amount,
            ),
            Direction::OneForZero => (
                &self.pool0_size - &gross + &lp_fee_amount,
                &self.pool1_size + &input,
            ),
        };

        Ok(TradeResult {
            direction,
            trade_input: input,
            trade_return,
            gross_return: gross,
            lp_fee_amount,
            dao_fee_amount,
            price_impact,
            new_pool0_size,
            new_pool1_size,
            iterations,
        })
    }
}
