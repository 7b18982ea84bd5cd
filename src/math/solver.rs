//! Newton-Raphson root finder with a bisection fallback.
//!
//! The stableswap curve has no closed form for its invariant or for one pool
//! side given the other, so both are found numerically. Newton converges in a
//! handful of steps on well-behaved pools; when it can not (flat derivative,
//! no convergence, or a negative root where only a positive one makes sense)
//! the solver brackets the root and bisects.
//!
//! Every solution carries the number of iterations it took. On-chain the same
//! search is repeated, so the count feeds gas estimation.

use std::fmt::{self, Debug};

use bigdecimal::{BigDecimal, Signed, Zero};
use log::debug;

use crate::error::SwapError;
use crate::math::decimal::working;
use crate::utils::constants::{MAX_ITER_BISECT, MAX_ITER_NEWTON, SOLVER_EPSILON_EXPONENT};

/// A root and the iterations spent finding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// The root of the function
    pub root: BigDecimal,
    /// Newton plus bisection iterations consumed
    pub iterations: u32,
}

/// Lower bound of the bisection bracket.
///
/// Some lower bounds are expensive (a square root over the pool sizes) and only
/// needed when Newton fails, so they may be handed over as a closure.
pub enum LowerBound<'a> {
    /// A bound that is already known
    Eager(BigDecimal),
    /// A bound computed only if bisection actually runs
    Lazy(Box<dyn FnOnce() -> Result<BigDecimal, SwapError> + 'a>),
}

impl LowerBound<'_> {
    /// Evaluates the bound.
    fn resolve(self) -> Result<BigDecimal, SwapError> {
        match self {
            Self::Eager(bound) => Ok(bound),
            Self::Lazy(compute) => compute(),
        }
    }
}

impl Debug for LowerBound<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eager(bound) => write!(f, "Eager({bound})"),
            Self::Lazy(_) => write!(f, "Lazy(..)"),
        }
    }
}

/// Root finder configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantSolver {
    /// Newton iterations before giving up
    pub max_iter_newton: u32,
    /// Bisection halvings before giving up
    pub max_iter_bisect: u32,
    /// Convergence tolerance on the step size
    pub epsilon: BigDecimal,
}

impl Default for InvariantSolver {
    fn default() -> Self {
        Self {
            max_iter_newton: MAX_ITER_NEWTON,
            max_iter_bisect: MAX_ITER_BISECT,
            epsilon: BigDecimal::new(1.into(), SOLVER_EPSILON_EXPONENT),
        }
    }
}

impl InvariantSolver {
    /// Finds a root of `f`, trying Newton from `initial_guess` first and
    /// bisecting over `[lower, upper]` if that fails.
    ///
    /// With `reject_negative`, a negative Newton root counts as a failure.
    ///
    /// # Errors
    /// * Any error from `f` during bisection
    /// * `BisectionSigns` if `f(lower)` and `f(upper)` share a sign
    /// * `BisectionDiverged` if bisection runs out of iterations
    pub fn find_root<F, D>(
        &self,
        f: F,
        df: D,
        initial_guess: &BigDecimal,
        lower: LowerBound<'_>,
        upper: &BigDecimal,
        reject_negative: bool,
    ) -> Result<Solution, SwapError>
    where
        F: Fn(&BigDecimal) -> Result<BigDecimal, SwapError>,
        D: Fn(&BigDecimal) -> Result<BigDecimal, SwapError>,
    {
        let (newton, newton_iterations) = self.run_newton(&f, &df, initial_guess);
        let failure = match newton {
            Ok(root) if reject_negative && root.is_negative() => {
                SwapError::NewtonMethod(format!("converged to negative root {root}"))
            }
            Ok(root) => {
                return Ok(Solution {
                    root,
                    iterations: newton_iterations,
                })
            }
            Err(e) => e,
        };
        debug!("{failure}, falling back to bisection");

        let lower = lower.resolve()?;
        let bisection = self.bisect(&f, &lower, upper)?;
        Ok(Solution {
            root: bisection.root,
            iterations: newton_iterations + bisection.iterations,
        })
    }

    /// Newton-Raphson alone.
    ///
    /// # Errors
    /// * `NewtonMethod` if the derivative is ever zero, `f` fails, or the
    ///   iterations run out
    pub fn newton<F, D>(
        &self,
        f: &F,
        df: &D,
        initial_guess: &BigDecimal,
    ) -> Result<Solution, SwapError>
    where
        F: Fn(&BigDecimal) -> Result<BigDecimal, SwapError>,
        D: Fn(&BigDecimal) -> Result<BigDecimal, SwapError>,
    {
        let (root, iterations) = self.run_newton(f, df, initial_guess);
        root.map(|root| Solution { root, iterations })
    }

    /// Newton iterations, returning the outcome with the iterations consumed
    /// whether it converged or not.
    fn run_newton<F, D>(
        &self,
        f: &F,
        df: &D,
        initial_guess: &BigDecimal,
    ) -> (Result<BigDecimal, SwapError>, u32)
    where
        F: Fn(&BigDecimal) -> Result<BigDecimal, SwapError>,
        D: Fn(&BigDecimal) -> Result<BigDecimal, SwapError>,
    {
        let mut x = initial_guess.clone();
        for iteration in 1..=self.max_iter_newton {
            let step = match (f(&x), df(&x)) {
                (Ok(_), Ok(slope)) if slope.is_zero() => {
                    return (
                        Err(SwapError::NewtonMethod(format!("derivative is zero at {x}"))),
                        iteration,
                    )
                }
                (Ok(value), Ok(slope)) => value / slope,
                (Err(e), _) | (_, Err(e)) => {
                    return (Err(SwapError::NewtonMethod(e.to_string())), iteration)
                }
            };
            let next = working(&(&x - step));
            if (&next - &x).abs() <= self.epsilon {
                return (Ok(next), iteration);
            }
            x = next;
        }
        (
            Err(SwapError::NewtonMethod(format!(
                "did not converge after {} iterations",
                self.max_iter_newton
            ))),
            self.max_iter_newton,
        )
    }

    /// Bisection over `[lower, upper]`.
    ///
    /// # Errors
    /// * Any error from `f`
    /// * `BisectionSigns` if `f(lower)` and `f(upper)` share a sign
    /// * `BisectionDiverged` if the iterations run out
    pub fn bisect<F>(
        &self,
        f: &F,
        lower: &BigDecimal,
        upper: &BigDecimal,
    ) -> Result<Solution, SwapError>
    where
        F: Fn(&BigDecimal) -> Result<BigDecimal, SwapError>,
    {
        let mut low_value = f(lower)?;
        let high_value = f(upper)?;
        if low_value.is_zero() {
            return Ok(Solution {
                root: lower.clone(),
                iterations: 0,
            });
        }
        if high_value.is_zero() {
            return Ok(Solution {
                root: upper.clone(),
                iterations: 0,
            });
        }
        if low_value.is_positive() == high_value.is_positive() {
            return Err(SwapError::BisectionSigns);
        }

        let two = BigDecimal::from(2);
        let mut low = lower.clone();
        let mut high = upper.clone();
        for iteration in 1..=self.max_iter_bisect {
            let half_width = working(&((&high - &low) / &two));
            let mid = working(&(&low + &half_width));
            let mid_value = f(&mid)?;
            if mid_value.is_zero() || half_width.abs() < self.epsilon {
                return Ok(Solution {
                    root: mid,
                    iterations: iteration,
                });
            }
            if mid_value.is_positive() == low_value.is_positive() {
                low = mid;
                low_value = mid_value;
            } else {
                high = mid;
            }
        }
        Err(SwapError::BisectionDiverged(self.max_iter_bisect))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;
    use std::str::FromStr;

    use super::*;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    fn square_minus(target: &'static str) -> impl Fn(&BigDecimal) -> Result<BigDecimal, SwapError> {
        move |x: &BigDecimal| Ok(x * x - dec(target))
    }

    fn double(x: &BigDecimal) -> Result<BigDecimal, SwapError> {
        Ok(x * BigDecimal::from(2))
    }

    #[test]
    fn test_newton_sqrt_two() {
        let solver = InvariantSolver::default();
        let solution = solver
            .newton(&square_minus("2"), &double, &dec("1"))
            .unwrap();
        assert!((&solution.root * &solution.root - dec("2")).abs() < dec("1e-30"));
        assert!(solution.iterations > 1 && solution.iterations < 10);
    }

    #[test]
    fn test_newton_zero_derivative() {
        let solver = InvariantSolver::default();
        let result = solver.newton(&square_minus("2"), &double, &dec("0"));
        assert!(matches!(result, Err(SwapError::NewtonMethod(_))));
    }

    #[test]
    fn test_newton_iteration_limit() {
        let solver = InvariantSolver {
            max_iter_newton: 2,
            ..InvariantSolver::default()
        };
        let result = solver.newton(&square_minus("2"), &double, &dec("1000"));
        assert_eq!(
            result.err().unwrap().to_string(),
            "Newton method failed: did not converge after 2 iterations"
        );
    }

    #[test]
    fn test_bisect_signs() {
        let solver = InvariantSolver::default();
        let result = solver.bisect(&square_minus("2"), &dec("2"), &dec("3"));
        assert_eq!(result.err().unwrap(), SwapError::BisectionSigns);
    }

    #[test]
    fn test_bisect_exact_endpoint() {
        let solver = InvariantSolver::default();
        let solution = solver
            .bisect(&square_minus("4"), &dec("2"), &dec("3"))
            .unwrap();
        assert_eq!(solution.root, dec("2"));
        assert_eq!(solution.iterations, 0);
    }

    #[test]
    fn test_bisect_converges() {
        let solver = InvariantSolver::default();
        let solution = solver
            .bisect(&square_minus("2"), &dec("0"), &dec("2"))
            .unwrap();
        assert!((&solution.root * &solution.root - dec("2")).abs() < dec("1e-18"));
        assert!(solution.iterations > 50);
    }

    #[test]
    fn test_lazy_lower_bound_skipped_when_newton_converges() {
        let solver = InvariantSolver::default();
        let called = Cell::new(false);
        let solution = solver
            .find_root(
                square_minus("9"),
                double,
                &dec("5"),
                LowerBound::Lazy(Box::new(|| {
                    called.set(true);
                    Ok(dec("0"))
                })),
                &dec("5"),
                true,
            )
            .unwrap();
        assert!((solution.root - dec("3")).abs() < dec("1e-30"));
        assert!(!called.get());
    }

    #[test]
    fn test_negative_root_falls_back_to_bisection() {
        let solver = InvariantSolver::default();
        let called = Cell::new(false);
        let solution = solver
            .find_root(
                square_minus("4"),
                double,
                &dec("-1"),
                LowerBound::Lazy(Box::new(|| {
                    called.set(true);
                    Ok(dec("0"))
                })),
                &dec("10"),
                true,
            )
            .unwrap();
        assert!(called.get());
        assert!((&solution.root - dec("2")).abs() < dec("1e-18"));
    }

    #[test]
    fn test_negative_root_accepted_when_allowed() {
        let solver = InvariantSolver::default();
        let solution = solver
            .find_root(
                square_minus("4"),
                double,
                &dec("-1"),
                LowerBound::Eager(dec("0")),
                &dec("10"),
                false,
            )
            .unwrap();
        assert!((solution.root + dec("2")).abs() < dec("1e-30"));
    }
}
