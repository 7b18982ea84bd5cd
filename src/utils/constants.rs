/// Maximum Newton-Raphson iterations before falling back to bisection
pub const MAX_ITER_NEWTON: u32 = 80;
/// Maximum bisection halvings
pub const MAX_ITER_BISECT: u32 = 150;
/// Convergence tolerance for the solver is `10^-SOLVER_EPSILON_EXPONENT`, in
/// normalised (dimensionless) units
pub const SOLVER_EPSILON_EXPONENT: i64 = 20;
/// Significant digits kept on intermediate solver arithmetic
pub const WORKING_PRECISION: u64 = 40;

/// Default maximum number of hops for a route search
pub const DEFAULT_MAX_HOPS: usize = 3;

/// Fixed gas overhead of a routed swap
pub const GAS_BASE: u64 = 100_000;
/// Gas for one constant product hop
pub const GAS_CONSTANT_PRODUCT_HOP: u64 = 150_000;
/// Gas for one stableswap hop, before solver iterations
pub const GAS_STABLE_HOP: u64 = 400_000;
/// Gas for one on-chain solver iteration
pub const GAS_PER_ITERATION: u64 = 5_000;
