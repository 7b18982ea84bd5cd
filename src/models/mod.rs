/// Liquidity pools and their stableswap parameters
pub mod pool;
/// Pool and token snapshot files
pub mod snapshot;
/// Tokens and their decimals
pub mod token;
