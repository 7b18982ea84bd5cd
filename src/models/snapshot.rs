use std::fs;
use std::path::Path;

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::models::pool::Pool;
use crate::models::token::Token;
use crate::routes::calculator::SwapRoutesCalculator;

/// Pool and token state captured at one point in time.
///
/// ```json
/// {
///   "version": 1,
///   "tokens": [{ "address": "A", "decimals": 6 }],
///   "pools": [{ "address": "P1", "token0": "A", "token1": "B",
///               "reserve0": 100, "reserve1": 200,
///               "lp_fee": "0.01", "dao_fee": "0.02" }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Monotonically increasing snapshot version
    pub version: u64,
    /// Every token the pools trade
    pub tokens: Vec<Token>,
    /// Pools in the order they are searched
    pub pools: Vec<Pool>,
}

impl Snapshot {
    /// Reads a snapshot from a JSON file.
    ///
    /// # Errors
    /// * If the file can not be read or is not a valid snapshot
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read snapshot {}", path.display()))?;
        Self::from_json(&contents)
            .wrap_err_with(|| format!("Failed to parse snapshot {}", path.display()))
    }

    /// Parses a snapshot from JSON.
    ///
    /// # Errors
    /// * If the JSON is not a valid snapshot
    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// A route calculator over this snapshot
    #[must_use]
    pub fn into_calculator(self) -> SwapRoutesCalculator {
        SwapRoutesCalculator::new(self.pools, self.tokens, self.version)
    }
}
