use serde::{Deserialize, Serialize};

use crate::routes::types::TokenAddress;

/// A token as the router sees it: a stable address and its decimal precision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// The contract address of the token
    pub address: TokenAddress,
    /// Number of decimals between raw and human-readable amounts
    pub decimals: u32,
}

impl Token {
    /// Create a new token
    #[must_use]
    pub fn new(address: impl Into<TokenAddress>, decimals: u32) -> Self {
        Self {
            address: address.into(),
            decimals,
        }
    }
}
