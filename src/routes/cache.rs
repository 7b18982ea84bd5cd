//! Memoisation for a single snapshot version.
//!
//! Candidate paths overlap heavily: every path out of the start token shares its
//! first hop with its siblings. Hop results are memoised per
//! `(token, pool, raw amount)`, separately for forward and reverse quotes, and
//! failures are memoised too so a dead hop is not recomputed for each path
//! through it. Stable pools additionally memoise their solved invariant.

use std::collections::HashMap;

use bigdecimal::BigDecimal;

use crate::error::SwapError;
use crate::routes::types::{HopQuote, PoolAddress, TokenAddress};

/// Whether a hop is quoted from its input or from its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteMode {
    /// Input amount known, output wanted
    Forward,
    /// Output amount known, input wanted
    Reverse,
}

/// Key of a memoised hop. `token` is the input token for forward quotes and the
/// output token for reverse quotes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HopKey {
    /// Token the amount is denominated in
    pub token: TokenAddress,
    /// Pool traded through
    pub pool: PoolAddress,
    /// Raw amount
    pub amount: u128,
}

impl HopKey {
    /// Create a new hop key
    #[must_use]
    pub fn new(token: &str, pool: &str, amount: u128) -> Self {
        Self {
            token: token.to_string(),
            pool: pool.to_string(),
            amount,
        }
    }
}

/// A memoised hop outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheEntry {
    /// The hop succeeded
    Quote(HopQuote),
    /// The hop failed; the error is kept for logging
    NoRoute(SwapError),
}

impl CacheEntry {
    /// Back into the result it was stored from
    ///
    /// # Errors
    /// * The memoised error for a `NoRoute` entry
    pub fn into_result(self) -> Result<HopQuote, SwapError> {
        match self {
            Self::Quote(quote) => Ok(quote),
            Self::NoRoute(e) => Err(e),
        }
    }
}

impl From<&Result<HopQuote, SwapError>> for CacheEntry {
    fn from(result: &Result<HopQuote, SwapError>) -> Self {
        match result {
            Ok(quote) => Self::Quote(quote.clone()),
            Err(e) => Self::NoRoute(e.clone()),
        }
    }
}

/// Identity of a stable pool state whose invariant has been solved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvariantKey {
    /// Pool address
    pub pool: PoolAddress,
    /// Raw reserve of token0
    pub reserve0: u128,
    /// Raw reserve of token1
    pub reserve1: u128,
}

/// Solved invariants with the iterations they took.
pub type InvariantMemo = HashMap<InvariantKey, (BigDecimal, u32)>;

/// Hop and invariant memo owned by one calculator, valid for one snapshot
/// version.
#[derive(Debug, Clone, Default)]
pub struct RouteCache {
    /// Snapshot version the entries belong to
    version: u64,
    /// Forward hop results
    forward: HashMap<HopKey, CacheEntry>,
    /// Reverse hop results
    reverse: HashMap<HopKey, CacheEntry>,
    /// Solved stable invariants
    invariants: InvariantMemo,
}

impl RouteCache {
    /// Create an empty cache for a snapshot version
    #[must_use]
    pub fn new(version: u64) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Snapshot version the entries belong to
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Drops every entry and moves to a new version.
    pub fn reset(&mut self, version: u64) {
        self.version = version;
        self.forward.clear();
        self.reverse.clear();
        self.invariants.clear();
    }

    /// A memoised hop, if any
    #[must_use]
    pub fn get(&self, mode: QuoteMode, key: &HopKey) -> Option<&CacheEntry> {
        self.hops(mode).get(key)
    }

    /// Memoises a hop outcome, success or failure.
    pub fn insert(&mut self, mode: QuoteMode, key: HopKey, entry: CacheEntry) {
        match mode {
            QuoteMode::Forward => self.forward.insert(key, entry),
            QuoteMode::Reverse => self.reverse.insert(key, entry),
        };
    }

    /// The invariant memo, for building stable curves
    pub fn invariants_mut(&mut self) -> &mut InvariantMemo {
        &mut self.invariants
    }

    /// Number of memoised hops in both directions
    #[must_use]
    pub fn len(&self) -> usize {
        self.forward.len() + self.reverse.len()
    }

    /// Whether no hop has been memoised
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of memoised invariants
    #[must_use]
    pub fn invariant_count(&self) -> usize {
        self.invariants.len()
    }

    /// The hop map for a mode
    fn hops(&self, mode: QuoteMode) -> &HashMap<HopKey, CacheEntry> {
        match mode {
            QuoteMode::Forward => &self.forward,
            QuoteMode::Reverse => &self.reverse,
        }
    }
}
