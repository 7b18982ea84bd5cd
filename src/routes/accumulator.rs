use std::collections::HashMap;

use itertools::Itertools;
use log::{debug, trace};

use crate::error::SwapError;
use crate::models::pool::Pool;
use crate::routes::cache::{CacheEntry, HopKey, QuoteMode, RouteCache};
use crate::routes::single_hop::SingleHopCalculator;
use crate::routes::types::{HopQuote, PoolAddress, Route, TokenAddress};

/// Folds hop quotes along a path into a [`Route`].
///
/// Every error on the way (unknown pool, token mismatch, liquidity, solver)
/// only drops the path at hand; it is logged and turned into `None`.
#[derive(Debug, Clone, Copy)]
pub struct RouteAccumulator<'a> {
    /// The snapshot's pools
    pools: &'a [Pool],
    /// Pool address -> positions in `pools`
    index: &'a HashMap<PoolAddress, Vec<usize>>,
    /// Prices single hops
    hops: SingleHopCalculator<'a>,
}

impl<'a> RouteAccumulator<'a> {
    /// Create a new accumulator over a snapshot
    #[must_use]
    pub const fn new(
        pools: &'a [Pool],
        index: &'a HashMap<PoolAddress, Vec<usize>>,
        decimals: &'a HashMap<TokenAddress, u32>,
    ) -> Self {
        Self {
            pools,
            index,
            hops: SingleHopCalculator::new(decimals),
        }
    }

    /// Route selling `amount_in` of `start` along `path`, or `None` if any hop
    /// fails.
    pub fn forward(
        &self,
        cache: &mut RouteCache,
        amount_in: u128,
        start: &str,
        path: &[PoolAddress],
    ) -> Option<Route> {
        self.try_forward(cache, amount_in, start, path)
            .map_err(|e| log_dropped(path, &e))
            .ok()
    }

    /// Route receiving `amount_out` of `end` along `path`, or `None` if any hop
    /// fails.
    pub fn reverse(
        &self,
        cache: &mut RouteCache,
        amount_out: u128,
        end: &str,
        path: &[PoolAddress],
    ) -> Option<Route> {
        self.try_reverse(cache, amount_out, end, path)
            .map_err(|e| log_dropped(path, &e))
            .ok()
    }

    /// Forward fold: each hop's output is the next hop's input.
    ///
    /// # Errors
    /// * The first hop error met along the path
    pub fn try_forward(
        &self,
        cache: &mut RouteCache,
        amount_in: u128,
        start: &str,
        path: &[PoolAddress],
    ) -> Result<Route, SwapError> {
        let mut quotes = Vec::with_capacity(path.len());
        path.iter()
            .try_fold((start.to_string(), amount_in), |(token, amount), address| {
                let quote = self.hop(cache, QuoteMode::Forward, amount, &token, address)?;
                let next = (quote.token_out.clone(), quote.amount_out);
                quotes.push(quote);
                Ok::<_, SwapError>(next)
            })?;
        Route::from_hops(&quotes).ok_or_else(|| SwapError::PoolNotFound("empty path".to_string()))
    }

    /// Reverse fold: walks the path backwards, each hop's required input being
    /// the previous hop's desired output.
    ///
    /// # Errors
    /// * The first hop error met along the path
    pub fn try_reverse(
        &self,
        cache: &mut RouteCache,
        amount_out: u128,
        end: &str,
        path: &[PoolAddress],
    ) -> Result<Route, SwapError> {
        let mut quotes = Vec::with_capacity(path.len());
        path.iter()
            .rev()
            .try_fold((end.to_string(), amount_out), |(token, amount), address| {
                let quote = self.hop(cache, QuoteMode::Reverse, amount, &token, address)?;
                let next = (quote.token_in.clone(), quote.amount_in);
                quotes.push(quote);
                Ok::<_, SwapError>(next)
            })?;
        quotes.reverse();
        Route::from_hops(&quotes).ok_or_else(|| SwapError::PoolNotFound("empty path".to_string()))
    }

    /// One hop through the cache.
    fn hop(
        &self,
        cache: &mut RouteCache,
        mode: QuoteMode,
        amount: u128,
        token: &str,
        address: &str,
    ) -> Result<HopQuote, SwapError> {
        let key = HopKey::new(token, address, amount);
        if let Some(entry) = cache.get(mode, &key) {
            trace!("Cache hit for {mode:?} {amount} {token} through {address}");
            return entry.clone().into_result();
        }

        let result = self.resolve(address).and_then(|pool| match mode {
            QuoteMode::Forward => self.hops.forward(amount, token, pool, cache.invariants_mut()),
            QuoteMode::Reverse => self.hops.reverse(amount, token, pool, cache.invariants_mut()),
        });
        cache.insert(mode, key, CacheEntry::from(&result));
        result
    }

    /// The single pool behind an address.
    fn resolve(&self, address: &str) -> Result<&'a Pool, SwapError> {
        match self.index.get(address).map(Vec::as_slice) {
            Some([position]) => self
                .pools
                .get(*position)
                .ok_or_else(|| SwapError::PoolNotFound(address.to_string())),
            Some([_, _, ..]) => Err(SwapError::DuplicatePool(address.to_string())),
            Some([]) | None => Err(SwapError::PoolNotFound(address.to_string())),
        }
    }
}

/// Logs why a path produced no route.
fn log_dropped(path: &[PoolAddress], e: &SwapError) {
    debug!("Dropping path {} ({}): {e}", path.iter().join(" > "), e.kind());
}
