use std::collections::HashMap;

use log::{debug, info};

use crate::error::SwapError;
use crate::models::pool::Pool;
use crate::models::token::Token;
use crate::routes::accumulator::RouteAccumulator;
use crate::routes::cache::RouteCache;
use crate::routes::path_finder::PoolGraph;
use crate::routes::selector::{cheapest, order_reverse, sort_forward};
use crate::routes::types::{PoolAddress, Route, TokenAddress};

/// Route search over one pool and token snapshot.
///
/// The calculator owns its snapshot and a [`RouteCache`] tied to the snapshot
/// version. Route queries never mutate the pools; they only fill the cache.
#[derive(Debug, Clone)]
pub struct SwapRoutesCalculator {
    /// Pools in snapshot order
    pools: Vec<Pool>,
    /// Pool address -> positions in `pools`
    pool_index: HashMap<PoolAddress, Vec<usize>>,
    /// Token address -> decimals
    decimals: HashMap<TokenAddress, u32>,
    /// Token graph built from `pools`
    graph: PoolGraph,
    /// Hop and invariant memo for the current version
    cache: RouteCache,
}

impl SwapRoutesCalculator {
    /// Create a new calculator over a snapshot
    ///
    /// # Arguments
    /// * `pools` - Pool snapshot
    /// * `tokens` - Decimals of every token the pools trade
    /// * `version` - Snapshot version, later updates must not go below it
    #[must_use]
    pub fn new(pools: Vec<Pool>, tokens: Vec<Token>, version: u64) -> Self {
        let mut calculator = Self {
            pools: Vec::new(),
            pool_index: HashMap::new(),
            decimals: HashMap::new(),
            graph: PoolGraph::default(),
            cache: RouteCache::new(version),
        };
        calculator.set_pools(pools);
        calculator.set_tokens(tokens);
        calculator
    }

    /// Replaces the pools and/or tokens and moves to `version`, dropping
    /// everything cached for the previous version.
    ///
    /// # Errors
    /// * `StaleVersion` if `version` is older than the current one
    pub fn update(
        &mut self,
        pools: Option<Vec<Pool>>,
        tokens: Option<Vec<Token>>,
        version: u64,
    ) -> Result<(), SwapError> {
        let current = self.cache.version();
        if version < current {
            return Err(SwapError::StaleVersion {
                current,
                new: version,
            });
        }
        if let Some(pools) = pools {
            self.set_pools(pools);
        }
        if let Some(tokens) = tokens {
            self.set_tokens(tokens);
        }
        self.cache.reset(version);
        debug!("Snapshot updated to version {version}");
        Ok(())
    }

    /// Current snapshot version
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.cache.version()
    }

    /// Pools of the current snapshot
    #[must_use]
    pub fn pools(&self) -> &[Pool] {
        &self.pools
    }

    /// The cache for the current snapshot
    #[must_use]
    pub const fn cache(&self) -> &RouteCache {
        &self.cache
    }

    /// Every simple pool path of at most `max_hops` from `start` to `end`.
    #[must_use]
    pub fn get_possible_paths(&self, start: &str, end: &str, max_hops: usize) -> Vec<Vec<PoolAddress>> {
        self.graph.find_paths(start, end, max_hops)
    }

    /// Priced routes from `start` to `end`, best first.
    ///
    /// Forward (`is_reverse == false`): `amount` is the raw input and routes are
    /// ranked by output. Reverse: `amount` is the raw output wanted; the path
    /// needing the least input comes first, followed by the other paths quoted
    /// forward with that same input.
    ///
    /// Paths that fail for any reason are left out; if all fail the result is
    /// empty.
    pub fn calculate_routes(
        &mut self,
        amount: u128,
        start: &str,
        end: &str,
        max_hops: usize,
        is_reverse: bool,
    ) -> Vec<Route> {
        let paths = self.graph.find_paths(start, end, max_hops);
        let accumulator = RouteAccumulator::new(&self.pools, &self.pool_index, &self.decimals);

        let routes = if is_reverse {
            let (positions, mut candidates): (Vec<usize>, Vec<Route>) = paths
                .iter()
                .enumerate()
                .filter_map(|(position, path)| {
                    accumulator
                        .reverse(&mut self.cache, amount, end, path)
                        .map(|route| (position, route))
                })
                .unzip();

            match cheapest(&candidates) {
                Some(best) => {
                    let selected_path = positions[best];
                    let selected = candidates.swap_remove(best);
                    let others = paths
                        .iter()
                        .enumerate()
                        .filter(|(position, _)| *position != selected_path)
                        .filter_map(|(_, path)| {
                            accumulator.forward(&mut self.cache, selected.input_amount, start, path)
                        })
                        .collect();
                    order_reverse(selected, others)
                }
                None => Vec::new(),
            }
        } else {
            let routes = paths
                .iter()
                .filter_map(|path| accumulator.forward(&mut self.cache, amount, start, path))
                .collect();
            sort_forward(routes)
        };

        info!(
            "{} of {} paths from {start} to {end} priced ({})",
            routes.len(),
            paths.len(),
            if is_reverse { "reverse" } else { "forward" }
        );
        routes
    }

    /// Replaces the pools and rebuilds the address index and token graph
    fn set_pools(&mut self, pools: Vec<Pool>) {
        let mut pool_index: HashMap<PoolAddress, Vec<usize>> = HashMap::with_capacity(pools.len());
        for (position, pool) in pools.iter().enumerate() {
            pool_index.entry(pool.address.clone()).or_default().push(position);
        }
        for (address, positions) in &pool_index {
            if positions.len() > 1 {
                debug!("Pool address {address} appears {} times", positions.len());
            }
        }
        self.graph = PoolGraph::new(&pools);
        debug!(
            "Indexed {} pools over {} tokens",
            pools.len(),
            self.graph.token_count()
        );
        self.pool_index = pool_index;
        self.pools = pools;
    }

    /// Replaces the token decimals
    fn set_tokens(&mut self, tokens: Vec<Token>) {
        self.decimals = tokens
            .into_iter()
            .map(|token| (token.address, token.decimals))
            .collect();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::curves::CurveKind;
    use crate::models::pool::StableParams;
    use crate::routes::test_helpers::*;

    fn path(addresses: &[&str]) -> Vec<PoolAddress> {
        addresses.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_single_pool_example() {
        let mut calculator = calculator(&[(
            "P1",
            "A",
            "B",
            111_111_111_000_000,
            222_222_222_000_000,
        )]);
        let routes = calculator.calculate_routes(1_000_000_000, "A", "B", 3, false);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].quote_output_amount, 1_939_982_540);
        assert_eq!(routes[0].path(), path(&["P1"]));
    }

    #[test]
    fn test_forward_routes_sorted_by_output() {
        let mut calculator = calculator(&[
            ("P1", "A", "B", 1_000_000_000, 1_000_000_000),
            ("P2", "B", "C", 1_000_000_000, 1_000_000_000),
            ("P3", "A", "C", 1_000_000_000, 500_000_000),
            ("P4", "A", "C", 1_000_000_000, 2_000_000_000),
        ]);
        let routes = calculator.calculate_routes(1_000_000, "A", "C", 3, false);
        let paths: Vec<Vec<PoolAddress>> = routes.iter().map(Route::path).collect();
        assert_eq!(
            paths,
            vec![path(&["P4"]), path(&["P1", "P2"]), path(&["P3"])]
        );
        for pair in routes.windows(2) {
            assert!(pair[0].quote_output_amount >= pair[1].quote_output_amount);
        }
    }

    #[test]
    fn test_reverse_cheapest_first() {
        let mut calculator = calculator(&[
            ("P1", "A", "B", 1_000_000_000, 1_000_000_000),
            ("P2", "B", "C", 1_000_000_000, 1_000_000_000),
            ("P3", "A", "C", 1_000_000_000, 500_000_000),
            ("P4", "A", "C", 1_000_000_000, 2_000_000_000),
        ]);
        let routes = calculator.calculate_routes(1_000_000, "A", "C", 3, true);
        assert_eq!(routes.len(), 3);
        assert_eq!(routes[0].path(), path(&["P4"]));
        assert_eq!(routes[0].quote_output_amount, 1_000_000);

        // the others are re-quoted forward with the selected input
        for route in &routes[1..] {
            assert_eq!(route.input_amount, routes[0].input_amount);
            assert!(route.quote_output_amount < routes[0].quote_output_amount);
        }
        assert_eq!(routes[1].path(), path(&["P1", "P2"]));
    }

    #[test]
    fn test_reverse_drops_illiquid_path() {
        let mut calculator = calculator(&[
            ("P1", "A", "B", 1_000_000_000, 1_000_000_000),
            ("P2", "A", "B", 1_000_000_000_000, 1_000_000_000_000),
        ]);
        // P1 holds only 1,000 B, so only P2 can be solved backwards
        let routes = calculator.calculate_routes(5_000_000_000, "A", "B", 3, true);
        assert_eq!(routes[0].path(), path(&["P2"]));
        assert_eq!(routes[0].quote_output_amount, 5_000_000_000);

        // P1 still shows up, quoted forward with P2's input
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[1].path(), path(&["P1"]));
        assert_eq!(routes[1].input_amount, routes[0].input_amount);
        assert!(routes[1].quote_output_amount < 1_000_000_000);
    }

    #[test]
    fn test_every_path_failing_gives_no_routes() {
        let mut calculator = calculator(&[("P1", "A", "B", 1_000_000, 1_000_000)]);
        assert!(calculator
            .calculate_routes(5_000_000, "A", "B", 3, true)
            .is_empty());
        assert!(calculator.calculate_routes(0, "A", "B", 3, false).is_empty());
        assert!(calculator.calculate_routes(10, "A", "Z", 3, false).is_empty());
    }

    #[test]
    fn test_rejected_stable_hop_leaves_other_paths() {
        let mutations: [fn(&mut StableParams); 3] = [
            |_| {},
            |params| params.price_impact_limit = dec("0.1"),
            |params| params.min_trade_size_0_for_1 = dec("1000"),
        ];
        let expected_paths = [vec!["S1", "P1"], vec!["P1"], vec!["P1"]];
        for (mutate, expected) in mutations.into_iter().zip(expected_paths) {
            let mut stable = stable_pool("S1", "K", "L", 999_999_999, 325_000_000);
            mutate(stable.stable_params.as_mut().unwrap());
            let pools = vec![stable, cp_pool("P1", "K", "L", 1_000_000_000, 340_000_000)];
            let mut calculator =
                SwapRoutesCalculator::new(pools, tokens(&[("K", 6), ("L", 6)]), 1);

            let routes = calculator.calculate_routes(100_000_000, "K", "L", 3, false);
            let paths: Vec<String> = routes.iter().map(|route| route.path().join(">")).collect();
            assert_eq!(paths, expected);
        }
    }

    #[test]
    fn test_mixed_curves() {
        let pools = vec![
            stable_pool("S1", "K", "L", 999_999_999, 325_000_000),
            cp_pool("P1", "L", "M", 400_000_000, 800_000_000),
        ];
        let tokens = tokens(&[("K", 6), ("L", 6), ("M", 6)]);
        let mut calculator = SwapRoutesCalculator::new(pools, tokens, 1);

        let routes = calculator.calculate_routes(100_000_000, "K", "M", 3, false);
        assert_eq!(routes.len(), 1);
        let route = &routes[0];
        assert_eq!(route.hops[0].amount_out, 32_458_920);
        assert_eq!(route.hops[0].curve, CurveKind::Stable);
        assert_eq!(route.hops[1].curve, CurveKind::ConstantProduct);
        assert_eq!(route.iterations_count, 12);
        assert_eq!(route.quote_lp_fee, dec("0.02"));
        assert_eq!(route.quote_dao_fee, dec("0.03"));
        assert_eq!(calculator.cache().invariant_count(), 1);
    }

    #[test]
    fn test_update() {
        let mut calculator = calculator(&[("P1", "A", "B", 1_000_000_000, 1_000_000_000)]);
        calculator.calculate_routes(1_000_000, "A", "B", 3, false);
        assert!(!calculator.cache().is_empty());

        assert_eq!(
            calculator.update(None, None, 0).err().unwrap(),
            SwapError::StaleVersion { current: 1, new: 0 }
        );
        assert!(!calculator.cache().is_empty());

        calculator
            .update(
                Some(vec![cp_pool("P2", "A", "B", 1_000_000_000, 1_000_000_000)]),
                None,
                2,
            )
            .unwrap();
        assert!(calculator.cache().is_empty());
        assert_eq!(calculator.version(), 2);
        assert_eq!(calculator.get_possible_paths("A", "B", 3), vec![path(&["P2"])]);
    }

    #[test]
    fn test_duplicate_addresses_drop_paths() {
        let mut calculator = calculator(&[
            ("P1", "A", "B", 1_000_000_000, 1_000_000_000),
            ("P1", "A", "B", 2_000_000_000, 2_000_000_000),
            ("P2", "A", "B", 1_000_000_000, 1_000_000_000),
        ]);
        let routes = calculator.calculate_routes(1_000_000, "A", "B", 3, false);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].path(), path(&["P2"]));
    }

    #[test]
    fn test_snapshot_pools_untouched() {
        let mut calculator = calculator(&[("P1", "A", "B", 1_000_000_000, 1_000_000_000)]);
        let before = calculator.pools().to_vec();
        calculator.calculate_routes(1_000_000, "A", "B", 3, false);
        calculator.calculate_routes(1_000_000, "B", "A", 3, true);
        assert_eq!(calculator.pools(), before.as_slice());
    }
}
