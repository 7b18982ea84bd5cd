use std::collections::{HashMap, HashSet};

use crate::models::pool::Pool;
use crate::routes::types::{PoolAddress, TokenAddress};

/// Token graph where every pool is an edge in both directions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolGraph {
    /// Token -> (neighbour token, pool) in snapshot order
    edges: HashMap<TokenAddress, Vec<(TokenAddress, PoolAddress)>>,
}

/// One pending step of the depth-first search. Each frame owns its path and
/// visited set, so nothing has to be undone when a branch is exhausted.
struct Frame {
    /// Token reached by `path`
    token: TokenAddress,
    /// Pools traded through so far
    path: Vec<PoolAddress>,
    /// Pools already on `path`
    visited: HashSet<PoolAddress>,
}

impl PoolGraph {
    /// Builds the graph from a pool snapshot. Pools trading a token against
    /// itself are ignored.
    #[must_use]
    pub fn new(pools: &[Pool]) -> Self {
        let mut edges: HashMap<TokenAddress, Vec<(TokenAddress, PoolAddress)>> = HashMap::new();
        for pool in pools.iter().filter(|pool| pool.token0 != pool.token1) {
            edges
                .entry(pool.token0.clone())
                .or_default()
                .push((pool.token1.clone(), pool.address.clone()));
            edges
                .entry(pool.token1.clone())
                .or_default()
                .push((pool.token0.clone(), pool.address.clone()));
        }
        Self { edges }
    }

    /// Number of tokens with at least one pool
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.edges.len()
    }

    /// Every simple path of at most `max_hops` pools from `start` to `end`.
    ///
    /// A path never repeats a pool and stops as soon as it reaches `end`.
    /// Paths come out in depth-first order over the snapshot's pool order.
    ///
    /// # Arguments
    /// * `start` - Token sold at the first hop
    /// * `end` - Token received at the last hop
    /// * `max_hops` - Longest path to consider
    ///
    /// # Returns
    /// * Pool address sequences, empty if `start == end` or nothing connects
    #[must_use]
    pub fn find_paths(&self, start: &str, end: &str, max_hops: usize) -> Vec<Vec<PoolAddress>> {
        let mut paths = Vec::new();
        if start == end || max_hops == 0 {
            return paths;
        }

        let mut stack = vec![Frame {
            token: start.to_string(),
            path: Vec::new(),
            visited: HashSet::new(),
        }];
        while let Some(frame) = stack.pop() {
            if frame.token == end {
                paths.push(frame.path);
                continue;
            }
            if frame.path.len() >= max_hops {
                continue;
            }
            let Some(neighbours) = self.edges.get(&frame.token) else {
                continue;
            };

            // Reverse push so the first pool in snapshot order is explored first
            for (next, pool) in neighbours.iter().rev() {
                if frame.visited.contains(pool) {
                    continue;
                }
                let mut path = frame.path.clone();
                path.push(pool.clone());
                let mut visited = frame.visited.clone();
                visited.insert(pool.clone());
                stack.push(Frame {
                    token: next.clone(),
                    path,
                    visited,
                });
            }
        }
        paths
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::routes::test_helpers::*;

    fn graph(pool_args: &[(&str, &str, &str)]) -> PoolGraph {
        let pools: Vec<Pool> = pool_args
            .iter()
            .map(|(address, token0, token1)| cp_pool(address, token0, token1, 100, 100))
            .collect();
        PoolGraph::new(&pools)
    }

    fn paths(found: &[Vec<PoolAddress>]) -> Vec<String> {
        found.iter().map(|path| path.join(">")).collect()
    }

    #[test]
    fn test_all_simple_paths() {
        let graph = graph(&[
            ("P1", "A", "B"),
            ("P2", "B", "C"),
            ("P3", "A", "C"),
            ("P4", "C", "D"),
            ("P5", "B", "D"),
        ]);
        assert_eq!(
            paths(&graph.find_paths("A", "D", 3)),
            vec!["P1>P2>P4", "P1>P5", "P3>P2>P5", "P3>P4"]
        );
        assert_eq!(
            paths(&graph.find_paths("A", "D", 2)),
            vec!["P1>P5", "P3>P4"]
        );
    }

    #[test]
    fn test_parallel_pools() {
        let graph = graph(&[("P1", "A", "B"), ("P2", "A", "B"), ("P3", "B", "C")]);
        assert_eq!(
            paths(&graph.find_paths("A", "C", 3)),
            vec!["P1>P3", "P2>P3"]
        );
        // A > B > A > B through both parallel pools is not a path to B: it
        // stops at the first arrival
        assert_eq!(paths(&graph.find_paths("A", "B", 3)), vec!["P1", "P2"]);
    }

    #[test]
    fn test_no_repeats_and_hop_bound() {
        let graph = graph(&[
            ("P1", "A", "B"),
            ("P2", "B", "C"),
            ("P3", "C", "A"),
            ("P4", "C", "D"),
            ("P5", "A", "D"),
            ("P6", "B", "D"),
        ]);
        for max_hops in 1..=4 {
            for path in graph.find_paths("A", "D", max_hops) {
                assert!(path.len() <= max_hops);
                let unique: HashSet<_> = path.iter().collect();
                assert_eq!(unique.len(), path.len());
            }
        }
    }

    #[test]
    fn test_no_paths() {
        let graph = graph(&[("P1", "A", "B"), ("P2", "C", "D"), ("P3", "E", "E")]);
        for (start, end, max_hops) in [
            ("A", "D", 3),
            ("A", "A", 3),
            ("A", "B", 0),
            ("X", "A", 3),
            ("E", "A", 3),
        ] {
            assert!(graph.find_paths(start, end, max_hops).is_empty());
        }
        assert_eq!(graph.token_count(), 4);
    }
}
