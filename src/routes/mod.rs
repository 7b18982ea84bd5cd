//! # Routes Module
//!
//! Route discovery and evaluation: enumerate pool paths between two tokens,
//! price every hop through the right curve (memoised per snapshot version),
//! fold hops into routes and rank them.

/// Forward and reverse folds of hop quotes into routes
pub mod accumulator;
/// Hop and invariant memoisation
pub mod cache;
/// Stateful entry point over a pool snapshot
pub mod calculator;
/// Simple path enumeration over the pool graph
pub mod path_finder;
/// Route ranking
pub mod selector;
/// One hop through one pool
pub mod single_hop;
/// Test helpers and utilities
#[cfg(test)]
pub mod test_helpers;
/// Route, hop and address types
pub mod types;
