/*!
 * # Swap Routes - Offline DEX Swap Simulation and Route Discovery
 *
 * Swap Routes simulates token swaps across a decentralized exchange's liquidity
 * pools from a snapshot of their reserves, without touching the network.
 *
 * ## Core Features
 *
 * - **Path Discovery**: Enumerates every simple multi-hop path between two tokens
 * - **Two Curves**: Constant product pools in closed form, stableswap pools through
 *   a Newton-Raphson solver with a bisection fallback
 * - **Forward and Reverse Quotes**: Output for a given input, or input for a wanted output
 * - **Route Ranking**: Best route first, with gas estimates from solver iterations
 *
 * ## Module Structure
 *
 * - `config`: Configuration management for the CLI
 * - `curves`: Constant product and stableswap pricing
 * - `error`: Swap error taxonomy
 * - `math`: Decimal helpers and the numerical root finder
 * - `models`: Tokens, pools and snapshots
 * - `routes`: Path finding, hop caching, accumulation and ranking
 * - `utils`: Logging and constants
 */

/// Configuration management for the CLI
pub mod config;
/// Constant product and stableswap pricing
pub mod curves;
/// Swap error taxonomy
pub mod error;
/// Decimal helpers and the numerical root finder
pub mod math;
/// Tokens, pools and snapshots
pub mod models;
/// Path finding, hop caching, accumulation and ranking
pub mod routes;
/// Utility functions and helpers
pub mod utils;
