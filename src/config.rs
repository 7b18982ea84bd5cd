use std::str::FromStr;

use eyre::{eyre, Result};

use crate::routes::types::GasModel;
use crate::utils::constants::DEFAULT_MAX_HOPS;

/// Maximum hops per route
const MAX_HOPS_VAR: &str = "SWAP_ROUTES_MAX_HOPS";
/// Gas overhead per routed swap
const GAS_BASE_VAR: &str = "SWAP_ROUTES_GAS_BASE";
/// Gas per constant product hop
const GAS_CONSTANT_PRODUCT_HOP_VAR: &str = "SWAP_ROUTES_GAS_CONSTANT_PRODUCT_HOP";
/// Gas per stable hop
const GAS_STABLE_HOP_VAR: &str = "SWAP_ROUTES_GAS_STABLE_HOP";
/// Gas per solver iteration
const GAS_PER_ITERATION_VAR: &str = "SWAP_ROUTES_GAS_PER_ITERATION";

/// Runtime settings for the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Default maximum number of hops for a route search
    pub max_hops: usize,
    /// Gas costs for route estimates
    pub gas: GasModel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_MAX_HOPS,
            gas: GasModel::default(),
        }
    }
}

impl Config {
    /// Loads `.env` if there is one, then reads the environment.
    ///
    /// # Errors
    /// * If a variable is set but does not parse
    pub fn from_env() -> Result<Self> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from a variable lookup, falling back to defaults for
    /// unset variables.
    ///
    /// # Errors
    /// * If a variable is set but does not parse
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            max_hops: parse_or(&lookup, MAX_HOPS_VAR, defaults.max_hops)?,
            gas: GasModel {
                base: parse_or(&lookup, GAS_BASE_VAR, defaults.gas.base)?,
                constant_product_hop: parse_or(
                    &lookup,
                    GAS_CONSTANT_PRODUCT_HOP_VAR,
                    defaults.gas.constant_product_hop,
                )?,
                stable_hop: parse_or(&lookup, GAS_STABLE_HOP_VAR, defaults.gas.stable_hop)?,
                per_iteration: parse_or(
                    &lookup,
                    GAS_PER_ITERATION_VAR,
                    defaults.gas.per_iteration,
                )?,
            },
        })
    }
}

/// Parses a variable if it is set.
fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| eyre!("{name} has invalid value {value:?}: {e}")),
        None => Ok(default),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Config::from_lookup(lookup(&[])).unwrap(), Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("SWAP_ROUTES_MAX_HOPS", "4"),
            ("SWAP_ROUTES_GAS_STABLE_HOP", " 250000 "),
        ]))
        .unwrap();
        assert_eq!(config.max_hops, 4);
        assert_eq!(config.gas.stable_hop, 250_000);
        assert_eq!(config.gas.base, GasModel::default().base);
    }

    #[test]
    fn test_invalid_value_names_variable() {
        let error = Config::from_lookup(lookup(&[("SWAP_ROUTES_GAS_BASE", "lots")]))
            .err()
            .unwrap();
        assert!(error.to_string().starts_with("SWAP_ROUTES_GAS_BASE"));
    }
}
