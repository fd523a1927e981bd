//! Domain policy configuration.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Which predicates are interpreted with liquid truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LiquidityPolicy {
    #[default]
    AllLiquid,
    NoneLiquid,
    /// Only the named predicates are liquid.
    Only(BTreeSet<String>),
}

impl LiquidityPolicy {
    pub fn is_liquid(&self, predicate: &str) -> bool {
        match self {
            LiquidityPolicy::AllLiquid => true,
            LiquidityPolicy::NoneLiquid => false,
            LiquidityPolicy::Only(names) => names.contains(predicate),
        }
    }
}

/// Policy flags of a domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainConfig {
    /// Unobserved atoms start false everywhere; otherwise they start true
    /// wherever they are not observed false.
    pub closed_world: bool,
    /// Moves never touch regions fixed by an observation.
    pub dont_modify_obs_preds: bool,
    pub liquidity: LiquidityPolicy,
}

impl Default for DomainConfig {
    fn default() -> Self {
        DomainConfig {
            closed_world: true,
            dont_modify_obs_preds: true,
            liquidity: LiquidityPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liquidity_policy() {
        assert!(LiquidityPolicy::AllLiquid.is_liquid("P"));
        assert!(!LiquidityPolicy::NoneLiquid.is_liquid("P"));
        let only = LiquidityPolicy::Only(BTreeSet::from(["P".to_string()]));
        assert!(only.is_liquid("P"));
        assert!(!only.is_liquid("Q"));
    }

    #[test]
    fn test_defaults() {
        let config = DomainConfig::default();
        assert!(config.closed_world);
        assert!(config.dont_modify_obs_preds);
        assert_eq!(config.liquidity, LiquidityPolicy::AllLiquid);
    }
}
