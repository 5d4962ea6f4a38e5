//! Builder configuration.

use serde::{Deserialize, Deserializer, Serialize};
use txforge_core::{AnchorMode, Network, NetworkKind, PostConditionMode};

use crate::error::{BuilderError, Result};

/// Defaults applied to every transaction a builder assembles.
///
/// The network is always explicit; nothing reads a process-wide default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Chain parameters. In JSON either a kind (`"mainnet"`) or the full
    /// parameter set.
    #[serde(deserialize_with = "network_param")]
    pub network: Network,
    pub anchor_mode: AnchorMode,
    pub post_condition_mode: PostConditionMode,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            network: Network::testnet(),
            anchor_mode: AnchorMode::Any,
            post_condition_mode: PostConditionMode::Deny,
        }
    }
}

impl BuilderConfig {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    pub fn mainnet() -> Self {
        Self::new(Network::mainnet())
    }

    pub fn testnet() -> Self {
        Self::new(Network::testnet())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| BuilderError::InvalidConfig(e.to_string()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NetworkParam {
    Kind(NetworkKind),
    Full(Network),
}

fn network_param<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Network, D::Error> {
    Ok(match NetworkParam::deserialize(deserializer)? {
        NetworkParam::Kind(kind) => Network::from_kind(kind),
        NetworkParam::Full(network) => network,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_testnet() {
        let config = BuilderConfig::default();
        assert_eq!(config.network, Network::testnet());
        assert_eq!(config.anchor_mode, AnchorMode::Any);
        assert_eq!(config.post_condition_mode, PostConditionMode::Deny);
    }

    #[test]
    fn test_from_json_with_kind() {
        let config = BuilderConfig::from_json(r#"{"network": "mainnet", "anchor_mode": "on_chain_only"}"#).unwrap();
        assert_eq!(config.network, Network::mainnet());
        assert_eq!(config.anchor_mode, AnchorMode::OnChainOnly);
        assert_eq!(config.post_condition_mode, PostConditionMode::Deny);
    }

    #[test]
    fn test_from_json_roundtrip() {
        let config = BuilderConfig {
            network: Network::devnet(),
            anchor_mode: AnchorMode::OffChainOnly,
            post_condition_mode: PostConditionMode::Allow,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(BuilderConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            BuilderConfig::from_json(r#"{"network": "moonnet"}"#),
            Err(BuilderError::InvalidConfig(_))
        ));
    }
}
