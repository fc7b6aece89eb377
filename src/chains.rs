//! Chain configurations and the registry of well-known EVM networks.
//!
//! Registry keys follow the common camelCase naming used across EVM tooling
//! (`mainnet`, `luksoTestnet`, ...). Lookups are case-sensitive.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WalletError};

/// Native currency of a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// RPC endpoints of a chain. `custom` takes precedence over `default` when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcUrls {
    pub default: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
}

/// One blockchain network. Immutable once built; use the `with_*` methods to
/// derive a modified copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub id: u64,
    pub name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: RpcUrls,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_explorer: Option<String>,
    #[serde(default)]
    pub testnet: bool,
    /// ERC20 factory used by token creation when the caller names none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_factory: Option<Address>,
}

impl ChainConfig {
    /// Endpoint clients should connect to
    pub fn rpc_url(&self) -> &str {
        self.rpc_urls
            .custom
            .as_deref()
            .unwrap_or(&self.rpc_urls.default)
    }

    /// Returns a copy that connects through `url` instead of the default endpoint.
    pub fn with_custom_rpc(&self, url: impl Into<String>) -> Self {
        let mut chain = self.clone();
        chain.rpc_urls.custom = Some(url.into());
        chain
    }

    pub fn with_token_factory(&self, factory: Address) -> Self {
        let mut chain = self.clone();
        chain.token_factory = Some(factory);
        chain
    }

    /// Resolves `name` against the well-known registry, attaching
    /// `custom_rpc_url` when given.
    pub fn from_name(name: &str, custom_rpc_url: Option<&str>) -> Result<Self> {
        let base = well_known(name).ok_or_else(|| WalletError::UnknownChain(name.to_string()))?;
        Ok(match custom_rpc_url {
            Some(url) => base.with_custom_rpc(url),
            None => base,
        })
    }

    /// Like [`ChainConfig::from_name`], but substitutes the registry entry for
    /// `fallback` when `name` is unknown. The fallback itself must resolve.
    pub fn from_name_or(name: &str, fallback: &str, custom_rpc_url: Option<&str>) -> Result<Self> {
        match Self::from_name(name, custom_rpc_url) {
            Err(WalletError::UnknownChain(_)) => {
                tracing::warn!(chain = name, fallback, "Unknown chain, using fallback");
                Self::from_name(fallback, custom_rpc_url)
            }
            other => other,
        }
    }
}

/// Registry keys in a stable order
pub const WELL_KNOWN_CHAINS: &[&str] = &[
    "mainnet",
    "sepolia",
    "base",
    "arbitrum",
    "optimism",
    "polygon",
    "bsc",
    "gnosis",
    "avalanche",
    "linea",
    "arthera",
    "artheraTestnet",
    "fuse",
    "fuseSparknet",
    "lukso",
    "luksoTestnet",
];

fn chain(
    id: u64,
    name: &str,
    currency: (&str, &str),
    rpc: &str,
    explorer: &str,
    testnet: bool,
) -> ChainConfig {
    ChainConfig {
        id,
        name: name.to_string(),
        native_currency: NativeCurrency {
            name: currency.0.to_string(),
            symbol: currency.1.to_string(),
            decimals: 18,
        },
        rpc_urls: RpcUrls {
            default: rpc.to_string(),
            custom: None,
        },
        block_explorer: Some(explorer.to_string()),
        testnet,
        token_factory: None,
    }
}

/// Looks up a chain in the built-in registry.
pub fn well_known(name: &str) -> Option<ChainConfig> {
    let config = match name {
        "mainnet" => chain(1, "Ethereum", ("Ether", "ETH"), "https://eth.merkle.io", "https://etherscan.io", false),
        "sepolia" => chain(11155111, "Sepolia", ("Sepolia Ether", "ETH"), "https://sepolia.drpc.org", "https://sepolia.etherscan.io", true),
        "base" => chain(8453, "Base", ("Ether", "ETH"), "https://mainnet.base.org", "https://basescan.org", false),
        "arbitrum" => chain(42161, "Arbitrum One", ("Ether", "ETH"), "https://arb1.arbitrum.io/rpc", "https://arbiscan.io", false),
        "optimism" => chain(10, "OP Mainnet", ("Ether", "ETH"), "https://mainnet.optimism.io", "https://optimistic.etherscan.io", false),
        "polygon" => chain(137, "Polygon", ("POL", "POL"), "https://polygon-rpc.com", "https://polygonscan.com", false),
        "bsc" => chain(56, "BNB Smart Chain", ("BNB", "BNB"), "https://56.rpc.thirdweb.com", "https://bscscan.com", false),
        "gnosis" => chain(100, "Gnosis", ("xDAI", "XDAI"), "https://rpc.gnosischain.com", "https://gnosisscan.io", false),
        "avalanche" => chain(43114, "Avalanche", ("Avalanche", "AVAX"), "https://api.avax.network/ext/bc/C/rpc", "https://snowtrace.io", false),
        "linea" => chain(59144, "Linea Mainnet", ("Linea Ether", "ETH"), "https://rpc.linea.build", "https://lineascan.build", false),
        "arthera" => chain(10242, "Arthera", ("Arthera", "AA"), "https://rpc.arthera.net", "https://explorer.arthera.net", false),
        "artheraTestnet" => chain(10243, "Arthera Testnet", ("Arthera", "AA"), "https://rpc-test.arthera.net", "https://explorer-test.arthera.net", true),
        "fuse" => chain(122, "Fuse", ("Fuse Token", "FUSE"), "https://rpc.fuse.io", "https://explorer.fuse.io", false),
        "fuseSparknet" => chain(123, "Fuse Sparknet", ("Spark", "SPARK"), "https://rpc.fusespark.io", "https://explorer.fusespark.io", true),
        "lukso" => chain(42, "LUKSO", ("LUKSO", "LYX"), "https://rpc.mainnet.lukso.network", "https://explorer.execution.mainnet.lukso.network", false),
        "luksoTestnet" => chain(4201, "LUKSO Testnet", ("LUKSO Testnet", "LYXt"), "https://rpc.testnet.lukso.network", "https://explorer.execution.testnet.lukso.network", true),
        _ => return None,
    };
    Some(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_chain_resolves() {
        for name in WELL_KNOWN_CHAINS {
            assert!(well_known(name).is_some(), "{name} missing from registry");
        }
    }

    #[test]
    fn unknown_names_fail() {
        for name in ["ethereum", "eth", "Mainnet", ""] {
            assert!(matches!(
                ChainConfig::from_name(name, None),
                Err(WalletError::UnknownChain(_))
            ));
        }
    }

    #[test]
    fn custom_rpc_keeps_default_endpoint() {
        let base = well_known("arthera").unwrap();
        let chain = ChainConfig::from_name("arthera", Some("custom.url.io")).unwrap();

        assert_eq!(chain.rpc_urls.default, base.rpc_urls.default);
        assert_eq!(chain.rpc_urls.custom.as_deref(), Some("custom.url.io"));
        assert_eq!(chain.rpc_url(), "custom.url.io");
        assert_eq!(chain.id, 10242);
    }

    #[test]
    fn without_custom_rpc_returns_registry_entry() {
        assert_eq!(
            ChainConfig::from_name("lukso", None).unwrap(),
            well_known("lukso").unwrap()
        );
    }

    #[test]
    fn fallback_is_explicit() {
        let chain = ChainConfig::from_name_or("not-a-chain", "fuse", None).unwrap();
        assert_eq!(chain.id, 122);

        let chain = ChainConfig::from_name_or("base", "fuse", None).unwrap();
        assert_eq!(chain.id, 8453);

        assert!(matches!(
            ChainConfig::from_name_or("nope", "also-nope", None),
            Err(WalletError::UnknownChain(_))
        ));
    }
}
