pub mod client;
pub mod payload;
pub mod transaction;

use alloy::{
    primitives::{Address, U256},
    signers::local::PrivateKeySigner,
};
use std::{collections::HashMap, fmt, str::FromStr, sync::Arc, time::Duration};
use tracing::{debug, warn};

use crate::{
    chains::{well_known, ChainConfig},
    error::{Result, WalletError},
    utils::format_amount,
};

use self::client::{ChainRpc, ConfirmationPolicy, HttpRpc, PublicClient, WalletClient};

/// Chain selected when no custom chains are supplied
pub const DEFAULT_CHAIN: &str = "mainnet";

/// Wallet configuration loaded from environment variables
#[derive(Clone)]
pub struct Config {
    pub private_key: String,
    /// Registry keys to configure, first one becomes the current chain
    pub chains: Vec<String>,
    /// Custom RPC endpoint per chain key
    pub rpc_urls: HashMap<String, String>,
    /// ERC20 factory per chain key
    pub token_factories: HashMap<String, Address>,
    /// Registry key substituted for unknown chain names, if set
    pub chain_fallback: Option<String>,
    pub confirmation: ConfirmationPolicy,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("private_key", &"<redacted>")
            .field("chains", &self.chains)
            .field("rpc_urls", &self.rpc_urls)
            .field("token_factories", &self.token_factories)
            .field("chain_fallback", &self.chain_fallback)
            .field("confirmation", &self.confirmation)
            .finish()
    }
}

impl Config {
    /// Creates a new Config instance by loading values from environment variables.
    /// Reads `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    /// Builds a Config from any key-value source.
    ///
    /// # Arguments
    /// * `lookup` - Returns the value of a variable, or None when unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let private_key = lookup("EVM_PRIVATE_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| WalletError::EnvVarNotFound("EVM_PRIVATE_KEY".to_string()))?;

        let chains: Vec<String> = lookup("EVM_CHAINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let mut rpc_urls = HashMap::new();
        let mut token_factories = HashMap::new();
        for chain in &chains {
            let suffix = chain.to_uppercase();

            if let Some(url) = lookup(&format!("ETHEREUM_PROVIDER_{}", suffix))
                .filter(|v| !v.trim().is_empty())
            {
                rpc_urls.insert(chain.clone(), url.trim().to_string());
            }

            let factory_var = format!("TOKEN_FACTORY_{}", suffix);
            if let Some(factory) = lookup(&factory_var) {
                let factory = Address::from_str(factory.trim()).map_err(|_| {
                    WalletError::InvalidEnvVar(format!("{} must be an address", factory_var))
                })?;
                token_factories.insert(chain.clone(), factory);
            }
        }

        let defaults = ConfirmationPolicy::default();
        let confirmation = ConfirmationPolicy {
            timeout: parse_duration_var(&lookup, "RECEIPT_TIMEOUT")?.unwrap_or(defaults.timeout),
            poll_interval: parse_duration_var(&lookup, "RECEIPT_POLL_INTERVAL")?
                .unwrap_or(defaults.poll_interval),
        };

        Ok(Self {
            private_key,
            chains,
            rpc_urls,
            token_factories,
            chain_fallback: lookup("EVM_CHAIN_FALLBACK").filter(|v| !v.trim().is_empty()),
            confirmation,
        })
    }
}

fn parse_duration_var(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<Duration>> {
    lookup(key)
        .map(|v| {
            humantime::parse_duration(v.trim()).map_err(|_| {
                WalletError::InvalidEnvVar(format!("{} must be a duration such as 90s or 2m", key))
            })
        })
        .transpose()
}

/// Owns the account and the set of configured chains.
///
/// A provider is meant to be owned by a single task: switching chains takes
/// `&mut self`, so sharing one across requests requires the caller to wrap it.
pub struct WalletProvider {
    signer: PrivateKeySigner,
    chains: HashMap<String, ChainConfig>,
    current_chain: String,
    rpc: Arc<dyn ChainRpc>,
    confirmation: ConfirmationPolicy,
}

impl WalletProvider {
    /// Creates a provider talking JSON-RPC over HTTP.
    ///
    /// # Arguments
    /// * `private_key` - Hex encoded secp256k1 key, `0x` prefix optional
    /// * `chains` - Extra chains; when non-empty the first becomes current
    pub fn new(private_key: &str, chains: Vec<(String, ChainConfig)>) -> Result<Self> {
        Self::with_rpc(private_key, chains, Arc::new(HttpRpc))
    }

    /// Creates a provider that reaches the network through `rpc`.
    pub fn with_rpc(
        private_key: &str,
        chains: Vec<(String, ChainConfig)>,
        rpc: Arc<dyn ChainRpc>,
    ) -> Result<Self> {
        let signer = PrivateKeySigner::from_str(private_key.trim())
            .map_err(|e| WalletError::InvalidKey(e.to_string()))?;

        let default_chain = well_known(DEFAULT_CHAIN).ok_or_else(|| {
            WalletError::InternalInvariant(format!("{} missing from registry", DEFAULT_CHAIN))
        })?;

        let current_chain = chains
            .first()
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| DEFAULT_CHAIN.to_string());

        let mut provider = Self {
            signer,
            chains: HashMap::from([(DEFAULT_CHAIN.to_string(), default_chain)]),
            current_chain,
            rpc,
            confirmation: ConfirmationPolicy::default(),
        };
        provider.add_chain(chains);

        debug!(
            address = %provider.get_address(),
            current_chain = %provider.current_chain,
            chains = provider.chains.len(),
            "Wallet provider ready"
        );
        Ok(provider)
    }

    /// Builds a provider from loaded configuration, resolving each configured
    /// chain name against the registry.
    pub fn from_config(config: &Config) -> Result<Self> {
        let chains = config
            .chains
            .iter()
            .map(|name| {
                let custom_rpc = config.rpc_urls.get(name).map(String::as_str);
                let mut chain = match &config.chain_fallback {
                    Some(fallback) => Self::gen_chain_from_name_or(name, fallback, custom_rpc)?,
                    None => Self::gen_chain_from_name(name, custom_rpc)?,
                };
                if let Some(factory) = config.token_factories.get(name) {
                    chain = chain.with_token_factory(*factory);
                }
                Ok((name.clone(), chain))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(&config.private_key, chains)?.with_confirmation(config.confirmation))
    }

    /// Sets how long actions wait for a receipt
    pub fn with_confirmation(mut self, confirmation: ConfirmationPolicy) -> Self {
        self.confirmation = confirmation;
        self
    }

    pub fn confirmation(&self) -> &ConfirmationPolicy {
        &self.confirmation
    }

    pub fn get_address(&self) -> Address {
        self.signer.address()
    }

    pub(crate) fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    pub(crate) fn rpc(&self) -> &dyn ChainRpc {
        self.rpc.as_ref()
    }

    /// All configured chains by key
    pub fn chains(&self) -> &HashMap<String, ChainConfig> {
        &self.chains
    }

    pub fn current_chain_name(&self) -> &str {
        &self.current_chain
    }

    pub fn get_current_chain(&self) -> Result<&ChainConfig> {
        self.chains.get(&self.current_chain).ok_or_else(|| {
            WalletError::InternalInvariant(format!(
                "current chain {} is not configured",
                self.current_chain
            ))
        })
    }

    /// Selects a configured chain. Unknown names leave the selection untouched.
    pub fn switch_chain(&mut self, name: &str) -> Result<()> {
        if !self.chains.contains_key(name) {
            return Err(WalletError::UnknownChain(name.to_string()));
        }
        debug!(from = %self.current_chain, to = name, "Switching chain");
        self.current_chain = name.to_string();
        Ok(())
    }

    /// Merges `entries` into the configured chains, replacing existing keys.
    pub fn add_chain(&mut self, entries: impl IntoIterator<Item = (String, ChainConfig)>) {
        for (name, chain) in entries {
            self.chains.insert(name, chain);
        }
    }

    /// Resolves `name` against configured chains first, then the registry.
    pub fn get_chain_configs(&self, name: &str) -> Result<ChainConfig> {
        self.chains
            .get(name)
            .cloned()
            .or_else(|| well_known(name))
            .filter(|chain| chain.id != 0)
            .ok_or_else(|| WalletError::UnknownChain(name.to_string()))
    }

    /// Looks `name` up among the configured chains only.
    fn configured_chain(&self, name: &str) -> Result<ChainConfig> {
        self.chains
            .get(name)
            .cloned()
            .ok_or_else(|| WalletError::UnknownChain(name.to_string()))
    }

    /// Read-only client for a configured chain; a new client on every call
    pub fn get_public_client(&self, name: &str) -> Result<PublicClient> {
        PublicClient::new(self.configured_chain(name)?)
    }

    /// Signing client for a configured chain; a new client on every call
    pub fn get_wallet_client(&self, name: &str) -> Result<WalletClient> {
        WalletClient::new(self.configured_chain(name)?, self.signer.clone())
    }

    /// Native balance on the current chain as a decimal string, or None if it
    /// cannot be fetched.
    pub async fn get_wallet_balance(&self) -> Option<String> {
        let name = self.current_chain.clone();
        self.get_wallet_balance_for_chain(&name).await
    }

    /// Native balance on `name` as a decimal string, or None if the chain is
    /// not configured or the query fails.
    pub async fn get_wallet_balance_for_chain(&self, name: &str) -> Option<String> {
        match self.query_balance(name).await {
            Ok(balance) => Some(balance),
            Err(e) => {
                warn!(chain = name, error = %e, "Error getting wallet balance");
                None
            }
        }
    }

    async fn query_balance(&self, name: &str) -> Result<String> {
        let chain = self.configured_chain(name)?;
        let balance: U256 = self.rpc.get_balance(&chain, self.get_address()).await?;
        format_amount(balance, chain.native_currency.decimals)
    }

    /// Human-readable summary of the account on the current chain
    pub async fn summary(&self) -> Option<String> {
        let chain = match self.get_current_chain() {
            Ok(chain) => chain,
            Err(e) => {
                warn!(error = %e, "Error describing wallet");
                return None;
            }
        };
        let balance = self.get_wallet_balance().await?;
        Some(format!(
            "Wallet Address: {}\nBalance: {} {}\nChain ID: {}, Name: {}",
            self.get_address(),
            balance,
            chain.native_currency.symbol,
            chain.id,
            chain.name
        ))
    }

    /// Resolves a registry chain, attaching `custom_rpc_url` when given.
    pub fn gen_chain_from_name(name: &str, custom_rpc_url: Option<&str>) -> Result<ChainConfig> {
        ChainConfig::from_name(name, custom_rpc_url)
    }

    /// Like [`WalletProvider::gen_chain_from_name`] but substitutes `fallback`
    /// for unknown names.
    pub fn gen_chain_from_name_or(
        name: &str,
        fallback: &str,
        custom_rpc_url: Option<&str>,
    ) -> Result<ChainConfig> {
        ChainConfig::from_name_or(name, fallback, custom_rpc_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::client::MockChainRpc;
    use alloy::primitives::address;

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const KEY_ADDRESS: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

    fn custom_chains() -> Vec<(String, ChainConfig)> {
        ["arthera", "arbitrum"]
            .into_iter()
            .map(|name| {
                (
                    name.to_string(),
                    WalletProvider::gen_chain_from_name(name, None).unwrap(),
                )
            })
            .collect()
    }

    fn provider_with(rpc: MockChainRpc) -> WalletProvider {
        WalletProvider::with_rpc(KEY, custom_chains(), Arc::new(rpc)).unwrap()
    }

    #[test]
    fn derives_address_from_key() {
        let provider = WalletProvider::new(KEY, vec![]).unwrap();
        assert_eq!(provider.get_address(), KEY_ADDRESS);

        let unprefixed = WalletProvider::new(KEY.trim_start_matches("0x"), vec![]).unwrap();
        assert_eq!(unprefixed.get_address(), KEY_ADDRESS);
    }

    #[test]
    fn random_keys_round_trip() {
        let signer = PrivateKeySigner::random();
        let key = signer.to_bytes().to_string();
        let provider = WalletProvider::new(&key, vec![]).unwrap();
        assert_eq!(provider.get_address(), signer.address());
    }

    #[test]
    fn malformed_key_is_rejected() {
        for key in ["", "0x1234", "not a key"] {
            assert!(matches!(
                WalletProvider::new(key, vec![]),
                Err(WalletError::InvalidKey(_))
            ));
        }
    }

    #[test]
    fn defaults_to_mainnet() {
        let provider = WalletProvider::new(KEY, vec![]).unwrap();
        assert_eq!(provider.get_current_chain().unwrap().id, 1);
        assert_eq!(provider.chains()["mainnet"].id, 1);
    }

    #[test]
    fn first_custom_chain_becomes_current() {
        let provider = WalletProvider::new(KEY, custom_chains()).unwrap();

        assert_eq!(provider.current_chain_name(), "arthera");
        assert_eq!(provider.get_current_chain().unwrap().id, 10242);
        assert_eq!(provider.chains()["arbitrum"].id, 42161);
        assert!(provider.chains().contains_key("mainnet"));
    }

    #[test]
    fn switches_between_configured_chains() {
        let mut provider = WalletProvider::new(KEY, custom_chains()).unwrap();

        provider.switch_chain("mainnet").unwrap();
        assert_eq!(provider.get_current_chain().unwrap().id, 1);

        provider.switch_chain("arthera").unwrap();
        assert_eq!(provider.get_current_chain().unwrap().id, 10242);
    }

    #[test]
    fn switching_to_unknown_chain_fails() {
        let mut provider = WalletProvider::new(KEY, custom_chains()).unwrap();

        for name in ["eth", "base"] {
            assert!(matches!(
                provider.switch_chain(name),
                Err(WalletError::UnknownChain(_))
            ));
        }
        assert_eq!(provider.current_chain_name(), "arthera");
    }

    #[test]
    fn added_chain_overrides_registry() {
        let mut provider = WalletProvider::new(KEY, vec![]).unwrap();
        assert!(!provider.chains().contains_key("base"));

        let custom = WalletProvider::gen_chain_from_name("base", Some("https://base.example.org")).unwrap();
        provider.add_chain([("base".to_string(), custom.clone())]);

        assert_eq!(provider.get_chain_configs("base").unwrap(), custom);
        assert_eq!(provider.current_chain_name(), "mainnet");

        provider.switch_chain("base").unwrap();
        assert_eq!(provider.get_current_chain().unwrap(), &custom);
    }

    #[test]
    fn chain_configs_fall_back_to_registry() {
        let provider = WalletProvider::new(KEY, vec![]).unwrap();

        assert_eq!(provider.get_chain_configs("lukso").unwrap().id, 42);
        assert!(matches!(
            provider.get_chain_configs("ethereum"),
            Err(WalletError::UnknownChain(_))
        ));
    }

    #[test]
    fn clients_are_bound_to_resolved_chain() {
        let chain = WalletProvider::gen_chain_from_name("mainnet", Some("https://eth.drpc.org")).unwrap();
        let provider = WalletProvider::new(KEY, vec![("mainnet".to_string(), chain)]).unwrap();

        let public = provider.get_public_client("mainnet").unwrap();
        assert_eq!(public.chain().id, 1);
        assert_eq!(public.transport_url().as_str(), "https://eth.drpc.org/");

        let wallet = provider.get_wallet_client("mainnet").unwrap();
        assert_eq!(wallet.account(), KEY_ADDRESS);
        assert_eq!(wallet.chain().rpc_urls.default, "https://eth.merkle.io");

        assert!(matches!(
            provider.get_public_client("eth"),
            Err(WalletError::UnknownChain(_))
        ));
    }

    #[test]
    fn clients_require_a_configured_chain() {
        let provider = WalletProvider::new(KEY, custom_chains()).unwrap();

        assert!(matches!(
            provider.get_public_client("base"),
            Err(WalletError::UnknownChain(_))
        ));
        assert!(matches!(
            provider.get_wallet_client("base"),
            Err(WalletError::UnknownChain(_))
        ));
        assert_eq!(provider.get_public_client("arbitrum").unwrap().chain().id, 42161);
    }

    #[tokio::test]
    async fn balance_is_formatted_in_native_units() {
        let mut rpc = MockChainRpc::new();
        rpc.expect_get_balance()
            .withf(|chain, address| chain.id == 10242 && *address == KEY_ADDRESS)
            .times(1)
            .returning(|_, _| Ok(U256::from(1_500_000_000_000_000_000u128)));

        let provider = provider_with(rpc);
        assert_eq!(provider.get_wallet_balance().await.as_deref(), Some("1.5"));
    }

    #[tokio::test]
    async fn balance_for_chain_queries_named_chain() {
        let mut rpc = MockChainRpc::new();
        rpc.expect_get_balance()
            .withf(|chain, _| chain.id == 42161)
            .times(1)
            .returning(|_, _| Ok(U256::ZERO));

        let provider = provider_with(rpc);
        assert_eq!(
            provider.get_wallet_balance_for_chain("arbitrum").await.as_deref(),
            Some("0")
        );
    }

    #[tokio::test]
    async fn balance_soft_fails() {
        let mut rpc = MockChainRpc::new();
        rpc.expect_get_balance()
            .returning(|_, _| Err(WalletError::ProviderError("connection refused".to_string())));

        let provider = provider_with(rpc);
        assert_eq!(provider.get_wallet_balance_for_chain("not-a-chain").await, None);
        assert_eq!(provider.get_wallet_balance().await, None);
    }

    #[tokio::test]
    async fn balance_for_unconfigured_registry_chain_is_none() {
        let mut rpc = MockChainRpc::new();
        rpc.expect_get_balance().times(0);

        let provider = provider_with(rpc);
        assert_eq!(provider.get_wallet_balance_for_chain("base").await, None);
        assert_eq!(provider.get_wallet_balance_for_chain("lukso").await, None);
    }

    #[tokio::test]
    async fn summary_names_chain_and_symbol() {
        let mut rpc = MockChainRpc::new();
        rpc.expect_get_balance()
            .returning(|_, _| Ok(U256::from(2_000_000_000_000_000_000u128)));

        let summary = provider_with(rpc).summary().await.unwrap();
        assert!(summary.contains("Balance: 2 AA"));
        assert!(summary.contains("Chain ID: 10242, Name: Arthera"));
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn config_requires_private_key() {
        assert!(matches!(
            Config::from_lookup(env(&[])),
            Err(WalletError::EnvVarNotFound(_))
        ));
    }

    #[test]
    fn config_reads_chains_and_overrides() {
        let config = Config::from_lookup(env(&[
            ("EVM_PRIVATE_KEY", KEY),
            ("EVM_CHAINS", "fuse, lukso"),
            ("ETHEREUM_PROVIDER_FUSE", "https://fuse.example.org"),
            ("TOKEN_FACTORY_LUKSO", "0x1111111111111111111111111111111111111111"),
            ("RECEIPT_TIMEOUT", "5m"),
        ]))
        .unwrap();

        assert_eq!(config.chains, vec!["fuse", "lukso"]);
        assert_eq!(config.confirmation.timeout, Duration::from_secs(300));
        assert_eq!(config.confirmation.poll_interval, Duration::from_secs(2));
        assert!(!format!("{:?}", config).contains(KEY));

        let provider = WalletProvider::from_config(&config).unwrap();
        assert_eq!(provider.current_chain_name(), "fuse");
        assert_eq!(
            provider.get_current_chain().unwrap().rpc_url(),
            "https://fuse.example.org"
        );
        assert_eq!(
            provider.chains()["lukso"].token_factory,
            Some(address!("1111111111111111111111111111111111111111"))
        );
        assert_eq!(provider.confirmation().timeout, Duration::from_secs(300));
    }

    #[test]
    fn blank_provider_url_keeps_registry_endpoint() {
        let config = Config::from_lookup(env(&[
            ("EVM_PRIVATE_KEY", KEY),
            ("EVM_CHAINS", "fuse"),
            ("ETHEREUM_PROVIDER_FUSE", "  "),
        ]))
        .unwrap();
        assert!(!config.rpc_urls.contains_key("fuse"));

        let provider = WalletProvider::from_config(&config).unwrap();
        let fuse = provider.get_current_chain().unwrap();
        assert_eq!(fuse.rpc_urls.custom, None);
        assert_eq!(fuse.rpc_url(), fuse.rpc_urls.default);
        assert!(provider.get_public_client("fuse").is_ok());
    }

    #[test]
    fn config_rejects_bad_values() {
        assert!(matches!(
            Config::from_lookup(env(&[("EVM_PRIVATE_KEY", KEY), ("RECEIPT_TIMEOUT", "soon")])),
            Err(WalletError::InvalidEnvVar(_))
        ));
        assert!(matches!(
            Config::from_lookup(env(&[
                ("EVM_PRIVATE_KEY", KEY),
                ("EVM_CHAINS", "fuse"),
                ("TOKEN_FACTORY_FUSE", "nope"),
            ])),
            Err(WalletError::InvalidEnvVar(_))
        ));
    }

    #[test]
    fn unknown_configured_chain_needs_explicit_fallback() {
        let strict = Config::from_lookup(env(&[
            ("EVM_PRIVATE_KEY", KEY),
            ("EVM_CHAINS", "fusion"),
        ]))
        .unwrap();
        assert!(matches!(
            WalletProvider::from_config(&strict),
            Err(WalletError::UnknownChain(_))
        ));

        let lenient = Config::from_lookup(env(&[
            ("EVM_PRIVATE_KEY", KEY),
            ("EVM_CHAINS", "fusion"),
            ("EVM_CHAIN_FALLBACK", "fuse"),
        ]))
        .unwrap();
        let provider = WalletProvider::from_config(&lenient).unwrap();
        assert_eq!(provider.get_current_chain().unwrap().id, 122);
    }
}
