//! Read and signing clients bound to one chain, and the RPC seam the rest of
//! the crate talks through.

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, TxHash, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, info};

use crate::{
    chains::ChainConfig,
    error::{Result, WalletError},
    types::Receipt,
};

/// How long to wait for a submitted transaction to be mined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(2),
        }
    }
}

fn parse_endpoint(chain: &ChainConfig) -> Result<Url> {
    Url::parse(chain.rpc_url())
        .map_err(|e| WalletError::InvalidRpcUrl(format!("{} ({}): {}", chain.rpc_url(), chain.name, e)))
}

/// Read-only client for one chain
pub struct PublicClient {
    chain: ChainConfig,
    url: Url,
    provider: DynProvider,
}

impl PublicClient {
    /// Builds a client over HTTP. No request is made until the client is used.
    pub fn new(chain: ChainConfig) -> Result<Self> {
        let url = parse_endpoint(&chain)?;
        let provider = ProviderBuilder::new().connect_http(url.clone()).erased();
        Ok(Self {
            chain,
            url,
            provider,
        })
    }

    /// Wraps an already connected provider; `chain` must still carry a valid
    /// endpoint.
    pub fn with_provider(chain: ChainConfig, provider: DynProvider) -> Result<Self> {
        let url = parse_endpoint(&chain)?;
        Ok(Self {
            chain,
            url,
            provider,
        })
    }

    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    pub fn transport_url(&self) -> &Url {
        &self.url
    }

    /// Gets the native balance of an address
    pub async fn get_balance(&self, address: Address) -> Result<U256> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| WalletError::ProviderError(format!("Failed to get balance: {}", e)))
    }

    /// Polls for the receipt of `hash` until it is mined or the policy's
    /// timeout elapses.
    pub async fn wait_for_receipt(&self, hash: TxHash, policy: &ConfirmationPolicy) -> Result<Receipt> {
        let poll = async {
            loop {
                match self.provider.get_transaction_receipt(hash).await {
                    Ok(Some(receipt)) => return Ok(Receipt::from(receipt)),
                    Ok(None) => {}
                    Err(e) => {
                        return Err(WalletError::ProviderError(format!(
                            "Failed to get transaction receipt: {}",
                            e
                        )))
                    }
                }

                debug!(%hash, chain = %self.chain.name, "Receipt not available yet");
                tokio::time::sleep(policy.poll_interval).await;
            }
        };

        tokio::time::timeout(policy.timeout, poll)
            .await
            .map_err(|_| {
                WalletError::ProviderError(format!(
                    "Timed out after {} waiting for receipt of {}",
                    humantime::format_duration(policy.timeout),
                    hash
                ))
            })?
    }
}

/// Signing client for one chain, bound to the provider's account
pub struct WalletClient {
    chain: ChainConfig,
    url: Url,
    account: Address,
    provider: DynProvider,
}

impl WalletClient {
    pub fn new(chain: ChainConfig, signer: PrivateKeySigner) -> Result<Self> {
        let url = parse_endpoint(&chain)?;
        let account = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url.clone())
            .erased();
        Ok(Self {
            chain,
            url,
            account,
            provider,
        })
    }

    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    pub fn transport_url(&self) -> &Url {
        &self.url
    }

    pub fn account(&self) -> Address {
        self.account
    }

    /// Fills, signs and broadcasts `tx`, returning its hash without waiting
    /// for inclusion.
    pub async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash> {
        let tx = tx.with_from(self.account).with_chain_id(self.chain.id);
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| WalletError::ProviderError(format!("Failed to send transaction: {}", e)))?;

        let hash = *pending.tx_hash();
        info!(%hash, chain = %self.chain.name, "Transaction submitted");
        Ok(hash)
    }
}

/// Network operations the wallet depends on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Native balance of `address` on `chain`
    async fn get_balance(&self, chain: &ChainConfig, address: Address) -> Result<U256>;

    /// Signs `tx` with `signer` and broadcasts it on `chain`
    async fn sign_and_send(
        &self,
        chain: &ChainConfig,
        signer: &PrivateKeySigner,
        tx: TransactionRequest,
    ) -> Result<TxHash>;

    /// Blocks until `hash` is mined on `chain`, bounded by `policy`
    async fn wait_for_receipt(
        &self,
        chain: &ChainConfig,
        hash: TxHash,
        policy: &ConfirmationPolicy,
    ) -> Result<Receipt>;
}

/// JSON-RPC over HTTP. Every call builds a fresh client.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpRpc;

#[async_trait]
impl ChainRpc for HttpRpc {
    async fn get_balance(&self, chain: &ChainConfig, address: Address) -> Result<U256> {
        PublicClient::new(chain.clone())?.get_balance(address).await
    }

    async fn sign_and_send(
        &self,
        chain: &ChainConfig,
        signer: &PrivateKeySigner,
        tx: TransactionRequest,
    ) -> Result<TxHash> {
        WalletClient::new(chain.clone(), signer.clone())?
            .send_transaction(tx)
            .await
    }

    async fn wait_for_receipt(
        &self,
        chain: &ChainConfig,
        hash: TxHash,
        policy: &ConfirmationPolicy,
    ) -> Result<Receipt> {
        PublicClient::new(chain.clone())?
            .wait_for_receipt(hash, policy)
            .await
    }
}
