//! Core type definitions for wallet actions.
//!
//! Parameter records are what a front-end hands to an action; results are
//! only produced once a transaction has been confirmed on-chain.

use alloy::{
    network::ReceiptResponse,
    primitives::{Address, Bytes, TxHash, U256},
    rpc::types::{Log, TransactionReceipt},
};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Parameters of a transfer. Native value unless `token` is set, in which
/// case an ERC20 `transfer` is sent to the token contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferParams {
    pub from_chain: String,
    pub to_address: Address,
    /// Decimal amount, e.g. `"0.1"`
    pub amount: String,
    #[serde(default)]
    pub token: Option<Address>,
    /// Decimals of `token`; 18 when omitted
    #[serde(default)]
    pub token_decimals: Option<u8>,
    /// Extra call data for native transfers
    #[serde(default)]
    pub data: Option<Bytes>,
}

/// Parameters for deploying an ERC20 through a factory contract
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCreationParams {
    pub from_chain: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Decimal amount in whole tokens, scaled by `decimals`
    pub initial_supply: String,
    /// Defaults to the provider's own address
    #[serde(default)]
    pub token_owner: Option<Address>,
    /// Defaults to the chain's configured factory
    #[serde(default)]
    pub factory_address: Option<Address>,
}

/// Parameters for launching a token through a launchpad contract's
/// `createLaunch`. The metadata strings are passed through verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenLaunchParams {
    pub from_chain: String,
    /// Defaults to the Arthera launchpad on Arthera mainnet
    #[serde(default)]
    pub launchpad: Option<Address>,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub twitter: String,
    #[serde(default)]
    pub telegram: String,
    #[serde(default)]
    pub youtube: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub gas_limit: Option<u64>,
}

/// Parameters for queueing a succeeded proposal on a Governor contract
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueProposalParams {
    pub chain: String,
    pub governor: Address,
    pub targets: Vec<Address>,
    /// Integer values in the smallest native unit
    pub values: Vec<String>,
    pub calldatas: Vec<Bytes>,
    pub description: String,
}

/// Receipt of a mined transaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    pub success: bool,
    pub logs: Vec<Log>,
}

impl From<TransactionReceipt> for Receipt {
    fn from(receipt: TransactionReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            success: ReceiptResponse::status(&receipt),
            logs: receipt.inner.logs().to_vec(),
        }
    }
}

/// A confirmed transaction.
///
/// For an ERC20 transfer `to` and `value` are the token recipient and amount,
/// `token` is the contract the transaction was sent to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResult {
    pub hash: TxHash,
    pub from: Address,
    pub to: Address,
    /// Amount moved, in the smallest unit of the native currency or `token`
    pub value: U256,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<Address>,
    pub data: Bytes,
    pub chain_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<Log>>,
}

impl Display for TransactionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on chain {}: {} -> {} (value {})",
            self.hash, self.chain_id, self.from, self.to, self.value
        )
    }
}
