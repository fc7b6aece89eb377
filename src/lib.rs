pub mod chains;
pub mod error;
pub mod types;
pub mod utils;
pub mod wallet;

pub use chains::{ChainConfig, NativeCurrency, RpcUrls};
pub use error::{Result, WalletError};
pub use types::{
    QueueProposalParams, Receipt, TokenCreationParams, TokenLaunchParams, TransactionResult,
    TransferParams,
};
pub use wallet::{
    client::{ChainRpc, ConfirmationPolicy, HttpRpc, PublicClient, WalletClient},
    payload::TransactionPayload,
    transaction::TransactionAction,
    Config, WalletProvider,
};
