use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Invalid chain name: {0}")]
    UnknownChain(String),

    #[error("Internal invariant violated: {0}")]
    InternalInvariant(String),

    #[error("Invalid RPC url: {0}")]
    InvalidRpcUrl(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    #[error("Token creation failed: {0}")]
    TokenCreationFailed(String),

    #[error("Proposal queue failed: {0}")]
    ProposalQueueFailed(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid environment variable value: {0}")]
    InvalidEnvVar(String),
}

pub type Result<T> = std::result::Result<T, WalletError>;
