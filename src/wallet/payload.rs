//! Call-data encoding for each kind of action.

use alloy::{
    primitives::{address, keccak256, Address, Bytes, U256},
    sol,
    sol_types::SolCall,
};
use std::{fmt, str::FromStr};

use crate::{
    chains::ChainConfig,
    error::{Result, WalletError},
    types::{QueueProposalParams, TokenCreationParams, TokenLaunchParams, TransferParams},
    utils::parse_amount,
};

sol! {
    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool);
    }

    interface IERC20Factory {
        function createToken(
            string name,
            string symbol,
            uint8 decimals,
            uint256 initialSupply,
            address owner
        ) external returns (address);
    }

    interface IGovernor {
        function queue(
            address[] targets,
            uint256[] values,
            bytes[] calldatas,
            bytes32 descriptionHash
        ) external returns (uint256);
    }

    interface ILaunchpad {
        function createLaunch(
            string name,
            string symbol,
            string description,
            string image,
            string twitter,
            string telegram,
            string youtube,
            string website
        ) external;
    }
}

const DEFAULT_TOKEN_DECIMALS: u8 = 18;

/// Launchpad deployed on Arthera mainnet
pub const ARTHERA_LAUNCHPAD: Address = address!("f4544DDD263EDc38Ab3cE789B92410Acd0685Ef6");
const ARTHERA_CHAIN_ID: u64 = 10242;
/// `createLaunch` gas limit when the caller sets none
pub const DEFAULT_LAUNCH_GAS_LIMIT: u64 = 300_000;

/// What an action is doing, used to pick the error it fails with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Transfer,
    TokenCreation,
    TokenLaunch,
    GovernanceQueue,
}

impl ActionKind {
    /// Wraps a submission or confirmation failure
    pub fn failure(self, message: impl Into<String>) -> WalletError {
        let message = message.into();
        match self {
            ActionKind::Transfer => WalletError::TransferFailed(message),
            ActionKind::TokenCreation | ActionKind::TokenLaunch => {
                WalletError::TokenCreationFailed(message)
            }
            ActionKind::GovernanceQueue => WalletError::ProposalQueueFailed(message),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Transfer => write!(f, "transfer"),
            ActionKind::TokenCreation => write!(f, "token creation"),
            ActionKind::TokenLaunch => write!(f, "token launch"),
            ActionKind::GovernanceQueue => write!(f, "governance queue"),
        }
    }
}

/// Who receives what in an ERC20 transfer; the transaction itself goes to
/// the token contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTransfer {
    pub token: Address,
    pub recipient: Address,
    pub amount: U256,
}

/// A transaction ready to be signed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCall {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    /// Left to the node's estimate when unset
    pub gas_limit: Option<u64>,
    pub token_transfer: Option<TokenTransfer>,
}

impl EncodedCall {
    fn new(to: Address, value: U256, data: Bytes) -> Self {
        Self {
            to,
            value,
            data,
            gas_limit: None,
            token_transfer: None,
        }
    }
}

/// The action-specific part of a transaction
#[derive(Debug, Clone)]
pub enum TransactionPayload {
    Transfer(TransferParams),
    TokenCreation(TokenCreationParams),
    TokenLaunch(TokenLaunchParams),
    GovernanceQueue(QueueProposalParams),
}

impl TransactionPayload {
    pub fn kind(&self) -> ActionKind {
        match self {
            TransactionPayload::Transfer(_) => ActionKind::Transfer,
            TransactionPayload::TokenCreation(_) => ActionKind::TokenCreation,
            TransactionPayload::TokenLaunch(_) => ActionKind::TokenLaunch,
            TransactionPayload::GovernanceQueue(_) => ActionKind::GovernanceQueue,
        }
    }

    /// Key of the chain the transaction is sent on
    pub fn chain(&self) -> &str {
        match self {
            TransactionPayload::Transfer(p) => &p.from_chain,
            TransactionPayload::TokenCreation(p) => &p.from_chain,
            TransactionPayload::TokenLaunch(p) => &p.from_chain,
            TransactionPayload::GovernanceQueue(p) => &p.chain,
        }
    }

    /// Encodes destination, value and call data.
    ///
    /// # Arguments
    /// * `chain` - Chain the call is sent on; supplies native decimals and the default factory or launchpad
    /// * `sender` - Address signing the transaction
    pub fn encode(&self, chain: &ChainConfig, sender: Address) -> Result<EncodedCall> {
        match self {
            TransactionPayload::Transfer(params) => encode_transfer(params, chain),
            TransactionPayload::TokenCreation(params) => encode_token_creation(params, chain, sender),
            TransactionPayload::TokenLaunch(params) => encode_launch(params, chain),
            TransactionPayload::GovernanceQueue(params) => encode_queue(params),
        }
    }
}

fn encode_transfer(params: &TransferParams, chain: &ChainConfig) -> Result<EncodedCall> {
    match params.token {
        Some(token) => {
            if params.data.is_some() {
                return Err(WalletError::Encoding(
                    "call data cannot be attached to a token transfer".to_string(),
                ));
            }
            let decimals = params.token_decimals.unwrap_or(DEFAULT_TOKEN_DECIMALS);
            let amount = parse_amount(&params.amount, decimals)?;
            let call = IERC20::transferCall {
                to: params.to_address,
                amount,
            };
            Ok(EncodedCall {
                token_transfer: Some(TokenTransfer {
                    token,
                    recipient: params.to_address,
                    amount,
                }),
                ..EncodedCall::new(token, U256::ZERO, call.abi_encode().into())
            })
        }
        None => Ok(EncodedCall::new(
            params.to_address,
            parse_amount(&params.amount, chain.native_currency.decimals)?,
            params.data.clone().unwrap_or_default(),
        )),
    }
}

fn encode_token_creation(
    params: &TokenCreationParams,
    chain: &ChainConfig,
    sender: Address,
) -> Result<EncodedCall> {
    if params.name.trim().is_empty() || params.symbol.trim().is_empty() {
        return Err(WalletError::Encoding(
            "token name and symbol must not be empty".to_string(),
        ));
    }

    let factory = params
        .factory_address
        .or(chain.token_factory)
        .ok_or_else(|| {
            WalletError::Encoding(format!("no token factory configured for {}", chain.name))
        })?;

    let call = IERC20Factory::createTokenCall {
        name: params.name.clone(),
        symbol: params.symbol.clone(),
        decimals: params.decimals,
        initialSupply: parse_amount(&params.initial_supply, params.decimals)?,
        owner: params.token_owner.unwrap_or(sender),
    };

    Ok(EncodedCall::new(factory, U256::ZERO, call.abi_encode().into()))
}

fn encode_launch(params: &TokenLaunchParams, chain: &ChainConfig) -> Result<EncodedCall> {
    if params.name.trim().is_empty() || params.symbol.trim().is_empty() {
        return Err(WalletError::Encoding(
            "token name and symbol must not be empty".to_string(),
        ));
    }

    let launchpad = match params.launchpad {
        Some(launchpad) => launchpad,
        None if chain.id == ARTHERA_CHAIN_ID => ARTHERA_LAUNCHPAD,
        None => {
            return Err(WalletError::Encoding(format!(
                "no launchpad known for {}",
                chain.name
            )))
        }
    };

    let call = ILaunchpad::createLaunchCall {
        name: params.name.clone(),
        symbol: params.symbol.clone(),
        description: params.description.clone(),
        image: params.image.clone(),
        twitter: params.twitter.clone(),
        telegram: params.telegram.clone(),
        youtube: params.youtube.clone(),
        website: params.website.clone(),
    };

    Ok(EncodedCall {
        gas_limit: Some(params.gas_limit.unwrap_or(DEFAULT_LAUNCH_GAS_LIMIT)),
        ..EncodedCall::new(launchpad, U256::ZERO, call.abi_encode().into())
    })
}

fn encode_queue(params: &QueueProposalParams) -> Result<EncodedCall> {
    let n = params.targets.len();
    if n == 0 {
        return Err(WalletError::Encoding("proposal has no targets".to_string()));
    }
    if params.values.len() != n || params.calldatas.len() != n {
        return Err(WalletError::Encoding(format!(
            "proposal arrays differ in length: {} targets, {} values, {} calldatas",
            n,
            params.values.len(),
            params.calldatas.len()
        )));
    }

    let values = params
        .values
        .iter()
        .map(|v| {
            U256::from_str(v.trim())
                .map_err(|e| WalletError::Encoding(format!("Invalid proposal value {}: {}", v, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    let call = IGovernor::queueCall {
        targets: params.targets.clone(),
        values,
        calldatas: params.calldatas.clone(),
        descriptionHash: keccak256(params.description.as_bytes()),
    };

    Ok(EncodedCall::new(params.governor, U256::ZERO, call.abi_encode().into()))
}
