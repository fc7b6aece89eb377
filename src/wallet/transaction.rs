use alloy::{network::TransactionBuilder, rpc::types::TransactionRequest};
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};

use crate::{
    chains::ChainConfig,
    error::Result,
    types::{
        QueueProposalParams, TokenCreationParams, TokenLaunchParams, TransactionResult,
        TransferParams,
    },
    utils::format_amount,
};

use super::{
    payload::{ActionKind, EncodedCall, TransactionPayload},
    WalletProvider,
};

const INSUFFICIENT_FUNDS: &str = "The total cost (gas * gas fee + value) of executing this transaction exceeds the balance of the account.";

/// Builds, submits and confirms transactions on behalf of a [`WalletProvider`].
///
/// Nothing is retried. A failure after submission may still land on-chain,
/// so resubmitting is the caller's decision.
pub struct TransactionAction<'a> {
    provider: &'a WalletProvider,
}

impl<'a> TransactionAction<'a> {
    pub fn new(provider: &'a WalletProvider) -> Self {
        Self { provider }
    }

    /// Sends native value or ERC20 tokens
    pub async fn transfer(&self, params: TransferParams) -> Result<TransactionResult> {
        self.execute(TransactionPayload::Transfer(params)).await
    }

    /// Deploys an ERC20 through a factory contract
    pub async fn create_token(&self, params: TokenCreationParams) -> Result<TransactionResult> {
        self.execute(TransactionPayload::TokenCreation(params)).await
    }

    /// Launches a token through a launchpad's `createLaunch`
    pub async fn launch_token(&self, params: TokenLaunchParams) -> Result<TransactionResult> {
        self.execute(TransactionPayload::TokenLaunch(params)).await
    }

    /// Queues a succeeded proposal on a Governor contract
    pub async fn queue_proposal(&self, params: QueueProposalParams) -> Result<TransactionResult> {
        self.execute(TransactionPayload::GovernanceQueue(params)).await
    }

    /// Runs one payload through resolve, encode, submit and confirm.
    ///
    /// # Returns
    /// * `Result<TransactionResult>` - The confirmed transaction. Chain
    ///   resolution and encoding errors are returned as-is; anything after
    ///   that is wrapped in the action's failure variant.
    pub async fn execute(&self, payload: TransactionPayload) -> Result<TransactionResult> {
        let kind = payload.kind();
        let span = info_span!("transaction", action = %kind, chain = payload.chain());

        self.run(kind, payload).instrument(span).await
    }

    async fn run(&self, kind: ActionKind, payload: TransactionPayload) -> Result<TransactionResult> {
        let chain = self.provider.get_chain_configs(payload.chain())?;
        let from = self.provider.get_address();
        let call = payload.encode(&chain, from)?;

        if kind == ActionKind::Transfer && !call.value.is_zero() {
            self.ensure_funds(kind, &chain, &call).await?;
        }

        let mut tx = TransactionRequest::default()
            .with_to(call.to)
            .with_value(call.value)
            .with_input(call.data.clone());
        if let Some(gas_limit) = call.gas_limit {
            tx.set_gas_limit(gas_limit);
        }

        let start = Instant::now();
        let rpc = self.provider.rpc();
        let hash = rpc
            .sign_and_send(&chain, self.provider.signer(), tx)
            .await
            .map_err(|e| {
                warn!(error = %e, "Submission failed");
                kind.failure(e.to_string())
            })?;
        info!(%hash, "Transaction submitted, waiting for receipt");

        let receipt = rpc
            .wait_for_receipt(&chain, hash, self.provider.confirmation())
            .await
            .map_err(|e| {
                warn!(%hash, error = %e, "Confirmation failed");
                kind.failure(e.to_string())
            })?;

        if !receipt.success {
            warn!(%hash, block = ?receipt.block_number, "Transaction reverted");
            return Err(kind.failure(format!("transaction {} reverted", hash)));
        }

        info!(
            %hash,
            block = ?receipt.block_number,
            gas_used = receipt.gas_used,
            elapsed = ?start.elapsed(),
            "Transaction confirmed"
        );

        let (to, value, token) = match call.token_transfer {
            Some(t) => (t.recipient, t.amount, Some(t.token)),
            None => (call.to, call.value, None),
        };

        Ok(TransactionResult {
            hash,
            from,
            to,
            value,
            token,
            data: call.data,
            chain_id: chain.id,
            logs: Some(receipt.logs),
        })
    }

    async fn ensure_funds(
        &self,
        kind: ActionKind,
        chain: &ChainConfig,
        call: &EncodedCall,
    ) -> Result<()> {
        let balance = self
            .provider
            .rpc()
            .get_balance(chain, self.provider.get_address())
            .await
            .map_err(|e| kind.failure(e.to_string()))?;

        if balance < call.value {
            let decimals = chain.native_currency.decimals;
            warn!(
                balance = %format_amount(balance, decimals).unwrap_or_default(),
                value = %format_amount(call.value, decimals).unwrap_or_default(),
                symbol = %chain.native_currency.symbol,
                "Insufficient balance"
            );
            return Err(kind.failure(INSUFFICIENT_FUNDS));
        }
        Ok(())
    }
}
