use alloy::primitives::Address;
use tracing::info;
use tracing_subscriber::EnvFilter;

use multichain_wallet::{Config, TransactionAction, TransferParams, WalletProvider};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Loads .env too, so RUST_LOG set there applies to the subscriber
    let config = Config::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!(?config, "Loaded configuration");

    let provider = WalletProvider::from_config(&config)?;
    match provider.summary().await {
        Some(summary) => println!("{}", summary),
        None => println!(
            "Wallet Address: {}\nBalance unavailable on {}",
            provider.get_address(),
            provider.current_chain_name()
        ),
    }

    // Optional transfer, e.g. TRANSFER_TO=0x... TRANSFER_AMOUNT=0.01
    let Ok(to) = dotenv::var("TRANSFER_TO") else {
        return Ok(());
    };
    let to_address: Address = to.trim().parse()?;
    let amount = dotenv::var("TRANSFER_AMOUNT")
        .map_err(|_| eyre::eyre!("TRANSFER_AMOUNT must be set alongside TRANSFER_TO"))?;

    let tx = TransactionAction::new(&provider)
        .transfer(TransferParams {
            from_chain: provider.current_chain_name().to_string(),
            to_address,
            amount,
            token: None,
            token_decimals: None,
            data: None,
        })
        .await?;

    info!(%tx, "Transfer complete");
    println!("{}", serde_json::to_string_pretty(&tx)?);

    Ok(())
}
