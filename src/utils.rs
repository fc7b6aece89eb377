//! Utility functions for amount conversion.

use alloy::primitives::U256;
use alloy_primitives::utils::{format_units, parse_units};

use crate::error::{Result, WalletError};

/// Converts a decimal string such as `"0.1"` into the integer smallest unit.
///
/// # Arguments
/// * `amount` - Decimal amount, no exponent notation
/// * `decimals` - Number of decimals of the unit
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(WalletError::Encoding("amount is empty".to_string()));
    }
    if trimmed.starts_with('-') {
        return Err(WalletError::Encoding(format!(
            "amount must not be negative: {}",
            amount
        )));
    }

    if let Some((_, fraction)) = trimmed.split_once('.') {
        if fraction.len() > decimals as usize {
            return Err(WalletError::Encoding(format!(
                "amount {} has more than {} decimal places",
                amount, decimals
            )));
        }
    }

    parse_units(trimmed, decimals)
        .map(|units| units.get_absolute())
        .map_err(|e| WalletError::Encoding(format!("Invalid amount {}: {}", amount, e)))
}

/// Formats an integer amount as a decimal string without trailing zeros,
/// e.g. `1500000000000000000` at 18 decimals becomes `"1.5"`.
pub fn format_amount(value: U256, decimals: u8) -> Result<String> {
    let formatted = format_units(value, decimals)
        .map_err(|e| WalletError::Encoding(format!("Failed to format amount: {}", e)))?;

    if !formatted.contains('.') {
        return Ok(formatted);
    }
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    Ok(trimmed.to_string())
}
