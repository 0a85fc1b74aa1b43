//! Token-precision conversion between snapshot, account, and proof
//! representations of a balance.

use crate::error::VerifierError;

pub const BITCOIN_TOKEN: &str = "BTC";
pub const ETHER_TOKEN: &str = "ETH";
pub const BALANCE_DIMENSION: usize = 18;

/// Canonical balance ordering: index 0 = BTC, 1 = ETH, 2..17 reserved.
pub fn balance_orders() -> Vec<String> {
    let mut orders = vec![BITCOIN_TOKEN.to_string(), ETHER_TOKEN.to_string()];
    for i in 0..(BALANCE_DIMENSION - orders.len()) {
        orders.push(format!("Unsupported-Index-{i}"));
    }
    orders
}

fn precision(token: &str, table: &[(&str, u32)]) -> Option<u32> {
    table.iter().find(|(t, _)| *t == token).map(|(_, d)| *d)
}

const ACCT_PRECISION: &[(&str, u32)] = &[(BITCOIN_TOKEN, 8), (ETHER_TOKEN, 18)];
const PROOF_PRECISION: &[(&str, u32)] = &[(BITCOIN_TOKEN, 8), (ETHER_TOKEN, 7)];
const SNAPSHOT_PRECISION: &[(&str, u32)] = &[(BITCOIN_TOKEN, 8), (ETHER_TOKEN, 18)];

/// `scale_units(v, in_dec, out_dec, round_up)`.
///
/// If `out_dec >= in_dec`, scale up by `10^(out_dec - in_dec)`. Otherwise
/// floor-divide by `10^(in_dec - out_dec)` and round the quotient up by one
/// when `round_up` is set and the division was inexact.
pub fn scale_units(
    value: u128,
    input_decimals: u32,
    output_decimals: u32,
    round_up: bool,
) -> u128 {
    if output_decimals >= input_decimals {
        let diff = output_decimals - input_decimals;
        return value * 10u128.pow(diff);
    }
    let diff = input_decimals - output_decimals;
    let divisor = 10u128.pow(diff);
    let quotient = value / divisor;
    if round_up && quotient * divisor != value {
        quotient + 1
    } else {
        quotient
    }
}

/// Converts a snapshot-precision balance to proof precision. Tokens not
/// present in *both* the snapshot and proof precision tables pass through
/// unchanged.
pub fn snapshot_precision_to_proof_precision(token: &str, value: u128) -> u128 {
    match (
        precision(token, SNAPSHOT_PRECISION),
        precision(token, PROOF_PRECISION),
    ) {
        (Some(from), Some(to)) => scale_units(value, from, to, true),
        _ => value,
    }
}

/// Converts an account-precision balance to proof precision. Tokens not
/// present in *both* the account and proof precision tables pass through
/// unchanged.
pub fn account_precision_to_proof_precision(token: &str, value: u128) -> u128 {
    match (
        precision(token, ACCT_PRECISION),
        precision(token, PROOF_PRECISION),
    ) {
        (Some(from), Some(to)) => scale_units(value, from, to, true),
        _ => value,
    }
}

/// Parses a receipt's decimal-string balance (e.g. `"1.23456789"` for BTC)
/// into an integer in that token's account-precision units.
pub fn unformat_balance_value(token: &str, balance_str: &str) -> Result<u128, VerifierError> {
    let num_decimal_places = match token.to_uppercase().as_str() {
        "BTC" => 8,
        "ETH" => 18,
        _ => {
            return Err(VerifierError::MalformedInput(format!(
                "token {token} not supported for receipt balance parsing"
            )))
        }
    };
    if balance_str.len() < num_decimal_places + 1 {
        return Err(VerifierError::MalformedInput(format!(
            "balance string {balance_str} too short for {num_decimal_places} decimal places"
        )));
    }
    let decimal_idx = balance_str.len() - num_decimal_places - 1;
    if balance_str.as_bytes()[decimal_idx] != b'.' {
        return Err(VerifierError::MalformedInput(format!(
            "balance string {balance_str} is not formatted correctly"
        )));
    }
    let mut digits = String::with_capacity(balance_str.len() - 1);
    digits.push_str(&balance_str[..decimal_idx]);
    digits.push_str(&balance_str[decimal_idx + 1..]);
    digits
        .parse::<u128>()
        .map_err(|e| VerifierError::MalformedInput(format!("invalid balance digits: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_units_upscales_exactly() {
        assert_eq!(scale_units(12345, 2, 3, true), 123450);
    }

    #[test]
    fn scale_units_rounds_up_on_remainder() {
        assert_eq!(scale_units(123456, 4, 1, true), 124);
        assert_eq!(scale_units(123456, 4, 1, false), 123);
    }

    #[test]
    fn scale_units_idempotent_on_equal_precision() {
        assert_eq!(scale_units(42, 5, 5, true), 42);
    }

    #[test]
    fn snapshot_to_proof_unknown_token_passes_through() {
        assert_eq!(snapshot_precision_to_proof_precision("DOGE", 777), 777);
    }

    #[test]
    fn eth_snapshot_to_proof_compresses_precision() {
        // 1 ETH at 18 decimals -> 1 ETH at 7 decimals.
        assert_eq!(
            snapshot_precision_to_proof_precision("ETH", 1_000_000_000_000_000_000),
            10_000_000
        );
    }

    #[test]
    fn unformat_balance_value_parses_btc() {
        assert_eq!(
            unformat_balance_value("BTC", "1.23456789").unwrap(),
            123456789
        );
    }

    #[test]
    fn unformat_balance_value_rejects_bad_format() {
        assert!(unformat_balance_value("BTC", "1,23456789").is_err());
    }
}
