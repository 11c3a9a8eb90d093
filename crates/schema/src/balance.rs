//! Token balance helpers for `getTokenAccountsByOwner` results.

use serde_json::Value;

/// Sums the display balance (`uiAmount`) of every token account in a
/// `getTokenAccountsByOwner` result (encoding `jsonParsed`).
///
/// Accounts without a readable amount contribute nothing.
pub fn sum_token_balance(accounts: &[Value]) -> f64 {
    accounts
        .iter()
        .filter_map(|acc| acc.pointer("/account/data/parsed/info/tokenAmount"))
        .filter_map(|amount| {
            amount.get("uiAmount").and_then(|v| v.as_f64()).or_else(|| {
                amount
                    .get("uiAmountString")
                    .and_then(|v| v.as_str())
                    .and_then(|s| s.parse::<f64>().ok())
            })
        })
        .sum()
}
