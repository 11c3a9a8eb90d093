//! Token transfer extraction from jsonParsed transactions.
//!
//! Pure functions over the `getTransaction` result (encoding `jsonParsed`).
//! Fetching, retries and logging live in the tracker app.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::transfer::{TransferRecord, TransferType, TOKEN_PROGRAM_ID};

/// Block time of a transaction as UTC, or None when the node did not report one.
pub fn block_time(tx: &Value) -> Option<DateTime<Utc>> {
    tx.get("blockTime")
        .and_then(|v| v.as_i64())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

/// Scans the outer instructions of a transaction and returns the first
/// token-program transfer whose source or destination is `wallet`.
///
/// Instructions without a parsed representation are skipped, not treated
/// as errors. Only the first match is returned, even when the transaction
/// carries several transfers for the same wallet.
///
/// # Arguments
/// * `tx` - Transaction JSON object (from RPC getTransaction, jsonParsed)
/// * `signature` - Signature the transaction was fetched by
/// * `wallet` - Tracked wallet address
pub fn extract_transfer(tx: &Value, signature: &str, wallet: &str) -> Option<TransferRecord> {
    let instructions = tx
        .pointer("/transaction/message/instructions")
        .and_then(|v| v.as_array())?;

    let timestamp = block_time(tx);

    for ix in instructions {
        if ix.get("programId").and_then(|v| v.as_str()) != Some(TOKEN_PROGRAM_ID) {
            continue;
        }

        // `parsed` is absent for undecodable data and a bare string for some programs
        let Some(parsed) = ix.get("parsed").filter(|p| p.is_object()) else {
            continue;
        };

        let info = parsed.get("info");
        let source = info.and_then(|i| i.get("source")).and_then(|v| v.as_str());
        let destination = info
            .and_then(|i| i.get("destination"))
            .and_then(|v| v.as_str());

        if source != Some(wallet) && destination != Some(wallet) {
            continue;
        }

        let (amount, decimals, mint) = read_amount(tx, info, source, destination);

        return Some(TransferRecord {
            signature: signature.to_string(),
            amount,
            decimals,
            mint,
            transfer_type: TransferType::from_tag(parsed.get("type").and_then(|v| v.as_str())),
            timestamp,
            wallet_is_sender: source == Some(wallet),
        });
    }

    None
}

/// Reads (display amount, decimals, mint) from a parsed instruction's `info`.
///
/// `transferChecked` carries a `tokenAmount` object and the mint. Plain
/// `transfer` only has the raw base-unit `amount`; it is scaled by the
/// decimals of the source or destination token account as recorded in
/// `meta.postTokenBalances` / `meta.preTokenBalances`, which also give the
/// mint. When neither account is listed there the amount is 0 and the mint
/// unknown.
fn read_amount(
    tx: &Value,
    info: Option<&Value>,
    source: Option<&str>,
    destination: Option<&str>,
) -> (f64, u8, Option<String>) {
    let Some(info) = info else {
        return (0.0, 0, None);
    };

    let mint = info
        .get("mint")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    if let Some(token_amount) = info.get("tokenAmount") {
        let decimals = token_amount
            .get("decimals")
            .and_then(|v| v.as_u64())
            .and_then(|d| u8::try_from(d).ok())
            .unwrap_or(0);
        let amount = token_amount
            .get("uiAmount")
            .and_then(|v| v.as_f64())
            .or_else(|| {
                token_amount
                    .get("uiAmountString")
                    .and_then(|v| v.as_str())
                    .and_then(|s| s.parse::<f64>().ok())
            });
        return (non_negative(amount), decimals, mint);
    }

    let Some(balance) = [source, destination]
        .into_iter()
        .flatten()
        .find_map(|account| token_balance_for(tx, account))
    else {
        return (0.0, 0, mint);
    };

    let decimals = balance
        .pointer("/uiTokenAmount/decimals")
        .and_then(|v| v.as_u64())
        .and_then(|d| u8::try_from(d).ok());
    let Some(decimals) = decimals else {
        return (0.0, 0, mint);
    };

    let raw = info
        .get("amount")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<f64>().ok());
    let amount = raw.map(|r| r / 10f64.powi(i32::from(decimals)));
    let mint = mint.or_else(|| {
        balance
            .get("mint")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    });

    (non_negative(amount), decimals, mint)
}

/// Token balance entry (post, then pre) for the token account `account`.
fn token_balance_for<'a>(tx: &'a Value, account: &str) -> Option<&'a Value> {
    let index = account_index(tx, account)?;

    ["/meta/postTokenBalances", "/meta/preTokenBalances"]
        .into_iter()
        .filter_map(|path| tx.pointer(path).and_then(|v| v.as_array()))
        .flatten()
        .find(|b| b.get("accountIndex").and_then(|v| v.as_u64()) == Some(index))
}

/// Position of `account` in `message.accountKeys`. jsonParsed keys are
/// objects with a `pubkey` field; legacy encodings use bare strings.
fn account_index(tx: &Value, account: &str) -> Option<u64> {
    tx.pointer("/transaction/message/accountKeys")
        .and_then(|v| v.as_array())?
        .iter()
        .position(|k| {
            let key = k.get("pubkey").and_then(|v| v.as_str()).or_else(|| k.as_str());
            key == Some(account)
        })
        .map(|i| i as u64)
}

fn non_negative(amount: Option<f64>) -> f64 {
    amount
        .filter(|a| a.is_finite() && *a >= 0.0)
        .unwrap_or(0.0)
}
