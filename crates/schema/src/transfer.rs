//! Normalized token transfer record.
//!
//! A `TransferRecord` is built once per matching transaction and handed to
//! the notifier; it is never mutated after construction.

use chrono::{DateTime, Utc};

/// SPL Token program id
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Parsed instruction type tag (`parsed.type` in jsonParsed encoding)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Transfer,
    TransferChecked,
    Other,
}

impl TransferType {
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("transfer") => TransferType::Transfer,
            Some("transferChecked") => TransferType::TransferChecked,
            _ => TransferType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferType::Transfer => "transfer",
            TransferType::TransferChecked => "transferChecked",
            TransferType::Other => "other",
        }
    }
}

/// Token transfer involving a tracked wallet
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRecord {
    /// Transaction signature
    pub signature: String,

    /// Display amount (already scaled by decimals)
    pub amount: f64,

    /// Decimal precision reported for the mint
    pub decimals: u8,

    /// Token mint; plain `transfer` instructions do not carry one
    pub mint: Option<String>,

    /// Instruction type tag
    pub transfer_type: TransferType,

    /// Block time, if the node reported one
    pub timestamp: Option<DateTime<Utc>>,

    /// True when the tracked wallet is the instruction's source
    pub wallet_is_sender: bool,
}
