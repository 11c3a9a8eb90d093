pub mod balance;
pub mod classify;
pub mod transfer;

// Transfer record contract
pub use transfer::{TransferRecord, TransferType, TOKEN_PROGRAM_ID};

// Pure extraction over jsonParsed transactions
pub use classify::{block_time, extract_transfer};

// getTokenAccountsByOwner parsing
pub use balance::sum_token_balance;
