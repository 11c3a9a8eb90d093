//! In-memory fakes of the RPC and alert channel capabilities.

use crate::notifier::{AlertChannel, ChannelError};
use crate::rpc::{RpcError, SolanaRpc};
use async_trait::async_trait;
use schema::TOKEN_PROGRAM_ID;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Scripted RPC node. Unscripted signature polls return an empty page and
/// unknown transactions come back as `Ok(None)`.
#[derive(Default)]
pub struct FakeRpc {
    signature_pages: Mutex<HashMap<String, VecDeque<Result<Vec<String>, RpcError>>>>,
    transactions: Mutex<HashMap<String, Value>>,
    tx_failures: Mutex<HashMap<String, VecDeque<RpcError>>>,
    token_accounts: Mutex<Option<Result<Vec<Value>, RpcError>>>,
    /// Simulated round trip for getSignaturesForAddress
    latency: Duration,

    /// (address, until) per getSignaturesForAddress call
    pub signature_calls: Mutex<Vec<(String, Option<String>)>>,
    /// signature per getTransaction call
    pub tx_calls: Mutex<Vec<String>>,
}

impl FakeRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub fn push_page(&self, wallet: &str, page: Result<Vec<&str>, RpcError>) {
        let page = page.map(|p| p.into_iter().map(|s| s.to_string()).collect());
        self.signature_pages
            .lock()
            .unwrap()
            .entry(wallet.to_string())
            .or_default()
            .push_back(page);
    }

    pub fn insert_tx(&self, signature: &str, tx: Value) {
        self.transactions
            .lock()
            .unwrap()
            .insert(signature.to_string(), tx);
    }

    pub fn fail_tx(&self, signature: &str, err: RpcError) {
        self.tx_failures
            .lock()
            .unwrap()
            .entry(signature.to_string())
            .or_default()
            .push_back(err);
    }

    pub fn set_token_accounts(&self, res: Result<Vec<Value>, RpcError>) {
        *self.token_accounts.lock().unwrap() = Some(res);
    }

    pub fn tx_calls(&self) -> Vec<String> {
        self.tx_calls.lock().unwrap().clone()
    }

    pub fn signature_calls(&self) -> Vec<(String, Option<String>)> {
        self.signature_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SolanaRpc for FakeRpc {
    async fn get_signatures_for_address(
        &self,
        address: &str,
        until: Option<&str>,
        _limit: usize,
    ) -> Result<Vec<String>, RpcError> {
        self.signature_calls
            .lock()
            .unwrap()
            .push((address.to_string(), until.map(|s| s.to_string())));

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        self.signature_pages
            .lock()
            .unwrap()
            .get_mut(address)
            .and_then(|q| q.pop_front())
            .unwrap_or_else(|| Ok(vec![]))
    }

    async fn get_transaction(&self, signature: &str) -> Result<Option<Value>, RpcError> {
        self.tx_calls.lock().unwrap().push(signature.to_string());

        if let Some(err) = self
            .tx_failures
            .lock()
            .unwrap()
            .get_mut(signature)
            .and_then(|q| q.pop_front())
        {
            return Err(err);
        }

        Ok(self.transactions.lock().unwrap().get(signature).cloned())
    }

    async fn get_token_accounts_by_owner(
        &self,
        _owner: &str,
        _mint: &str,
    ) -> Result<Vec<Value>, RpcError> {
        self.token_accounts
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(vec![]))
    }
}

/// Records every message it is asked to deliver.
#[derive(Default)]
pub struct FakeChannel {
    pub sent: Mutex<Vec<String>>,
    failing: bool,
}

impl FakeChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertChannel for FakeChannel {
    async fn send(&self, content: &str) -> Result<(), ChannelError> {
        self.sent.lock().unwrap().push(content.to_string());
        if self.failing {
            return Err(ChannelError::Status {
                status: 500,
                body: "internal error".to_string(),
            });
        }
        Ok(())
    }
}

/// jsonParsed transaction with a single transferChecked instruction.
pub fn transfer_tx(source: &str, destination: &str, ui_amount: f64) -> Value {
    json!({
        "blockTime": 1718049600,
        "transaction": { "message": { "instructions": [{
            "programId": TOKEN_PROGRAM_ID,
            "program": "spl-token",
            "parsed": {
                "type": "transferChecked",
                "info": {
                    "source": source,
                    "destination": destination,
                    "mint": "MintA",
                    "tokenAmount": { "decimals": 6, "uiAmount": ui_amount }
                }
            }
        }] } }
    })
}

/// jsonParsed transaction with a single plain `transfer` of `raw` base units
/// between two accounts of a 6-decimal "MintA".
pub fn plain_transfer_tx(source: &str, destination: &str, raw: &str) -> Value {
    json!({
        "blockTime": 1718049600,
        "meta": {
            "preTokenBalances": [],
            "postTokenBalances": [
                { "accountIndex": 1, "mint": "MintA", "uiTokenAmount": { "decimals": 6 } },
                { "accountIndex": 2, "mint": "MintA", "uiTokenAmount": { "decimals": 6 } }
            ]
        },
        "transaction": { "message": {
            "accountKeys": [
                { "pubkey": "FeePayer", "signer": true, "writable": true },
                { "pubkey": source, "signer": false, "writable": true },
                { "pubkey": destination, "signer": false, "writable": true }
            ],
            "instructions": [{
                "programId": TOKEN_PROGRAM_ID,
                "program": "spl-token",
                "parsed": {
                    "type": "transfer",
                    "info": { "source": source, "destination": destination, "amount": raw }
                }
            }]
        } }
    })
}

/// jsonParsed transaction that never touches the token program.
pub fn system_transfer_tx(source: &str) -> Value {
    json!({
        "blockTime": 1718049600,
        "transaction": { "message": { "instructions": [{
            "programId": "11111111111111111111111111111111",
            "program": "system",
            "parsed": {
                "type": "transfer",
                "info": { "source": source, "destination": "Elsewhere", "lamports": 1000 }
            }
        }] } }
    })
}
