use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, sleep};

/// JSON-RPC error code some providers use for throttling instead of HTTP 429
const RATE_LIMIT_CODE: i64 = 429;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("rpc rate limited")]
    RateLimited,
    #[error("rpc http error status={status} body={body}")]
    Http { status: u16, body: String },
    #[error("rpc returned error code={code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("rpc request failed: {0}")]
    Transport(String),
    #[error("rpc decode error: {0}")]
    Decode(String),
    #[error("missing result field")]
    MissingResult,
}

impl RpcError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, RpcError::RateLimited)
    }
}

/// The subset of the Solana JSON-RPC API the tracker consumes.
#[async_trait]
pub trait SolanaRpc: Send + Sync {
    /// Signatures for `address`, newest first. With `until` set, only
    /// signatures newer than it are returned.
    async fn get_signatures_for_address(
        &self,
        address: &str,
        until: Option<&str>,
        limit: usize,
    ) -> Result<Vec<String>, RpcError>;

    /// Full transaction (jsonParsed); `Ok(None)` when the node has no such transaction.
    async fn get_transaction(&self, signature: &str) -> Result<Option<Value>, RpcError>;

    /// Token accounts of `owner` for `mint` (jsonParsed).
    async fn get_token_accounts_by_owner(
        &self,
        owner: &str,
        mint: &str,
    ) -> Result<Vec<Value>, RpcError>;
}

#[derive(Clone)]
pub struct RpcClient {
    http: Client,
    url: String,
    min_delay: Duration,
    last_request: Arc<tokio::sync::Mutex<Instant>>,
}

impl RpcClient {
    pub fn new(url: String, min_delay_ms: u64) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .expect("reqwest client");

        Self {
            http,
            url,
            min_delay: Duration::from_millis(min_delay_ms),
            last_request: Arc::new(tokio::sync::Mutex::new(Instant::now())),
        }
    }

    /// Single JSON-RPC round trip. Retrying is the caller's decision.
    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        self.apply_rate_limit().await;

        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        let resp = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::Transport(format!("{e:?}")))?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(RpcError::RateLimited);
        }

        let text = resp
            .text()
            .await
            .map_err(|e| RpcError::Transport(format!("{e:?}")))?;
        let text = check_status(status, text)?;

        let v: Value =
            serde_json::from_str(&text).map_err(|e| RpcError::Decode(format!("{e:?}")))?;
        into_result(v)
    }

    async fn apply_rate_limit(&self) {
        if self.min_delay.is_zero() {
            return;
        }

        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();

        if elapsed < self.min_delay {
            sleep(self.min_delay - elapsed).await;
        }

        *last = Instant::now();
    }
}

#[async_trait]
impl SolanaRpc for RpcClient {
    async fn get_signatures_for_address(
        &self,
        address: &str,
        until: Option<&str>,
        limit: usize,
    ) -> Result<Vec<String>, RpcError> {
        let mut opts = json!({ "limit": limit });
        if let Some(u) = until {
            opts["until"] = json!(u);
        }

        let res = self
            .call("getSignaturesForAddress", json!([address, opts]))
            .await?;
        parse_signatures(&res)
    }

    async fn get_transaction(&self, signature: &str) -> Result<Option<Value>, RpcError> {
        let params = json!([
            signature,
            {"encoding": "jsonParsed", "maxSupportedTransactionVersion": 0}
        ]);
        let res = self.call("getTransaction", params).await?;
        Ok(if res.is_null() { None } else { Some(res) })
    }

    async fn get_token_accounts_by_owner(
        &self,
        owner: &str,
        mint: &str,
    ) -> Result<Vec<Value>, RpcError> {
        let params = json!([owner, {"mint": mint}, {"encoding": "jsonParsed"}]);
        let res = self.call("getTokenAccountsByOwner", params).await?;
        Ok(res
            .get("value")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default())
    }
}

/// Classifies the HTTP status of a JSON-RPC reply, passing the body through on success.
fn check_status(status: StatusCode, body: String) -> Result<String, RpcError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(RpcError::RateLimited);
    }
    if !status.is_success() {
        return Err(RpcError::Http {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

/// Maps a JSON-RPC response envelope to its `result`, classifying `error`.
fn into_result(v: Value) -> Result<Value, RpcError> {
    if let Some(err) = v.get("error") {
        let code = err.get("code").and_then(|c| c.as_i64()).unwrap_or(0);
        if code == RATE_LIMIT_CODE {
            return Err(RpcError::RateLimited);
        }
        let message = err
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or_default()
            .to_string();
        return Err(RpcError::Rpc { code, message });
    }

    v.get("result").cloned().ok_or(RpcError::MissingResult)
}

fn parse_signatures(res: &Value) -> Result<Vec<String>, RpcError> {
    let arr = res
        .as_array()
        .ok_or_else(|| RpcError::Decode("unexpected signatures result".to_string()))?;

    Ok(arr
        .iter()
        .filter_map(|item| item.get("signature").and_then(|v| v.as_str()))
        .map(|s| s.to_string())
        .collect())
}
