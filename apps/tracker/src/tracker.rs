use crate::retry::{RetryPolicy, with_backoff};
use crate::rpc::{RpcError, SolanaRpc};
use std::collections::HashMap;
use std::sync::Arc;

/// getSignaturesForAddress page size
pub const PAGE_SIZE: usize = 20;

/// Last processed signature per wallet. `None` means nothing seen yet:
/// the next poll starts from the current tip.
#[derive(Debug, Default)]
pub struct TrackerState {
    cursors: HashMap<String, Option<String>>,
}

impl TrackerState {
    pub fn new<I, S>(wallets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cursors: wallets.into_iter().map(|w| (w.into(), None)).collect(),
        }
    }

    pub fn cursor(&self, wallet: &str) -> Option<&str> {
        self.cursors.get(wallet).and_then(|c| c.as_deref())
    }

    /// Moves the wallet's cursor to the newest signature of a newest-first batch.
    /// Empty batches leave the cursor alone.
    pub fn advance(&mut self, wallet: &str, batch: &[String]) {
        if let Some(newest) = batch.first() {
            self.cursors
                .insert(wallet.to_string(), Some(newest.clone()));
        }
    }

    pub fn wallet_count(&self) -> usize {
        self.cursors.len()
    }
}

pub struct SignatureTracker {
    rpc: Arc<dyn SolanaRpc>,
    policy: RetryPolicy,
    page_size: usize,
}

impl SignatureTracker {
    pub fn new(rpc: Arc<dyn SolanaRpc>) -> Self {
        Self {
            rpc,
            policy: RetryPolicy::SIGNATURES,
            page_size: PAGE_SIZE,
        }
    }

    /// Signatures newer than `last`, newest first, at most one page.
    /// Rate limits are retried without bound; other errors go to the caller.
    pub async fn get_new(&self, wallet: &str, last: Option<&str>) -> Result<Vec<String>, RpcError> {
        let rpc = self.rpc.as_ref();
        let page_size = self.page_size;

        let sigs = with_backoff(
            &self.policy,
            &format!("getSignaturesForAddress wallet={wallet}"),
            move || rpc.get_signatures_for_address(wallet, last, page_size),
        )
        .await?;

        // `until` is exclusive on conforming nodes; drop the cursor if one echoes it
        Ok(sigs
            .into_iter()
            .filter(|s| Some(s.as_str()) != last)
            .collect())
    }
}
