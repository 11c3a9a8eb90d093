use crate::retry::{RetryPolicy, with_backoff};
use crate::rpc::{RpcError, SolanaRpc};
use crate::stats::Stats;
use log::{debug, info};
use schema::TransferRecord;
use serde_json::Value;
use std::sync::Arc;

/// Outcome of fetching one transaction.
#[derive(Debug)]
pub enum TxFetch {
    Found(Value),
    /// Node answered with `result: null`
    Absent,
    /// Retry budget exhausted or a non-rate-limit error
    Unavailable(RpcError),
}

pub struct Classifier {
    rpc: Arc<dyn SolanaRpc>,
    policy: RetryPolicy,
    stats: Arc<Stats>,
}

impl Classifier {
    pub fn new(rpc: Arc<dyn SolanaRpc>, stats: Arc<Stats>) -> Self {
        Self {
            rpc,
            policy: RetryPolicy::TRANSACTION,
            stats,
        }
    }

    pub async fn fetch(&self, signature: &str) -> TxFetch {
        let rpc = self.rpc.as_ref();

        let res = with_backoff(
            &self.policy,
            &format!("getTransaction sig={signature}"),
            move || rpc.get_transaction(signature),
        )
        .await;

        match res {
            Ok(Some(tx)) => TxFetch::Found(tx),
            Ok(None) => TxFetch::Absent,
            Err(e) => TxFetch::Unavailable(e),
        }
    }

    /// Token transfer in `signature` that involves `wallet`, if any.
    pub async fn classify(&self, signature: &str, wallet: &str) -> Option<TransferRecord> {
        let tx = match self.fetch(signature).await {
            TxFetch::Found(tx) => tx,
            TxFetch::Absent => {
                info!("transaction {signature} has no data");
                return None;
            }
            TxFetch::Unavailable(e) => {
                Stats::bump(&self.stats.tx_unavailable);
                info!("transaction {signature} could not be fetched: {e}");
                return None;
            }
        };

        let record = schema::extract_transfer(&tx, signature, wallet);
        match &record {
            Some(r) => debug!(
                "sig={signature} wallet={wallet}: {} amount={} decimals={} sender={}",
                r.transfer_type.as_str(),
                r.amount,
                r.decimals,
                r.wallet_is_sender
            ),
            None => debug!("sig={signature} wallet={wallet}: no token transfer for wallet"),
        }
        record
    }
}
