use crate::classifier::Classifier;
use crate::notifier::{AlertChannel, Notifier};
use crate::rpc::SolanaRpc;
use crate::stats::Stats;
use crate::tracker::{SignatureTracker, TrackerState};
use anyhow::{Context, Result};
use log::{debug, error, info};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    /// Pause after a wallet that had new signatures
    pub wallet_pacing: Duration,
    /// Pause after a wallet cycle fails
    pub error_pacing: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            wallet_pacing: Duration::from_secs(2),
            error_pacing: Duration::from_secs(5),
        }
    }
}

/// Sequential poller over a fixed wallet list. Owns the cursor state; one
/// wallet is in flight at a time so every RPC call shares one rate budget.
pub struct PollLoop {
    wallets: Vec<String>,
    state: TrackerState,
    tracker: SignatureTracker,
    classifier: Classifier,
    notifier: Notifier,
    settings: PollSettings,
    stats: Arc<Stats>,
}

impl PollLoop {
    pub fn new(
        rpc: Arc<dyn SolanaRpc>,
        channel: Arc<dyn AlertChannel>,
        wallets: Vec<String>,
        settings: PollSettings,
    ) -> Self {
        let stats = Arc::new(Stats::new());

        Self {
            state: TrackerState::new(wallets.iter().cloned()),
            wallets,
            tracker: SignatureTracker::new(rpc.clone()),
            classifier: Classifier::new(rpc, stats.clone()),
            notifier: Notifier::new(channel, stats.clone()),
            settings,
            stats,
        }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Polls forever. Returns only when the future is dropped.
    pub async fn run(&mut self) {
        loop {
            self.run_pass().await;
        }
    }

    /// One pass over every wallet. Wallets with new signatures are followed
    /// by the wallet pacing, failed ones by the error pacing.
    pub async fn run_pass(&mut self) {
        for i in 0..self.wallets.len() {
            let wallet = self.wallets[i].clone();

            match self.cycle_wallet(&wallet).await {
                // nothing new: straight on to the next wallet
                Ok(0) => {}
                Ok(n) => {
                    debug!("wallet={wallet} processed {n} signatures");
                    sleep(self.settings.wallet_pacing).await;
                }
                Err(e) => {
                    Stats::bump(&self.stats.wallet_errors);
                    error!("error processing wallet {wallet}: {e:?}");
                    sleep(self.settings.error_pacing).await;
                }
            }
        }

        Stats::bump(&self.stats.passes);
        let s = self.stats.snapshot();
        info!(
            "stats: passes={} signatures={} unavailable={} transfers={} alerts_sent={} alert_failures={} wallet_errors={}",
            s.passes,
            s.signatures_seen,
            s.tx_unavailable,
            s.transfers,
            s.alerts_sent,
            s.alert_failures,
            s.wallet_errors
        );
    }

    /// Fetches a wallet's new signatures, advances its cursor to the newest
    /// one, then classifies and alerts oldest first. Returns the batch size.
    pub async fn cycle_wallet(&mut self, wallet: &str) -> Result<usize> {
        let cursor = self.state.cursor(wallet).map(|c| c.to_string());

        let batch = self
            .tracker
            .get_new(wallet, cursor.as_deref())
            .await
            .with_context(|| format!("fetching signatures for {wallet}"))?;

        if batch.is_empty() {
            return Ok(0);
        }

        // Advance before processing so nothing in this batch is ever attempted twice
        self.state.advance(wallet, &batch);
        self.stats
            .signatures_seen
            .fetch_add(batch.len() as u64, Ordering::Relaxed);

        for signature in batch.iter().rev() {
            if let Some(record) = self.classifier.classify(signature, wallet).await {
                Stats::bump(&self.stats.transfers);
                self.notifier.notify(wallet, &record).await;
            }
        }

        Ok(batch.len())
    }
}
