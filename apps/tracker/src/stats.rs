use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct Stats {
    pub passes: AtomicU64,
    pub signatures_seen: AtomicU64,
    pub tx_unavailable: AtomicU64,
    pub transfers: AtomicU64,
    pub alerts_sent: AtomicU64,
    pub alert_failures: AtomicU64,
    pub wallet_errors: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub passes: u64,
    pub signatures_seen: u64,
    pub tx_unavailable: u64,
    pub transfers: u64,
    pub alerts_sent: u64,
    pub alert_failures: u64,
    pub wallet_errors: u64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            passes: self.passes.load(Ordering::Relaxed),
            signatures_seen: self.signatures_seen.load(Ordering::Relaxed),
            tx_unavailable: self.tx_unavailable.load(Ordering::Relaxed),
            transfers: self.transfers.load(Ordering::Relaxed),
            alerts_sent: self.alerts_sent.load(Ordering::Relaxed),
            alert_failures: self.alert_failures.load(Ordering::Relaxed),
            wallet_errors: self.wallet_errors.load(Ordering::Relaxed),
        }
    }
}
