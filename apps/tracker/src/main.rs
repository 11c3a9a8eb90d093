use anyhow::Result;
use log::{error, info};
use std::{fs::OpenOptions, path::Path, sync::Arc};

mod balance;
mod classifier;
mod config;
mod notifier;
mod poll;
mod retry;
mod rpc;
mod stats;
mod tracker;

#[cfg(test)]
mod testing;

use notifier::{AlertChannel, DiscordWebhook};
use poll::{PollLoop, PollSettings};
use rpc::{RpcClient, SolanaRpc};

fn setup_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    let _ = builder.try_init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging(config::log_file().as_deref())?;

    let cfg = config::load()?;

    info!("wallet tracker starting:");
    info!("  rpc_url={}", cfg.rpc_url);
    info!("  rpc_min_delay_ms={}", cfg.rpc_min_delay_ms);
    info!("  wallet_pacing={:?}", cfg.wallet_pacing);
    info!("  error_pacing={:?}", cfg.error_pacing);

    let rpc: Arc<dyn SolanaRpc> = Arc::new(RpcClient::new(cfg.rpc_url.clone(), cfg.rpc_min_delay_ms));
    let channel: Arc<dyn AlertChannel> = Arc::new(DiscordWebhook::new(cfg.webhook_url.clone()));

    let mut poll = PollLoop::new(
        rpc,
        channel,
        cfg.wallets.clone(),
        PollSettings {
            wallet_pacing: cfg.wallet_pacing,
            error_pacing: cfg.error_pacing,
        },
    );

    info!("  wallets={}", poll.state().wallet_count());

    // The poll loop never finishes; dropping it on CTRL+C cancels any in-flight sleep.
    let signal = tokio::select! {
        _ = poll.run() => None,
        res = tokio::signal::ctrl_c() => Some(res),
    };

    match signal {
        Some(Ok(())) => info!("received CTRL+C, shutting down"),
        Some(Err(e)) => {
            error!("failed to listen for CTRL+C, polling without shutdown handler: {e}");
            poll.run().await;
        }
        None => {}
    }

    let s = poll.stats().snapshot();
    info!(
        "shutdown. passes={} signatures={} transfers={} alerts_sent={} alert_failures={}",
        s.passes, s.signatures_seen, s.transfers, s.alerts_sent, s.alert_failures
    );

    Ok(())
}
