use anyhow::{Result, anyhow};
use std::{env, path::PathBuf, time::Duration};

const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
const DEFAULT_LOG_FILE: &str = "wallet_tracker.log";
/// Spacing between RPC requests; an idle pass over the wallets is otherwise unthrottled
const DEFAULT_RPC_MIN_DELAY_MS: u64 = 250;

pub const DEFAULT_WALLETS: &[&str] = &[
    "3rSZJHysEk2ueFVovRLtZ8LGnQBMZGg96H2Q4jErspAF",
    "DGPYpCdiVg2shab2TnNiZ2RnsjBQSmhgN71hJyWC5cYn",
    "8zFZHuSRuDpuAR7J6FzwyF3vKNx4CVW3DFHJerQhc7Zd",
    "26kZ9rg8Y5pd4j1tdT4cbT8BQRu5uDbXkaVs3L5QasHy",
    "8deJ9xeUvXSJwicYptA9mHsU2rN2pDx37KWzkDkEXhU6",
    "7SDs3PjT2mswKQ7Zo4FTucn9gJdtuW4jaacPA65BseHS",
    "BrNoqdHUCcv9yTncnZeSjSov8kqhpmzv1nAiPbq1M95H",
    "4aDdi3EiDPMbeZ3e5BvbFMt4vfJaoahaHxZuwKQRtFc1",
    "BHCm58VsiSq9p3hqjprLAs6wtjXjtuGnz6vj1i3Upe7X",
];

#[derive(Clone, Debug)]
pub struct Config {
    pub rpc_url: String,
    pub webhook_url: String,
    pub wallets: Vec<String>,
    pub rpc_min_delay_ms: u64,
    pub wallet_pacing: Duration,
    pub error_pacing: Duration,
}

pub fn load() -> Result<Config> {
    let rpc_url = env::var("SOLANA_RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string());

    let webhook_url = env::var("DISCORD_WEBHOOK_URL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| anyhow!("Missing DISCORD_WEBHOOK_URL"))?;

    let wallets = match env::var("TRACKED_WALLETS") {
        Ok(raw) => parse_wallets(&raw)?,
        Err(_) => parse_wallets(&DEFAULT_WALLETS.join(","))?,
    };

    let rpc_min_delay_ms = parse_u64(
        "RPC_MIN_DELAY_MS",
        env::var("RPC_MIN_DELAY_MS").ok(),
        DEFAULT_RPC_MIN_DELAY_MS,
    )?;
    let wallet_pacing = Duration::from_millis(parse_u64(
        "WALLET_PACING_MS",
        env::var("WALLET_PACING_MS").ok(),
        2000,
    )?);
    let error_pacing = Duration::from_millis(parse_u64(
        "ERROR_PACING_MS",
        env::var("ERROR_PACING_MS").ok(),
        5000,
    )?);

    Ok(Config {
        rpc_url,
        webhook_url,
        wallets,
        rpc_min_delay_ms,
        wallet_pacing,
        error_pacing,
    })
}

/// Log sink path; `LOG_FILE=""` means stderr.
pub fn log_file() -> Option<PathBuf> {
    match env::var("LOG_FILE") {
        Ok(v) if v.trim().is_empty() => None,
        Ok(v) => Some(PathBuf::from(v)),
        Err(_) => Some(PathBuf::from(DEFAULT_LOG_FILE)),
    }
}

/// Comma-separated wallet list: trimmed, deduplicated in order, each a
/// base58 32-byte public key.
pub fn parse_wallets(raw: &str) -> Result<Vec<String>> {
    let mut out: Vec<String> = Vec::new();

    for w in raw.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let bytes = bs58::decode(w)
            .into_vec()
            .map_err(|e| anyhow!("invalid wallet address {w}: {e}"))?;
        if bytes.len() != 32 {
            return Err(anyhow!(
                "invalid wallet address {w}: decodes to {} bytes, expected 32",
                bytes.len()
            ));
        }
        if !out.iter().any(|x| x == w) {
            out.push(w.to_string());
        }
    }

    if out.is_empty() {
        return Err(anyhow!("TRACKED_WALLETS is empty"));
    }

    Ok(out)
}

fn parse_u64(name: &str, v: Option<String>, default: u64) -> Result<u64> {
    match v.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(s) => s
            .parse::<u64>()
            .map_err(|e| anyhow!("Invalid {name}={s}: {e}")),
    }
}
