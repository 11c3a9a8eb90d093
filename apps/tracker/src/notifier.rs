use crate::stats::Stats;
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use log::{error, info};
use reqwest::{Client, StatusCode};
use schema::TransferRecord;
use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const CHAIN_LABEL: &str = "Solana";
const EXPLORER_TX_URL: &str = "https://explorer.solana.com/tx/";
const TIME_FORMAT: &str = "%m-%d-%Y %I:%M:%S %p";

/// Discord webhook body
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("webhook returned status={status} body={body}")]
    Status { status: u16, body: String },
    #[error("webhook request failed: {0}")]
    Transport(String),
}

/// Outbound chat channel: one text payload per call.
#[async_trait]
pub trait AlertChannel: Send + Sync {
    async fn send(&self, content: &str) -> Result<(), ChannelError>;
}

pub struct DiscordWebhook {
    http: Client,
    url: String,
}

impl DiscordWebhook {
    pub fn new(url: String) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self { http, url }
    }
}

#[async_trait]
impl AlertChannel for DiscordWebhook {
    async fn send(&self, content: &str) -> Result<(), ChannelError> {
        let resp = self
            .http
            .post(&self.url)
            .json(&WebhookPayload { content })
            .send()
            .await
            .map_err(|e| ChannelError::Transport(format!("{e:?}")))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        check_delivery(status, body)
    }
}

/// Discord acknowledges an accepted webhook message with 204 and nothing else.
fn check_delivery(status: StatusCode, body: String) -> Result<(), ChannelError> {
    if status == StatusCode::NO_CONTENT {
        return Ok(());
    }
    Err(ChannelError::Status {
        status: status.as_u16(),
        body,
    })
}

pub struct Notifier {
    channel: Arc<dyn AlertChannel>,
    stats: Arc<Stats>,
}

impl Notifier {
    pub fn new(channel: Arc<dyn AlertChannel>, stats: Arc<Stats>) -> Self {
        Self { channel, stats }
    }

    /// Sends one alert. Delivery failures are logged and swallowed; there is no retry.
    pub async fn notify(&self, wallet: &str, record: &TransferRecord) -> bool {
        let content = format_alert(wallet, record);

        match self.channel.send(&content).await {
            Ok(()) => {
                Stats::bump(&self.stats.alerts_sent);
                info!("alert sent wallet={} sig={}", wallet, record.signature);
                true
            }
            Err(e) => {
                Stats::bump(&self.stats.alert_failures);
                error!(
                    "failed to send alert wallet={} sig={}: {e}",
                    wallet, record.signature
                );
                false
            }
        }
    }
}

/// Alert text with the block time rendered in the host's local time zone.
pub fn format_alert(wallet: &str, record: &TransferRecord) -> String {
    format_alert_in(wallet, record, &Local)
}

pub fn format_alert_in<Tz>(wallet: &str, record: &TransferRecord, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let action = if record.wallet_is_sender { "Sold" } else { "Bought" };
    let mint = record.mint.as_deref().unwrap_or("Unknown");

    format!(
        "🔔 **{}**\n\
         - **{}:** {} {}\n\
         - **Token:** {}\n\
         - **Chain:** {}\n\
         - **Transaction Details:** [View on Explorer]({}{})\n\
         - **Time:** `{}`\n",
        wallet_label(wallet),
        action,
        format_amount(record.amount),
        mint,
        mint,
        CHAIN_LABEL,
        EXPLORER_TX_URL,
        record.signature,
        format_timestamp(record.timestamp, tz),
    )
}

/// First 5 and last 4 characters joined by an ellipsis.
pub fn wallet_label(wallet: &str) -> String {
    let chars: Vec<char> = wallet.chars().collect();
    if chars.len() <= 9 {
        return wallet.to_string();
    }
    let head: String = chars[..5].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Two decimals with thousands separators, e.g. `81,668,701.18`.
pub fn format_amount(amount: f64) -> String {
    let fixed = format!("{amount:.2}");
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(d) => ("-", d),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{sign}{grouped}.{frac_part}")
}

pub fn format_timestamp<Tz>(ts: Option<DateTime<Utc>>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match ts {
        Some(t) => t.with_timezone(tz).format(TIME_FORMAT).to_string(),
        None => "Unknown".to_string(),
    }
}
