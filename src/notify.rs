use std::env;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, info};

/// Out-of-band alert channel for confirmed findings. Dispatch is
/// fire-and-forget: one attempt, failures are logged and never influence
/// the verdict being reported.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str);
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Telegram Bot API notifier, configured from `TELEGRAM_BOT_TOKEN` and
/// `TELEGRAM_CHAT_ID`.
pub struct TelegramNotifier {
    client: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn from_env() -> Option<Self> {
        let bot_token = env::var("TELEGRAM_BOT_TOKEN").ok()?;
        let chat_id = env::var("TELEGRAM_CHAT_ID").ok()?;
        Some(Self {
            client: reqwest::Client::new(),
            bot_token,
            chat_id,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text: message,
        };
        match self.client.post(&url).json(&payload).send().await {
            Ok(resp) if resp.status().is_success() => info!("telegram alert dispatched"),
            Ok(resp) => error!("telegram API returned {}", resp.status()),
            Err(err) => error!("could not send telegram alert: {err}"),
        }
    }
}

/// Stand-in when the Telegram credentials are absent: alerts are dropped,
/// the rest of the pipeline is unaffected.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn notify(&self, message: &str) {
        debug!("alert suppressed (notifier disabled): {message}");
    }
}
