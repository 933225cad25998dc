//! Telegram Bot API notifier.
//!
//! Alerts are sent with `sendMessage` in HTML parse mode. See
//! <https://core.telegram.org/bots/api#sendmessage>.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use super::Notifier;
use crate::config::TelegramConfig;
use crate::error::NotifyError;

/// Maximum message length accepted by the Bot API.
const MAX_MESSAGE_CHARS: usize = 4096;

const API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    parse_mode: &'static str,
    text: String,
}

/// [`Notifier`] posting alerts to a Telegram chat.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_url: String,
    chat_id: String,
    source: String,
}

impl TelegramNotifier {
    /// Creates a notifier for the configured bot and chat.
    ///
    /// `source` is rendered in bold as the header of every alert.
    #[must_use]
    pub fn new(client: reqwest::Client, config: &TelegramConfig, source: impl Into<String>) -> Self {
        Self {
            client,
            api_url: format!("{API_BASE}/bot{}/SendMessage", config.token),
            chat_id: config.chat_id.clone(),
            source: source.into(),
        }
    }

    fn render(&self, message: &str) -> String {
        format!(
            "<strong>{}</strong>\n{}",
            escape_html(&self.source),
            escape_html(message)
        )
        .chars()
        .take(MAX_MESSAGE_CHARS)
        .collect()
    }
}

impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("chat_id", &self.chat_id)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            parse_mode: "HTML",
            text: self.render(message),
        };

        let response = self.client.post(&self.api_url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Escapes the characters that are significant in Telegram HTML mode.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_notifier() -> TelegramNotifier {
        let config = TelegramConfig {
            token: "123:abc".to_string(),
            chat_id: "42".to_string(),
        };
        TelegramNotifier::new(reqwest::Client::new(), &config, "EventBus")
    }

    #[test]
    fn api_url_embeds_token() {
        assert_eq!(
            make_notifier().api_url,
            "https://api.telegram.org/bot123:abc/SendMessage"
        );
    }

    #[test]
    fn debug_hides_api_url() {
        let rendered = format!("{:?}", make_notifier());
        assert!(!rendered.contains("123:abc"));
    }

    #[test]
    fn render_escapes_and_adds_header() {
        let text = make_notifier().render("handler <usd> failed: a & b");
        assert_eq!(
            text,
            "<strong>EventBus</strong>\nhandler &lt;usd&gt; failed: a &amp; b"
        );
    }

    #[test]
    fn render_truncates_long_messages() {
        let text = make_notifier().render(&"x".repeat(10_000));
        assert_eq!(text.chars().count(), MAX_MESSAGE_CHARS);
    }

    #[test]
    fn request_body_shape() {
        let body = SendMessage {
            chat_id: "42",
            parse_mode: "HTML",
            text: "hi".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap_or_default();
        assert_eq!(json["chat_id"], "42");
        assert_eq!(json["parse_mode"], "HTML");
        assert_eq!(json["text"], "hi");
    }
}
