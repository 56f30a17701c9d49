use crate::config::Gateway as GatewayConfig;
use std::future::Future;

/// One SMS about to leave the system. Constructed, sent, discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub to: String,
    pub text: String,
}

/// Seam for dispatching one SMS, so the batch loop can be exercised
/// without a live gateway. Returns the gateway's response body.
pub trait SmsSender {
    fn send(&self, message: &OutboundMessage)
        -> impl Future<Output = anyhow::Result<String>> + Send;
}

pub struct Gateway {
    config: GatewayConfig,
    client: reqwest::Client,
}

impl Gateway {
    /// Create a new Gateway client
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .build()?;

        Ok(Self { config, client })
    }
}

impl SmsSender for Gateway {
    /// Send one message through the Kannel-style sendsms GET API.
    /// Coding is fixed to Unicode so the status glyphs survive transport.
    async fn send(&self, message: &OutboundMessage) -> anyhow::Result<String> {
        let response = self
            .client
            .get(&self.config.url)
            .query(&[
                ("username", self.config.username.as_str()),
                ("password", self.config.password.as_str()),
                ("coding", "2"),
                ("charset", "utf-8"),
                ("from", self.config.sender.as_str()),
                ("to", message.to.as_str()),
                ("text", message.text.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "Gateway rejected SMS: HTTP {} - {}",
                status,
                body.trim()
            ));
        }

        Ok(body)
    }
}
