use crate::{
    alert::{BatchResult, WebhookPayload},
    config::Config,
    gateway::{Gateway, OutboundMessage, SmsSender},
    message::{budget::budget, compose::compose},
    metrics,
};

/// Processes the alerts of one webhook batch: compose, budget, resolve a
/// destination, dispatch. Delivery failures never abort the batch.
pub struct Relay<S = Gateway> {
    config: Config,
    gateway: S,
}

impl Relay<Gateway> {
    /// Create a new Relay instance
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let gateway = Gateway::new(config.gateway.clone())?;

        Ok(Self { config, gateway })
    }
}

impl<S: SmsSender + Sync> Relay<S> {
    /// Create a Relay with a specific sender implementation
    pub fn with_sender(config: Config, gateway: S) -> Self {
        Self { config, gateway }
    }

    /// Process one webhook batch, sequentially and in payload order
    #[tracing::instrument(skip_all)]
    pub async fn process(&self, payload: &WebhookPayload) -> BatchResult {
        let mut result = BatchResult::default();

        for alert in &payload.alerts {
            let text = budget(&compose(alert));

            let to = alert
                .labels
                .get("phone")
                .filter(|phone| !phone.is_empty())
                .cloned()
                .or_else(|| {
                    self.config
                        .sms
                        .default_recipient
                        .clone()
                        .filter(|recipient| !recipient.is_empty())
                });

            let Some(to) = to else {
                tracing::warn!(
                    "No phone number for alert: {}",
                    alert.labels.get("alertname").map_or("<unnamed>", String::as_str)
                );
                metrics::record_sms_skipped();
                result.skipped += 1;
                continue;
            };

            let message = OutboundMessage { to, text };

            tracing::info!("Sending {} SMS to {}", alert.status, message.to);

            match self.gateway.send(&message).await {
                Ok(body) => {
                    tracing::info!(
                        "Successfully sent SMS to {}. Response: {}",
                        message.to,
                        body.trim()
                    );
                    metrics::record_sms_sent();
                    result.sent += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to send SMS to {}: {}", message.to, e);
                    metrics::record_sms_failed();
                    result.failed += 1;
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::Alert;
    use crate::config::{Gateway as GatewayConfig, Http, Sms, Webhook};
    use indexmap::IndexMap;
    use std::sync::Mutex;

    /// Records outbound messages; fails any message addressed to `fail_to`.
    struct FakeSender {
        sent: Mutex<Vec<OutboundMessage>>,
        fail_to: Option<String>,
    }

    impl FakeSender {
        fn new(fail_to: Option<&str>) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_to: fail_to.map(String::from),
            }
        }
    }

    impl SmsSender for FakeSender {
        async fn send(&self, message: &OutboundMessage) -> anyhow::Result<String> {
            if self.fail_to.as_deref() == Some(message.to.as_str()) {
                return Err(anyhow::anyhow!("Gateway rejected SMS: HTTP 500 - kaboom"));
            }

            self.sent.lock().unwrap().push(message.clone());
            Ok("0: Accepted for delivery".to_string())
        }
    }

    fn config(default_recipient: Option<&str>) -> Config {
        Config {
            gateway: GatewayConfig {
                url: "http://kannel:13013/cgi-bin/sendsms".to_string(),
                username: "relay".to_string(),
                password: "hunter2".to_string(),
                sender: "Grafana".to_string(),
                insecure: false,
            },
            sms: Sms {
                default_recipient: default_recipient.map(String::from),
            },
            webhook: Webhook::default(),
            http: Http {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
        }
    }

    fn alert(phone: Option<&str>) -> Alert {
        let mut labels = IndexMap::new();
        labels.insert("alertname".to_string(), "HighCPU".to_string());
        if let Some(phone) = phone {
            labels.insert("phone".to_string(), phone.to_string());
        }

        Alert {
            status: "firing".to_string(),
            labels,
            annotations: IndexMap::new(),
        }
    }

    fn payload(alerts: Vec<Alert>) -> WebhookPayload {
        WebhookPayload {
            status: "firing".to_string(),
            alerts,
            title: None,
            message: None,
        }
    }

    #[tokio::test]
    async fn alert_without_destination_is_skipped() {
        let sender = FakeSender::new(None);
        let relay = Relay::with_sender(config(None), sender);

        let payload = payload(vec![
            alert(Some("+46700000001")),
            alert(None),
            alert(Some("+46700000003")),
        ]);

        let result = relay.process(&payload).await;
        assert_eq!(result.sent, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.failed, 0);

        let sent = relay.gateway.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "+46700000001");
        assert_eq!(sent[1].to, "+46700000003");
    }

    #[tokio::test]
    async fn default_recipient_fills_in_missing_phone() {
        let sender = FakeSender::new(None);
        let relay = Relay::with_sender(config(Some("+46700000099")), sender);

        let result = relay.process(&payload(vec![alert(None)])).await;
        assert_eq!(result.sent, 1);

        let sent = relay.gateway.sent.lock().unwrap();
        assert_eq!(sent[0].to, "+46700000099");
    }

    #[tokio::test]
    async fn empty_phone_label_falls_back_to_default() {
        let sender = FakeSender::new(None);
        let relay = Relay::with_sender(config(Some("+46700000099")), sender);

        let result = relay.process(&payload(vec![alert(Some(""))])).await;
        assert_eq!(result.sent, 1);

        let sent = relay.gateway.sent.lock().unwrap();
        assert_eq!(sent[0].to, "+46700000099");
    }

    #[tokio::test]
    async fn gateway_failure_does_not_abort_batch() {
        let sender = FakeSender::new(Some("+46700000002"));
        let relay = Relay::with_sender(config(None), sender);

        let payload = payload(vec![
            alert(Some("+46700000001")),
            alert(Some("+46700000002")),
            alert(Some("+46700000003")),
        ]);

        let result = relay.process(&payload).await;
        assert_eq!(result.sent, 2);
        assert_eq!(result.failed, 1);

        let sent = relay.gateway.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
    }

    #[tokio::test]
    async fn messages_are_budgeted_before_dispatch() {
        let sender = FakeSender::new(None);
        let relay = Relay::with_sender(config(None), sender);

        let mut noisy = alert(Some("+46700000001"));
        noisy
            .annotations
            .insert("summary".to_string(), "x".repeat(300));

        let result = relay.process(&payload(vec![noisy])).await;
        assert_eq!(result.sent, 1);

        let sent = relay.gateway.sent.lock().unwrap();
        assert!(sent[0].text.starts_with("🔥 ALERT:"));
        assert!(crate::message::budget::adjusted_len(&sent[0].text) <= 140);
    }
}
