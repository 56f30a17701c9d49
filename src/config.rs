use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub gateway: Gateway,
    #[serde(default)]
    pub sms: Sms,
    #[serde(default)]
    pub webhook: Webhook,
    pub http: Http,
}

#[derive(Debug, Clone)]
pub struct Gateway {
    pub url: String,
    pub username: String,
    pub password: String,
    pub sender: String,
    pub insecure: bool,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Sms {
    #[serde(rename = "defaultRecipient")]
    pub default_recipient: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct Webhook {
    pub secret: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Http {
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        tracing::info!("Loading config from file");

        let config = std::fs::read_to_string(path)?;
        Ok(serde_norway::from_str(&config)?)
    }
}

impl Gateway {
    /// Create a new Gateway config, resolving the password from an environment variable if needed
    pub fn new(
        url: String,
        username: String,
        password: Option<String>,
        password_from: Option<String>,
        sender: String,
        insecure: bool,
    ) -> anyhow::Result<Self> {
        let password = if password.is_none() && password_from.is_some() {
            std::env::var(password_from.unwrap())?
        } else {
            password.unwrap_or_default()
        };

        Ok(Self {
            url,
            username,
            password,
            sender,
            insecure,
        })
    }
}

impl<'de> Deserialize<'de> for Gateway {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct GatewayRaw {
            url: String,
            username: String,
            password: Option<String>,
            #[serde(rename = "passwordFrom")]
            password_from: Option<String>,
            sender: String,
            #[serde(default)]
            insecure: Option<bool>,
        }

        let raw = GatewayRaw::deserialize(deserializer)?;
        Gateway::new(
            raw.url,
            raw.username,
            raw.password,
            raw.password_from,
            raw.sender,
            // The legacy gateway runs with a self-signed certificate
            raw.insecure.unwrap_or(true),
        )
        .map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Webhook {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct WebhookRaw {
            secret: Option<String>,
            #[serde(rename = "secretFrom")]
            secret_from: Option<String>,
        }

        let raw = WebhookRaw::deserialize(deserializer)?;

        let secret = match (raw.secret, raw.secret_from) {
            (Some(secret), _) => Some(secret),
            (None, Some(var)) => Some(std::env::var(var).map_err(serde::de::Error::custom)?),
            (None, None) => None,
        };

        // An empty secret disables the token check entirely
        Ok(Webhook {
            secret: secret.filter(|secret| !secret.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let yaml = r#"
gateway:
  url: https://kannel.internal:13013/cgi-bin/sendsms
  username: relay
  password: hunter2
  sender: Grafana
  insecure: false
sms:
  defaultRecipient: "+46700000000"
webhook:
  secret: topsecret
http:
  host: 0.0.0.0
  port: 8080
"#;

        let config: Config = serde_norway::from_str(yaml).unwrap();
        assert_eq!(config.gateway.username, "relay");
        assert_eq!(config.gateway.password, "hunter2");
        assert!(!config.gateway.insecure);
        assert_eq!(config.sms.default_recipient.as_deref(), Some("+46700000000"));
        assert_eq!(config.webhook.secret.as_deref(), Some("topsecret"));
        assert_eq!(config.http.port, 8080);
    }

    #[test]
    fn insecure_defaults_to_true() {
        let yaml = r#"
gateway:
  url: http://kannel:13013/cgi-bin/sendsms
  username: relay
  password: hunter2
  sender: Grafana
http:
  host: 127.0.0.1
  port: 8080
"#;

        let config: Config = serde_norway::from_str(yaml).unwrap();
        assert!(config.gateway.insecure);
        assert!(config.webhook.secret.is_none());
        assert!(config.sms.default_recipient.is_none());
    }

    #[test]
    fn empty_secret_disables_auth() {
        let yaml = r#"
gateway:
  url: http://kannel:13013/cgi-bin/sendsms
  username: relay
  password: hunter2
  sender: Grafana
webhook:
  secret: ""
http:
  host: 127.0.0.1
  port: 8080
"#;

        let config: Config = serde_norway::from_str(yaml).unwrap();
        assert!(config.webhook.secret.is_none());
    }

    #[test]
    fn password_resolved_from_environment() {
        std::env::set_var("SMS_RELAY_TEST_PASSWORD", "from-env");

        let yaml = r#"
gateway:
  url: http://kannel:13013/cgi-bin/sendsms
  username: relay
  passwordFrom: SMS_RELAY_TEST_PASSWORD
  sender: Grafana
http:
  host: 127.0.0.1
  port: 8080
"#;

        let config: Config = serde_norway::from_str(yaml).unwrap();
        assert_eq!(config.gateway.password, "from-env");
    }
}
