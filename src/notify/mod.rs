//! SMS notifications to users and vendors. Delivery is fire-and-forget: a
//! booking outcome never depends on the gateway, and failures only log.

use serde_json::json;

use crate::config::Config;

#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    gateway_url: Option<String>,
    api_key: Option<String>,
}

impl Notifier {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            gateway_url: config.sms_gateway_url.clone(),
            api_key: config.sms_gateway_key.clone(),
        }
    }

    /// Queue a message without blocking the caller. Called after commit so a
    /// rolled-back transaction never notifies anyone.
    pub fn send_later(&self, phone: String, message: String) {
        let notifier = self.clone();
        tokio::spawn(async move {
            notifier.send(&phone, &message).await;
        });
    }

    async fn send(&self, phone: &str, message: &str) {
        let Some(url) = &self.gateway_url else {
            tracing::info!(phone = %phone, message = %message, "SMS gateway not configured, logging only");
            return;
        };

        let mut request = self.client.post(url).json(&json!({
            "to": phone,
            "message": message,
        }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(phone = %phone, "SMS dispatched");
            }
            Ok(response) => {
                tracing::warn!(phone = %phone, status = %response.status(), "SMS gateway rejected message");
            }
            Err(e) => {
                tracing::warn!(phone = %phone, error = %e, "SMS delivery failed");
            }
        }
    }
}
