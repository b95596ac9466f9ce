//! Outbound email client
//!
//! The dispatcher sends through [`EmailSender`]; production uses a
//! Resend-compatible HTTP API (`POST {from, to, subject, html}` → `{id}`).

use super::delivery::DeliveryError;
use async_trait::async_trait;
use ca_common::config::EmailConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// Provider acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmailReceipt {
    pub id: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt, DeliveryError>;
}

pub struct ResendClient {
    http_client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl ResendClient {
    pub fn new(config: &EmailConfig) -> Result<Self, DeliveryError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DeliveryError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl EmailSender for ResendClient {
    async fn send(&self, message: &EmailMessage) -> Result<EmailReceipt, DeliveryError> {
        let api_key = self.api_key.as_deref().ok_or(DeliveryError::NotConfigured)?;

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(message)
            .send()
            .await
            .map_err(|e| DeliveryError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<EmailReceipt>()
            .await
            .map_err(|e| DeliveryError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_api_key_fails_without_network() {
        let client = ResendClient::new(&EmailConfig::default()).unwrap();
        let message = EmailMessage {
            from: "a@example.com".to_string(),
            to: vec!["b@example.com".to_string()],
            subject: "s".to_string(),
            html: "<p>x</p>".to_string(),
        };
        assert!(matches!(
            client.send(&message).await,
            Err(DeliveryError::NotConfigured)
        ));
    }

    #[test]
    fn test_message_wire_shape() {
        let message = EmailMessage {
            from: "ContractAnalyser <r@example.com>".to_string(),
            to: vec!["b@example.com".to_string()],
            subject: "Ready".to_string(),
            html: "<p>x</p>".to_string(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["to"][0], "b@example.com");
        assert_eq!(json["subject"], "Ready");
        assert_eq!(json["html"], "<p>x</p>");
    }
}
