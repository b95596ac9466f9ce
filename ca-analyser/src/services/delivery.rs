//! Report delivery dispatcher
//!
//! Decides whether a report email goes out and, if so, builds the localized
//! message and hands it to the [`EmailSender`]. Gates are checked in a fixed
//! order and the first closed gate wins:
//!
//! 1. the caller's `send_email` flag
//! 2. the global `global_email_reports_enabled` setting
//! 3. the user's `email_reports_enabled` preference
//!
//! Provider failures are returned as [`DeliveryError`]; this module does not
//! retry.

use super::email_client::{EmailMessage, EmailSender};
use super::html::html_escape;
use ca_common::models::{AppSettings, UserProfile};
use ca_common::Locale;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Email provider not configured: missing API key")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Email provider error {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Invalid email provider response: {0}")]
    InvalidResponse(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DeliveryError {
    /// Stable failure code exposed to API callers in place of provider text
    pub fn code(&self) -> &'static str {
        match self {
            DeliveryError::NotConfigured => "not_configured",
            DeliveryError::Network(_) => "network_error",
            DeliveryError::Provider { .. } => "provider_error",
            DeliveryError::InvalidResponse(_) => "invalid_response",
            DeliveryError::Storage(_) => "storage_error",
        }
    }
}

/// Which gate stopped a delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    CallerOptOut,
    GloballyDisabled,
    UserOptOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryDecision {
    Send,
    Skip(SkipReason),
}

/// Apply the three gates in order
pub fn decide(send_email: bool, global_enabled: bool, user_enabled: bool) -> DeliveryDecision {
    if !send_email {
        DeliveryDecision::Skip(SkipReason::CallerOptOut)
    } else if !global_enabled {
        DeliveryDecision::Skip(SkipReason::GloballyDisabled)
    } else if !user_enabled {
        DeliveryDecision::Skip(SkipReason::UserOptOut)
    } else {
        DeliveryDecision::Send
    }
}

/// # Examples
///
/// ```
/// use ca_analyser::services::delivery::should_send;
///
/// assert!(should_send(true, true, true));
/// assert!(!should_send(false, true, true));
/// ```
pub fn should_send(send_email: bool, global_enabled: bool, user_enabled: bool) -> bool {
    decide(send_email, global_enabled, user_enabled) == DeliveryDecision::Send
}

/// What happened to a report email, as reported to API callers
///
/// Failures carry only a [`DeliveryError::code`]; the full error is logged
/// where it happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent { message_id: String },
    Skipped { reason: SkipReason },
    Failed { code: &'static str },
}

impl From<Result<DispatchOutcome, DeliveryError>> for DeliveryStatus {
    fn from(result: Result<DispatchOutcome, DeliveryError>) -> Self {
        match result {
            Ok(DispatchOutcome::Sent { message_id }) => DeliveryStatus::Sent { message_id },
            Ok(DispatchOutcome::Skipped(reason)) => DeliveryStatus::Skipped { reason },
            Err(e) => DeliveryStatus::Failed { code: e.code() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent { message_id: String },
    Skipped(SkipReason),
}

/// Everything needed to notify one user about one report
#[derive(Debug, Clone)]
pub struct ReportDelivery<'a> {
    pub recipient: &'a UserProfile,
    pub settings: AppSettings,
    pub send_email: bool,
    pub contract_name: &'a str,
    pub compliance_score: u8,
    pub report_url: &'a str,
    pub language: &'a str,
}

/// Localized report-ready email
pub fn build_report_email(locale: &Locale, from: &str, delivery: &ReportDelivery<'_>) -> EmailMessage {
    let lang = delivery.language;
    let score = delivery.compliance_score.to_string();

    let subject = locale.lookup_with("email_subject", lang, &[("contract", delivery.contract_name)]);
    let greeting = locale.lookup_with("email_greeting", lang, &[("name", delivery.recipient.greeting_name())]);
    let body = locale.lookup_with(
        "email_body",
        lang,
        &[("contract", delivery.contract_name), ("score", &score)],
    );

    let html = format!(
        "<!DOCTYPE html>\n<html lang=\"{lang}\"><body style=\"font-family:Helvetica,Arial,sans-serif;color:#1f2937\">\
         <p>{greeting}</p><p>{body}</p>\
         <p><a href=\"{url}\" style=\"background:#1d4ed8;color:#fff;padding:10px 18px;border-radius:6px;text-decoration:none\">{view}</a></p>\
         <p style=\"color:#6b7280;font-size:12px\">{footer}</p></body></html>\n",
        lang = html_escape(lang),
        greeting = html_escape(&greeting),
        body = html_escape(&body),
        url = html_escape(delivery.report_url),
        view = html_escape(&locale.lookup("email_view_report", lang)),
        footer = html_escape(&locale.lookup("email_footer", lang)),
    );

    EmailMessage {
        from: from.to_string(),
        to: vec![delivery.recipient.email.clone()],
        subject,
        html,
    }
}

pub struct DeliveryDispatcher {
    sender: Arc<dyn EmailSender>,
    from_address: String,
}

impl DeliveryDispatcher {
    pub fn new(sender: Arc<dyn EmailSender>, from_address: impl Into<String>) -> Self {
        Self {
            sender,
            from_address: from_address.into(),
        }
    }

    pub async fn dispatch(
        &self,
        locale: &Locale,
        delivery: &ReportDelivery<'_>,
    ) -> Result<DispatchOutcome, DeliveryError> {
        let decision = decide(
            delivery.send_email,
            delivery.settings.global_email_reports_enabled,
            delivery.recipient.email_reports_enabled,
        );

        if let DeliveryDecision::Skip(reason) = decision {
            info!(user_id = %delivery.recipient.id, reason = ?reason, "Report email skipped");
            return Ok(DispatchOutcome::Skipped(reason));
        }

        let message = build_report_email(locale, &self.from_address, delivery);
        match self.sender.send(&message).await {
            Ok(receipt) => {
                info!(
                    user_id = %delivery.recipient.id,
                    message_id = %receipt.id,
                    "Report email sent"
                );
                Ok(DispatchOutcome::Sent {
                    message_id: receipt.id,
                })
            }
            Err(e) => {
                warn!(user_id = %delivery.recipient.id, error = %e, "Report email failed");
                Err(e)
            }
        }
    }
}
