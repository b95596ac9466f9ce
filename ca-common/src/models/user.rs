//! User profile and global settings snapshot

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Settings key controlling report emails for every user
pub const GLOBAL_EMAIL_REPORTS_ENABLED: &str = "global_email_reports_enabled";

/// Account data relevant to analysis and delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub is_admin: bool,
    /// Per-user opt-out of report emails
    pub email_reports_enabled: bool,
    pub preferred_language: String,
}

impl UserProfile {
    /// Name used in greetings: display name, else the email local part
    pub fn greeting_name(&self) -> &str {
        match self.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(&self.email),
        }
    }
}

/// Snapshot of the global settings row, read once per request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    pub global_email_reports_enabled: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            global_email_reports_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(display_name: Option<&str>) -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            email: "jordan@example.com".to_string(),
            display_name: display_name.map(str::to_string),
            is_admin: false,
            email_reports_enabled: true,
            preferred_language: "en".to_string(),
        }
    }

    #[test]
    fn test_greeting_name_prefers_display_name() {
        assert_eq!(profile(Some("Jordan Lee")).greeting_name(), "Jordan Lee");
    }

    #[test]
    fn test_greeting_name_falls_back_to_email() {
        assert_eq!(profile(None).greeting_name(), "jordan");
        assert_eq!(profile(Some("  ")).greeting_name(), "jordan");
    }

    #[test]
    fn test_settings_default_enables_email() {
        assert!(AppSettings::default().global_email_reports_enabled);
    }
}
