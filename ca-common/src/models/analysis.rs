//! Analysis result, findings and their value types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

// ========================================
// Risk Level
// ========================================

/// Risk level of a finding or jurisdiction
///
/// Anything outside {high, medium, low, none} normalizes to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
    #[default]
    None,
}

impl RiskLevel {
    /// Normalize free text (case and surrounding whitespace ignored)
    ///
    /// # Examples
    ///
    /// ```
    /// use ca_common::models::RiskLevel;
    ///
    /// assert_eq!(RiskLevel::normalize(" HIGH "), RiskLevel::High);
    /// assert_eq!(RiskLevel::normalize("critical"), RiskLevel::None);
    /// ```
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => RiskLevel::High,
            "medium" => RiskLevel::Medium,
            "low" => RiskLevel::Low,
            _ => RiskLevel::None,
        }
    }

    /// Normalize a JSON value; non-strings become `None`
    pub fn from_value(value: &Value) -> Self {
        value.as_str().map(Self::normalize).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "high",
            RiskLevel::Medium => "medium",
            RiskLevel::Low => "low",
            RiskLevel::None => "none",
        }
    }

    /// Locale message key for the badge label
    pub fn message_key(&self) -> &'static str {
        match self {
            RiskLevel::High => "risk_high",
            RiskLevel::Medium => "risk_medium",
            RiskLevel::Low => "risk_low",
            RiskLevel::None => "risk_none",
        }
    }

    /// Compliance-score points deducted per finding at this level
    pub fn deduction(&self) -> u32 {
        match self {
            RiskLevel::High => 15,
            RiskLevel::Medium => 8,
            RiskLevel::Low => 3,
            RiskLevel::None => 0,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(RiskLevel::from_value(&value))
    }
}

// ========================================
// Contract Date
// ========================================

/// Stored form of a date the contract does not specify
pub const NOT_SPECIFIED: &str = "not_specified";

/// A date-shaped contract field
///
/// Missing or unreadable dates are `NotSpecified`, never empty or null.
/// Partial dates are accepted: `"2024"` → 2024-01-01, `"2024-03"` → 2024-03-01.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContractDate {
    Specified(NaiveDate),
    #[default]
    NotSpecified,
}

impl ContractDate {
    /// Parse a full, partial or timestamped ISO date
    ///
    /// # Examples
    ///
    /// ```
    /// use ca_common::models::ContractDate;
    /// use chrono::NaiveDate;
    ///
    /// assert_eq!(
    ///     ContractDate::parse_lenient("2024"),
    ///     ContractDate::Specified(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    /// );
    /// assert_eq!(ContractDate::parse_lenient("soon"), ContractDate::NotSpecified);
    /// ```
    pub fn parse_lenient(raw: &str) -> Self {
        let date_part = raw
            .trim()
            .split(|c: char| c == 'T' || c == ' ')
            .next()
            .unwrap_or_default();
        if date_part.is_empty() || date_part.eq_ignore_ascii_case(NOT_SPECIFIED) {
            return ContractDate::NotSpecified;
        }

        let parts: Vec<&str> = date_part.split(|c: char| c == '-' || c == '/').collect();
        let numbers: Option<Vec<u32>> = parts.iter().map(|p| p.parse::<u32>().ok()).collect();
        let Some(numbers) = numbers else {
            return ContractDate::NotSpecified;
        };
        if parts[0].len() != 4 {
            return ContractDate::NotSpecified;
        }

        let date = match numbers.as_slice() {
            [year] => NaiveDate::from_ymd_opt(*year as i32, 1, 1),
            [year, month] => NaiveDate::from_ymd_opt(*year as i32, *month, 1),
            [year, month, day] => NaiveDate::from_ymd_opt(*year as i32, *month, *day),
            _ => None,
        };

        date.map(ContractDate::Specified)
            .unwrap_or(ContractDate::NotSpecified)
    }

    /// Read a JSON value; numbers are taken as a bare year
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::parse_lenient(s),
            Value::Number(n) => n
                .as_u64()
                .map(|year| Self::parse_lenient(&year.to_string()))
                .unwrap_or_default(),
            _ => ContractDate::NotSpecified,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            ContractDate::Specified(date) => Some(*date),
            ContractDate::NotSpecified => None,
        }
    }

    /// `YYYY-MM-DD` or the `not_specified` sentinel
    pub fn to_storage(&self) -> String {
        match self {
            ContractDate::Specified(date) => date.format("%Y-%m-%d").to_string(),
            ContractDate::NotSpecified => NOT_SPECIFIED.to_string(),
        }
    }
}

impl Serialize for ContractDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_storage())
    }
}

impl<'de> Deserialize<'de> for ContractDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(ContractDate::from_value(&value))
    }
}

// ========================================
// Findings and Summaries
// ========================================

/// One risk finding within an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub risk_level: RiskLevel,
    pub jurisdiction: String,
    pub category: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clause_reference: Option<String>,
}

/// Per-jurisdiction summary
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JurisdictionSummary {
    #[serde(default)]
    pub applicable_laws: Vec<String>,
    #[serde(default)]
    pub key_findings: Vec<String>,
    #[serde(default)]
    pub risk_level: RiskLevel,
}

/// Extracted metadata produced only by advanced analysis
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AdvancedAnalysis {
    #[serde(default)]
    pub effective_date: ContractDate,
    #[serde(default)]
    pub termination_date: ContractDate,
    #[serde(default)]
    pub renewal_date: ContractDate,
    pub contract_type: Option<String>,
    pub contract_value: Option<String>,
    #[serde(default)]
    pub parties: Vec<String>,
    pub liability_cap_summary: Option<String>,
    pub indemnification_clause_summary: Option<String>,
    pub confidentiality_obligations_summary: Option<String>,
}

/// Structured analysis of one contract (latest wins per contract)
///
/// Immutable after creation except for the artifact-path backfill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub executive_summary: String,
    pub data_protection_impact: Option<String>,
    /// Always within 0..=100
    pub compliance_score: u8,
    pub jurisdiction_summaries: BTreeMap<String, JurisdictionSummary>,
    pub findings: Vec<Finding>,
    pub advanced: Option<AdvancedAnalysis>,
    pub redlined_clause_artifact_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn performed_advanced_analysis(&self) -> bool {
        self.advanced.is_some()
    }

    /// Data-protection text if present and non-blank
    pub fn data_protection_text(&self) -> Option<&str> {
        self.data_protection_impact
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}
