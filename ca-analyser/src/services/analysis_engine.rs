//! Contract analysis engine
//!
//! Turns raw contract text into an [`AnalysisResult`] with one JSON-mode model
//! call. The model's answer is never trusted structurally: every field goes
//! through an explicit normalization step before it reaches the rest of the
//! pipeline.
//!
//! The engine performs no persistence. Transient provider failures are
//! retried; unparseable output is terminal.

use super::llm_client::{GenerateOptions, LlmError, LlmProvider};
use super::translator::language_name;
use ca_common::locale::normalize_language;
use ca_common::models::{
    AdvancedAnalysis, AnalysisResult, ContractDate, Finding, JurisdictionSummary,
    RedlinedClauseArtifact, RiskLevel,
};
use ca_common::{retry_if, RetryPolicy};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

const DEFAULT_JURISDICTION: &str = "International";
const DEFAULT_CATEGORY: &str = "General";

/// Analysis failures
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Contract text is empty")]
    EmptyContract,

    #[error("LLM provider failed: {0}")]
    Provider(#[from] LlmError),

    #[error("Invalid model output: {0}")]
    InvalidModelOutput(String),

    #[error("Analysis timed out after {0} seconds")]
    Timeout(u64),
}

/// Input to one analysis run
#[derive(Debug, Clone, Copy)]
pub struct AnalysisRequest<'a> {
    pub contract_text: &'a str,
    /// Language every textual field must be written in
    pub output_language: &'a str,
    /// Also extract metadata and an optional redlined clause
    pub advanced: bool,
}

/// Normalized engine output
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    /// Suggested rewrite, only produced by advanced analysis
    pub redlined_clause: Option<RedlinedClauseArtifact>,
}

pub struct AnalysisEngine {
    llm: Arc<dyn LlmProvider>,
    retry_policy: RetryPolicy,
    temperature: f32,
}

impl AnalysisEngine {
    pub fn new(llm: Arc<dyn LlmProvider>, retry_policy: RetryPolicy, temperature: f32) -> Self {
        Self {
            llm,
            retry_policy,
            temperature,
        }
    }

    /// Analyze one contract
    ///
    /// **Errors:**
    /// - `EmptyContract`: blank contract text (no provider call)
    /// - `Provider`: provider failure after retries
    /// - `InvalidModelOutput`: the completion is not a JSON object
    pub async fn analyze(
        &self,
        contract_id: Uuid,
        request: &AnalysisRequest<'_>,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        if request.contract_text.trim().is_empty() {
            return Err(AnalysisError::EmptyContract);
        }

        let language = normalize_language(request.output_language);
        let system_prompt = build_system_prompt(&language, request.advanced);
        let user_prompt = format!("Contract text:\n\n{}", request.contract_text);

        info!(
            contract_id = %contract_id,
            language = %language,
            advanced = request.advanced,
            "Starting contract analysis"
        );

        let raw = retry_if(
            "llm analyze contract",
            self.retry_policy,
            |e: &LlmError| e.is_transient(),
            || {
                self.llm.generate(
                    &system_prompt,
                    &user_prompt,
                    GenerateOptions::json(self.temperature),
                )
            },
        )
        .await?;

        let outcome = parse_model_output(&raw, contract_id, request.advanced, Utc::now())?;

        info!(
            contract_id = %contract_id,
            findings = outcome.result.findings.len(),
            compliance_score = outcome.result.compliance_score,
            "Contract analysis complete"
        );

        Ok(outcome)
    }
}

/// Fixed instruction set for the analysis call
pub fn build_system_prompt(output_language: &str, advanced: bool) -> String {
    let language = language_name(output_language);

    let mut prompt = format!(
        r#"You are an expert legal analyst reviewing contracts for risk and regulatory compliance.

Respond with a single JSON object and nothing else: no markdown, no prose before or after it.

Write every textual value in {language}. Translate as you write; do not answer in English first.
The "jurisdiction" and "category" values and the keys of "jurisdictionSummaries" are identifiers:
always write those in English (for example "EU", "US", "UK", "Germany", "Data Protection", "Liability").

Schema:
{{
  "executiveSummary": string,
  "dataProtectionImpact": string or null,
  "complianceScore": integer,
  "jurisdictionSummaries": {{
    "<jurisdiction>": {{
      "applicableLaws": [string],
      "keyFindings": [string],
      "riskLevel": "high" | "medium" | "low" | "none"
    }}
  }},
  "findings": [
    {{
      "title": string,
      "description": string,
      "riskLevel": "high" | "medium" | "low" | "none",
      "jurisdiction": string,
      "category": string,
      "recommendations": [string],
      "clauseReference": string or null
    }}
  ]"#
    );

    if advanced {
        prompt.push_str(
            r#",
  "effectiveDate": "YYYY-MM-DD" or null,
  "terminationDate": "YYYY-MM-DD" or null,
  "renewalDate": "YYYY-MM-DD" or null,
  "contractType": string or null,
  "contractValue": string or null,
  "parties": [string],
  "liabilityCapSummary": string or null,
  "indemnificationClauseSummary": string or null,
  "confidentialityObligationsSummary": string or null,
  "redlinedClause": {
    "findingIndex": integer,
    "originalClause": string,
    "redlinedVersion": string,
    "suggestedRevision": string
  } or null"#,
        );
    }

    prompt.push_str(
        r#"
}

Compliance score: start at 100 and deduct 15 for each high-risk finding, 8 for each medium-risk
finding, 3 for each low-risk finding and 0 for findings with no risk. Never go below 0."#,
    );

    if advanced {
        prompt.push_str(
            r#"

Dates may be partial ("2025" or "2025-06") and must be null when the contract does not state them.
For "redlinedClause", pick the riskiest clause, quote it verbatim in "originalClause", mark deletions
as ~~text~~ and insertions as ++text++ in "redlinedVersion", and give the clean rewritten clause in
"suggestedRevision". "findingIndex" is the zero-based index of the finding it addresses."#,
        );
    }

    prompt
}

/// Remove a surrounding markdown code fence, if any
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") on the opening fence line
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Parse and normalize a raw model completion
pub fn parse_model_output(
    raw: &str,
    contract_id: Uuid,
    advanced: bool,
    created_at: DateTime<Utc>,
) -> Result<AnalysisOutcome, AnalysisError> {
    let value: Value = serde_json::from_str(strip_code_fences(raw))
        .map_err(|e| AnalysisError::InvalidModelOutput(format!("not valid JSON: {}", e)))?;

    let Value::Object(root) = value else {
        return Err(AnalysisError::InvalidModelOutput(
            "expected a JSON object".to_string(),
        ));
    };

    let executive_summary = text_field(&root, &["executiveSummary", "executive_summary"])
        .ok_or_else(|| {
            AnalysisError::InvalidModelOutput("missing executiveSummary".to_string())
        })?;

    let findings: Vec<Finding> = field(&root, &["findings"])
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(normalize_finding).collect())
        .unwrap_or_default();

    let advanced_analysis = advanced.then(|| normalize_advanced(&root));

    let redlined_clause = if advanced {
        normalize_redlined_clause(&root, &findings)
    } else {
        None
    };

    let result = AnalysisResult {
        id: Uuid::new_v4(),
        contract_id,
        executive_summary,
        data_protection_impact: text_field(&root, &["dataProtectionImpact", "data_protection_impact"]),
        compliance_score: normalize_score(field(&root, &["complianceScore", "compliance_score"])),
        jurisdiction_summaries: normalize_jurisdictions(field(
            &root,
            &["jurisdictionSummaries", "jurisdiction_summaries"],
        )),
        findings,
        advanced: advanced_analysis,
        redlined_clause_artifact_path: None,
        created_at,
    };

    Ok(AnalysisOutcome {
        result,
        redlined_clause,
    })
}

// ========================================
// Normalization helpers
// ========================================

fn field<'a>(object: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| object.get(*name))
}

/// Non-blank string (numbers are accepted and rendered as text)
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_field(object: &Map<String, Value>, names: &[&str]) -> Option<String> {
    field(object, names).and_then(as_text)
}

/// Strict list of strings; anything that is not an array becomes empty
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Like [`string_list`], but a lone string is taken as a one-item list
fn lenient_string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        other => string_list(other),
    }
}

/// Only JSON numbers count; rounded and clamped to 0..=100
fn normalize_score(value: Option<&Value>) -> u8 {
    value
        .and_then(Value::as_f64)
        .map(|n| n.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(0)
}

fn risk_level(object: &Map<String, Value>) -> RiskLevel {
    field(object, &["riskLevel", "overallRiskLevel", "risk_level"])
        .map(RiskLevel::from_value)
        .unwrap_or_default()
}

fn normalize_finding(value: &Value) -> Option<Finding> {
    let object = value.as_object()?;
    let title = text_field(object, &["title"]);
    let description = text_field(object, &["description"]);

    if title.is_none() && description.is_none() {
        debug!("Dropping finding without title or description");
        return None;
    }

    Some(Finding {
        id: Uuid::new_v4(),
        title: title.unwrap_or_default(),
        description: description.unwrap_or_default(),
        risk_level: risk_level(object),
        jurisdiction: text_field(object, &["jurisdiction"])
            .unwrap_or_else(|| DEFAULT_JURISDICTION.to_string()),
        category: text_field(object, &["category"]).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        recommendations: lenient_string_list(field(object, &["recommendations"])),
        clause_reference: text_field(object, &["clauseReference", "clause_reference"]),
    })
}

fn normalize_summary(object: &Map<String, Value>) -> JurisdictionSummary {
    JurisdictionSummary {
        applicable_laws: lenient_string_list(field(object, &["applicableLaws", "applicable_laws"])),
        key_findings: lenient_string_list(field(object, &["keyFindings", "key_findings"])),
        risk_level: risk_level(object),
    }
}

/// Accepts `{"EU": {...}}` or `[{"jurisdiction": "EU", ...}]`
fn normalize_jurisdictions(value: Option<&Value>) -> BTreeMap<String, JurisdictionSummary> {
    let mut summaries = BTreeMap::new();

    match value {
        Some(Value::Object(map)) => {
            for (key, summary) in map {
                let key = key.trim();
                if let Some(object) = summary.as_object().filter(|_| !key.is_empty()) {
                    summaries.insert(key.to_string(), normalize_summary(object));
                }
            }
        }
        Some(Value::Array(items)) => {
            for object in items.iter().filter_map(Value::as_object) {
                if let Some(key) = text_field(object, &["jurisdiction", "name"]) {
                    summaries.insert(key, normalize_summary(object));
                }
            }
        }
        _ => {}
    }

    summaries
}

fn date_field(object: &Map<String, Value>, names: &[&str]) -> ContractDate {
    field(object, names)
        .map(ContractDate::from_value)
        .unwrap_or_default()
}

fn normalize_advanced(root: &Map<String, Value>) -> AdvancedAnalysis {
    // Some models nest the metadata instead of emitting it at top level
    let source = field(root, &["advancedAnalysis", "advanced_analysis", "advanced"])
        .and_then(Value::as_object)
        .unwrap_or(root);

    AdvancedAnalysis {
        effective_date: date_field(source, &["effectiveDate", "effective_date"]),
        termination_date: date_field(source, &["terminationDate", "termination_date"]),
        renewal_date: date_field(source, &["renewalDate", "renewal_date"]),
        contract_type: text_field(source, &["contractType", "contract_type"]),
        contract_value: text_field(source, &["contractValue", "contract_value"]),
        parties: string_list(field(source, &["parties"])),
        liability_cap_summary: text_field(source, &["liabilityCapSummary", "liability_cap_summary"]),
        indemnification_clause_summary: text_field(
            source,
            &["indemnificationClauseSummary", "indemnification_clause_summary"],
        ),
        confidentiality_obligations_summary: text_field(
            source,
            &[
                "confidentialityObligationsSummary",
                "confidentiality_obligations_summary",
            ],
        ),
    }
}

fn normalize_redlined_clause(
    root: &Map<String, Value>,
    findings: &[Finding],
) -> Option<RedlinedClauseArtifact> {
    let object = field(root, &["redlinedClause", "redlined_clause"])?.as_object()?;

    let original_clause = text_field(object, &["originalClause", "original_clause"])?;
    let redlined_version = text_field(object, &["redlinedVersion", "redlined_version"])?;
    let suggested_revision = text_field(object, &["suggestedRevision", "suggested_revision"])?;

    let finding_id = field(object, &["findingIndex", "finding_index"])
        .and_then(Value::as_u64)
        .and_then(|index| findings.get(index as usize))
        .map(|finding| finding.id);

    Some(RedlinedClauseArtifact {
        id: Uuid::new_v4(),
        finding_id,
        original_clause,
        redlined_version,
        suggested_revision,
    })
}
