//! Compliance scoring rule
//!
//! Start at 100, deduct per finding (high 15, medium 8, low 3, none 0), clamp
//! to 0..=100. The model is instructed to apply the same rule; its arithmetic
//! is checked against [`recompute_compliance_score`] after every analysis.

use ca_common::config::ScorePolicy;
use ca_common::models::{AnalysisResult, Finding, RiskLevel};
use tracing::warn;

const MAX_SCORE: u32 = 100;

/// Score implied by a list of findings
///
/// # Examples
///
/// ```
/// use ca_analyser::services::scoring::score_from_levels;
/// use ca_common::models::RiskLevel;
///
/// assert_eq!(score_from_levels([RiskLevel::High, RiskLevel::Low]), 82);
/// ```
pub fn score_from_levels<I>(levels: I) -> u8
where
    I: IntoIterator<Item = RiskLevel>,
{
    let deducted: u32 = levels.into_iter().map(|level| level.deduction()).sum();
    MAX_SCORE.saturating_sub(deducted) as u8
}

pub fn recompute_compliance_score(findings: &[Finding]) -> u8 {
    score_from_levels(findings.iter().map(|f| f.risk_level))
}

/// Four-tier banding used to style the score box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    /// score >= 80
    Low,
    /// 60..=79
    Moderate,
    /// 40..=59
    Elevated,
    /// below 40
    High,
}

impl ScoreBand {
    pub fn for_score(score: u8) -> Self {
        if score >= 80 {
            ScoreBand::Low
        } else if score >= 60 {
            ScoreBand::Moderate
        } else if score >= 40 {
            ScoreBand::Elevated
        } else {
            ScoreBand::High
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            ScoreBand::Low => "score-low-risk",
            ScoreBand::Moderate => "score-moderate-risk",
            ScoreBand::Elevated => "score-elevated-risk",
            ScoreBand::High => "score-high-risk",
        }
    }

    pub fn message_key(&self) -> &'static str {
        match self {
            ScoreBand::Low => "score_band_low",
            ScoreBand::Moderate => "score_band_moderate",
            ScoreBand::Elevated => "score_band_elevated",
            ScoreBand::High => "score_band_high",
        }
    }
}

/// Model score compared with the recomputed one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreCheck {
    pub reported: u8,
    pub expected: u8,
}

impl ScoreCheck {
    pub fn deviation(&self) -> i16 {
        self.reported as i16 - self.expected as i16
    }

    /// Tolerance is zero
    pub fn is_conformant(&self) -> bool {
        self.reported == self.expected
    }
}

pub fn check_score(result: &AnalysisResult) -> ScoreCheck {
    ScoreCheck {
        reported: result.compliance_score,
        expected: recompute_compliance_score(&result.findings),
    }
}

/// Flag a deviating model score and apply `policy`
///
/// Under [`ScorePolicy::Model`] the reported score is kept; under
/// [`ScorePolicy::Recomputed`] it is replaced.
pub fn enforce_score_policy(result: &mut AnalysisResult, policy: ScorePolicy) -> ScoreCheck {
    let check = check_score(result);

    if !check.is_conformant() {
        warn!(
            analysis_id = %result.id,
            contract_id = %result.contract_id,
            reported = check.reported,
            expected = check.expected,
            deviation = check.deviation(),
            "Model compliance score deviates from recomputed score"
        );

        if policy == ScorePolicy::Recomputed {
            result.compliance_score = check.expected;
        }
    }

    check
}
