//! HTML report renderer
//!
//! Pure transformation of a persisted [`AnalysisResult`] into a standalone,
//! localized HTML document. No I/O; identical inputs give byte-identical
//! output (the date shown and the copyright year come from the result's
//! `created_at`, not the clock).

use super::html::{html_escape, list, page};
use super::scoring::ScoreBand;
use ca_common::models::{AdvancedAnalysis, AnalysisResult, ContractDate, Finding, RiskLevel};
use ca_common::Locale;
use chrono::Datelike;
use std::fmt::Write;

const STYLESHEET: &str = "\
body{font-family:-apple-system,Segoe UI,Helvetica,Arial,sans-serif;max-width:860px;margin:0 auto;padding:24px;color:#1f2937;line-height:1.5}\
header{border-bottom:2px solid #e5e7eb;margin-bottom:24px}\
h1{margin:0 0 8px}h2{margin-top:32px;color:#111827}\
.meta{color:#6b7280;margin:4px 0}\
.score-box{border-radius:8px;padding:16px 20px;margin:16px 0;color:#fff}\
.score-box .score{font-size:40px;font-weight:700}\
.score-low-risk{background:#15803d}.score-moderate-risk{background:#ca8a04}\
.score-elevated-risk{background:#ea580c}.score-high-risk{background:#b91c1c}\
.badge{display:inline-block;border-radius:12px;padding:2px 10px;font-size:12px;font-weight:600;color:#fff}\
.badge-high{background:#b91c1c}.badge-medium{background:#ea580c}.badge-low{background:#ca8a04}.badge-none{background:#6b7280}\
.card{border:1px solid #e5e7eb;border-radius:8px;padding:16px;margin:12px 0}\
dl{display:grid;grid-template-columns:max-content 1fr;gap:4px 16px}dt{font-weight:600}dd{margin:0}\
footer{margin-top:40px;border-top:1px solid #e5e7eb;padding-top:12px;color:#6b7280;font-size:13px}";

/// Links that depend on where the report is published
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportLinks {
    /// Viewer URL for the redlined clause; the raw artifact path is used when absent
    pub redlined_viewer_url: Option<String>,
}

/// Render a report with no publication-specific links
pub fn render_report(
    locale: &Locale,
    result: &AnalysisResult,
    contract_name: &str,
    output_language: &str,
) -> String {
    render_report_with_links(locale, result, contract_name, output_language, &ReportLinks::default())
}

pub fn render_report_with_links(
    locale: &Locale,
    result: &AnalysisResult,
    contract_name: &str,
    output_language: &str,
    links: &ReportLinks,
) -> String {
    let r = Renderer {
        locale,
        lang: output_language,
    };
    let mut body = String::new();

    r.header(&mut body, result, contract_name);
    r.executive_summary(&mut body, result);
    r.score_box(&mut body, result.compliance_score);

    if let Some(text) = result.data_protection_text() {
        let _ = writeln!(
            body,
            "<section class=\"data-protection\"><h2>{}</h2><p>{}</p></section>",
            r.t("data_protection_impact"),
            html_escape(text)
        );
    }

    let artifact_path = result.redlined_clause_artifact_path.as_deref();
    if result.performed_advanced_analysis() || artifact_path.is_some() {
        let fallback = AdvancedAnalysis::default();
        r.advanced(&mut body, result.advanced.as_ref().unwrap_or(&fallback));
    }

    if let Some(path) = artifact_path {
        let href = links.redlined_viewer_url.as_deref().unwrap_or(path);
        let _ = writeln!(
            body,
            "<p class=\"redlined-link\"><a href=\"{}\">{}</a></p>",
            html_escape(href),
            r.t("view_redlined_clause")
        );
    }

    r.jurisdictions(&mut body, result);
    r.findings(&mut body, &result.findings);
    r.footer(&mut body, result);

    page(
        output_language,
        &locale.lookup("report_title", output_language),
        STYLESHEET,
        &body,
    )
}

struct Renderer<'a> {
    locale: &'a Locale,
    lang: &'a str,
}

impl Renderer<'_> {
    /// Escaped label
    fn t(&self, key: &str) -> String {
        html_escape(&self.locale.lookup(key, self.lang))
    }

    fn badge(&self, level: RiskLevel) -> String {
        format!(
            "<span class=\"badge badge-{}\">{}</span>",
            level.as_str(),
            self.t(level.message_key())
        )
    }

    fn optional(&self, value: Option<&String>) -> String {
        match value {
            Some(text) => html_escape(text),
            None => self.t("not_specified"),
        }
    }

    fn date(&self, value: &ContractDate) -> String {
        match value.date() {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => self.t("not_specified"),
        }
    }

    fn header(&self, out: &mut String, result: &AnalysisResult, contract_name: &str) {
        let _ = writeln!(
            out,
            "<header><h1>{}</h1><p class=\"meta\">{}: {}</p><p class=\"meta\">{}: {}</p></header>",
            self.t("report_title"),
            self.t("contract_name"),
            html_escape(contract_name),
            self.t("analysis_date"),
            result.created_at.format("%Y-%m-%d")
        );
    }

    fn executive_summary(&self, out: &mut String, result: &AnalysisResult) {
        let _ = writeln!(
            out,
            "<section class=\"executive-summary\"><h2>{}</h2><p>{}</p></section>",
            self.t("executive_summary"),
            html_escape(&result.executive_summary)
        );
    }

    fn score_box(&self, out: &mut String, score: u8) {
        let band = ScoreBand::for_score(score);
        let _ = writeln!(
            out,
            "<section class=\"score-box {}\"><h2>{}</h2><div class=\"score\">{}/100</div><div>{}</div></section>",
            band.css_class(),
            self.t("compliance_score"),
            score,
            self.t(band.message_key())
        );
    }

    fn advanced(&self, out: &mut String, advanced: &AdvancedAnalysis) {
        let parties = if advanced.parties.is_empty() {
            self.t("not_specified")
        } else {
            html_escape(&advanced.parties.join(", "))
        };

        let rows = [
            ("effective_date", self.date(&advanced.effective_date)),
            ("termination_date", self.date(&advanced.termination_date)),
            ("renewal_date", self.date(&advanced.renewal_date)),
            ("contract_type", self.optional(advanced.contract_type.as_ref())),
            ("contract_value", self.optional(advanced.contract_value.as_ref())),
            ("parties", parties),
            ("liability_cap", self.optional(advanced.liability_cap_summary.as_ref())),
            (
                "indemnification",
                self.optional(advanced.indemnification_clause_summary.as_ref()),
            ),
            (
                "confidentiality",
                self.optional(advanced.confidentiality_obligations_summary.as_ref()),
            ),
        ];

        let _ = write!(
            out,
            "<section class=\"advanced-analysis\"><h2>{}</h2><dl>",
            self.t("advanced_analysis")
        );
        for (key, value) in rows {
            let _ = write!(out, "<dt>{}</dt><dd>{}</dd>", self.t(key), value);
        }
        out.push_str("</dl></section>\n");
    }

    fn jurisdictions(&self, out: &mut String, result: &AnalysisResult) {
        if result.jurisdiction_summaries.is_empty() {
            return;
        }

        let _ = writeln!(
            out,
            "<section class=\"jurisdictions\"><h2>{}</h2>",
            self.t("jurisdiction_summaries")
        );
        for (jurisdiction, summary) in &result.jurisdiction_summaries {
            let label = self.locale.label_for("jurisdiction", jurisdiction, self.lang);
            let _ = writeln!(
                out,
                "<div class=\"card jurisdiction\"><h3>{} {}</h3>",
                html_escape(&label),
                self.badge(summary.risk_level)
            );
            if !summary.applicable_laws.is_empty() {
                let _ = write!(out, "<h4>{}</h4>{}", self.t("applicable_laws"), list(&summary.applicable_laws));
            }
            if !summary.key_findings.is_empty() {
                let _ = write!(out, "<h4>{}</h4>{}", self.t("key_findings"), list(&summary.key_findings));
            }
            out.push_str("</div>\n");
        }
        out.push_str("</section>\n");
    }

    fn findings(&self, out: &mut String, findings: &[Finding]) {
        if findings.is_empty() {
            return;
        }

        let _ = writeln!(out, "<section class=\"findings\"><h2>{}</h2>", self.t("findings"));
        for finding in findings {
            let badge = match finding.risk_level {
                RiskLevel::None => String::new(),
                level => format!(" {}", self.badge(level)),
            };
            let _ = write!(
                out,
                "<div class=\"card finding\"><h3>{}{}</h3><p class=\"meta\">{}: {} &middot; {}: {}</p>",
                html_escape(&finding.title),
                badge,
                self.t("jurisdiction"),
                html_escape(&self.locale.label_for("jurisdiction", &finding.jurisdiction, self.lang)),
                self.t("category"),
                html_escape(&self.locale.label_for("category", &finding.category, self.lang)),
            );
            if let Some(reference) = &finding.clause_reference {
                let _ = write!(
                    out,
                    "<p class=\"meta\">{}: {}</p>",
                    self.t("clause_reference"),
                    html_escape(reference)
                );
            }
            let _ = write!(out, "<p>{}</p>", html_escape(&finding.description));
            if !finding.recommendations.is_empty() {
                let _ = write!(
                    out,
                    "<h4>{}</h4>{}",
                    self.t("recommendations"),
                    list(&finding.recommendations)
                );
            }
            out.push_str("</div>\n");
        }
        out.push_str("</section>\n");
    }

    fn footer(&self, out: &mut String, result: &AnalysisResult) {
        let year = result.created_at.year().to_string();
        let _ = writeln!(
            out,
            "<footer><p>{}</p><p>{}</p></footer>",
            html_escape(&self.locale.lookup_with("footer_copyright", self.lang, &[("year", &year)])),
            self.t("footer_disclaimer")
        );
    }
}
