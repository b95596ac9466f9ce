//! Redlined clause viewer
//!
//! Sibling of the report renderer: a single [`RedlinedClauseArtifact`] becomes
//! a standalone localized HTML page. In the redlined version `~~text~~` marks
//! a deletion and `++text++` an insertion.

use super::html::{html_escape, page};
use ca_common::models::RedlinedClauseArtifact;
use ca_common::Locale;
use std::fmt::Write;

const STYLESHEET: &str = "\
body{font-family:-apple-system,Segoe UI,Helvetica,Arial,sans-serif;max-width:760px;margin:0 auto;padding:24px;color:#1f2937;line-height:1.6}\
section{border:1px solid #e5e7eb;border-radius:8px;padding:16px;margin:16px 0}\
h2{margin-top:0;font-size:16px;text-transform:uppercase;color:#6b7280}\
del{background:#fee2e2;color:#991b1b}ins{background:#dcfce7;color:#166534;text-decoration:none}\
.suggested{background:#f0fdf4}";

pub fn render_redlined_artifact(
    locale: &Locale,
    artifact: &RedlinedClauseArtifact,
    output_language: &str,
) -> String {
    let label = |key: &str| html_escape(&locale.lookup(key, output_language));
    let mut body = String::new();

    let _ = writeln!(body, "<h1>{}</h1>", label("redlined_title"));
    let _ = writeln!(
        body,
        "<section class=\"original\"><h2>{}</h2><p>{}</p></section>",
        label("original_clause"),
        html_escape(&artifact.original_clause)
    );
    let _ = writeln!(
        body,
        "<section class=\"redlined\"><h2>{}</h2><p>{}</p></section>",
        label("redlined_version"),
        redline_markup(&artifact.redlined_version)
    );
    let _ = writeln!(
        body,
        "<section class=\"suggested\"><h2>{}</h2><p>{}</p></section>",
        label("suggested_revision"),
        html_escape(&artifact.suggested_revision)
    );

    page(
        output_language,
        &locale.lookup("redlined_title", output_language),
        STYLESHEET,
        &body,
    )
}

/// Escape `text`, then turn deletion/insertion markers into `<del>`/`<ins>`
pub fn redline_markup(text: &str) -> String {
    let escaped = html_escape(text);
    let with_deletions = apply_marker(&escaped, "~~", "del");
    apply_marker(&with_deletions, "++", "ins")
}

/// Replace balanced `marker` pairs with `<tag>`; an unpaired marker stays literal
fn apply_marker(text: &str, marker: &str, tag: &str) -> String {
    let parts: Vec<&str> = text.split(marker).collect();
    let paired_markers = (parts.len() - 1) / 2 * 2;
    let mut out = String::with_capacity(text.len());

    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            let marker_index = i - 1;
            if marker_index >= paired_markers {
                out.push_str(marker);
            } else if marker_index % 2 == 0 {
                let _ = write!(out, "<{}>", tag);
            } else {
                let _ = write!(out, "</{}>", tag);
            }
        }
        out.push_str(part);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn artifact() -> RedlinedClauseArtifact {
        RedlinedClauseArtifact {
            id: Uuid::from_u128(3),
            finding_id: Some(Uuid::from_u128(4)),
            original_clause: "Supplier's liability is unlimited.".to_string(),
            redlined_version: "Supplier's liability is ~~unlimited~~ ++capped at fees paid++.".to_string(),
            suggested_revision: "Supplier's liability is capped at fees paid.".to_string(),
        }
    }

    #[test]
    fn test_markers_become_tags() {
        assert_eq!(
            redline_markup("a ~~b~~ ++c++ d"),
            "a <del>b</del> <ins>c</ins> d"
        );
    }

    #[test]
    fn test_unpaired_marker_stays_literal() {
        assert_eq!(redline_markup("x ~~y~~ z ~~w"), "x <del>y</del> z ~~w");
        assert_eq!(redline_markup("C++ rules"), "C++ rules");
    }

    #[test]
    fn test_markup_is_escaped_first() {
        assert_eq!(redline_markup("~~<b>~~"), "<del>&lt;b&gt;</del>");
    }

    #[test]
    fn test_render_sections_in_order() {
        let html = render_redlined_artifact(Locale::builtin(), &artifact(), "en");
        let original = html.find("class=\"original\"").unwrap();
        let redlined = html.find("class=\"redlined\"").unwrap();
        let suggested = html.find("class=\"suggested\"").unwrap();
        assert!(original < redlined && redlined < suggested);
        assert!(html.contains("<del>unlimited</del>"));
        assert!(html.contains("Supplier&#39;s liability"));
    }

    #[test]
    fn test_render_localized_and_deterministic() {
        let a = render_redlined_artifact(Locale::builtin(), &artifact(), "fr");
        let b = render_redlined_artifact(Locale::builtin(), &artifact(), "fr");
        assert_eq!(a, b);
        assert!(a.contains("<html lang=\"fr\">"));
        assert!(!a.contains("Original clause"));
    }
}
