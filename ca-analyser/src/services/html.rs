//! Small HTML helpers shared by the report and artifact renderers

/// Escape text for element content and quoted attribute values
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Wrap `body` in a standalone HTML document
pub fn page(language: &str, title: &str, stylesheet: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>{style}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        lang = html_escape(language),
        title = html_escape(title),
        style = stylesheet,
        body = body,
    )
}

/// `<ul>` of escaped items; empty when there are no items
pub fn list(items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut html = String::from("<ul>");
    for item in items {
        html.push_str("<li>");
        html.push_str(&html_escape(item));
        html.push_str("</li>");
    }
    html.push_str("</ul>\n");
    html
}
