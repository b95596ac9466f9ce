//! Locale lookup ("translation table")
//!
//! Every user-facing label in reports and emails is looked up by message key
//! and language code. Resolution order: requested language → English → the
//! key itself, so a lookup never fails.
//!
//! Jurisdiction and category labels are keyed by a slug of free text
//! (`jurisdiction_` + `slugify("European Union")`); when no table knows the
//! slug, [`Locale::label_for`] returns the raw input instead.

mod tables;

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Fallback language for every lookup
pub const DEFAULT_LANGUAGE: &str = "en";

static BUILTIN: Lazy<Locale> = Lazy::new(|| {
    let mut locale = Locale::empty();
    for (language, entries) in tables::ALL {
        locale.insert_table(language, entries.iter().copied());
    }
    locale
});

/// Message tables keyed by language code
#[derive(Debug, Clone, Default)]
pub struct Locale {
    tables: HashMap<String, HashMap<String, String>>,
}

impl Locale {
    /// Locale with no tables; every lookup falls through to the key
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in tables (en, es, de, fr)
    pub fn builtin() -> &'static Locale {
        &BUILTIN
    }

    /// Add or extend the table for `language`
    pub fn insert_table<'a, I>(&mut self, language: &str, entries: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let table = self
            .tables
            .entry(normalize_language(language))
            .or_default();
        for (key, value) in entries {
            table.insert(key.to_string(), value.to_string());
        }
    }

    /// True when a table exists for `language`
    pub fn supports(&self, language: &str) -> bool {
        self.tables.contains_key(&normalize_language(language))
    }

    fn find(&self, key: &str, language: &str) -> Option<&str> {
        let language = normalize_language(language);
        self.tables
            .get(&language)
            .and_then(|t| t.get(key))
            .or_else(|| self.tables.get(DEFAULT_LANGUAGE).and_then(|t| t.get(key)))
            .map(String::as_str)
    }

    /// Look up `key` in `language`, falling back to English, then to the key
    ///
    /// # Examples
    ///
    /// ```
    /// use ca_common::Locale;
    ///
    /// let locale = Locale::builtin();
    /// assert_eq!(locale.lookup("risk_high", "en"), "High Risk");
    /// assert_eq!(locale.lookup("no_such_key", "es"), "no_such_key");
    /// ```
    pub fn lookup(&self, key: &str, language: &str) -> String {
        self.find(key, language).unwrap_or(key).to_string()
    }

    /// Look up `key` and substitute `{name}` placeholders from `params`
    pub fn lookup_with(&self, key: &str, language: &str, params: &[(&str, &str)]) -> String {
        let mut text = self.lookup(key, language);
        for (name, value) in params {
            text = text.replace(&format!("{{{}}}", name), value);
        }
        text
    }

    /// Localized label for `prefix_<slug(raw)>`, or `raw` when unknown
    ///
    /// # Examples
    ///
    /// ```
    /// use ca_common::Locale;
    ///
    /// let locale = Locale::builtin();
    /// assert_eq!(locale.label_for("jurisdiction", "European Union", "en"), "European Union (EU)");
    /// assert_eq!(locale.label_for("jurisdiction", "Atlantis", "en"), "Atlantis");
    /// ```
    pub fn label_for(&self, prefix: &str, raw: &str, language: &str) -> String {
        let key = format!("{}_{}", prefix, slugify(raw));
        match self.find(&key, language) {
            Some(label) => label.to_string(),
            None => raw.to_string(),
        }
    }
}

/// Normalize a language code: lowercase primary subtag, default `en`
///
/// `"pt-BR"` → `"pt"`, `" ES "` → `"es"`, `""` → `"en"`
pub fn normalize_language(code: &str) -> String {
    let primary = code
        .trim()
        .split(|c: char| c == '-' || c == '_')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if primary.is_empty() {
        DEFAULT_LANGUAGE.to_string()
    } else {
        primary
    }
}

/// Turn free text into a message-key slug
///
/// Lowercases, collapses runs of whitespace, `-` and `_` into a single `_`,
/// and drops other non-alphanumeric characters.
///
/// # Examples
///
/// ```
/// use ca_common::locale::slugify;
///
/// assert_eq!(slugify("European Union"), "european_union");
/// assert_eq!(slugify("  Data-Protection (GDPR) "), "data_protection_gdpr");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_sep = false;

    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_sep = true;
        }
    }

    slug
}
