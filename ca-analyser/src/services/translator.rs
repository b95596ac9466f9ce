//! Translation adapter
//!
//! Wraps a text-generation call to translate user-facing strings. Translation
//! never fails the caller: on any provider error the source text is returned.

use super::llm_client::{GenerateOptions, LlmError, LlmProvider};
use ca_common::locale::{normalize_language, DEFAULT_LANGUAGE};
use ca_common::{retry_if, RetryPolicy};
use futures::future::join_all;
use std::sync::Arc;
use tracing::warn;

const TRANSLATION_TEMPERATURE: f32 = 0.1;

/// Human-readable language name for prompts; unknown codes are passed through
pub fn language_name(code: &str) -> String {
    let name = match code {
        "en" => "English",
        "es" => "Spanish",
        "de" => "German",
        "fr" => "French",
        "it" => "Italian",
        "pt" => "Portuguese",
        "nl" => "Dutch",
        "pl" => "Polish",
        "sv" => "Swedish",
        "da" => "Danish",
        "ja" => "Japanese",
        "zh" => "Chinese",
        _ => return code.to_string(),
    };
    name.to_string()
}

pub struct Translator {
    llm: Arc<dyn LlmProvider>,
    retry_policy: RetryPolicy,
}

impl Translator {
    pub fn new(llm: Arc<dyn LlmProvider>, retry_policy: RetryPolicy) -> Self {
        Self { llm, retry_policy }
    }

    /// Translate `text` into `target_language`
    ///
    /// `source_language` defaults to English. Blank text, or a target equal to
    /// the source, is returned unchanged without calling the provider.
    pub async fn translate_text(
        &self,
        text: &str,
        target_language: &str,
        source_language: Option<&str>,
    ) -> String {
        let target = normalize_language(target_language);
        let source = normalize_language(source_language.unwrap_or(DEFAULT_LANGUAGE));

        if text.trim().is_empty() || target == source {
            return text.to_string();
        }

        let system_prompt = format!(
            "You are a professional legal translator. Translate the user's text from {} into {}. \
             If the text is already written in {}, return it unchanged. \
             Preserve legal terminology, numbers and formatting. \
             Respond with the translated text only, without quotes or commentary.",
            language_name(&source),
            language_name(&target),
            language_name(&target),
        );

        let result = retry_if(
            "llm translate",
            self.retry_policy,
            |e: &LlmError| e.is_transient(),
            || {
                self.llm.generate(
                    &system_prompt,
                    text,
                    GenerateOptions::text(TRANSLATION_TEMPERATURE),
                )
            },
        )
        .await;

        match result {
            Ok(translated) if !translated.trim().is_empty() => translated.trim().to_string(),
            Ok(_) => {
                warn!(target_language = %target, "Empty translation returned, keeping source text");
                text.to_string()
            }
            Err(e) => {
                warn!(target_language = %target, error = %e, "Translation failed, keeping source text");
                text.to_string()
            }
        }
    }

    /// Translate several independent strings concurrently, preserving order
    pub async fn translate_all(
        &self,
        texts: &[String],
        target_language: &str,
        source_language: Option<&str>,
    ) -> Vec<String> {
        join_all(
            texts
                .iter()
                .map(|text| self.translate_text(text, target_language, source_language)),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl LlmProvider for CountingProvider {
        async fn generate(
            &self,
            _system_prompt: &str,
            user_prompt: &str,
            _options: GenerateOptions,
        ) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(LlmError::Provider {
                    status: 400,
                    body: "bad request".to_string(),
                })
            } else {
                Ok(format!("[es] {}", user_prompt))
            }
        }
    }

    fn translator(fail: bool) -> (Translator, Arc<CountingProvider>) {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            fail,
        });
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        (Translator::new(provider.clone(), policy), provider)
    }

    #[tokio::test]
    async fn test_same_language_is_passthrough() {
        let (translator, provider) = translator(false);
        assert_eq!(translator.translate_text("Hello", "en", None).await, "Hello");
        assert_eq!(translator.translate_text("Hallo", "de-AT", Some("de")).await, "Hallo");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_text_is_passthrough() {
        let (translator, provider) = translator(false);
        assert_eq!(translator.translate_text("  ", "es", None).await, "  ");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_translates_via_provider() {
        let (translator, provider) = translator(false);
        assert_eq!(translator.translate_text("Hello", "es", None).await, "[es] Hello");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_source() {
        let (translator, provider) = translator(true);
        assert_eq!(translator.translate_text("Hello", "fr", None).await, "Hello");
        // Terminal provider errors are not retried
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_translate_all_preserves_order() {
        let (translator, _) = translator(false);
        let texts = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        let translated = translator.translate_all(&texts, "es", None).await;
        assert_eq!(translated, vec!["[es] one", "[es] two", "[es] three"]);
    }

    #[test]
    fn test_language_name() {
        assert_eq!(language_name("de"), "German");
        assert_eq!(language_name("xx"), "xx");
    }
}
