//! Query resolution: validation, then the local lexicon, then the web.
//!
//! ```text
//!   word ──▶ Validate ──▶ LocalLookup ──▶ WebFallback
//!               │              │               │
//!          validation        lookup        web_search
//! ```
//!
//! Each stage either finishes the request or passes it on; nothing loops or
//! retries. Every path yields a [`ResolutionResult`], including provider
//! failures, which arrive as their error text under `source: "web_search"`.

use anyhow::Result;
use std::sync::Arc;

use crate::config::Config;
use crate::db;
use crate::generation::{create_generator, CompletionClient, TextGenerator};
use crate::lexicon::LexiconStore;
use crate::models::{Answer, RelationType, ResolutionResult, Source};
use crate::search::{create_search_provider, SearchProvider, WebSearchClient};

/// Returned under `source: "validation"` when the input has several words.
pub const SINGLE_WORD_REQUIRED: &str = "❌ الرجاء إدخال كلمة واحدة فقط.";

/// Everything a request needs, built once at startup and shared read-only.
#[derive(Clone)]
pub struct Resolver {
    lexicon: Arc<LexiconStore>,
    web: WebSearchClient,
}

impl Resolver {
    pub fn new(
        lexicon: Arc<LexiconStore>,
        generator: Arc<dyn TextGenerator>,
        search: Arc<dyn SearchProvider>,
        config: &Config,
    ) -> Self {
        let web = WebSearchClient::new(
            search,
            CompletionClient::new(generator),
            config.search.clone(),
        );
        Self { lexicon, web }
    }

    /// Loads the lexicon from `[db].path` and creates the configured providers.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        let lexicon = LexiconStore::load(&pool).await?;
        pool.close().await;

        tracing::info!(
            synonyms = lexicon.len(RelationType::Synonyms),
            antonyms = lexicon.len(RelationType::Antonyms),
            plural = lexicon.len(RelationType::Plural),
            "lexicon loaded"
        );

        tracing::info!(
            generation = %config.generation.provider,
            search = %config.search.provider,
            "web fallback providers"
        );
        if !config.generation.is_enabled() || !config.search.is_enabled() {
            tracing::warn!("a provider is disabled; lexicon misses will return an error message");
        }

        let generator = create_generator(&config.generation)?;
        let search = create_search_provider(&config.search)?;
        Ok(Self::new(Arc::new(lexicon), generator, search, config))
    }

    /// Answers one query.
    ///
    /// The trimmed word must be a single token, otherwise the result is the
    /// validation message. A lexicon hit returns its candidates; anything
    /// else goes through web search and generation, whose failures are
    /// returned as text rather than as an error.
    pub async fn resolve(&self, word: &str, relation: RelationType) -> ResolutionResult {
        let word = word.trim();

        if word.split_whitespace().count() > 1 {
            tracing::debug!(word, "rejected multi-word input");
            return ResolutionResult {
                source: Source::Validation,
                result: Some(Answer::Single(SINGLE_WORD_REQUIRED.to_string())),
            };
        }

        if let Some(answer) = self.lexicon.lookup(word, relation) {
            tracing::debug!(word, %relation, "lexicon hit");
            return ResolutionResult {
                source: Source::Lookup,
                result: Some(answer),
            };
        }

        let result = match self.web.search_and_generate(word, relation).await {
            Ok(answer) => answer.map(Answer::Single),
            Err(failure) => Some(Answer::Single(failure.to_string())),
        };
        ResolutionResult {
            source: Source::WebSearch,
            result,
        }
    }
}

/// Run the analyze command: the full pipeline for one word, printed as JSON.
pub async fn run_analyze(config: &Config, word: &str, relation: RelationType) -> Result<()> {
    let resolver = Resolver::from_config(config).await?;
    let result = resolver.resolve(word, relation).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::search::SearchQuery;

    struct CountingSearch {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl SearchProvider for CountingSearch {
        fn name(&self) -> &str {
            "counting"
        }

        async fn search(&self, _query: &SearchQuery) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                bail!("timed out");
            }
            Ok(vec![])
        }
    }

    struct FixedGenerator {
        reply: Option<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Some(text) => Ok(text.to_string()),
                None => bail!("quota exceeded"),
            }
        }
    }

    struct Harness {
        resolver: Resolver,
        search: Arc<CountingSearch>,
        generator: Arc<FixedGenerator>,
    }

    fn harness(reply: Option<&'static str>, search_fails: bool) -> Harness {
        let mut lexicon = LexiconStore::from_entries(
            RelationType::Synonyms,
            [("سعيد", "فرِح ; مبتهج"), ("شجاع", "جريء"), ("خالي", ";")],
        );
        lexicon.extend(RelationType::Plural, [("بيت", "بيوت")]);

        let search = Arc::new(CountingSearch {
            calls: AtomicUsize::new(0),
            fail: search_fails,
        });
        let generator = Arc::new(FixedGenerator {
            reply,
            calls: AtomicUsize::new(0),
        });
        let resolver = Resolver::new(
            Arc::new(lexicon),
            generator.clone(),
            search.clone(),
            &Config::minimal(),
        );
        Harness {
            resolver,
            search,
            generator,
        }
    }

    fn network_calls(h: &Harness) -> usize {
        h.search.calls.load(Ordering::SeqCst) + h.generator.calls.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn test_multi_word_short_circuits() {
        let h = harness(Some("x"), false);
        let out = h.resolver.resolve("بيت كبير", RelationType::Plural).await;
        assert_eq!(out.source, Source::Validation);
        assert_eq!(out.result, Some(Answer::Single(SINGLE_WORD_REQUIRED.into())));
        assert_eq!(network_calls(&h), 0);
    }

    #[tokio::test]
    async fn test_surrounding_whitespace_is_not_multi_word() {
        let h = harness(None, false);
        let out = h.resolver.resolve("  بيت \t", RelationType::Plural).await;
        assert_eq!(out.source, Source::Lookup);
    }

    #[tokio::test]
    async fn test_lookup_hit_many() {
        let h = harness(None, false);
        let out = h.resolver.resolve("سعيد", RelationType::Synonyms).await;
        assert_eq!(
            out,
            ResolutionResult {
                source: Source::Lookup,
                result: Some(Answer::Many(vec!["فرِح".into(), "مبتهج".into()])),
            }
        );
        assert_eq!(network_calls(&h), 0);
    }

    #[tokio::test]
    async fn test_lookup_hit_single() {
        let h = harness(None, false);
        let out = h.resolver.resolve("شجاع", RelationType::Synonyms).await;
        assert_eq!(out.result, Some(Answer::Single("جريء".into())));
    }

    #[tokio::test]
    async fn test_empty_entry_falls_back_to_web() {
        let h = harness(Some("فارغ"), false);
        let out = h.resolver.resolve("خالي", RelationType::Synonyms).await;
        assert_eq!(out.source, Source::WebSearch);
        assert_eq!(out.result, Some(Answer::Single("فارغ".into())));
        assert_eq!(h.search.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_miss_with_noisy_generation_is_null() {
        let h = harness(Some("لا يوجد جمع معروف لهذه الكلمة"), false);
        let out = h.resolver.resolve("ماء", RelationType::Plural).await;
        assert_eq!(
            out,
            ResolutionResult {
                source: Source::WebSearch,
                result: None,
            }
        );
    }

    #[tokio::test]
    async fn test_generation_failure_is_payload() {
        let h = harness(None, false);
        let out = h.resolver.resolve("ماء", RelationType::Plural).await;
        assert_eq!(out.source, Source::WebSearch);
        match out.result {
            Some(Answer::Single(text)) => {
                assert!(text.starts_with("❌ حدث خطأ أثناء توليد الإجابة"));
                assert!(text.contains("quota exceeded"));
            }
            other => panic!("expected error text, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_search_failure_is_payload() {
        let h = harness(Some("x"), true);
        let out = h.resolver.resolve("ماء", RelationType::Antonyms).await;
        assert_eq!(out.source, Source::WebSearch);
        match out.result {
            Some(Answer::Single(text)) => {
                assert!(text.starts_with("❌ حدث خطأ أثناء البحث"));
                assert!(text.contains("timed out"));
            }
            other => panic!("expected error text, got {:?}", other),
        }
        assert_eq!(h.generator.calls.load(Ordering::SeqCst), 0);
    }
}
