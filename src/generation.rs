//! Text generation for words the lexicon does not know.
//!
//! Defines the [`TextGenerator`] trait and its implementations:
//! - **[`GeminiGenerator`]** calls the Gemini `generateContent` REST endpoint.
//! - **[`DisabledGenerator`]** always fails; used when `[generation].provider = "disabled"`.
//!
//! [`CompletionClient`] sits on top of a generator. It builds the
//! relation-specific Arabic prompt, runs the generator and cleans the reply
//! with [`normalize`](crate::normalize::normalize). Provider errors are
//! caught here and turned into a [`ClientFailure`], whose display form is the
//! user-facing error text.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::GenerationConfig;
use crate::models::RelationType;
use crate::normalize::normalize;
use crate::search::SEARCH_FAILURE_MARKER;

/// System framing placed before every relation template.
pub const SYSTEM_FRAMING: &str = "أنت مساعد لغوي محترف في اللغة العربية.";

/// The phrase each template asks the model to answer with when nothing fits.
pub const NOT_FOUND_PHRASE: &str = "لا يوجد";

/// Prefix of every generation failure string.
pub const GENERATION_FAILURE_MARKER: &str = "❌ حدث خطأ أثناء توليد الإجابة";

/// A failed outbound call, kept as data rather than propagated.
///
/// `Display` renders the marker followed by the underlying error, which is
/// exactly what ends up in the response payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFailure {
    Generation(String),
    Search(String),
}

impl ClientFailure {
    pub fn generation(err: &anyhow::Error) -> Self {
        ClientFailure::Generation(format!("{:#}", err))
    }

    pub fn search(err: &anyhow::Error) -> Self {
        ClientFailure::Search(format!("{:#}", err))
    }
}

impl fmt::Display for ClientFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientFailure::Generation(detail) => {
                write!(f, "{}: {}", GENERATION_FAILURE_MARKER, detail)
            }
            ClientFailure::Search(detail) => write!(f, "{}: {}", SEARCH_FAILURE_MARKER, detail),
        }
    }
}

/// Outcome of a client call: a cleaned answer (possibly none) or a failure.
pub type ClientResult = std::result::Result<Option<String>, ClientFailure>;

/// A prompt-in, text-out generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short identifier used in logs (e.g. the model name).
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

// ============ Prompts ============

fn relation_template(word: &str, relation: RelationType) -> String {
    match relation {
        RelationType::Synonyms => format!(
            "أعطِ مرادفًا دقيقًا وواضحًا للكلمة '{word}' في اللغة العربية الفصحى، بشرط أن يكون المرادف مساويًا لها في المعنى وليس قريبًا فقط.\n\
             تجاهل التشكيل إن وُجد، ولا تعطِ أكثر من كلمة واحدة. إذا لم يوجد مرادف صحيح للكلمة، قل \"{NOT_FOUND_PHRASE}\"."
        ),
        RelationType::Antonyms => format!(
            "أعطِ ضدًا دقيقًا وواضحًا للكلمة '{word}' في اللغة العربية الفصحى، بشرط أن يكون عكسًا مباشرًا وصحيحًا في المعنى.\n\
             تجاهل التشكيل إن وُجد، ولا تعطِ أكثر من كلمة واحدة. إذا لم يوجد ضد صحيح للكلمة، قل \"{NOT_FOUND_PHRASE}\"."
        ),
        RelationType::Plural => format!(
            "أعطِ جمعًا صحيحًا وواضحًا للكلمة '{word}' في اللغة العربية الفصحى.\n\
             تجاهل التشكيل إن وُجد، ولا تعطِ أكثر من كلمة واحدة. إذا لم يكن للكلمة جمع معروف، قل \"{NOT_FOUND_PHRASE}\"."
        ),
    }
}

/// Builds the full prompt: framing, relation instructions, then the context.
pub fn build_prompt(word: &str, context: &str, relation: RelationType) -> String {
    format!(
        "{}\n{} \n\n{}",
        SYSTEM_FRAMING,
        relation_template(word, relation),
        context
    )
}

// ============ Completion client ============

/// Prompt construction plus output cleanup around a [`TextGenerator`].
#[derive(Clone)]
pub struct CompletionClient {
    generator: Arc<dyn TextGenerator>,
}

impl CompletionClient {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Asks the model for `relation` of `word`, grounded on `context`.
    ///
    /// A reply that normalizes to nothing (including a verbose "not found")
    /// is `Ok(None)`. Any provider error becomes [`ClientFailure::Generation`].
    pub async fn complete(&self, word: &str, context: &str, relation: RelationType) -> ClientResult {
        let prompt = build_prompt(word, context, relation);
        match self.generator.generate(&prompt).await {
            Ok(text) => {
                let cleaned = normalize(Some(&text), relation);
                tracing::debug!(
                    generator = self.generator.name(),
                    %relation,
                    raw = %text,
                    cleaned = ?cleaned,
                    "generation finished"
                );
                Ok(cleaned)
            }
            Err(e) => {
                tracing::warn!(generator = self.generator.name(), error = %e, "generation failed");
                Err(ClientFailure::generation(&e))
            }
        }
    }
}

// ============ Disabled generator ============

/// A generator that refuses every request.
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        bail!("generation provider is disabled")
    }
}

// ============ Gemini generator ============

/// Generator backed by the Gemini `generateContent` API.
///
/// The API key is read once from the environment variable named in
/// `[generation].api_key_env`.
pub struct GeminiGenerator {
    client: reqwest::Client,
    model: String,
    base_url: String,
    api_key: String,
}

impl GeminiGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .with_context(|| format!("{} environment variable not set", config.api_key_env))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Gemini API error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().await?;
        parse_gemini_response(&json)
    }
}

/// Concatenates the text parts of the first candidate.
fn parse_gemini_response(json: &serde_json::Value) -> Result<String> {
    let parts = json
        .pointer("/candidates/0/content/parts")
        .and_then(|p| p.as_array())
        .ok_or_else(|| anyhow::anyhow!("Invalid Gemini response: missing candidate parts"))?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();
    Ok(text)
}

/// Creates the generator named by `[generation].provider`.
pub fn create_generator(config: &GenerationConfig) -> Result<Arc<dyn TextGenerator>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledGenerator)),
        "gemini" => Ok(Arc::new(GeminiGenerator::new(config)?)),
        other => bail!("Unknown generation provider: {}", other),
    }
}
