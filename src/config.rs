use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

/// Settings for the text-generation provider used on a lexicon miss.
#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_provider")]
    pub provider: String,
    #[serde(default = "default_generation_model")]
    pub model: String,
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_generation_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_generation_provider(),
            model: default_generation_model(),
            base_url: default_generation_base_url(),
            api_key_env: default_generation_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_generation_provider() -> String {
    "gemini".to_string()
}
fn default_generation_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_generation_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_generation_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

/// Settings for the web search provider that supplies generation context.
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_search_provider")]
    pub provider: String,
    #[serde(default = "default_search_base_url")]
    pub base_url: String,
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_search_depth")]
    pub search_depth: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: default_search_provider(),
            base_url: default_search_base_url(),
            api_key_env: default_search_key_env(),
            max_results: default_max_results(),
            search_depth: default_search_depth(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_search_provider() -> String {
    "tavily".to_string()
}
fn default_search_base_url() -> String {
    "https://api.tavily.com".to_string()
}
fn default_search_key_env() -> String {
    "TAVILY_API_KEY".to_string()
}
fn default_max_results() -> u32 {
    3
}
fn default_search_depth() -> String {
    "basic".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl GenerationConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

impl SearchConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

impl Config {
    /// A config with both network providers disabled and an in-tree database
    /// path. Used by commands that can run without a config file.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from("./data/words.sqlite"),
            },
            server: ServerConfig {
                bind: "127.0.0.1:8000".to_string(),
            },
            generation: GenerationConfig {
                provider: "disabled".to_string(),
                ..GenerationConfig::default()
            },
            search: SearchConfig {
                provider: "disabled".to_string(),
                ..SearchConfig::default()
            },
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    match config.generation.provider.as_str() {
        "disabled" | "gemini" => {}
        other => anyhow::bail!(
            "Unknown generation provider: '{}'. Must be disabled or gemini.",
            other
        ),
    }
    match config.search.provider.as_str() {
        "disabled" | "tavily" => {}
        other => anyhow::bail!(
            "Unknown search provider: '{}'. Must be disabled or tavily.",
            other
        ),
    }

    if config.generation.timeout_secs == 0 {
        anyhow::bail!("generation.timeout_secs must be > 0");
    }
    if config.search.timeout_secs == 0 {
        anyhow::bail!("search.timeout_secs must be > 0");
    }
    if !(1..=20).contains(&config.search.max_results) {
        anyhow::bail!("search.max_results must be in [1, 20]");
    }
    match config.search.search_depth.as_str() {
        "basic" | "advanced" => {}
        other => anyhow::bail!("search.search_depth must be basic or advanced, got '{}'", other),
    }

    Ok(())
}
