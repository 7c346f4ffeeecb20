//! The local lexicon: an immutable word → candidates table per relation.
//!
//! Loaded once from SQLite before the server starts accepting requests and
//! never mutated afterwards, so it can be shared behind an `Arc` without
//! locking.
//!
//! Each table row maps a `WORD` to a raw `;`-delimited candidate string,
//! e.g. `"فرِح ; مبتهج"`. Splitting happens at lookup time so that the
//! stored text stays exactly as it was written.

use anyhow::{Context, Result};
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::models::{Answer, RelationType, ResolutionResult, Source};

#[derive(Debug, Default, Clone)]
pub struct LexiconStore {
    synonyms: HashMap<String, String>,
    antonyms: HashMap<String, String>,
    plural: HashMap<String, String>,
}

impl LexiconStore {
    /// An empty store; every lookup misses until entries are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads all three relation tables from the database.
    pub async fn load(pool: &SqlitePool) -> Result<Self> {
        let mut store = Self::new();
        for relation in RelationType::ALL {
            let sql = format!(
                "SELECT WORD, {column} AS raw FROM {table}",
                column = relation.value_column(),
                table = relation.table_name(),
            );
            let rows = sqlx::query(&sql)
                .fetch_all(pool)
                .await
                .with_context(|| format!("Failed to read table '{}'", relation.table_name()))?;

            let entries = rows.iter().filter_map(|row| {
                let word: Option<String> = row.get("WORD");
                let raw: Option<String> = row.get("raw");
                word.map(|w| (w, raw.unwrap_or_default()))
            });
            store.extend(relation, entries);
        }
        Ok(store)
    }

    /// Builds a store for one relation from in-memory entries.
    pub fn from_entries<I, W, R>(relation: RelationType, entries: I) -> Self
    where
        I: IntoIterator<Item = (W, R)>,
        W: Into<String>,
        R: Into<String>,
    {
        let mut store = Self::new();
        store.extend(relation, entries);
        store
    }

    /// Adds entries to a relation table. Keys are trimmed; a repeated word
    /// replaces the earlier value.
    pub fn extend<I, W, R>(&mut self, relation: RelationType, entries: I)
    where
        I: IntoIterator<Item = (W, R)>,
        W: Into<String>,
        R: Into<String>,
    {
        let table = self.table_mut(relation);
        for (word, raw) in entries {
            let word: String = word.into();
            table.insert(word.trim().to_string(), raw.into());
        }
    }

    /// Exact-match lookup on the trimmed word.
    ///
    /// Returns `None` both for unknown words and for entries whose raw value
    /// has no non-empty candidates.
    pub fn lookup(&self, word: &str, relation: RelationType) -> Option<Answer> {
        let raw = self.table(relation).get(word.trim())?;
        Answer::from_candidates(split_candidates(raw))
    }

    /// Number of distinct words in the `relation` table, including entries
    /// with no usable candidates.
    pub fn len(&self, relation: RelationType) -> usize {
        self.table(relation).len()
    }

    fn table(&self, relation: RelationType) -> &HashMap<String, String> {
        match relation {
            RelationType::Synonyms => &self.synonyms,
            RelationType::Antonyms => &self.antonyms,
            RelationType::Plural => &self.plural,
        }
    }

    fn table_mut(&mut self, relation: RelationType) -> &mut HashMap<String, String> {
        match relation {
            RelationType::Synonyms => &mut self.synonyms,
            RelationType::Antonyms => &mut self.antonyms,
            RelationType::Plural => &mut self.plural,
        }
    }
}

/// Splits a raw lexicon value on `;`, trimming segments and dropping empty ones.
pub fn split_candidates(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Inserts one row into a relation table.
pub async fn insert_entry(
    pool: &SqlitePool,
    relation: RelationType,
    word: &str,
    raw: &str,
) -> Result<()> {
    let sql = format!(
        "INSERT INTO {table} (WORD, {column}) VALUES (?, ?)",
        table = relation.table_name(),
        column = relation.value_column(),
    );
    sqlx::query(&sql)
        .bind(word.trim())
        .bind(raw)
        .execute(pool)
        .await?;
    Ok(())
}

/// Run the add command: insert one entry, creating the tables if needed.
pub async fn run_add(config: &Config, relation: RelationType, word: &str, raw: &str) -> Result<()> {
    if word.trim().is_empty() {
        anyhow::bail!("word must not be empty");
    }
    let pool = db::connect(config).await?;
    migrate::create_tables(&pool).await?;
    insert_entry(&pool, relation, word, raw).await?;
    pool.close().await;

    println!(
        "Added {} entry '{}' ({} candidates).",
        relation,
        word.trim(),
        split_candidates(raw).len()
    );
    Ok(())
}

/// Run the lookup command: query the local lexicon only and print the
/// result as JSON. A miss prints `"result": null`.
pub async fn run_lookup(config: &Config, word: &str, relation: RelationType) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = LexiconStore::load(&pool).await?;
    pool.close().await;

    let result = ResolutionResult {
        source: Source::Lookup,
        result: store.lookup(word, relation),
    };
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
