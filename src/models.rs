use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The lexical relation a query asks for.
///
/// Selects both the lexicon table and the generation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    Synonyms,
    Antonyms,
    Plural,
}

impl RelationType {
    pub const ALL: [RelationType; 3] = [
        RelationType::Synonyms,
        RelationType::Antonyms,
        RelationType::Plural,
    ];

    /// Wire name, as accepted in the `type` field of `POST /analyze/`.
    pub fn as_str(self) -> &'static str {
        match self {
            RelationType::Synonyms => "synonyms",
            RelationType::Antonyms => "antonyms",
            RelationType::Plural => "plural",
        }
    }

    pub fn table_name(self) -> &'static str {
        self.as_str()
    }

    /// Column holding the `;`-delimited candidates.
    pub fn value_column(self) -> &'static str {
        match self {
            RelationType::Synonyms => "SYNO_SET",
            RelationType::Antonyms => "ANTO_SET",
            RelationType::Plural => "PLURAL",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "synonyms" => Ok(RelationType::Synonyms),
            "antonyms" => Ok(RelationType::Antonyms),
            "plural" => Ok(RelationType::Plural),
            other => anyhow::bail!(
                "invalid relation type '{}': expected synonyms, antonyms or plural",
                other
            ),
        }
    }
}

/// Where a [`ResolutionResult`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Validation,
    Lookup,
    WebSearch,
}

/// One answer or several, serialized as a bare string or a string array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Single(String),
    Many(Vec<String>),
}

impl Answer {
    /// Collapses a candidate list: one element becomes [`Answer::Single`],
    /// none becomes `None`.
    pub fn from_candidates(mut candidates: Vec<String>) -> Option<Answer> {
        match candidates.len() {
            0 => None,
            1 => candidates.pop().map(Answer::Single),
            _ => Some(Answer::Many(candidates)),
        }
    }
}

/// Response body of `POST /analyze/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub source: Source,
    pub result: Option<Answer>,
}
