use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::RetrievalError;

/// A candidate's master profile — the source data every snippet is
/// extracted from. All fields are optional-tolerant: a sparse profile must
/// never fail extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub company: Option<String>,
    pub title: Option<String>,
    /// Preferred bullet list; when absent, `responsibilities` is used instead.
    pub achievements: Option<Vec<String>>,
    pub responsibilities: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Profile {
    /// Reads and parses a profile JSON file.
    ///
    /// A missing or malformed file is fatal to index construction — there is
    /// no meaningful fallback for "no profile at all" — so the error is
    /// propagated rather than degraded.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RetrievalError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
