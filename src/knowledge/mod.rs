use std::fs;

use log::info;

use crate::config::settings::ConfigError;

/// The static knowledge base: an ordered sequence of text lines, loaded once
/// at startup and never reloaded. Lines have no identity beyond their
/// position.
#[derive(Clone, Debug, Default)]
pub struct KnowledgeStore {
    lines: Vec<String>,
}

impl KnowledgeStore {
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Read the whole knowledge file into memory. An unreadable file is a
    /// startup failure; an empty file is a valid, empty store.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string(),
            source: e,
        })?;
        let store = Self::from_text(&text);
        info!("✅ Knowledge base loaded: {} lines from {}", store.len(), path);
        Ok(store)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
