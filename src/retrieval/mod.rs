pub mod keywords;

use crate::knowledge::KnowledgeStore;

/// Where line selection stops. Both variants exist in deployments: a fixed
/// match count and a character budget on the joined excerpt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetrievalCutoff {
    MaxLines(usize),
    MaxChars(usize),
}

impl RetrievalCutoff {
    pub const DEFAULT_MAX_LINES: usize = 5;
    pub const DEFAULT_MAX_CHARS: usize = 500;

    /// Build a cutoff from the CLI's mode string plus the two limit flags.
    pub fn from_args(mode: &str, max_lines: usize, max_chars: usize) -> Result<Self, String> {
        match mode.to_lowercase().as_str() {
            "lines" => Ok(RetrievalCutoff::MaxLines(max_lines)),
            "chars" => Ok(RetrievalCutoff::MaxChars(max_chars)),
            other => Err(format!(
                "Unsupported retrieval cutoff '{}' (expected 'lines' or 'chars')",
                other
            )),
        }
    }
}

/// Selects knowledge lines matching any keyword and concatenates them into a
/// bounded excerpt. Deterministic and side-effect-free; the empty string is
/// its "nothing relevant" outcome, not an error.
#[derive(Clone, Debug)]
pub struct ContextRetriever {
    cutoff: RetrievalCutoff,
}

const LINE_SEPARATOR: &str = " ";

impl ContextRetriever {
    pub fn new(cutoff: RetrievalCutoff) -> Self {
        Self { cutoff }
    }

    /// Scan the store in line order and keep every line containing any
    /// keyword as a case-insensitive substring, stopping at the configured
    /// cutoff. Under a character budget the line that overflows the budget
    /// is still taken, and the joined excerpt is then truncated to the
    /// budget.
    pub fn retrieve(&self, keywords: &[String], store: &KnowledgeStore) -> String {
        if keywords.is_empty() || store.is_empty() {
            return String::new();
        }

        let mut selected: Vec<&str> = Vec::new();
        let mut joined_len = 0usize;

        for line in store.lines() {
            let lowered = line.to_lowercase();
            if !keywords.iter().any(|kw| lowered.contains(kw.as_str())) {
                continue;
            }

            if !selected.is_empty() {
                joined_len += LINE_SEPARATOR.chars().count();
            }
            joined_len += line.chars().count();
            selected.push(line);

            match self.cutoff {
                RetrievalCutoff::MaxLines(max) if selected.len() >= max => break,
                RetrievalCutoff::MaxChars(max) if joined_len > max => break,
                _ => {}
            }
        }

        let joined = selected.join(LINE_SEPARATOR);
        match self.cutoff {
            RetrievalCutoff::MaxChars(max) => truncate_chars(&joined, max),
            RetrievalCutoff::MaxLines(_) => joined,
        }
    }
}

/// Truncate to `max` characters on a scalar-value boundary.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
