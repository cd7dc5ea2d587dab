use std::fs;
use std::sync::Arc;

use log::info;
use serde::Deserialize;

use super::settings::ConfigError;

/// The built-in persona. Deployments that want a different voice override it
/// with a persona file; the text is fixed for the lifetime of the process
/// either way.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an advanced debate analytics AI \
specializing in High School Lincoln-Douglas (LD) and Policy debate formats. Your \
primary function is to generate highly effective, strategic analytics, overviews, \
and rebuttals for debate rounds. You are equipped with deep knowledge of \
Theory/Topicality, Kritiks, Policy-style arguments (LARP in LD), Philosophy-style \
arguments (LD specific), and Tricks (LD specific), along with a comprehensive \
understanding of philosophy, critical theory, and the strategic structure of both \
formats. You understand the optimal strategy for each speech (LD: 1AC, 1NC, 2AC, \
NR, 2NR, 2AR; Policy: 1AC through 2AR) and can produce line-by-line refutations, \
strategic overviews, and impact calculus tailored to the round. Consider the \
resolution, the arguments presented by both sides, and the flow of the debate; \
keep your analysis clear, precise, and logically structured, and avoid jargon \
unless it serves a strategic purpose. If the topic is not relevant to debate, do \
not assume a relation to debate; wait for the user's instructions and do not \
bring debate up until then.";

/// Persona configuration: the system instruction injected at the head of
/// every completion request.
#[derive(Deserialize, Debug, Clone)]
pub struct PersonaConfig {
    pub system_prompt: String,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Load the persona, falling back to the built-in one when no file is given.
/// A persona file that exists but cannot be read or parsed is a startup
/// failure, not something to silently paper over.
pub fn load_persona(path: Option<&str>) -> Result<Arc<PersonaConfig>, ConfigError> {
    let Some(path) = path else {
        return Ok(Arc::new(PersonaConfig::default()));
    };

    let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_string(),
        source: e,
    })?;
    let config: PersonaConfig = serde_json::from_str(&text).map_err(|e| ConfigError::Json {
        path: path.to_string(),
        source: e,
    })?;
    info!("Persona loaded from: {}", path);
    Ok(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_persona_used_without_path() {
        let persona = load_persona(None).unwrap();
        assert_eq!(persona.system_prompt, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn persona_file_overrides_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"system_prompt": "You are a policy coach."}}"#).unwrap();

        let persona = load_persona(file.path().to_str()).unwrap();
        assert_eq!(persona.system_prompt, "You are a policy coach.");
    }

    #[test]
    fn unreadable_persona_file_is_fatal() {
        let result = load_persona(Some("/nonexistent/persona.json"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
