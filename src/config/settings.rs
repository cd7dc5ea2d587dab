use std::fs;
use std::path::Path;

use log::info;
use serde::Deserialize;
use thiserror::Error;

/// Startup configuration failures. Every variant is fatal: the process must
/// not begin serving requests after one of these.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(
        "no completion API key configured: set GROQ_API_KEY, pass --chat-api-key, \
         or add GROQ_API_KEY to the credentials file"
    )]
    MissingCredential,
}

/// JSON credentials file. The key name matches what deployments already
/// ship in their `config.json`.
#[derive(Deserialize, Debug, Default)]
pub struct CredentialsFile {
    #[serde(rename = "GROQ_API_KEY")]
    pub groq_api_key: Option<String>,
}

pub fn load_credentials(path: &str) -> Result<CredentialsFile, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_string(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| ConfigError::Json {
        path: path.to_string(),
        source: e,
    })
}

/// Resolve the completion API key once at startup. An explicit flag or
/// environment value wins over the credentials file; the file is consulted
/// only if it exists. The resolved secret is handed to the client factory
/// in `LlmConfig`; the process environment is never mutated.
pub fn resolve_api_key(explicit: &str, config_path: &str) -> Result<Option<String>, ConfigError> {
    if !explicit.is_empty() {
        return Ok(Some(explicit.to_string()));
    }
    if Path::new(config_path).exists() {
        let creds = load_credentials(config_path)?;
        if let Some(key) = creds.groq_api_key.filter(|k| !k.is_empty()) {
            info!("API key loaded from credentials file: {}", config_path);
            return Ok(Some(key));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn explicit_key_wins_over_file() {
        let file = write_config(r#"{"GROQ_API_KEY": "gsk_from_file"}"#);
        let key = resolve_api_key("gsk_explicit", file.path().to_str().unwrap()).unwrap();
        assert_eq!(key.as_deref(), Some("gsk_explicit"));
    }

    #[test]
    fn file_key_used_when_no_explicit_key() {
        let file = write_config(r#"{"GROQ_API_KEY": "gsk_from_file"}"#);
        let key = resolve_api_key("", file.path().to_str().unwrap()).unwrap();
        assert_eq!(key.as_deref(), Some("gsk_from_file"));
    }

    #[test]
    fn missing_file_and_empty_flag_resolve_to_none() {
        let key = resolve_api_key("", "/nonexistent/config.json").unwrap();
        assert!(key.is_none());
    }

    #[test]
    fn malformed_file_is_json_error() {
        let file = write_config("not json at all");
        let result = resolve_api_key("", file.path().to_str().unwrap());
        assert!(matches!(result, Err(ConfigError::Json { .. })));
    }

    #[test]
    fn empty_key_in_file_is_ignored() {
        let file = write_config(r#"{"GROQ_API_KEY": ""}"#);
        let key = resolve_api_key("", file.path().to_str().unwrap()).unwrap();
        assert!(key.is_none());
    }
}
