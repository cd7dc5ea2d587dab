pub mod groq;
pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use serde::Deserialize;
use std::error::Error as StdError;
use std::sync::Arc;

use super::{ LlmConfig, LlmType };
use crate::models::chat::OutboundMessage;
use self::groq::GroqChatClient;
use self::ollama::OllamaChatClient;
use self::openai::OpenAIChatClient;

#[derive(Deserialize, Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

/// The completion seam: an ordered list of role-tagged messages in, one
/// assistant reply out. The round trip is the only blocking operation in a
/// request; no timeout or retry is layered on top of the transport's own.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[OutboundMessage]
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>>;

    fn model(&self) -> String;
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client: Arc<dyn ChatClient> = match config.llm_type {
        LlmType::Groq => {
            let specific_client = GroqChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::OpenAI => {
            let specific_client = OpenAIChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::Ollama => {
            let specific_client = OllamaChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(client)
}
