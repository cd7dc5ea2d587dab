use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Credentials ---
    /// Path to the JSON credentials file holding GROQ_API_KEY.
    #[arg(long, env = "CONFIG_PATH", default_value = "config.json")]
    pub config_path: String,

    /// API key for the completion provider. Overrides the credentials file.
    #[arg(long, env = "GROQ_API_KEY", default_value = "")]
    pub chat_api_key: String,

    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (groq, openai, ollama)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "groq")]
    pub chat_llm_type: String,

    /// Base URL for the Chat LLM provider API (e.g., http://localhost:11434 for Ollama)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let adapters handle defaults if None
    pub chat_base_url: Option<String>,

    /// Model name for chat completion (e.g., llama-3.1-8b-instant)
    #[arg(long, env = "CHAT_MODEL")] // No default, rely on adapter defaults if None
    pub chat_model: Option<String>,

    // --- Knowledge & Persona ---
    /// Path to the plain-text knowledge base, one fact per line.
    #[arg(long, env = "KNOWLEDGE_PATH", default_value = "data/debate_data.txt")]
    pub knowledge_path: String,

    /// Optional JSON persona file overriding the built-in system prompt.
    #[arg(long, env = "PERSONA_PATH")]
    pub persona_path: Option<String>,

    // --- Request Assembly ---
    /// Number of most recent turns included in each completion request.
    #[arg(long, env = "HISTORY_WINDOW", default_value = "3")]
    pub history_window: usize,

    /// Context injection mode (sidecar, inline)
    #[arg(long, env = "CONTEXT_MODE", default_value = "sidecar")]
    pub context_mode: String,

    /// Reject user input longer than this many characters. Unset disables the guard.
    #[arg(long, env = "MAX_INPUT_CHARS")]
    pub max_input_chars: Option<usize>,

    // --- Retrieval ---
    /// Maximum number of keywords extracted from a query.
    #[arg(long, env = "KEYWORD_TOP_N", default_value = "5")]
    pub keyword_top_n: usize,

    /// Retrieval cutoff mode (lines, chars)
    #[arg(long, env = "RETRIEVAL_CUTOFF", default_value = "chars")]
    pub retrieval_cutoff: String,

    /// Matching-line cap applied when --retrieval-cutoff=lines.
    #[arg(long, env = "RETRIEVAL_MAX_LINES", default_value = "5")]
    pub retrieval_max_lines: usize,

    /// Character budget applied when --retrieval-cutoff=chars.
    #[arg(long, env = "RETRIEVAL_MAX_CHARS", default_value = "500")]
    pub retrieval_max_chars: usize,

    // --- Server ---
    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}
