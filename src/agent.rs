use std::error::Error;
use std::sync::Arc;

use log::{ error, info };
use thiserror::Error as ThisError;

use crate::assembler::{ InjectionMode, RequestAssembler };
use crate::cli::Args;
use crate::config::persona::{ self, PersonaConfig };
use crate::config::settings::{ self, ConfigError };
use crate::knowledge::KnowledgeStore;
use crate::llm::chat::{ new_client as new_chat_client, ChatClient };
use crate::llm::{ LlmConfig, LlmType };
use crate::models::chat::{ ChatTurn, Conversation, Role };
use crate::retrieval::keywords::KeywordExtractor;
use crate::retrieval::{ ContextRetriever, RetrievalCutoff };
use crate::session::SessionManager;

/// Per-request failures. Startup failures are `ConfigError`; everything the
/// serving path can produce is here.
#[derive(Debug, ThisError)]
pub enum AgentError {
    /// Rejected before any state mutation or remote call: the turn is not
    /// appended and the completion client is never contacted.
    #[error("input exceeds the maximum length of {max} characters (got {got})")]
    InputTooLong { max: usize, got: usize },
    /// The completion round trip failed. The user turn stays appended; the
    /// assistant turn is never produced.
    #[error("completion request failed: {0}")]
    RemoteCall(String),
}

/// Tunables collected away from `Args` so the agent can also be embedded
/// without a CLI.
#[derive(Clone, Debug)]
pub struct AgentOptions {
    pub history_window: usize,
    pub keyword_top_n: usize,
    pub cutoff: RetrievalCutoff,
    pub injection_mode: InjectionMode,
    pub max_input_chars: Option<usize>,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            history_window: 3,
            keyword_top_n: KeywordExtractor::DEFAULT_TOP_N,
            cutoff: RetrievalCutoff::MaxChars(RetrievalCutoff::DEFAULT_MAX_CHARS),
            injection_mode: InjectionMode::Sidecar,
            max_input_chars: None,
        }
    }
}

pub struct DebateAgent {
    chat_client: Arc<dyn ChatClient>,
    knowledge: KnowledgeStore,
    persona: Arc<PersonaConfig>,
    extractor: KeywordExtractor,
    retriever: ContextRetriever,
    assembler: RequestAssembler,
    sessions: SessionManager,
    history_window: usize,
    max_input_chars: Option<usize>,
}

impl DebateAgent {
    pub fn new(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let llm_type: LlmType = args.chat_llm_type.parse()?;
        let api_key = settings::resolve_api_key(&args.chat_api_key, &args.config_path)?;
        if api_key.is_none() && llm_type != LlmType::Ollama {
            return Err(Box::new(ConfigError::MissingCredential));
        }

        let llm_config = LlmConfig {
            llm_type,
            api_key,
            completion_model: args.chat_model.clone(),
            base_url: args.chat_base_url.clone(),
        };
        let chat_client = new_chat_client(&llm_config)?;
        info!(
            "Chat client configured: Type={}, Model={}",
            args.chat_llm_type,
            chat_client.model()
        );

        let knowledge = KnowledgeStore::load(&args.knowledge_path)?;
        let persona = persona::load_persona(args.persona_path.as_deref())?;
        let cutoff = RetrievalCutoff::from_args(
            &args.retrieval_cutoff,
            args.retrieval_max_lines,
            args.retrieval_max_chars,
        )?;
        let injection_mode: InjectionMode = args.context_mode.parse()?;

        let options = AgentOptions {
            history_window: args.history_window,
            keyword_top_n: args.keyword_top_n,
            cutoff,
            injection_mode,
            max_input_chars: args.max_input_chars,
        };

        Ok(Self::from_parts(chat_client, knowledge, persona, options))
    }

    /// Assemble an agent from pre-built collaborators.
    pub fn from_parts(
        chat_client: Arc<dyn ChatClient>,
        knowledge: KnowledgeStore,
        persona: Arc<PersonaConfig>,
        options: AgentOptions,
    ) -> Self {
        Self {
            chat_client,
            knowledge,
            persona,
            extractor: KeywordExtractor::new(options.keyword_top_n),
            retriever: ContextRetriever::new(options.cutoff),
            assembler: RequestAssembler::new(options.injection_mode),
            sessions: SessionManager::new(),
            history_window: options.history_window,
            max_input_chars: options.max_input_chars,
        }
    }

    /// Handle one submitted query for one session: validate, append the user
    /// turn, retrieve grounding context, call the completion client, append
    /// and return the reply. The session lock is held across the round trip,
    /// so requests sharing a session id serialize.
    pub async fn process_message(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<String, AgentError> {
        if let Some(max) = self.max_input_chars {
            let got = message.chars().count();
            if got > max {
                return Err(AgentError::InputTooLong { max, got });
            }
        }

        let session = self.sessions.session(session_id).await;
        let mut state = session.lock().await;

        state.append(ChatTurn::new(Role::User, message));
        let window = state.window(self.history_window);

        let keywords = self.extractor.extract(message);
        let context = self.retriever.retrieve(&keywords, &self.knowledge);
        if context.is_empty() {
            info!("No knowledge context matched; sending the query ungrounded");
        } else {
            info!(
                "Retrieved {} chars of knowledge context for keywords {:?}",
                context.chars().count(),
                keywords
            );
        }

        let request = self
            .assembler
            .assemble(&self.persona.system_prompt, window, &context);

        let completion = self.chat_client.complete(&request).await.map_err(|e| {
            error!("Completion call failed: {}", e);
            AgentError::RemoteCall(e.to_string())
        })?;

        state.append(ChatTurn::new(Role::Assistant, &completion.response));
        Ok(completion.response)
    }

    /// Full ordered history of a session, if it exists.
    pub async fn history(&self, session_id: &str) -> Option<Conversation> {
        self.sessions.conversation(session_id).await
    }

    /// Tear a session down. Returns false for an unknown id.
    pub async fn end_session(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::error::Error as StdError;
    use std::sync::Mutex;

    use crate::llm::chat::CompletionResponse;
    use crate::models::chat::OutboundMessage;

    /// Records every request it receives and answers with a canned reply.
    struct StubClient {
        reply: String,
        seen: Mutex<Vec<Vec<OutboundMessage>>>,
    }

    impl StubClient {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<Vec<OutboundMessage>> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatClient for StubClient {
        async fn complete(
            &self,
            messages: &[OutboundMessage],
        ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
            self.seen.lock().unwrap().push(messages.to_vec());
            Ok(CompletionResponse {
                response: self.reply.clone(),
            })
        }

        fn model(&self) -> String {
            "stub".to_string()
        }
    }

    struct FailingClient;

    #[async_trait]
    impl ChatClient for FailingClient {
        async fn complete(
            &self,
            _messages: &[OutboundMessage],
        ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
            Err("connection refused".into())
        }

        fn model(&self) -> String {
            "failing".to_string()
        }
    }

    fn agent_with(
        client: Arc<dyn ChatClient>,
        knowledge: &str,
        options: AgentOptions,
    ) -> DebateAgent {
        DebateAgent::from_parts(
            client,
            KnowledgeStore::from_text(knowledge),
            Arc::new(PersonaConfig::default()),
            options,
        )
    }

    #[tokio::test]
    async fn grounded_exchange_appends_user_then_assistant() {
        let stub = StubClient::new("Topicality is...");
        let agent = agent_with(
            stub.clone(),
            "Topicality requires a plan text.",
            AgentOptions::default(),
        );

        let reply = agent.process_message("s1", "What is topicality?").await.unwrap();
        assert_eq!(reply, "Topicality is...");

        let conversation = agent.history("s1").await.unwrap();
        assert_eq!(conversation.turns.len(), 2);
        assert_eq!(conversation.turns[0].role, Role::User);
        assert_eq!(conversation.turns[0].content, "What is topicality?");
        assert_eq!(conversation.turns[1].role, Role::Assistant);
        assert_eq!(conversation.turns[1].content, "Topicality is...");

        // The matching knowledge line rode along as a sidecar system message.
        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.len(), 3);
        assert_eq!(request[0].role, Role::System);
        assert_eq!(request[1].content, "What is topicality?");
        let context = request.last().unwrap();
        assert_eq!(context.role, Role::System);
        assert_eq!(context.content, "Topicality requires a plan text.");
    }

    #[tokio::test]
    async fn over_length_input_is_rejected_before_any_effect() {
        let stub = StubClient::new("never sent");
        let agent = agent_with(
            stub.clone(),
            "Topicality requires a plan text.",
            AgentOptions {
                max_input_chars: Some(1000),
                ..AgentOptions::default()
            },
        );

        let long_input = "x".repeat(1200);
        let result = agent.process_message("s1", &long_input).await;

        assert!(matches!(
            result,
            Err(AgentError::InputTooLong { max: 1000, got: 1200 })
        ));
        assert!(agent.history("s1").await.is_none());
        assert!(stub.requests().is_empty());
    }

    #[tokio::test]
    async fn empty_knowledge_base_sends_no_context_message() {
        let stub = StubClient::new("ungrounded reply");
        let agent = agent_with(stub.clone(), "", AgentOptions::default());

        agent.process_message("s1", "What is topicality?").await.unwrap();

        let request = &stub.requests()[0];
        assert_eq!(request.len(), 2);
        assert_eq!(request[0].role, Role::System);
        assert_eq!(request[1].role, Role::User);
    }

    #[tokio::test]
    async fn remote_failure_keeps_the_user_turn() {
        let agent = agent_with(
            Arc::new(FailingClient),
            "Topicality requires a plan text.",
            AgentOptions::default(),
        );

        let result = agent.process_message("s1", "What is topicality?").await;
        assert!(matches!(result, Err(AgentError::RemoteCall(_))));

        let conversation = agent.history("s1").await.unwrap();
        assert_eq!(conversation.turns.len(), 1);
        assert_eq!(conversation.turns[0].role, Role::User);
    }

    #[tokio::test]
    async fn request_history_is_limited_to_the_window() {
        let stub = StubClient::new("reply");
        let agent = agent_with(stub.clone(), "", AgentOptions::default());

        for i in 0..4 {
            agent
                .process_message("s1", &format!("question {}", i))
                .await
                .unwrap();
        }

        // 4 exchanges = 8 turns of history, but each request carries only
        // the persona plus the last 3 turns.
        let requests = stub.requests();
        let last = requests.last().unwrap();
        assert_eq!(last.len(), 4);
        assert_eq!(last[1].content, "question 2");
        assert_eq!(last[2].content, "reply");
        assert_eq!(last[3].content, "question 3");
    }

    #[tokio::test]
    async fn inline_mode_wraps_question_with_retrieved_context() {
        let stub = StubClient::new("reply");
        let agent = agent_with(
            stub.clone(),
            "Kritiks question underlying assumptions.",
            AgentOptions {
                injection_mode: InjectionMode::Inline,
                ..AgentOptions::default()
            },
        );

        agent.process_message("s1", "Explain the kritik.").await.unwrap();

        let request = &stub.requests()[0];
        let last = request.last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(
            last.content,
            "<CONTEXT>\nKritiks question underlying assumptions.\n</CONTEXT>\nExplain the kritik."
        );
    }

    #[tokio::test]
    async fn sessions_do_not_share_history() {
        let stub = StubClient::new("reply");
        let agent = agent_with(stub.clone(), "", AgentOptions::default());

        agent.process_message("a", "first question").await.unwrap();
        agent.process_message("b", "other question").await.unwrap();

        assert_eq!(agent.history("a").await.unwrap().turns.len(), 2);
        assert_eq!(agent.history("b").await.unwrap().turns.len(), 2);
        assert!(agent.end_session("a").await);
        assert!(agent.history("a").await.is_none());
        assert!(agent.history("b").await.is_some());
    }
}
