pub mod agent;
pub mod assembler;
pub mod cli;
pub mod config;
pub mod knowledge;
pub mod llm;
pub mod models;
pub mod retrieval;
pub mod server;
pub mod session;

use agent::DebateAgent;
use cli::Args;
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Knowledge Path: {}", args.knowledge_path);
    info!("Persona Path: {}", args.persona_path.as_deref().unwrap_or("(built-in)"));
    info!("History Window: {}", args.history_window);
    info!("Context Mode: {}", args.context_mode);
    info!("Keyword Top-N: {}", args.keyword_top_n);
    info!(
        "Retrieval Cutoff: {} (lines={}, chars={})",
        args.retrieval_cutoff,
        args.retrieval_max_lines,
        args.retrieval_max_chars
    );
    match args.max_input_chars {
        Some(max) => info!("Max Input Chars: {}", max),
        None => info!("Max Input Chars: unlimited"),
    }
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let agent = Arc::new(DebateAgent::new(&args)?);
    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, agent, args);
    server.run().await?;

    Ok(())
}
