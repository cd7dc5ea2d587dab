pub mod api;

use crate::agent::DebateAgent;
use crate::cli::Args;
use std::error::Error;
use std::sync::Arc;

pub struct Server {
    addr: String,
    agent: Arc<DebateAgent>,
    args: Args,
}

impl Server {
    pub fn new(addr: String, agent: Arc<DebateAgent>, args: Args) -> Self {
        Self { addr, agent, args }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        api::serve(&self.addr, Arc::clone(&self.agent), &self.args).await
    }
}
