//! Planning collaborator: decides which price lookups to run and writes the
//! report text consumed by the domain parser.

use anyhow::Result;
use async_trait::async_trait;

/// Tool-calling loop
pub mod agent;

/// Chat completions client
pub mod client;

/// System prompt
pub mod prompt;

/// Tools exposed to the model
pub mod tools;

pub use agent::AgentPlanner;
pub use client::{ChatModel, GroqClient};
pub use tools::{MedicinePriceTool, Tool};

/// Turns a user query into a free-text price report.
#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan(&self, query: &str) -> Result<String>;
}
