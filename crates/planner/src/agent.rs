//! Tool-calling loop that plans price lookups and returns the report text.
//!
//! Sends the conversation plus tool schemas to the model, runs every tool
//! call it asks for, feeds the outputs back as tool-role messages, and
//! repeats until the model answers with text.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use domain::prices::lookup::TOOL_NAME;

use crate::{
    client::{ChatMessage, ChatModel, ToolCall},
    prompt::SYSTEM_PROMPT,
    tools::{json_args_to_string_map, Tool},
    Planner,
};

pub const DEFAULT_MAX_ROUNDS: usize = 8;

/// Lookups the prompt asks for: original, Jan Aushadhi, one more generic.
const EXPECTED_LOOKUPS: usize = 3;

/// Output of one executed tool call.
#[derive(Debug, Clone)]
pub struct ToolExecution {
    pub tool_name: String,
    pub output: String,
}

pub struct AgentPlanner {
    model: Arc<dyn ChatModel>,
    tools: Vec<Arc<dyn Tool>>,
    max_rounds: usize,
}

impl AgentPlanner {
    pub fn new(model: Arc<dyn ChatModel>, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            model,
            tools,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    async fn execute(&self, call: &ToolCall) -> ToolExecution {
        let tool_name = call.function.name.clone();

        let Some(tool) = self.tools.iter().find(|tool| tool.spec().name == tool_name) else {
            warn!("Planner requested unknown tool: {}", tool_name);
            return ToolExecution {
                output: format!("Error: unknown tool {tool_name}"),
                tool_name,
            };
        };

        let args: serde_json::Value = match serde_json::from_str(&call.function.arguments) {
            Ok(args) => args,
            Err(e) => {
                warn!("Undecodable arguments for {}: {}", tool_name, e);
                return ToolExecution {
                    output: format!("Error: invalid arguments: {e}"),
                    tool_name,
                };
            }
        };

        let output = match tool.run(&json_args_to_string_map(&args)).await {
            Ok(output) => output,
            Err(e) => format!("Error: {e}"),
        };

        ToolExecution { tool_name, output }
    }
}

#[async_trait]
impl Planner for AgentPlanner {
    async fn plan(&self, query: &str) -> Result<String> {
        let schemas: Vec<serde_json::Value> = self
            .tools
            .iter()
            .map(|tool| tool.spec().to_openai_tool_schema())
            .collect();

        let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(query)];
        let mut executions: Vec<ToolExecution> = Vec::new();

        for round in 0..self.max_rounds {
            debug!(round, msg_count = messages.len(), "planner iteration");

            // The last round goes out without tools so the model has to answer.
            let tools = if round + 1 < self.max_rounds {
                Some(schemas.as_slice())
            } else {
                warn!("Planner hit max rounds ({}), forcing a text answer", self.max_rounds);
                None
            };

            let reply = self.model.chat(&messages, tools).await?;
            let calls = reply.requested_tool_calls().to_vec();

            if calls.is_empty() {
                let lookups = executions
                    .iter()
                    .filter(|execution| execution.tool_name == TOOL_NAME)
                    .count();
                if lookups < EXPECTED_LOOKUPS {
                    warn!("Planner answered after only {} price lookup(s)", lookups);
                }
                return Ok(reply.content.unwrap_or_default());
            }

            info!(round, count = calls.len(), "Planner requested tool calls");
            messages.push(ChatMessage::assistant_tool_calls(calls.clone()));

            for call in &calls {
                let execution = self.execute(call).await;
                messages.push(ChatMessage::tool_result(&call.id, &execution.output));
                executions.push(execution);
            }
        }

        warn!("Planner ended without a text answer");
        Ok(executions
            .iter()
            .map(|execution| format!("[{}]: {}", execution.tool_name, execution.output))
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}
