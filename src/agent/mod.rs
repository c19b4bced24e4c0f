//! Bounded tool-calling loop.

pub mod managed;
pub mod profiles;
pub mod prompt;

use crate::ScoutError;
use crate::llm::{ChatMessage, LlmClient, ToolCall, ToolSchema};
use crate::tools::Toolset;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub use managed::ManagedAgentTool;

/// Name of the tool that ends a run
pub const FINAL_ANSWER: &str = "final_answer";

const BUDGET_EXHAUSTED: &str = "You have used all available steps. Using only the information \
gathered so far, write your final answer to the original request now.";

/// Something that turns a question into an answer
#[async_trait]
pub trait Orchestrator: Send + Sync {
    async fn run(&self, question: &str) -> Result<String>;
}

/// Static identity of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentProfile {
    pub name: &'static str,
    pub description: &'static str,
    pub instructions: &'static str,
}

pub struct Agent {
    profile: AgentProfile,
    tools: Toolset,
    max_steps: u32,
    llm: Arc<dyn LlmClient>,
}

impl Agent {
    pub fn new(profile: AgentProfile, tools: Toolset, max_steps: u32, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            profile,
            tools,
            max_steps,
            llm,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.profile.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        self.profile.description
    }

    #[must_use]
    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    #[must_use]
    pub fn tools(&self) -> &Toolset {
        &self.tools
    }

    /// Schemas sent with every step, `final_answer` last
    #[must_use]
    pub fn tool_schemas(&self) -> Vec<ToolSchema> {
        let mut schemas = self.tools.schemas();
        schemas.push(final_answer_schema());
        schemas
    }

    /// Handle one batch of tool calls. Returns the answer once `final_answer` is called.
    async fn execute_calls(&self, calls: &[ToolCall], messages: &mut Vec<ChatMessage>) -> Option<String> {
        for call in calls {
            if call.function.name == FINAL_ANSWER {
                match final_answer_text(&call.function.arguments) {
                    Ok(answer) => return Some(answer),
                    Err(e) => {
                        warn!("{} sent an unusable final answer: {}", self.name(), e);
                        messages.push(ChatMessage::tool(&call.id, e));
                        continue;
                    }
                }
            }

            let output = self.tools.invoke(&call.function.name, &call.function.arguments).await;
            messages.push(ChatMessage::tool(&call.id, output));
        }
        None
    }
}

#[async_trait]
impl Orchestrator for Agent {
    #[instrument(skip_all, fields(agent = %self.profile.name))]
    async fn run(&self, question: &str) -> Result<String> {
        let schemas = self.tool_schemas();
        let mut messages = vec![
            ChatMessage::system(prompt::build_system_prompt(&self.profile, &self.tools)),
            ChatMessage::user(question),
        ];

        for step in 1..=self.max_steps {
            debug!("Step {}/{}", step, self.max_steps);

            let reply = self
                .llm
                .chat(&messages, Some(&schemas))
                .await
                .with_context(|| format!("{} step {} failed", self.name(), step))?;

            let calls = reply.calls().to_vec();
            if calls.is_empty() {
                if let Some(answer) = reply.text_content() {
                    info!("{} answered after {} steps", self.name(), step);
                    return Ok(answer.to_string());
                }
                warn!("Empty reply at step {}", step);
                continue;
            }

            info!(
                "Step {}: {}",
                step,
                calls.iter().map(|c| c.function.name.as_str()).collect::<Vec<_>>().join(", ")
            );
            messages.push(reply);

            if let Some(answer) = self.execute_calls(&calls, &mut messages).await {
                info!("{} called final_answer at step {}", self.name(), step);
                return Ok(answer);
            }
        }

        info!("{} exhausted {} steps, asking for a final answer", self.name(), self.max_steps);
        messages.push(ChatMessage::user(BUDGET_EXHAUSTED));
        let reply = self
            .llm
            .chat(&messages, None)
            .await
            .with_context(|| format!("{} final answer request failed", self.name()))?;

        reply
            .text_content()
            .map(str::to_string)
            .ok_or_else(|| ScoutError::agent(format!("{} did not produce an answer", self.name())).into())
    }
}

fn final_answer_schema() -> ToolSchema {
    ToolSchema::function(
        FINAL_ANSWER,
        "Provides a final answer to the given problem.",
        json!({
            "type": "object",
            "properties": {
                "answer": {"type": "string", "description": "The final answer to the problem"}
            },
            "required": ["answer"]
        }),
    )
}

/// The `answer` argument; non-string values are rendered as JSON
fn final_answer_text(raw_args: &str) -> Result<String, String> {
    let invalid = |detail: &str| format!("Error: invalid arguments for {FINAL_ANSWER}: {detail}");

    let args: Value = serde_json::from_str(raw_args).map_err(|e| invalid(&e.to_string()))?;
    match args.get("answer") {
        Some(Value::String(answer)) => Ok(answer.clone()),
        Some(Value::Null) | None => Err(invalid("missing field `answer`")),
        Some(other) => Ok(other.to_string()),
    }
}
