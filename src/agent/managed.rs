//! An agent exposed to another agent as a tool

use super::{Agent, Orchestrator};
use crate::error::ToolError;
use crate::tools::{Tool, parse_args};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

pub struct ManagedAgentTool {
    agent: Arc<Agent>,
    description: String,
}

impl ManagedAgentTool {
    pub fn new(agent: Arc<Agent>) -> Self {
        let description = format!(
            "{} Give it a complete task description; it can only see what you send.",
            agent.description()
        );
        Self { agent, description }
    }
}

#[derive(Deserialize)]
struct TaskArgs {
    task: String,
}

/// Message the managed agent receives for a delegated task
fn delegated_task(agent: &str, task: &str) -> String {
    format!(
        "You're a helpful agent named '{agent}'. You have been submitted this task by your manager.\n\
         ---\nTask:\n{task}\n---\n\
         Your final answer should be as detailed as possible and include the source URLs you relied on."
    )
}

#[async_trait]
impl Tool for ManagedAgentTool {
    fn name(&self) -> &str {
        self.agent.name()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "task": {"type": "string", "description": "Long detailed description of the task."}
            },
            "required": ["task"]
        })
    }

    async fn call(&self, args: Value) -> Result<String, ToolError> {
        let args: TaskArgs = parse_args(self.name(), args)?;
        let answer = self
            .agent
            .run(&delegated_task(self.agent.name(), &args.task))
            .await
            .map_err(|e| ToolError::ManagedAgent {
                agent: self.agent.name().to_string(),
                detail: format!("{e:#}"),
            })?;
        Ok(format!(
            "Here is the final answer from your managed agent '{}':\n{answer}",
            self.agent.name()
        ))
    }
}
