//! Tools exposed to the agents
//!
//! Every tool takes JSON arguments and answers with a single string. Failures are
//! `ToolError`s internally and become `Error ...` text only in
//! [`Toolset::invoke`], which also contains panics.

pub mod finance;
pub mod travel;

use crate::error::ToolError;
use crate::llm::ToolSchema;
use async_trait::async_trait;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub use finance::{CompanyOverviewTool, FindTickerTool};
pub use travel::{AdventureSearchTool, VisitWebpageTool, WeatherForecastTool, WebSearchTool};

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON schema of the arguments object
    fn parameters(&self) -> Value;
    async fn call(&self, args: Value) -> Result<String, ToolError>;
}

/// Decode a tool's argument object
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments {
        tool: tool.to_string(),
        detail: e.to_string(),
    })
}

/// Ordered set of tools available to one agent
#[derive(Clone, Default)]
pub struct Toolset {
    tools: Vec<Arc<dyn Tool>>,
}

impl Toolset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// `(name, description)` pairs in registration order
    #[must_use]
    pub fn descriptions(&self) -> Vec<(&str, &str)> {
        self.tools.iter().map(|t| (t.name(), t.description())).collect()
    }

    #[must_use]
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools
            .iter()
            .map(|t| ToolSchema::function(t.name(), t.description(), t.parameters()))
            .collect()
    }

    /// Run a tool by name with JSON-encoded arguments. Never fails: every
    /// problem comes back as `Error ...` text for the model to read.
    pub async fn invoke(&self, name: &str, raw_args: &str) -> String {
        match self.try_invoke(name, raw_args).await {
            Ok(output) => {
                debug!("Tool {} returned {} chars", name, output.len());
                output
            }
            Err(e) => {
                warn!("Tool {} failed ({}): {}", name, e.code(), e);
                e.to_string()
            }
        }
    }

    async fn try_invoke(&self, name: &str, raw_args: &str) -> Result<String, ToolError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ToolError::UnknownTool {
                name: name.to_string(),
                available: self.names().join(", "),
            })?;

        let args = decode_arguments(name, raw_args)?;
        info!("Calling tool {} with {}", name, args);

        AssertUnwindSafe(tool.call(args))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(ToolError::Unexpected(panic_message(panic.as_ref()))))
    }
}

/// Blank arguments mean "no arguments"
fn decode_arguments(tool: &str, raw_args: &str) -> Result<Value, ToolError> {
    if raw_args.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    let args: Value = serde_json::from_str(raw_args).map_err(|e| ToolError::InvalidArguments {
        tool: tool.to_string(),
        detail: e.to_string(),
    })?;
    if !args.is_object() {
        return Err(ToolError::InvalidArguments {
            tool: tool.to_string(),
            detail: "arguments must be a JSON object".to_string(),
        });
    }
    Ok(args)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "tool panicked".to_string())
}
