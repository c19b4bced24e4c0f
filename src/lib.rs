//! `Scout` - command-line agents for adventure trip planning and investment research
//!
//! This library provides the tools the agents call (web search, webpage text,
//! historical weather, ticker lookup), the tool-calling loop that drives them
//! and the interactive shell shared by both binaries.

pub mod agent;
pub mod cli;
pub mod config;
pub mod dates;
pub mod error;
pub mod extract;
pub mod finance;
pub mod http;
pub mod llm;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod search;
pub mod tools;
pub mod weather;

// Re-export core types for public API
pub use agent::{Agent, AgentProfile, Orchestrator};
pub use config::ScoutConfig;
pub use error::{HttpError, ScoutError, ToolError};
pub use http::HttpFetcher;
pub use llm::{LlmClient, OpenAiCompatClient};
pub use location_resolver::{Geocoder, LocationResolver};
pub use models::{DailyWeather, ForecastSummary, GeocodeResult};
pub use tools::{Tool, Toolset};
pub use weather::{OpenMeteoClient, WeatherArchive};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ScoutError>;
