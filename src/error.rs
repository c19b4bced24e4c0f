//! Error types for the scout agents
//!
//! `ScoutError` covers application-level failures (configuration, LLM transport).
//! `ToolError` is the tagged failure of a single tool call; it is only turned into
//! the `Error ...` text the model sees at the tool boundary.

use thiserror::Error;

/// Main error type for the scout application
#[derive(Error, Debug)]
pub enum ScoutError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// LLM backend communication errors
    #[error("LLM error: {message}")]
    Llm { message: String },

    /// Agent loop errors (empty replies, unusable responses)
    #[error("Agent error: {message}")]
    Agent { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ScoutError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new LLM error
    pub fn llm<S: Into<String>>(message: S) -> Self {
        Self::Llm {
            message: message.into(),
        }
    }

    /// Create a new agent error
    pub fn agent<S: Into<String>>(message: S) -> Self {
        Self::Agent {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ScoutError::Config { message } => {
                format!("Configuration error: {message}. Please check your config file and API keys.")
            }
            ScoutError::Llm { .. } => {
                "Unable to reach the language model. Please check your API key and internet connection."
                    .to_string()
            }
            ScoutError::Agent { message } => message.clone(),
            ScoutError::Io { .. } => {
                "Input/output failed. Please check your terminal.".to_string()
            }
        }
    }
}

/// Failure of an outbound HTTP request made on behalf of a tool
#[derive(Error, Debug)]
pub enum HttpError {
    /// Connection, timeout or non-2xx status
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// The body could not be decoded as the expected JSON
    #[error("invalid response body: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Tagged outcome of a failed tool call
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Error: Dates must be in YYYY-MM-DD format.")]
    InvalidDateFormat,

    #[error("Error: end_date must be on or after start_date.")]
    DateRangeOrder,

    #[error("Error: Historical data is only available for dates up to today.")]
    FutureRange,

    #[error("Error fetching geocoding data: {0}")]
    Geocoding(String),

    #[error("Error: Could not find coordinates for location: {0}")]
    LocationNotFound(String),

    #[error("Error fetching weather data: {0}")]
    Weather(String),

    #[error("Error: No historical weather data available for the requested dates.")]
    NoWeatherData,

    #[error("Error fetching the webpage: {0}")]
    Webpage(String),

    #[error("Error performing adventure search: {0}")]
    AdventureSearch(String),

    #[error("Error performing web search: {0}")]
    WebSearch(String),

    #[error("Error fetching ticker data: {0}")]
    Ticker(String),

    #[error("Error fetching company overview: {0}")]
    CompanyOverview(String),

    #[error("Error: invalid arguments for {tool}: {detail}")]
    InvalidArguments { tool: String, detail: String },

    #[error("Error: Unknown tool '{name}'. Available tools: {available}")]
    UnknownTool { name: String, available: String },

    #[error("Error: managed agent '{agent}' failed: {detail}")]
    ManagedAgent { agent: String, detail: String },

    #[error("Error: An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl ToolError {
    /// Short machine-readable reason code, used in logs
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ToolError::InvalidDateFormat => "invalid_date_format",
            ToolError::DateRangeOrder => "date_range_order",
            ToolError::FutureRange => "future_range",
            ToolError::Geocoding(_) => "geocoding_failed",
            ToolError::LocationNotFound(_) => "location_not_found",
            ToolError::Weather(_) => "weather_failed",
            ToolError::NoWeatherData => "no_weather_data",
            ToolError::Webpage(_) => "webpage_failed",
            ToolError::AdventureSearch(_) | ToolError::WebSearch(_) => "search_failed",
            ToolError::Ticker(_) | ToolError::CompanyOverview(_) => "finance_failed",
            ToolError::InvalidArguments { .. } => "invalid_arguments",
            ToolError::UnknownTool { .. } => "unknown_tool",
            ToolError::ManagedAgent { .. } => "managed_agent_failed",
            ToolError::Unexpected(_) => "unexpected",
        }
    }
}
