//! Adventure planner tools: search, webpage text and historical weather

use super::{Tool, parse_args};
use crate::dates;
use crate::error::ToolError;
use crate::extract;
use crate::http::HttpFetcher;
use crate::location_resolver::Geocoder;
use crate::search::{self, SearchEngine};
use crate::weather::{self, WeatherArchive};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Plain keyword web search
pub struct WebSearchTool {
    engine: Arc<dyn SearchEngine>,
}

impl WebSearchTool {
    pub fn new(engine: Arc<dyn SearchEngine>) -> Self {
        Self { engine }
    }
}

#[derive(Deserialize)]
struct WebSearchArgs {
    query: String,
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Performs a web search for your query then returns a string of the top search results."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "The search query to perform."}
            },
            "required": ["query"]
        })
    }

    async fn call(&self, args: Value) -> Result<String, ToolError> {
        let args: WebSearchArgs = parse_args(self.name(), args)?;
        search::run_search(self.engine.as_ref(), &args.query)
            .await
            .map_err(|e| ToolError::WebSearch(format!("{e:#}")))
    }
}

/// Search with a query tailored to trip planning
pub struct AdventureSearchTool {
    engine: Arc<dyn SearchEngine>,
}

impl AdventureSearchTool {
    pub fn new(engine: Arc<dyn SearchEngine>) -> Self {
        Self { engine }
    }
}

fn default_days() -> i64 {
    3
}

#[derive(Deserialize)]
struct AdventureSearchArgs {
    destination: String,
    #[serde(default)]
    activities: Option<String>,
    #[serde(default = "default_days")]
    days: i64,
}

#[async_trait]
impl Tool for AdventureSearchTool {
    fn name(&self) -> &str {
        "adventure_search"
    }

    fn description(&self) -> &str {
        "Searches for adventure and travel activities in a given destination. \
         Returns search results as formatted text with URLs and descriptions."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "destination": {
                    "type": "string",
                    "description": "The destination to search for adventures (e.g., \"Chamonix\", \"Costa Rica\")"
                },
                "activities": {
                    "type": "string",
                    "description": "Optional specific activities to focus on (e.g., \"hiking\", \"climbing\", \"water sports\")"
                },
                "days": {
                    "type": "integer",
                    "description": "Number of days for the trip to tailor results",
                    "default": 3
                }
            },
            "required": ["destination"]
        })
    }

    async fn call(&self, args: Value) -> Result<String, ToolError> {
        let args: AdventureSearchArgs = parse_args(self.name(), args)?;
        let query = search::build_query(&args.destination, args.activities.as_deref(), args.days);
        let results = search::run_search(self.engine.as_ref(), &query)
            .await
            .map_err(|e| ToolError::AdventureSearch(format!("{e:#}")))?;
        Ok(format!("Search results for '{query}':\n{results}"))
    }
}

/// Fetch a page and hand back its readable text
pub struct VisitWebpageTool {
    fetcher: HttpFetcher,
    max_chars: usize,
}

impl VisitWebpageTool {
    pub fn new(fetcher: HttpFetcher, max_chars: usize) -> Self {
        Self { fetcher, max_chars }
    }
}

#[derive(Deserialize)]
struct VisitWebpageArgs {
    url: String,
}

#[async_trait]
impl Tool for VisitWebpageTool {
    fn name(&self) -> &str {
        "visit_webpage"
    }

    fn description(&self) -> &str {
        "Visits a webpage at the given URL and returns clean text content, or an error message if the request fails."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {"type": "string", "description": "The URL of the webpage to visit."}
            },
            "required": ["url"]
        })
    }

    async fn call(&self, args: Value) -> Result<String, ToolError> {
        let args: VisitWebpageArgs = parse_args(self.name(), args)?;
        let body = self
            .fetcher
            .get_bytes(&args.url)
            .await
            .map_err(|e| ToolError::Webpage(e.to_string()))?;
        Ok(extract::extract_text(&body, &args.url, self.max_chars))
    }
}

/// Historical weather for a place and date range
pub struct WeatherForecastTool {
    geocoder: Arc<dyn Geocoder>,
    archive: Arc<dyn WeatherArchive>,
    today: fn() -> NaiveDate,
}

impl WeatherForecastTool {
    pub fn new(geocoder: Arc<dyn Geocoder>, archive: Arc<dyn WeatherArchive>) -> Self {
        Self {
            geocoder,
            archive,
            today: dates::today_utc,
        }
    }

    /// Pin "today" for range validation
    #[must_use]
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }
}

#[derive(Deserialize)]
struct WeatherArgs {
    location: String,
    start_date: String,
    end_date: String,
}

#[async_trait]
impl Tool for WeatherForecastTool {
    fn name(&self) -> &str {
        "get_weather_forecast"
    }

    fn description(&self) -> &str {
        "Gets historical weather data for a location and date range. Returns JSON with \
         temperature, precipitation, wind and weather codes per day. Dates after today \
         are not available."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {"type": "string", "description": "The location name (e.g., \"Chamonix, France\")"},
                "start_date": {"type": "string", "description": "Start date in YYYY-MM-DD format"},
                "end_date": {"type": "string", "description": "End date in YYYY-MM-DD format"}
            },
            "required": ["location", "start_date", "end_date"]
        })
    }

    async fn call(&self, args: Value) -> Result<String, ToolError> {
        let args: WeatherArgs = parse_args(self.name(), args)?;
        let summary = weather::historical_weather(
            self.geocoder.as_ref(),
            self.archive.as_ref(),
            &args.location,
            &args.start_date,
            &args.end_date,
            (self.today)(),
        )
        .await?;
        summary
            .to_json()
            .map_err(|e| ToolError::Unexpected(e.to_string()))
    }
}
