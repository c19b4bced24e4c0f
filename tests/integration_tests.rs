//! Integration tests for the scout agents
//!
//! Everything runs against in-memory fakes; nothing here touches the network.

use async_trait::async_trait;
use chrono::NaiveDate;
use scout::agent::profiles::{self, ResearchServices, TravelServices};
use scout::config::HttpConfig;
use scout::dates::DateRange;
use scout::finance::MarketData;
use scout::llm::{ChatMessage, FunctionCall, Role, ToolCall, ToolSchema};
use scout::search::{SearchEngine, SearchHit};
use scout::tools::WeatherForecastTool;
use scout::weather::ArchiveResponse;
use scout::{Agent, GeocodeResult, Geocoder, HttpFetcher, LlmClient, Orchestrator, Tool, WeatherArchive};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::process::Command;
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// fakes

/// Replays canned replies and records every request
#[derive(Default)]
struct ScriptedLlm {
    replies: Mutex<VecDeque<ChatMessage>>,
    requests: Mutex<Vec<(Vec<ChatMessage>, bool)>>,
}

impl ScriptedLlm {
    fn new(replies: Vec<ChatMessage>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::default(),
        })
    }

    fn requests(&self) -> Vec<(Vec<ChatMessage>, bool)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn chat(&self, messages: &[ChatMessage], tools: Option<&[ToolSchema]>) -> anyhow::Result<ChatMessage> {
        self.requests.lock().unwrap().push((messages.to_vec(), tools.is_some()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("script exhausted"))
    }
}

fn call(id: &str, name: &str, args: Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        kind: "function".to_string(),
        function: FunctionCall {
            name: name.to_string(),
            arguments: args.to_string(),
        },
    }
}

fn calls(tool_calls: Vec<ToolCall>) -> ChatMessage {
    ChatMessage {
        role: Role::Assistant,
        content: None,
        tool_calls: Some(tool_calls),
        tool_call_id: None,
    }
}

fn tool_outputs(messages: &[ChatMessage]) -> Vec<String> {
    messages
        .iter()
        .filter(|m| m.role == Role::Tool)
        .filter_map(|m| m.content.clone())
        .collect()
}

struct FakeGeocoder {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, name: &str) -> anyhow::Result<Vec<GeocodeResult>> {
        self.seen.lock().unwrap().push(name.to_string());
        Ok(match name {
            "Chamonix" => vec![GeocodeResult {
                name: Some("Chamonix".into()),
                latitude: 45.9237,
                longitude: 6.8694,
                country: None,
                country_code: Some("FR".into()),
            }],
            _ => Vec::new(),
        })
    }
}

/// Archive answering with three days, the last one missing its maximum
struct FakeArchive {
    ranges: Mutex<Vec<DateRange>>,
}

#[async_trait]
impl WeatherArchive for FakeArchive {
    async fn daily(&self, _lat: f64, _lon: f64, range: DateRange) -> anyhow::Result<ArchiveResponse> {
        self.ranges.lock().unwrap().push(range);
        Ok(serde_json::from_value(json!({
            "daily_units": {"temperature_2m_max": "°C"},
            "daily": {
                "time": ["2024-05-30", "2024-05-31", "2024-06-01"],
                "temperature_2m_max": [14.2, 16.8],
                "temperature_2m_min": [3.1, 4.0, 5.5],
                "precipitation_sum": [0.0, 12.4, null],
                "weathercode": [1, 63, 2],
                "windgusts_10m_max": [22.3, 41.0, 18.7]
            }
        }))?)
    }
}

struct CannedSearch;

#[async_trait]
impl SearchEngine for CannedSearch {
    async fn search(&self, query: &str) -> anyhow::Result<Vec<SearchHit>> {
        Ok(vec![SearchHit {
            title: format!("Results for {query}"),
            url: "https://example.com/result".into(),
            snippet: "A useful page".into(),
        }])
    }
}

struct CannedMarket;

#[async_trait]
impl MarketData for CannedMarket {
    async fn symbol_search(&self, _company: &str) -> anyhow::Result<String> {
        Ok(json!({"bestMatches": [{"1. symbol": "AAPL", "2. name": "Apple Inc"}]}).to_string())
    }

    async fn company_overview(&self, symbol: &str) -> anyhow::Result<String> {
        Ok(json!({"Symbol": symbol, "Name": "Apple Inc", "Sector": "TECHNOLOGY"}).to_string())
    }
}

fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(&HttpConfig::default()).unwrap()
}

fn planner(llm: Arc<ScriptedLlm>, max_steps: u32) -> Agent {
    profiles::adventure_planner(
        llm,
        TravelServices {
            search: Arc::new(CannedSearch),
            fetcher: fetcher(),
            max_page_chars: 5000,
            geocoder: Arc::new(FakeGeocoder {
                seen: Mutex::default(),
            }),
            archive: Arc::new(FakeArchive {
                ranges: Mutex::default(),
            }),
        },
        max_steps,
    )
}

// ---------------------------------------------------------------------------
// weather tool

#[tokio::test]
async fn test_weather_tool_end_to_end() {
    let geocoder = Arc::new(FakeGeocoder {
        seen: Mutex::default(),
    });
    let archive = Arc::new(FakeArchive {
        ranges: Mutex::default(),
    });
    let tool = WeatherForecastTool::new(geocoder.clone(), archive.clone()).with_clock(fixed_today);

    let output = tool
        .call(json!({
            "location": "Chamonix (Mont Blanc), France",
            "start_date": "2024-05-30",
            "end_date": "2024-06-04"
        }))
        .await
        .unwrap();

    assert_eq!(
        *geocoder.seen.lock().unwrap(),
        vec!["Chamonix (Mont Blanc), France", "Chamonix , France", "Chamonix"]
    );
    assert_eq!(
        archive.ranges.lock().unwrap()[0].end,
        fixed_today(),
        "future end must be clamped before querying"
    );

    let summary: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(summary["location"], "Chamonix, FR");
    assert_eq!(summary["resolved_query"], "Chamonix");
    assert_eq!(summary["original_query"], "Chamonix (Mont Blanc), France");
    assert_eq!(summary["data_type"], "historical");
    assert_eq!(summary["date_range"]["requested"]["end_date"], "2024-06-04");
    assert_eq!(summary["date_range"]["resolved"]["end_date"], "2024-06-01");

    let days = summary["forecast"].as_array().unwrap();
    assert_eq!(days.len(), 3);
    assert_eq!(days[1]["weather_code"], 63);
    assert_eq!(days[1]["precipitation_sum"], 12.4);
    assert!(days[2]["temp_max"].is_null());
    assert!(days[2]["precipitation_sum"].is_null());
    assert!(days[0]["wind_speed_max"].is_null());
    assert!(days[0]["precipitation_probability"].is_null());
}

#[tokio::test]
async fn test_weather_tool_validates_dates_first() {
    let geocoder = Arc::new(FakeGeocoder {
        seen: Mutex::default(),
    });
    let tool = WeatherForecastTool::new(
        geocoder.clone(),
        Arc::new(FakeArchive {
            ranges: Mutex::default(),
        }),
    )
    .with_clock(fixed_today);

    let err = tool
        .call(json!({"location": "Chamonix", "start_date": "2024-03-20", "end_date": "2024-03-15"}))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Error: end_date must be on or after start_date.");
    assert!(geocoder.seen.lock().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// agent loop

#[tokio::test]
async fn test_planner_runs_tools_then_answers() {
    let llm = ScriptedLlm::new(vec![
        calls(vec![
            call("c1", "adventure_search", json!({"destination": "Chamonix", "activities": "via ferrata"})),
            call("c2", "teleport", json!({"to": "Mars"})),
        ]),
        calls(vec![call("c3", "final_answer", json!({"answer": "Itinerary: Day 1 ..."}))]),
    ]);

    let answer = planner(llm.clone(), 8).run("Plan 3 days in Chamonix").await.unwrap();

    assert_eq!(answer, "Itinerary: Day 1 ...");

    let requests = llm.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|(_, with_tools)| *with_tools));

    let (first, _) = &requests[0];
    assert_eq!(first[0].role, Role::System);
    assert!(first[0].content.as_deref().unwrap().contains("expert adventure travel planner"));
    assert_eq!(first[1].content.as_deref(), Some("Plan 3 days in Chamonix"));

    let (second, _) = &requests[1];
    let outputs = tool_outputs(second);
    assert_eq!(outputs.len(), 2);
    assert!(outputs[0].starts_with(
        "Search results for 'Chamonix via ferrata 3 day itinerary travel guide things to do':"
    ));
    assert!(outputs[1].starts_with("Error: Unknown tool 'teleport'"));
    assert_eq!(second.iter().filter(|m| m.role == Role::Tool).count(), 2);
    assert_eq!(second[3].tool_call_id.as_deref(), Some("c1"));
}

#[tokio::test]
async fn test_plain_text_reply_ends_run() {
    let llm = ScriptedLlm::new(vec![ChatMessage::assistant("Pack a rain jacket.")]);
    let answer = planner(llm.clone(), 8).run("What should I bring?").await.unwrap();
    assert_eq!(answer, "Pack a rain jacket.");
    assert_eq!(llm.requests().len(), 1);
}

#[tokio::test]
async fn test_exhausted_budget_asks_once_more_without_tools() {
    let search = || calls(vec![call("s", "web_search", json!({"query": "Moab"}))]);
    let llm = ScriptedLlm::new(vec![
        search(),
        search(),
        ChatMessage::assistant("Best effort plan for Moab."),
    ]);

    let answer = planner(llm.clone(), 2).run("Moab?").await.unwrap();

    assert_eq!(answer, "Best effort plan for Moab.");
    let requests = llm.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests[0].1 && requests[1].1);
    assert!(!requests[2].1, "final request must not offer tools");
}

#[tokio::test]
async fn test_malformed_arguments_go_back_to_the_model() {
    let mut broken = call("b", "get_weather_forecast", json!({}));
    broken.function.arguments = "{\"location\": ".to_string();
    let llm = ScriptedLlm::new(vec![calls(vec![broken]), ChatMessage::assistant("done")]);

    planner(llm.clone(), 8).run("weather?").await.unwrap();

    let outputs = tool_outputs(&llm.requests()[1].0);
    assert!(outputs[0].starts_with("Error: invalid arguments for get_weather_forecast:"));
}

#[tokio::test]
async fn test_llm_failure_is_an_error() {
    let llm = ScriptedLlm::new(Vec::new());
    let err = planner(llm, 8).run("anything").await.unwrap_err();
    assert!(format!("{err:#}").contains("script exhausted"));
}

// ---------------------------------------------------------------------------
// investment research

#[tokio::test]
async fn test_manager_delegates_to_seeker() {
    let seeker_llm = ScriptedLlm::new(vec![
        calls(vec![call("t1", "find_ticker_symbol", json!({"company": "Apple"}))]),
        calls(vec![call("t2", "get_company_overview", json!({"symbol": "AAPL"}))]),
        calls(vec![call("t3", "final_answer", json!({"answer": "Apple trades as AAPL. Source: alphavantage.co"}))]),
    ]);
    let manager_llm = ScriptedLlm::new(vec![
        calls(vec![call("m1", "search_agent", json!({"task": "Find Apple's ticker symbol"}))]),
        calls(vec![call("m2", "final_answer", json!({"answer": "AAPL (source: alphavantage.co)"}))]),
    ]);

    let seeker = profiles::search_agent(
        seeker_llm.clone(),
        ResearchServices {
            search: Arc::new(CannedSearch),
            fetcher: fetcher(),
            max_page_chars: 5000,
            market: Arc::new(CannedMarket),
        },
        3,
    );
    let jefe = profiles::jefe(manager_llm.clone(), seeker, 20);

    let answer = jefe.run("What is Apple's ticker?").await.unwrap();
    assert_eq!(answer, "AAPL (source: alphavantage.co)");

    let seeker_requests = seeker_llm.requests();
    assert_eq!(seeker_requests.len(), 3);
    assert!(
        seeker_requests[0].0[1]
            .content
            .as_deref()
            .unwrap()
            .contains("Find Apple's ticker symbol")
    );
    assert!(tool_outputs(&seeker_requests[2].0)[1].contains("TECHNOLOGY"));

    let delegated = tool_outputs(&manager_llm.requests()[1].0);
    assert_eq!(
        delegated[0],
        "Here is the final answer from your managed agent 'search_agent':\nApple trades as AAPL. Source: alphavantage.co"
    );
}

#[tokio::test]
async fn test_failed_seeker_is_reported_to_manager() {
    let seeker_llm = ScriptedLlm::new(Vec::new());
    let manager_llm = ScriptedLlm::new(vec![
        calls(vec![call("m1", "search_agent", json!({"task": "Tesla CEO"}))]),
        ChatMessage::assistant("I could not complete the research."),
    ]);

    let seeker = profiles::search_agent(
        seeker_llm,
        ResearchServices {
            search: Arc::new(CannedSearch),
            fetcher: fetcher(),
            max_page_chars: 5000,
            market: Arc::new(CannedMarket),
        },
        3,
    );
    let jefe = profiles::jefe(manager_llm.clone(), seeker, 20);

    let answer = jefe.run("Who runs Tesla?").await.unwrap();
    assert_eq!(answer, "I could not complete the research.");

    let outputs = tool_outputs(&manager_llm.requests()[1].0);
    assert!(outputs[0].starts_with("Error: managed agent 'search_agent' failed:"));
}

// ---------------------------------------------------------------------------
// binaries

#[test]
fn test_binaries_show_help() {
    for binary in [env!("CARGO_BIN_EXE_adventure-planner"), env!("CARGO_BIN_EXE_investment-research")] {
        let output = Command::new(binary)
            .arg("--help")
            .output()
            .expect("Failed to execute binary");

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("--config"));
        assert!(stdout.contains("--verbose"));
    }
}
