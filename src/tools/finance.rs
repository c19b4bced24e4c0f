//! Investment research tools backed by [`MarketData`]

use super::{Tool, parse_args};
use crate::error::ToolError;
use crate::finance::MarketData;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

pub struct FindTickerTool {
    market: Arc<dyn MarketData>,
}

impl FindTickerTool {
    pub fn new(market: Arc<dyn MarketData>) -> Self {
        Self { market }
    }
}

#[derive(Deserialize)]
struct FindTickerArgs {
    company: String,
}

#[async_trait]
impl Tool for FindTickerTool {
    fn name(&self) -> &str {
        "find_ticker_symbol"
    }

    fn description(&self) -> &str {
        "Calls the Alphavantage API and returns the ticker symbol search results for the given company as a json string."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "company": {"type": "string", "description": "The name of the company to retrieve the ticker symbol for."}
            },
            "required": ["company"]
        })
    }

    async fn call(&self, args: Value) -> Result<String, ToolError> {
        let args: FindTickerArgs = parse_args(self.name(), args)?;
        self.market
            .symbol_search(&args.company)
            .await
            .map_err(|e| ToolError::Ticker(format!("{e:#}")))
    }
}

pub struct CompanyOverviewTool {
    market: Arc<dyn MarketData>,
}

impl CompanyOverviewTool {
    pub fn new(market: Arc<dyn MarketData>) -> Self {
        Self { market }
    }
}

#[derive(Deserialize)]
struct CompanyOverviewArgs {
    symbol: String,
}

#[async_trait]
impl Tool for CompanyOverviewTool {
    fn name(&self) -> &str {
        "get_company_overview"
    }

    fn description(&self) -> &str {
        "Calls the Alphavantage API and returns company overview content as json string."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {"type": "string", "description": "The stock symbol of the company to retrieve information for."}
            },
            "required": ["symbol"]
        })
    }

    async fn call(&self, args: Value) -> Result<String, ToolError> {
        let args: CompanyOverviewArgs = parse_args(self.name(), args)?;
        self.market
            .company_overview(&args.symbol)
            .await
            .map_err(|e| ToolError::CompanyOverview(format!("{e:#}")))
    }
}
