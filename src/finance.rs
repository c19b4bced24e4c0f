//! Alpha Vantage ticker search and company overview
//!
//! Both calls pass the JSON document through unchanged; interpreting it is left
//! to the model.

use crate::http::HttpFetcher;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

/// Company and ticker data source
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Ticker matches for a company name, as JSON text
    async fn symbol_search(&self, company: &str) -> anyhow::Result<String>;
    /// Fundamentals for a ticker symbol, as JSON text
    async fn company_overview(&self, symbol: &str) -> anyhow::Result<String>;
}

pub struct AlphaVantage {
    fetcher: HttpFetcher,
    base_url: String,
    api_key: String,
}

impl AlphaVantage {
    #[must_use]
    pub fn new(fetcher: HttpFetcher, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn query(&self, function: &str, param: (&str, &str)) -> anyhow::Result<String> {
        let query = [
            ("function", function),
            param,
            ("apikey", self.api_key.as_str()),
        ];
        let body: Value = self.fetcher.get_json(&self.base_url, &query).await?;
        debug!("Alpha Vantage {} returned {} top-level keys", function, top_level_keys(&body));
        Ok(body.to_string())
    }
}

fn top_level_keys(body: &Value) -> usize {
    body.as_object().map_or(0, serde_json::Map::len)
}

#[async_trait]
impl MarketData for AlphaVantage {
    #[instrument(skip(self))]
    async fn symbol_search(&self, company: &str) -> anyhow::Result<String> {
        self.query("SYMBOL_SEARCH", ("keywords", company)).await
    }

    #[instrument(skip(self))]
    async fn company_overview(&self, symbol: &str) -> anyhow::Result<String> {
        self.query("OVERVIEW", ("symbol", symbol)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use serde_json::json;

    #[test]
    fn test_top_level_keys() {
        assert_eq!(top_level_keys(&json!({"bestMatches": [], "Note": "x"})), 2);
        assert_eq!(top_level_keys(&json!([1, 2])), 0);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let fetcher = HttpFetcher::new(&HttpConfig::default()).unwrap();
        let client = AlphaVantage::new(fetcher, "not a url", "demo");
        assert!(client.symbol_search("Apple").await.is_err());
    }
}
