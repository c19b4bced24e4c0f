//! Web search through the DuckDuckGo HTML endpoint

use crate::http::HttpFetcher;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, instrument};

/// Results kept per search
pub const MAX_RESULTS: usize = 10;

static RESULT: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".result").unwrap());
static RESULT_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a.result__a").unwrap());
static RESULT_SNIPPET: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".result__snippet").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Keyword search backend
#[async_trait]
pub trait SearchEngine: Send + Sync {
    async fn search(&self, query: &str) -> anyhow::Result<Vec<SearchHit>>;
}

/// DuckDuckGo HTML results page scraper
pub struct DuckDuckGo {
    fetcher: HttpFetcher,
    search_url: String,
}

impl DuckDuckGo {
    #[must_use]
    pub fn new(fetcher: HttpFetcher, search_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            search_url: search_url.into(),
        }
    }
}

#[async_trait]
impl SearchEngine for DuckDuckGo {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> anyhow::Result<Vec<SearchHit>> {
        let body = self.fetcher.get_text(&self.search_url, &[("q", query)]).await?;
        let hits = parse_results(&body, MAX_RESULTS);
        debug!("DuckDuckGo returned {} results", hits.len());
        Ok(hits)
    }
}

/// Pull result blocks out of a DuckDuckGo HTML page
#[must_use]
pub fn parse_results(html: &str, max: usize) -> Vec<SearchHit> {
    let document = Html::parse_document(html);
    let mut hits = Vec::new();

    for result in document.select(&RESULT) {
        let Some(link) = result.select(&RESULT_LINK).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let url = decode_redirect(href);
        if !url.starts_with("http") {
            continue;
        }

        let snippet = result
            .select(&RESULT_SNIPPET)
            .next()
            .map(|el| squash(&el.text().collect::<String>()))
            .unwrap_or_default();

        hits.push(SearchHit {
            title: squash(&link.text().collect::<String>()),
            url,
            snippet,
        });
        if hits.len() >= max {
            break;
        }
    }

    hits
}

/// DDG wraps result URLs in `/l/?uddg=<encoded>` redirects
fn decode_redirect(href: &str) -> String {
    let Some(pos) = href.find("uddg=") else {
        return href.to_string();
    };
    let encoded = href[pos + 5..].split('&').next().unwrap_or_default();
    if encoded.is_empty() {
        return href.to_string();
    }
    urlencoding::decode(encoded)
        .map(|url| url.into_owned())
        .unwrap_or_else(|_| href.to_string())
}

fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Markdown listing handed to the model
#[must_use]
pub fn format_results(hits: &[SearchHit]) -> String {
    let entries: Vec<String> = hits
        .iter()
        .map(|hit| format!("[{}]({})\n{}", hit.title, hit.url, hit.snippet))
        .collect();
    format!("## Search Results\n\n{}", entries.join("\n\n"))
}

/// Search and format; an empty result set is an error so the model rephrases.
pub async fn run_search(engine: &dyn SearchEngine, query: &str) -> anyhow::Result<String> {
    let hits = engine.search(query).await?;
    if hits.is_empty() {
        anyhow::bail!("No results found! Try a less restrictive/shorter query.");
    }
    Ok(format_results(&hits))
}

/// Query used by the adventure search tool.
///
/// `("Costa Rica", None, 5)` gives
/// `Costa Rica adventure activities outdoor 5 day itinerary travel guide things to do`.
#[must_use]
pub fn build_query(destination: &str, activities: Option<&str>, days: i64) -> String {
    let activities = activities
        .filter(|a| !a.is_empty())
        .unwrap_or("adventure activities outdoor");

    let mut parts = vec![destination.to_string(), activities.to_string()];
    if days > 1 {
        parts.push(format!("{days} day itinerary"));
    }
    parts.push("travel guide".to_string());
    parts.push("things to do".to_string());
    parts.join(" ")
}
