use anyhow::Result;
use clap::Parser;
use scout::agent::profiles::{self, ResearchServices};
use scout::cli::{self, Args, ReplStyle};
use scout::finance::AlphaVantage;
use scout::search::DuckDuckGo;
use scout::{HttpFetcher, OpenAiCompatClient};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = cli::bootstrap(&args)?;

    let llm = Arc::new(OpenAiCompatClient::new(&config.llm, config.llm_api_key()?)?);
    let fetcher = HttpFetcher::new(&config.http)?;
    let market = AlphaVantage::new(
        fetcher.clone(),
        &config.endpoints.alphavantage_url,
        config.finance_api_key()?,
    );

    let seeker = profiles::search_agent(
        llm.clone(),
        ResearchServices {
            search: Arc::new(DuckDuckGo::new(fetcher.clone(), &config.endpoints.search_url)),
            fetcher,
            max_page_chars: config.http.max_page_chars,
            market: Arc::new(market),
        },
        config.agents.seeker_max_steps,
    );
    let jefe = profiles::jefe(llm, seeker, config.agents.manager_max_steps);

    cli::run(&jefe, &ReplStyle::investment()).await
}
