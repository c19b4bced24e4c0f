use anyhow::Result;
use clap::Parser;
use scout::agent::profiles::{self, TravelServices};
use scout::cli::{self, Args, ReplStyle};
use scout::search::DuckDuckGo;
use scout::{HttpFetcher, OpenAiCompatClient, OpenMeteoClient};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = cli::bootstrap(&args)?;

    let llm = Arc::new(OpenAiCompatClient::new(&config.llm, config.llm_api_key()?)?);
    let fetcher = HttpFetcher::new(&config.http)?;
    let open_meteo = Arc::new(OpenMeteoClient::new(fetcher.clone(), &config.endpoints));

    let planner = profiles::adventure_planner(
        llm,
        TravelServices {
            search: Arc::new(DuckDuckGo::new(fetcher.clone(), &config.endpoints.search_url)),
            fetcher,
            max_page_chars: config.http.max_page_chars,
            geocoder: open_meteo.clone(),
            archive: open_meteo,
        },
        config.agents.planner_max_steps,
    );

    cli::run(&planner, &ReplStyle::adventure()).await
}
