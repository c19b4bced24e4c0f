//! The adventure planner, the investment seeker and its manager

use super::{Agent, AgentProfile, ManagedAgentTool};
use crate::finance::MarketData;
use crate::http::HttpFetcher;
use crate::llm::LlmClient;
use crate::location_resolver::Geocoder;
use crate::search::SearchEngine;
use crate::tools::{
    AdventureSearchTool, CompanyOverviewTool, FindTickerTool, Toolset, VisitWebpageTool,
    WeatherForecastTool, WebSearchTool,
};
use crate::weather::WeatherArchive;
use std::sync::Arc;

pub const ADVENTURE_PLANNER: AgentProfile = AgentProfile {
    name: "adventure_planner",
    description: "Plans adventure trips by searching for activities, checking weather, and creating itineraries.",
    instructions: "You are an expert adventure travel planner that creates detailed trip itineraries.

Use ReAct reasoning to:
1. Search for adventure activities and attractions in the destination
2. Visit relevant webpages to gather detailed information about activities
3. Check weather forecasts for the travel dates
4. Create a day-by-day itinerary that considers weather conditions
5. Recommend appropriate gear and preparations

Always include:
- Day-by-day activity recommendations
- Weather summary and how it affects activities
- Source URLs for all recommendations
- Gear/preparation suggestions based on activities and weather

Consider weather when planning:
- Avoid exposed outdoor activities during storms or severe weather
- Suggest indoor alternatives when weather is poor
- Recommend weather-appropriate activities

Format your final response with clear sections: Itinerary, Weather Summary, Gear Recommendations, and Sources.",
};

pub const SEARCH_AGENT: AgentProfile = AgentProfile {
    name: "search_agent",
    description: "Runs web searches and calls APIs for investment information for you.",
    instructions: "You are a helpful research assistant that can search the web, visit webpages, and call APIs \
to gather information about investment-related topics. You respond with a concise summary of the information \
on the pages you visit.",
};

pub const JEFE: AgentProfile = AgentProfile {
    name: "jefe",
    description: "Orchestrating agent that uses sub-agents to research investment-related questions.",
    instructions: "You are a helpful research assistant that can only answer investment-related questions and \
visit webpages that pertain to the queried company to gather information. You always include your sources in \
your response. If the question is not investment-related, respond with 'I can only answer investment-related \
questions.'",
};

/// Services the adventure planner's tools call into
pub struct TravelServices {
    pub search: Arc<dyn SearchEngine>,
    pub fetcher: HttpFetcher,
    pub max_page_chars: usize,
    pub geocoder: Arc<dyn Geocoder>,
    pub archive: Arc<dyn WeatherArchive>,
}

/// Services the investment seeker's tools call into
pub struct ResearchServices {
    pub search: Arc<dyn SearchEngine>,
    pub fetcher: HttpFetcher,
    pub max_page_chars: usize,
    pub market: Arc<dyn MarketData>,
}

#[must_use]
pub fn travel_toolset(services: TravelServices) -> Toolset {
    Toolset::new()
        .with(WebSearchTool::new(services.search.clone()))
        .with(AdventureSearchTool::new(services.search))
        .with(VisitWebpageTool::new(services.fetcher, services.max_page_chars))
        .with(WeatherForecastTool::new(services.geocoder, services.archive))
}

#[must_use]
pub fn research_toolset(services: ResearchServices) -> Toolset {
    Toolset::new()
        .with(WebSearchTool::new(services.search))
        .with(VisitWebpageTool::new(services.fetcher, services.max_page_chars))
        .with(CompanyOverviewTool::new(services.market.clone()))
        .with(FindTickerTool::new(services.market))
}

#[must_use]
pub fn adventure_planner(llm: Arc<dyn LlmClient>, services: TravelServices, max_steps: u32) -> Agent {
    Agent::new(ADVENTURE_PLANNER, travel_toolset(services), max_steps, llm)
}

#[must_use]
pub fn search_agent(llm: Arc<dyn LlmClient>, services: ResearchServices, max_steps: u32) -> Agent {
    Agent::new(SEARCH_AGENT, research_toolset(services), max_steps, llm)
}

/// Manager whose only tool is the delegated `seeker`
#[must_use]
pub fn jefe(llm: Arc<dyn LlmClient>, seeker: Agent, max_steps: u32) -> Agent {
    let tools = Toolset::new().with(ManagedAgentTool::new(Arc::new(seeker)));
    Agent::new(JEFE, tools, max_steps, llm)
}
