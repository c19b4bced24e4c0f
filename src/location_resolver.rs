//! Location Resolution Module
//!
//! Turns a free-form place string into an ordered list of geocoding candidates
//! and resolves the first candidate the geocoder knows about.

use crate::models::GeocodeResult;
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());

/// Name-based geocoding service
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// All matches for `name`, best first
    async fn geocode(&self, name: &str) -> anyhow::Result<Vec<GeocodeResult>>;
}

/// Why no candidate resolved
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionFailure {
    /// At least one candidate failed with an error; carries the last one
    Api(String),
    /// Every candidate was looked up and none matched
    NotFound,
}

/// A resolved location and the candidate that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub candidate: String,
    pub result: GeocodeResult,
}

/// Raw location with its whitespace-collapsed and parenthesis-free forms
struct LocationText {
    cleaned: String,
    stripped: String,
}

impl LocationText {
    fn new(raw: &str) -> Self {
        let cleaned = WHITESPACE.replace_all(raw, " ").trim().to_string();
        let stripped = PARENTHETICAL.replace_all(&cleaned, "").trim().to_string();
        Self { cleaned, stripped }
    }

    fn comma_parts(&self) -> Vec<&str> {
        if !self.stripped.contains(',') {
            return Vec::new();
        }
        self.stripped
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect()
    }
}

type CandidateStep = fn(&LocationText) -> Vec<String>;

/// Candidate-producing steps, in priority order
const CANDIDATE_STEPS: [CandidateStep; 4] = [full_text, without_parentheses, comma_split, word_split];

fn full_text(text: &LocationText) -> Vec<String> {
    vec![text.cleaned.clone()]
}

fn without_parentheses(text: &LocationText) -> Vec<String> {
    vec![text.stripped.clone()]
}

/// `"Chamonix, Haute-Savoie, France"` -> `Chamonix`, `Chamonix, France`
fn comma_split(text: &LocationText) -> Vec<String> {
    first_and_pair(&text.comma_parts())
}

/// Only applies when there are no usable comma parts.
/// `"Chamonix Mont Blanc"` -> `Chamonix`, `Chamonix, Blanc`
fn word_split(text: &LocationText) -> Vec<String> {
    if !text.comma_parts().is_empty() {
        return Vec::new();
    }
    let words: Vec<&str> = text.stripped.split(' ').filter(|w| !w.is_empty()).collect();
    first_and_pair(&words)
}

fn first_and_pair(parts: &[&str]) -> Vec<String> {
    match parts {
        [] => Vec::new(),
        [only] => vec![only.to_string()],
        [first, .., last] => vec![first.to_string(), format!("{first}, {last}")],
    }
}

/// Ordered, de-duplicated geocoding candidates for a raw location.
///
/// Empty only when the input is blank.
#[must_use]
pub fn location_candidates(raw: &str) -> Vec<String> {
    let text = LocationText::new(raw);
    let mut candidates: Vec<String> = Vec::new();

    for step in CANDIDATE_STEPS {
        for candidate in step(&text) {
            if !candidate.is_empty() && !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    candidates
}

/// Service for resolving location inputs
pub struct LocationResolver;

impl LocationResolver {
    /// Geocode candidates in order; the first one with a match wins.
    ///
    /// Errors on individual candidates are swallowed so later candidates still
    /// get a chance.
    pub async fn resolve(
        geocoder: &dyn Geocoder,
        raw_location: &str,
    ) -> Result<Resolved, ResolutionFailure> {
        let candidates = location_candidates(raw_location);
        debug!("Resolving '{}' via candidates {:?}", raw_location, candidates);

        let mut last_error: Option<String> = None;

        for candidate in candidates {
            match geocoder.geocode(&candidate).await {
                Ok(results) => {
                    if let Some(result) = results.into_iter().next() {
                        debug!(
                            "Found location for '{}': {:?} ({:.4}, {:.4})",
                            candidate, result.name, result.latitude, result.longitude
                        );
                        return Ok(Resolved { candidate, result });
                    }
                    debug!("No geocoding results for candidate '{}'", candidate);
                }
                Err(e) => {
                    warn!("Geocoding candidate '{}' failed: {:#}", candidate, e);
                    last_error = Some(format!("{e:#}"));
                }
            }
        }

        Err(match last_error {
            Some(error) => ResolutionFailure::Api(error),
            None => ResolutionFailure::NotFound,
        })
    }
}
