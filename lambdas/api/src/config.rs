use std::{env, time::Duration};

use domain::{prices::search::SERPAPI_BASE_URL, speech::SPEECHMATICS_BASE_URL, Error};
use planner::client::{DEFAULT_MODEL, GROQ_BASE_URL};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 15;
const DEFAULT_PLANNER_TIMEOUT_SECS: u64 = 120;
const DEFAULT_PLANNER_MAX_ROUNDS: u64 = 8;
const DEFAULT_TRANSCRIPTION_TIMEOUT_SECS: u64 = 120;

/// Process settings read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub serpapi_api_key: String,
    pub serpapi_base_url: String,
    pub groq_api_key: String,
    pub groq_base_url: String,
    pub groq_model: String,
    /// Voice search is disabled without it.
    pub speechmatics_api_key: Option<String>,
    pub speechmatics_base_url: String,
    pub bind_addr: String,
    pub search_timeout: Duration,
    pub planner_timeout: Duration,
    pub planner_max_rounds: usize,
    pub transcription_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Fails on the first missing credential.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let serpapi_api_key = required(&lookup, "SERPAPI_API_KEY")?;
        let groq_api_key = required(&lookup, "GROQ_API_KEY")?;

        Ok(Self {
            serpapi_api_key,
            serpapi_base_url: optional(&lookup, "SERPAPI_BASE_URL")
                .unwrap_or_else(|| SERPAPI_BASE_URL.to_string()),
            groq_api_key,
            groq_base_url: optional(&lookup, "GROQ_BASE_URL")
                .unwrap_or_else(|| GROQ_BASE_URL.to_string()),
            groq_model: optional(&lookup, "GROQ_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            speechmatics_api_key: optional(&lookup, "SPEECHMATICS_API_KEY"),
            speechmatics_base_url: optional(&lookup, "SPEECHMATICS_BASE_URL")
                .unwrap_or_else(|| SPEECHMATICS_BASE_URL.to_string()),
            bind_addr: optional(&lookup, "BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            search_timeout: Duration::from_secs(number_or(
                &lookup,
                "SEARCH_TIMEOUT_SECS",
                DEFAULT_SEARCH_TIMEOUT_SECS,
            )),
            planner_timeout: Duration::from_secs(number_or(
                &lookup,
                "PLANNER_TIMEOUT_SECS",
                DEFAULT_PLANNER_TIMEOUT_SECS,
            )),
            planner_max_rounds: number_or(&lookup, "PLANNER_MAX_ROUNDS", DEFAULT_PLANNER_MAX_ROUNDS)
                as usize,
            transcription_timeout: Duration::from_secs(number_or(
                &lookup,
                "TRANSCRIPTION_TIMEOUT_SECS",
                DEFAULT_TRANSCRIPTION_TIMEOUT_SECS,
            )),
        })
    }
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, Error> {
    optional(lookup, key).ok_or_else(|| Error::Configuration {
        key: key.to_string(),
    })
}

fn number_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    match optional(lookup, key) {
        None => default,
        Some(value) => match value.parse::<u64>() {
            Ok(number) if number > 0 => number,
            _ => {
                tracing::warn!("Ignoring invalid {}={}, using {}", key, value, default);
                default
            }
        },
    }
}
