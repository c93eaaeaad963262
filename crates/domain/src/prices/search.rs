use std::time::Duration;

use async_trait::async_trait;
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::errors::Error;

pub const SERPAPI_BASE_URL: &str = "https://serpapi.com/search.json";

/// SerpApi reports an empty result page through its `error` field.
const SERPAPI_EMPTY_NOTICE: &str = "hasn't returned any results";

/// One organic web result.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq, new)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub link: Option<String>,
}

/// Market the search is localised to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Locale {
    pub location: &'static str,
    pub country: &'static str,
    pub language: &'static str,
}

pub const INDIA: Locale = Locale {
    location: "India",
    country: "in",
    language: "en",
};

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn web_search(
        &self,
        query: &str,
        locale: &Locale,
        result_count: usize,
    ) -> Result<Vec<SearchHit>, Error>;
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<SearchHit>,
    error: Option<String>,
}

/// Google results through SerpApi.
#[derive(Clone, Debug)]
pub struct SerpApiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl SerpApiClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: SERPAPI_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SearchProvider for SerpApiClient {
    async fn web_search(
        &self,
        query: &str,
        locale: &Locale,
        result_count: usize,
    ) -> Result<Vec<SearchHit>, Error> {
        let num = result_count.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("location", locale.location),
                ("hl", locale.language),
                ("gl", locale.country),
                ("num", num.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<SerpApiResponse>(&body)
                .ok()
                .and_then(|parsed| parsed.error)
                .unwrap_or(body);
            return Err(Error::Provider {
                message: format!("SerpApi returned {status}: {detail}"),
            });
        }

        let parsed: SerpApiResponse = serde_json::from_str(&body).map_err(|e| Error::Provider {
            message: format!("Malformed SerpApi response: {e}"),
        })?;

        match parsed.error {
            Some(error) if parsed.organic_results.is_empty() => {
                if error.contains(SERPAPI_EMPTY_NOTICE) {
                    Ok(Vec::new())
                } else {
                    Err(Error::Provider { message: error })
                }
            }
            _ => Ok(parsed.organic_results),
        }
    }
}
