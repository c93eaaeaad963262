use std::{fmt, sync::Arc};

use derive_new::new;

use crate::money::Amount;

use super::{
    known::{self, KnownPriceTable},
    matchers,
    search::{SearchHit, SearchProvider, INDIA},
};

/// Appended to every live query to keep results on Indian pharmacies.
pub const MARKET_TERMS: &str = "price India pharmacy";
pub const SEARCH_RESULT_COUNT: usize = 10;
pub const MAX_CANDIDATES: usize = 5;

const SCANNED_RESULTS: usize = 8;
const FALLBACK_RESULTS: usize = 3;
const STORE_NAME_LIMIT: usize = 50;

pub const CHECK_LOCAL_STORE: &str = "Check local store";
pub const CHECK_WEBSITE: &str = "Check website";
pub const MISSING_URL: &str = "N/A";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Price {
    /// Amount as the source wrote it, e.g. `₹15.00`.
    Amount(Amount),
    /// No number could be read; the label tells the reader where to look.
    Unresolved(&'static str),
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Amount(amount) => write!(f, "{amount}"),
            Price::Unresolved(label) => f.write_str(label),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, new)]
pub struct PriceCandidate {
    pub store: String,
    pub price: Price,
    pub url: String,
}

impl fmt::Display for PriceCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Store: {} | Price: {} | URL: {}", self.store, self.price, self.url)
    }
}

/// Outcome of one price lookup.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Extraction {
    /// Zero to five candidates in search-result order.
    Candidates(Vec<PriceCandidate>),
    /// The provider call failed; carries its message verbatim.
    Failed(String),
}

impl Extraction {
    pub fn candidates(&self) -> &[PriceCandidate] {
        match self {
            Extraction::Candidates(candidates) => candidates.as_slice(),
            Extraction::Failed(_) => &[],
        }
    }
}

/// Resolves a medicine name to price candidates from the known-price table
/// or live search results.
#[derive(Clone)]
pub struct PriceExtractor {
    provider: Arc<dyn SearchProvider>,
    known_prices: Arc<KnownPriceTable>,
}

impl PriceExtractor {
    pub fn new(provider: Arc<dyn SearchProvider>, known_prices: Arc<KnownPriceTable>) -> Self {
        Self {
            provider,
            known_prices,
        }
    }

    pub async fn extract(&self, medicine_name: &str) -> Extraction {
        tracing::info!("Searching prices for: {}", medicine_name);

        let is_scheme = known::is_scheme_query(medicine_name);

        if is_scheme {
            if let Some((key, price)) = self.known_prices.find(&medicine_name.to_lowercase()) {
                tracing::info!("Jan Aushadhi known price for {}: {}", key, price);
                return Extraction::Candidates(vec![PriceCandidate::new(
                    known::SCHEME_OPERATOR.to_string(),
                    Price::Amount(price.into()),
                    known::SCHEME_PORTAL_URL.to_string(),
                )]);
            }
        }

        let query = format!("{medicine_name} {MARKET_TERMS}");
        let hits = match self
            .provider
            .web_search(&query, &INDIA, SEARCH_RESULT_COUNT)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                tracing::error!("Price search failed for {}: {}", medicine_name, e);
                return Extraction::Failed(e.to_string());
            }
        };

        if hits.is_empty() {
            tracing::info!("No search results for {}", medicine_name);
            if is_scheme {
                return Extraction::Candidates(vec![PriceCandidate::new(
                    known::SCHEME_OUTLET.to_string(),
                    Price::Unresolved(CHECK_LOCAL_STORE),
                    known::SCHEME_PORTAL_URL.to_string(),
                )]);
            }
            return Extraction::Candidates(Vec::new());
        }

        let priced = priced_candidates(&hits);
        let found = priced.len();

        let mut candidates = if priced.is_empty() {
            unpriced_candidates(&hits)
        } else {
            priced
        };
        candidates.truncate(MAX_CANDIDATES);

        tracing::info!(
            "Found {} results with {} prices for {}",
            candidates.len(),
            found,
            medicine_name
        );
        for candidate in candidates.iter().take(3) {
            if candidate.url != MISSING_URL {
                tracing::debug!("URL found: {}", candidate.url);
            }
        }

        Extraction::Candidates(candidates)
    }
}

fn priced_candidates(hits: &[SearchHit]) -> Vec<PriceCandidate> {
    hits.iter()
        .take(SCANNED_RESULTS)
        .filter_map(|hit| {
            let text = format!("{} {}", hit.title, hit.snippet);
            let price = matchers::extract_price(&text)?;
            Some(PriceCandidate::new(
                store_name(&hit.title),
                Price::Amount(price),
                link_or_missing(hit),
            ))
        })
        .collect()
}

fn unpriced_candidates(hits: &[SearchHit]) -> Vec<PriceCandidate> {
    hits.iter()
        .take(FALLBACK_RESULTS)
        .map(|hit| {
            let title = if hit.title.is_empty() {
                "Unknown"
            } else {
                hit.title.as_str()
            };
            PriceCandidate::new(
                title.chars().take(STORE_NAME_LIMIT).collect(),
                Price::Unresolved(CHECK_WEBSITE),
                link_or_missing(hit),
            )
        })
        .collect()
}

fn link_or_missing(hit: &SearchHit) -> String {
    hit.link.clone().unwrap_or_else(|| MISSING_URL.to_string())
}

/// Display name from a result title: cut at the first dash, then at the
/// first pipe, capped at fifty characters.
pub fn store_name(title: &str) -> String {
    let mut name = title;
    if let Some(index) = name.find('-') {
        name = name[..index].trim_end();
    }
    if let Some(index) = name.find('|') {
        name = name[..index].trim_end();
    }
    name.chars().take(STORE_NAME_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::{errors::Error, money::Money, prices::search::Locale};

    struct FakeProvider {
        hits: Vec<SearchHit>,
        queries: Mutex<Vec<String>>,
    }

    impl FakeProvider {
        fn with_hits(hits: Vec<SearchHit>) -> Arc<Self> {
            Arc::new(Self {
                hits,
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SearchProvider for FakeProvider {
        async fn web_search(
            &self,
            query: &str,
            _locale: &Locale,
            _result_count: usize,
        ) -> Result<Vec<SearchHit>, Error> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(self.hits.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl SearchProvider for FailingProvider {
        async fn web_search(
            &self,
            _query: &str,
            _locale: &Locale,
            _result_count: usize,
        ) -> Result<Vec<SearchHit>, Error> {
            Err(Error::Provider {
                message: "connection reset by peer".to_string(),
            })
        }
    }

    fn hit(title: &str, snippet: &str, link: &str) -> SearchHit {
        SearchHit::new(title.to_string(), snippet.to_string(), Some(link.to_string()))
    }

    fn extractor(provider: Arc<dyn SearchProvider>) -> PriceExtractor {
        PriceExtractor::new(provider, Arc::new(KnownPriceTable::jan_aushadhi()))
    }

    #[tokio::test]
    async fn scheme_query_uses_known_price_without_search() {
        let provider = FakeProvider::with_hits(vec![hit("Should not be used", "₹99", "https://x")]);
        let extraction = extractor(provider.clone())
            .extract("Jan Aushadhi Paracetamol 650mg")
            .await;

        assert_eq!(
            extraction,
            Extraction::Candidates(vec![PriceCandidate::new(
                known::SCHEME_OPERATOR.to_string(),
                Price::Amount(Money::from_paise(50).into()),
                known::SCHEME_PORTAL_URL.to_string(),
            )])
        );
        assert_eq!(
            extraction.candidates()[0].to_string(),
            "Store: Jan Aushadhi Kendra (Government) | Price: ₹0.50 | URL: https://janaushadhi.gov.in/"
        );
        assert!(provider.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn branded_query_goes_to_search_with_market_terms() {
        let provider = FakeProvider::with_hits(vec![hit("Dolo 650 - Tata 1mg", "MRP ₹30.91", "https://1mg.com/dolo")]);
        let extraction = extractor(provider.clone()).extract("paracetamol 650").await;

        assert_eq!(
            provider.queries.lock().unwrap().as_slice(),
            ["paracetamol 650 price India pharmacy"]
        );
        assert_eq!(
            extraction.candidates(),
            [PriceCandidate::new(
                "Dolo 650".to_string(),
                Price::Amount(Money::from_paise(3091).into()),
                "https://1mg.com/dolo".to_string(),
            )]
        );
    }

    #[tokio::test]
    async fn empty_results_for_scheme_query_point_to_portal() {
        let extraction = extractor(FakeProvider::with_hits(Vec::new()))
            .extract("Jan Aushadhi Cetirizine 10mg")
            .await;

        assert_eq!(
            extraction.candidates(),
            [PriceCandidate::new(
                known::SCHEME_OUTLET.to_string(),
                Price::Unresolved(CHECK_LOCAL_STORE),
                known::SCHEME_PORTAL_URL.to_string(),
            )]
        );
    }

    #[tokio::test]
    async fn empty_results_for_branded_query() {
        let extraction = extractor(FakeProvider::with_hits(Vec::new()))
            .extract("Limcee")
            .await;
        assert_eq!(extraction, Extraction::Candidates(Vec::new()));
    }

    #[tokio::test]
    async fn caps_at_five_in_result_order() {
        let hits = (1..=8)
            .map(|i| hit(&format!("Store {i} | Online"), &format!("Rs. {}", 100 - i), &format!("https://s{i}")))
            .collect();
        let extraction = extractor(FakeProvider::with_hits(hits)).extract("Pan 40").await;
        let stores: Vec<_> = extraction
            .candidates()
            .iter()
            .map(|c| c.store.as_str())
            .collect();

        assert_eq!(stores, ["Store 1", "Store 2", "Store 3", "Store 4", "Store 5"]);
        assert_eq!(extraction.candidates()[0].price, Price::Amount(Money::from_rupees(99).into()));
    }

    #[tokio::test]
    async fn only_first_eight_results_are_scanned() {
        let mut hits: Vec<SearchHit> = (1..=8).map(|i| hit(&format!("No price {i}"), "", "https://n")).collect();
        hits.push(hit("Ninth", "₹10", "https://ninth"));
        let extraction = extractor(FakeProvider::with_hits(hits)).extract("Pan 40").await;

        assert_eq!(extraction.candidates().len(), FALLBACK_RESULTS);
        assert!(extraction
            .candidates()
            .iter()
            .all(|c| c.price == Price::Unresolved(CHECK_WEBSITE)));
    }

    #[tokio::test]
    async fn unpriced_results_fall_back_to_top_three() {
        let hits = vec![
            hit("Pan 40 Tablet - Uses, Side Effects", "Buy online", "https://a"),
            SearchHit::new(String::new(), "nothing".to_string(), None),
            hit("Pantoprazole", "generic", "https://c"),
            hit("Fourth", "more", "https://d"),
        ];
        let extraction = extractor(FakeProvider::with_hits(hits)).extract("Pan 40").await;

        assert_eq!(
            extraction.candidates(),
            [
                PriceCandidate::new(
                    "Pan 40 Tablet - Uses, Side Effects".to_string(),
                    Price::Unresolved(CHECK_WEBSITE),
                    "https://a".to_string(),
                ),
                PriceCandidate::new("Unknown".to_string(), Price::Unresolved(CHECK_WEBSITE), MISSING_URL.to_string()),
                PriceCandidate::new("Pantoprazole".to_string(), Price::Unresolved(CHECK_WEBSITE), "https://c".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn priced_hit_without_link_and_amount_as_written() {
        let hits = vec![
            SearchHit::new("Apollo Pharmacy".to_string(), "Pan 40 strip ₹15.00".to_string(), None),
            hit("Netmeds | Pan 40", "MRP: ₹1,234.50", "https://netmeds"),
        ];
        let extraction = extractor(FakeProvider::with_hits(hits)).extract("Pan 40").await;
        let lines: Vec<String> = extraction.candidates().iter().map(ToString::to_string).collect();

        assert_eq!(
            lines,
            [
                "Store: Apollo Pharmacy | Price: ₹15.00 | URL: N/A",
                "Store: Netmeds | Price: ₹1234.50 | URL: https://netmeds",
            ]
        );
    }

    #[tokio::test]
    async fn provider_error_becomes_failed_extraction() {
        let extraction = extractor(Arc::new(FailingProvider)).extract("Dolo 650").await;
        assert_eq!(
            extraction,
            Extraction::Failed("Search provider error: connection reset by peer".to_string())
        );
        assert!(extraction.candidates().is_empty());
    }

    #[test]
    fn store_name_cuts_at_dash_then_pipe() {
        assert_eq!(store_name("Dolo 650 Tablet - Apollo Pharmacy"), "Dolo 650 Tablet");
        assert_eq!(store_name("PharmEasy | Dolo 650 - Buy"), "PharmEasy");
        assert_eq!(store_name("Netmeds|Dolo"), "Netmeds");
        assert_eq!(store_name(&"x".repeat(80)).len(), STORE_NAME_LIMIT);
    }
}
