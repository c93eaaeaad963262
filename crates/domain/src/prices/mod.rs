/// Jan Aushadhi fixed prices
pub mod known;

/// Price patterns for search result text
pub mod matchers;

/// Outbound web search
pub mod search;

/// Search result price extraction
pub mod extractor;

/// Planner-facing lookup tool
pub mod lookup;

pub use extractor::{Extraction, Price, PriceCandidate, PriceExtractor};
pub use known::KnownPriceTable;
pub use lookup::PriceLookupTool;
pub use matchers::PriceMatcher;
pub use search::{Locale, SearchHit, SearchProvider, SerpApiClient, INDIA};
