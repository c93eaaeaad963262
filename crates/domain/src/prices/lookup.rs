use super::extractor::{Extraction, PriceExtractor};

pub const TOOL_NAME: &str = "get_medicine_prices";

pub const TOOL_DESCRIPTION: &str = "Searches current prices of ONE specific medicine in Indian \
pharmacies and Jan Aushadhi stores. Call it once per medicine name, e.g. \"Dolo 650\" or \
\"Jan Aushadhi Paracetamol 650\".";

/// Price lookup exposed to the planner: one text block per medicine name.
#[derive(Clone)]
pub struct PriceLookupTool {
    extractor: PriceExtractor,
}

impl PriceLookupTool {
    pub fn new(extractor: PriceExtractor) -> Self {
        Self { extractor }
    }

    pub async fn lookup(&self, medicine_name: &str) -> String {
        let extraction = self.extractor.extract(medicine_name).await;
        render(medicine_name, &extraction)
    }
}

/// One `Store: .. | Price: .. | URL: ..` line per candidate.
pub fn render(medicine_name: &str, extraction: &Extraction) -> String {
    match extraction {
        Extraction::Failed(message) => format!("Error: {message}"),
        Extraction::Candidates(candidates) if candidates.is_empty() => {
            format!("No results found for {medicine_name}.")
        }
        Extraction::Candidates(candidates) => candidates
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
