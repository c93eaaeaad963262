use serde::{Deserialize, Serialize};

use super::{
    medicine::{MedicineEntry, Report, UNKNOWN_COMPOSITION},
    parser::{self, ParseOutcome},
    validator,
};

/// Body of a successful `/search` call.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct SearchResponse {
    pub result: SearchResult,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct SearchResult {
    pub active_composition: String,
    pub medicines: Vec<MedicineEntry>,
    /// Planner text, present only when it could not be parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

impl SearchResponse {
    /// Parses the planner's report and filters it down to cheaper generics.
    pub fn from_report_text(report_text: &str) -> Self {
        let result = match parser::parse(report_text) {
            ParseOutcome::Parsed(report) => SearchResult::from(validator::validate(report).report),
            ParseOutcome::Unparsed { raw_text } => SearchResult::unparsed(raw_text),
        };

        Self { result }
    }
}

impl SearchResult {
    pub fn unparsed(raw_text: String) -> Self {
        Self {
            active_composition: UNKNOWN_COMPOSITION.to_string(),
            medicines: Vec::new(),
            raw_text: Some(raw_text),
        }
    }
}

impl From<Report> for SearchResult {
    fn from(report: Report) -> Self {
        Self {
            active_composition: report.active_composition,
            medicines: report.entries,
            raw_text: None,
        }
    }
}
