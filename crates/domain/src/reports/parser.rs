use std::sync::OnceLock;

use regex::Regex;

use super::medicine::{MedicineEntry, MedicineKind, Report, UNKNOWN_COMPOSITION, URL_PLACEHOLDER};

/// Link values the planner writes when it has no URL.
const ABSENT_URLS: [&str; 4] = ["n/a", "na", "none", "#"];

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseOutcome {
    Parsed(Report),
    /// Non-empty text with no medicine line in it.
    Unparsed { raw_text: String },
}

fn composition_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^[\s>#*-]*ACTIVE_COMPOSITION:\**[ \t]*(.*)$")
            .expect("composition pattern is a valid regex")
    })
}

fn medicine_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?m)NAME:\s*(.+?)\s*\|\s*TYPE:\s*(.+?)\s*\|\s*PRICE:\s*(.+?)\s*\|\s*URL:\s*(.+?)\s*$",
        )
        .expect("medicine pattern is a valid regex")
    })
}

/// Parses the planner's free-text report. Lines that do not match the
/// medicine line shape are skipped.
pub fn parse(report_text: &str) -> ParseOutcome {
    let active_composition = composition_regex()
        .captures(report_text)
        .and_then(|caps| caps.get(1))
        .map(|value| value.as_str().trim().trim_matches('*').trim())
        .filter(|value| !value.is_empty())
        .unwrap_or(UNKNOWN_COMPOSITION)
        .to_string();

    let entries: Vec<MedicineEntry> = medicine_regex()
        .captures_iter(report_text)
        .map(|caps| {
            MedicineEntry::new(
                caps[1].trim().to_string(),
                MedicineKind::from_label(&caps[2]),
                caps[3].trim().to_string(),
                normalize_url(&caps[4]),
            )
        })
        .collect();

    if entries.is_empty() && !report_text.trim().is_empty() {
        tracing::warn!("Failed to parse report: {}", report_text);
        return ParseOutcome::Unparsed {
            raw_text: report_text.to_string(),
        };
    }

    ParseOutcome::Parsed(Report::new(active_composition, entries))
}

pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if ABSENT_URLS.contains(&url.to_lowercase().as_str()) {
        URL_PLACEHOLDER.to_string()
    } else {
        url.to_string()
    }
}
