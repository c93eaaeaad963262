use std::sync::OnceLock;

use regex::Regex;

use crate::money::Amount;

/// Amount with optional thousands separators and up to two decimals.
const AMOUNT: &str = r"(\d+(?:,\d+)*(?:\.\d{2})?)";

/// One price pattern found in search result text.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PriceMatcher {
    /// `₹123.45`, `₹ 1,234`
    CurrencySymbol,
    /// `Rs. 123`, `Rs 123`
    RsPrefixed,
    /// `INR 123`
    InrPrefixed,
    /// `Price: 123`, `Price: ₹123`
    LabeledPrice,
    /// `MRP: ₹123`, `MRP 123`
    LabeledMrp,
}

impl PriceMatcher {
    /// Evaluation order. The first matcher that finds an amount wins.
    pub const PRIORITY: [PriceMatcher; 5] = [
        PriceMatcher::CurrencySymbol,
        PriceMatcher::RsPrefixed,
        PriceMatcher::InrPrefixed,
        PriceMatcher::LabeledPrice,
        PriceMatcher::LabeledMrp,
    ];

    fn pattern(&self) -> String {
        match self {
            PriceMatcher::CurrencySymbol => format!(r"₹\s*{AMOUNT}"),
            PriceMatcher::RsPrefixed => format!(r"(?i)Rs\.?\s*{AMOUNT}"),
            PriceMatcher::InrPrefixed => format!(r"(?i)INR\s*{AMOUNT}"),
            PriceMatcher::LabeledPrice => format!(r"(?i)Price:\s*₹?\s*{AMOUNT}"),
            PriceMatcher::LabeledMrp => format!(r"(?i)MRP:?\s*₹?\s*{AMOUNT}"),
        }
    }

    fn regex(&self) -> &'static Regex {
        static COMPILED: OnceLock<Vec<Regex>> = OnceLock::new();
        let compiled = COMPILED.get_or_init(|| {
            Self::PRIORITY
                .iter()
                .map(|matcher| {
                    Regex::new(&matcher.pattern()).expect("price patterns are valid regexes")
                })
                .collect()
        });
        &compiled[*self as usize]
    }

    /// First amount this matcher recognises in `text`.
    pub fn find(&self, text: &str) -> Option<Amount> {
        self.matched(text).and_then(Amount::parse)
    }

    fn matched<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex()
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|amount| amount.as_str())
    }
}

/// Runs the matchers in priority order. The first pattern that matches
/// decides the price, even when its amount cannot be read.
pub fn extract_price(text: &str) -> Option<Amount> {
    PriceMatcher::PRIORITY
        .iter()
        .find_map(|matcher| matcher.matched(text))
        .and_then(Amount::parse)
}
