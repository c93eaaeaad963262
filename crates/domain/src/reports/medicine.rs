use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::money::Amount;

/// Composition label used when the report does not name one.
pub const UNKNOWN_COMPOSITION: &str = "Unknown";

/// Canonical URL placeholder for entries without a usable link.
pub const URL_PLACEHOLDER: &str = "#";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub enum MedicineKind {
    /// The medicine the user searched for
    Original,
    /// A same-composition substitute
    Generic,
}

impl MedicineKind {
    /// `original` in any case is the original; every other label is a generic.
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("original") {
            Self::Original
        } else {
            Self::Generic
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq, new)]
pub struct MedicineEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MedicineKind,
    /// Price text as written in the report, e.g. `₹18.51`.
    pub price: String,
    pub url: String,
}

impl MedicineEntry {
    pub fn is_original(&self) -> bool {
        self.kind == MedicineKind::Original
    }

    /// Numeric price at the precision written, or `None` when the text
    /// holds no number.
    pub fn price_value(&self) -> Option<Amount> {
        Amount::find_in(&self.price)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Report {
    pub active_composition: String,
    #[serde(rename = "medicines")]
    pub entries: Vec<MedicineEntry>,
}

impl Report {
    pub fn new(active_composition: impl Into<String>, entries: Vec<MedicineEntry>) -> Self {
        Self {
            active_composition: active_composition.into(),
            entries,
        }
    }

    /// The first entry marked original; its price is the comparison baseline.
    pub fn original(&self) -> Option<&MedicineEntry> {
        self.entries.iter().find(|entry| entry.is_original())
    }

    pub fn generics(&self) -> impl Iterator<Item = &MedicineEntry> {
        self.entries.iter().filter(|entry| !entry.is_original())
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new(UNKNOWN_COMPOSITION, Vec::new())
    }
}
