use crate::money::Amount;

use super::medicine::{MedicineEntry, Report};

/// Saving offered by one retained generic.
#[derive(Clone, Debug, PartialEq)]
pub struct Saving {
    pub name: String,
    pub price: Amount,
    pub percent: f64,
}

/// Counts produced while filtering, for logging only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Diagnostics {
    /// Price of the first original entry. `None` skips filtering.
    pub baseline: Option<Amount>,
    pub removed: usize,
    pub savings: Vec<Saving>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Validation {
    pub report: Report,
    pub diagnostics: Diagnostics,
}

/// Drops every generic that is not strictly cheaper than the original.
///
/// Without an original entry, or when its price holds no number, the report
/// is returned untouched. A generic whose price cannot be read is dropped.
pub fn validate(report: Report) -> Validation {
    let Some(baseline) = report.original().and_then(MedicineEntry::price_value) else {
        tracing::info!("No original price found, skipping generic validation");
        return Validation {
            report,
            diagnostics: Diagnostics::default(),
        };
    };

    tracing::info!("Original price detected: {}", baseline);

    let mut diagnostics = Diagnostics {
        baseline: Some(baseline.clone()),
        ..Diagnostics::default()
    };

    let Report {
        active_composition,
        entries,
    } = report;

    let entries = entries
        .into_iter()
        .filter(|entry| {
            if entry.is_original() {
                tracing::info!("Keeping original: {} ({})", entry.name, baseline);
                return true;
            }

            match entry.price_value() {
                Some(price) if price < baseline => {
                    let percent = baseline.savings_percent(&price);
                    tracing::info!("Keeping: {} ({}) - {:.1}% cheaper", entry.name, price, percent);
                    diagnostics.savings.push(Saving {
                        name: entry.name.clone(),
                        price,
                        percent,
                    });
                    true
                }
                Some(price) => {
                    tracing::info!("Removing: {} ({}) - not cheaper than {}", entry.name, price, baseline);
                    diagnostics.removed += 1;
                    false
                }
                None => {
                    tracing::info!("Removing: {} - invalid price: {}", entry.name, entry.price);
                    diagnostics.removed += 1;
                    false
                }
            }
        })
        .collect();

    if diagnostics.removed > 0 {
        tracing::info!("Removed {} expensive generic(s)", diagnostics.removed);
    }

    Validation {
        report: Report::new(active_composition, entries),
        diagnostics,
    }
}
