use crate::money::Money;

/// Case-folded marker that flags a query as a Jan Aushadhi (scheme) lookup.
pub const SCHEME_MARKER: &str = "jan aushadhi";
pub const SCHEME_OPERATOR: &str = "Jan Aushadhi Kendra (Government)";
pub const SCHEME_OUTLET: &str = "Jan Aushadhi Kendra";
pub const SCHEME_PORTAL_URL: &str = "https://janaushadhi.gov.in/";

/// Government-fixed Jan Aushadhi prices, keyed by composition and strength.
const JAN_AUSHADHI_PRICES: &[(&str, Money)] = &[
    ("pantoprazole 40", Money::from_rupees(15)),
    ("pantoprazole 40mg", Money::from_rupees(15)),
    ("paracetamol 650", Money::from_paise(50)),
    ("paracetamol 650mg", Money::from_paise(50)),
    ("paracetamol 500", Money::from_paise(35)),
    ("vitamin c 500", Money::from_rupees(15)),
    ("vitamin c 500mg", Money::from_rupees(15)),
    ("aspirin 75", Money::from_rupees(5)),
    ("aspirin 325", Money::from_rupees(5)),
    ("omeprazole 20", Money::from_rupees(10)),
    ("atorvastatin 10", Money::from_rupees(10)),
    ("metformin 500", Money::from_rupees(5)),
];

pub fn is_scheme_query(query: &str) -> bool {
    query.to_lowercase().contains(SCHEME_MARKER)
}

/// Fixed-price lookup. Built once at startup and only ever read afterwards.
#[derive(Clone, Debug)]
pub struct KnownPriceTable {
    entries: Vec<(String, Money)>,
}

impl KnownPriceTable {
    pub fn new<K: Into<String>>(entries: impl IntoIterator<Item = (K, Money)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, price)| (key.into().to_lowercase(), price))
                .collect(),
        }
    }

    pub fn jan_aushadhi() -> Self {
        Self::new(JAN_AUSHADHI_PRICES.iter().copied())
    }

    /// First entry, in table order, whose key occurs inside `normalized_query`.
    pub fn find(&self, normalized_query: &str) -> Option<(&str, Money)> {
        self.entries
            .iter()
            .find(|(key, _)| normalized_query.contains(key.as_str()))
            .map(|(key, price)| (key.as_str(), *price))
    }

    pub fn lookup(&self, normalized_query: &str) -> Option<Money> {
        self.find(normalized_query).map(|(_, price)| price)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for KnownPriceTable {
    fn default() -> Self {
        Self::jan_aushadhi()
    }
}
