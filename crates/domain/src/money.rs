use std::{cmp::Ordering, fmt};

pub const RUPEE_SYMBOL: char = '₹';

/// Indian Rupee amount in whole paise. Used for fixed, known prices.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Money {
    paise: u64,
}

impl Money {
    pub const fn from_paise(paise: u64) -> Self {
        Self { paise }
    }

    pub const fn from_rupees(rupees: u64) -> Self {
        Self { paise: rupees * 100 }
    }

    pub fn paise(&self) -> u64 {
        self.paise
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rupees = self.paise / 100;
        let paise = self.paise % 100;
        if paise == 0 {
            write!(f, "{RUPEE_SYMBOL}{rupees}")
        } else {
            write!(f, "{RUPEE_SYMBOL}{rupees}.{paise:02}")
        }
    }
}

/// Rupee amount read from text, kept digit for digit as written (minus
/// thousands separators).
///
/// Ordering and equality are numeric at full precision, so `29.995 < 30`
/// and `15.00 == 15`. There is no upper bound on the size of the number.
#[derive(Clone, Debug)]
pub struct Amount {
    digits: String,
}

impl Amount {
    /// Parses a bare amount such as `1,234.50`. Anything but digits,
    /// commas and a single decimal point is rejected.
    pub fn parse(text: &str) -> Option<Self> {
        let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
        let (whole, fraction) = match cleaned.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (cleaned.as_str(), None),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        match fraction {
            None => Some(Self::from_parts(whole, "")),
            Some(fraction) if !fraction.is_empty() && fraction.bytes().all(|b| b.is_ascii_digit()) => {
                Some(Self::from_parts(whole, fraction))
            }
            Some(_) => None,
        }
    }

    /// Pulls the first number out of free-form price text (`₹18.51`,
    /// `Rs. 1,200 per strip`). `None` when the text carries no digits.
    pub fn find_in(text: &str) -> Option<Self> {
        let cleaned: String = text.chars().filter(|c| *c != ',').collect();
        let start = cleaned.find(|c: char| c.is_ascii_digit())?;
        let rest = &cleaned[start..];

        let whole_len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let whole = &rest[..whole_len];

        let fraction = rest[whole_len..]
            .strip_prefix('.')
            .map(|after| {
                let len = after
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(after.len());
                &after[..len]
            })
            .unwrap_or("");

        Some(Self::from_parts(whole, fraction))
    }

    fn from_parts(whole: &str, fraction: &str) -> Self {
        let digits = if fraction.is_empty() {
            whole.to_string()
        } else {
            format!("{whole}.{fraction}")
        };
        Self { digits }
    }

    /// The digits as written, e.g. `15.00`.
    pub fn as_str(&self) -> &str {
        &self.digits
    }

    /// Whole part without leading zeros and fraction without trailing zeros.
    fn normalized(&self) -> (&str, &str) {
        let (whole, fraction) = self.digits.split_once('.').unwrap_or((self.digits.as_str(), ""));
        (whole.trim_start_matches('0'), fraction.trim_end_matches('0'))
    }

    /// Approximate value, for percentages only.
    pub fn as_f64(&self) -> f64 {
        self.digits.parse().unwrap_or_default()
    }

    /// Percentage saved by paying `cheaper` instead of `self`.
    pub fn savings_percent(&self, cheaper: &Amount) -> f64 {
        let base = self.as_f64();
        if base == 0.0 {
            return 0.0;
        }
        (base - cheaper.as_f64()) / base * 100.0
    }
}

impl From<Money> for Amount {
    fn from(money: Money) -> Self {
        let rupees = (money.paise / 100).to_string();
        match money.paise % 100 {
            0 => Self::from_parts(&rupees, ""),
            paise => Self::from_parts(&rupees, &format!("{paise:02}")),
        }
    }
}

impl Ord for Amount {
    fn cmp(&self, other: &Self) -> Ordering {
        let (whole, fraction) = self.normalized();
        let (other_whole, other_fraction) = other.normalized();

        // Without leading zeros a longer whole part is a larger number, and
        // without trailing zeros fractions compare digit by digit.
        whole
            .len()
            .cmp(&other_whole.len())
            .then_with(|| whole.cmp(other_whole))
            .then_with(|| fraction.cmp(other_fraction))
    }
}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Amount {}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{RUPEE_SYMBOL}{}", self.digits)
    }
}
