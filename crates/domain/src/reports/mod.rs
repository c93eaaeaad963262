/// Report entries
pub mod medicine;

/// Planner report parsing
pub mod parser;

/// Cheaper-generic filtering
pub mod validator;

/// `/search` response shapes
pub mod response;

pub use medicine::{MedicineEntry, MedicineKind, Report};
pub use parser::{parse, ParseOutcome};
pub use response::{SearchResponse, SearchResult};
pub use validator::{validate, Diagnostics, Validation};
