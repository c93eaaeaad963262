//! Medicine price discovery and validation

/// Rupee amounts
pub mod money;

/// Price lookup from fixed tables and web search
pub mod prices;

/// Planner report parsing and validation
pub mod reports;

/// Speech-to-text for voice queries
pub mod speech;

/// Domain errors
pub mod errors;

pub use errors::Error;
pub use money::{Amount, Money};
