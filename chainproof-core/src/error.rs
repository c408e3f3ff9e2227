//! Verification error types

use thiserror::Error;

/// Verification error type
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Ticket is structurally or semantically invalid
    #[error("Invalid ticket: {0}")]
    InvalidTicket(String),

    /// An archive entry is not parseable JSON
    #[error("Malformed entry content: {0}")]
    MalformedContent(String),

    /// The archive itself is not a readable ZIP container
    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    /// No archive entry matches the expected `YYYY/MM/DD/<name>.json` layout
    #[error("No entries match the expected <prefix>/YYYY/MM/DD/<name>.json layout")]
    NoMatchingEntries,

    /// Entries match the layout, but none fall inside the requested window
    #[error("No entries fall within the requested date range")]
    NoEntriesInRange,

    /// Transport-level failure talking to the ledger gateway
    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(String),

    /// The gateway answered, but reported an application-level error
    #[error("Ledger query error: {0}")]
    LedgerQueryError(String),
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerifyError>;
