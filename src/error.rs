//! Error types for the split ledger.

use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur while splitting, aggregating, settling or storing.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Malformed or non-summing split parameters
    #[error("Invalid split for expense {expense}: {reason}")]
    InvalidSplit { expense: String, reason: String },

    /// Reference to a person absent from the group roster
    #[error("Unknown person '{person}' referenced by {context}")]
    UnknownPerson { person: String, context: String },

    /// Balances handed to the optimizer do not sum to zero
    #[error("Unbalanced ledger: balances sum to {total} instead of zero")]
    UnbalancedLedger { total: String },

    /// Folding a fact pushed a balance past what `Money` can hold
    #[error("Amount overflow while applying {context}")]
    AmountOverflow { context: String },

    /// Person id already present in the roster
    #[error("Person '{person}' already exists")]
    DuplicatePerson { person: String },

    /// Failed to open, read or write a data file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid record in a data file
    #[error("Invalid record in {file} at row {row}: {message}")]
    InvalidRecord {
        file: String,
        row: usize,
        message: String,
    },
}

impl LedgerError {
    pub(crate) fn invalid_split(expense: &str, reason: impl Into<String>) -> Self {
        LedgerError::InvalidSplit {
            expense: expense.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_person(person: impl ToString, context: impl Into<String>) -> Self {
        LedgerError::UnknownPerson {
            person: person.to_string(),
            context: context.into(),
        }
    }
}
