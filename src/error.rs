//! Error types for the resolution engine.
//!
//! A query that finds no solution is not an error: it is reported as
//! [`Solutions::Failed`](crate::Solutions::Failed). The variants here cover
//! faults in how the knowledge base is being driven.

use thiserror::Error;

/// A specialized `Result` type for knowledge base operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Faults raised while building or querying a knowledge base.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A rule was queried that has never been learned.
    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    /// A declarative clause was invoked with the wrong number of arguments.
    #[error("Rule {rule} expects {expected} arguments, got {found}")]
    Arity {
        /// The rule whose clause rejected the call.
        rule: String,
        /// The arity the clause was declared with.
        expected: usize,
        /// The number of arguments actually supplied.
        found: usize,
    },

    /// A fact containing variables was offered for storage.
    #[error("Facts must be ground: {0}")]
    NonGroundFact(String),

    /// A rule head argument is not a plain parameter name.
    #[error("Invalid rule head: {0}")]
    InvalidRuleHead(String),

    /// The program text could not be parsed.
    #[error("Parse error at offset {offset}: {message}")]
    Parse {
        /// Byte offset into the source where parsing stopped.
        offset: usize,
        /// What the parser expected to find.
        message: String,
    },

    /// A clause body reported a failure of its own.
    #[error("Clause failed: {0}")]
    Clause(String),
}
