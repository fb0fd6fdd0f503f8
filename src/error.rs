//! Error types for state machine validation and CSV parsing

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, CsvParseError>;

/// Errors raised while declaring or driving a state machine
///
/// The configuration variants surface at construction time; `InvalidState`
/// surfaces when a transition targets a state outside the declared set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateMachineError {
    /// The machine declared an empty state set
    #[error("state machine declares no states")]
    NoStatesDeclared,

    /// The declared state set lists the same state twice
    #[error("state {0} is declared more than once")]
    DuplicateState(&'static str),

    /// The initial state is not a member of the declared state set
    #[error("initial state {0} is not in the declared state set")]
    InvalidInitialState(&'static str),

    /// A transition targeted a state outside the declared state set
    #[error("{0} is not a declared state of this machine")]
    InvalidState(&'static str),
}

/// Errors raised while parsing CSV input
///
/// Every parse error is fatal: the record iterator yields the error once and
/// then terminates. Positions are 1-based and name the field and record
/// being assembled when the problem was found.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CsvParseError {
    /// A double-quote appeared inside a field that did not open with one
    #[error("unexpected double-quote in an unquoted field -> field {field} of record {record}")]
    UnexpectedDoubleQuote { field: usize, record: u64 },

    /// A field ended with an odd number of double-quotes
    #[error("unbalanced double-quotes -> field {field} of record {record}")]
    UnbalancedDoubleQuotes { field: usize, record: u64 },

    /// A field that used quoting did not close with a double-quote
    #[error("quoted field must end with a double-quote -> field {field} of record {record}")]
    MustEndWithDoubleQuote { field: usize, record: u64 },

    /// Something other than a delimiter followed a closing double-quote
    #[error("unexpected character {ch:?} after a closing double-quote -> field {field} of record {record}")]
    UnexpectedCharacterAfterQuote {
        ch: char,
        field: usize,
        record: u64,
    },

    /// A record's field count differs from the count fixed by the first record
    #[error("Record {record} has {found} fields but should have {expected}")]
    FieldCountMismatch {
        record: u64,
        found: usize,
        expected: usize,
    },

    /// The engine reached a state its dispatch logic should never see
    #[error("unexpected state {0}")]
    UnexpectedState(&'static str),

    /// The underlying character stream failed
    #[error("failed to read CSV input: {0}")]
    Read(String),

    /// The parser's internal state machine rejected a transition
    #[error(transparent)]
    Machine(#[from] StateMachineError),
}
