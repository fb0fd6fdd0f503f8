//! # csvstream
//!
//! Streaming CSV parsing driven by an explicit, transition-validated state
//! machine.
//!
//! Input is consumed one character at a time and records stream out the
//! moment they complete, so memory usage stays constant regardless of input
//! size. Quoted fields may contain embedded commas, embedded newlines, and
//! escaped double-quotes (`""` for one literal `"`), and every record must
//! carry the same number of fields as the first.
//!
//! # Quick Start
//!
//! ```
//! use csvstream::CsvParser;
//!
//! let input = "name,location\nAlice,\"NYC, NY\"\nBob,SF\n";
//!
//! let mut parser = CsvParser::new().unwrap();
//! for record_result in parser.parse(input.as_bytes()) {
//!     let record = record_result.unwrap();
//!     println!("{:?}", record);
//! }
//!
//! assert_eq!(parser.record_count(), 3);
//! assert_eq!(parser.fields_per_record(), Some(2));
//! ```
//!
//! # Reading Files
//!
//! ```no_run
//! use csvstream::CsvReader;
//!
//! let mut reader = CsvReader::open("data.csv").unwrap().has_header(true);
//!
//! for record_result in reader.records() {
//!     let record = record_result.unwrap();
//!     // Process data records (header already consumed)
//! }
//! ```
//!
//! # Error Reporting
//!
//! Parse errors are fatal and position-aware: messages name the 1-based
//! field and record being assembled, e.g.
//! `unbalanced double-quotes -> field 3 of record 1`. Records yielded before
//! the error remain valid.
//!
//! # Modules
//!
//! - [`parser`] - the CSV parsing engine and its state set
//! - [`machine`] - generic state machine with validated transitions
//! - [`buffer`] - incremental field accumulation
//! - [`chars`] - character-at-a-time stream access
//! - [`reader`] - file-level convenience reader
//! - [`error`] - error taxonomy

pub mod buffer;
pub mod chars;
pub mod error;
pub mod machine;
pub mod parser;
pub mod reader;

pub use buffer::FieldBuffer;
pub use chars::CharSource;
pub use error::{CsvParseError, Result, StateMachineError};
pub use machine::{MachineState, StateMachine, TransitionHook};
pub use parser::{CsvParser, CsvState, Records};
pub use reader::{CsvReader, CsvRecordIterator};
