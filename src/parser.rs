//! Streaming CSV parsing driven by an explicit state machine
//!
//! The parser consumes input one character at a time and resolves the
//! double-quote escape ambiguity with a per-field quote counter: the parity
//! of quotes seen so far is the single source of truth for whether the
//! parser is still logically inside quotes. Records stream out as soon as
//! they complete, so memory usage is bounded by the largest single record.

use crate::buffer::FieldBuffer;
use crate::chars::CharSource;
use crate::error::{CsvParseError, Result};
use crate::machine::{MachineState, StateMachine};
use std::io::BufRead;

/// States the CSV parser moves between while consuming input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CsvState {
    /// No input consumed yet
    Begin,
    /// Accumulating the characters of a field
    InField,
    /// The previous character was a double-quote inside a quoted field
    QuoteInField,
    /// A field delimiter was just consumed
    EndOfField,
    /// A record delimiter was just consumed
    EndOfRecord,
    /// Input exhausted; terminal
    End,
}

impl MachineState for CsvState {
    fn states() -> &'static [Self] {
        &[
            CsvState::Begin,
            CsvState::InField,
            CsvState::QuoteInField,
            CsvState::EndOfField,
            CsvState::EndOfRecord,
            CsvState::End,
        ]
    }

    fn name(&self) -> &'static str {
        match self {
            CsvState::Begin => "Begin",
            CsvState::InField => "InField",
            CsvState::QuoteInField => "QuoteInField",
            CsvState::EndOfField => "EndOfField",
            CsvState::EndOfRecord => "EndOfRecord",
            CsvState::End => "End",
        }
    }
}

/// Streaming CSV parser
///
/// Parses character-oriented input into records of fields. A field may
/// contain embedded commas and embedded newlines when it is surrounded by
/// double-quotes, and a literal double-quote inside a quoted field is
/// escaped by doubling it. Every record must carry the same number of
/// fields as the first record.
///
/// Records are yielded as they complete; the parser never holds more than
/// one record's fields at a time. After a successful parse the machine rests
/// in [`CsvState::End`]; call [`reset`](CsvParser::reset) before parsing a
/// new stream with the same instance.
///
/// # Examples
///
/// ```
/// use csvstream::CsvParser;
///
/// let mut parser = CsvParser::new().unwrap();
/// let input = "name,location\nAlice,\"NYC, NY\"\n";
///
/// let records: Vec<Vec<String>> = parser
///     .parse(input.as_bytes())
///     .collect::<csvstream::Result<_>>()
///     .unwrap();
///
/// assert_eq!(records[1], vec!["Alice", "NYC, NY"]);
/// assert_eq!(parser.record_count(), 2);
/// assert_eq!(parser.fields_per_record(), Some(2));
/// ```
pub struct CsvParser {
    // Machine and field assembly
    machine: StateMachine<CsvState>,
    buffer: FieldBuffer,
    fields: Vec<String>,

    // Bookkeeping
    fields_per_record: Option<usize>,
    doublequotes_in_field: usize,
    records_parsed: u64,
    failed: bool,
}

impl CsvParser {
    /// Create a parser in the [`CsvState::Begin`] state
    pub fn new() -> Result<Self> {
        Ok(CsvParser {
            machine: StateMachine::new()?,
            buffer: FieldBuffer::with_capacity(1024),
            fields: Vec::new(),
            fields_per_record: None,
            doublequotes_in_field: 0,
            records_parsed: 0,
            failed: false,
        })
    }

    /// Parse the given CSV input into a lazy sequence of records.
    ///
    /// The returned iterator yields each record as a freshly owned
    /// `Vec<String>` the moment it completes; no work happens beyond the
    /// most recently completed record until the next one is requested.
    /// On the first violation the iterator yields the error and terminates.
    ///
    /// A final line without a trailing newline still produces a record, and
    /// empty input produces a single record holding one empty field.
    ///
    /// # Examples
    ///
    /// ```
    /// use csvstream::CsvParser;
    ///
    /// let mut parser = CsvParser::new().unwrap();
    /// let mut records = parser.parse("a,\"He said \"\"hi\"\"\"\n".as_bytes());
    ///
    /// let record = records.next().unwrap().unwrap();
    /// assert_eq!(record, vec!["a", "He said \"hi\""]);
    /// ```
    pub fn parse<R: BufRead>(&mut self, read_from: R) -> Records<'_, R> {
        Records {
            parser: self,
            source: CharSource::new(read_from),
            done: false,
        }
    }

    /// Advance through `source` until the next record completes.
    ///
    /// Returns `Ok(None)` once the input is exhausted (or after a previous
    /// error). This is the single-record primitive behind
    /// [`CsvParser::parse`] and [`CsvReader`](crate::reader::CsvReader).
    pub fn next_record<R: BufRead>(
        &mut self,
        source: &mut CharSource<R>,
    ) -> Result<Option<Vec<String>>> {
        if self.failed || self.machine.current_state() == CsvState::End {
            return Ok(None);
        }
        match self.advance(source) {
            Ok(record) => Ok(record),
            Err(e) => {
                self.failed = true;
                Err(e)
            }
        }
    }

    /// Restore the parser to [`CsvState::Begin`] for reuse on a new stream
    pub fn reset(&mut self) -> Result<()> {
        self.machine.reset()?;
        self.buffer.clear();
        self.fields.clear();
        self.fields_per_record = None;
        self.doublequotes_in_field = 0;
        self.records_parsed = 0;
        self.failed = false;
        Ok(())
    }

    /// Number of records completed so far
    pub fn record_count(&self) -> u64 {
        self.records_parsed
    }

    /// Field count fixed by the first record, once one has completed
    pub fn fields_per_record(&self) -> Option<usize> {
        self.fields_per_record
    }

    /// The state the parser's machine is currently in
    pub fn state(&self) -> CsvState {
        self.machine.current_state()
    }

    fn advance<R: BufRead>(&mut self, source: &mut CharSource<R>) -> Result<Option<Vec<String>>> {
        while let Some(read) = source.next() {
            let ch = read.map_err(|e| CsvParseError::Read(e.to_string()))?;
            if let Some(record) = self.step(ch)? {
                return Ok(Some(record));
            }
        }
        self.finish()
    }

    /// Feed one character through the machine, yielding a record when one
    /// completes.
    fn step(&mut self, ch: char) -> Result<Option<Vec<String>>> {
        match ch {
            '"' => self.process_doublequote().map(|_| None),
            _ => self.process_char(ch),
        }
    }

    /// Handle input exhaustion: a final line with no trailing newline still
    /// terminates its record, and the machine comes to rest in `End`.
    fn finish(&mut self) -> Result<Option<Vec<String>>> {
        let record = if self.machine.current_state() != CsvState::EndOfRecord {
            Some(self.end_record()?)
        } else {
            None
        };
        self.machine.transition(CsvState::End)?;
        log::debug!("parse complete after {} records", self.records_parsed);
        Ok(record)
    }

    /// True while the current field holds an odd number of double-quotes,
    /// meaning the parser is logically still inside quotes.
    fn has_unbalanced_doublequotes(&self) -> bool {
        self.doublequotes_in_field % 2 == 1
    }

    /// 1-based position of the field currently being assembled
    fn current_field(&self) -> usize {
        self.fields.len() + 1
    }

    /// 1-based number of the record currently being assembled
    fn current_record(&self) -> u64 {
        self.records_parsed + 1
    }

    fn process_doublequote(&mut self) -> Result<()> {
        match self.machine.current_state() {
            CsvState::Begin | CsvState::EndOfField | CsvState::EndOfRecord => {
                // A quote in these states opens a quoted field.
                self.doublequotes_in_field = 1;
                self.machine.transition(CsvState::InField)?;
            }
            CsvState::InField => {
                if self.doublequotes_in_field == 0 {
                    return Err(CsvParseError::UnexpectedDoubleQuote {
                        field: self.current_field(),
                        record: self.current_record(),
                    });
                }
                self.doublequotes_in_field += 1;
                self.machine.transition(CsvState::QuoteInField)?;
            }
            CsvState::QuoteInField => {
                self.doublequotes_in_field += 1;
                // Output cannot be deferred past a second quote: a run like
                // `," """""" ",` has to emit literal quotes as each pair
                // resolves.
                if self.has_unbalanced_doublequotes() {
                    self.buffer.push('"');
                }
                self.machine.transition(CsvState::InField)?;
            }
            other => {
                return Err(CsvParseError::UnexpectedState(other.name()));
            }
        }
        Ok(())
    }

    fn process_char(&mut self, ch: char) -> Result<Option<Vec<String>>> {
        let state = self.machine.current_state();
        if state == CsvState::QuoteInField && self.has_unbalanced_doublequotes() {
            // The most recent character was a double-quote whose output was
            // deferred; a following non-quote character means it was literal
            // content after all. Deferral is what keeps `...,"",...` an
            // empty field.
            self.buffer.push('"');
        }

        if ch == ',' {
            if !self.has_unbalanced_doublequotes() {
                self.end_field()?;
                return Ok(None);
            }
        } else if ch == '\n' {
            if self.has_unbalanced_doublequotes() {
                // Still inside quotes, which is what makes multi-line
                // fields possible.
                self.buffer.push(ch);
            } else {
                return self.end_record().map(Some);
            }
            return Ok(None);
        }

        if state == CsvState::QuoteInField && !self.has_unbalanced_doublequotes() {
            return Err(CsvParseError::UnexpectedCharacterAfterQuote {
                ch,
                field: self.current_field(),
                record: self.current_record(),
            });
        }

        if state != CsvState::InField {
            self.machine.transition(CsvState::InField)?;
        }
        self.buffer.push(ch);
        Ok(None)
    }

    /// Finish the field in progress and append it to the current record.
    fn end_field(&mut self) -> Result<()> {
        if self.doublequotes_in_field > 0 {
            if self.has_unbalanced_doublequotes() {
                return Err(CsvParseError::UnbalancedDoubleQuotes {
                    field: self.current_field(),
                    record: self.current_record(),
                });
            }
            if self.machine.current_state() != CsvState::QuoteInField {
                return Err(CsvParseError::MustEndWithDoubleQuote {
                    field: self.current_field(),
                    record: self.current_record(),
                });
            }
            self.doublequotes_in_field = 0;
        }
        self.fields.push(self.buffer.build());
        self.buffer.clear();
        self.machine.transition(CsvState::EndOfField)?;
        Ok(())
    }

    /// Finish the record in progress, handing ownership of its fields to the
    /// caller. The first completed record fixes the field count every later
    /// record must match.
    fn end_record(&mut self) -> Result<Vec<String>> {
        self.end_field()?;
        self.machine.transition(CsvState::EndOfRecord)?;
        self.records_parsed += 1;
        let record = std::mem::take(&mut self.fields);
        match self.fields_per_record {
            None => self.fields_per_record = Some(record.len()),
            Some(expected) if record.len() != expected => {
                return Err(CsvParseError::FieldCountMismatch {
                    record: self.records_parsed,
                    found: record.len(),
                    expected,
                });
            }
            Some(_) => {}
        }
        log::debug!(
            "record {} complete with {} fields",
            self.records_parsed,
            record.len()
        );
        Ok(record)
    }
}

/// Lazy iterator over parsed records
///
/// Yields `Result<Vec<String>>` in completion order. After yielding an error
/// the iterator is fused: every later call returns `None`. Dropping the
/// iterator abandons the parse wherever it stands, with no cleanup beyond
/// releasing the underlying source.
pub struct Records<'a, R: BufRead> {
    parser: &'a mut CsvParser,
    source: CharSource<R>,
    done: bool,
}

impl<R: BufRead> Iterator for Records<'_, R> {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.parser.next_record(&mut self.source) {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(input: &str) -> Result<Vec<Vec<String>>> {
        let mut parser = CsvParser::new().unwrap();
        parser.parse(input.as_bytes()).collect()
    }

    #[test]
    fn test_simple_records() {
        let records = parse_all("a,b,c\nd,e,f\n").unwrap();
        assert_eq!(records, vec![vec!["a", "b", "c"], vec!["d", "e", "f"]]);
    }

    #[test]
    fn test_fields_per_record_fixed_by_first_record() {
        let mut parser = CsvParser::new().unwrap();
        let records: Vec<_> = parser
            .parse("a,b,c\nd,e,f\n".as_bytes())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(parser.fields_per_record(), Some(3));
        assert_eq!(parser.record_count(), 2);
        assert_eq!(parser.state(), CsvState::End);
    }

    #[test]
    fn test_quoted_comma_is_literal() {
        let records = parse_all("a,\"b,c\",d\n").unwrap();
        assert_eq!(records, vec![vec!["a", "b,c", "d"]]);
    }

    #[test]
    fn test_quoted_newline_is_literal() {
        let records = parse_all("a,\"line1\nline2\",c\n").unwrap();
        assert_eq!(records, vec![vec!["a", "line1\nline2", "c"]]);
    }

    #[test]
    fn test_quoted_empty_field() {
        let records = parse_all("a,\"\",c\n").unwrap();
        assert_eq!(records, vec![vec!["a", "", "c"]]);
    }

    #[test]
    fn test_escaped_quotes() {
        let records = parse_all("a,\"He said \"\"hi\"\"\",c\n").unwrap();
        assert_eq!(records, vec![vec!["a", "He said \"hi\"", "c"]]);
    }

    #[test]
    fn test_field_count_mismatch() {
        let result = parse_all("a,b\nc,d,e\n");
        assert_eq!(
            result,
            Err(CsvParseError::FieldCountMismatch {
                record: 2,
                found: 3,
                expected: 2,
            })
        );
    }

    #[test]
    fn test_too_few_fields_also_mismatch() {
        let result = parse_all("a,b,c\nd\n");
        assert_eq!(
            result,
            Err(CsvParseError::FieldCountMismatch {
                record: 2,
                found: 1,
                expected: 3,
            })
        );
    }

    #[test]
    fn test_missing_trailing_newline_still_ends_record() {
        let records = parse_all("a,b\nc,d").unwrap();
        assert_eq!(records, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_empty_input_is_one_empty_field() {
        let records = parse_all("").unwrap();
        assert_eq!(records, vec![vec![""]]);
    }

    #[test]
    fn test_unquoted_empty_fields() {
        let records = parse_all(",,\n").unwrap();
        assert_eq!(records, vec![vec!["", "", ""]]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let records = parse_all("a,b\r\nc,d\r\n").unwrap();
        assert_eq!(records, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_run_of_quotes_resolves_pairwise() {
        // The middle field is ` """ `: three escape pairs between spaces.
        let records = parse_all("x,\" \"\"\"\"\"\" \",y\n").unwrap();
        assert_eq!(records, vec![vec!["x", " \"\"\" ", "y"]]);
    }

    #[test]
    fn test_literal_comma_after_escaped_quote() {
        let records = parse_all("\"a\"\",b\"\n").unwrap();
        assert_eq!(records, vec![vec!["a\",b"]]);
    }

    #[test]
    fn test_whole_field_is_one_escaped_quote() {
        let records = parse_all("a,\"\"\"\",c\n").unwrap();
        assert_eq!(records, vec![vec!["a", "\"", "c"]]);
    }

    #[test]
    fn test_unexpected_doublequote_in_unquoted_field() {
        let result = parse_all("ab\"cd\n");
        assert_eq!(
            result,
            Err(CsvParseError::UnexpectedDoubleQuote {
                field: 1,
                record: 1,
            })
        );
    }

    #[test]
    fn test_unbalanced_doublequotes() {
        let result = parse_all("a,\"bc\n");
        // The newline is inside quotes, so the failure surfaces at end of
        // input when the field can no longer close.
        assert_eq!(
            result,
            Err(CsvParseError::UnbalancedDoubleQuotes {
                field: 2,
                record: 1,
            })
        );
    }

    #[test]
    fn test_unexpected_character_after_closing_quote() {
        let result = parse_all("a,\"b\"x\n");
        assert_eq!(
            result,
            Err(CsvParseError::UnexpectedCharacterAfterQuote {
                ch: 'x',
                field: 2,
                record: 1,
            })
        );
    }

    #[test]
    fn test_errors_report_the_record_in_progress() {
        let result = parse_all("a\n\"b\"x\n");
        assert_eq!(
            result,
            Err(CsvParseError::UnexpectedCharacterAfterQuote {
                ch: 'x',
                field: 1,
                record: 2,
            })
        );
    }

    #[test]
    fn test_iterator_fuses_after_error() {
        let mut parser = CsvParser::new().unwrap();
        let mut records = parser.parse("a,b\nc,d,e\nf,g\n".as_bytes());
        assert!(records.next().unwrap().is_ok());
        assert!(records.next().unwrap().is_err());
        assert!(records.next().is_none());
        assert!(records.next().is_none());
    }

    #[test]
    fn test_records_before_error_remain_valid() {
        let mut parser = CsvParser::new().unwrap();
        let mut records = parser.parse("a,b\nc,d,e\n".as_bytes());
        let first = records.next().unwrap().unwrap();
        assert!(records.next().unwrap().is_err());
        assert_eq!(first, vec!["a", "b"]);
    }

    #[test]
    fn test_yielded_records_are_independent() {
        let mut parser = CsvParser::new().unwrap();
        let mut records = parser.parse("a,b\nc,d\n".as_bytes());
        let mut first = records.next().unwrap().unwrap();
        first[0] = "mutated".to_string();
        first.push("extra".to_string());
        let second = records.next().unwrap().unwrap();
        assert_eq!(second, vec!["c", "d"]);
    }

    #[test]
    fn test_caller_controls_pacing() {
        let mut parser = CsvParser::new().unwrap();
        {
            let mut records = parser.parse("a,b\nc,d\ne,f\n".as_bytes());
            records.next().unwrap().unwrap();
        }
        // Abandoned after one pull: nothing beyond the first record was
        // parsed.
        assert_eq!(parser.record_count(), 1);
    }

    #[test]
    fn test_reset_allows_reparsing() {
        let input = "a,b\nc,d\n";
        let mut parser = CsvParser::new().unwrap();
        let first: Vec<_> = parser
            .parse(input.as_bytes())
            .collect::<Result<_>>()
            .unwrap();

        parser.reset().unwrap();
        assert_eq!(parser.state(), CsvState::Begin);
        assert_eq!(parser.record_count(), 0);
        assert_eq!(parser.fields_per_record(), None);

        let second: Vec<_> = parser
            .parse(input.as_bytes())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset_clears_failure() {
        let mut parser = CsvParser::new().unwrap();
        assert!(parser.parse("a,b\nc\n".as_bytes()).collect::<Result<Vec<_>>>().is_err());
        parser.reset().unwrap();
        let records: Vec<_> = parser
            .parse("x,y\n".as_bytes())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records, vec![vec!["x", "y"]]);
    }

    #[test]
    fn test_single_column_records() {
        let records = parse_all("a\nb\nc\n").unwrap();
        assert_eq!(records, vec![vec!["a"], vec!["b"], vec!["c"]]);
    }

    #[test]
    fn test_comma_inside_unclosed_quote_stays_literal() {
        let records = parse_all("\",\",x\n").unwrap();
        assert_eq!(records, vec![vec![",", "x"]]);
    }
}
