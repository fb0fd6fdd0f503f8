//! CSV file reading with streaming record iteration

use crate::chars::CharSource;
use crate::error::{CsvParseError, Result};
use crate::parser::CsvParser;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// CSV file reader with streaming capabilities
///
/// Reads CSV files record by record using an iterator pattern. Because the
/// underlying parser tracks quoting through a state machine, a quoted field
/// may span physical lines; a record is therefore not necessarily one line.
/// Memory usage is bounded by the largest single record.
///
/// # Examples
///
/// ```no_run
/// use csvstream::CsvReader;
///
/// let mut reader = CsvReader::open("data.csv").unwrap();
///
/// for record_result in reader.records() {
///     let record = record_result.unwrap();
///     println!("{:?}", record);
/// }
/// ```
///
/// # With Headers
///
/// ```no_run
/// use csvstream::CsvReader;
///
/// let mut reader = CsvReader::open("data.csv")
///     .unwrap()
///     .has_header(true);
///
/// for record_result in reader.records() {
///     let record = record_result.unwrap();
///     // Process data records (header already consumed)
/// }
///
/// if let Some(headers) = reader.headers() {
///     println!("Headers: {:?}", headers);
/// }
/// ```
pub struct CsvReader {
    // Input source
    source: CharSource<BufReader<File>>,

    // Parser state
    parser: CsvParser,

    // Configuration
    has_header: bool,
    headers: Vec<String>,
}

impl CsvReader {
    /// Open a CSV file for streaming reads
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .map_err(|e| CsvParseError::Read(format!("Failed to open CSV file: {}", e)))?;

        Ok(CsvReader {
            source: CharSource::new(BufReader::new(file)),
            parser: CsvParser::new()?,
            has_header: false,
            headers: Vec::new(),
        })
    }

    /// Indicate that the first record contains headers (builder pattern)
    ///
    /// When set to `true`, the first record is stored and accessible via
    /// [`headers`](CsvReader::headers), and the [`records`](CsvReader::records)
    /// iterator skips it.
    pub fn has_header(mut self, has: bool) -> Self {
        self.has_header = has;
        self
    }

    /// Get the header record if one has been read
    pub fn headers(&self) -> Option<&[String]> {
        if self.headers.is_empty() {
            None
        } else {
            Some(&self.headers)
        }
    }

    /// Read a single record
    ///
    /// Returns `Ok(None)` when the input is exhausted. The header record,
    /// when configured, is returned like any other; only the iterator skips
    /// it.
    pub fn read_record(&mut self) -> Result<Option<Vec<String>>> {
        let record = self.parser.next_record(&mut self.source)?;
        if let Some(ref record) = record {
            if self.has_header && self.parser.record_count() == 1 {
                self.headers = record.clone();
            }
        }
        Ok(record)
    }

    /// Get an iterator over records
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use csvstream::CsvReader;
    ///
    /// let mut reader = CsvReader::open("data.csv").unwrap();
    ///
    /// for record_result in reader.records() {
    ///     let record = record_result.unwrap();
    ///     println!("{:?}", record);
    /// }
    /// ```
    pub fn records(&mut self) -> CsvRecordIterator<'_> {
        CsvRecordIterator { reader: self }
    }

    /// Number of records read so far (the header counts as a record)
    pub fn record_count(&self) -> u64 {
        self.parser.record_count()
    }

    /// Field count fixed by the first record, once one has been read
    pub fn fields_per_record(&self) -> Option<usize> {
        self.parser.fields_per_record()
    }
}

/// Iterator over CSV records
pub struct CsvRecordIterator<'a> {
    reader: &'a mut CsvReader,
}

impl Iterator for CsvRecordIterator<'_> {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record() {
            Ok(Some(record)) => {
                // Skip the header record on the first pull when configured.
                if self.reader.has_header && self.reader.record_count() == 1 {
                    match self.reader.read_record() {
                        Ok(Some(next_record)) => Some(Ok(next_record)),
                        Ok(None) => None,
                        Err(e) => Some(Err(e)),
                    }
                } else {
                    Some(Ok(record))
                }
            }
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
