//! Character-at-a-time access to a text stream

use std::io::{self, BufRead};

/// Forward-only iterator of characters pulled from a buffered reader.
///
/// Characters are produced lazily, refilling one line-sized chunk at a time,
/// and the iterator exhausts cleanly at end of stream with no sentinel value.
/// Line endings are translated the way a text-mode stream would translate
/// them: `\r\n` and a bare `\r` are both delivered as a single `\n`.
///
/// A source cannot be rewound; parsing the same input again requires a fresh
/// reader.
///
/// # Examples
///
/// ```
/// use csvstream::CharSource;
///
/// let source = CharSource::new("ab\r\nc".as_bytes());
/// let chars: Vec<char> = source.map(|c| c.unwrap()).collect();
/// assert_eq!(chars, vec!['a', 'b', '\n', 'c']);
/// ```
pub struct CharSource<R: BufRead> {
    reader: R,
    chunk: String,
    pos: usize,
}

impl<R: BufRead> CharSource<R> {
    /// Wrap a buffered reader
    pub fn new(reader: R) -> Self {
        CharSource {
            reader,
            chunk: String::with_capacity(1024),
            pos: 0,
        }
    }

    /// Pull the next chunk of input. Returns false at end of stream.
    fn refill(&mut self) -> io::Result<bool> {
        self.chunk.clear();
        self.pos = 0;
        let bytes_read = self.reader.read_line(&mut self.chunk)?;
        Ok(bytes_read > 0)
    }
}

impl<R: BufRead> Iterator for CharSource<R> {
    type Item = io::Result<char>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.chunk.len() {
            match self.refill() {
                Ok(true) => {}
                Ok(false) => return None,
                Err(e) => return Some(Err(e)),
            }
        }

        let ch = self.chunk[self.pos..].chars().next()?;
        self.pos += ch.len_utf8();
        if ch == '\r' {
            // read_line never splits \r\n across chunks, so a lookahead
            // within the current chunk is enough.
            if self.chunk[self.pos..].starts_with('\n') {
                self.pos += 1;
            }
            return Some(Ok('\n'));
        }
        Some(Ok(ch))
    }
}
