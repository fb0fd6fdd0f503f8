//! Incremental accumulation buffer for field contents

use std::fmt;

/// Incrementally builds the field currently being parsed.
///
/// Contents accumulate until [`clear`](FieldBuffer::clear); clearing empties
/// the buffer logically but keeps the backing allocation, so steady-state
/// parsing does not reallocate per field. The allocation is released when
/// the buffer is dropped, on every exit path.
///
/// # Examples
///
/// ```
/// use csvstream::FieldBuffer;
///
/// let mut buffer = FieldBuffer::new();
/// buffer.append("a string").push(' ').append("and another");
/// assert_eq!(buffer.build(), "a string and another");
///
/// buffer.clear();
/// assert_eq!(buffer.len(), 0);
/// ```
#[derive(Debug, Default)]
pub struct FieldBuffer {
    buf: String,
    chars: usize,
}

impl FieldBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with pre-sized backing storage
    pub fn with_capacity(capacity: usize) -> Self {
        FieldBuffer {
            buf: String::with_capacity(capacity),
            chars: 0,
        }
    }

    /// Append a single character, returning self for chaining
    pub fn push(&mut self, ch: char) -> &mut Self {
        self.buf.push(ch);
        self.chars += 1;
        self
    }

    /// Append a string, returning self for chaining
    pub fn append(&mut self, text: &str) -> &mut Self {
        self.buf.push_str(text);
        self.chars += text.chars().count();
        self
    }

    /// Number of characters accumulated since the last clear
    pub fn len(&self) -> usize {
        self.chars
    }

    /// True if nothing has been accumulated since the last clear
    pub fn is_empty(&self) -> bool {
        self.chars == 0
    }

    /// Forget the accumulated content, retaining the allocation
    pub fn clear(&mut self) -> &mut Self {
        self.buf.clear();
        self.chars = 0;
        self
    }

    /// Materialize the accumulated content without mutating the buffer
    pub fn build(&self) -> String {
        self.buf.clone()
    }
}

impl fmt::Display for FieldBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_chain() {
        let mut buffer = FieldBuffer::new();
        buffer.append("one").push(',').append("two");
        assert_eq!(buffer.build(), "one,two");
        assert_eq!(buffer.len(), 7);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let mut buffer = FieldBuffer::new();
        buffer.append("héllo");
        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn build_does_not_consume() {
        let mut buffer = FieldBuffer::new();
        buffer.append("abc");
        assert_eq!(buffer.build(), "abc");
        assert_eq!(buffer.build(), "abc");
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn clear_empties_but_keeps_capacity() {
        let mut buffer = FieldBuffer::with_capacity(64);
        buffer.append("some field content");
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.build(), "");
        assert!(buffer.buf.capacity() >= 64);
    }

    #[test]
    fn displays_current_content() {
        let mut buffer = FieldBuffer::new();
        buffer.append("visible");
        assert_eq!(buffer.to_string(), "visible");
    }
}
