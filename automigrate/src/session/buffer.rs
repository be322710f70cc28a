//! Sliding output window with ANSI stripping.
//!
//! The migration tool renders its prompts through a colorized terminal UI,
//! so escape sequences are stripped before pattern search. The parser state
//! persists across reads because a sequence can be split between chunks.
//!
//! Only the last `search_depth` bytes are retained: prompts always sit at
//! the end of the stream, and trimming keeps memory O(search_depth) rather
//! than O(output_size).

use bytes::{Buf, BytesMut};
use vte::{Parser, Perform};

/// Default number of bytes retained for pattern search.
pub const DEFAULT_SEARCH_DEPTH: usize = 4096;

/// Buffer accumulating ANSI-stripped child output for pattern search.
pub struct OutputBuffer {
    /// The retained tail of the stripped output.
    window: BytesMut,

    /// Escape-sequence parser state, carried across chunks.
    parser: Parser,

    /// How many bytes to keep after a trim.
    search_depth: usize,
}

impl OutputBuffer {
    /// Create a buffer retaining `search_depth` bytes of stripped output.
    pub fn new(search_depth: usize) -> Self {
        Self {
            window: BytesMut::with_capacity(search_depth * 2),
            parser: Parser::new(),
            search_depth,
        }
    }

    /// Append a raw chunk, stripping ANSI escape sequences.
    pub fn push(&mut self, raw: &[u8]) {
        let mut plain = Vec::with_capacity(raw.len());
        let mut stripper = AnsiStripper { out: &mut plain };
        self.parser.advance(&mut stripper, raw);
        self.window.extend_from_slice(&plain);
    }

    /// The stripped output currently available for search.
    pub fn as_slice(&self) -> &[u8] {
        &self.window
    }

    /// Drop the first `n` bytes (everything through a consumed match).
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.window.len());
        self.window.advance(n);
    }

    /// Trim the window down to the last `search_depth` bytes.
    ///
    /// Called after an unsuccessful search; a match can never start in
    /// bytes older than the retained tail once new data keeps arriving.
    pub fn trim(&mut self) {
        if self.window.len() > self.search_depth {
            let excess = self.window.len() - self.search_depth;
            self.window.advance(excess);
        }
    }

    /// Current window length.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Check if the window is empty.
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEPTH)
    }
}

/// `vte::Perform` sink that keeps printable text and line controls.
struct AnsiStripper<'a> {
    out: &'a mut Vec<u8>,
}

impl Perform for AnsiStripper<'_> {
    fn print(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        // Keep the controls that shape lines; everything else is cursor
        // movement or bell noise the matcher must not see.
        if matches!(byte, b'\n' | b'\r' | b'\t') {
            self.out.push(byte);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_through() {
        let mut buffer = OutputBuffer::new(100);
        buffer.push(b"table created or renamed\n");
        assert_eq!(buffer.as_slice(), b"table created or renamed\n");
    }

    #[test]
    fn test_ansi_color_stripped() {
        let mut buffer = OutputBuffer::new(100);
        buffer.push(b"\x1b[32mgreen\x1b[0m text");
        assert_eq!(buffer.as_slice(), b"green text");
    }

    #[test]
    fn test_escape_split_across_chunks() {
        let mut buffer = OutputBuffer::new(100);

        // The CSI sequence \x1b[1m arrives split between two reads.
        buffer.push(b"bold: \x1b[");
        buffer.push(b"1myes\x1b[0m");
        assert_eq!(buffer.as_slice(), b"bold: yes");
    }

    #[test]
    fn test_consume_drops_prefix() {
        let mut buffer = OutputBuffer::new(100);
        buffer.push(b"prompt one\nprompt two\n");
        buffer.consume(11);
        assert_eq!(buffer.as_slice(), b"prompt two\n");
        assert!(!buffer.is_empty());
    }

    #[test]
    fn test_trim_keeps_tail() {
        let mut buffer = OutputBuffer::new(8);
        buffer.push(b"0123456789abcdef");
        buffer.trim();
        assert_eq!(buffer.len(), 8);
        assert_eq!(buffer.as_slice(), b"89abcdef");
    }

    #[test]
    fn test_cursor_noise_dropped() {
        let mut buffer = OutputBuffer::new(100);
        // Cursor-up plus erase-line, as interactive prompt UIs redraw.
        buffer.push(b"pick one\x1b[1A\x1b[2K> option\r\n");
        assert_eq!(buffer.as_slice(), b"pick one> option\r\n");
    }
}
