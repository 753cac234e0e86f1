//! Mutable position tracking over an immutable source buffer.
//!
//! Grounded on the teacher's `bytes_already_parsed` offset tracking in
//! `tag_processor.rs`, generalized to codepoint-aware line/column
//! bookkeeping: the source buffer there is a byte string (PHP has no
//! notion of codepoints), ours is a `Vec<char>` because the spec's
//! `SourcePosition.column` is a codepoint column.

use std::rc::Rc;

/// A 0-based offset / 1-based line+column triple. `offset` indexes
/// codepoints into the original source, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourcePosition {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl SourcePosition {
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

/// Replays the line/column bookkeeping `Cursor::advance` does, starting from
/// an arbitrary position, over an arbitrary string. Used to locate positions
/// inside already-extracted text (trimmed interpolation content, attribute
/// names) without re-walking the whole buffer through a second `Cursor`.
pub fn advance_position(mut pos: SourcePosition, text: &str) -> SourcePosition {
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                pos.line += 1;
                pos.column = 1;
            }
            '\n' => {
                pos.line += 1;
                pos.column = 1;
            }
            _ => pos.column += 1,
        }
        pos.offset += 1;
    }
    pos
}

/// A span between two `SourcePosition`s plus the literal substring it
/// covers, shared from the original buffer so cloning a location is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub start: SourcePosition,
    pub end: SourcePosition,
    pub source: Rc<str>,
}

impl SourceLocation {
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }
}

/// Mutable cursor over the codepoints of a template source buffer.
///
/// Owns the full codepoint vector (so indexing is O(1) instead of walking
/// UTF-8 byte boundaries on every `peek_at`) and the current position. Never
/// yields a negative advance: `advance` can only move the cursor forward.
pub struct Cursor {
    chars: Rc<[char]>,
    source: Rc<str>,
    pos: SourcePosition,
}

impl Cursor {
    pub fn new(source: &str) -> Self {
        let chars: Rc<[char]> = source.chars().collect::<Vec<_>>().into();
        Self {
            chars,
            source: Rc::from(source),
            pos: SourcePosition::start(),
        }
    }

    pub fn snapshot(&self) -> SourcePosition {
        self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.pos.offset >= self.chars.len()
    }

    pub fn remaining_len(&self) -> usize {
        self.chars.len() - self.pos.offset
    }

    pub fn peek_at(&self, i: usize) -> Option<char> {
        self.chars.get(self.pos.offset + i).copied()
    }

    pub fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    pub fn rest(&self) -> &[char] {
        &self.chars[self.pos.offset..]
    }

    pub fn starts_with(&self, s: &str) -> bool {
        let mut chars = s.chars();
        let n = chars.clone().count();
        if self.remaining_len() < n {
            return false;
        }
        self.rest()[..n].iter().copied().eq(chars.by_ref())
    }

    /// Case-insensitive ASCII `starts_with`, used for tag-name matching.
    pub fn starts_with_ignore_ascii_case(&self, s: &str) -> bool {
        let n = s.chars().count();
        if self.remaining_len() < n {
            return false;
        }
        self.rest()[..n]
            .iter()
            .zip(s.chars())
            .all(|(a, b)| a.eq_ignore_ascii_case(&b))
    }

    /// Advances `n` codepoints from the head of the remaining source,
    /// updating offset/line/column bookkeeping. CRLF counts as a single
    /// line break; a lone `\r` or `\n` each count as one.
    pub fn advance(&mut self, n: usize) {
        let n = n.min(self.remaining_len());
        let mut i = 0;
        while i < n {
            let c = self.chars[self.pos.offset + i];
            i += 1;
            match c {
                '\r' => {
                    // Peek ahead without re-entering advance: CRLF is one break.
                    if self.chars.get(self.pos.offset + i) == Some(&'\n') {
                        i += 1;
                    }
                    self.pos.line += 1;
                    self.pos.column = 1;
                }
                '\n' => {
                    self.pos.line += 1;
                    self.pos.column = 1;
                }
                _ => {
                    self.pos.column += 1;
                }
            }
        }
        self.pos.offset += i;
    }

    pub fn advance_one(&mut self) {
        self.advance(1);
    }

    /// Consumes runs of `\t \r \n \x0c space`.
    pub fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some('\t' | '\r' | '\n' | '\x0c' | ' ')) {
            self.advance_one();
        }
    }

    /// Number of whitespace codepoints (`\t \r \n \x0c space`) at the head,
    /// and the first non-whitespace codepoint past them, without consuming.
    pub fn peek_past_whitespace(&self) -> (usize, Option<char>) {
        let mut n = 0;
        while matches!(self.peek_at(n), Some('\t' | '\r' | '\n' | '\x0c' | ' ')) {
            n += 1;
        }
        (n, self.peek_at(n))
    }

    /// Rewinds the cursor to a previously captured position. Used by the
    /// parser to back out of a failed speculative parse (e.g. an
    /// interpolation with no closing delimiter); never used to move forward.
    pub fn reset_to(&mut self, pos: SourcePosition) {
        debug_assert!(pos.offset <= self.pos.offset);
        self.pos = pos;
    }

    /// Builds a location from `start` to the current position (or `end` if
    /// given), with `source` as the literal substring between them.
    pub fn selection(&self, start: SourcePosition, end: Option<SourcePosition>) -> SourceLocation {
        let end = end.unwrap_or(self.pos);
        let text: String = self.chars[start.offset..end.offset].iter().collect();
        SourceLocation {
            start,
            end,
            source: Rc::from(text.as_str()),
        }
    }

    pub fn source(&self) -> &Rc<str> {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_tracks_lines_and_columns() {
        let mut c = Cursor::new("ab\ncd\r\nef\rgh");
        c.advance(2); // "ab"
        assert_eq!(c.snapshot(), SourcePosition { offset: 2, line: 1, column: 3 });
        c.advance(1); // "\n"
        assert_eq!(c.snapshot(), SourcePosition { offset: 3, line: 2, column: 1 });
        c.advance(2); // "cd"
        assert_eq!(c.snapshot(), SourcePosition { offset: 5, line: 2, column: 3 });
        c.advance(1); // "\r\n" counts as one break
        assert_eq!(c.snapshot(), SourcePosition { offset: 7, line: 3, column: 1 });
        c.advance(2); // "ef"
        assert_eq!(c.snapshot(), SourcePosition { offset: 9, line: 3, column: 3 });
        c.advance(1); // "\r" alone
        assert_eq!(c.snapshot(), SourcePosition { offset: 10, line: 4, column: 1 });
    }

    #[test]
    fn starts_with_and_peek() {
        let c = Cursor::new("{{ foo }}");
        assert!(c.starts_with("{{"));
        assert!(!c.starts_with("}}"));
        assert_eq!(c.peek_at(2), Some(' '));
    }

    #[test]
    fn selection_source_round_trips() {
        let mut c = Cursor::new("hello world");
        let start = c.snapshot();
        c.advance(5);
        let loc = c.selection(start, None);
        assert_eq!(loc.source.as_ref(), "hello");
        assert_eq!(loc.start.offset, 0);
        assert_eq!(loc.end.offset, 5);
    }

    #[quickcheck_macros::quickcheck]
    fn advancing_by_the_selection_reaches_the_end(s: String) -> bool {
        if s.is_empty() {
            return true;
        }
        let mut c = Cursor::new(&s);
        let start = c.snapshot();
        let n = s.chars().count();
        c.advance(n);
        let end = c.snapshot();
        let loc = c.selection(start, Some(end));
        loc.source.chars().count() == n && end.offset - start.offset == n
    }
}
