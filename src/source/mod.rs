//! Source text loading for the source pane.
//!
//! The engine owns a single source buffer at a time; lines are byte ranges
//! into it with their syntax tokens attached. Loading goes through the view
//! policy's path substitution before touching the filesystem.

use std::fs;

use crate::error::EngineError;
use crate::syntax::{Token, Tokenizer};

/// Files larger than this report `SourceUnavailable` instead of being read.
pub const MAX_SOURCE_SIZE: u64 = 32 * 1024 * 1024;

/// One source line: a half-open byte range into the owning buffer plus its
/// tokens in order.
#[derive(Debug, Clone)]
pub struct Line {
    pub begin: u32,
    pub end: u32,
    pub tokens: Vec<Token>,
}

/// An owned source buffer split into tokenized lines.
#[derive(Debug)]
pub struct SourceText {
    data: Vec<u8>,
    lines: Vec<Line>,
}

impl SourceText {
    /// Read and tokenize a file. `path` must already be substitution-resolved.
    pub fn load(path: &str) -> Result<Self, EngineError> {
        let unavailable = |reason: String| EngineError::SourceUnavailable {
            path: path.to_string(),
            reason,
        };
        let meta = fs::metadata(path).map_err(|e| unavailable(e.to_string()))?;
        if meta.len() > MAX_SOURCE_SIZE {
            return Err(unavailable(format!(
                "file is {} bytes, over the {} byte limit",
                meta.len(),
                MAX_SOURCE_SIZE
            )));
        }
        let data = fs::read(path).map_err(|e| unavailable(e.to_string()))?;
        Ok(Self::from_bytes(data))
    }

    /// Split a buffer into tokenized lines. Accepts `\n`, `\r`, and the
    /// two-byte pairs `\r\n` / `\n\r` as single terminators.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let mut lines = Vec::new();
        let mut tokenizer = Tokenizer::default();
        let len = data.len();
        let mut pos = 0usize;
        loop {
            let begin = pos;
            let mut end = begin;
            while end < len && data[end] != b'\n' && data[end] != b'\r' {
                end += 1;
            }
            let tokens = tokenizer.tokenize(&data, begin, end);
            lines.push(Line {
                begin: begin as u32,
                end: end as u32,
                tokens,
            });
            pos = end;
            if pos < len {
                let first = data[pos];
                pos += 1;
                let second = if first == b'\n' { b'\r' } else { b'\n' };
                if pos < len && data[pos] == second {
                    pos += 1;
                }
            }
            if pos >= len {
                break;
            }
        }
        Self { data, lines }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Text of a 1-based line number.
    pub fn line_text(&self, number: u32) -> &[u8] {
        let line = &self.lines[number as usize - 1];
        &self.data[line.begin as usize..line.end as usize]
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::TokenColor;

    #[test]
    fn splits_mixed_terminators() {
        let src = SourceText::from_bytes(b"one\ntwo\r\nthree\rfour".to_vec());
        let texts: Vec<&[u8]> = (1..=4).map(|n| src.line_text(n)).collect();
        assert_eq!(texts, [&b"one"[..], b"two", b"three", b"four"]);
    }

    #[test]
    fn trailing_newline_adds_no_empty_line() {
        let src = SourceText::from_bytes(b"only\n".to_vec());
        assert_eq!(src.lines().len(), 1);
    }

    #[test]
    fn empty_buffer_has_one_empty_line() {
        let src = SourceText::from_bytes(Vec::new());
        assert_eq!(src.lines().len(), 1);
        assert!(src.line_text(1).is_empty());
    }

    #[test]
    fn tokenizer_state_carries_across_lines() {
        let src = SourceText::from_bytes(b"int a; /* begin\nmiddle\nend */ int b;".to_vec());
        assert_eq!(src.lines().len(), 3);
        let mid = &src.lines()[1];
        assert_eq!(mid.tokens.len(), 1);
        assert_eq!(mid.tokens[0].color, TokenColor::Comment);
        let last = &src.lines()[2];
        assert!(last.tokens.iter().any(|t| t.color == TokenColor::Type));
    }

    #[test]
    fn reload_is_byte_identical() {
        let bytes = b"#define A \\\n  1\nint x = A;\n".to_vec();
        let a = SourceText::from_bytes(bytes.clone());
        let b = SourceText::from_bytes(bytes);
        assert_eq!(a.data(), b.data());
        assert_eq!(a.lines().len(), b.lines().len());
        for (la, lb) in a.lines().iter().zip(b.lines()) {
            assert_eq!(la.begin, lb.begin);
            assert_eq!(la.end, lb.end);
            assert_eq!(la.tokens, lb.tokens);
        }
    }

    #[test]
    fn missing_file_reports_source_unavailable() {
        let err = SourceText::load("/nonexistent/path/to/file.c").unwrap_err();
        assert!(matches!(err, EngineError::SourceUnavailable { .. }));
    }
}
