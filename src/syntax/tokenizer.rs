//! Restartable per-line tokenizer for C/C++-like source.
//!
//! The tokenizer never fails: malformed input still produces tokens that
//! cover the line. Two flags carry state across lines (an open `/* */`
//! comment and a `\`-continued preprocessor directive), so callers feed
//! lines in order and keep the same `Tokenizer` for the whole file.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Identifiers longer than this are never keywords/types/specials and skip
/// the set lookup entirely.
const MAX_CLASSIFIED_IDENT: usize = 24;

/// Syntax class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenColor {
    Default,
    Comment,
    Preprocessor,
    String,
    CharLiteral,
    Keyword,
    Number,
    Punctuation,
    Type,
    Special,
}

/// A classified byte range. Offsets are absolute into the source buffer the
/// line was taken from; ranges of one line never overlap and stay inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub begin: u32,
    pub end: u32,
    pub color: TokenColor,
}

/// Cross-line tokenizer state.
#[derive(Debug, Default)]
pub struct Tokenizer {
    pub in_block_comment: bool,
    pub in_preprocessor: bool,
}

static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "alignas", "alignof", "and", "and_eq", "asm", "atomic_cancel", "atomic_commit",
        "atomic_noexcept", "bitand", "bitor", "break", "case", "catch", "class", "compl",
        "concept", "const", "consteval", "constexpr", "constinit", "const_cast", "continue",
        "co_await", "co_return", "co_yield", "decltype", "default", "delete", "do",
        "dynamic_cast", "else", "enum", "explicit", "export", "extern", "for", "friend", "if",
        "inline", "mutable", "namespace", "new", "noexcept", "not", "not_eq", "operator", "or",
        "or_eq", "private", "protected", "public", "reflexpr", "register", "reinterpret_cast",
        "return", "requires", "sizeof", "static", "static_assert", "static_cast", "struct",
        "switch", "synchronized", "template", "thread_local", "throw", "try", "typedef",
        "typeid", "typename", "union", "using", "virtual", "volatile", "while", "xor", "xor_eq",
        "override", "final", "import", "module", "transaction_safe", "transaction_safe_dynamic",
    ]
    .into_iter()
    .collect()
});

static TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "bool", "char", "char8_t", "char16_t", "char32_t", "double", "float", "int", "long",
        "short", "signed", "unsigned", "void", "wchar_t", "size_t", "int8_t", "int16_t",
        "int32_t", "int64_t", "int_fast8_t", "int_fast16_t", "int_fast32_t", "int_fast64_t",
        "int_least8_t", "int_least16_t", "int_least32_t", "int_least64_t", "intmax_t",
        "intptr_t", "uint8_t", "uint16_t", "uint32_t", "uint64_t", "uint_fast8_t",
        "uint_fast16_t", "uint_fast32_t", "uint_fast64_t", "uint_least8_t", "uint_least16_t",
        "uint_least32_t", "uint_least64_t", "uintmax_t", "uintptr_t", "type_info",
        "bad_typeid", "bad_cast", "type_index", "clock_t", "time_t", "tm", "timespec",
        "ptrdiff_t", "nullptr_t", "max_align_t", "auto",
        "__m64", "__m128", "__m128i", "__m128d", "__m256", "__m256i", "__m256d", "__m512",
        "__m512i", "__m512d", "__mmask8", "__mmask16", "__mmask32", "__mmask64",
        "int8x8_t", "int16x4_t", "int32x2_t", "int64x1_t", "uint8x8_t", "uint16x4_t",
        "uint32x2_t", "uint64x1_t", "float32x2_t", "poly8x8_t", "poly16x4_t", "int8x16_t",
        "int16x8_t", "int32x4_t", "int64x2_t", "uint8x16_t", "uint16x8_t", "uint32x4_t",
        "uint64x2_t", "float32x4_t", "poly8x16_t", "poly16x8_t",
    ]
    .into_iter()
    .collect()
});

static SPECIAL: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["this", "nullptr", "true", "false", "goto", "NULL"]
        .into_iter()
        .collect()
});

fn is_punctuation(c: u8) -> bool {
    matches!(
        c,
        b'[' | b']'
            | b'{'
            | b'}'
            | b'!'
            | b'%'
            | b'^'
            | b'&'
            | b'*'
            | b'('
            | b')'
            | b'-'
            | b'+'
            | b'='
            | b'~'
            | b'|'
            | b'<'
            | b'>'
            | b'?'
            | b':'
            | b'/'
            | b';'
            | b','
            | b'.'
    )
}

fn is_hex_digit(c: u8) -> bool {
    c.is_ascii_digit() || (b'a'..=b'f').contains(&c) || (b'A'..=b'F').contains(&c)
}

/// Consume a numeric literal starting at `*pos`. Accepts decimal, hex,
/// binary and floating forms (exponents, `'` digit separators, width and
/// float suffixes). Returns false without a defined `*pos` on non-numbers;
/// callers must restore the position themselves.
fn scan_number(line: &[u8], pos: &mut usize) -> bool {
    let start_num = line[*pos].is_ascii_digit();
    if line[*pos] != b'+' && line[*pos] != b'-' && !start_num {
        return false;
    }
    *pos += 1;
    let mut has_num = start_num;
    while *pos < line.len() && (line[*pos].is_ascii_digit() || line[*pos] == b'\'') {
        has_num = true;
        *pos += 1;
    }
    if !has_num {
        return false;
    }
    let mut is_float = false;
    let mut is_binary = false;
    if *pos < line.len() {
        match line[*pos] {
            b'.' => {
                is_float = true;
                *pos += 1;
                while *pos < line.len() && (line[*pos].is_ascii_digit() || line[*pos] == b'\'') {
                    *pos += 1;
                }
            }
            b'x' | b'X' => {
                *pos += 1;
                while *pos < line.len() && (is_hex_digit(line[*pos]) || line[*pos] == b'\'') {
                    *pos += 1;
                }
            }
            b'b' | b'B' => {
                is_binary = true;
                *pos += 1;
                while *pos < line.len()
                    && (line[*pos] == b'0' || line[*pos] == b'1' || line[*pos] == b'\'')
                {
                    *pos += 1;
                }
            }
            _ => {}
        }
    }
    if !is_binary {
        if *pos < line.len() && matches!(line[*pos], b'e' | b'E' | b'p' | b'P') {
            is_float = true;
            *pos += 1;
            if *pos < line.len() && (line[*pos] == b'+' || line[*pos] == b'-') {
                *pos += 1;
            }
            let mut has_digits = false;
            while *pos < line.len() && (is_hex_digit(line[*pos]) || line[*pos] == b'\'') {
                has_digits = true;
                *pos += 1;
            }
            if !has_digits {
                return false;
            }
        }
        if *pos < line.len() && matches!(line[*pos], b'f' | b'F' | b'l' | b'L') {
            *pos += 1;
        }
    }
    if !is_float {
        while *pos < line.len() && matches!(line[*pos], b'u' | b'U' | b'l' | b'L') {
            *pos += 1;
        }
    }
    true
}

impl Tokenizer {
    /// Clear carry state before tokenizing a new file.
    pub fn reset(&mut self) {
        self.in_block_comment = false;
        self.in_preprocessor = false;
    }

    /// Tokenize one line, `src[line_begin..line_end]` (no terminator).
    /// Token offsets are absolute into `src`.
    pub fn tokenize(&mut self, src: &[u8], line_begin: usize, line_end: usize) -> Vec<Token> {
        let line = &src[line_begin..line_end];
        let mut ret = Vec::new();
        let token = |begin: usize, end: usize, color: TokenColor| Token {
            begin: (line_begin + begin) as u32,
            end: (line_begin + end) as u32,
            color,
        };

        if self.in_preprocessor {
            if line.is_empty() {
                self.in_preprocessor = false;
                return ret;
            }
            if line[line.len() - 1] != b'\\' {
                self.in_preprocessor = false;
            }
            ret.push(token(0, line.len(), TokenColor::Preprocessor));
            return ret;
        }

        let started_in_comment = self.in_block_comment;
        let mut pos = 0usize;
        while pos < line.len() {
            if self.in_block_comment {
                let start = pos;
                loop {
                    while pos < line.len() && line[pos] != b'*' {
                        pos += 1;
                    }
                    if pos == line.len() {
                        ret.push(token(start, line.len(), TokenColor::Comment));
                        return ret;
                    }
                    pos += 1;
                    if pos < line.len() && line[pos] == b'/' {
                        pos += 1;
                        ret.push(token(start, pos, TokenColor::Comment));
                        self.in_block_comment = false;
                        break;
                    }
                }
            } else {
                while pos < line.len() && line[pos].is_ascii_whitespace() {
                    pos += 1;
                }
                if pos == line.len() {
                    break;
                }
                if !started_in_comment && ret.is_empty() && line[pos] == b'#' {
                    if line[line.len() - 1] == b'\\' {
                        self.in_preprocessor = true;
                    }
                    ret.push(token(pos, line.len(), TokenColor::Preprocessor));
                    return ret;
                }
                let start = pos;
                let color = self.identify(line, &mut pos);
                ret.push(token(start, pos, color));
            }
        }
        ret
    }

    /// Classify and consume one token at `*pos`. Always advances.
    fn identify(&mut self, line: &[u8], pos: &mut usize) -> TokenColor {
        let c = line[*pos];
        if c == b'"' {
            *pos += 1;
            while *pos < line.len() {
                if line[*pos] == b'"' {
                    *pos += 1;
                    break;
                }
                // an escaped quote consumes two bytes
                let escaped =
                    line[*pos] == b'\\' && *pos + 1 < line.len() && line[*pos + 1] == b'"';
                *pos += 1 + escaped as usize;
            }
            return TokenColor::String;
        }
        if c == b'\'' {
            *pos += 1;
            if *pos < line.len() && line[*pos] == b'\\' {
                *pos += 1;
            }
            if *pos < line.len() {
                *pos += 1;
            }
            if *pos < line.len() && line[*pos] == b'\'' {
                *pos += 1;
            }
            return TokenColor::CharLiteral;
        }
        if c.is_ascii_alphabetic() || c == b'_' {
            let start = *pos;
            *pos += 1;
            while *pos < line.len()
                && (line[*pos].is_ascii_alphanumeric() || line[*pos] == b'_')
            {
                *pos += 1;
            }
            let len = *pos - start;
            if len <= MAX_CLASSIFIED_IDENT {
                // identifiers are ASCII here, so the lookup never allocates
                if let Ok(ident) = std::str::from_utf8(&line[start..*pos]) {
                    if KEYWORDS.contains(ident) {
                        return TokenColor::Keyword;
                    }
                    if TYPES.contains(ident) {
                        return TokenColor::Type;
                    }
                    if SPECIAL.contains(ident) {
                        return TokenColor::Special;
                    }
                }
            }
            return TokenColor::Default;
        }
        let save = *pos;
        if scan_number(line, pos) {
            return TokenColor::Number;
        }
        *pos = save;
        if c == b'/' && line.len() - *pos > 1 {
            if line[*pos + 1] == b'/' {
                *pos = line.len();
                return TokenColor::Comment;
            }
            if line[*pos + 1] == b'*' {
                *pos += 2;
                loop {
                    while *pos < line.len() && line[*pos] != b'*' {
                        *pos += 1;
                    }
                    if *pos == line.len() {
                        self.in_block_comment = true;
                        return TokenColor::Comment;
                    }
                    *pos += 1;
                    if *pos < line.len() && line[*pos] == b'/' {
                        *pos += 1;
                        return TokenColor::Comment;
                    }
                }
            }
        }
        let start = *pos;
        while *pos < line.len() && is_punctuation(line[*pos]) {
            *pos += 1;
        }
        if *pos != start {
            return TokenColor::Punctuation;
        }
        *pos = line.len();
        TokenColor::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors(src: &str) -> Vec<Vec<TokenColor>> {
        let bytes = src.as_bytes();
        let mut tk = Tokenizer::default();
        let mut out = Vec::new();
        let mut begin = 0;
        for line in src.split('\n') {
            let end = begin + line.len();
            out.push(
                tk.tokenize(bytes, begin, end)
                    .iter()
                    .map(|t| t.color)
                    .collect(),
            );
            begin = end + 1;
        }
        out
    }

    #[test]
    fn keywords_types_and_specials() {
        let toks = colors("static int x = nullptr;");
        assert_eq!(
            toks[0],
            vec![
                TokenColor::Keyword,
                TokenColor::Type,
                TokenColor::Default,
                TokenColor::Punctuation,
                TokenColor::Special,
                TokenColor::Punctuation,
            ]
        );
    }

    #[test]
    fn numbers() {
        for src in ["0x1F'FFu", "0b1010", "1'000'000ull", "1.5e-3f", "42"] {
            let toks = colors(src);
            assert_eq!(toks[0], vec![TokenColor::Number], "{src}");
        }
    }

    #[test]
    fn strings_and_chars() {
        let toks = colors(r#"f("a\"b", 'x', '\n')"#);
        assert!(toks[0].contains(&TokenColor::String));
        assert_eq!(
            toks[0].iter().filter(|c| **c == TokenColor::CharLiteral).count(),
            2
        );
    }

    #[test]
    fn line_comment_runs_to_eol() {
        let toks = colors("x = 1; // trailing words\nint y;");
        assert_eq!(*toks[0].last().unwrap(), TokenColor::Comment);
        assert_eq!(toks[1][0], TokenColor::Type);
    }

    #[test]
    fn block_comment_spans_lines() {
        let mut tk = Tokenizer::default();
        let src = b"a /* open\nstill inside\nclose */ b";
        let l0 = tk.tokenize(src, 0, 9);
        assert!(tk.in_block_comment);
        assert_eq!(l0.last().unwrap().color, TokenColor::Comment);
        let l1 = tk.tokenize(src, 10, 22);
        assert!(tk.in_block_comment);
        assert_eq!(l1, vec![Token { begin: 10, end: 22, color: TokenColor::Comment }]);
        let l2 = tk.tokenize(src, 23, 33);
        assert!(!tk.in_block_comment);
        assert_eq!(l2[0].color, TokenColor::Comment);
        assert_eq!(l2.last().unwrap().color, TokenColor::Default);
    }

    #[test]
    fn preprocessor_continuation() {
        let toks = colors("#define FOO \\\n    (1 + 2)\nint x;");
        assert_eq!(toks[0], vec![TokenColor::Preprocessor]);
        assert_eq!(toks[1], vec![TokenColor::Preprocessor]);
        assert_eq!(toks[2][0], TokenColor::Type);
    }

    #[test]
    fn preprocessor_needs_leading_hash() {
        let toks = colors("  #include <stdio.h>");
        assert_eq!(toks[0], vec![TokenColor::Preprocessor]);
        let toks = colors("x = a # b;");
        assert_ne!(toks[0][0], TokenColor::Preprocessor);
    }

    #[test]
    fn tokens_are_monotonic_and_contained() {
        let src = "\tfor (size_t i = 0; i < n; i++) { /* hot */ sum += 0x10; }";
        let mut tk = Tokenizer::default();
        let toks = tk.tokenize(src.as_bytes(), 0, src.len());
        let mut prev_end = 0;
        for t in &toks {
            assert!(t.begin >= prev_end);
            assert!(t.end > t.begin);
            assert!(t.end as usize <= src.len());
            prev_end = t.end;
        }
    }

    #[test]
    fn unterminated_string_covers_rest_of_line() {
        let toks = colors("s = \"no close");
        assert_eq!(*toks[0].last().unwrap(), TokenColor::String);
    }
}
