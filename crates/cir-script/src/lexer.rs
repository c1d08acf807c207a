use std::fmt;

use crate::error::{ParseError, ParseErrorKind};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    /// Backquoted item id, e.g. `` `true` ``.
    QuotedRef(String),
    Str(String),
    Num(f64),
    True,
    False,
    LParen,
    RParen,
    Comma,
    Dot,
    Minus,
    Not,
    AndAnd,
    OrOr,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => write!(f, "identifier '{name}'"),
            Self::QuotedRef(name) => write!(f, "reference `{name}`"),
            Self::Str(_) => f.write_str("string literal"),
            Self::Num(n) => write!(f, "number {n}"),
            Self::True => f.write_str("'true'"),
            Self::False => f.write_str("'false'"),
            Self::LParen => f.write_str("'('"),
            Self::RParen => f.write_str("')'"),
            Self::Comma => f.write_str("','"),
            Self::Dot => f.write_str("'.'"),
            Self::Minus => f.write_str("'-'"),
            Self::Not => f.write_str("'!'"),
            Self::AndAnd => f.write_str("'&&'"),
            Self::OrOr => f.write_str("'||'"),
            Self::EqEq => f.write_str("'=='"),
            Self::NotEq => f.write_str("'!='"),
            Self::Lt => f.write_str("'<'"),
            Self::Le => f.write_str("'<='"),
            Self::Gt => f.write_str("'>'"),
            Self::Ge => f.write_str("'>='"),
            Self::Eof => f.write_str("end of expression"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token's first character.
    pub offset: usize,
}

/// Split `source` into tokens, ending with a single [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let start = pos;
        let two = bytes.get(pos + 1).copied();
        let kind = match (c, two) {
            (b'&', Some(b'&')) => {
                pos += 2;
                TokenKind::AndAnd
            }
            (b'|', Some(b'|')) => {
                pos += 2;
                TokenKind::OrOr
            }
            (b'=', Some(b'=')) => {
                pos += 2;
                TokenKind::EqEq
            }
            (b'!', Some(b'=')) => {
                pos += 2;
                TokenKind::NotEq
            }
            (b'<', Some(b'=')) => {
                pos += 2;
                TokenKind::Le
            }
            (b'>', Some(b'=')) => {
                pos += 2;
                TokenKind::Ge
            }
            (b'<', _) => {
                pos += 1;
                TokenKind::Lt
            }
            (b'>', _) => {
                pos += 1;
                TokenKind::Gt
            }
            (b'!', _) => {
                pos += 1;
                TokenKind::Not
            }
            (b'(', _) => {
                pos += 1;
                TokenKind::LParen
            }
            (b')', _) => {
                pos += 1;
                TokenKind::RParen
            }
            (b',', _) => {
                pos += 1;
                TokenKind::Comma
            }
            (b'.', _) => {
                pos += 1;
                TokenKind::Dot
            }
            (b'-', _) => {
                pos += 1;
                TokenKind::Minus
            }
            (b'\'' | b'"', _) => {
                let (text, end) = string_literal(source, pos)?;
                pos = end;
                TokenKind::Str(text)
            }
            // Item ids may start with a digit, so `2nd_visit` is one identifier.
            (b'0'..=b'9', _) if word_end(bytes, pos) > digits_end(bytes, pos) => {
                pos = word_end(bytes, pos);
                TokenKind::Ident(source[start..pos].to_string())
            }
            (b'0'..=b'9', _) => {
                while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'.') {
                    pos += 1;
                }
                let text = &source[start..pos];
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ParseError::new(start, ParseErrorKind::InvalidNumber(text.to_string())))?;
                TokenKind::Num(value)
            }
            (b'A'..=b'Z' | b'a'..=b'z' | b'_', _) => {
                pos = word_end(bytes, pos);
                match &source[start..pos] {
                    "true" => TokenKind::True,
                    "false" => TokenKind::False,
                    word => TokenKind::Ident(word.to_string()),
                }
            }
            (b'`', _) => {
                let end = word_end(bytes, pos + 1);
                if end == pos + 1 || bytes.get(end) != Some(&b'`') {
                    return Err(ParseError::new(start, ParseErrorKind::UnterminatedReference));
                }
                pos = end + 1;
                TokenKind::QuotedRef(source[start + 1..end].to_string())
            }
            _ => {
                let ch = source[start..].chars().next().unwrap_or('\u{FFFD}');
                return Err(ParseError::new(start, ParseErrorKind::UnexpectedChar(ch)));
            }
        };
        tokens.push(Token {
            kind,
            offset: start,
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        offset: source.len(),
    });
    Ok(tokens)
}

fn word_end(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
        pos += 1;
    }
    pos
}

fn digits_end(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    pos
}

/// Read a quoted literal starting at `start`; returns the unescaped text and
/// the offset just past the closing quote.
fn string_literal(source: &str, start: usize) -> Result<(String, usize), ParseError> {
    let mut chars = source[start..].char_indices();
    let quote = match chars.next() {
        Some((_, q)) => q,
        None => return Err(ParseError::new(start, ParseErrorKind::UnterminatedString)),
    };

    let mut text = String::new();
    while let Some((i, c)) = chars.next() {
        match c {
            c if c == quote => return Ok((text, start + i + c.len_utf8())),
            '\\' => match chars.next() {
                Some((_, 'n')) => text.push('\n'),
                Some((_, 't')) => text.push('\t'),
                Some((_, other)) => text.push(other),
                None => break,
            },
            other => text.push(other),
        }
    }
    Err(ParseError::new(start, ParseErrorKind::UnterminatedString))
}
