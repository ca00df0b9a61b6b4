//! Token stream for the Java front end
//!
//! Whitespace and comments are not tokens of their own: each token carries
//! the trivia that precedes it, which the parser hands to tree prefixes.
//! Concatenating `prefix + text` over every token reproduces the input.

use std::ops::Range;
use thiserror::Error;

pub type Span = Range<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    IntLiteral,
    LongLiteral,
    FloatLiteral,
    DoubleLiteral,
    CharLiteral,
    StringLiteral,
    TextBlock,
    Punct,
    Eof,
}

impl TokenKind {
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::IntLiteral
                | TokenKind::LongLiteral
                | TokenKind::FloatLiteral
                | TokenKind::DoubleLiteral
                | TokenKind::CharLiteral
                | TokenKind::StringLiteral
                | TokenKind::TextBlock
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Whitespace and comments before the token
    pub prefix: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at offset {offset}")]
pub struct LexerError {
    pub message: String,
    pub offset: usize,
}

impl LexerError {
    fn new(message: impl Into<String>, offset: usize) -> Self {
        LexerError {
            message: message.into(),
            offset,
        }
    }
}

/// Operators lexed as one token, longest first.
///
/// `>` is never merged with a following `>` so nested type arguments close
/// one level per token.
const MULTI_CHAR_PUNCT: &[&str] = &[
    "...", "<<=", "->", "::", "==", "!=", "<=", ">=", "&&", "||", "++", "--", "+=", "-=", "*=", "/=",
    "%=", "&=", "|=", "^=", "<<",
];

const SINGLE_CHAR_PUNCT: &str = "(){}[];,.@=<>!~?:+-*/&|^%";

/// Split `input` into tokens, the last one always [`TokenKind::Eof`]
pub fn lex(input: &str) -> Result<Vec<Token>, LexerError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    loop {
        let trivia_start = pos;
        pos = skip_trivia(input, pos)?;
        let prefix = input[trivia_start..pos].to_string();

        let Some((ch, _)) = next_char(input, pos) else {
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                prefix,
                span: span(pos, pos),
            });
            return Ok(tokens);
        };

        let start = pos;
        let kind = if is_ident_start(ch) {
            pos = scan_while(input, pos, is_ident_part);
            TokenKind::Identifier
        } else if ch.is_ascii_digit()
            || (ch == '.' && input[pos + 1..].starts_with(|c: char| c.is_ascii_digit()))
        {
            let (end, kind) = scan_number(input, pos);
            pos = end;
            kind
        } else if input[pos..].starts_with("\"\"\"") {
            pos = scan_text_block(input, pos)?;
            TokenKind::TextBlock
        } else if ch == '"' {
            pos = scan_quoted(input, pos, '"')?;
            TokenKind::StringLiteral
        } else if ch == '\'' {
            pos = scan_quoted(input, pos, '\'')?;
            TokenKind::CharLiteral
        } else if let Some(op) = MULTI_CHAR_PUNCT.iter().find(|op| input[pos..].starts_with(**op)) {
            pos += op.len();
            TokenKind::Punct
        } else if SINGLE_CHAR_PUNCT.contains(ch) {
            pos += ch.len_utf8();
            TokenKind::Punct
        } else {
            return Err(LexerError::new(format!("unexpected character `{ch}`"), pos));
        };

        tokens.push(Token {
            kind,
            text: input[start..pos].to_string(),
            prefix,
            span: span(start, pos),
        });
    }
}

const BYTE_ORDER_MARK: char = '\u{FEFF}';

fn skip_trivia(input: &str, mut pos: usize) -> Result<usize, LexerError> {
    loop {
        let rest = &input[pos..];
        if pos == 0 && rest.starts_with(BYTE_ORDER_MARK) {
            // kept in the first token's prefix so printing restores it
            pos += BYTE_ORDER_MARK.len_utf8();
        } else if rest.starts_with("//") {
            pos += rest.find('\n').unwrap_or(rest.len());
        } else if rest.starts_with("/*") {
            match rest[2..].find("*/") {
                Some(end) => pos += end + 4,
                None => return Err(LexerError::new("unterminated block comment", pos)),
            }
        } else if let Some((ch, len)) = next_char(input, pos)
            && ch.is_whitespace()
        {
            pos += len;
        } else {
            return Ok(pos);
        }
    }
}

fn scan_number(input: &str, start: usize) -> (usize, TokenKind) {
    let rest = &input[start..];
    if rest.starts_with("0x") || rest.starts_with("0X") {
        let mut pos = scan_while(input, start + 2, |c| c.is_ascii_hexdigit() || c == '_');
        return match next_char(input, pos) {
            Some(('l' | 'L', len)) => {
                pos += len;
                (pos, TokenKind::LongLiteral)
            }
            _ => (pos, TokenKind::IntLiteral),
        };
    }

    let digits = |c: char| c.is_ascii_digit() || c == '_';
    let mut pos = scan_while(input, start, digits);
    let mut fractional = false;
    if input[pos..].starts_with('.') && input[pos + 1..].starts_with(|c: char| c.is_ascii_digit()) {
        fractional = true;
        pos = scan_while(input, pos + 1, digits);
    }
    if let Some(('e' | 'E', len)) = next_char(input, pos) {
        let mut exp = pos + len;
        if let Some(('+' | '-', sign)) = next_char(input, exp) {
            exp += sign;
        }
        if input[exp..].starts_with(|c: char| c.is_ascii_digit()) {
            fractional = true;
            pos = scan_while(input, exp, digits);
        }
    }

    match next_char(input, pos) {
        Some(('l' | 'L', len)) if !fractional => (pos + len, TokenKind::LongLiteral),
        Some(('f' | 'F', len)) => (pos + len, TokenKind::FloatLiteral),
        Some(('d' | 'D', len)) => (pos + len, TokenKind::DoubleLiteral),
        _ if fractional => (pos, TokenKind::DoubleLiteral),
        _ => (pos, TokenKind::IntLiteral),
    }
}

fn scan_quoted(input: &str, start: usize, quote: char) -> Result<usize, LexerError> {
    let mut pos = start + 1;
    while let Some((ch, len)) = next_char(input, pos) {
        pos += len;
        match ch {
            '\\' => {
                if let Some((_, escaped)) = next_char(input, pos) {
                    pos += escaped;
                }
            }
            '\n' => break,
            c if c == quote => return Ok(pos),
            _ => {}
        }
    }
    let what = if quote == '"' { "string" } else { "character" };
    Err(LexerError::new(format!("unterminated {what} literal"), start))
}

fn scan_text_block(input: &str, start: usize) -> Result<usize, LexerError> {
    let mut pos = start + 3;
    while pos < input.len() {
        if input[pos..].starts_with("\\\"") {
            pos += 2;
        } else if input[pos..].starts_with("\"\"\"") {
            return Ok(pos + 3);
        } else {
            pos += next_char(input, pos).map_or(1, |(_, len)| len);
        }
    }
    Err(LexerError::new("unterminated text block", start))
}

fn scan_while(input: &str, mut pos: usize, accept: impl Fn(char) -> bool) -> usize {
    while let Some((ch, len)) = next_char(input, pos) {
        if !accept(ch) {
            break;
        }
        pos += len;
    }
    pos
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

fn next_char(input: &str, pos: usize) -> Option<(char, usize)> {
    input[pos..].chars().next().map(|c| (c, c.len_utf8()))
}

fn span(start: usize, end: usize) -> Span {
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<(TokenKind, String)> {
        lex(input)
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_lossless_reconstruction() {
        let input = "class A { // trailing\n  /* block\n comment */ int x = 1_000L; }\n";
        let tokens = lex(input).unwrap();
        let reconstructed: String = tokens.iter().map(|t| format!("{}{}", t.prefix, t.text)).collect();
        assert_eq!(reconstructed, input);
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        assert_eq!(tokens.last().map(|t| t.prefix.as_str()), Some("\n"));
    }

    #[test]
    fn test_byte_order_mark_is_leading_trivia() {
        let tokens = lex("\u{FEFF}package p;").unwrap();
        assert_eq!(tokens[0].text, "package");
        assert_eq!(tokens[0].prefix, "\u{FEFF}");

        let err = lex("class A {\u{FEFF}}").unwrap_err();
        assert!(err.to_string().contains("unexpected character"), "{err}");
    }

    #[test]
    fn test_trivia_attaches_to_following_token() {
        let tokens = lex("a /* c */\n  b").unwrap();
        assert_eq!(tokens[1].text, "b");
        assert_eq!(tokens[1].prefix, " /* c */\n  ");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("1 0x1F 2L 1.5 3e10 2f 4d .5"),
            vec![
                (TokenKind::IntLiteral, "1".into()),
                (TokenKind::IntLiteral, "0x1F".into()),
                (TokenKind::LongLiteral, "2L".into()),
                (TokenKind::DoubleLiteral, "1.5".into()),
                (TokenKind::DoubleLiteral, "3e10".into()),
                (TokenKind::FloatLiteral, "2f".into()),
                (TokenKind::DoubleLiteral, "4d".into()),
                (TokenKind::DoubleLiteral, ".5".into()),
                (TokenKind::Eof, String::new()),
            ]
        );
    }

    #[test]
    fn test_member_access_on_int_is_not_a_double() {
        let texts: Vec<String> = kinds("a.b").into_iter().map(|(_, t)| t).collect();
        assert_eq!(texts, vec!["a", ".", "b", ""]);
    }

    #[test]
    fn test_nested_generics_close_one_level_per_token() {
        let texts: Vec<String> = kinds("Map<String, List<String>>").into_iter().map(|(_, t)| t).collect();
        assert_eq!(texts[texts.len() - 3..], [">", ">", ""]);
    }

    #[test]
    fn test_strings_and_chars() {
        assert_eq!(
            kinds(r#""a\"b" 'c' '\n'"#)[..3],
            [
                (TokenKind::StringLiteral, r#""a\"b""#.to_string()),
                (TokenKind::CharLiteral, "'c'".to_string()),
                (TokenKind::CharLiteral, r"'\n'".to_string()),
            ]
        );
        assert_eq!(kinds("\"\"\"\n  text\n  \"\"\"")[0].0, TokenKind::TextBlock);
    }

    #[test]
    fn test_operators() {
        let texts: Vec<String> = kinds("x -> y :: z != w ... ").into_iter().map(|(_, t)| t).collect();
        assert_eq!(texts, vec!["x", "->", "y", "::", "z", "!=", "w", "...", ""]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(lex("\"abc").unwrap_err().message, "unterminated string literal");
        assert_eq!(lex("a /* b").unwrap_err().offset, 2);
        assert!(lex("#").unwrap_err().message.contains("unexpected character"));
    }
}
