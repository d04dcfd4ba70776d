//! Single-pass byte-level lexer (`spec.md` §4.2).
//!
//! The state machine has three blocks — [`Block::Normal`],
//! [`Block::Comment`], [`Block::StringLiteral`] — and accumulates the
//! current token's bytes in a buffer that is flushed into a [`Token`]
//! whenever a delimiter is seen.

use crate::diagnostics::{Code, Diagnostic, Handler};
use crate::keyword::Keyword;
use crate::location::TokenLocation;
use crate::token::{Token, TokenStream, TokenType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Block {
    Normal,
    Comment,
    StringLiteral,
}

/// Breaks the given source bytes into a [`TokenStream`]. Returns `None`
/// if the input is malformed (an unterminated string literal); the
/// diagnostic has already been recorded on `handler` in that case and the
/// partial stream is discarded, per `spec.md` §4.2's failure mode.
pub fn lex(source: &[u8], handler: &mut Handler<'_>) -> Option<TokenStream> {
    let mut stream = TokenStream::new();
    let mut buffer: Vec<u8> = Vec::new();
    let mut block = Block::Normal;
    let mut current = TokenLocation::START;
    let mut captured = TokenLocation::START;

    let flush_type = |buf: &[u8]| -> TokenType {
        let text = std::str::from_utf8(buf).unwrap_or("");
        if let Some(kw) = Keyword::parse(text) {
            TokenType::Keyword(kw)
        } else if text.starts_with('#') && !text.contains(':') {
            TokenType::Identifier
        } else {
            TokenType::Identifier // unreachable in practice; braces/colon never reach flush
        }
    };

    macro_rules! flush_buffer {
        () => {
            if !buffer.is_empty() {
                let kind = flush_type(&buffer);
                let text = String::from_utf8_lossy(&buffer).into_owned();
                stream.push(Token::new(captured, kind, text));
                buffer.clear();
            }
        };
    }

    macro_rules! append_trivial {
        ($ty:expr, $byte:expr) => {{
            flush_buffer!();
            captured = current;
            stream.push(Token::new(captured, $ty, ($byte as char).to_string()));
        }};
    }

    let bytes = source;
    let mut i = 0usize;
    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'"' => {
                match block {
                    Block::Normal => {
                        block = Block::StringLiteral;
                        captured = current;
                    }
                    Block::StringLiteral => {
                        let escaped = i > 0 && bytes[i - 1] == b'\\';
                        if escaped {
                            if let Some(last) = buffer.last_mut() {
                                *last = b'"';
                            }
                        } else {
                            let text = String::from_utf8_lossy(&buffer).into_owned();
                            stream.push(Token::new(captured, TokenType::StringLiteral, text));
                            buffer.clear();
                            block = Block::Normal;
                        }
                    }
                    Block::Comment => {}
                }
                current.column += 1;
            }
            b'\n' => {
                match block {
                    Block::Normal => flush_buffer!(),
                    Block::Comment => block = Block::Normal,
                    Block::StringLiteral => {
                        handler.record(
                            Diagnostic::error(
                                Code::E2016UnterminatedString,
                                "missing closing quote '\"' for string literal",
                            )
                            .with_location(captured),
                        );
                        return None;
                    }
                }
                current.line += 1;
                current.column = 1;
            }
            b' ' => {
                if block == Block::StringLiteral {
                    buffer.push(b' ');
                } else if block == Block::Normal {
                    flush_buffer!();
                }
                current.column += 1;
            }
            b'\t' | 0x0B | 0x0C | b'\r' => {
                if block == Block::Normal {
                    flush_buffer!();
                }
                current.column += 1;
            }
            b'/' => {
                match block {
                    Block::Normal => {
                        if i + 1 < bytes.len() && bytes[i + 1] == b'/' {
                            flush_buffer!();
                            block = Block::Comment;
                        } else {
                            if buffer.is_empty() {
                                captured = current;
                            }
                            buffer.push(b'/');
                        }
                    }
                    Block::StringLiteral => buffer.push(b'/'),
                    Block::Comment => {}
                }
                current.column += 1;
            }
            b':' => {
                match block {
                    Block::Normal => append_trivial!(TokenType::Colon, b':'),
                    Block::StringLiteral => buffer.push(b':'),
                    Block::Comment => {}
                }
                current.column += 1;
            }
            b'{' => {
                match block {
                    Block::Normal => append_trivial!(TokenType::LeftBrace, b'{'),
                    Block::StringLiteral => buffer.push(b'{'),
                    Block::Comment => {}
                }
                current.column += 1;
            }
            b'}' => {
                match block {
                    Block::Normal => append_trivial!(TokenType::RightBrace, b'}'),
                    Block::StringLiteral => buffer.push(b'}'),
                    Block::Comment => {}
                }
                current.column += 1;
            }
            other => {
                if block != Block::Comment {
                    if block == Block::Normal && buffer.is_empty() {
                        captured = current;
                    }
                    buffer.push(other);
                }
                current.column += 1;
            }
        }
        i += 1;
    }

    if block == Block::StringLiteral {
        handler.record(
            Diagnostic::error(
                Code::E2016UnterminatedString,
                "missing closing quote '\"' for string literal",
            )
            .with_location(captured),
        );
        return None;
    }

    // a trailing, unterminated comment needs no flush: comments never buffer.
    flush_buffer!();

    Some(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_ok(src: &str) -> TokenStream {
        let sink = |_: &str| {};
        let mut handler = Handler::new(crate::diagnostics::ErrorModel::Soft, &sink);
        lex(src.as_bytes(), &mut handler).expect("lex should succeed")
    }

    #[test]
    fn lexes_keyword_colon_string() {
        let stream = lex_ok(r#"@language : "en""#);
        assert_eq!(stream.len(), 3);
        assert_eq!(
            stream.get(0).unwrap().kind,
            TokenType::Keyword(Keyword::Language)
        );
        assert_eq!(stream.get(1).unwrap().kind, TokenType::Colon);
        assert_eq!(stream.get(2).unwrap().kind, TokenType::StringLiteral);
        assert_eq!(stream.get(2).unwrap().text, "en");
    }

    #[test]
    fn lexes_identifier() {
        let stream = lex_ok("#hello");
        assert_eq!(stream.len(), 1);
        assert_eq!(stream.get(0).unwrap().kind, TokenType::Identifier);
        assert_eq!(stream.get(0).unwrap().text, "#hello");
    }

    #[test]
    fn strips_line_comments() {
        let stream = lex_ok("// a comment\n#id");
        assert_eq!(stream.len(), 1);
        assert_eq!(stream.get(0).unwrap().text, "#id");
    }

    #[test]
    fn escaped_quote_stays_inside_string() {
        let stream = lex_ok(r#""a\"b""#);
        assert_eq!(stream.len(), 1);
        assert_eq!(stream.get(0).unwrap().text, "a\"b");
    }

    #[test]
    fn unterminated_string_fails() {
        let sink = |_: &str| {};
        let mut handler = Handler::new(crate::diagnostics::ErrorModel::Soft, &sink);
        let result = lex(br#"#x : "unterminated"#, &mut handler);
        assert!(result.is_none());
        assert_eq!(handler.counters().errors, 1);
    }

    #[test]
    fn braces_are_single_byte_tokens() {
        let stream = lex_ok("{}");
        assert_eq!(stream.len(), 2);
        assert_eq!(stream.get(0).unwrap().kind, TokenType::LeftBrace);
        assert_eq!(stream.get(1).unwrap().kind, TokenType::RightBrace);
    }

    #[test]
    fn tracks_line_and_column() {
        let stream = lex_ok("#a\n#b");
        assert_eq!(stream.get(0).unwrap().location, TokenLocation::new(1, 1));
        assert_eq!(stream.get(1).unwrap().location, TokenLocation::new(2, 1));
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn arbitrary_identifiers_lex_to_one_token(id in "#[a-zA-Z_][a-zA-Z0-9_]{0,40}") {
            let stream = lex_ok(&id);
            prop_assert_eq!(stream.len(), 1);
            prop_assert_eq!(stream.get(0).unwrap().kind, TokenType::Identifier);
            prop_assert_eq!(stream.get(0).unwrap().text.as_str(), id.as_str());
        }

        #[test]
        fn arbitrary_string_literals_lex_to_one_token(body in "[^\"\\\\\n]{0,60}") {
            let source = format!("\"{}\"", body);
            let stream = lex_ok(&source);
            prop_assert_eq!(stream.len(), 1);
            prop_assert_eq!(stream.get(0).unwrap().kind, TokenType::StringLiteral);
            prop_assert_eq!(stream.get(0).unwrap().text.as_str(), body.as_str());
        }

        #[test]
        fn line_comments_never_produce_tokens(text in "[^\n]{0,60}") {
            let source = format!("// {}\n#after", text);
            let stream = lex_ok(&source);
            prop_assert_eq!(stream.len(), 1);
            prop_assert_eq!(stream.get(0).unwrap().text.as_str(), "#after");
        }
    }
}
