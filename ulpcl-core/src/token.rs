//! Tokens and the [`TokenStream`] the lexer produces.

use crate::keyword::Keyword;
use crate::location::TokenLocation;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenType {
    Keyword(Keyword),
    Identifier,
    StringLiteral,
    LeftBrace,
    RightBrace,
    Colon,
}

/// A single lexeme: its location, its resolved type, and its raw UTF-8
/// payload (the keyword/identifier text, the string literal's contents
/// with escapes already resolved, or the single brace/colon byte).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub location: TokenLocation,
    pub kind: TokenType,
    pub text: String,
}

impl Token {
    pub fn new(location: TokenLocation, kind: TokenType, text: impl Into<String>) -> Self {
        Self {
            location,
            kind,
            text: text.into(),
        }
    }
}

/// An ordered, indexable sequence of tokens produced by the lexer and
/// consumed read-only by the parser.
#[derive(Clone, Debug, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }
}
