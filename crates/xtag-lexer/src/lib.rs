//! xtag Lexer
//!
//! Tokenizes a restricted XML-like markup (opening, closing and self-closing
//! tags) into a stream of tokens for a downstream parser.
//! Attributes, XML declarations and comments are not supported: declarations
//! and comments are rejected with an error, attribute text is skipped.
//!
//! The [`Lexer`] is pull-driven: every call to `next()` runs the state
//! machine until exactly one token is ready. [`stream::spawn`] runs the same
//! machine on a producer thread behind a rendezvous channel.
//!
//! # Example
//!
//! ```
//! use xtag_lexer::{Lexer, TokenKind};
//!
//! let kinds: Vec<TokenKind> = Lexer::new("<a/>").map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     vec![TokenKind::TagBegin, TokenKind::TagName, TokenKind::TagEndDash]
//! );
//! ```

pub mod cursor;
pub mod lexer;
pub mod stream;
pub mod token;

pub use lexer::{LexMode, Lexer};
pub use stream::{spawn, spawn_with_mode, LexerHandle, Outcome, TokenStream};
pub use token::{Span, Token, TokenKind};

/// What went wrong while lexing. The `Display` text is the value of the
/// `Error` token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    #[error("unexpected end of file")]
    UnexpectedEof,
    #[error("invalid character: expected start of tag name, found '{found}'")]
    InvalidTagStart { found: char },
    #[error("invalid character: expected tag name character, found '{found}'")]
    InvalidTagNameChar { found: char },
    #[error("invalid character: expected '>', found '{found}'")]
    ExpectedTagClose { found: char },
    #[error("XML declarations are not supported")]
    XmlDeclarationUnsupported,
    #[error("comments are not supported")]
    CommentUnsupported,
    #[error("invalid UTF-8 sequence at byte {offset}")]
    InvalidUtf8 { offset: usize },
}

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Lexer error at line {line}, column {column}: {kind}")]
pub struct LexerError {
    pub kind: LexErrorKind,
    pub line: usize,
    pub column: usize,
}

impl LexerError {
    pub fn new(kind: LexErrorKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }

    /// The bare diagnostic, without position.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}
