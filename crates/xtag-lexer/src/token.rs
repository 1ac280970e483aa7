use unicode_general_category::{get_general_category, GeneralCategory};

/// A position in source text, tracking line and column for error reporting.
///
/// `start` and `end` are byte offsets into the input; `line` and `column`
/// are 1-based and locate `start` (columns count characters, not bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

/// Token classification for xtag markup.
///
/// The token text lives on [`Token::value`], so every kind is a plain tag.
/// `AttrName`, `Equals` and the quoted-string kinds are reserved for attribute
/// lexing and are never produced by the current state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenKind {
    /// Fatal diagnostic; the value is the message.
    Error,
    /// Clean end of input (batch API only).
    EndOfFile,

    // Delimiters
    TagBegin,     // <
    TagEnd,       // >
    TagBeginDash, // </
    TagEndDash,   // />

    TagName,

    // Reserved
    AttrName,
    Equals,
    DoubleQuotedString,
    SingleQuotedString,

    Text,
}

impl TokenKind {
    /// Kinds declared for attribute lexing that no state emits yet.
    pub fn is_reserved(self) -> bool {
        matches!(
            self,
            TokenKind::AttrName
                | TokenKind::Equals
                | TokenKind::DoubleQuotedString
                | TokenKind::SingleQuotedString
        )
    }
}

/// A token produced by the xtag lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            value: value.into(),
            span,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == TokenKind::Error
    }
}

/// Letters are general category L*; `char::is_alphabetic` would also admit
/// letter-numbers and combining marks.
fn is_letter(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
    )
}

/// Decimal digits only (Nd), not `²` or `½`.
fn is_digit(c: char) -> bool {
    matches!(get_general_category(c), GeneralCategory::DecimalNumber)
}

/// Check if `c` may start a tag name: a letter, `_` or `:`.
pub fn is_name_start_char(c: char) -> bool {
    is_letter(c) || c == '_' || c == ':'
}

/// Check if `c` may continue a tag name: a start character, a digit, `-` or `.`.
pub fn is_name_char(c: char) -> bool {
    is_name_start_char(c) || is_digit(c) || c == '-' || c == '.'
}
