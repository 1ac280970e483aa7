use tracing::{debug, trace};

use crate::cursor::Cursor;
use crate::token::{is_name_char, is_name_start_char, Token, TokenKind};
use crate::{LexErrorKind, LexerError};

/// Lexer mode decides what happens outside tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LexMode {
    /// Default mode: character data is skipped and lexing stops after the
    /// first tag closes.
    #[default]
    Single,
    /// Whole-document mode: lexing resumes after every tag and character
    /// data between tags becomes `Text` tokens.
    Document,
}

/// States of the tokenizer. Each one has a single transition function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Init,
    Common,
    TagName,
    TagInside,
}

/// xtag markup lexer.
///
/// Pull-driven state machine over a borrowed input: each call to
/// [`Iterator::next`] runs states until one token is produced, and returns
/// `None` once the machine has stopped. An `Error` token is always the last
/// token.
#[derive(Debug)]
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    state: Option<State>,
    mode: LexMode,
    /// Token produced by the current step, at most one per step.
    emitted: Option<Token>,
    failure: Option<LexerError>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer in [`LexMode::Single`].
    pub fn new(input: &'a str) -> Self {
        Self::with_mode(input, LexMode::default())
    }

    /// Create a lexer with a specific mode.
    pub fn with_mode(input: &'a str, mode: LexMode) -> Self {
        Self {
            cursor: Cursor::new(input),
            state: Some(State::Init),
            mode,
            emitted: None,
            failure: None,
        }
    }

    /// Create a lexer over raw bytes, rejecting invalid UTF-8 up front.
    pub fn from_bytes(input: &'a [u8], mode: LexMode) -> Result<Self, LexerError> {
        match std::str::from_utf8(input) {
            Ok(text) => Ok(Self::with_mode(text, mode)),
            Err(e) => {
                let offset = e.valid_up_to();
                let valid = std::str::from_utf8(&input[..offset]).unwrap_or_default();
                let line = valid.matches('\n').count() + 1;
                let column = valid.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
                Err(LexerError::new(
                    LexErrorKind::InvalidUtf8 { offset },
                    line,
                    column,
                ))
            }
        }
    }

    /// Tokenize the entire input into a vector of tokens.
    ///
    /// A clean end appends an `EndOfFile` token; an `Error` token becomes `Err`.
    pub fn tokenize(input: &str) -> Result<Vec<Token>, LexerError> {
        Self::tokenize_with_mode(input, LexMode::default())
    }

    pub fn tokenize_with_mode(input: &str, mode: LexMode) -> Result<Vec<Token>, LexerError> {
        let mut lexer = Lexer::with_mode(input, mode);
        let mut tokens: Vec<Token> = lexer.by_ref().collect();
        if let Some(err) = lexer.failure.take() {
            return Err(err);
        }
        tokens.push(Token::new(TokenKind::EndOfFile, "", lexer.cursor.here()));
        Ok(tokens)
    }

    /// Whether the state machine has stopped.
    pub fn is_finished(&self) -> bool {
        self.state.is_none() && self.emitted.is_none()
    }

    /// The error that stopped the lexer, if any.
    pub fn failure(&self) -> Option<&LexerError> {
        self.failure.as_ref()
    }

    // --- States ---

    fn step(&mut self, state: State) -> Option<State> {
        match state {
            State::Init => self.lex_init(),
            State::Common => self.lex_common(),
            State::TagName => self.lex_tag_name(),
            State::TagInside => self.lex_tag_inside(),
        }
    }

    /// An empty document is an error.
    fn lex_init(&mut self) -> Option<State> {
        match self.cursor.peek() {
            None => self.error(LexErrorKind::UnexpectedEof),
            Some(_) => Some(State::Common),
        }
    }

    /// Between tags: look for `<` and dispatch on the rune after it.
    fn lex_common(&mut self) -> Option<State> {
        loop {
            match self.cursor.next() {
                None => {
                    if self.mode == LexMode::Document && self.cursor.has_pending() {
                        self.emit(TokenKind::Text);
                    }
                    return None;
                }
                Some('<') => {
                    // Flush character data first, then come back for the `<`.
                    if self.mode == LexMode::Document && self.cursor.pending().len() > 1 {
                        self.cursor.backup();
                        self.emit(TokenKind::Text);
                        return Some(State::Common);
                    }
                    return self.lex_tag_open();
                }
                Some(_) => {
                    if self.mode == LexMode::Single {
                        self.ignore();
                    }
                }
            }
        }
    }

    /// Just consumed `<`.
    fn lex_tag_open(&mut self) -> Option<State> {
        match self.cursor.next() {
            None => self.error(LexErrorKind::UnexpectedEof),
            Some('/') => {
                self.emit(TokenKind::TagBeginDash);
                Some(State::TagName)
            }
            Some('?') => self.error(LexErrorKind::XmlDeclarationUnsupported),
            Some('!') => self.error(LexErrorKind::CommentUnsupported),
            Some(c) if is_name_start_char(c) => {
                self.cursor.backup();
                self.emit(TokenKind::TagBegin);
                Some(State::TagName)
            }
            Some(found) => self.error(LexErrorKind::InvalidTagStart { found }),
        }
    }

    /// Validates every rune as it is scanned; the first bad one aborts.
    fn lex_tag_name(&mut self) -> Option<State> {
        loop {
            let first = !self.cursor.has_pending();
            match self.cursor.next() {
                None => return self.error(LexErrorKind::UnexpectedEof),
                Some(found) if first && !is_name_start_char(found) => {
                    return self.error(LexErrorKind::InvalidTagStart { found });
                }
                Some(' ' | '/' | '>') => {
                    self.cursor.backup();
                    self.emit(TokenKind::TagName);
                    return Some(State::TagInside);
                }
                Some(found) if !is_name_char(found) => {
                    return self.error(LexErrorKind::InvalidTagNameChar { found });
                }
                Some(_) => {}
            }
        }
    }

    /// After the tag name, up to and including `>` or `/>`.
    fn lex_tag_inside(&mut self) -> Option<State> {
        loop {
            match self.cursor.next() {
                None => return self.error(LexErrorKind::UnexpectedEof),
                Some('/') => {
                    return match self.cursor.next() {
                        Some('>') => {
                            self.emit(TokenKind::TagEndDash);
                            self.after_tag()
                        }
                        None => self.error(LexErrorKind::UnexpectedEof),
                        Some(found) => self.error(LexErrorKind::ExpectedTagClose { found }),
                    };
                }
                Some('>') => {
                    self.emit(TokenKind::TagEnd);
                    return self.after_tag();
                }
                // Spaces separate attributes, which are not lexed yet.
                Some(_) => self.ignore(),
            }
        }
    }

    fn after_tag(&self) -> Option<State> {
        match self.mode {
            LexMode::Single => None,
            LexMode::Document => Some(State::Common),
        }
    }

    // --- Helpers ---

    fn emit(&mut self, kind: TokenKind) {
        let token = Token::new(kind, self.cursor.pending(), self.cursor.pending_span());
        trace!(?kind, value = %token.value, start = token.span.start, "emit");
        debug_assert!(self.emitted.is_none(), "one token per step");
        self.emitted = Some(token);
        self.cursor.collapse();
    }

    fn ignore(&mut self) {
        self.cursor.collapse();
    }

    fn error(&mut self, kind: LexErrorKind) -> Option<State> {
        let span = self.cursor.last_rune_span();
        let err = LexerError::new(kind, span.line, span.column);
        debug!(%err, "lexing failed");
        self.emitted = Some(Token::new(TokenKind::Error, err.message(), span));
        self.failure = Some(err);
        None
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        while let Some(state) = self.state {
            let next = self.step(state);
            if next != Some(state) {
                trace!(from = ?state, to = ?next, "transition");
            }
            self.state = next;
            if let Some(token) = self.emitted.take() {
                return Some(token);
            }
        }
        None
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}
