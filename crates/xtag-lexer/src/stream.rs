//! Threaded token stream.
//!
//! [`spawn`] runs a [`Lexer`] on its own thread and hands tokens to the
//! consumer over a zero-capacity channel: every token is a rendezvous, so the
//! producer is never more than one token ahead. The channel closes when the
//! scan ends, after which [`TokenStream::recv`] returns `None` without
//! blocking.
//!
//! The producer stops early when the consumer drops its [`TokenStream`] or
//! calls [`LexerHandle::cancel`]. Dropping the handle on its own does not
//! stop the scan.

use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Select, Sender};
use tracing::debug;

use crate::lexer::{LexMode, Lexer};
use crate::token::Token;

/// How a producer thread finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The state machine reached a clean end.
    Completed,
    /// The last token handed over was an `Error`.
    Failed,
    /// The consumer went away or the scan was cancelled.
    Cancelled,
}

/// Start tokenizing `input` on a producer thread in [`LexMode::Single`].
pub fn spawn(input: impl Into<String>) -> (LexerHandle, TokenStream) {
    spawn_with_mode(input, LexMode::default())
}

/// Start tokenizing `input` on a producer thread.
pub fn spawn_with_mode(input: impl Into<String>, mode: LexMode) -> (LexerHandle, TokenStream) {
    let input = input.into();
    let (token_tx, token_rx) = channel::bounded(0);
    let (cancel_tx, cancel_rx) = channel::bounded(1);

    debug!(len = input.len(), ?mode, "spawning lexer");
    let thread = thread::spawn(move || produce(&input, mode, &token_tx, &cancel_rx));

    let handle = LexerHandle {
        cancel: cancel_tx,
        thread,
    };
    (handle, TokenStream { tokens: token_rx })
}

fn produce(input: &str, mode: LexMode, tokens: &Sender<Token>, cancel: &Receiver<()>) -> Outcome {
    let mut outcome = Outcome::Completed;
    for token in Lexer::with_mode(input, mode) {
        if token.is_error() {
            outcome = Outcome::Failed;
        }
        if !hand_off(token, tokens, cancel) {
            debug!("token stream abandoned");
            return Outcome::Cancelled;
        }
    }
    debug!(?outcome, "lexer finished");
    outcome
}

/// Block until the consumer takes `token` or the scan is cancelled.
/// Returns `false` when the producer should stop.
fn hand_off(token: Token, tokens: &Sender<Token>, cancel: &Receiver<()>) -> bool {
    if cancel.try_recv().is_ok() {
        return false;
    }

    let mut sel = Select::new();
    let send = sel.send(tokens);
    sel.recv(cancel);
    let oper = sel.select();

    if oper.index() == send {
        oper.send(tokens, token).is_ok()
    } else {
        match oper.recv(cancel) {
            Ok(()) => false,
            // Handle dropped without cancelling: plain hand-off.
            Err(_) => tokens.send(token).is_ok(),
        }
    }
}

/// Control side of a spawned lexer.
#[derive(Debug)]
pub struct LexerHandle {
    cancel: Sender<()>,
    thread: JoinHandle<Outcome>,
}

impl LexerHandle {
    /// Ask the producer to stop, even if it is parked on a hand-off.
    pub fn cancel(&self) {
        if self.cancel.try_send(()).is_ok() {
            debug!("lexer cancel requested");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the producer thread. Panics on the producer are resumed here.
    pub fn join(self) -> Outcome {
        match self.thread.join() {
            Ok(outcome) => outcome,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Consumer side of a spawned lexer.
#[derive(Debug)]
pub struct TokenStream {
    tokens: Receiver<Token>,
}

impl TokenStream {
    /// Block for the next token; `None` once the stream is closed.
    pub fn recv(&self) -> Option<Token> {
        self.tokens.recv().ok()
    }

    /// Stop consuming. The producer exits at its next hand-off.
    pub fn close(self) {}
}

impl Iterator for TokenStream {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.recv()
    }
}
