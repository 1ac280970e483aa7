use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::Path;
use xtag_lexer::{LexMode, Lexer, Token};

#[derive(Parser)]
#[command(name = "xtag")]
#[command(about = "xtag: tokenizer for a restricted XML-like markup")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the token stream of a file (stdin when no path or `-`)
    Tokens {
        /// Input file
        path: Option<String>,

        #[arg(long, value_enum, default_value_t = ModeArg::Single)]
        mode: ModeArg,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Check that a file tokenizes without errors
    Check {
        /// Input file
        path: Option<String>,

        #[arg(long, value_enum, default_value_t = ModeArg::Single)]
        mode: ModeArg,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Stop after the first tag, skip text
    Single,
    /// Lex every tag and emit text between tags
    Document,
}

impl From<ModeArg> for LexMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Single => LexMode::Single,
            ModeArg::Document => LexMode::Document,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Tokens { path, mode, format } => cmd_tokens(path.as_deref(), mode.into(), format),
        Command::Check { path, mode } => cmd_check(path.as_deref(), mode.into()),
    }
}

/// Install a log subscriber, only when `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn read_source(path: Option<&str>) -> Vec<u8> {
    let mut source = Vec::new();
    match path {
        None | Some("-") => {
            if let Err(e) = std::io::stdin().read_to_end(&mut source) {
                eprintln!("Error reading stdin: {e}");
                std::process::exit(1);
            }
        }
        Some(path) => {
            let p = Path::new(path);
            if !p.exists() {
                eprintln!("Error: file not found: {path}");
                std::process::exit(1);
            }
            match std::fs::read(p) {
                Ok(bytes) => source = bytes,
                Err(e) => {
                    eprintln!("Error reading {path}: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
    tracing::debug!(bytes = source.len(), "source loaded");
    source
}

fn lex(source: &[u8], mode: LexMode) -> Vec<Token> {
    match Lexer::from_bytes(source, mode) {
        Ok(lexer) => lexer.collect(),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn cmd_tokens(path: Option<&str>, mode: LexMode, format: Format) {
    let source = read_source(path);
    let tokens = lex(&source, mode);

    match format {
        Format::Text => print!("{}", render_text(&tokens)),
        Format::Json => match serde_json::to_string_pretty(&tokens) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error encoding tokens: {e}");
                std::process::exit(1);
            }
        },
    }

    if tokens.last().is_some_and(Token::is_error) {
        std::process::exit(1);
    }
}

fn cmd_check(path: Option<&str>, mode: LexMode) {
    let source = read_source(path);
    let tokens = lex(&source, mode);

    match tokens.last() {
        Some(token) if token.is_error() => {
            eprintln!("{}", describe_error(token));
            std::process::exit(1);
        }
        _ => eprintln!("OK: {} tokens", tokens.len()),
    }
}

/// One line per token: `line:column  Kind  "value"`.
fn render_text(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        let position = format!("{}:{}", token.span.line, token.span.column);
        out.push_str(&format!(
            "{position:<8}{:<14}{:?}\n",
            format!("{:?}", token.kind),
            token.value
        ));
    }
    out
}

fn describe_error(token: &Token) -> String {
    format!(
        "Error at line {}, column {}: {}",
        token.span.line, token.span.column, token.value
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use xtag_lexer::TokenKind;

    #[test]
    fn test_render_text() {
        let tokens: Vec<Token> = Lexer::new("<a/>").collect();
        assert_eq!(
            render_text(&tokens),
            "1:1     TagBegin      \"<\"\n\
             1:2     TagName       \"a\"\n\
             1:3     TagEndDash    \"/>\"\n"
        );
    }

    #[test]
    fn test_render_json() {
        let tokens: Vec<Token> = Lexer::new("<a/>").collect();
        let json = serde_json::to_value(&tokens).unwrap();
        assert_eq!(json[0]["kind"], "TagBegin");
        assert_eq!(json[1]["value"], "a");
        assert_eq!(json[2]["span"]["start"], 2);
    }

    #[test]
    fn test_describe_error() {
        let tokens: Vec<Token> = Lexer::new("<a$/>").collect();
        let last = tokens.last().unwrap();
        assert_eq!(last.kind, TokenKind::Error);
        assert_eq!(
            describe_error(last),
            "Error at line 1, column 3: invalid character: expected tag name character, found '$'"
        );
    }

    #[test]
    fn test_mode_arg_conversion() {
        assert_eq!(LexMode::from(ModeArg::Single), LexMode::Single);
        assert_eq!(LexMode::from(ModeArg::Document), LexMode::Document);
    }

    #[test]
    fn test_cli_parses_tokens_command() {
        let cli = Cli::try_parse_from(["xtag", "tokens", "doc.xml", "--mode", "document", "--format", "json"])
            .unwrap();
        match cli.command {
            Command::Tokens { path, mode, format } => {
                assert_eq!(path.as_deref(), Some("doc.xml"));
                assert_eq!(mode, ModeArg::Document);
                assert_eq!(format, Format::Json);
            }
            Command::Check { .. } => panic!("expected tokens command"),
        }
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["xtag", "check"]).unwrap();
        match cli.command {
            Command::Check { path, mode } => {
                assert_eq!(path, None);
                assert_eq!(mode, ModeArg::Single);
            }
            Command::Tokens { .. } => panic!("expected check command"),
        }
    }
}
