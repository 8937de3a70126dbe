//! Raiton interpreter: file runner, parser and tokenizer commands, or an
//! interactive REPL when invoked with no subcommand.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser as CliParser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use raiton::{Evaluator, Lexer, TokenKind, Value};

#[derive(CliParser)]
#[command(name = "raiton", version, about = "The raiton language interpreter")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a source file and print the result
    Run { file: PathBuf },
    /// Parse a source file and print the formatted syntax tree
    Parse { file: PathBuf },
    /// Lex a source file and print its token table
    Tokenize { file: PathBuf },
}

fn main() -> ExitCode {
    match Cli::parse().command {
        Some(Command::Run { file }) => run_file(&file),
        Some(Command::Parse { file }) => parse_file(&file),
        Some(Command::Tokenize { file }) => tokenize_file(&file),
        None => repl(),
    }
}

fn read_source(path: &Path) -> Result<String, ExitCode> {
    fs::read_to_string(path).map_err(|error| {
        eprintln!("cannot read {}: {error}", path.display());
        ExitCode::FAILURE
    })
}

fn run_file(path: &Path) -> ExitCode {
    let source = match read_source(path) {
        Ok(source) => source,
        Err(code) => return code,
    };
    let scope = match raiton::parse(&source) {
        Ok(scope) => scope,
        Err(error) => {
            eprintln!("parse error: {error}");
            return ExitCode::FAILURE;
        }
    };
    match Evaluator::new().evaluate_scope(&scope) {
        Ok(value) => {
            if !matches!(value, Value::Unit) {
                println!("{}", value.inspect());
            }
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("evaluation error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn parse_file(path: &Path) -> ExitCode {
    let source = match read_source(path) {
        Ok(source) => source,
        Err(code) => return code,
    };
    match raiton::parse(&source) {
        Ok(scope) => {
            println!("{scope}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("parse error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn tokenize_file(path: &Path) -> ExitCode {
    let source = match read_source(path) {
        Ok(source) => source,
        Err(code) => return code,
    };
    let mut lexer = Lexer::new(&source);
    loop {
        let token = lexer.next();
        println!("{token}");
        if token.kind == TokenKind::Eof {
            break;
        }
    }
    ExitCode::SUCCESS
}

fn repl() -> ExitCode {
    println!("raiton repl, type `exit` to quit");

    let mut editor: Editor<(), DefaultHistory> = match Editor::new() {
        Ok(editor) => editor,
        Err(error) => {
            eprintln!("repl error: {error}");
            return ExitCode::FAILURE;
        }
    };
    let history_path = repl_history_path();
    if let Some(ref path) = history_path {
        let _ = editor.load_history(path);
    }

    let mut evaluator = Evaluator::new();
    let mut buffer = String::new();
    loop {
        let prompt = if buffer.is_empty() { "> " } else { "... " };
        let line = match editor.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                if buffer.is_empty() {
                    break;
                }
                buffer.clear();
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(error) => {
                eprintln!("repl error: {error}");
                break;
            }
        };
        let line = line.trim_end();

        if buffer.is_empty() && line.is_empty() {
            continue;
        }
        if buffer.is_empty() && line == "exit" {
            break;
        }
        let _ = editor.add_history_entry(line);
        if !buffer.is_empty() {
            buffer.push('\n');
        }
        buffer.push_str(line);
        if needs_more_input(&buffer) {
            continue;
        }

        evaluate_line(&mut evaluator, &buffer);
        buffer.clear();
    }

    if let Some(ref path) = history_path {
        let _ = editor.save_history(path);
    }
    ExitCode::SUCCESS
}

fn evaluate_line(evaluator: &mut Evaluator, source: &str) {
    let scope = match raiton::parse(source) {
        Ok(scope) => scope,
        Err(error) => {
            eprintln!("parse error: {error}");
            return;
        }
    };
    match evaluator.evaluate_scope(&scope) {
        Ok(Value::Unit) => {}
        Ok(value) => println!("{}", value.inspect()),
        Err(error) => eprintln!("evaluation error: {error}"),
    }
}

fn repl_history_path() -> Option<String> {
    let home = env::var("HOME").ok()?;
    Some(format!("{home}/.raiton_history"))
}

/// Unbalanced brackets or an open string mean the entry continues on the
/// next line. Comments run to end of line and do not count.
fn needs_more_input(source: &str) -> bool {
    let mut paren = 0i32;
    let mut brace = 0i32;
    let mut bracket = 0i32;
    let mut terminator: Option<char> = None;
    let mut escape = false;
    let mut comment = false;

    for ch in source.chars() {
        if comment {
            if ch == '\n' {
                comment = false;
            }
            continue;
        }
        if let Some(quote) = terminator {
            if escape {
                escape = false;
                continue;
            }
            match ch {
                '\\' => escape = true,
                _ if ch == quote => terminator = None,
                _ => {}
            }
            continue;
        }

        match ch {
            '#' => comment = true,
            '"' | '\'' => terminator = Some(ch),
            '(' => paren += 1,
            ')' => paren -= 1,
            '{' => brace += 1,
            '}' => brace -= 1,
            '[' => bracket += 1,
            ']' => bracket -= 1,
            _ => {}
        }
    }

    terminator.is_some() || paren > 0 || brace > 0 || bracket > 0
}
