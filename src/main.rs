//! Offside front end
//!
//! Lexes, parses, and semantically checks programs written in an
//! indentation-sensitive ML-flavored source language, ahead of translation
//! to an object-oriented target.

mod frontend;
mod types;
mod utils;

use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use frontend::ast::Program;
use frontend::lexer::Lexer;
use frontend::parser::Parser as OffsideParser;
use frontend::semantic::SemanticAnalyzer;
use frontend::token::Token;
use utils::Diagnostic;

/// Offside front end
#[derive(Parser, Debug)]
#[command(name = "offsidec")]
#[command(version = "0.1.0")]
#[command(about = "Front end for an indentation-sensitive ML-flavored language")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input source file (checked when no subcommand is given)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Emit machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a source file for lexical, syntax, and semantic errors
    Check {
        /// Input source file
        input: PathBuf,
    },
    /// Dump the token stream
    Tokens {
        /// Input source file
        input: PathBuf,
    },
    /// Parse and dump the syntax tree
    Ast {
        /// Input source file
        input: PathBuf,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Some(Commands::Check { input }) => check_file(input, cli.json),
        Some(Commands::Tokens { input }) => dump_tokens(input, cli.json),
        Some(Commands::Ast { input }) => dump_ast(input),
        None => match &cli.input {
            Some(input) => check_file(input, cli.json),
            None => {
                eprintln!("Error: No input file specified");
                eprintln!("Usage: offsidec <FILE> or offsidec check <FILE>");
                process::exit(1);
            }
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn read_source(input: &PathBuf) -> Result<String> {
    fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))
}

/// Tokenize, validate, and parse; a failure here aborts the run
fn parse_source(source: &str) -> utils::Result<Program> {
    let tokens = Lexer::new(source).tokenize();
    let mut parser = OffsideParser::new(tokens);
    parser.validate_tokens()?;
    parser.parse_program()
}

/// Run the full front-end pipeline over one file
fn check_file(input: &PathBuf, json: bool) -> Result<()> {
    let source = read_source(input)?;

    let program = match parse_source(&source) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Syntax error: {e}");
            process::exit(1);
        }
    };

    let diagnostics: Vec<Diagnostic> = SemanticAnalyzer::new().analyze(&program);

    if json {
        println!("{}", serde_json::to_string_pretty(&diagnostics)?);
        if !diagnostics.is_empty() {
            process::exit(1);
        }
        return Ok(());
    }

    if diagnostics.is_empty() {
        // safe to hand off to code generation
        println!("✅ No errors found");
    } else {
        eprintln!("Semantic errors:");
        for diagnostic in &diagnostics {
            eprintln!("  {diagnostic}");
        }
        process::exit(1);
    }
    Ok(())
}

fn dump_tokens(input: &PathBuf, json: bool) -> Result<()> {
    let source = read_source(input)?;
    let tokens: Vec<Token> = Lexer::new(&source).tokenize();

    if json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
        return Ok(());
    }

    println!(
        "{:<15} {:<24} {:>5} {:>5} {:>7}",
        "KIND", "LEXEME", "LINE", "ID", "INDENT"
    );
    for token in &tokens {
        println!(
            "{:<15} {:<24} {:>5} {:>5} {:>7}",
            format!("{:?}", token.kind),
            token.lexeme,
            token.line,
            token.id,
            token.indent
        );
    }
    Ok(())
}

fn dump_ast(input: &PathBuf) -> Result<()> {
    let source = read_source(input)?;
    match parse_source(&source) {
        Ok(program) => {
            println!("{program:#?}");
            Ok(())
        }
        Err(e) => {
            eprintln!("Syntax error: {e}");
            process::exit(1);
        }
    }
}
