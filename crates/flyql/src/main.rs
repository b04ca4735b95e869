//! Command-line interface for the FlyQL query engine.
//!
//! Exposes the engine for inspection and scripting: parse a query and
//! print its syntax tree, compile it to an Elasticsearch query document,
//! or show the autocomplete state for a partially typed query.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use flyql_elastic::to_query;
use flyql_query::{ParseError, parse_partial, parse_query};

#[derive(Parser)]
#[command(name = "flyql")]
#[command(about = "FlyQL - parse, compile, and autocomplete structured search queries")]
/// Top-level CLI options.
struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    command: Commands,
}

#[derive(Subcommand)]
/// Supported `flyql` subcommands.
enum Commands {
    /// Parse a query and print its syntax tree
    Parse {
        /// Query string
        query: String,
    },

    /// Compile a query into an Elasticsearch query document
    Compile {
        /// Query string
        query: String,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Show the autocomplete state for a partially typed query
    Suggest {
        /// Possibly incomplete query string
        query: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { query } => cmd_parse(&query),
        Commands::Compile { query, pretty } => cmd_compile(&query, pretty),
        Commands::Suggest { query } => cmd_suggest(&query),
    }
}

/// Prints every accumulated syntax error to stderr.
fn report_errors(err: &ParseError) -> ExitCode {
    for message in &err.errors {
        eprintln!("error: {message}");
    }
    ExitCode::FAILURE
}

/// Implements the `flyql parse` command.
fn cmd_parse(query: &str) -> ExitCode {
    match parse_query(query) {
        Ok(tree) => {
            println!("{tree}");
            ExitCode::SUCCESS
        }
        Err(err) => report_errors(&err),
    }
}

/// Implements the `flyql compile` command.
fn cmd_compile(query: &str, pretty: bool) -> ExitCode {
    let tree = match parse_query(query) {
        Ok(tree) => tree,
        Err(err) => return report_errors(&err),
    };

    let doc = to_query(&tree);
    let rendered = if pretty {
        serde_json::to_string_pretty(&doc)
    } else {
        serde_json::to_string(&doc)
    };

    match rendered {
        Ok(out) => {
            println!("{out}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to render query document: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Implements the `flyql suggest` command.
fn cmd_suggest(query: &str) -> ExitCode {
    let result = parse_partial(query);
    match serde_json::to_string(&result) {
        Ok(out) => {
            println!("{out}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to render suggestion: {e}");
            ExitCode::FAILURE
        }
    }
}
