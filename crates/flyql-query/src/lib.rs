//! Lexer, parser, and AST for FlyQL, a structured query language for
//! searching hierarchical documents:
//!
//! - **Comparisons**: `subject.age >= 21`, `file.name == "scan.nii"`
//! - **Ranges and regex**: `<`, `<=`, `>`, `>=`, `=~`, `!~`
//! - **Lists**: `subject.species in [mouse, rat]`
//! - **Wildcards and text**: `label like Neuro%`, `notes contains tumor`
//! - **Presence**: `subject.race exists`
//! - **Boolean logic**: `a = 1 and (b = 2 or not c = 3)`. `AND` binds
//!   tighter than `OR`; `NOT` and parentheses bind tighter than both.
//!
//! [`parse_query`] produces an AST (or every syntax error found in the
//! input, not just the first), and [`parse_partial`] analyzes incomplete
//! text to drive autocomplete without ever failing. Field names are opaque
//! strings here; no schema is consulted.
//!
//! # Example
//!
//! ```
//! use flyql_query::parse_query;
//!
//! let tree = parse_query("subject.age >= 21 and subject.sex == male").unwrap();
//! assert!(matches!(tree, flyql_query::Node::And { .. }));
//! ```

#![warn(missing_docs)]

mod ast;
mod error;
mod lexer;
mod parser;
mod partial;

pub use ast::{Node, Operator, Phrase, Value};
pub use error::{ParseError, ParseErrorMessage};
pub use lexer::{ID_RESTRICTED_CHARS, Token, TokenKind, escape_id, tokenize};
pub use parser::parse_query;
pub use partial::{PartialParseResult, Suggest, parse_partial};
