//! FlyQL parser.
//!
//! Parses a token stream into an AST using recursive descent.
//!
//! # Grammar
//!
//! ```text
//! expression → and_expr ("OR" and_expr)*
//! and_expr   → unary ("AND" unary)*
//! unary      → "(" expression ")" | "NOT" unary | term
//! term       → field "IN" "[" phrase ("," phrase)* "]"
//!            | field ("LIKE" | "CONTAINS" | operator) phrase
//!            | field "EXISTS"
//! operator   → = | == | != | <> | < | <= | > | >= | =~ | !~
//! field      → ID | QUOTED
//! phrase     → ID | QUOTED
//! ```
//!
//! `AND` binds tighter than `OR`; both are left-associative and produce
//! binary nodes. The parser does not stop at the first mistake: an unknown
//! operator is reported and skipped so one call can surface several
//! independent errors, all returned in a single [`ParseError`].

use crate::{
    ast::{Node, Operator, Phrase, Value},
    error::{ParseError, ParseErrorMessage},
    lexer::{Token, TokenKind, tokenize},
};

/// Recursive descent parser for FlyQL queries.
struct Parser<'a> {
    /// The original input, for line/column computation.
    input: &'a str,
    /// Token stream to parse.
    tokens: Vec<Token>,
    /// Current position in the token stream.
    position: usize,
    /// Errors accumulated during this parse call.
    errors: Vec<ParseErrorMessage>,
}

/// Computes the 1-indexed column of a byte offset within its line,
/// counting characters rather than bytes.
fn column_at(input: &str, offset: usize) -> usize {
    let line_start = input[..offset].rfind('\n').map_or(0, |i| i + 1);
    input[line_start..offset].chars().count() + 1
}

impl<'a> Parser<'a> {
    /// Creates a parser over the tokenized input.
    fn new(input: &'a str) -> Self {
        Self {
            input,
            tokens: tokenize(input),
            position: 0,
            errors: Vec::new(),
        }
    }

    /// Parses the whole input into an AST, or all accumulated errors.
    fn parse(mut self) -> Result<Node, ParseError> {
        let node = self.parse_expression();

        // Trailing tokens after a complete expression are a syntax error.
        if node.is_some()
            && let Some(token) = self.peek().cloned()
        {
            self.error_at(&token, format!("Syntax error at '{}'", token.text));
        }

        match node {
            Some(root) if self.errors.is_empty() => Ok(root),
            _ => {
                if self.errors.is_empty() {
                    self.error_at_end("Unexpected end of input!");
                }
                Err(ParseError {
                    errors: self.errors,
                })
            }
        }
    }

    /// Parses: expression → and_expr ("OR" and_expr)*
    fn parse_expression(&mut self) -> Option<Node> {
        let mut left = self.parse_and_expression()?;

        while self.check(TokenKind::Or) {
            self.advance();
            let right = self.parse_and_expression()?;
            left = Node::or(left, right);
        }

        Some(left)
    }

    /// Parses: and_expr → unary ("AND" unary)*
    fn parse_and_expression(&mut self) -> Option<Node> {
        let mut left = self.parse_unary()?;

        while self.check(TokenKind::And) {
            self.advance();
            let right = self.parse_unary()?;
            left = Node::and(left, right);
        }

        Some(left)
    }

    /// Parses: unary → "(" expression ")" | "NOT" unary | term
    fn parse_unary(&mut self) -> Option<Node> {
        match self.peek().map(|t| t.kind) {
            Some(TokenKind::LParen) => {
                self.advance();
                let expr = self.parse_expression()?;
                if !self.check(TokenKind::RParen) {
                    self.unexpected_here();
                    return None;
                }
                self.advance();
                Some(Node::group(expr))
            }
            Some(TokenKind::Not) => {
                self.advance();
                Some(Node::not(self.parse_unary()?))
            }
            _ => self.parse_term(),
        }
    }

    /// Parses a term, starting from its field.
    ///
    /// An unrecognized token in operator position is recovered: the error
    /// is recorded, the token (plus at most one identifier-class token
    /// following it) is discarded, and a placeholder node is returned so
    /// parsing continues. The recorded error guarantees the resulting tree
    /// is never handed to a caller.
    fn parse_term(&mut self) -> Option<Node> {
        let field = self.parse_value()?;

        let Some(op_token) = self.peek().cloned() else {
            self.error_at_end("Unexpected end of input!");
            return None;
        };

        let op = match op_token.kind {
            TokenKind::In => {
                self.advance();
                let items = self.parse_list()?;
                return Some(Node::term(Operator::In, field, Phrase::List(items)));
            }
            TokenKind::Exists => {
                self.advance();
                return Some(Node::term(Operator::Exists, field, Phrase::Exists));
            }
            TokenKind::Like => Operator::Like,
            TokenKind::Contains => Operator::Contains,
            TokenKind::Equals => Operator::Eq,
            TokenKind::NotEquals => Operator::Ne,
            TokenKind::LessThan => Operator::Lt,
            TokenKind::LessEquals => Operator::Lte,
            TokenKind::GreaterThan => Operator::Gt,
            TokenKind::GreaterEquals => Operator::Gte,
            TokenKind::Matches => Operator::Matches,
            TokenKind::NotMatches => Operator::NotMatches,
            _ => {
                self.error_at(&op_token, format!("Unknown operator: '{}'", op_token.text));
                self.advance();
                if self.peek().is_some_and(|t| t.kind.is_identifier()) {
                    self.advance();
                }
                return Some(Node::term(Operator::Exists, field, Phrase::Exists));
            }
        };

        self.advance();
        let phrase = self.parse_value()?;
        Some(Node::term(op, field, Phrase::Single(phrase)))
    }

    /// Parses: "[" phrase ("," phrase)* "]"
    fn parse_list(&mut self) -> Option<Vec<Value>> {
        if !self.check(TokenKind::LBracket) {
            self.unexpected_here();
            return None;
        }
        self.advance();

        let mut items = vec![self.parse_value()?];
        while self.check(TokenKind::Comma) {
            self.advance();
            items.push(self.parse_value()?);
        }

        if !self.check(TokenKind::RBracket) {
            self.unexpected_here();
            return None;
        }
        self.advance();
        Some(items)
    }

    /// Parses a field or phrase value.
    ///
    /// An unmatched quote records an error but still yields its partial
    /// text, so parsing continues and later mistakes are also reported.
    fn parse_value(&mut self) -> Option<Value> {
        let Some(token) = self.peek().cloned() else {
            self.error_at_end("Unexpected end of input!");
            return None;
        };

        match token.kind {
            TokenKind::Id => {
                self.advance();
                Some(Value::bare(token.text))
            }
            TokenKind::Quoted => {
                self.advance();
                Some(Value::quoted(token.text))
            }
            TokenKind::UnmatchedQuote => {
                self.error_at(&token, "Expected '\"'".to_string());
                self.advance();
                Some(Value::quoted(token.text))
            }
            _ => {
                self.error_at(&token, format!("Syntax error at '{}'", token.text));
                None
            }
        }
    }

    /// Records a syntax error at the current token, or an end-of-input
    /// error when no token remains.
    fn unexpected_here(&mut self) {
        match self.peek().cloned() {
            Some(token) => self.error_at(&token, format!("Syntax error at '{}'", token.text)),
            None => self.error_at_end("Unexpected end of input!"),
        }
    }

    /// Records an error positioned at the given token.
    fn error_at(&mut self, token: &Token, message: String) {
        self.errors.push(ParseErrorMessage {
            offset: token.offset,
            line: token.line,
            column: column_at(self.input, token.offset),
            message,
        });
    }

    /// Records an error positioned at the end of the input.
    fn error_at_end(&mut self, message: &str) {
        let offset = self.input.len();
        self.errors.push(ParseErrorMessage {
            offset,
            line: self.input.matches('\n').count() + 1,
            column: column_at(self.input, offset),
            message: message.to_string(),
        });
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Checks if the current token has the given kind.
    fn check(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }
}

/// Parses a query string into an AST.
///
/// All syntax errors found in one call are accumulated and returned
/// together; the error list never carries over between calls.
pub fn parse_query(input: &str) -> Result<Node, ParseError> {
    Parser::new(input).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(text: &str) -> Value {
        Value::bare(text)
    }

    fn quoted(text: &str) -> Value {
        Value::quoted(text)
    }

    fn term(op: Operator, field: Value, phrase: Value) -> Node {
        Node::term(op, field, Phrase::Single(phrase))
    }

    fn exists(field: &str) -> Node {
        Node::term(Operator::Exists, bare(field), Phrase::Exists)
    }

    #[test]
    fn simple_term_with_quoted_phrase() {
        assert_eq!(
            parse_query(r#"field == "Quoted String""#).unwrap(),
            term(Operator::Eq, bare("field"), quoted("Quoted String"))
        );
    }

    #[test]
    fn simple_term_with_bare_phrase() {
        assert_eq!(
            parse_query("subject.age == 32").unwrap(),
            term(Operator::Eq, bare("subject.age"), bare("32"))
        );
    }

    #[test]
    fn like_operator() {
        assert_eq!(
            parse_query("subject.code LIKE %1001").unwrap(),
            term(Operator::Like, bare("subject.code"), bare("%1001"))
        );
        assert_eq!(
            parse_query(r#"subject.code LIKE "%1001""#).unwrap(),
            term(Operator::Like, bare("subject.code"), quoted("%1001"))
        );
    }

    #[test]
    fn quoted_field_with_in_list() {
        assert_eq!(
            parse_query(r#""field name" IN [a]"#).unwrap(),
            Node::term(
                Operator::In,
                quoted("field name"),
                Phrase::List(vec![bare("a")])
            )
        );
        assert_eq!(
            parse_query(r#""field \"name\"" IN [a, b, c]"#).unwrap(),
            Node::term(
                Operator::In,
                quoted("field \"name\""),
                Phrase::List(vec![bare("a"), bare("b"), bare("c")])
            )
        );
        assert_eq!(
            parse_query(r#""field \"name\"" in [a, b, "another value"]"#).unwrap(),
            Node::term(
                Operator::In,
                quoted("field \"name\""),
                Phrase::List(vec![bare("a"), bare("b"), quoted("another value")])
            )
        );
    }

    #[test]
    fn and_expression() {
        assert_eq!(
            parse_query("subject.sex == male and subject.age < 37").unwrap(),
            Node::and(
                term(Operator::Eq, bare("subject.sex"), bare("male")),
                term(Operator::Lt, bare("subject.age"), bare("37"))
            )
        );
    }

    #[test]
    fn not_group() {
        assert_eq!(
            parse_query("not (subject.sex == male and subject.age < 37)").unwrap(),
            Node::not(Node::group(Node::and(
                term(Operator::Eq, bare("subject.sex"), bare("male")),
                term(Operator::Lt, bare("subject.age"), bare("37"))
            )))
        );
    }

    #[test]
    fn not_contains() {
        assert_eq!(
            parse_query("not subject.label contains 666").unwrap(),
            Node::not(term(Operator::Contains, bare("subject.label"), bare("666")))
        );
    }

    #[test]
    fn exists_terms() {
        assert_eq!(
            parse_query("not subject.race exists AND subject.sex exists").unwrap(),
            Node::and(Node::not(exists("subject.race")), exists("subject.sex"))
        );
    }

    #[test]
    fn not_binds_tighter_than_or() {
        assert_eq!(
            parse_query(r#"not a == b or c == "d""#).unwrap(),
            Node::or(
                Node::not(term(Operator::Eq, bare("a"), bare("b"))),
                term(Operator::Eq, bare("c"), quoted("d"))
            )
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        assert_eq!(
            parse_query("a == b or c < d and e =~ f").unwrap(),
            Node::or(
                term(Operator::Eq, bare("a"), bare("b")),
                Node::and(
                    term(Operator::Lt, bare("c"), bare("d")),
                    term(Operator::Matches, bare("e"), bare("f"))
                )
            )
        );

        assert_eq!(
            parse_query("a < b and c < d or e < f").unwrap(),
            Node::or(
                Node::and(
                    term(Operator::Lt, bare("a"), bare("b")),
                    term(Operator::Lt, bare("c"), bare("d"))
                ),
                term(Operator::Lt, bare("e"), bare("f"))
            )
        );
    }

    #[test]
    fn spec_precedence_example() {
        assert_eq!(
            parse_query("a=1 OR b=2 AND c=3").unwrap(),
            Node::or(
                term(Operator::Eq, bare("a"), bare("1")),
                Node::and(
                    term(Operator::Eq, bare("b"), bare("2")),
                    term(Operator::Eq, bare("c"), bare("3"))
                )
            )
        );
    }

    #[test]
    fn unmatched_quote_in_field() {
        let err = parse_query(r#""a == some text"#).unwrap_err();
        assert!(err.errors.iter().any(|e| e.message == "Expected '\"'"));
    }

    #[test]
    fn unmatched_quote_in_phrase() {
        let err = parse_query(r#"a == "some text"#).unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].message, "Expected '\"'");
        assert_eq!(err.errors[0].offset, 5);
    }

    #[test]
    fn unknown_operator_position() {
        let err = parse_query("a\n >> some_text").unwrap_err();
        assert_eq!(err.errors.len(), 1);
        let msg = &err.errors[0];
        assert_eq!(msg.line, 2);
        assert_eq!(msg.column, 2);
        assert_eq!(msg.offset, 3);
        assert_eq!(msg.message, "Unknown operator: '>>'");
    }

    #[test]
    fn columns_count_characters_not_bytes() {
        let err = parse_query("∆ >> b").unwrap_err();
        assert_eq!(err.errors.len(), 1);
        let msg = &err.errors[0];
        assert_eq!(msg.offset, 4);
        assert_eq!(msg.column, 3);
        assert_eq!(msg.message, "Unknown operator: '>>'");
    }

    #[test]
    fn two_unknown_operators_accumulate() {
        let err = parse_query("a >> b and c << d").unwrap_err();
        assert_eq!(err.errors.len(), 2);
        assert_eq!(err.errors[0].message, "Unknown operator: '>>'");
        assert_eq!(err.errors[1].message, "Unknown operator: '<<'");
    }

    #[test]
    fn empty_input() {
        let err = parse_query("").unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].message, "Unexpected end of input!");
    }

    #[test]
    fn trailing_token() {
        let err = parse_query("a == b c").unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].message, "Syntax error at 'c'");
        assert_eq!(err.errors[0].offset, 7);
    }

    #[test]
    fn unclosed_group() {
        let err = parse_query("(a == b").unwrap_err();
        assert_eq!(err.errors[0].message, "Unexpected end of input!");
    }

    #[test]
    fn errors_do_not_leak_between_calls() {
        let _ = parse_query("a >> b").unwrap_err();
        assert!(parse_query("a == b").is_ok());
        let err = parse_query("a >> b").unwrap_err();
        assert_eq!(err.errors.len(), 1);
    }

    #[test]
    fn display_round_trip() {
        let tree = parse_query("(a = b or c < d) and not e > f").unwrap();
        assert_eq!(
            tree.to_string(),
            "And(lhs=Group(Or(lhs=Term(op='=' field='a' phrase='b') \
             rhs=Term(op='<' field='c' phrase='d'))) \
             rhs=Not(Term(op='>' field='e' phrase='f')))"
        );
    }
}
