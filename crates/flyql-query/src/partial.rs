//! Best-effort partial parsing for autocomplete.
//!
//! While a user is mid-query the text usually does not parse, but a UI
//! still wants to know what could be suggested at the cursor: a field
//! name, a value for a known field, or nothing. [`parse_partial`] answers
//! that from the token stream alone and never fails; ambiguous input
//! degrades to "no suggestion".

use serde::Serialize;

use crate::{
    ast::Value,
    lexer::{Token, TokenKind, tokenize},
};

/// What kind of suggestion fits at the end of the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Suggest {
    /// Nothing useful can be suggested.
    None,
    /// The user is typing a field name.
    Field,
    /// The user is typing a value (phrase) for a field.
    Phrase,
}

/// An approximation of the parser state at the end of a partial query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialParseResult {
    /// Absolute byte offset where the token being typed starts. A UI
    /// replaces everything from here to the end with the chosen
    /// suggestion.
    pub offset: usize,
    /// The kind of suggestion to offer.
    pub kind: Suggest,
    /// The text typed so far (unescaped, for quoted tokens).
    pub text: String,
    /// When suggesting a phrase, the field the value belongs to.
    pub last_field: Option<Value>,
}

impl PartialParseResult {
    /// The "no suggestion" result.
    fn none() -> Self {
        Self {
            offset: 0,
            kind: Suggest::None,
            text: String::new(),
            last_field: None,
        }
    }

    /// A suggestion at the given token, without a field association.
    fn at(token: &Token, kind: Suggest) -> Self {
        Self {
            offset: token.offset,
            kind,
            text: token.text.clone(),
            last_field: None,
        }
    }
}

/// Converts an identifier-class token into a [`Value`], keeping quoting
/// provenance.
fn token_value(token: &Token) -> Value {
    if token.kind == TokenKind::Id {
        Value::bare(token.text.clone())
    } else {
        Value::quoted(token.text.clone())
    }
}

/// Analyzes possibly-incomplete query text for autocomplete.
///
/// Total function: every input, however malformed, produces a result.
/// Lexing is lenient, so characters the lexer cannot place are simply
/// absent from consideration.
pub fn parse_partial(query: &str) -> PartialParseResult {
    if query.is_empty() {
        return PartialParseResult::none();
    }

    let tokens = tokenize(query);
    let Some(current) = tokens.last() else {
        return PartialParseResult::none();
    };

    // The cursor sits right after an operator, keyword, or punctuation:
    // nothing is mid-typing.
    if !current.kind.is_identifier() {
        return PartialParseResult::none();
    }

    // A trailing space means the last token is finished rather than being
    // continued. An unmatched quote keeps its trailing whitespace.
    if current.kind != TokenKind::UnmatchedQuote
        && query.chars().next_back().is_some_and(char::is_whitespace)
    {
        return PartialParseResult::none();
    }

    // A single token can only be a field being typed.
    if tokens.len() == 1 {
        return PartialParseResult::at(current, Suggest::Field);
    }

    let previous = &tokens[tokens.len() - 2];

    // Two adjacent identifiers without an operator is ambiguous.
    if previous.kind.is_identifier() {
        return PartialParseResult::none();
    }

    let kind = if previous.kind.is_operator()
        || matches!(previous.kind, TokenKind::LBracket | TokenKind::Comma)
    {
        Suggest::Phrase
    } else {
        Suggest::Field
    };

    let mut result = PartialParseResult::at(current, kind);

    // For a phrase, backtrack to the operator that introduced it and take
    // the identifier before that operator as the field being matched.
    if kind == Suggest::Phrase {
        let mut found_op = false;
        for token in tokens[..tokens.len() - 1].iter().rev() {
            if found_op {
                if token.kind.is_identifier() {
                    result.last_field = Some(token_value(token));
                    break;
                }
            } else if token.kind.is_operator() {
                found_op = true;
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn none() -> PartialParseResult {
        PartialParseResult::none()
    }

    fn field(offset: usize, text: &str) -> PartialParseResult {
        PartialParseResult {
            offset,
            kind: Suggest::Field,
            text: text.to_string(),
            last_field: None,
        }
    }

    fn phrase(offset: usize, text: &str, last_field: Value) -> PartialParseResult {
        PartialParseResult {
            offset,
            kind: Suggest::Phrase,
            text: text.to_string(),
            last_field: Some(last_field),
        }
    }

    #[test]
    fn empty_and_whitespace() {
        assert_eq!(parse_partial(""), none());
        assert_eq!(parse_partial(" "), none());
    }

    #[test]
    fn single_field_being_typed() {
        assert_eq!(parse_partial("file.inf"), field(0, "file.inf"));
        assert_eq!(parse_partial("file.info.bo"), field(0, "file.info.bo"));
    }

    #[test]
    fn trailing_space_ends_the_token() {
        assert_eq!(parse_partial("file.info "), none());
    }

    #[test]
    fn phrase_inside_unmatched_quote() {
        assert_eq!(
            parse_partial(r#"field == "foo bar"#),
            phrase(9, "foo bar", Value::bare("field"))
        );
        // Unmatched quotes keep trailing whitespace.
        assert_eq!(
            parse_partial(r#"field == "foo bar space  "#),
            phrase(9, "foo bar space  ", Value::bare("field"))
        );
        assert_eq!(
            parse_partial(r#"field == "foo \"bar\" qaz"#),
            phrase(9, "foo \"bar\" qaz", Value::bare("field"))
        );
    }

    #[test]
    fn bare_operator_has_no_suggestion() {
        assert_eq!(parse_partial("field ="), none());
    }

    #[test]
    fn field_after_open_paren() {
        assert_eq!(parse_partial("(foo"), field(1, "foo"));
    }

    #[test]
    fn adjacent_identifiers_are_ambiguous() {
        assert_eq!(parse_partial("foo == bar an"), none());
    }

    #[test]
    fn field_after_and_keyword() {
        assert_eq!(parse_partial("foo == bar and qa"), field(15, "qa"));
    }

    #[test]
    fn phrase_after_like() {
        assert_eq!(
            parse_partial("foo LIKE %XYZ"),
            phrase(9, "%XYZ", Value::bare("foo"))
        );
    }

    #[test]
    fn lone_quote_is_an_empty_field() {
        assert_eq!(parse_partial("\""), field(0, ""));
    }

    #[test]
    fn empty_phrase_after_operator() {
        assert_eq!(
            parse_partial("foo >= \""),
            phrase(7, "", Value::bare("foo"))
        );
    }

    #[test]
    fn phrases_inside_lists() {
        assert_eq!(
            parse_partial("foo in [x"),
            phrase(8, "x", Value::bare("foo"))
        );
        assert_eq!(
            parse_partial("foo in [\"x"),
            phrase(8, "x", Value::bare("foo"))
        );
        assert_eq!(
            parse_partial("foo in [\"x\", \"y"),
            phrase(13, "y", Value::bare("foo"))
        );
    }

    #[test]
    fn quoted_last_field_keeps_provenance() {
        assert_eq!(
            parse_partial("\"field name\" == va"),
            phrase(16, "va", Value::quoted("field name"))
        );
    }

    #[test]
    fn serializes_for_api_responses() {
        let result = parse_partial("foo == ba");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["kind"], "phrase");
        assert_eq!(json["offset"], 7);
        assert_eq!(json["text"], "ba");
        assert_eq!(json["last_field"]["text"], "foo");
    }
}
