//! Query compiler.
//!
//! Lowers a FlyQL AST into an Elasticsearch bool/term/range query
//! document. Operator semantics decide whether the analyzed field or its
//! `.raw` (keyword) variant is queried, and bare literals are coerced to
//! booleans, numbers, or date strings by shape; quoted literals are taken
//! verbatim against the `.raw` field.

use std::sync::LazyLock;

use flyql_query::{Node, Operator, Phrase, Value};
use regex::Regex;
use serde_json::{Map, Value as Json, json};

/// Boolean literal shape.
static RE_BOOL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(true|false)$").unwrap());

/// Integer literal shape.
static RE_INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+$").unwrap());

/// Decimal literal shape.
static RE_DECIMAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+\.\d+$").unwrap());

/// Date with optional timestamp, fractional seconds, and timezone offset.
static RE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}(T\d{2}:\d{2}:\d{2}([.,]\d+)?(Z|([+-]\d{2}:\d{2}))?)?$").unwrap()
});

/// Compiles a syntax tree into an Elasticsearch query document.
///
/// The result always has a top-level `bool` query: a single leaf term is
/// wrapped in `{"bool": {"must": [...]}}` so callers can treat every
/// compiled query uniformly.
pub fn to_query(tree: &Node) -> Json {
    let result = compile_node(tree);
    if result.get("bool").is_some() {
        result
    } else {
        wrap_must(result)
    }
}

/// Compiles any node by exhaustive dispatch on its variant.
fn compile_node(node: &Node) -> Json {
    match node {
        Node::Term { op, field, phrase } => compile_term(*op, field, phrase),
        Node::Group(expr) => compile_node(expr),
        Node::Not(expr) => wrap_must_not(compile_node(expr)),
        Node::And { lhs, rhs } => {
            json!({"bool": {"must": [compile_node(lhs), compile_node(rhs)]}})
        }
        Node::Or { lhs, rhs } => {
            json!({"bool": {"should": [compile_node(lhs), compile_node(rhs)]}})
        }
    }
}

/// Compiles a single comparison term.
fn compile_term(op: Operator, field: &Value, phrase: &Phrase) -> Json {
    let raw_field = format!("{}.raw", field.text);

    match op {
        Operator::Eq => {
            let (picked, converted) = convert_term(scalar(op, phrase), &field.text, &raw_field);
            json!({"term": object(picked, converted)})
        }
        Operator::Ne => {
            let (picked, converted) = convert_term(scalar(op, phrase), &field.text, &raw_field);
            wrap_must_not(json!({"term": object(picked, converted)}))
        }
        Operator::Lt | Operator::Lte | Operator::Gt | Operator::Gte => {
            let (picked, converted) = convert_term(scalar(op, phrase), &field.text, &raw_field);
            let bound = match op {
                Operator::Lt => "lt",
                Operator::Lte => "lte",
                Operator::Gt => "gt",
                _ => "gte",
            };
            json!({"range": object(picked, object(bound.to_string(), converted))})
        }
        Operator::In => {
            // List elements are never type-coerced: membership is always
            // tested against the keyword field with the values as given.
            let Phrase::List(items) = phrase else {
                unreachable!("IN term built without a list phrase");
            };
            let values: Vec<Json> = items.iter().map(|item| json!(item.text)).collect();
            json!({"terms": object(raw_field, Json::Array(values))})
        }
        Operator::Like => {
            // SQL-style wildcards to Elasticsearch wildcards.
            let translated = scalar(op, phrase).text.replace('%', "*").replace('_', "?");
            json!({"wildcard": object(raw_field, json!(translated))})
        }
        Operator::Contains => {
            // Full-text match against the analyzed field.
            json!({"match": object(field.text.clone(), json!(scalar(op, phrase).text))})
        }
        Operator::Exists => json!({"exists": {"field": field.text}}),
        Operator::Matches => {
            json!({"regexp": object(raw_field, json!(scalar(op, phrase).text))})
        }
        Operator::NotMatches => {
            wrap_must_not(json!({"regexp": object(raw_field, json!(scalar(op, phrase).text))}))
        }
    }
}

/// Extracts the scalar value of a phrase.
///
/// The grammar only builds list phrases for `IN` and empty phrases for
/// `EXISTS`, so any other combination is a bug in AST construction, not
/// bad user input.
fn scalar(op: Operator, phrase: &Phrase) -> &Value {
    match phrase {
        Phrase::Single(value) => value,
        _ => unreachable!("'{op}' term built without a scalar phrase"),
    }
}

/// Picks the field variant and converts a literal to its primitive type.
///
/// Quoted literals are never type-sniffed: they compare as strings against
/// the `.raw` field. Bare literals are tested against the boolean, integer,
/// decimal, and date shapes in that order; a bare literal matching none of
/// them also compares against the `.raw` field as a string. Primitive and
/// date matches use the analyzed field, which for such mappings has no
/// `.raw` variant.
fn convert_term(value: &Value, field: &str, raw_field: &str) -> (String, Json) {
    if value.quoted {
        return (raw_field.to_string(), json!(value.text));
    }

    let text = value.text.as_str();
    if RE_BOOL.is_match(text) {
        return (field.to_string(), json!(text == "true"));
    }
    if RE_INTEGER.is_match(text)
        && let Ok(number) = text.parse::<i64>()
    {
        return (field.to_string(), json!(number));
    }
    if RE_DECIMAL.is_match(text)
        && let Ok(number) = text.parse::<f64>()
        && number.is_finite()
    {
        return (field.to_string(), json!(number));
    }
    if RE_DATE.is_match(text) {
        return (field.to_string(), json!(text));
    }

    (raw_field.to_string(), json!(text))
}

/// Builds a single-entry JSON object with a runtime key.
fn object(key: String, value: Json) -> Json {
    Json::Object(Map::from_iter([(key, value)]))
}

/// Wraps an expression in a `bool.must` clause.
fn wrap_must(expr: Json) -> Json {
    json!({"bool": {"must": [expr]}})
}

/// Wraps an expression in a `bool.must_not` clause.
fn wrap_must_not(expr: Json) -> Json {
    json!({"bool": {"must_not": [expr]}})
}
