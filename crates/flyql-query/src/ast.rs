//! FlyQL abstract syntax tree.
//!
//! Pure data produced by the parser and consumed by query compilers. Nodes
//! are structurally comparable so tests can assert whole trees, and
//! [`Node`]'s `Display` renders a stable one-line form suitable for golden
//! assertions.

use std::fmt;

use serde::Serialize;

/// A comparison operator in a [`Node::Term`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=` / `==`.
    Eq,
    /// `!=` / `<>`.
    Ne,
    /// `<`.
    Lt,
    /// `<=`.
    Lte,
    /// `>`.
    Gt,
    /// `>=`.
    Gte,
    /// `IN` list membership.
    In,
    /// `LIKE` with SQL-style wildcards.
    Like,
    /// `CONTAINS` full-text match.
    Contains,
    /// `EXISTS` field presence.
    Exists,
    /// `=~` regex match.
    Matches,
    /// `!~` negated regex match.
    NotMatches,
}

impl Operator {
    /// The canonical source spelling of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::In => "in",
            Self::Like => "like",
            Self::Contains => "contains",
            Self::Exists => "exists",
            Self::Matches => "=~",
            Self::NotMatches => "!~",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A literal value carrying its quoting provenance.
///
/// A quoted `"32"` and a bare `32` have identical text but compile
/// differently, so the distinction is threaded from the lexer all the way
/// into the compiler rather than being re-derived from the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Value {
    /// The literal text (unescaped, for quoted origins).
    pub text: String,
    /// Whether the literal was written as a quoted string.
    pub quoted: bool,
}

impl Value {
    /// Creates a value lexed from a bare identifier.
    pub fn bare(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: false,
        }
    }

    /// Creates a value lexed from a quoted string.
    pub fn quoted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: true,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// The right-hand side of a term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phrase {
    /// A single comparison value.
    Single(Value),
    /// A list of values (`IN` operator).
    List(Vec<Value>),
    /// No value: bare `field EXISTS`.
    Exists,
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(value) => write!(f, "{value}"),
            Self::List(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            Self::Exists => write!(f, "true"),
        }
    }
}

/// A parsed query expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A single comparison: `field <op> phrase`.
    Term {
        /// The comparison operator.
        op: Operator,
        /// The field being searched.
        field: Value,
        /// The basis for comparison.
        phrase: Phrase,
    },

    /// A parenthesized expression; transparent at compile time.
    Group(Box<Self>),

    /// Negation: results must NOT match the inner expression.
    Not(Box<Self>),

    /// Conjunction of exactly two expressions.
    And {
        /// Left-hand side.
        lhs: Box<Self>,
        /// Right-hand side.
        rhs: Box<Self>,
    },

    /// Disjunction of exactly two expressions.
    Or {
        /// Left-hand side.
        lhs: Box<Self>,
        /// Right-hand side.
        rhs: Box<Self>,
    },
}

impl Node {
    /// Creates a term node.
    pub fn term(op: Operator, field: Value, phrase: Phrase) -> Self {
        Self::Term { op, field, phrase }
    }

    /// Creates a group node.
    pub fn group(expr: Self) -> Self {
        Self::Group(Box::new(expr))
    }

    /// Creates a negation node.
    pub fn not(expr: Self) -> Self {
        Self::Not(Box::new(expr))
    }

    /// Creates a conjunction node.
    pub fn and(lhs: Self, rhs: Self) -> Self {
        Self::And {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Creates a disjunction node.
    pub fn or(lhs: Self, rhs: Self) -> Self {
        Self::Or {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Term { op, field, phrase } => {
                write!(f, "Term(op='{op}' field='{field}' phrase='{phrase}')")
            }
            Self::Group(expr) => write!(f, "Group({expr})"),
            Self::Not(expr) => write!(f, "Not({expr})"),
            Self::And { lhs, rhs } => write!(f, "And(lhs={lhs} rhs={rhs})"),
            Self::Or { lhs, rhs } => write!(f, "Or(lhs={lhs} rhs={rhs})"),
        }
    }
}
