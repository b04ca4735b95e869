//! FlyQL lexer (tokenizer).
//!
//! Converts a query string into a flat token stream for the parser and the
//! partial parser. Lexing never fails: characters that match no rule are
//! skipped and an unterminated quoted string becomes an
//! [`TokenKind::UnmatchedQuote`] token that the full parser later rejects.

/// The kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A bare identifier (field name or unquoted value).
    Id,
    /// A quoted string with its escapes resolved.
    Quoted,
    /// An opening quote that never found its closing quote.
    UnmatchedQuote,

    /// The `AND` keyword.
    And,
    /// The `OR` keyword.
    Or,
    /// The `NOT` keyword.
    Not,
    /// The `IN` keyword.
    In,
    /// The `LIKE` keyword.
    Like,
    /// The `CONTAINS` keyword.
    Contains,
    /// The `EXISTS` keyword.
    Exists,

    /// `=` or `==`.
    Equals,
    /// `!=` or `<>`.
    NotEquals,
    /// `<`.
    LessThan,
    /// `<=`.
    LessEquals,
    /// `>`.
    GreaterThan,
    /// `>=`.
    GreaterEquals,
    /// `=~` (regex match).
    Matches,
    /// `!~` (negated regex match).
    NotMatches,

    /// `,`.
    Comma,
    /// `[`.
    LBracket,
    /// `]`.
    RBracket,
    /// `(`.
    LParen,
    /// `)`.
    RParen,
}

impl TokenKind {
    /// Whether this kind carries identifier-like text (field or value).
    pub fn is_identifier(self) -> bool {
        matches!(self, Self::Id | Self::Quoted | Self::UnmatchedQuote)
    }

    /// Whether this kind sits in operator position between a field and a
    /// phrase. `EXISTS` is excluded: it terminates a term on its own.
    pub fn is_operator(self) -> bool {
        matches!(
            self,
            Self::Equals
                | Self::NotEquals
                | Self::LessThan
                | Self::LessEquals
                | Self::GreaterThan
                | Self::GreaterEquals
                | Self::Matches
                | Self::NotMatches
                | Self::In
                | Self::Like
                | Self::Contains
        )
    }
}

/// A token in a FlyQL query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What was lexed.
    pub kind: TokenKind,
    /// The token text. For quoted tokens this is the unescaped interior;
    /// for everything else, the exact source slice.
    pub text: String,
    /// Absolute byte offset of the token start (the opening quote for
    /// quoted tokens).
    pub offset: usize,
    /// 1-indexed line the token starts on.
    pub line: usize,
}

/// Characters that cannot appear in a bare identifier. A value containing
/// any of these must be written as a quoted string.
pub const ID_RESTRICTED_CHARS: &str = ",[]() \t\n\\\"";

/// Escape resolution rules, applied sequentially in this order. Resolving
/// quote and newline escapes before `\\` keeps a resolved backslash from
/// being re-interpreted.
const UNESCAPE_RULES: [(&str, &str); 3] = [("\\\"", "\""), ("\\n", "\n"), ("\\\\", "\\")];

/// Reserved words, matched case-insensitively against identifier runs.
const KEYWORDS: [(&str, TokenKind); 7] = [
    ("AND", TokenKind::And),
    ("OR", TokenKind::Or),
    ("NOT", TokenKind::Not),
    ("IN", TokenKind::In),
    ("LIKE", TokenKind::Like),
    ("CONTAINS", TokenKind::Contains),
    ("EXISTS", TokenKind::Exists),
];

/// Symbolic operators, matched exactly against identifier runs.
const OPERATORS: [(&str, TokenKind); 10] = [
    ("=", TokenKind::Equals),
    ("==", TokenKind::Equals),
    ("!=", TokenKind::NotEquals),
    ("<>", TokenKind::NotEquals),
    ("<", TokenKind::LessThan),
    ("<=", TokenKind::LessEquals),
    (">", TokenKind::GreaterThan),
    (">=", TokenKind::GreaterEquals),
    ("=~", TokenKind::Matches),
    ("!~", TokenKind::NotMatches),
];

/// Resolves the supported escape sequences in a quoted string interior.
pub(crate) fn unescape_str(s: &str) -> String {
    UNESCAPE_RULES
        .iter()
        .fold(s.to_string(), |acc, (find, replace)| acc.replace(find, replace))
}

/// Escapes `s` for use as an identifier in query text.
///
/// If `s` contains any restricted character it is escaped (the inverse of
/// the lexer's unescape rules, applied in reverse order) and wrapped in
/// quotes; otherwise it is returned unchanged. Re-lexing the result always
/// yields a single token whose text equals `s`.
pub fn escape_id(s: &str) -> String {
    if !s.chars().any(|c| ID_RESTRICTED_CHARS.contains(c)) {
        return s.to_string();
    }

    let mut escaped = s.to_string();
    for (replace, find) in UNESCAPE_RULES.iter().rev() {
        escaped = escaped.replace(find, replace);
    }
    format!("\"{escaped}\"")
}

/// Tokenizes a query string.
struct Lexer {
    /// Decoded characters with their byte offsets.
    chars: Vec<(usize, char)>,
    /// Total byte length of the input.
    len: usize,
    /// Current index into `chars`.
    cursor: usize,
    /// Current 1-indexed line.
    line: usize,
}

impl Lexer {
    /// Creates a new lexer for the given input.
    fn new(input: &str) -> Self {
        Self {
            chars: input.char_indices().collect(),
            len: input.len(),
            cursor: 0,
            line: 1,
        }
    }

    /// Tokenizes the entire input.
    fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    /// Returns the character at the cursor, if any.
    fn peek(&self) -> Option<char> {
        self.chars.get(self.cursor).map(|&(_, c)| c)
    }

    /// Byte offset of the cursor.
    fn offset(&self) -> usize {
        self.chars.get(self.cursor).map_or(self.len, |&(off, _)| off)
    }

    /// Advances the cursor by one character.
    fn advance(&mut self) {
        self.cursor += 1;
    }

    /// Returns the next token, or `None` at end of input.
    ///
    /// Whitespace is skipped (newlines advance the line counter) and
    /// characters that match no rule are skipped silently.
    fn next_token(&mut self) -> Option<Token> {
        loop {
            let ch = self.peek()?;
            match ch {
                '\n' => {
                    self.line += 1;
                    self.advance();
                }
                ch if ch.is_whitespace() => self.advance(),
                ',' | '[' | ']' | '(' | ')' => return Some(self.read_literal(ch)),
                '"' => {
                    // A quote with an invalid escape in its interior is
                    // itself an illegal character; resume right after it.
                    if let Some(token) = self.read_quoted() {
                        return Some(token);
                    }
                }
                '\'' => self.advance(),
                _ => return Some(self.read_identifier()),
            }
        }
    }

    /// Reads a single-character literal token.
    fn read_literal(&mut self, ch: char) -> Token {
        let kind = match ch {
            ',' => TokenKind::Comma,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '(' => TokenKind::LParen,
            _ => TokenKind::RParen,
        };
        let token = Token {
            kind,
            text: ch.to_string(),
            offset: self.offset(),
            line: self.line,
        };
        self.advance();
        token
    }

    /// Reads a quoted string starting at the cursor.
    ///
    /// Returns a `Quoted` token when the closing quote is found, an
    /// `UnmatchedQuote` token when end-of-input or a raw newline is reached
    /// first, and `None` when the interior contains an invalid escape
    /// sequence (the cursor is then left just past the opening quote).
    fn read_quoted(&mut self) -> Option<Token> {
        let start_cursor = self.cursor;
        let start_offset = self.offset();
        let start_line = self.line;
        self.advance(); // opening quote

        let mut raw = String::new();
        loop {
            match self.peek() {
                Some('"') => {
                    self.advance();
                    return Some(Token {
                        kind: TokenKind::Quoted,
                        text: unescape_str(&raw),
                        offset: start_offset,
                        line: start_line,
                    });
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some(esc @ ('"' | 'n' | '\\')) => {
                            self.advance();
                            raw.push('\\');
                            raw.push(esc);
                        }
                        _ => {
                            // Invalid escape: the quoted match fails and
                            // only the opening quote is discarded.
                            self.cursor = start_cursor + 1;
                            return None;
                        }
                    }
                }
                Some('\n') => {
                    self.advance();
                    self.line += 1;
                    raw.push('\n');
                    return Some(Token {
                        kind: TokenKind::UnmatchedQuote,
                        text: unescape_str(&raw),
                        offset: start_offset,
                        line: start_line,
                    });
                }
                Some(ch) => {
                    self.advance();
                    raw.push(ch);
                }
                None => {
                    return Some(Token {
                        kind: TokenKind::UnmatchedQuote,
                        text: unescape_str(&raw),
                        offset: start_offset,
                        line: start_line,
                    });
                }
            }
        }
    }

    /// Reads a maximal identifier run, then classifies it as a keyword,
    /// symbolic operator, or bare identifier.
    fn read_identifier(&mut self) -> Token {
        let start_offset = self.offset();
        let mut text = String::new();

        while let Some(ch) = self.peek() {
            if ch == '\'' || ch == '"' || ch.is_whitespace() || ",[]()".contains(ch) {
                break;
            }
            text.push(ch);
            self.advance();
        }

        let kind = KEYWORDS
            .iter()
            .find(|(word, _)| text.eq_ignore_ascii_case(word))
            .or_else(|| OPERATORS.iter().find(|(op, _)| text == *op))
            .map_or(TokenKind::Id, |&(_, kind)| kind);

        Token {
            kind,
            text,
            offset: start_offset,
            line: self.line,
        }
    }
}

/// Tokenizes a query string. Never fails; see the module docs for how
/// malformed input degrades.
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize()
}
