//! SPARQL tokens - the atomic units of query text.

use crate::event::{IriRef, Literal, Term, TermValue};

/// SPARQL token - every element the writer can output.
///
/// Adding a new variant here will cause compile errors everywhere
/// it needs to be handled (exhaustive matching).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // === Keywords ===
    Base,
    Prefix,
    Select,
    Reduced,
    Ask,
    Construct,
    Where,
    Optional,
    Union,
    Graph,
    Exists,
    Filter,
    OrderBy,
    /// `a`, the `rdf:type` shorthand.
    A,

    // === Punctuation ===
    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,
    Dot,
    Star,
    DoubleCaret,

    // === Whitespace / Formatting ===
    Space,
    Newline,
    /// Indentation of `n` spaces.
    Indent(usize),

    // === Dynamic Content ===
    /// Variable, written with a leading `?`.
    Var(String),
    /// Absolute IRI, written in angle brackets.
    Iri(String),
    PrefixedName { prefix: String, local: String },
    /// Prefix declaration label, written with its trailing colon.
    PrefixLabel(String),
    /// String literal body; quoted and escaped on output.
    LitString(String),
    /// Language tag without the `@`.
    LangTag(String),
    BlankNode(String),
    /// Built-in call name. Built-ins are upper-cased, prefixed names are
    /// kept as written.
    FunctionName(String),
    Comment(String),

    // === Escape Hatch ===
    /// Text passed through as-is. Never use for user input.
    Raw(String),
}

impl Token {
    /// Serialize this token to query text.
    pub fn serialize(&self) -> String {
        match self {
            // Keywords
            Token::Base => "BASE".into(),
            Token::Prefix => "PREFIX".into(),
            Token::Select => "SELECT".into(),
            Token::Reduced => "REDUCED".into(),
            Token::Ask => "ASK".into(),
            Token::Construct => "CONSTRUCT".into(),
            Token::Where => "WHERE".into(),
            Token::Optional => "OPTIONAL".into(),
            Token::Union => "UNION".into(),
            Token::Graph => "GRAPH".into(),
            Token::Exists => "EXISTS".into(),
            Token::Filter => "FILTER".into(),
            Token::OrderBy => "ORDER BY".into(),
            Token::A => "a".into(),

            // Punctuation
            Token::LBrace => "{".into(),
            Token::RBrace => "}".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),
            Token::Comma => ",".into(),
            Token::Dot => ".".into(),
            Token::Star => "*".into(),
            Token::DoubleCaret => "^^".into(),

            // Whitespace
            Token::Space => " ".into(),
            Token::Newline => "\n".into(),
            Token::Indent(n) => " ".repeat(*n),

            // Dynamic
            Token::Var(name) => format!("?{}", name),
            Token::Iri(iri) => format!("<{}>", escape_iri(iri)),
            Token::PrefixedName { prefix, local } => format!("{}:{}", prefix, local),
            Token::PrefixLabel(prefix) => format!("{}:", prefix),
            Token::LitString(s) => quote_string(s),
            Token::LangTag(tag) => format!("@{}", tag),
            Token::BlankNode(id) => format!("_:{}", id),
            Token::FunctionName(name) => {
                if name.contains(':') {
                    name.clone()
                } else {
                    name.to_uppercase()
                }
            }
            Token::Comment(text) => format!("# {}", text.replace(['\n', '\r'], " ")),

            // Escape hatch
            Token::Raw(s) => s.clone(),
        }
    }

    /// Tokens for a term in pattern or expression position.
    pub fn term(term: &Term) -> Vec<Token> {
        match &term.value {
            TermValue::Var(name) => vec![Token::Var(name.clone())],
            TermValue::Iri(iri) => vec![Token::iri(iri)],
            TermValue::Literal(literal) => Token::literal(literal),
            TermValue::Placeholder(id) | TermValue::Blank(id) => vec![Token::BlankNode(id.clone())],
        }
    }

    pub fn iri(iri: &IriRef) -> Token {
        match iri {
            IriRef::Full(iri) => Token::Iri(iri.clone()),
            IriRef::Compact { prefix, reference } => Token::PrefixedName {
                prefix: prefix.clone(),
                local: reference.clone(),
            },
        }
    }

    fn literal(literal: &Literal) -> Vec<Token> {
        let mut tokens = vec![Token::LitString(literal.lexical.clone())];
        if let Some(language) = &literal.language {
            tokens.push(Token::LangTag(language.clone()));
        } else if let Some(datatype) = &literal.datatype {
            tokens.push(Token::DoubleCaret);
            tokens.push(Token::iri(datatype));
        }
        tokens
    }
}

fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Percent-encode the characters IRIREF forbids.
fn escape_iri(iri: &str) -> String {
    let mut out = String::with_capacity(iri.len());
    for c in iri.chars() {
        match c {
            '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' | ' ' => {
                out.push_str(&format!("%{:02X}", c as u32))
            }
            c => out.push(c),
        }
    }
    out
}

/// A stream of tokens that can be serialized to query text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty token stream.
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    /// Push a single token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Extend with multiple tokens.
    pub fn extend(&mut self, tokens: impl IntoIterator<Item = Token>) -> &mut Self {
        self.tokens.extend(tokens);
        self
    }

    /// Append another token stream.
    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    /// Serialize all tokens to query text.
    pub fn serialize(&self) -> String {
        self.tokens.iter().map(Token::serialize).collect()
    }

    // Convenience methods for common tokens
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn newline(&mut self) -> &mut Self {
        self.push(Token::Newline)
    }
    pub fn indent(&mut self, n: usize) -> &mut Self {
        self.push(Token::Indent(n))
    }
    pub fn term(&mut self, term: &Term) -> &mut Self {
        self.extend(Token::term(term))
    }
}
