//! Terms carried by structural and query events.
//!
//! A [`Term`] is a [`TermValue`] plus an optional [`Origin`], the structural
//! path of the template element it was derived from. Source-side terms may be
//! anonymous placeholders or blank nodes; after compilation every
//! non-constant term is a variable.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

// =============================================================================
// Origin
// =============================================================================

/// Structural path of a template element, e.g. `/1/2/3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Origin(String);

impl Origin {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `self` is `other` or one of its ancestors.
    ///
    /// Containment is decided on whole path segments, so `/1/2` contains
    /// `/1/2/5` but not `/1/20`.
    pub fn contains(&self, other: &Origin) -> bool {
        if self.0 == other.0 {
            return true;
        }
        let outer = self.0.trim_end_matches('/');
        other
            .0
            .strip_prefix(outer)
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Origin {
    fn from(path: &str) -> Self {
        Origin::new(path)
    }
}

// =============================================================================
// IRIs and literals
// =============================================================================

/// An IRI, either absolute or a compact `prefix:reference`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IriRef {
    Full(String),
    Compact { prefix: String, reference: String },
}

impl IriRef {
    pub fn full(iri: impl Into<String>) -> Self {
        IriRef::Full(iri.into())
    }

    pub fn compact(prefix: impl Into<String>, reference: impl Into<String>) -> Self {
        IriRef::Compact {
            prefix: prefix.into(),
            reference: reference.into(),
        }
    }

    /// The last path segment, fragment, or compact reference.
    pub fn local_name(&self) -> &str {
        match self {
            IriRef::Full(iri) => {
                let iri = iri.trim_end_matches(['/', '#']);
                match iri.rfind(['#', '/', ':']) {
                    Some(pos) => &iri[pos + 1..],
                    None => iri,
                }
            }
            IriRef::Compact { reference, .. } => reference,
        }
    }

    pub fn is_rdf_type(&self) -> bool {
        match self {
            IriRef::Full(iri) => iri.strip_prefix(RDF_NS) == Some("type"),
            IriRef::Compact { prefix, reference } => prefix == "rdf" && reference == "type",
        }
    }
}

/// A plain, typed, or language-tagged literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub lexical: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<IriRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

// =============================================================================
// Terms
// =============================================================================

/// The value of a term, without provenance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermValue {
    /// Free variable, named without the leading `?`.
    Var(String),
    /// Bound IRI or compact reference.
    Iri(IriRef),
    /// Anonymous placeholder; the payload identifies the source resource.
    Placeholder(String),
    Literal(Literal),
    Blank(String),
}

/// A term plus the template element it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    #[serde(flatten)]
    pub value: TermValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
}

impl Term {
    pub fn new(value: TermValue) -> Self {
        Self {
            value,
            origin: None,
        }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Term::new(TermValue::Var(name.into()))
    }

    pub fn iri(iri: impl Into<String>) -> Self {
        Term::new(TermValue::Iri(IriRef::full(iri)))
    }

    pub fn curie(prefix: impl Into<String>, reference: impl Into<String>) -> Self {
        Term::new(TermValue::Iri(IriRef::compact(prefix, reference)))
    }

    pub fn placeholder(id: impl Into<String>) -> Self {
        Term::new(TermValue::Placeholder(id.into()))
    }

    pub fn blank(id: impl Into<String>) -> Self {
        Term::new(TermValue::Blank(id.into()))
    }

    pub fn literal(lexical: impl Into<String>) -> Self {
        Term::new(TermValue::Literal(Literal {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }))
    }

    pub fn typed_literal(lexical: impl Into<String>, datatype: IriRef) -> Self {
        Term::new(TermValue::Literal(Literal {
            lexical: lexical.into(),
            datatype: Some(datatype),
            language: None,
        }))
    }

    pub fn lang_literal(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Term::new(TermValue::Literal(Literal {
            lexical: lexical.into(),
            datatype: None,
            language: Some(language.into()),
        }))
    }

    pub fn with_origin(mut self, origin: impl Into<Origin>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn as_var(&self) -> Option<&str> {
        match &self.value {
            TermValue::Var(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_iri(&self) -> Option<&IriRef> {
        match &self.value {
            TermValue::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn is_var(&self) -> bool {
        matches!(self.value, TermValue::Var(_))
    }

    /// IRIs and literals: terms that match themselves in a pattern.
    pub fn is_constant(&self) -> bool {
        matches!(self.value, TermValue::Iri(_) | TermValue::Literal(_))
    }

    /// Compare the denoted resource, ignoring provenance.
    pub fn same_resource(&self, other: &Term) -> bool {
        self.value == other.value
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            TermValue::Var(name) => write!(f, "?{}", name),
            TermValue::Iri(IriRef::Full(iri)) => write!(f, "<{}>", iri),
            TermValue::Iri(IriRef::Compact { prefix, reference }) => {
                write!(f, "{}:{}", prefix, reference)
            }
            TermValue::Placeholder(id) => write!(f, "[{}]", id),
            TermValue::Literal(lit) => write!(f, "{:?}", lit.lexical),
            TermValue::Blank(id) => write!(f, "_:{}", id),
        }
    }
}

// =============================================================================
// Triples
// =============================================================================

/// A subject/predicate/object statement.
///
/// `inverse` marks a triple attached to its block through a reverse link: the
/// block's subject sits in the object position and the far endpoint is the
/// subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    #[serde(default)]
    pub inverse: bool,
}

impl Triple {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
            inverse: false,
        }
    }

    pub fn reversed(mut self) -> Self {
        self.inverse = true;
        self
    }

    /// The endpoint attached to the enclosing subject block.
    pub fn near(&self) -> &Term {
        if self.inverse {
            &self.object
        } else {
            &self.subject
        }
    }

    /// The endpoint reached by following the predicate from the block.
    pub fn far(&self) -> &Term {
        if self.inverse {
            &self.subject
        } else {
            &self.object
        }
    }

    /// Variable names in subject, predicate, object order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        [&self.subject, &self.predicate, &self.object]
            .into_iter()
            .filter_map(Term::as_var)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}
