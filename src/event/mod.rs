//! Event model shared by every stage of the pipeline.
//!
//! Structural events (subjects, triples, namespaces) come from the markup
//! adapter; query events (patterns, brackets, expressions) are produced by the
//! compiler and consumed by the order pass, the edit pass, and the writer.
//! Both sides share one closed enum so that every consumer matches
//! exhaustively.

mod buffer;
mod reader;
mod term;

pub use buffer::BufferedEvents;
pub use reader::{read_all, EventReader, JsonLinesReader, ReadError, ReadResult, VecReader};
pub use term::{IriRef, Literal, Origin, Term, TermValue, Triple, RDF_NS};

use serde::{Deserialize, Serialize};

/// A structural or query-construction event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    StartDocument,
    EndDocument,
    Namespace { prefix: String, namespace: String },
    Base { iri: String },
    StartSubject { term: Term },
    EndSubject { term: Term },
    /// Source-side statement attached to the enclosing subject block.
    Triple(Triple),
    /// Query-side statement rendered inside a group.
    TriplePattern(Triple),
    Select,
    Ask,
    StartConstruct,
    EndConstruct,
    StartWhere,
    EndWhere,
    StartGroup,
    EndGroup,
    StartOptional,
    EndOptional,
    StartUnion,
    EndUnion,
    StartGraph { term: Term },
    EndGraph,
    StartExists,
    EndExists,
    StartFilter,
    EndFilter,
    StartCall { name: String },
    EndCall,
    VarOrTerm { term: Term },
    OrderBy { variables: Vec<String> },
    Comment { text: String },
}

/// Bracketed constructs that must open and close in pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    Subject,
    Construct,
    Where,
    Group,
    Optional,
    Union,
    Graph,
    Exists,
    Filter,
    Call,
}

impl Event {
    pub fn opens(&self) -> Option<Bracket> {
        match self {
            Event::StartSubject { .. } => Some(Bracket::Subject),
            Event::StartConstruct => Some(Bracket::Construct),
            Event::StartWhere => Some(Bracket::Where),
            Event::StartGroup => Some(Bracket::Group),
            Event::StartOptional => Some(Bracket::Optional),
            Event::StartUnion => Some(Bracket::Union),
            Event::StartGraph { .. } => Some(Bracket::Graph),
            Event::StartExists => Some(Bracket::Exists),
            Event::StartFilter => Some(Bracket::Filter),
            Event::StartCall { .. } => Some(Bracket::Call),
            _ => None,
        }
    }

    pub fn closes(&self) -> Option<Bracket> {
        match self {
            Event::EndSubject { .. } => Some(Bracket::Subject),
            Event::EndConstruct => Some(Bracket::Construct),
            Event::EndWhere => Some(Bracket::Where),
            Event::EndGroup => Some(Bracket::Group),
            Event::EndOptional => Some(Bracket::Optional),
            Event::EndUnion => Some(Bracket::Union),
            Event::EndGraph => Some(Bracket::Graph),
            Event::EndExists => Some(Bracket::Exists),
            Event::EndFilter => Some(Bracket::Filter),
            Event::EndCall => Some(Bracket::Call),
            _ => None,
        }
    }
}

/// Error from [`check_brackets`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BracketError {
    #[error("{found:?} closed at event {index} while {expected:?} was open")]
    Mismatched {
        index: usize,
        expected: Bracket,
        found: Bracket,
    },

    #[error("{0:?} closed at event {1} with nothing open")]
    Unopened(Bracket, usize),

    #[error("{0} bracket(s) left open at end of stream")]
    Unclosed(usize),
}

/// Verify that every opened construct is closed exactly once, innermost first.
pub fn check_brackets(events: &[Event]) -> Result<(), BracketError> {
    let mut open = Vec::new();
    for (index, event) in events.iter().enumerate() {
        if let Some(bracket) = event.opens() {
            open.push(bracket);
        } else if let Some(found) = event.closes() {
            match open.pop() {
                Some(expected) if expected == found => {}
                Some(expected) => {
                    return Err(BracketError::Mismatched {
                        index,
                        expected,
                        found,
                    })
                }
                None => return Err(BracketError::Unopened(found, index)),
            }
        }
    }
    if open.is_empty() {
        Ok(())
    } else {
        Err(BracketError::Unclosed(open.len()))
    }
}
