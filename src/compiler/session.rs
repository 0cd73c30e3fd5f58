//! Per-compile naming state.
//!
//! A [`Session`] owns every map the compiler mutates while resolving source
//! terms to query terms: resource identity → label, label → use counter, and
//! variable → first-seen origin. It is created at the start of a compile and
//! dropped at the end.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use inflector::Inflector;
use regex::Regex;
use tracing::trace;

use super::{CompileError, CompileResult};
use crate::event::{Event, Origin, Term, TermValue};

/// Variable name → origin of the template element it was first seen on.
pub type VariableOrigins = BTreeMap<String, Origin>;

static VARIABLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

const FALLBACK_LABEL: &str = "resource";

/// Where a term sits in its triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Subject,
    Predicate,
    Object,
}

impl Position {
    fn name(self) -> &'static str {
        match self {
            Position::Subject => "subject",
            Position::Predicate => "predicate",
            Position::Object => "object",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ResourceKey {
    Placeholder(String),
    Blank(String),
}

/// How a placeholder is reached when it needs a synthetic label.
#[derive(Debug, Clone, Copy)]
pub struct LabelHint<'a> {
    pub predicate: Option<&'a Term>,
    pub position: Position,
    /// Resolved term at the other end of the triple.
    pub opposite: Option<&'a Term>,
}

impl<'a> LabelHint<'a> {
    pub fn none(position: Position) -> Self {
        Self {
            predicate: None,
            position,
            opposite: None,
        }
    }
}

/// Naming state for one compile.
#[derive(Debug, Default)]
pub struct Session {
    resources: HashMap<ResourceKey, String>,
    counters: HashMap<String, usize>,
    taken: HashSet<String>,
    origins: VariableOrigins,
    qualified_labels: bool,
}

impl Session {
    pub fn new(qualified_labels: bool) -> Self {
        Self {
            qualified_labels,
            ..Self::default()
        }
    }

    /// Reserve every named variable in the stream so synthetic labels never
    /// collide with one that appears later.
    pub fn reserve_variables(&mut self, events: &[Event]) {
        for event in events {
            let terms: Vec<&Term> = match event {
                Event::StartSubject { term } | Event::EndSubject { term } => vec![term],
                Event::Triple(triple) | Event::TriplePattern(triple) => {
                    vec![&triple.subject, &triple.predicate, &triple.object]
                }
                _ => continue,
            };
            for name in terms.into_iter().filter_map(Term::as_var) {
                self.taken.insert(name.to_string());
            }
        }
    }

    pub fn origins(&self) -> &VariableOrigins {
        &self.origins
    }

    pub fn into_origins(self) -> VariableOrigins {
        self.origins
    }

    /// The query term `term` already resolved to, without assigning a label.
    pub fn known(&self, term: &Term) -> Option<Term> {
        match &term.value {
            TermValue::Var(name) => Some(self.variable(name)),
            TermValue::Iri(_) | TermValue::Literal(_) => Some(term.clone()),
            TermValue::Placeholder(id) => self
                .resources
                .get(&ResourceKey::Placeholder(id.clone()))
                .map(|label| self.variable(label)),
            TermValue::Blank(id) => self
                .resources
                .get(&ResourceKey::Blank(id.clone()))
                .map(|label| self.variable(label)),
        }
    }

    /// Resolve a source term to its query term.
    pub fn resolve(&mut self, term: &Term, hint: LabelHint<'_>) -> CompileResult<Term> {
        match (&term.value, hint.position) {
            (TermValue::Literal(_), Position::Subject)
            | (
                TermValue::Literal(_) | TermValue::Placeholder(_) | TermValue::Blank(_),
                Position::Predicate,
            ) => Err(CompileError::UnresolvedTermKind {
                term: term.to_string(),
                position: hint.position.name(),
            }),
            (TermValue::Iri(_) | TermValue::Literal(_), _) => Ok(term.clone()),
            (TermValue::Var(name), _) => {
                if !VARIABLE_NAME.is_match(name) {
                    return Err(CompileError::MalformedVariableName(name.clone()));
                }
                self.record_origin(name, term.origin.as_ref());
                Ok(self.variable(name))
            }
            (TermValue::Placeholder(id), _) => {
                Ok(self.resolve_anonymous(ResourceKey::Placeholder(id.clone()), term, hint))
            }
            (TermValue::Blank(id), _) => {
                Ok(self.resolve_anonymous(ResourceKey::Blank(id.clone()), term, hint))
            }
        }
    }

    fn resolve_anonymous(&mut self, key: ResourceKey, term: &Term, hint: LabelHint<'_>) -> Term {
        if let Some(label) = self.resources.get(&key) {
            return self.variable(label);
        }
        let label = self.unique_label(self.synthetic_label(hint));
        trace!(%term, label = %label, "assigned synthetic variable");
        self.record_origin(&label, term.origin.as_ref());
        self.resources.insert(key, label.clone());
        self.variable(&label)
    }

    /// `{opposite}_{base}`, where `base` comes from the predicate local name.
    fn synthetic_label(&self, hint: LabelHint<'_>) -> String {
        let local = hint
            .predicate
            .and_then(Term::as_iri)
            .map(|iri| iri.local_name())
            .unwrap_or(FALLBACK_LABEL);
        let mut base = label_base(local);
        if hint.position == Position::Subject && hint.predicate.is_some() {
            base.push_str("Of");
        }
        let prefix = match hint.opposite.and_then(Term::as_var) {
            Some(name) if self.qualified_labels => name,
            _ => "",
        };
        format!("{}_{}", prefix, base)
    }

    /// Yields `label`, `label1`, `label2`, … skipping names already taken.
    fn unique_label(&mut self, label: String) -> String {
        let counter = self.counters.entry(label.clone()).or_insert(0);
        loop {
            let candidate = if *counter == 0 {
                label.clone()
            } else {
                format!("{}{}", label, counter)
            };
            *counter += 1;
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    fn record_origin(&mut self, name: &str, origin: Option<&Origin>) {
        if let Some(origin) = origin {
            self.origins
                .entry(name.to_string())
                .or_insert_with(|| origin.clone());
        }
    }

    fn variable(&self, name: &str) -> Term {
        Term {
            value: TermValue::Var(name.to_string()),
            origin: self.origins.get(name).cloned(),
        }
    }
}

/// Strip a leading `has`/`in` and camel-case what is left.
fn label_base(local: &str) -> String {
    let stripped = ["has", "in"]
        .iter()
        .find_map(|word| {
            local
                .strip_prefix(word)
                .filter(|rest| rest.starts_with(|c: char| c.is_uppercase()))
        })
        .unwrap_or(local);
    let base: String = stripped
        .to_camel_case()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if base.is_empty() {
        FALLBACK_LABEL.to_string()
    } else {
        base
    }
}
