use regex::Regex;
use tracing::{debug, warn};

use super::{origin_of, Editor, Veto};
use crate::compiler::VariableOrigins;
use crate::event::{Event, Term, Triple};

/// Adds a case-insensitive text search on the subjects of matching elements.
///
/// After a subject start whose origin matches, it inserts
/// `?s <predicate> ?s_search` and `FILTER regex(?s_search, "value", "i")`.
#[derive(Debug, Clone)]
pub struct SearchInserter {
    origin: Regex,
    predicate: Term,
    value: String,
}

impl SearchInserter {
    pub fn new(origin: Regex, predicate: Term, value: impl Into<String>) -> Self {
        Self {
            origin,
            predicate,
            value: value.into(),
        }
    }
}

impl Editor for SearchInserter {
    fn edit(&mut self, event: &Event, origins: &VariableOrigins, emit: &mut Vec<Event>) -> Veto {
        let Event::StartSubject { term } = event else {
            return Veto::Pass;
        };
        let Some(origin) = origin_of(term, origins) else {
            return Veto::Pass;
        };
        if !self.origin.is_match(origin.as_str()) {
            return Veto::Pass;
        }
        let Some(name) = term.as_var() else {
            warn!(subject = %term, "search target is not a variable; skipping");
            return Veto::Pass;
        };
        debug!(subject = %term, %origin, "inserting search filter");

        let search = Term::var(search_name(name, origins));
        emit.push(event.clone());
        emit.push(Event::TriplePattern(Triple::new(
            term.clone(),
            self.predicate.clone(),
            search.clone(),
        )));
        emit.push(Event::StartFilter);
        emit.push(Event::StartCall {
            name: "regex".to_string(),
        });
        emit.push(Event::VarOrTerm { term: search });
        emit.push(Event::VarOrTerm {
            term: Term::literal(regex::escape(&self.value)),
        });
        emit.push(Event::VarOrTerm {
            term: Term::literal("i"),
        });
        emit.push(Event::EndCall);
        emit.push(Event::EndFilter);
        Veto::Skip
    }
}

/// `{name}_search`, numbered when a compiled variable already has that name.
fn search_name(name: &str, origins: &VariableOrigins) -> String {
    let base = format!("{}_search", name);
    if !origins.contains_key(&base) {
        return base;
    }
    (1..)
        .map(|n| format!("{}{}", base, n))
        .find(|candidate| !origins.contains_key(candidate))
        .unwrap_or(base)
}
