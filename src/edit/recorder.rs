use regex::Regex;

use super::{origin_of, Editor, Veto};
use crate::compiler::VariableOrigins;
use crate::event::{Event, Term, Triple};

/// Records triple patterns that match every given criterion. Never edits.
#[derive(Debug, Clone, Default)]
pub struct TriplePatternRecorder {
    subject: Option<Regex>,
    predicate: Option<Term>,
    object: Option<Regex>,
    recorded: Vec<Triple>,
}

impl TriplePatternRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the subject origin to match.
    pub fn subject(mut self, origin: Regex) -> Self {
        self.subject = Some(origin);
        self
    }

    pub fn predicate(mut self, predicate: Term) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Require the object origin to match.
    pub fn object(mut self, origin: Regex) -> Self {
        self.object = Some(origin);
        self
    }

    pub fn recorded(&self) -> &[Triple] {
        &self.recorded
    }

    pub fn into_recorded(self) -> Vec<Triple> {
        self.recorded
    }

    fn accepts(&self, triple: &Triple, origins: &VariableOrigins) -> bool {
        let origin_matches = |filter: &Option<Regex>, term: &Term| match filter {
            Some(regex) => origin_of(term, origins).is_some_and(|o| regex.is_match(o.as_str())),
            None => true,
        };
        origin_matches(&self.subject, &triple.subject)
            && origin_matches(&self.object, &triple.object)
            && self
                .predicate
                .as_ref()
                .map_or(true, |p| p.same_resource(&triple.predicate))
    }
}

impl Editor for TriplePatternRecorder {
    fn edit(&mut self, event: &Event, origins: &VariableOrigins, _emit: &mut Vec<Event>) -> Veto {
        if let Event::TriplePattern(triple) = event {
            if self.accepts(triple, origins) {
                self.recorded.push(triple.clone());
            }
        }
        Veto::Pass
    }
}
