use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{origin_of, Editor, Veto};
use crate::compiler::VariableOrigins;
use crate::event::Event;

/// Which end of a pattern the cutter inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Subject,
    #[default]
    Object,
}

/// Whether a pattern is cut when the regex matches or when it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutWhen {
    #[default]
    Matches,
    Fails,
}

/// Drops triple patterns by the origin of one endpoint.
#[derive(Debug, Clone)]
pub struct TriplePatternCutter {
    endpoint: Endpoint,
    pattern: Regex,
    when: CutWhen,
}

impl TriplePatternCutter {
    pub fn new(endpoint: Endpoint, pattern: Regex, when: CutWhen) -> Self {
        Self {
            endpoint,
            pattern,
            when,
        }
    }

    /// Cut patterns whose `endpoint` origin matches `pattern`.
    pub fn matching(endpoint: Endpoint, pattern: Regex) -> Self {
        Self::new(endpoint, pattern, CutWhen::Matches)
    }

    /// Cut patterns whose `endpoint` origin does not match `pattern`.
    pub fn failing(endpoint: Endpoint, pattern: Regex) -> Self {
        Self::new(endpoint, pattern, CutWhen::Fails)
    }
}

impl Editor for TriplePatternCutter {
    fn edit(&mut self, event: &Event, origins: &VariableOrigins, _emit: &mut Vec<Event>) -> Veto {
        let Event::TriplePattern(triple) = event else {
            return Veto::Pass;
        };
        let term = match self.endpoint {
            Endpoint::Subject => &triple.subject,
            Endpoint::Object => &triple.object,
        };
        let Some(origin) = origin_of(term, origins) else {
            return Veto::Pass;
        };
        let matched = self.pattern.is_match(origin.as_str());
        let cut = match self.when {
            CutWhen::Matches => matched,
            CutWhen::Fails => !matched,
        };
        if cut {
            debug!(pattern = %triple, %origin, "cut triple pattern");
            Veto::Skip
        } else {
            Veto::Pass
        }
    }
}
