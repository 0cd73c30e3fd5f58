//! Edit pass: an ordered chain of pluggable rules over compiled query events.
//!
//! Each [`Editor`] sees every event in turn and returns a [`Veto`]. Events an
//! editor pushes into `emit` are handed downstream before the current event;
//! [`Veto::Skip`] drops the current event and stops the chain for it. Editors
//! resolve variable origins through the map the compiler recorded, and a term
//! without a known origin is never edited.

mod cutter;
mod inserter;
mod recorder;

pub use cutter::{CutWhen, Endpoint, TriplePatternCutter};
pub use inserter::SearchInserter;
pub use recorder::TriplePatternRecorder;

use std::collections::VecDeque;

use tracing::trace;

use crate::compiler::VariableOrigins;
use crate::event::{Event, EventReader, Origin, ReadError, ReadResult, Term};

/// Decision an editor takes on one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Veto {
    Pass,
    Skip,
}

pub trait Editor {
    fn edit(&mut self, event: &Event, origins: &VariableOrigins, emit: &mut Vec<Event>) -> Veto;
}

impl<E: Editor + ?Sized> Editor for &mut E {
    fn edit(&mut self, event: &Event, origins: &VariableOrigins, emit: &mut Vec<Event>) -> Veto {
        (**self).edit(event, origins, emit)
    }
}

/// Origin of a term: the recorded origin for variables, the carried one
/// otherwise.
pub fn origin_of<'a>(term: &'a Term, origins: &'a VariableOrigins) -> Option<&'a Origin> {
    match term.as_var() {
        Some(name) => origins.get(name),
        None => term.origin.as_ref(),
    }
}

/// Pipeline stage applying a chain of editors.
pub struct EditReader<'e, R> {
    upstream: R,
    editors: Vec<Box<dyn Editor + 'e>>,
    origins: VariableOrigins,
    pending: VecDeque<Event>,
    closed: bool,
}

impl<'e, R: EventReader> EditReader<'e, R> {
    pub fn new(upstream: R, editors: Vec<Box<dyn Editor + 'e>>, origins: VariableOrigins) -> Self {
        Self {
            upstream,
            editors,
            origins,
            pending: VecDeque::new(),
            closed: false,
        }
    }

    /// Pull upstream until something is ready for downstream.
    fn fill(&mut self) -> ReadResult<()> {
        while self.pending.is_empty() {
            let Some(event) = self.upstream.next_event()? else {
                return Ok(());
            };
            let mut emit = Vec::new();
            let mut veto = Veto::Pass;
            for editor in self.editors.iter_mut() {
                veto = editor.edit(&event, &self.origins, &mut emit);
                if veto == Veto::Skip {
                    break;
                }
            }
            self.pending.extend(emit);
            match veto {
                Veto::Pass => self.pending.push_back(event),
                Veto::Skip => trace!(?event, "event vetoed"),
            }
        }
        Ok(())
    }
}

impl<'e, R: EventReader> EventReader for EditReader<'e, R> {
    fn next_event(&mut self) -> ReadResult<Option<Event>> {
        if self.closed {
            return Err(ReadError::Closed);
        }
        self.fill()?;
        Ok(self.pending.pop_front())
    }

    fn has_next(&mut self) -> ReadResult<bool> {
        if self.closed {
            return Err(ReadError::Closed);
        }
        self.fill()?;
        Ok(!self.pending.is_empty())
    }

    fn close(&mut self) -> ReadResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.pending.clear();
        self.upstream.close()
    }
}
