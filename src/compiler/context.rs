//! Context frames of the compiler's nesting stack.

use tracing::trace;

use super::Rendering;
use crate::event::{Event, Term};

/// Clause kind of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Group,
    Optional,
    /// Unbracketed frame of one subject block.
    Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    pub clause: Clause,
    /// Bound subject; only blocks carry one.
    pub subject: Option<Term>,
    /// The most recent child of this frame was a closed group branch.
    pub union: bool,
    opened_as_union: bool,
    /// Block of a chained singleton: its optional triple is emitted inline.
    pub joined: bool,
    /// Optional opened around exactly one pattern rather than as a container.
    pub single: bool,
}

impl Context {
    fn new(clause: Clause) -> Self {
        Self {
            clause,
            subject: None,
            union: false,
            opened_as_union: false,
            joined: false,
            single: false,
        }
    }

    pub fn block(subject: Term) -> Self {
        Self {
            subject: Some(subject),
            ..Self::new(Clause::Block)
        }
    }

    pub fn group() -> Self {
        Self::new(Clause::Group)
    }

    pub fn optional() -> Self {
        Self::new(Clause::Optional)
    }

    pub fn single_optional() -> Self {
        Self {
            single: true,
            ..Self::new(Clause::Optional)
        }
    }

    pub fn is_bound(&self) -> bool {
        self.subject.is_some()
    }

    /// An open alternative in `rendering`: a group in union form, an optional
    /// in optional form.
    pub fn is_branch(&self, rendering: Rendering) -> bool {
        !self.is_bound()
            && match rendering {
                Rendering::Union => self.clause == Clause::Group,
                Rendering::Optional => self.clause == Clause::Optional,
            }
    }

    /// An optional holding union branches.
    pub fn is_container(&self) -> bool {
        self.clause == Clause::Optional && !self.single && !self.is_bound()
    }

    fn start_event(&self) -> Event {
        match (self.clause, &self.subject) {
            (Clause::Block, Some(term)) => Event::StartSubject { term: term.clone() },
            (Clause::Group, _) if self.opened_as_union => Event::StartUnion,
            (Clause::Group, _) | (Clause::Block, None) => Event::StartGroup,
            (Clause::Optional, _) => Event::StartOptional,
        }
    }

    fn end_event(&self) -> Event {
        match (self.clause, &self.subject) {
            (Clause::Block, Some(term)) => Event::EndSubject { term: term.clone() },
            (Clause::Group, _) if self.opened_as_union => Event::EndUnion,
            (Clause::Group, _) | (Clause::Block, None) => Event::EndGroup,
            (Clause::Optional, _) => Event::EndOptional,
        }
    }
}

/// The frame stack plus the union bookkeeping between parent and child.
#[derive(Debug, Default)]
pub struct ContextStack {
    frames: Vec<Context>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn top(&self) -> Option<&Context> {
        self.frames.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Context> {
        self.frames.last_mut()
    }

    /// Open `context` and emit its start event.
    ///
    /// A group opened right after a closed sibling group becomes a `UNION`
    /// branch. Opening any frame clears the parent's union flag.
    pub fn push(&mut self, mut context: Context, out: &mut Vec<Event>) {
        let inherited = match self.frames.last_mut() {
            Some(parent) => std::mem::take(&mut parent.union),
            None => false,
        };
        context.opened_as_union = inherited && context.clause == Clause::Group;
        trace!(clause = ?context.clause, union = context.opened_as_union, depth = self.frames.len(), "open context");
        out.push(context.start_event());
        self.frames.push(context);
    }

    /// Close the innermost frame and emit its end event.
    pub fn pop(&mut self, out: &mut Vec<Event>) -> Option<Context> {
        let context = self.frames.pop()?;
        trace!(clause = ?context.clause, depth = self.frames.len(), "close context");
        out.push(context.end_event());
        if context.clause == Clause::Group {
            if let Some(parent) = self.frames.last_mut() {
                parent.union = true;
            }
        }
        Some(context)
    }

    /// Close unbound frames until a block (or nothing) is on top.
    pub fn pop_unbound(&mut self, out: &mut Vec<Event>) {
        while self.top().is_some_and(|top| !top.is_bound()) {
            self.pop(out);
        }
    }

    /// Record that a pattern was emitted into the innermost frame.
    pub fn note_pattern(&mut self) {
        if let Some(top) = self.frames.last_mut() {
            top.union = false;
        }
    }

    /// Nearest enclosing bound subject.
    pub fn current_subject(&self) -> Option<&Term> {
        self.frames.iter().rev().find_map(|frame| frame.subject.as_ref())
    }
}
