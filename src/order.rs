//! Deterministic result ordering.
//!
//! [`OrderedReader`] watches the variables each `WHERE`, group or `UNION`
//! branch mentions and, when the outermost `WHERE` closes, injects an
//! `ORDER BY` listing them innermost scope first. `OPTIONAL` and `GRAPH` are
//! not scopes: their variables append to the enclosing one. Variables only
//! seen inside `EXISTS` do not count.

use std::collections::VecDeque;

use tracing::debug;

use crate::event::{Event, EventReader, ReadError, ReadResult, Term};

#[derive(Debug, Default)]
struct Frame {
    variables: Vec<String>,
    discarded: bool,
}

impl Frame {
    fn observe(&mut self, term: &Term) {
        if let Some(name) = term.as_var() {
            if !self.variables.iter().any(|seen| seen == name) {
                self.variables.push(name.to_string());
            }
        }
    }
}

/// Pass-through stage that appends `ORDER BY` to the query.
pub struct OrderedReader<R> {
    upstream: R,
    frames: Vec<Frame>,
    ask: bool,
    queued: VecDeque<Event>,
    closed: bool,
}

impl<R: EventReader> OrderedReader<R> {
    pub fn new(upstream: R) -> Self {
        Self {
            upstream,
            frames: Vec::new(),
            ask: false,
            queued: VecDeque::new(),
            closed: false,
        }
    }

    fn observe(&mut self, term: &Term) {
        if let Some(frame) = self.frames.last_mut() {
            frame.observe(term);
        }
    }

    /// Returns the event to hand downstream now.
    fn process(&mut self, event: Event) -> Event {
        match &event {
            Event::Ask => self.ask = true,
            Event::StartWhere | Event::StartGroup | Event::StartUnion => {
                self.frames.push(Frame::default())
            }
            Event::StartGraph { term } => self.observe(term),
            Event::StartExists => self.frames.push(Frame {
                discarded: true,
                ..Frame::default()
            }),
            Event::StartSubject { term } => self.observe(term),
            Event::TriplePattern(triple) => {
                self.observe(&triple.subject);
                self.observe(&triple.predicate);
                self.observe(&triple.object);
            }
            Event::EndWhere | Event::EndGroup | Event::EndUnion | Event::EndExists => {
                return self.close_scope(event)
            }
            _ => {}
        }
        event
    }

    fn close_scope(&mut self, event: Event) -> Event {
        let Some(child) = self.frames.pop() else {
            return event;
        };
        if child.discarded {
            return event;
        }
        match self.frames.last_mut() {
            Some(parent) => {
                let mut merged = child.variables;
                for name in parent.variables.drain(..) {
                    if !merged.contains(&name) {
                        merged.push(name);
                    }
                }
                parent.variables = merged;
                event
            }
            None if matches!(event, Event::EndWhere) && !self.ask && !child.variables.is_empty() => {
                debug!(variables = ?child.variables, "injecting order by");
                self.queued.push_back(event);
                Event::OrderBy {
                    variables: child.variables,
                }
            }
            None => event,
        }
    }
}

impl<R: EventReader> EventReader for OrderedReader<R> {
    fn next_event(&mut self) -> ReadResult<Option<Event>> {
        if self.closed {
            return Err(ReadError::Closed);
        }
        if let Some(event) = self.queued.pop_front() {
            return Ok(Some(event));
        }
        match self.upstream.next_event()? {
            Some(event) => Ok(Some(self.process(event))),
            None => Ok(None),
        }
    }

    fn has_next(&mut self) -> ReadResult<bool> {
        if self.closed {
            return Err(ReadError::Closed);
        }
        if !self.queued.is_empty() {
            return Ok(true);
        }
        self.upstream.has_next()
    }

    fn close(&mut self) -> ReadResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.queued.clear();
        self.upstream.close()
    }
}
