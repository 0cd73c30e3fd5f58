//! The context-stack state machine.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use tracing::{debug, trace};

use super::context::{Clause, Context, ContextStack};
use super::lookahead::{self, Material, Placement};
use super::session::{LabelHint, Position, Session, VariableOrigins};
use super::{CompileError, CompileResult, CompilerConfig, QueryType, Rendering};
use crate::event::{BufferedEvents, Event, Term, TermValue, Triple};

/// `PN_PREFIX`, ASCII subset; the empty prefix is allowed.
static PREFIX_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Za-z](?:[A-Za-z0-9_.-]*[A-Za-z0-9_-])?)?$").unwrap());

/// Last optional pattern emitted, and the stack depth it was emitted at.
#[derive(Debug)]
struct Previous {
    pattern: Triple,
    depth: usize,
}

pub(super) struct Compiler<'c> {
    buffer: BufferedEvents,
    config: &'c CompilerConfig,
    session: Session,
    stack: ContextStack,
    /// Source positions already emitted ahead of the cursor.
    emitted: HashSet<usize>,
    previous: Option<Previous>,
    out: Vec<Event>,
    ended: bool,
}

impl<'c> Compiler<'c> {
    pub(super) fn new(buffer: BufferedEvents, config: &'c CompilerConfig) -> Self {
        let mut session = Session::new(config.qualified_labels);
        session.reserve_variables(buffer.events());
        Self {
            buffer,
            config,
            session,
            stack: ContextStack::new(),
            emitted: HashSet::new(),
            previous: None,
            out: Vec::new(),
            ended: false,
        }
    }

    pub(super) fn run(mut self) -> CompileResult<(Vec<Event>, VariableOrigins)> {
        self.start_document()?;
        loop {
            let index = self.buffer.position();
            let Some(event) = self.buffer.next().cloned() else {
                break;
            };
            if self.ended {
                trace!(index, "ignoring event after document end");
                continue;
            }
            self.handle(index, event)?;
        }
        if !self.ended {
            self.end_document()?;
        }
        debug!(
            events = self.out.len(),
            variables = self.session.origins().len(),
            "compiled template"
        );
        Ok((self.out, self.session.into_origins()))
    }

    fn handle(&mut self, index: usize, event: Event) -> CompileResult<()> {
        match event {
            Event::StartDocument | Event::Namespace { .. } | Event::Base { .. } => Ok(()),
            Event::EndDocument => self.end_document(),
            Event::StartSubject { term } => self.start_subject(index, &term),
            Event::EndSubject { term } => self.end_subject(&term),
            Event::Triple(triple) => self.triple(index, &triple),
            other => {
                self.out.push(other);
                Ok(())
            }
        }
    }

    // =========================================================================
    // Document
    // =========================================================================

    fn start_document(&mut self) -> CompileResult<()> {
        self.out.push(Event::StartDocument);
        for event in self.buffer.events() {
            match event {
                Event::Namespace { prefix, .. } if !PREFIX_NAME.is_match(prefix) => {
                    return Err(CompileError::MalformedPrefix(prefix.clone()));
                }
                Event::Base { .. } | Event::Namespace { .. } => self.out.push(event.clone()),
                _ => {}
            }
        }
        match self.config.query {
            QueryType::Select => self.out.push(Event::Select),
            QueryType::Ask => self.out.push(Event::Ask),
            QueryType::Construct => {}
        }
        self.out.push(Event::StartWhere);
        Ok(())
    }

    fn end_document(&mut self) -> CompileResult<()> {
        if let Some(subject) = self.stack.current_subject() {
            return Err(CompileError::UnbalancedSubject(subject.to_string()));
        }
        self.pop_unbound();
        self.out.push(Event::EndWhere);
        self.out.push(Event::EndDocument);
        self.ended = true;
        Ok(())
    }

    // =========================================================================
    // Subjects
    // =========================================================================

    fn start_subject(&mut self, index: usize, term: &Term) -> CompileResult<()> {
        let subject = self.resolve_subject(index, term)?;
        let chained = self.is_chained(&subject);
        debug!(subject = %subject, chained, "start subject");

        if !chained && self.stack.current_subject().is_some() {
            self.close_dangling_branch();
            if let Some(origin) = &term.origin {
                let depth = self.stack.len();
                let promoted = lookahead::promoted_literals(
                    self.buffer.events(),
                    index,
                    origin,
                    &self.emitted,
                );
                for position in promoted {
                    trace!(position, "promoting out-of-order triple");
                    self.optional_at(position)?;
                }
                self.pop_to(depth);
            }
        }

        self.stack.push(Context::block(subject), &mut self.out);

        let scan = lookahead::scan_block(self.buffer.events(), index, &self.emitted);
        for position in &scan.mandatory {
            if let Some(triple) = self.source_triple(*position) {
                self.emitted.insert(*position);
                self.emit(&triple)?;
            }
        }

        if chained {
            match (scan.material(), self.config.rendering) {
                (Material::Singleton, _) => {
                    if let Some(block) = self.stack.top_mut() {
                        block.joined = true;
                    }
                }
                (Material::Multiple, Rendering::Union) => {
                    self.stack.push(Context::optional(), &mut self.out);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn end_subject(&mut self, term: &Term) -> CompileResult<()> {
        self.pop_unbound();
        let expected = self.session.known(term);
        let matches = match (self.stack.top(), &expected) {
            (Some(top), Some(expected)) if top.clause == Clause::Block => top
                .subject
                .as_ref()
                .is_some_and(|subject| subject.same_resource(expected)),
            _ => false,
        };
        if !matches {
            return Err(CompileError::UnbalancedSubject(term.to_string()));
        }
        self.pop();
        Ok(())
    }

    /// Resolve a subject. A placeholder seen here first is labelled after the
    /// first triple of its block that mentions it.
    fn resolve_subject(&mut self, index: usize, term: &Term) -> CompileResult<Term> {
        let anonymous = matches!(term.value, TermValue::Placeholder(_) | TermValue::Blank(_));
        if !anonymous || self.session.known(term).is_some() {
            return self.session.resolve(term, LabelHint::none(Position::Subject));
        }
        let Some(mention) = lookahead::first_mention(self.buffer.events(), index, term).cloned()
        else {
            return self.session.resolve(term, LabelHint::none(Position::Subject));
        };
        let (position, other) = if mention.subject.same_resource(term) {
            (Position::Subject, &mention.object)
        } else {
            (Position::Object, &mention.subject)
        };
        let opposite = self.session.known(other);
        self.session.resolve(
            term,
            LabelHint {
                predicate: Some(&mention.predicate),
                position,
                opposite: opposite.as_ref(),
            },
        )
    }

    /// S continues the previous optional pattern: it is that pattern's far
    /// endpoint, or its subject when the object is a constant.
    fn is_chained(&self, subject: &Term) -> bool {
        self.previous.as_ref().is_some_and(|previous| {
            let pattern = &previous.pattern;
            subject.same_resource(pattern.far())
                || (subject.same_resource(&pattern.subject) && pattern.object.is_constant())
        })
    }

    // =========================================================================
    // Triples
    // =========================================================================

    fn triple(&mut self, index: usize, triple: &Triple) -> CompileResult<()> {
        match lookahead::placement(triple, index, &self.emitted) {
            Placement::Skip => Ok(()),
            Placement::Defer if self.stack.current_subject().is_some() => self.optional(index, triple),
            Placement::Hoist | Placement::Defer => {
                self.emitted.insert(index);
                self.emit(triple).map(|_| ())
            }
        }
    }

    fn optional_at(&mut self, index: usize) -> CompileResult<()> {
        match self.source_triple(index) {
            Some(triple) => self.optional(index, &triple),
            None => Ok(()),
        }
    }

    fn optional(&mut self, index: usize, triple: &Triple) -> CompileResult<()> {
        let joined = self
            .stack
            .top()
            .is_some_and(|top| top.clause == Clause::Block && top.joined);
        if !joined {
            self.close_dangling_branch();
            match self.config.rendering {
                Rendering::Union => {
                    if !self.stack.top().is_some_and(Context::is_container) {
                        if lookahead::is_singleton(self.buffer.events(), index, &self.emitted) {
                            self.stack.push(Context::single_optional(), &mut self.out);
                        } else {
                            self.stack.push(Context::optional(), &mut self.out);
                            self.stack.push(Context::group(), &mut self.out);
                        }
                    } else {
                        self.stack.push(Context::group(), &mut self.out);
                    }
                }
                Rendering::Optional => {
                    self.stack.push(Context::optional(), &mut self.out);
                }
            }
        }
        self.emitted.insert(index);
        let pattern = self.emit(triple)?;
        self.previous = Some(Previous {
            pattern,
            depth: self.stack.len(),
        });
        Ok(())
    }

    /// Resolve `triple`, emit it as a pattern, and return the resolved form
    /// with its direction kept.
    fn emit(&mut self, triple: &Triple) -> CompileResult<Triple> {
        let (near_position, far_position) = if triple.inverse {
            (Position::Object, Position::Subject)
        } else {
            (Position::Subject, Position::Object)
        };
        let near = self.session.resolve(
            triple.near(),
            LabelHint {
                predicate: Some(&triple.predicate),
                position: near_position,
                opposite: None,
            },
        )?;
        let predicate = self
            .session
            .resolve(&triple.predicate, LabelHint::none(Position::Predicate))?;
        let far = self.session.resolve(
            triple.far(),
            LabelHint {
                predicate: Some(&triple.predicate),
                position: far_position,
                opposite: Some(&near),
            },
        )?;
        let (subject, object) = if triple.inverse {
            (far, near)
        } else {
            (near, far)
        };
        let resolved = Triple {
            subject,
            predicate,
            object,
            inverse: triple.inverse,
        };
        trace!(pattern = %resolved, "emit pattern");
        self.out.push(Event::TriplePattern(Triple {
            inverse: false,
            ..resolved.clone()
        }));
        self.stack.note_pattern();
        Ok(resolved)
    }

    // =========================================================================
    // Stack helpers
    // =========================================================================

    fn close_dangling_branch(&mut self) {
        if self
            .stack
            .top()
            .is_some_and(|top| top.is_branch(self.config.rendering))
        {
            self.pop();
        }
    }

    fn pop(&mut self) {
        self.stack.pop(&mut self.out);
        self.forget_closed();
    }

    /// Close the frames opened above `depth`.
    fn pop_to(&mut self, depth: usize) {
        while self.stack.len() > depth {
            self.pop();
        }
    }

    fn pop_unbound(&mut self) {
        self.stack.pop_unbound(&mut self.out);
        self.forget_closed();
    }

    fn forget_closed(&mut self) {
        if self
            .previous
            .as_ref()
            .is_some_and(|previous| self.stack.len() < previous.depth)
        {
            self.previous = None;
        }
    }

    fn source_triple(&self, index: usize) -> Option<Triple> {
        match self.buffer.get(index) {
            Some(Event::Triple(triple)) => Some(triple.clone()),
            _ => None,
        }
    }
}
