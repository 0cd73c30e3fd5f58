//! Event → query text.

use tracing::trace;

use super::token::{Token, TokenStream};
use crate::event::{Event, EventReader, ReadResult, Term, Triple};

/// Renders a query event stream as SPARQL text.
///
/// Each start/end pair indents its body one level. `BASE`/`PREFIX` lines are
/// held back until the next clause keyword, and `ORDER BY` is written after
/// the closing brace of `WHERE`.
#[derive(Debug)]
pub struct SparqlWriter {
    width: usize,
    depth: usize,
    prologue: TokenStream,
    body: TokenStream,
    order_by: Option<Vec<String>>,
    /// Argument counts of the open built-in calls.
    args: Vec<usize>,
    /// Nesting of filter expressions; content is written inline.
    filters: usize,
}

impl Default for SparqlWriter {
    fn default() -> Self {
        Self::new(2)
    }
}

impl SparqlWriter {
    /// A writer indenting `width` spaces per level.
    pub fn new(width: usize) -> Self {
        Self {
            width,
            depth: 0,
            prologue: TokenStream::new(),
            body: TokenStream::new(),
            order_by: None,
            args: Vec::new(),
            filters: 0,
        }
    }

    /// Render a complete event list.
    pub fn render(events: &[Event], width: usize) -> String {
        let mut writer = Self::new(width);
        for event in events {
            writer.write_event(event);
        }
        writer.finish()
    }

    /// Drain `reader` into the writer. The reader is left open.
    pub fn write_from<R: EventReader + ?Sized>(&mut self, reader: &mut R) -> ReadResult<()> {
        while let Some(event) = reader.next_event()? {
            self.write_event(&event);
        }
        Ok(())
    }

    pub fn write_event(&mut self, event: &Event) {
        trace!(?event, depth = self.depth, "write");
        match event {
            Event::StartDocument | Event::EndDocument => {}
            // Source-side events carry no query text.
            Event::StartSubject { .. } | Event::EndSubject { .. } | Event::Triple(_) => {}

            Event::Base { iri } => {
                self.prologue
                    .push(Token::Base)
                    .space()
                    .push(Token::Iri(iri.clone()))
                    .newline();
            }
            Event::Namespace { prefix, namespace } => {
                self.prologue
                    .push(Token::Prefix)
                    .space()
                    .push(Token::PrefixLabel(prefix.clone()))
                    .space()
                    .push(Token::Iri(namespace.clone()))
                    .newline();
            }

            Event::Select => {
                self.flush_prologue();
                self.line([Token::Select, Token::Space, Token::Reduced, Token::Space, Token::Star]);
            }
            Event::Ask => {
                self.flush_prologue();
                self.line([Token::Ask]);
            }
            Event::StartConstruct => {
                self.flush_prologue();
                self.open([Token::Construct]);
            }
            Event::StartWhere => {
                self.flush_prologue();
                self.open([Token::Where]);
            }
            Event::StartGroup => self.open([]),
            Event::StartOptional => self.open([Token::Optional]),
            Event::StartUnion => self.open([Token::Union]),
            Event::StartGraph { term } => {
                let mut head = vec![Token::Graph];
                head.extend(Token::term(term));
                self.open(head);
            }
            Event::EndWhere => {
                self.close();
                if let Some(variables) = self.order_by.take() {
                    self.body.push(Token::OrderBy);
                    for name in variables {
                        self.body.space().push(Token::Var(name));
                    }
                    self.body.newline();
                }
            }
            Event::EndConstruct
            | Event::EndGroup
            | Event::EndOptional
            | Event::EndUnion
            | Event::EndGraph => self.close(),

            Event::TriplePattern(triple) => self.pattern(triple),

            Event::StartFilter => {
                if self.filters == 0 {
                    self.body.indent(self.depth * self.width);
                } else {
                    self.separate();
                }
                self.filters += 1;
                self.body.push(Token::Filter).space().push(Token::LParen);
            }
            Event::EndFilter => {
                self.body.push(Token::RParen);
                self.filters = self.filters.saturating_sub(1);
                if self.filters == 0 {
                    self.body.newline();
                }
            }
            Event::StartCall { name } => {
                self.separate();
                self.body
                    .push(Token::FunctionName(name.clone()))
                    .push(Token::LParen);
                self.args.push(0);
            }
            Event::EndCall => {
                self.args.pop();
                self.body.push(Token::RParen);
            }
            Event::VarOrTerm { term } => {
                self.separate();
                self.body.term(term);
            }
            Event::StartExists => {
                self.separate();
                self.body.push(Token::Exists).space().push(Token::LBrace).newline();
                self.depth += 1;
            }
            Event::EndExists => {
                self.depth = self.depth.saturating_sub(1);
                self.body
                    .indent(self.depth * self.width)
                    .push(Token::RBrace);
            }

            Event::OrderBy { variables } => self.order_by = Some(variables.clone()),
            Event::Comment { text } => self.line([Token::Comment(text.clone())]),
        }
    }

    /// The rendered text.
    pub fn finish(mut self) -> String {
        self.flush_prologue();
        self.body.serialize()
    }

    fn flush_prologue(&mut self) {
        if !self.prologue.is_empty() {
            self.body.append(&self.prologue);
            self.prologue.clear();
        }
    }

    fn line(&mut self, tokens: impl IntoIterator<Item = Token>) {
        self.body
            .indent(self.depth * self.width)
            .extend(tokens)
            .newline();
    }

    /// `head {` on its own line, then one level deeper.
    fn open(&mut self, head: impl IntoIterator<Item = Token>) {
        let mut tokens: Vec<Token> = head.into_iter().collect();
        if !tokens.is_empty() {
            tokens.push(Token::Space);
        }
        tokens.push(Token::LBrace);
        self.line(tokens);
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line([Token::RBrace]);
    }

    fn pattern(&mut self, triple: &Triple) {
        let mut tokens = Token::term(&triple.subject);
        tokens.push(Token::Space);
        tokens.extend(predicate_tokens(&triple.predicate));
        tokens.push(Token::Space);
        tokens.extend(Token::term(&triple.object));
        tokens.push(Token::Space);
        tokens.push(Token::Dot);
        self.line(tokens);
    }

    /// Comma between the arguments of a call.
    fn separate(&mut self) {
        if let Some(count) = self.args.last_mut() {
            if *count > 0 {
                self.body.push(Token::Comma).space();
            }
            *count += 1;
        }
    }
}

fn predicate_tokens(predicate: &Term) -> Vec<Token> {
    match predicate.as_iri() {
        Some(iri) if iri.is_rdf_type() => vec![Token::A],
        _ => Token::term(predicate),
    }
}
