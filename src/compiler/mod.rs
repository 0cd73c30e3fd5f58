//! Template compiler: structural events in, query events out.
//!
//! The compiler buffers the whole structural stream, then walks it once with a
//! stack of [`Context`](context::Context) frames. Nesting and sibling chaining
//! decide whether each optional triple joins its block, opens an `OPTIONAL`,
//! or becomes a `UNION` branch. All naming state lives in a per-compile
//! [`Session`].
//!
//! ```text
//! StartSubject(?this)
//!   Triple(?this ex:name _:n)      → ?this ex:name ?_name .
//!   Triple(?this ex:knows ?friend) → OPTIONAL { ?this ex:knows ?friend . }
//! EndSubject(?this)
//! ```

mod construct;
mod context;
pub mod lookahead;
mod producer;
mod session;

pub use construct::wrap_construct;
pub use context::{Clause, Context, ContextStack};
pub use lookahead::Placement;
pub use session::{LabelHint, Position, Session, VariableOrigins};

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::event::{BufferedEvents, Event, EventReader, ReadError, ReadResult};

// =============================================================================
// Errors
// =============================================================================

/// Hard failures that abort a compile.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Malformed variable name: {0:?}")]
    MalformedVariableName(String),

    #[error("Upstream read failure: {0}")]
    UpstreamReadFailure(#[from] ReadError),

    #[error("Cannot use {term} as {position}")]
    UnresolvedTermKind { term: String, position: &'static str },

    #[error("Unbalanced subject {0}")]
    UnbalancedSubject(String),

    #[error("Malformed namespace prefix: {0:?}")]
    MalformedPrefix(String),
}

pub type CompileResult<T> = Result<T, CompileError>;

// =============================================================================
// Configuration
// =============================================================================

/// Query form of the compiled output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    #[default]
    Select,
    Ask,
    Construct,
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryType::Select => write!(f, "select"),
            QueryType::Ask => write!(f, "ask"),
            QueryType::Construct => write!(f, "construct"),
        }
    }
}

/// How sibling optional triples are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rendering {
    /// One `OPTIONAL` container per block holding `{ } UNION { }` branches.
    #[default]
    Union,
    /// One `OPTIONAL` per optional triple.
    Optional,
}

/// Per-compile settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerConfig {
    pub query: QueryType,
    pub rendering: Rendering,
    /// Prefix synthetic labels with the opposite endpoint variable.
    pub qualified_labels: bool,
}

// =============================================================================
// Entry points
// =============================================================================

/// Compiled query events plus the variable origins recorded on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub events: Vec<Event>,
    pub origins: VariableOrigins,
}

/// Compile a buffered structural stream.
pub fn compile(buffer: BufferedEvents, config: &CompilerConfig) -> CompileResult<Compiled> {
    let (events, origins) = producer::Compiler::new(buffer, config).run()?;
    let events = match config.query {
        QueryType::Construct => wrap_construct(events),
        QueryType::Select | QueryType::Ask => events,
    };
    Ok(Compiled { events, origins })
}

/// Pipeline stage wrapping the compiler as an [`EventReader`].
///
/// The upstream is drained and compiled when the producer is created; the
/// query events are then served one at a time.
pub struct SparqlProducer<R> {
    upstream: R,
    output: VecDeque<Event>,
    origins: VariableOrigins,
    closed: bool,
}

impl<R: EventReader> SparqlProducer<R> {
    /// On failure the upstream is closed before the error is returned.
    pub fn new(mut upstream: R, config: &CompilerConfig) -> CompileResult<Self> {
        match Self::compile_upstream(&mut upstream, config) {
            Ok(compiled) => Ok(Self {
                upstream,
                output: compiled.events.into(),
                origins: compiled.origins,
                closed: false,
            }),
            Err(err) => {
                if let Err(close) = upstream.close() {
                    warn!(error = %close, "failed to close upstream after compile error");
                }
                Err(err)
            }
        }
    }

    fn compile_upstream(upstream: &mut R, config: &CompilerConfig) -> CompileResult<Compiled> {
        let buffer = BufferedEvents::read_from(upstream)?;
        debug!(events = buffer.len(), query = %config.query, "buffered template events");
        compile(buffer, config)
    }

    /// Variable name → origin of the template element it came from.
    pub fn origins(&self) -> &VariableOrigins {
        &self.origins
    }
}

impl<R: EventReader> EventReader for SparqlProducer<R> {
    fn next_event(&mut self) -> ReadResult<Option<Event>> {
        if self.closed {
            return Err(ReadError::Closed);
        }
        Ok(self.output.pop_front())
    }

    fn has_next(&mut self) -> ReadResult<bool> {
        if self.closed {
            return Err(ReadError::Closed);
        }
        Ok(!self.output.is_empty())
    }

    fn close(&mut self) -> ReadResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.output.clear();
        self.upstream.close()
    }
}
