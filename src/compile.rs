//! End-to-end compilation from a template event stream to SPARQL.
//!
//! This module wires the pipeline stages together:
//!
//! ```text
//! structural events → SparqlProducer → OrderedReader → EditReader → SparqlWriter → text
//! ```
//!
//! # Example
//!
//! ```ignore
//! use templar::compile::{compile_file, CompileOptions};
//! use templar::compiler::QueryType;
//!
//! let options = CompileOptions::default().with_query(QueryType::Ask);
//! let output = compile_file("page.jsonl", &options, Vec::new())?;
//! println!("{}", output.sparql);
//! ```

use std::path::Path;

use tracing::{info, warn};

use crate::compiler::{CompileError, CompilerConfig, QueryType, Rendering, SparqlProducer, VariableOrigins};
use crate::config::Settings;
use crate::edit::{EditReader, Editor};
use crate::event::{read_all, Event, EventReader, JsonLinesReader, ReadError, VecReader};
use crate::order::OrderedReader;
use crate::sparql::SparqlWriter;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while running the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Read error: {0}")]
    Read(#[from] ReadError),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

// ============================================================================
// Options
// ============================================================================

/// Options for compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub query: QueryType,
    pub rendering: Rendering,
    /// Prefix synthetic labels with the opposite endpoint variable.
    pub qualified_labels: bool,
    /// Append a deterministic ORDER BY.
    pub order: bool,
    /// Spaces per nesting level in the rendered text.
    pub indent: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            query: QueryType::Select,
            rendering: Rendering::Union,
            qualified_labels: false,
            order: true,
            indent: 2,
        }
    }
}

impl CompileOptions {
    /// Options as configured in a settings file.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            query: settings.compile.query,
            rendering: settings.compile.rendering,
            qualified_labels: settings.compile.qualified_labels,
            order: settings.compile.order,
            indent: settings.output.indent,
        }
    }

    pub fn with_query(mut self, query: QueryType) -> Self {
        self.query = query;
        self
    }

    pub fn with_rendering(mut self, rendering: Rendering) -> Self {
        self.rendering = rendering;
        self
    }

    pub fn with_qualified_labels(mut self, qualified: bool) -> Self {
        self.qualified_labels = qualified;
        self
    }

    pub fn with_order(mut self, order: bool) -> Self {
        self.order = order;
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn compiler_config(&self) -> CompilerConfig {
        CompilerConfig {
            query: self.query,
            rendering: self.rendering,
            qualified_labels: self.qualified_labels,
        }
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result of compiling a template.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// The rendered SPARQL text.
    pub sparql: String,

    /// The final query events, after ordering and editing.
    pub events: Vec<Event>,

    /// Variable name → origin of the template element it came from.
    pub origins: VariableOrigins,

    /// The query form generated.
    pub query: QueryType,
}

// ============================================================================
// Compilation Functions
// ============================================================================

/// Run the full pipeline over `reader`, applying `editors` in order.
///
/// The reader is closed once the query has been rendered.
pub fn compile_reader<'e, R>(
    reader: R,
    options: &CompileOptions,
    editors: Vec<Box<dyn Editor + 'e>>,
) -> PipelineResult<CompileOutput>
where
    R: EventReader + 'e,
{
    let producer = SparqlProducer::new(reader, &options.compiler_config())?;
    let origins = producer.origins().clone();

    let ordered: Box<dyn EventReader + 'e> = if options.order {
        Box::new(OrderedReader::new(producer))
    } else {
        Box::new(producer)
    };
    let edit_count = editors.len();
    let mut edited = EditReader::new(ordered, editors, origins.clone());

    let events = match read_all(&mut edited) {
        Ok(events) => events,
        Err(err) => {
            if let Err(close) = edited.close() {
                warn!(error = %close, "failed to close pipeline after read error");
            }
            return Err(err.into());
        }
    };
    edited.close()?;

    let sparql = SparqlWriter::render(&events, options.indent);
    info!(
        query = %options.query,
        variables = origins.len(),
        editors = edit_count,
        "rendered query"
    );

    Ok(CompileOutput {
        sparql,
        events,
        origins,
        query: options.query,
    })
}

/// Compile an in-memory structural stream without editors.
pub fn compile_events(events: Vec<Event>, options: &CompileOptions) -> PipelineResult<CompileOutput> {
    compile_reader(VecReader::new(events), options, Vec::new())
}

/// Compile a JSON Lines event file.
pub fn compile_file<'e, P: AsRef<Path>>(
    path: P,
    options: &CompileOptions,
    editors: Vec<Box<dyn Editor + 'e>>,
) -> PipelineResult<CompileOutput> {
    let reader = JsonLinesReader::open(path)?;
    compile_reader(reader, options, editors)
}
