//! # Templar
//!
//! A template-to-SPARQL compiler.
//!
//! ## Architecture
//!
//! Templar turns the structural event stream of an annotated hypertext
//! template into a query that selects the data the template can render:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │          Structural events (JSON Lines adapter)          │
//! │     (subjects, triples, namespaces, base, origins)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compiler]
//! ┌─────────────────────────────────────────────────────────┐
//! │                     Query events                         │
//! │  (WHERE / OPTIONAL / UNION / patterns, variable origins) │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [order] → [edit]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Ordered and edited query events                   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sparql writer]
//! ┌─────────────────────────────────────────────────────────┐
//! │                    SPARQL text                           │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod cluster;
pub mod compile;
pub mod compiler;
pub mod config;
pub mod edit;
pub mod event;
pub mod order;
pub mod sparql;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{
        compile_events, compile_file, compile_reader, CompileOptions, CompileOutput, PipelineError,
    };
    pub use crate::compiler::{CompileError, QueryType, Rendering, SparqlProducer, VariableOrigins};
    pub use crate::edit::{Editor, SearchInserter, TriplePatternCutter, TriplePatternRecorder, Veto};
    pub use crate::event::{
        Event, EventReader, IriRef, JsonLinesReader, Origin, Term, Triple, VecReader,
    };
    pub use crate::sparql::{SparqlWriter, Token, TokenStream};
}

// Also export at crate root for convenience
pub use compile::{compile_events, CompileOptions, CompileOutput};
pub use event::{Event, Term, Triple};
