//! SPARQL text generation.
//!
//! Query events are lowered to [`Token`]s by the [`SparqlWriter`] and
//! serialized in one pass. Only the grammar subset the event model covers is
//! produced: the query forms, nested group patterns, triple patterns, and
//! filter expressions built from calls and terms.

pub mod test_utils;
pub mod token;
pub mod writer;

pub use token::{Token, TokenStream};
pub use writer::SparqlWriter;
