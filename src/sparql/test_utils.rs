//! Round-trip validation of rendered queries.
//!
//! Rendered text is parsed back with `spargebra`, the SPARQL parser of the
//! Oxigraph stack, so any grammar slip in the writer surfaces as an error.

use spargebra::Query;

/// Validates that `sparql` is a syntactically valid SPARQL 1.1 query.
///
/// # Example
///
/// ```ignore
/// use templar::sparql::test_utils::validate_sparql;
///
/// validate_sparql("SELECT * WHERE { ?s ?p ?o }").unwrap();
/// ```
pub fn validate_sparql(sparql: &str) -> Result<(), String> {
    sparql
        .parse::<Query>()
        .map(|_| ())
        .map_err(|e| format!("Invalid SPARQL: {}\nSPARQL:\n{}", e, sparql))
}
