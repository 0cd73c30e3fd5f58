// tests/sparql/writer_test.rs
use templar::event::{Event, IriRef, Term, Triple, VecReader};
use templar::sparql::test_utils::validate_sparql;
use templar::sparql::SparqlWriter;

fn pattern(s: Term, p: Term, o: Term) -> Event {
    Event::TriplePattern(Triple::new(s, p, o))
}

#[test]
fn test_nested_optional_union_layout() {
    let events = vec![
        Event::StartDocument,
        Event::Base {
            iri: "http://example.org/base/".into(),
        },
        Event::Namespace {
            prefix: "ex".into(),
            namespace: "http://example.org/".into(),
        },
        Event::Select,
        Event::StartWhere,
        pattern(Term::var("s"), Term::curie("ex", "p"), Term::var("o")),
        Event::StartOptional,
        Event::StartGroup,
        pattern(Term::var("s"), Term::curie("ex", "q"), Term::var("x")),
        Event::EndGroup,
        Event::StartUnion,
        pattern(Term::var("s"), Term::curie("ex", "r"), Term::var("y")),
        Event::EndUnion,
        Event::EndOptional,
        Event::EndWhere,
        Event::EndDocument,
    ];
    let text = SparqlWriter::render(&events, 2);
    insta::assert_snapshot!(text.trim_end(), @r"
    BASE <http://example.org/base/>
    PREFIX ex: <http://example.org/>
    SELECT REDUCED *
    WHERE {
      ?s ex:p ?o .
      OPTIONAL {
        {
          ?s ex:q ?x .
        }
        UNION {
          ?s ex:r ?y .
        }
      }
    }
    ");
    validate_sparql(&text).unwrap();
}

#[test]
fn test_indent_width() {
    let events = vec![
        Event::Ask,
        Event::StartWhere,
        Event::StartOptional,
        pattern(Term::var("s"), Term::var("p"), Term::var("o")),
        Event::EndOptional,
        Event::EndWhere,
    ];
    let text = SparqlWriter::render(&events, 4);
    assert_eq!(
        text,
        "ASK\nWHERE {\n    OPTIONAL {\n        ?s ?p ?o .\n    }\n}\n"
    );
}

#[test]
fn test_construct_and_graph() {
    let events = vec![
        Event::StartConstruct,
        pattern(Term::var("s"), Term::iri("http://example.org/p"), Term::var("o")),
        Event::EndConstruct,
        Event::StartWhere,
        Event::StartGraph {
            term: Term::var("g"),
        },
        pattern(Term::var("s"), Term::iri("http://example.org/p"), Term::var("o")),
        Event::EndGraph,
        Event::EndWhere,
    ];
    let text = SparqlWriter::render(&events, 2);
    insta::assert_snapshot!(text.trim_end(), @r"
    CONSTRUCT {
      ?s <http://example.org/p> ?o .
    }
    WHERE {
      GRAPH ?g {
        ?s <http://example.org/p> ?o .
      }
    }
    ");
    validate_sparql(&text).unwrap();
}

#[test]
fn test_literal_forms() {
    let events = vec![
        Event::StartWhere,
        pattern(
            Term::var("s"),
            Term::iri("http://example.org/label"),
            Term::lang_literal("chat", "fr"),
        ),
        pattern(
            Term::var("s"),
            Term::iri("http://example.org/age"),
            Term::typed_literal("42", IriRef::full("http://www.w3.org/2001/XMLSchema#integer")),
        ),
        pattern(
            Term::blank("b1"),
            Term::iri("http://example.org/note"),
            Term::literal("line\none"),
        ),
        Event::EndWhere,
    ];
    let text = SparqlWriter::render(&events, 2);
    assert!(text.contains("?s <http://example.org/label> \"chat\"@fr .\n"), "{}", text);
    assert!(
        text.contains("\"42\"^^<http://www.w3.org/2001/XMLSchema#integer> .\n"),
        "{}",
        text
    );
    assert!(text.contains("_:b1 <http://example.org/note> \"line\\none\" .\n"), "{}", text);
}

#[test]
fn test_comment_line() {
    let events = vec![
        Event::StartWhere,
        Event::Comment {
            text: "from /1".into(),
        },
        Event::EndWhere,
    ];
    let text = SparqlWriter::render(&events, 2);
    assert_eq!(text, "WHERE {\n  # from /1\n}\n");
}

#[test]
fn test_source_events_render_nothing() {
    let events = vec![
        Event::StartDocument,
        Event::StartSubject {
            term: Term::var("s"),
        },
        Event::Triple(Triple::new(Term::var("s"), Term::curie("ex", "p"), Term::var("o"))),
        Event::EndSubject {
            term: Term::var("s"),
        },
        Event::EndDocument,
    ];
    assert_eq!(SparqlWriter::render(&events, 2), "");
}

#[test]
fn test_write_from_reader() {
    let mut reader = VecReader::new(vec![
        Event::Select,
        Event::StartWhere,
        pattern(Term::var("a"), Term::curie("rdf", "type"), Term::var("t")),
        Event::OrderBy {
            variables: vec!["a".into(), "t".into()],
        },
        Event::EndWhere,
    ]);
    let mut writer = SparqlWriter::default();
    writer.write_from(&mut reader).unwrap();
    assert_eq!(
        writer.finish(),
        "SELECT REDUCED *\nWHERE {\n  ?a a ?t .\n}\nORDER BY ?a ?t\n"
    );
}
