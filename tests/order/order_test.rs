// tests/order/order_test.rs
use templar::compile::{compile_events, CompileOptions};
use templar::event::{read_all, Event, EventReader, Term, Triple, VecReader};
use templar::order::OrderedReader;

fn pattern(s: &str, o: &str) -> Event {
    Event::TriplePattern(Triple::new(Term::var(s), Term::curie("ex", "p"), Term::var(o)))
}

fn order_of(events: Vec<Event>) -> Option<Vec<String>> {
    let mut reader = OrderedReader::new(VecReader::new(events));
    let out = read_all(&mut reader).unwrap();
    out.into_iter().find_map(|event| match event {
        Event::OrderBy { variables } => Some(variables),
        _ => None,
    })
}

fn names(list: &[&str]) -> Option<Vec<String>> {
    Some(list.iter().map(|n| n.to_string()).collect())
}

#[test]
fn test_union_branches_merge_innermost_first() {
    let events = vec![
        Event::Select,
        Event::StartWhere,
        Event::StartSubject {
            term: Term::var("this"),
        },
        Event::StartOptional,
        Event::StartGroup,
        pattern("this", "n"),
        Event::EndGroup,
        Event::StartUnion,
        pattern("this", "a"),
        Event::EndUnion,
        Event::EndOptional,
        Event::EndSubject {
            term: Term::var("this"),
        },
        Event::EndWhere,
    ];
    assert_eq!(order_of(events), names(&["this", "a", "n"]));
}

#[test]
fn test_graph_term_counts_as_scope_variable() {
    let events = vec![
        Event::Select,
        Event::StartWhere,
        Event::StartGraph {
            term: Term::var("g"),
        },
        pattern("s", "o"),
        Event::EndGraph,
        Event::EndWhere,
    ];
    assert_eq!(order_of(events), names(&["g", "s", "o"]));
}

#[test]
fn test_order_by_follows_where_close() {
    let events = vec![Event::Select, Event::StartWhere, pattern("a", "b"), Event::EndWhere, Event::EndDocument];
    let mut reader = OrderedReader::new(VecReader::new(events));
    let out = read_all(&mut reader).unwrap();
    assert_eq!(
        &out[3..],
        &[
            Event::OrderBy {
                variables: vec!["a".into(), "b".into()]
            },
            Event::EndWhere,
            Event::EndDocument,
        ]
    );
}

#[test]
fn test_has_next_sees_queued_event() {
    let events = vec![Event::Select, Event::StartWhere, pattern("a", "b"), Event::EndWhere];
    let mut reader = OrderedReader::new(VecReader::new(events));
    for _ in 0..4 {
        reader.next_event().unwrap();
    }
    assert!(reader.has_next().unwrap());
    assert_eq!(reader.next_event().unwrap(), Some(Event::EndWhere));
    assert!(!reader.has_next().unwrap());
    reader.close().unwrap();
    reader.close().unwrap();
}

#[test]
fn test_compiled_example_order() {
    let this = Term::var("this").with_origin("/1");
    let events = vec![
        Event::StartDocument,
        Event::Namespace {
            prefix: "ex".into(),
            namespace: "http://example.org/".into(),
        },
        Event::StartSubject { term: this.clone() },
        Event::Triple(Triple::new(
            this.clone(),
            Term::curie("ex", "name"),
            Term::placeholder("n").with_origin("/1/1"),
        )),
        Event::Triple(Triple::new(
            this.clone(),
            Term::curie("ex", "knows"),
            Term::var("friend").with_origin("/1/2"),
        )),
        Event::EndSubject { term: this },
        Event::EndDocument,
    ];
    let output = compile_events(events, &CompileOptions::default()).unwrap();
    assert!(
        output.sparql.ends_with("}\nORDER BY ?this ?_name ?friend\n"),
        "{}",
        output.sparql
    );

    let disabled = compile_events(output_source(), &CompileOptions::default().with_order(false)).unwrap();
    assert!(!disabled.sparql.contains("ORDER BY"));
}

fn output_source() -> Vec<Event> {
    vec![
        Event::StartDocument,
        Event::StartSubject {
            term: Term::var("this"),
        },
        Event::Triple(Triple::new(Term::var("this"), Term::curie("ex", "p"), Term::var("o"))),
        Event::EndSubject {
            term: Term::var("this"),
        },
        Event::EndDocument,
    ]
}
