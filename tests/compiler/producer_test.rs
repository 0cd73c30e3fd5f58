// tests/compiler/producer_test.rs
use templar::compile::{compile_events, CompileOptions};
use templar::compiler::{compile, CompileError, CompilerConfig, QueryType, Rendering};
use templar::event::{check_brackets, Event, Term, Triple};
use templar::sparql::test_utils::validate_sparql;

// ============================================================================
// Helpers
// ============================================================================

fn open(term: Term) -> Event {
    Event::StartSubject { term }
}

fn close(term: Term) -> Event {
    Event::EndSubject { term }
}

fn t(s: Term, p: &str, o: Term) -> Event {
    Event::Triple(Triple::new(s, Term::curie("ex", p), o))
}

fn document(body: Vec<Event>) -> Vec<Event> {
    let mut events = vec![
        Event::StartDocument,
        Event::Namespace {
            prefix: "ex".into(),
            namespace: "http://example.org/".into(),
        },
    ];
    events.extend(body);
    events.push(Event::EndDocument);
    events
}

fn render(body: Vec<Event>, rendering: Rendering) -> String {
    let options = CompileOptions::default()
        .with_rendering(rendering)
        .with_order(false);
    let output = compile_events(document(body), &options).unwrap();
    assert!(check_brackets(&output.events).is_ok());
    validate_sparql(&output.sparql).unwrap();
    output.sparql
}

fn this() -> Term {
    Term::var("this")
}

// ============================================================================
// Block structure
// ============================================================================

#[test]
fn test_sibling_optionals_form_union() {
    let text = render(
        vec![
            open(this()),
            t(this(), "name", Term::var("n")),
            t(this(), "age", Term::var("a")),
            close(this()),
        ],
        Rendering::Union,
    );
    insta::assert_snapshot!(text.trim_end(), @r"
    PREFIX ex: <http://example.org/>
    SELECT REDUCED *
    WHERE {
      OPTIONAL {
        {
          ?this ex:name ?n .
        }
        UNION {
          ?this ex:age ?a .
        }
      }
    }
    ");
}

#[test]
fn test_sibling_optionals_in_optional_form() {
    let text = render(
        vec![
            open(this()),
            t(this(), "name", Term::var("n")),
            t(this(), "age", Term::var("a")),
            close(this()),
        ],
        Rendering::Optional,
    );
    insta::assert_snapshot!(text.trim_end(), @r"
    PREFIX ex: <http://example.org/>
    SELECT REDUCED *
    WHERE {
      OPTIONAL {
        ?this ex:name ?n .
      }
      OPTIONAL {
        ?this ex:age ?a .
      }
    }
    ");
}

#[test]
fn test_chained_singleton_joins_parent_branch() {
    let friend = Term::var("friend");
    let text = render(
        vec![
            open(this()),
            t(this(), "knows", friend.clone()),
            open(friend.clone()),
            t(friend.clone(), "name", Term::var("fn")),
            close(friend),
            close(this()),
        ],
        Rendering::Union,
    );
    insta::assert_snapshot!(text.trim_end(), @r"
    PREFIX ex: <http://example.org/>
    SELECT REDUCED *
    WHERE {
      OPTIONAL {
        {
          ?this ex:knows ?friend .
          ?friend ex:name ?fn .
        }
      }
    }
    ");
}

#[test]
fn test_chained_block_with_several_optionals_nests_container() {
    let friend = Term::var("friend");
    let text = render(
        vec![
            open(this()),
            t(this(), "knows", friend.clone()),
            open(friend.clone()),
            t(friend.clone(), "name", Term::var("n")),
            t(friend.clone(), "age", Term::var("a")),
            close(friend),
            close(this()),
        ],
        Rendering::Union,
    );
    insta::assert_snapshot!(text.trim_end(), @r"
    PREFIX ex: <http://example.org/>
    SELECT REDUCED *
    WHERE {
      OPTIONAL {
        {
          ?this ex:knows ?friend .
          OPTIONAL {
            {
              ?friend ex:name ?n .
            }
            UNION {
              ?friend ex:age ?a .
            }
          }
        }
      }
    }
    ");
}

#[test]
fn test_placeholder_child_is_not_chained() {
    let child = Term::placeholder("p1");
    let text = render(
        vec![
            open(this()),
            t(this(), "knows", child.clone()),
            open(child.clone()),
            t(child.clone(), "name", Term::var("n")),
            close(child),
            close(this()),
        ],
        Rendering::Union,
    );
    insta::assert_snapshot!(text.trim_end(), @r"
    PREFIX ex: <http://example.org/>
    SELECT REDUCED *
    WHERE {
      ?this ex:knows ?_knows .
      OPTIONAL {
        ?_knows ex:name ?n .
      }
    }
    ");
}

#[test]
fn test_out_of_order_triple_is_promoted() {
    let root = Term::var("this").with_origin("/1");
    let item = Term::var("item").with_origin("/1/2");
    let text = render(
        vec![
            open(root.clone()),
            open(item.clone()),
            t(item.clone(), "name", Term::var("n").with_origin("/1/2/1")),
            close(item),
            t(root.clone(), "title", Term::var("title").with_origin("/1/2")),
            close(root),
        ],
        Rendering::Union,
    );
    insta::assert_snapshot!(text.trim_end(), @r"
    PREFIX ex: <http://example.org/>
    SELECT REDUCED *
    WHERE {
      OPTIONAL {
        ?this ex:title ?title .
      }
      OPTIONAL {
        ?item ex:name ?n .
      }
    }
    ");
}

#[test]
fn test_unrelated_subject_keeps_enclosing_optional_open() {
    let other = Term::var("other");
    let text = render(
        vec![
            open(this()),
            t(this(), "knows", Term::var("friend")),
            t(this(), "likes", Term::var("thing")),
            open(other.clone()),
            t(other.clone(), "kind", Term::curie("ex", "Doc")),
            close(other),
            t(this(), "age", Term::var("age")),
            close(this()),
        ],
        Rendering::Union,
    );
    insta::assert_snapshot!(text.trim_end(), @r"
    PREFIX ex: <http://example.org/>
    SELECT REDUCED *
    WHERE {
      OPTIONAL {
        {
          ?this ex:knows ?friend .
        }
        UNION {
          ?this ex:likes ?thing .
        }
        ?other ex:kind ex:Doc .
        {
          ?this ex:age ?age .
        }
      }
    }
    ");
}

#[test]
fn test_chained_mandatory_triple_stays_in_branch() {
    let friend = Term::var("friend");
    let text = render(
        vec![
            open(this()),
            t(this(), "knows", friend.clone()),
            open(friend.clone()),
            Event::Triple(Triple::new(
                friend.clone(),
                Term::curie("rdf", "type"),
                Term::curie("ex", "Person"),
            )),
            close(friend),
            close(this()),
        ],
        Rendering::Union,
    );
    insta::assert_snapshot!(text.trim_end(), @r"
    PREFIX ex: <http://example.org/>
    SELECT REDUCED *
    WHERE {
      OPTIONAL {
        {
          ?this ex:knows ?friend .
          ?friend a ex:Person .
        }
      }
    }
    ");
}

#[test]
fn test_inverse_triple_keeps_direction() {
    let text = render(
        vec![
            open(this()),
            Event::Triple(
                Triple::new(Term::placeholder("p"), Term::curie("ex", "knows"), this()).reversed(),
            ),
            close(this()),
        ],
        Rendering::Union,
    );
    assert!(text.contains("  ?_knowsOf ex:knows ?this .\n"), "{}", text);
    assert!(!text.contains("OPTIONAL"));
}

#[test]
fn test_constant_objects_are_mandatory() {
    let text = render(
        vec![
            open(this()),
            t(this(), "tag", Term::literal("x")),
            Event::Triple(Triple::new(
                this(),
                Term::curie("rdf", "type"),
                Term::curie("ex", "Person"),
            )),
            close(this()),
        ],
        Rendering::Union,
    );
    assert!(text.contains("  ?this ex:tag \"x\" .\n"), "{}", text);
    assert!(text.contains("  ?this a ex:Person .\n"), "{}", text);
    assert!(!text.contains("OPTIONAL"));
}

// ============================================================================
// Query forms
// ============================================================================

#[test]
fn test_ask_form() {
    let options = CompileOptions::default().with_query(QueryType::Ask);
    let output = compile_events(
        document(vec![
            open(this()),
            t(this(), "name", Term::var("n")),
            close(this()),
        ]),
        &options,
    )
    .unwrap();
    assert!(output.sparql.contains("ASK\nWHERE {\n"));
    assert!(!output.sparql.contains("ORDER BY"));
    validate_sparql(&output.sparql).unwrap();
}

#[test]
fn test_construct_template_lists_patterns() {
    let config = CompilerConfig {
        query: QueryType::Construct,
        ..CompilerConfig::default()
    };
    let compiled = compile(
        document(vec![
            open(this()),
            t(this(), "name", Term::placeholder("n")),
            close(this()),
        ])
        .into(),
        &config,
    )
    .unwrap();

    let construct = compiled
        .events
        .iter()
        .position(|e| *e == Event::StartConstruct)
        .unwrap();
    let where_ = compiled
        .events
        .iter()
        .position(|e| *e == Event::StartWhere)
        .unwrap();
    assert!(construct < where_);
    assert!(matches!(compiled.events[construct + 1], Event::TriplePattern(_)));
    assert_eq!(compiled.events[construct + 2], Event::EndConstruct);
    assert!(!compiled.events.contains(&Event::Select));
}

#[test]
fn test_events_after_document_end_are_ignored() {
    let mut events = document(vec![open(this()), close(this())]);
    events.push(open(Term::var("late")));
    let compiled = compile(events.into(), &CompilerConfig::default()).unwrap();
    assert_eq!(compiled.events.last(), Some(&Event::EndDocument));
    assert!(!compiled
        .events
        .contains(&open(Term::var("late"))));
}

#[test]
fn test_missing_document_end_is_implied() {
    let events = vec![Event::StartDocument, open(this()), close(this())];
    let compiled = compile(events.into(), &CompilerConfig::default()).unwrap();
    let tail = &compiled.events[compiled.events.len() - 2..];
    assert_eq!(tail, &[Event::EndWhere, Event::EndDocument]);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_literal_subject_is_rejected() {
    let subject = Term::literal("oops");
    let result = compile(
        document(vec![open(subject.clone()), close(subject)]).into(),
        &CompilerConfig::default(),
    );
    assert!(matches!(
        result,
        Err(CompileError::UnresolvedTermKind {
            position: "subject",
            ..
        })
    ));
}

#[test]
fn test_placeholder_predicate_is_rejected() {
    let result = compile(
        document(vec![
            open(this()),
            Event::Triple(Triple::new(this(), Term::placeholder("p"), Term::var("o"))),
            close(this()),
        ])
        .into(),
        &CompilerConfig::default(),
    );
    assert!(matches!(
        result,
        Err(CompileError::UnresolvedTermKind {
            position: "predicate",
            ..
        })
    ));
}

#[test]
fn test_malformed_variable_name() {
    let bad = Term::var("not valid");
    let result = compile(
        document(vec![open(bad.clone()), close(bad)]).into(),
        &CompilerConfig::default(),
    );
    assert!(matches!(result, Err(CompileError::MalformedVariableName(name)) if name == "not valid"));
}

#[test]
fn test_malformed_namespace_prefix() {
    let events = vec![
        Event::StartDocument,
        Event::Namespace {
            prefix: "ex> <http://evil/".into(),
            namespace: "http://example.org/".into(),
        },
        open(this()),
        close(this()),
        Event::EndDocument,
    ];
    let result = compile(events.into(), &CompilerConfig::default());
    assert!(matches!(result, Err(CompileError::MalformedPrefix(prefix)) if prefix.starts_with("ex>")));

    let trailing_dot = vec![
        Event::StartDocument,
        Event::Namespace {
            prefix: "ex.".into(),
            namespace: "http://example.org/".into(),
        },
        Event::EndDocument,
    ];
    let result = compile(trailing_dot.into(), &CompilerConfig::default());
    assert!(matches!(result, Err(CompileError::MalformedPrefix(_))));
}

#[test]
fn test_empty_and_dotted_prefixes_are_accepted() {
    let events = vec![
        Event::StartDocument,
        Event::Namespace {
            prefix: String::new(),
            namespace: "http://example.org/".into(),
        },
        Event::Namespace {
            prefix: "foaf.v2".into(),
            namespace: "http://xmlns.com/foaf/0.1/".into(),
        },
        open(this()),
        close(this()),
        Event::EndDocument,
    ];
    let output = compile_events(events, &CompileOptions::default().with_order(false)).unwrap();
    assert!(output.sparql.starts_with("PREFIX : <http://example.org/>
PREFIX foaf.v2: <http://xmlns.com/foaf/0.1/>
"));
    validate_sparql(&output.sparql).unwrap();
}
