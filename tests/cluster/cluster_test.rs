// tests/cluster/cluster_test.rs
use std::collections::BTreeSet;

use templar::cluster::ClusterCounter;
use templar::compiler::{CompilerConfig, SparqlProducer};
use templar::event::{read_all, Event, EventReader, Term, Triple, VecReader};

fn pattern(s: Term, o: Term) -> Event {
    Event::TriplePattern(Triple::new(s, Term::curie("ex", "p"), o))
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn test_clusters_partition_variables() {
    let events = vec![
        pattern(Term::var("a"), Term::var("b")),
        pattern(Term::var("c"), Term::var("d")),
        pattern(Term::var("b"), Term::var("e")),
        pattern(Term::var("x"), Term::curie("ex", "Thing")),
    ];
    let mut counter = ClusterCounter::new(VecReader::new(events));
    read_all(&mut counter).unwrap();

    let clusters = counter.clusters();
    assert_eq!(
        clusters,
        vec![set(&["a", "b", "e"]), set(&["c", "d"]), set(&["x"])]
    );
    assert_eq!(counter.cluster_count(), 3);

    // Every variable is in exactly one cluster.
    let total: usize = clusters.iter().map(BTreeSet::len).sum();
    assert_eq!(total, 6);
}

#[test]
fn test_smallest_cluster_breaks_ties_by_name() {
    let events = vec![
        pattern(Term::var("m"), Term::var("n")),
        pattern(Term::var("k"), Term::var("l")),
        pattern(Term::var("a"), Term::var("b")),
        pattern(Term::var("b"), Term::var("c")),
    ];
    let mut counter = ClusterCounter::new(VecReader::new(events));
    read_all(&mut counter).unwrap();

    assert_eq!(counter.smallest_cluster(), Some(set(&["k", "l"])));
}

#[test]
fn test_no_patterns_no_clusters() {
    let mut counter = ClusterCounter::new(VecReader::new(vec![Event::StartWhere, Event::EndWhere]));
    let events = read_all(&mut counter).unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(counter.cluster_count(), 0);
    assert_eq!(counter.smallest_cluster(), None);
}

#[test]
fn test_counts_compiled_query() {
    let this = Term::var("this");
    let other = Term::var("other");
    let events = vec![
        Event::StartDocument,
        Event::StartSubject { term: this.clone() },
        Event::Triple(Triple::new(this.clone(), Term::curie("ex", "name"), Term::var("name"))),
        Event::EndSubject { term: this },
        Event::StartSubject { term: other.clone() },
        Event::Triple(Triple::new(other.clone(), Term::curie("ex", "name"), Term::var("label"))),
        Event::EndSubject { term: other },
        Event::EndDocument,
    ];
    let producer = SparqlProducer::new(VecReader::new(events), &CompilerConfig::default()).unwrap();
    let mut counter = ClusterCounter::new(producer);
    read_all(&mut counter).unwrap();
    counter.close().unwrap();

    assert_eq!(
        counter.clusters(),
        vec![set(&["label", "other"]), set(&["name", "this"])]
    );
}
