//! Variable clustering.
//!
//! [`ClusterCounter`] passes every event through unchanged while joining the
//! subject and object variables of each triple pattern. A query whose patterns
//! fall into more than one cluster is a cross product of unrelated parts.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::unionfind::UnionFind;

use crate::event::{Event, EventReader, ReadResult, Term};

pub type Cluster = BTreeSet<String>;

/// Pass-through stage that groups co-occurring variables.
pub struct ClusterCounter<R> {
    upstream: R,
    names: Vec<String>,
    index: HashMap<String, usize>,
    edges: Vec<(usize, usize)>,
}

impl<R: EventReader> ClusterCounter<R> {
    pub fn new(upstream: R) -> Self {
        Self {
            upstream,
            names: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
        }
    }

    fn node(&mut self, term: &Term) -> Option<usize> {
        let name = term.as_var()?;
        if let Some(&id) = self.index.get(name) {
            return Some(id);
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        Some(id)
    }

    fn observe(&mut self, event: &Event) {
        if let Event::TriplePattern(triple) = event {
            let subject = self.node(&triple.subject);
            let object = self.node(&triple.object);
            if let (Some(a), Some(b)) = (subject, object) {
                self.edges.push((a, b));
            }
        }
    }

    /// Every cluster, each sorted by name, in sorted order.
    pub fn clusters(&self) -> Vec<Cluster> {
        let mut sets = UnionFind::<usize>::new(self.names.len());
        for &(a, b) in &self.edges {
            sets.union(a, b);
        }
        let mut by_root: BTreeMap<usize, Cluster> = BTreeMap::new();
        for (id, name) in self.names.iter().enumerate() {
            by_root
                .entry(sets.find_mut(id))
                .or_default()
                .insert(name.clone());
        }
        let mut clusters: Vec<Cluster> = by_root.into_values().collect();
        clusters.sort();
        clusters
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters().len()
    }

    /// Cluster with the fewest members; ties go to the smaller sorted names.
    pub fn smallest_cluster(&self) -> Option<Cluster> {
        self.clusters()
            .into_iter()
            .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
    }

    pub fn into_inner(self) -> R {
        self.upstream
    }
}

impl<R: EventReader> EventReader for ClusterCounter<R> {
    fn next_event(&mut self) -> ReadResult<Option<Event>> {
        let event = self.upstream.next_event()?;
        if let Some(event) = &event {
            self.observe(event);
        }
        Ok(event)
    }

    fn has_next(&mut self) -> ReadResult<bool> {
        self.upstream.has_next()
    }

    fn close(&mut self) -> ReadResult<()> {
        self.upstream.close()
    }
}
