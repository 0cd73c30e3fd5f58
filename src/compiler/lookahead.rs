//! Bounded look-ahead over the buffered source stream.
//!
//! Every helper scans forward from a given index to the end of the enclosing
//! subject block, tracking nesting depth, and never moves the read cursor.
//! Results are plain decisions the main loop acts on.

use std::collections::HashSet;

use crate::event::{Event, Origin, Term, Triple};

/// What the main loop does with a source triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Mandatory: emit as soon as its block opens.
    Hoist,
    /// Optional: emit at its own position through an alternative branch.
    Defer,
    /// Already emitted earlier.
    Skip,
}

/// A triple is optional iff its far endpoint is a free variable.
pub fn placement(triple: &Triple, index: usize, emitted: &HashSet<usize>) -> Placement {
    if emitted.contains(&index) {
        Placement::Skip
    } else if triple.far().is_var() {
        Placement::Defer
    } else {
        Placement::Hoist
    }
}

/// Direct content of one subject block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockScan {
    /// Indices of depth-0 triples to hoist.
    pub mandatory: Vec<usize>,
    /// Indices of depth-0 triples still to be emitted as optional.
    pub optional: Vec<usize>,
    /// Number of directly nested subject blocks.
    pub nested: usize,
    /// Index of the matching subject end, if the stream has one.
    pub end: Option<usize>,
}

/// Classification of a block's remaining optional material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Material {
    Empty,
    Singleton,
    Multiple,
}

impl BlockScan {
    pub fn material(&self) -> Material {
        match (self.optional.len(), self.nested) {
            (0, 0) => Material::Empty,
            (1, 0) => Material::Singleton,
            _ => Material::Multiple,
        }
    }
}

/// Scan the block opened at `start` (a subject start) up to its matching end.
pub fn scan_block(events: &[Event], start: usize, emitted: &HashSet<usize>) -> BlockScan {
    let mut scan = BlockScan::default();
    scan_from(events, start + 1, emitted, &mut scan);
    scan
}

/// Scan from `from` to the end of whichever block contains it.
fn scan_from(events: &[Event], from: usize, emitted: &HashSet<usize>, scan: &mut BlockScan) {
    let mut depth = 0usize;
    for (index, event) in events.iter().enumerate().skip(from) {
        match event {
            Event::StartSubject { .. } => {
                if depth == 0 {
                    scan.nested += 1;
                }
                depth += 1;
            }
            Event::EndSubject { .. } => {
                if depth == 0 {
                    scan.end = Some(index);
                    return;
                }
                depth -= 1;
            }
            Event::Triple(triple) if depth == 0 => match placement(triple, index, emitted) {
                Placement::Hoist => scan.mandatory.push(index),
                Placement::Defer => scan.optional.push(index),
                Placement::Skip => {}
            },
            _ => {}
        }
    }
}

/// True when the triple at `index` is the only optional material left in its
/// block: no other pending optional triple and no nested subject after it.
pub fn is_singleton(events: &[Event], index: usize, emitted: &HashSet<usize>) -> bool {
    let mut scan = BlockScan::default();
    scan_from(events, index, emitted, &mut scan);
    scan.material() == Material::Singleton
}

/// Optional triples of the enclosing block, placed after the block opened at
/// `subject_index`, whose far endpoint was written on an ancestor (or the very
/// element) of the subject. They belong before the nested block.
pub fn promoted_literals(
    events: &[Event],
    subject_index: usize,
    subject_origin: &Origin,
    emitted: &HashSet<usize>,
) -> Vec<usize> {
    let Some(end) = scan_block(events, subject_index, emitted).end else {
        return Vec::new();
    };
    let mut rest = BlockScan::default();
    scan_from(events, end + 1, emitted, &mut rest);
    rest.optional
        .into_iter()
        .filter(|&index| match &events[index] {
            Event::Triple(triple) => triple
                .far()
                .origin
                .as_ref()
                .is_some_and(|origin| origin.contains(subject_origin)),
            _ => false,
        })
        .collect()
}

/// First triple inside the block opened at `start` that mentions `term` as
/// subject or object.
pub fn first_mention<'e>(events: &'e [Event], start: usize, term: &Term) -> Option<&'e Triple> {
    let mut depth = 0usize;
    for event in events.iter().skip(start + 1) {
        match event {
            Event::StartSubject { .. } => depth += 1,
            Event::EndSubject { .. } if depth == 0 => return None,
            Event::EndSubject { .. } => depth -= 1,
            Event::Triple(triple)
                if triple.subject.same_resource(term) || triple.object.same_resource(term) =>
            {
                return Some(triple)
            }
            _ => {}
        }
    }
    None
}
