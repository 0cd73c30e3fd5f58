//! CONSTRUCT template wrapper.

use crate::event::{Event, Triple};

/// Insert the construct template ahead of the first `WHERE`.
///
/// The template holds every distinct triple pattern of the compiled stream,
/// in first-seen order, compared without provenance.
pub fn wrap_construct(events: Vec<Event>) -> Vec<Event> {
    let mut template: Vec<Triple> = Vec::new();
    for event in &events {
        if let Event::TriplePattern(triple) = event {
            if !template.iter().any(|seen| same_pattern(seen, triple)) {
                template.push(triple.clone());
            }
        }
    }

    let mut out = Vec::with_capacity(events.len() + template.len() + 2);
    let mut pending = Some(template);
    for event in events {
        if matches!(event, Event::StartWhere) {
            if let Some(template) = pending.take() {
                out.push(Event::StartConstruct);
                out.extend(template.into_iter().map(Event::TriplePattern));
                out.push(Event::EndConstruct);
            }
        }
        out.push(event);
    }
    out
}

fn same_pattern(a: &Triple, b: &Triple) -> bool {
    a.subject.same_resource(&b.subject)
        && a.predicate.same_resource(&b.predicate)
        && a.object.same_resource(&b.object)
}
