// tests/event/buffer_test.rs
use templar::event::{BufferedEvents, Event, EventReader, Term, Triple, VecReader};

fn stream() -> Vec<Event> {
    vec![
        Event::StartDocument,
        Event::StartSubject {
            term: Term::var("this"),
        },
        Event::Triple(Triple::new(
            Term::var("this"),
            Term::curie("ex", "name"),
            Term::var("name"),
        )),
        Event::EndSubject {
            term: Term::var("this"),
        },
        Event::EndDocument,
    ]
}

#[test]
fn test_read_from_drains_without_closing() {
    let mut reader = VecReader::new(stream());
    let buffer = BufferedEvents::read_from(&mut reader).unwrap();

    assert_eq!(buffer.len(), 5);
    assert!(!reader.is_closed());
    assert!(!reader.has_next().unwrap());
}

#[test]
fn test_sequential_consumption() {
    let mut buffer = BufferedEvents::new(stream());

    let mut seen = 0;
    while buffer.has_next() {
        assert_eq!(buffer.position(), seen);
        buffer.next();
        seen += 1;
    }
    assert_eq!(seen, 5);
    assert_eq!(buffer.next(), None);
    assert_eq!(buffer.peek(0), None);
}

#[test]
fn test_random_access_look_ahead() {
    let mut buffer = BufferedEvents::from(stream());
    buffer.next();

    assert!(matches!(buffer.peek(1), Some(Event::Triple(_))));
    assert!(matches!(buffer.get(3), Some(Event::EndSubject { .. })));
    assert_eq!(buffer.position(), 1);

    let tail: Vec<usize> = buffer.iter_from(3).map(|(index, _)| index).collect();
    assert_eq!(tail, vec![3, 4]);
}

#[test]
fn test_empty_buffer() {
    let buffer = BufferedEvents::default();
    assert!(buffer.is_empty());
    assert!(!buffer.has_next());
    assert!(buffer.into_events().is_empty());
}
