//! Materialized event list with look-ahead.

use super::reader::{read_all, EventReader, ReadResult};
use super::Event;

/// An indexable event sequence with a read cursor.
///
/// The compiler consumes events sequentially through [`next`](Self::next)
/// while look-ahead helpers inspect later positions with [`get`](Self::get)
/// and [`peek`](Self::peek) without moving the cursor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BufferedEvents {
    events: Vec<Event>,
    cursor: usize,
}

impl BufferedEvents {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events, cursor: 0 }
    }

    /// Drain `reader` to the end of its stream. The reader is left open.
    pub fn read_from<R: EventReader + ?Sized>(reader: &mut R) -> ReadResult<Self> {
        Ok(Self::new(read_all(reader)?))
    }

    /// Consume the event at the cursor.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&Event> {
        let event = self.events.get(self.cursor)?;
        self.cursor += 1;
        Some(event)
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.events.len()
    }

    /// Index of the next event [`next`](Self::next) would return.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Look `offset` events past the cursor.
    pub fn peek(&self, offset: usize) -> Option<&Event> {
        self.events.get(self.cursor + offset)
    }

    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events from `index` to the end, paired with their positions.
    pub fn iter_from(&self, index: usize) -> impl Iterator<Item = (usize, &Event)> {
        self.events.iter().enumerate().skip(index)
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl From<Vec<Event>> for BufferedEvents {
    fn from(events: Vec<Event>) -> Self {
        Self::new(events)
    }
}
