//! Pull-based event readers.
//!
//! Every pipeline stage is an [`EventReader`]: it pulls from its single
//! upstream only when its own consumer asks, and `close()` forwards upstream
//! so the root resource is released exactly once.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use super::Event;

/// Errors raised while pulling events.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("I/O error reading events: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed event on line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Reader already closed")]
    Closed,
}

pub type ReadResult<T> = Result<T, ReadError>;

/// A closeable, single-consumer source of events.
pub trait EventReader {
    /// Pull the next event, or `None` at end of stream.
    fn next_event(&mut self) -> ReadResult<Option<Event>>;

    fn has_next(&mut self) -> ReadResult<bool>;

    /// Release the upstream resource. Closing twice is a no-op.
    fn close(&mut self) -> ReadResult<()>;
}

impl<R: EventReader + ?Sized> EventReader for Box<R> {
    fn next_event(&mut self) -> ReadResult<Option<Event>> {
        (**self).next_event()
    }

    fn has_next(&mut self) -> ReadResult<bool> {
        (**self).has_next()
    }

    fn close(&mut self) -> ReadResult<()> {
        (**self).close()
    }
}

impl<R: EventReader + ?Sized> EventReader for &mut R {
    fn next_event(&mut self) -> ReadResult<Option<Event>> {
        (**self).next_event()
    }

    fn has_next(&mut self) -> ReadResult<bool> {
        (**self).has_next()
    }

    fn close(&mut self) -> ReadResult<()> {
        (**self).close()
    }
}

/// Drain a reader to the end without closing it.
pub fn read_all<R: EventReader + ?Sized>(reader: &mut R) -> ReadResult<Vec<Event>> {
    let mut events = Vec::new();
    while let Some(event) = reader.next_event()? {
        events.push(event);
    }
    Ok(events)
}

// =============================================================================
// In-memory reader
// =============================================================================

/// Reader over an in-memory event list.
#[derive(Debug, Default)]
pub struct VecReader {
    events: VecDeque<Event>,
    closed: bool,
}

impl VecReader {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events: events.into(),
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl EventReader for VecReader {
    fn next_event(&mut self) -> ReadResult<Option<Event>> {
        if self.closed {
            return Err(ReadError::Closed);
        }
        Ok(self.events.pop_front())
    }

    fn has_next(&mut self) -> ReadResult<bool> {
        if self.closed {
            return Err(ReadError::Closed);
        }
        Ok(!self.events.is_empty())
    }

    fn close(&mut self) -> ReadResult<()> {
        self.closed = true;
        self.events.clear();
        Ok(())
    }
}

// =============================================================================
// JSON Lines reader
// =============================================================================

/// Reads one serde-encoded [`Event`] per line; blank lines are skipped.
///
/// This is the boundary with the markup adapter, which writes the structural
/// stream of a template as JSON Lines.
pub struct JsonLinesReader<R> {
    lines: Option<Lines<R>>,
    line: usize,
    peeked: Option<Event>,
}

impl JsonLinesReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> ReadResult<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonLinesReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            lines: Some(source.lines()),
            line: 0,
            peeked: None,
        }
    }

    fn pull(&mut self) -> ReadResult<Option<Event>> {
        let lines = self.lines.as_mut().ok_or(ReadError::Closed)?;
        for text in lines.by_ref() {
            self.line += 1;
            let text = text?;
            if text.trim().is_empty() {
                continue;
            }
            let event = serde_json::from_str(&text).map_err(|source| ReadError::Decode {
                line: self.line,
                source,
            })?;
            return Ok(Some(event));
        }
        Ok(None)
    }
}

impl<R: BufRead> EventReader for JsonLinesReader<R> {
    fn next_event(&mut self) -> ReadResult<Option<Event>> {
        match self.peeked.take() {
            Some(event) => Ok(Some(event)),
            None => self.pull(),
        }
    }

    fn has_next(&mut self) -> ReadResult<bool> {
        if self.peeked.is_none() {
            self.peeked = self.pull()?;
        }
        Ok(self.peeked.is_some())
    }

    fn close(&mut self) -> ReadResult<()> {
        // Dropping the line iterator drops the underlying source.
        self.lines = None;
        self.peeked = None;
        Ok(())
    }
}
