//! Book identifiers
//!
//! Books are keyed by ULIDs: 26 Crockford base32 characters, a 48-bit
//! millisecond timestamp followed by 80 random bits. The textual form sorts
//! the same way the identifiers were created.

use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use rusty_ulid::Ulid;

/// Length of the textual form, also the width of the `books.id` column.
pub const BOOK_ID_LEN: usize = 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BookId(Ulid);

impl BookId {
    /// Parses a client-supplied identifier. Lower-case input is accepted and
    /// normalized; anything that is not exactly 26 valid characters is
    /// rejected.
    pub fn parse(value: &str) -> Option<Self> {
        if value.len() != BOOK_ID_LEN {
            return None;
        }
        Ulid::from_str(&value.to_ascii_uppercase()).ok().map(BookId)
    }

    /// Milliseconds since the Unix epoch at which the id was generated.
    pub fn timestamp_ms(&self) -> u64 {
        self.0.timestamp()
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out monotonic book ids.
///
/// Within one millisecond the random part of the previous id is incremented
/// instead of drawn fresh, so ids created by this generator never sort before
/// ids it created earlier. Safe to share between tasks.
#[derive(Debug, Default)]
pub struct BookIdGenerator {
    last: Mutex<Option<Ulid>>,
}

impl BookIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> BookId {
        // A poisoned lock only means another thread panicked mid-generation;
        // the stored ULID is still a valid lower bound.
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let next = match *last {
            Some(previous) => Ulid::next_monotonic(previous),
            None => Ulid::generate(),
        };
        *last = Some(next);
        BookId(next)
    }
}
