use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a Song
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SongId(u64);

impl SongId {
    /// Creates a new `SongId`
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SongId({})", self.0)
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for parsing ID from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for SongId {
    type Err = ParseIdError;

    /// Accepts `7` as well as the rendered `#7` form; zero is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches('#');
        digits
            .parse::<u64>()
            .ok()
            .filter(|id| *id > 0)
            .map(SongId::new)
            .ok_or_else(|| ParseIdError {
                kind: "SongId".to_string(),
            })
    }
}

// ─── Sequence ──────────────────────────────────────────────────────────────────

/// Monotonic source of song ids, starting at 1.
///
/// The counter only moves when an id is actually handed out, so a failed
/// construction never burns a number.
#[derive(Debug)]
pub struct IdSequence {
    next: AtomicU64,
}

/// The process-wide sequence used by `Song::new`.
pub(crate) static NEXT_SONG_ID: IdSequence = IdSequence::new();

impl IdSequence {
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_at(1)
    }

    /// A sequence whose first id is `first` (0 is bumped to 1).
    #[must_use]
    pub const fn starting_at(first: u64) -> Self {
        let first = if first == 0 { 1 } else { first };
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Hands out the next id, or `None` once the sequence has reached `u64::MAX`.
    pub fn next_id(&self) -> Option<SongId> {
        self.next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
            .ok()
            .map(SongId::new)
    }

    /// The id the next successful construction would receive.
    #[must_use]
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

/// Value of the process-wide counter.
#[must_use]
pub fn peek_next_song_id() -> u64 {
    NEXT_SONG_ID.peek()
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
