use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

use crate::diagnostics::{self, DiagnosticSink};
use crate::model::{
    ids::{IdSequence, NEXT_SONG_ID, SongId},
    metrics::{DurationSecs, Rating},
    tag::{TagError, TagList, TagName},
    text::{Artist, Title, fold, trim_blank},
};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Reasons a song could not be created. The message is the diagnostic line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SongError {
    #[error("[错误] 标题不能为空")]
    EmptyTitle,

    #[error("[错误] 艺人不能为空")]
    EmptyArtist,

    #[error("[错误] 时长必须为正整数（秒）")]
    InvalidDuration(i64),

    #[error("[错误] 评分必须在 1...5 之间")]
    InvalidRating(i64),

    #[error("[错误] 歌曲编号已用尽")]
    IdsExhausted,
}

/// Every check that failed for one construction attempt, in check order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongValidationErrors(Vec<SongError>);

impl SongValidationErrors {
    #[must_use]
    pub fn errors(&self) -> &[SongError] {
        &self.0
    }

    #[must_use]
    pub fn into_errors(self) -> Vec<SongError> {
        self.0
    }

    #[must_use]
    pub fn contains(&self, err: &SongError) -> bool {
        self.0.contains(err)
    }
}

impl fmt::Display for SongValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SongValidationErrors {}

impl From<SongError> for SongValidationErrors {
    fn from(err: SongError) -> Self {
        Self(vec![err])
    }
}

/// A refused edit on an existing song. The message is the advisory line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SongEditError {
    #[error("[提示] 标题不能为空，已忽略本次修改")]
    EmptyTitle,

    #[error("[提示] 艺人不能为空，已忽略本次修改")]
    EmptyArtist,

    #[error("[提示] 时长需为正整数，已忽略本次修改")]
    InvalidDuration(i64),

    #[error("[提示] 评分需在 1..5，已忽略本次修改")]
    InvalidRating(i64),
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Raw, unchecked input for a new song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongDraft {
    pub title: String,
    pub artist: String,
    pub duration_secs: i64,
    pub rating: i64,
}

impl SongDraft {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        duration_secs: i64,
        rating: i64,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            duration_secs,
            rating,
        }
    }

    /// Check every field without touching any id sequence.
    ///
    /// # Errors
    ///
    /// Returns all failed checks, in the order title, artist, duration, rating.
    pub fn validate(&self) -> Result<ValidatedSong, SongValidationErrors> {
        let title = Title::parse(&self.title).map_err(|_| SongError::EmptyTitle);
        let artist = Artist::parse(&self.artist).map_err(|_| SongError::EmptyArtist);
        let duration = DurationSecs::new(self.duration_secs)
            .ok_or(SongError::InvalidDuration(self.duration_secs));
        let rating = Rating::new(self.rating).ok_or(SongError::InvalidRating(self.rating));

        match (title, artist, duration, rating) {
            (Ok(title), Ok(artist), Ok(duration), Ok(rating)) => Ok(ValidatedSong {
                title,
                artist,
                duration,
                rating,
            }),
            (title, artist, duration, rating) => {
                let errors = [title.err(), artist.err(), duration.err(), rating.err()]
                    .into_iter()
                    .flatten()
                    .collect();
                Err(SongValidationErrors(errors))
            }
        }
    }
}

/// A draft that passed validation but has no id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSong {
    title: Title,
    artist: Artist,
    duration: DurationSecs,
    rating: Rating,
}

impl ValidatedSong {
    /// Take the next id from `ids` and produce the song.
    ///
    /// # Errors
    ///
    /// Returns `SongError::IdsExhausted` if the sequence has run out.
    pub fn assign_id(self, ids: &IdSequence) -> Result<Song, SongError> {
        let id = ids.next_id().ok_or(SongError::IdsExhausted)?;
        tracing::debug!(song.id = %id, title = %self.title, "assigned song id");
        Ok(Song {
            id,
            title: self.title,
            artist: self.artist,
            duration: self.duration,
            rating: self.rating,
            tags: TagList::new(),
        })
    }
}

//
// ─── SONG ──────────────────────────────────────────────────────────────────────
//

/// A catalogued song.
///
/// Every `Song` value passed validation and owns a unique id. Equality and
/// ordering follow the catalogue sort: higher rating first, then title
/// (bytewise), then id.
#[derive(Debug, Clone, Serialize)]
pub struct Song {
    id: SongId,
    title: Title,
    artist: Artist,
    duration: DurationSecs,
    rating: Rating,
    tags: TagList,
}

impl Song {
    /// Create a song, reporting failures to the process-wide diagnostics and
    /// drawing the id from the process-wide sequence.
    ///
    /// # Errors
    ///
    /// Returns every failed check; each one has already been emitted as a line.
    pub fn new(
        title: &str,
        artist: &str,
        duration_secs: i64,
        rating: i64,
    ) -> Result<Self, SongValidationErrors> {
        diagnostics::with_sink(|sink| {
            Self::with_sequence(title, artist, duration_secs, rating, &NEXT_SONG_ID, sink)
        })
    }

    /// Like [`Song::new`], with the id sequence and sink chosen by the caller.
    ///
    /// # Errors
    ///
    /// Returns every failed check; each one has already been emitted on `sink`.
    pub fn with_sequence(
        title: &str,
        artist: &str,
        duration_secs: i64,
        rating: i64,
        ids: &IdSequence,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Self, SongValidationErrors> {
        let outcome = SongDraft::new(title, artist, duration_secs, rating)
            .validate()
            .and_then(|validated| validated.assign_id(ids).map_err(SongValidationErrors::from));

        if let Err(errors) = &outcome {
            tracing::debug!(?errors, "song rejected");
            for err in errors.errors() {
                diagnostics::report(sink, err);
            }
        }
        outcome
    }

    #[must_use]
    pub fn id(&self) -> SongId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    #[must_use]
    pub fn artist(&self) -> &str {
        self.artist.as_str()
    }

    #[must_use]
    pub fn duration_secs(&self) -> u64 {
        self.duration.value()
    }

    #[must_use]
    pub fn rating(&self) -> u8 {
        self.rating.value()
    }

    #[must_use]
    pub fn tags(&self) -> &TagList {
        &self.tags
    }

    /// Always true: invalid songs are never constructed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        true
    }

    // ─── Edits ──────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// `SongEditError::EmptyTitle` if `title` is blank; the song is unchanged.
    pub fn try_set_title(&mut self, title: &str) -> Result<(), SongEditError> {
        self.title = Title::parse(title).map_err(|_| SongEditError::EmptyTitle)?;
        tracing::trace!(song.id = %self.id, title = %self.title, "title updated");
        Ok(())
    }

    /// # Errors
    ///
    /// `SongEditError::EmptyArtist` if `artist` is blank; the song is unchanged.
    pub fn try_set_artist(&mut self, artist: &str) -> Result<(), SongEditError> {
        self.artist = Artist::parse(artist).map_err(|_| SongEditError::EmptyArtist)?;
        tracing::trace!(song.id = %self.id, artist = %self.artist, "artist updated");
        Ok(())
    }

    /// # Errors
    ///
    /// `SongEditError::InvalidDuration` unless `secs > 0`.
    pub fn try_set_duration(&mut self, secs: i64) -> Result<(), SongEditError> {
        self.duration = DurationSecs::new(secs).ok_or(SongEditError::InvalidDuration(secs))?;
        tracing::trace!(song.id = %self.id, secs, "duration updated");
        Ok(())
    }

    /// # Errors
    ///
    /// `SongEditError::InvalidRating` unless `1 <= rating <= 5`.
    pub fn try_set_rating(&mut self, rating: i64) -> Result<(), SongEditError> {
        self.rating = Rating::new(rating).ok_or(SongEditError::InvalidRating(rating))?;
        tracing::trace!(song.id = %self.id, rating, "rating updated");
        Ok(())
    }

    pub fn set_title(&mut self, title: &str) -> bool {
        diagnostics::with_sink(|sink| self.set_title_with(title, sink))
    }

    pub fn set_artist(&mut self, artist: &str) -> bool {
        diagnostics::with_sink(|sink| self.set_artist_with(artist, sink))
    }

    pub fn set_duration(&mut self, secs: i64) -> bool {
        diagnostics::with_sink(|sink| self.set_duration_with(secs, sink))
    }

    pub fn set_rating(&mut self, rating: i64) -> bool {
        diagnostics::with_sink(|sink| self.set_rating_with(rating, sink))
    }

    pub fn set_title_with(&mut self, title: &str, sink: &mut dyn DiagnosticSink) -> bool {
        applied(self.try_set_title(title), sink)
    }

    pub fn set_artist_with(&mut self, artist: &str, sink: &mut dyn DiagnosticSink) -> bool {
        applied(self.try_set_artist(artist), sink)
    }

    pub fn set_duration_with(&mut self, secs: i64, sink: &mut dyn DiagnosticSink) -> bool {
        applied(self.try_set_duration(secs), sink)
    }

    pub fn set_rating_with(&mut self, rating: i64, sink: &mut dyn DiagnosticSink) -> bool {
        applied(self.try_set_rating(rating), sink)
    }

    // ─── Tags ───────────────────────────────────────────────────────────────

    /// # Errors
    ///
    /// See [`TagList::try_add`].
    pub fn try_add_tag(&mut self, tag: &str) -> Result<&TagName, TagError> {
        let added = self.tags.try_add(tag)?;
        tracing::debug!(song.id = %self.id, tag = %added, "tag added");
        Ok(added)
    }

    /// # Errors
    ///
    /// See [`TagList::try_remove`].
    pub fn try_remove_tag(&mut self, tag: &str) -> Result<TagName, TagError> {
        let removed = self.tags.try_remove(tag)?;
        tracing::debug!(song.id = %self.id, tag = %removed, "tag removed");
        Ok(removed)
    }

    pub fn add_tag(&mut self, tag: &str) -> bool {
        diagnostics::with_sink(|sink| self.add_tag_with(tag, sink))
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        diagnostics::with_sink(|sink| self.remove_tag_with(tag, sink))
    }

    pub fn add_tag_with(&mut self, tag: &str, sink: &mut dyn DiagnosticSink) -> bool {
        applied(self.try_add_tag(tag).map(|_| ()), sink)
    }

    pub fn remove_tag_with(&mut self, tag: &str, sink: &mut dyn DiagnosticSink) -> bool {
        applied(self.try_remove_tag(tag).map(|_| ()), sink)
    }

    // ─── Queries ────────────────────────────────────────────────────────────

    /// Case-insensitive (ASCII) substring search over title, artist and tags.
    ///
    /// A blank keyword never matches.
    #[must_use]
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let keyword = trim_blank(keyword);
        if keyword.is_empty() {
            return false;
        }
        let needle = fold(keyword);
        fold(self.title.as_str()).contains(&needle)
            || fold(self.artist.as_str()).contains(&needle)
            || self.tags.any_contains(&needle)
    }

    /// Write the one-line listing form, without a trailing newline.
    ///
    /// # Errors
    ///
    /// Propagates errors from `out`.
    pub fn render(&self, out: &mut impl fmt::Write) -> fmt::Result {
        write!(out, "{self}")
    }

    /// Strict catalogue order: see the type-level docs.
    #[must_use]
    pub fn less_than(&self, other: &Song) -> bool {
        self.cmp(other) == Ordering::Less
    }
}

fn applied<E>(result: Result<(), E>, sink: &mut dyn DiagnosticSink) -> bool
where
    E: fmt::Display + fmt::Debug,
{
    match result {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(?err, "edit ignored");
            diagnostics::report(sink, &err);
            false
        }
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[#{}] {} - {} ({}) {}",
            self.id, self.artist, self.title, self.duration, self.rating
        )?;
        if !self.tags.is_empty() {
            write!(f, " [tags: {}]", self.tags)?;
        }
        Ok(())
    }
}

impl PartialEq for Song {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Song {}

impl PartialOrd for Song {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Song {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .rating
            .cmp(&self.rating)
            .then_with(|| self.title.as_str().cmp(other.title.as_str()))
            .then_with(|| self.id.cmp(&other.id))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;

    fn song(ids: &IdSequence, title: &str, rating: i64) -> Song {
        let mut sink = MemorySink::new();
        Song::with_sequence(title, "Artist", 200, rating, ids, &mut sink).unwrap()
    }

    #[test]
    fn draft_collects_every_failure_in_order() {
        let err = SongDraft::new("", "   ", 0, 9).validate().unwrap_err();
        assert_eq!(
            err.errors(),
            [
                SongError::EmptyTitle,
                SongError::EmptyArtist,
                SongError::InvalidDuration(0),
                SongError::InvalidRating(9),
            ]
        );
    }

    #[test]
    fn draft_validation_does_not_consume_ids() {
        let ids = IdSequence::new();
        let validated = SongDraft::new("A", "B", 10, 3).validate().unwrap();
        assert_eq!(ids.peek(), 1);
        let song = validated.assign_id(&ids).unwrap();
        assert_eq!(song.id(), SongId::new(1));
        assert_eq!(ids.peek(), 2);
    }

    #[test]
    fn exhausted_sequence_is_reported() {
        let ids = IdSequence::starting_at(u64::MAX);
        let mut sink = MemorySink::new();
        let err = Song::with_sequence("A", "B", 10, 3, &ids, &mut sink).unwrap_err();
        assert_eq!(err.errors(), [SongError::IdsExhausted]);
        assert_eq!(sink.lines(), ["[错误] 歌曲编号已用尽"]);
    }

    #[test]
    fn failed_construction_emits_lines_and_keeps_counter() {
        let ids = IdSequence::new();
        let mut sink = MemorySink::new();
        let err = Song::with_sequence("ok", "ok", -5, 3, &ids, &mut sink).unwrap_err();
        assert!(err.contains(&SongError::InvalidDuration(-5)));
        assert_eq!(sink.lines(), ["[错误] 时长必须为正整数（秒）"]);
        assert_eq!(ids.peek(), 1);
    }

    #[test]
    fn validation_errors_display_one_per_line() {
        let err = SongDraft::new("", "x", 1, 0).validate().unwrap_err();
        assert_eq!(err.to_string(), "[错误] 标题不能为空\n[错误] 评分必须在 1...5 之间");
    }

    #[test]
    fn setters_store_trimmed_values() {
        let ids = IdSequence::new();
        let mut s = song(&ids, "Old", 3);
        let mut sink = MemorySink::new();
        assert!(s.set_title_with("  New Title ", &mut sink));
        assert!(s.set_artist_with("\tSomeone\n", &mut sink));
        assert!(s.set_duration_with(61, &mut sink));
        assert!(s.set_rating_with(5, &mut sink));
        assert_eq!(s.title(), "New Title");
        assert_eq!(s.artist(), "Someone");
        assert_eq!(s.duration_secs(), 61);
        assert_eq!(s.rating(), 5);
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn failed_setters_leave_song_untouched() {
        let ids = IdSequence::new();
        let mut s = song(&ids, "Keep", 4);
        let before = s.clone();
        let mut sink = MemorySink::new();

        assert!(!s.set_title_with("   ", &mut sink));
        assert!(!s.set_artist_with("", &mut sink));
        assert!(!s.set_duration_with(0, &mut sink));
        assert!(!s.set_rating_with(6, &mut sink));

        assert_eq!(s.title(), before.title());
        assert_eq!(s.artist(), before.artist());
        assert_eq!(s.duration_secs(), before.duration_secs());
        assert_eq!(s.rating(), before.rating());
        assert_eq!(s.id(), before.id());
        assert_eq!(
            sink.lines(),
            [
                "[提示] 标题不能为空，已忽略本次修改",
                "[提示] 艺人不能为空，已忽略本次修改",
                "[提示] 时长需为正整数，已忽略本次修改",
                "[提示] 评分需在 1..5，已忽略本次修改",
            ]
        );
    }

    #[test]
    fn durations_past_u32_are_accepted() {
        let ids = IdSequence::new();
        let mut sink = MemorySink::new();
        let mut s = Song::with_sequence("Drone", "Sleep", 5_000_000_000, 3, &ids, &mut sink).unwrap();
        assert_eq!(s.duration_secs(), 5_000_000_000);
        assert!(s.set_duration_with(6_000_000_000, &mut sink));
        assert_eq!(s.duration_secs(), 6_000_000_000);
        assert_eq!(s.to_string(), "[#1] Sleep - Drone (6000000000s) ***");
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn try_setters_report_typed_errors() {
        let ids = IdSequence::new();
        let mut s = song(&ids, "T", 2);
        assert_eq!(s.try_set_rating(0), Err(SongEditError::InvalidRating(0)));
        assert_eq!(s.try_set_duration(-1), Err(SongEditError::InvalidDuration(-1)));
        assert_eq!(s.try_set_title(""), Err(SongEditError::EmptyTitle));
        assert_eq!(s.try_set_artist(" "), Err(SongEditError::EmptyArtist));
    }

    #[test]
    fn tag_edits_report_advisories() {
        let ids = IdSequence::new();
        let mut s = song(&ids, "T", 2);
        let mut sink = MemorySink::new();
        assert!(!s.add_tag_with("  ", &mut sink));
        assert!(s.add_tag_with("Live", &mut sink));
        assert!(!s.add_tag_with("LIVE", &mut sink));
        assert!(!s.remove_tag_with("studio", &mut sink));
        assert!(s.remove_tag_with(" live ", &mut sink));
        assert!(s.tags().is_empty());
        assert_eq!(
            sink.lines(),
            [
                "[提示] 空标签已忽略",
                "[提示] 标签已存在（忽略大小写）",
                "[提示] 未找到该标签",
            ]
        );
    }

    #[test]
    fn keyword_matches_title_artist_and_tags() {
        let ids = IdSequence::new();
        let mut sink = MemorySink::new();
        let mut s =
            Song::with_sequence("Bohemian Rhapsody", "Queen", 354, 5, &ids, &mut sink).unwrap();
        s.add_tag_with("Rock", &mut sink);
        assert!(s.matches_keyword("rhapsody"));
        assert!(s.matches_keyword(" QUEEN "));
        assert!(s.matches_keyword("ock"));
        assert!(!s.matches_keyword("pop"));
        assert!(!s.matches_keyword(""));
        assert!(!s.matches_keyword(" \t "));
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn render_without_tags_has_no_suffix() {
        let ids = IdSequence::new();
        let mut sink = MemorySink::new();
        let s = Song::with_sequence("Yesterday", "The Beatles", 125, 4, &ids, &mut sink).unwrap();
        let mut out = String::new();
        s.render(&mut out).unwrap();
        assert_eq!(out, "[#1] The Beatles - Yesterday (125s) ****");
    }

    #[test]
    fn ordering_prefers_rating_then_title_then_id() {
        let ids = IdSequence::new();
        let a = song(&ids, "Same", 3);
        let b = song(&ids, "Same", 3);
        let c = song(&ids, "Zed", 5);
        let d = song(&ids, "abc", 3);

        assert!(c.less_than(&a));
        assert!(a.less_than(&b));
        assert!(!b.less_than(&a));
        // 'S' (0x53) sorts before 'a' (0x61).
        assert!(b.less_than(&d));
        assert!(!a.less_than(&a));
    }

    #[test]
    fn equality_is_identity() {
        let ids = IdSequence::new();
        let a = song(&ids, "Same", 3);
        let b = song(&ids, "Same", 3);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn serializes_fields_flat() {
        let ids = IdSequence::new();
        let mut sink = MemorySink::new();
        let mut s = Song::with_sequence("Imagine", "John Lennon", 183, 5, &ids, &mut sink).unwrap();
        s.add_tag_with("Peace", &mut sink);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "title": "Imagine",
                "artist": "John Lennon",
                "duration": 183,
                "rating": 5,
                "tags": ["Peace"],
            })
        );
    }
}
