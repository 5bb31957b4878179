mod ids;
mod metrics;
mod song;
mod tag;
mod text;

pub use ids::{IdSequence, ParseIdError, SongId, peek_next_song_id};
pub use metrics::{DurationSecs, Rating};
pub use song::{Song, SongDraft, SongEditError, SongError, SongValidationErrors, ValidatedSong};
pub use tag::{TagError, TagList, TagName};
pub use text::{Artist, ArtistKind, Text, TextError, Title, TitleKind};
