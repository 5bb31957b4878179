use thiserror::Error;

use crate::model::{ParseIdError, SongEditError, SongError, SongValidationErrors, TagError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Song(#[from] SongError),
    #[error(transparent)]
    Validation(#[from] SongValidationErrors),
    #[error(transparent)]
    Edit(#[from] SongEditError),
    #[error(transparent)]
    Tag(#[from] TagError),
    #[error(transparent)]
    ParseId(#[from] ParseIdError),
}
