//! The `Song` record of the songbook catalogue.
//!
//! A [`Song`] only exists once its title, artist, duration and rating have
//! been validated; it then carries a process-unique [`SongId`]. Failed
//! constructions and refused edits are described, one line each, on a
//! [`diagnostics::DiagnosticSink`].

pub mod diagnostics;
pub mod error;
pub mod model;

pub use error::Error;
pub use model::{Song, SongDraft, SongId};
