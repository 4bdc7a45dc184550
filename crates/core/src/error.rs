use thiserror::Error;

use crate::clip::ClipId;
use crate::mixer::TrackId;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown track: {0}")]
    UnknownTrack(TrackId),

    #[error("unknown clip: {0}")]
    UnknownClip(ClipId),

    /// A grouped mutation failed and was rolled back. Surfaced to the caller
    /// because swallowing it would corrupt the undo history silently.
    #[error("undo group '{label}' rolled back")]
    Transaction {
        label: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;
