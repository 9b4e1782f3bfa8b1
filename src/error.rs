//! Error type for store I/O and strict updates.

use std::path::PathBuf;

use thiserror::Error;

use crate::tag::InvalidFrame;

#[derive(Error, Debug)]
pub enum TagError {
    /// A strict update found frames the registry cannot write in full.
    #[error("tag has {} invalid frame(s): {}", .0.len(), list(.0))]
    InvalidFrames(Vec<InvalidFrame>),

    /// The store reported that no tag type was written.
    #[error("no tag written to {0}")]
    NothingWritten(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Id3(#[from] id3::Error),
}

pub type Result<T> = std::result::Result<T, TagError>;

fn list(frames: &[InvalidFrame]) -> String {
    frames
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
