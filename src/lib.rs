//! sonora-tags
//!
//! # What this crate is
//! A structured, editable model of an MP3 file's ID3v1/ID3v2 tag.
//!
//! - A [`Tag`] is an ordered list of [`Frame`]s (title, comment, picture, ...)
//! - A `Frame` is a [`FrameId`] plus ordered `field -> value` pairs
//! - The registry ([`info`]) knows every standard frame and field, their
//!   types and numeric codes
//! - A [`TagStore`] owns the binary layout and the file; frames cross into it
//!   as field-typed records ([`RawFrame`])
//!
//! # How a round trip works
//! **open -> store lists records -> decode into frames -> edit -> update ->
//! encode into fresh records -> store persists**
//!
//! Nothing touches the file until [`Tag::update`]. Invalid frames are dropped
//! on update; [`Tag::update_strict`] refuses them instead.
//!
//! ```
//! use sonora_tags::{FrameId, MemoryDisk, Tag, TagOptions, TagType};
//!
//! let disk = MemoryDisk::new();
//! let mut tag = Tag::with_store(disk.store(), "shy_boy.mp3", TagOptions::default());
//! tag.set_title(Some("Shy Boy"));
//! tag.set_artist(Some("Katie Melua"));
//! assert_eq!(tag.update_as(TagType::V2), Some(TagType::V2));
//!
//! let tag = Tag::with_store(disk.store(), "shy_boy.mp3", TagOptions::default());
//! assert_eq!(tag.text(&FrameId::Tpe1), Some("Katie Melua"));
//! ```

pub mod info;
pub mod store;

mod error;
mod frame;
mod tag;
mod translate;
mod types;

pub use error::{Result, TagError};
pub use frame::{FieldValue, Frame};
pub use info::{FieldId, FieldType, FrameId};
pub use store::{Id3FileStore, MemoryDisk, MemoryStore, RawField, RawFrame, RawValue, TagStore};
pub use tag::{InvalidFrame, Tag, UpdateReport};
pub use types::{TagOptions, TagType};
