//! translate/mod.rs
//!
//! Frame <-> raw record translation, driven by the registry.
//! - [`read_frame`] decodes a store record into a `Frame`
//! - [`write_frame`] encodes a `Frame` into a freshly allocated record

mod read;
mod write;

pub(crate) use read::read_frame;
pub(crate) use write::write_frame;
