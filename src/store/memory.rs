//! store/memory.rs
//! A tag store over files simulated in memory.
//!
//! - [`MemoryDisk`] is the "filesystem": per path, an optional V1 and V2 tag
//! - [`MemoryStore`] is one store handle bound to a path on that disk
//!
//! Handles are cheap and share the disk, so a tag written through one handle
//! is visible to the next one that associates with the same path.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::{RawFrame, TagStore, estimate_size};
use crate::info::{FieldType, FrameId, code};
use crate::types::TagType;

#[derive(Debug, Clone, Default)]
struct StoredFile {
    v1: Option<Vec<RawFrame>>,
    v2: Option<Vec<RawFrame>>,
}

/// Simulated files, shared by every store handle made from it.
#[derive(Debug, Clone, Default)]
pub struct MemoryDisk {
    files: Rc<RefCell<HashMap<PathBuf, StoredFile>>>,
}

impl MemoryDisk {
    pub fn new() -> Self {
        MemoryDisk::default()
    }

    /// A fresh store handle on this disk.
    pub fn store(&self) -> MemoryStore {
        MemoryStore {
            disk: self.clone(),
            path: None,
            frames: Vec::new(),
            found: TagType::NONE,
            padding: true,
        }
    }

    /// Put a tag on a file directly, replacing any tag of the same type.
    /// `kind` selects V1, V2 or both.
    pub fn write(&self, path: impl AsRef<Path>, kind: TagType, frames: Vec<RawFrame>) {
        let mut files = self.files.borrow_mut();
        let file = files.entry(path.as_ref().to_path_buf()).or_default();
        if kind.contains(TagType::V1) {
            file.v1 = Some(v1_subset(&frames));
        }
        if kind.contains(TagType::V2) {
            file.v2 = Some(frames);
        }
    }

    /// The frames of one tag type on a file (`V1` or `V2`).
    pub fn read(&self, path: impl AsRef<Path>, kind: TagType) -> Option<Vec<RawFrame>> {
        let files = self.files.borrow();
        let file = files.get(path.as_ref())?;
        if kind == TagType::V1 {
            file.v1.clone()
        } else if kind == TagType::V2 {
            file.v2.clone()
        } else {
            None
        }
    }

    /// Which tag types a file currently carries.
    pub fn tag_types(&self, path: impl AsRef<Path>) -> TagType {
        let files = self.files.borrow();
        let Some(file) = files.get(path.as_ref()) else {
            return TagType::NONE;
        };
        let mut kinds = TagType::NONE;
        if file.v1.is_some() {
            kinds |= TagType::V1;
        }
        if file.v2.is_some() {
            kinds |= TagType::V2;
        }
        kinds
    }
}

/// One store handle on a [`MemoryDisk`].
#[derive(Debug)]
pub struct MemoryStore {
    disk: MemoryDisk,
    path: Option<PathBuf>,
    frames: Vec<RawFrame>,
    found: TagType,
    padding: bool,
}

impl TagStore for MemoryStore {
    fn associate(&mut self, path: &Path, filter: TagType) {
        self.path = Some(path.to_path_buf());
        self.frames.clear();
        self.found = TagType::NONE;

        let files = self.disk.files.borrow();
        let Some(file) = files.get(path) else {
            return;
        };

        if filter.contains(TagType::V2) {
            if let Some(v2) = &file.v2 {
                self.frames = v2.clone();
                self.found |= TagType::V2;
            }
        }
        if filter.contains(TagType::V1) {
            if let Some(v1) = &file.v1 {
                self.found |= TagType::V1;
                // V2 wins; V1 only fills frame kinds V2 lacks.
                for frame in v1 {
                    if !self.frames.iter().any(|f| f.code() == frame.code()) {
                        self.frames.push(frame.clone());
                    }
                }
            }
        }
    }

    fn frames(&self) -> &[RawFrame] {
        &self.frames
    }

    fn add(&mut self, frame: RawFrame) {
        self.frames.push(frame);
    }

    fn clear(&mut self) {
        self.frames.clear();
    }

    fn set_padding(&mut self, padding: bool) {
        self.padding = padding;
    }

    fn strip(&mut self, kind: TagType) -> TagType {
        let Some(path) = &self.path else {
            return TagType::NONE;
        };
        let mut files = self.disk.files.borrow_mut();
        let Some(file) = files.get_mut(path) else {
            return TagType::NONE;
        };

        let mut stripped = TagType::NONE;
        if kind.contains(TagType::V1) && file.v1.take().is_some() {
            stripped |= TagType::V1;
        }
        if kind.contains(TagType::V2) && file.v2.take().is_some() {
            stripped |= TagType::V2;
        }
        stripped
    }

    fn persist(&mut self, kind: TagType) -> TagType {
        let Some(path) = &self.path else {
            return TagType::NONE;
        };

        let mut written = TagType::NONE;
        let mut files = self.disk.files.borrow_mut();
        if kind.contains(TagType::V2) && !self.frames.is_empty() {
            let file = files.entry(path.clone()).or_default();
            file.v2 = Some(self.frames.clone());
            written |= TagType::V2;
        }
        if kind.contains(TagType::V1) {
            let v1 = v1_subset(&self.frames);
            if !v1.is_empty() {
                let file = files.entry(path.clone()).or_default();
                file.v1 = Some(v1);
                written |= TagType::V1;
            }
        }
        written
    }

    fn has_tag_type(&self, kind: TagType) -> bool {
        self.found.intersects(kind)
    }

    fn estimated_size(&self) -> usize {
        estimate_size(&self.frames, self.padding, self.found.contains(TagType::V1))
    }
}

/// The frames an ID3v1 tag can hold: the first title, artist, album, year,
/// comment, track and genre, with text narrowed and cut to the V1 slot size.
fn v1_subset(frames: &[RawFrame]) -> Vec<RawFrame> {
    let mut out: Vec<RawFrame> = Vec::new();
    for frame in frames {
        let Some(limit) = v1_slot_len(frame.code()) else {
            continue;
        };
        if out.iter().any(|f| f.code() == frame.code()) {
            continue;
        }
        out.push(narrow(frame, limit));
    }
    out
}

fn v1_slot_len(frame_code: u16) -> Option<usize> {
    match FrameId::from_code(frame_code)? {
        FrameId::Tit2 | FrameId::Tpe1 | FrameId::Talb | FrameId::Comm => Some(30),
        FrameId::Tyer => Some(4),
        FrameId::Trck | FrameId::Tcon => Some(255),
        _ => None,
    }
}

fn narrow(frame: &RawFrame, limit: usize) -> RawFrame {
    let mut out = RawFrame::new(frame.code());
    for field in frame.fields() {
        let mut field = field.clone();
        if field.code() == code::TEXTENC {
            field.set_integer(0);
        } else if field.field_type() == FieldType::Text {
            let text = field.unicode().or_else(|| field.ascii()).unwrap_or_default();
            let cut: String = text.chars().take(limit).collect();
            field.set_encoding(0);
            field.set_ascii(&cut);
        }
        out.push_field(field);
    }
    out
}
