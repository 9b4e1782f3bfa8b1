//! tag/mod.rs
//!
//! The tag collection: every frame of one file, in store order.
//! Public API:
//! - [`Tag`] loads through a [`TagStore`], is edited in memory, and is only
//!   written back by an explicit [`Tag::update`]
//! - [`InvalidFrame`] describes a frame the registry cannot write in full
//! - [`UpdateReport`] lists what an update had to drop

mod accessors;
mod util;

use std::fmt;
use std::ops::Index;
use std::path::{Path, PathBuf};

use crate::error::{Result, TagError};
use crate::frame::Frame;
use crate::info::{FieldId, FrameId};
use crate::store::{Id3FileStore, TagStore};
use crate::translate::{read_frame, write_frame};
use crate::types::{TagOptions, TagType};

/// A frame that cannot be written as is: either its ID is unknown (`fields`
/// is empty) or it carries fields its frame kind does not declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidFrame {
    pub id: FrameId,
    pub fields: Vec<FieldId>,
}

impl InvalidFrame {
    pub fn new(id: impl Into<FrameId>, fields: Vec<FieldId>) -> Self {
        InvalidFrame {
            id: id.into(),
            fields,
        }
    }
}

impl fmt::Display for InvalidFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)?;
        if !self.fields.is_empty() {
            let fields: Vec<&str> = self.fields.iter().map(FieldId::as_str).collect();
            write!(f, " [{}]", fields.join(", "))?;
        }
        Ok(())
    }
}

/// Outcome of [`Tag::update_report`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Tag types the store wrote; `None` if it wrote nothing.
    pub written: Option<TagType>,
    /// Frames removed from the tag because their ID is unknown.
    pub dropped_frames: Vec<FrameId>,
    /// Fields left out of the written frames, per frame.
    pub dropped_fields: Vec<(FrameId, FieldId)>,
}

/// The frames of one file.
///
/// Frames keep store order and duplicates are allowed (several comments,
/// even several titles). Nothing touches the file until an update.
#[derive(Debug)]
pub struct Tag<S: TagStore = Id3FileStore> {
    frames: Vec<Frame>,
    path: PathBuf,
    read_type: TagType,
    padding: bool,
    store: S,
}

impl Tag<Id3FileStore> {
    /// Load every tag type of a real file.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Tag::open_with(path, TagOptions::default())
    }

    pub fn open_with(path: impl AsRef<Path>, options: TagOptions) -> Self {
        Tag::with_store(Id3FileStore::new(), path, options)
    }

    /// Remove tag types from a real file; returns the types actually removed.
    pub fn strip(path: impl AsRef<Path>, kind: TagType) -> TagType {
        Tag::strip_with(Id3FileStore::new(), path, kind)
    }
}

impl<S: TagStore> Tag<S> {
    /// Associate `store` with `path` and decode what it holds. Records whose
    /// frame kind the registry does not know are dropped.
    pub fn with_store(mut store: S, path: impl AsRef<Path>, options: TagOptions) -> Self {
        let path = path.as_ref().to_path_buf();
        store.associate(&path, options.read_type);

        let mut frames = Vec::with_capacity(store.frames().len());
        for raw in store.frames() {
            match read_frame(raw) {
                Some(frame) => frames.push(frame),
                None => log::debug!(
                    "{}: dropping frame with unknown code {}",
                    path.display(),
                    raw.code()
                ),
            }
        }
        log::debug!(
            "{}: loaded {} frame(s) from {}",
            path.display(),
            frames.len(),
            options.read_type
        );

        Tag {
            frames,
            path,
            read_type: options.read_type,
            padding: options.padding,
            store,
        }
    }

    /// Throwaway association with `path`, then strip.
    pub fn strip_with(mut store: S, path: impl AsRef<Path>, kind: TagType) -> TagType {
        store.associate(path.as_ref(), kind);
        let stripped = store.strip(kind);
        log::debug!("{}: stripped {stripped}", path.as_ref().display());
        stripped
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_type(&self) -> TagType {
        self.read_type
    }

    pub fn padding(&self) -> bool {
        self.padding
    }

    pub fn set_padding(&mut self, padding: bool) {
        self.padding = padding;
    }

    // ---------- lookup ----------

    /// First frame with `id`.
    pub fn find(&self, id: &FrameId) -> Option<&Frame> {
        self.frames.iter().find(|f| f.id() == id)
    }

    pub fn find_mut(&mut self, id: &FrameId) -> Option<&mut Frame> {
        self.frames.iter_mut().find(|f| f.id() == id)
    }

    /// Text of the first frame with `id`.
    pub fn text(&self, id: &FrameId) -> Option<&str> {
        self.find(id).and_then(Frame::text)
    }

    /// Replace every `id` frame with a single `{id, text}` frame appended at
    /// the end; `None` only removes.
    pub fn set_text(&mut self, id: FrameId, text: Option<&str>) {
        self.remove_frames(&id);
        if let Some(text) = text {
            self.frames.push(Frame::with_text(id, text));
        }
    }

    /// Remove every frame with `id`; returns how many went.
    pub fn remove_frames(&mut self, id: &FrameId) -> usize {
        let before = self.frames.len();
        self.frames.retain(|f| f.id() != id);
        before - self.frames.len()
    }

    // ---------- validation ----------

    /// Frames that would not be written in full, in tag order. `None` when
    /// every frame is valid.
    pub fn invalid_frames(&self) -> Option<Vec<InvalidFrame>> {
        let invalid: Vec<InvalidFrame> = self
            .frames
            .iter()
            .filter_map(|frame| {
                let Some(info) = frame.id().info() else {
                    return Some(InvalidFrame::new(frame.id().clone(), Vec::new()));
                };
                let mut fields: Vec<FieldId> = Vec::new();
                for field in frame.field_ids() {
                    if !info.declares(field) && !fields.contains(field) {
                        fields.push(field.clone());
                    }
                }
                (!fields.is_empty()).then(|| InvalidFrame::new(frame.id().clone(), fields))
            })
            .collect();

        (!invalid.is_empty()).then_some(invalid)
    }

    // ---------- persist ----------

    /// Write the tag as the tag types it was read as.
    pub fn update(&mut self) -> Option<TagType> {
        self.update_as(self.read_type)
    }

    /// Write the tag as `write_type`. Frames with unknown IDs are removed
    /// from the tag for good; undeclared fields are left out of the file.
    pub fn update_as(&mut self, write_type: TagType) -> Option<TagType> {
        self.update_report(write_type).written
    }

    /// [`Tag::update_as`], also reporting everything it dropped.
    pub fn update_report(&mut self, write_type: TagType) -> UpdateReport {
        self.store.strip(write_type);
        self.store.rebind(&self.path, write_type);

        let mut dropped_frames = Vec::new();
        let mut dropped_fields = Vec::new();
        let store = &mut self.store;
        self.frames.retain(|frame| {
            let Some(raw) = frame.id().info().and_then(|info| {
                let mut raw = store.allocate(info.code)?;
                for field in write_frame(frame, &info, &mut raw) {
                    dropped_fields.push((frame.id().clone(), field));
                }
                Some(raw)
            }) else {
                log::warn!("dropping frame {}: unknown to the store", frame.id());
                dropped_frames.push(frame.id().clone());
                return false;
            };
            store.add(raw);
            true
        });

        self.store.set_padding(self.padding);
        let mask = self.store.persist(write_type);
        let written = (!mask.is_empty()).then_some(mask);

        log::debug!(
            "{}: update as {write_type} wrote {mask} ({} frame(s), {} dropped)",
            self.path.display(),
            self.frames.len(),
            dropped_frames.len()
        );
        UpdateReport {
            written,
            dropped_frames,
            dropped_fields,
        }
    }

    /// Like [`Tag::update`], but refuses to write a tag with invalid frames
    /// and treats writing nothing as an error.
    pub fn update_strict(&mut self) -> Result<TagType> {
        if let Some(invalid) = self.invalid_frames() {
            return Err(TagError::InvalidFrames(invalid));
        }
        self.update_report(self.read_type)
            .written
            .ok_or_else(|| TagError::NothingWritten(self.path.clone()))
    }

    // ---------- size & presence ----------

    /// The store's estimate of the tag's size on disk, in bytes.
    pub fn size(&self) -> usize {
        self.store.estimated_size()
    }

    /// Whether a V1 or V2 tag was found when the tag was read.
    pub fn has_tag(&self) -> bool {
        self.store.has_tag_type(TagType::BOTH)
    }

    pub fn has_tag_type(&self, kind: TagType) -> bool {
        self.store.has_tag_type(kind)
    }

    // ---------- sequence ----------

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut Vec<Frame> {
        &mut self.frames
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn insert(&mut self, index: usize, frame: Frame) {
        self.frames.insert(index, frame);
    }

    pub fn retain(&mut self, keep: impl FnMut(&Frame) -> bool) {
        self.frames.retain(keep);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl<S: TagStore> Index<usize> for Tag<S> {
    type Output = Frame;

    fn index(&self, index: usize) -> &Frame {
        &self.frames[index]
    }
}

impl<'a, S: TagStore> IntoIterator for &'a Tag<S> {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::code;
    use crate::store::{MemoryDisk, MemoryStore, RawField, RawFrame};
    use pretty_assertions::assert_eq;

    fn text_record(id: FrameId, text: &str) -> RawFrame {
        let mut field = RawField::new(code::TEXT, crate::info::FieldType::Text);
        field.set_ascii(text);
        let mut raw = RawFrame::new(id.code().unwrap());
        raw.push_field(field);
        raw
    }

    fn open(disk: &MemoryDisk, path: &str) -> Tag<MemoryStore> {
        Tag::with_store(disk.store(), path, TagOptions::default())
    }

    #[test]
    fn unknown_records_are_dropped_on_load() {
        let disk = MemoryDisk::new();
        disk.write(
            "a.mp3",
            TagType::V2,
            vec![text_record(FrameId::Tit2, "Shy Boy"), RawFrame::new(999)],
        );
        let tag = open(&disk, "a.mp3");
        assert_eq!(tag.frames(), &[Frame::with_text(FrameId::Tit2, "Shy Boy")]);
    }

    #[test]
    fn set_text_leaves_exactly_one_frame() {
        let disk = MemoryDisk::new();
        let mut tag = open(&disk, "b.mp3");
        tag.push(Frame::with_text(FrameId::Tyer, "2004"));
        tag.push(Frame::with_text(FrameId::Tit2, "Shy Boy"));
        tag.push(Frame::with_text(FrameId::Tyer, "2005"));

        tag.set_text(FrameId::Tyer, Some("2006"));
        tag.set_text(FrameId::Tyer, Some("2006"));
        assert_eq!(tag.text(&FrameId::Tyer), Some("2006"));
        assert_eq!(tag.iter().filter(|f| *f.id() == FrameId::Tyer).count(), 1);

        tag.set_text(FrameId::Tyer, None);
        assert_eq!(tag.find(&FrameId::Tyer), None);
        assert_eq!(tag.len(), 1);
    }

    #[test]
    fn invalid_frames_lists_ids_and_undeclared_fields() {
        let disk = MemoryDisk::new();
        let mut tag = open(&disk, "c.mp3");
        assert_eq!(tag.invalid_frames(), None);

        tag.push(Frame::new("TITS"));
        tag.push(Frame::new(FrameId::Talb).with("invalid", "text"));
        tag.push(Frame::new(FrameId::Apic).with(FieldId::Text, "invalid"));
        tag.push(Frame::with_text(FrameId::Tit2, "fine"));

        assert_eq!(
            tag.invalid_frames(),
            Some(vec![
                InvalidFrame::new("TITS", vec![]),
                InvalidFrame::new(FrameId::Talb, vec![FieldId::Unknown("invalid".into())]),
                InvalidFrame::new(FrameId::Apic, vec![FieldId::Text]),
            ])
        );
    }

    #[test]
    fn update_removes_unknown_frames_for_good() {
        let disk = MemoryDisk::new();
        let mut tag = open(&disk, "d.mp3");
        tag.push(Frame::with_text(FrameId::Tit2, "Shy Boy"));
        tag.push(Frame::new("TITS"));
        tag.push(Frame::new(FrameId::Talb).with(FieldId::Text, "Piece By Piece").with("invalid", "x"));

        let report = tag.update_report(TagType::V2);
        assert_eq!(report.written, Some(TagType::V2));
        assert_eq!(report.dropped_frames, vec![FrameId::Unknown("TITS".into())]);
        assert_eq!(
            report.dropped_fields,
            vec![(FrameId::Talb, FieldId::Unknown("invalid".into()))]
        );
        assert_eq!(tag.len(), 2);

        let reread = open(&disk, "d.mp3");
        assert_eq!(reread.text(&FrameId::Talb), Some("Piece By Piece"));
    }

    #[test]
    fn update_with_nothing_to_write_is_none() {
        let disk = MemoryDisk::new();
        let mut tag = open(&disk, "e.mp3");
        assert_eq!(tag.update(), None);
    }

    #[test]
    fn strict_update_refuses_invalid_tags() {
        let disk = MemoryDisk::new();
        let mut tag = open(&disk, "f.mp3");
        tag.push(Frame::new("TITS"));
        match tag.update_strict() {
            Err(TagError::InvalidFrames(frames)) => {
                assert_eq!(frames, vec![InvalidFrame::new("TITS", vec![])]);
            }
            other => panic!("unexpected {other:?}"),
        }
        // nothing was filtered
        assert_eq!(tag.len(), 1);
    }

    #[test]
    fn strict_update_reports_nothing_written() {
        let disk = MemoryDisk::new();
        let mut tag = open(&disk, "g.mp3");
        assert!(matches!(tag.update_strict(), Err(TagError::NothingWritten(_))));
    }

    #[test]
    fn behaves_like_a_sequence() {
        let disk = MemoryDisk::new();
        let mut tag = open(&disk, "h.mp3");
        tag.push(Frame::with_text(FrameId::Tpe1, "Katie Melua"));
        tag.insert(0, Frame::with_text(FrameId::Tit2, "Shy Boy"));
        tag.frames_mut().push(Frame::with_text(FrameId::Tyer, "2005"));

        let ids: Vec<&FrameId> = (&tag).into_iter().map(Frame::id).collect();
        assert_eq!(ids, vec![&FrameId::Tit2, &FrameId::Tpe1, &FrameId::Tyer]);
        assert_eq!(tag[1].text(), Some("Katie Melua"));

        let mut seen = 0;
        for frame in &tag {
            assert!(frame.id().is_known());
            seen += 1;
        }
        assert_eq!(seen, 3);

        if let Some(year) = tag.find_mut(&FrameId::Tyer) {
            year.set(FieldId::Text, "2006");
        }
        assert_eq!(tag.year(), Some("2006"));
        assert_eq!(tag.remove_frames(&FrameId::Tyer), 1);
        assert_eq!(tag.len(), 2);
    }

    #[test]
    fn invalid_frame_display() {
        assert_eq!(InvalidFrame::new("TITS", vec![]).to_string(), "TITS");
        assert_eq!(
            InvalidFrame::new(FrameId::Apic, vec![FieldId::Text, FieldId::Url]).to_string(),
            "APIC [text, url]"
        );
    }
}
