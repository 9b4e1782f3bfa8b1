//! store/mod.rs
//!
//! The tag store: whatever owns the binary tag layout and the file.
//!
//! The rest of the crate only sees field-typed records ([`RawFrame`]) through
//! the [`TagStore`] trait. Two stores ship with the crate:
//! - [`MemoryStore`]: files simulated in memory (tests, byte-level callers)
//! - [`Id3FileStore`]: real files, binary codec by the `id3` crate plus the
//!   frame bodies and V1 blocks it has no encoder for

mod body;
mod id3_file;
mod memory;
mod v1;

use std::path::Path;

use crate::info::{self, FieldType};
use crate::types::TagType;

pub use id3_file::Id3FileStore;
pub use memory::{MemoryDisk, MemoryStore};

/// A field's stored representation.
///
/// Text is held as the store would write it: ISO-8859-1 bytes for ASCII
/// fields, UTF-16 code units for wide ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Integer(u32),
    Binary(Vec<u8>),
    Ascii(Vec<u8>),
    Unicode(Vec<u16>),
}

/// One field slot of a raw record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    code: u8,
    kind: FieldType,
    encoding: u8,
    value: RawValue,
}

impl RawField {
    /// An empty field of the given type.
    pub fn new(code: u8, kind: FieldType) -> Self {
        let value = match kind {
            FieldType::Integer => RawValue::Integer(0),
            FieldType::Binary => RawValue::Binary(Vec::new()),
            FieldType::Text => RawValue::Ascii(Vec::new()),
        };
        RawField {
            code,
            kind,
            encoding: 0,
            value,
        }
    }

    pub fn code(&self) -> u8 {
        self.code
    }

    pub fn field_type(&self) -> FieldType {
        self.kind
    }

    pub fn value(&self) -> &RawValue {
        &self.value
    }

    pub fn encoding(&self) -> u8 {
        self.encoding
    }

    pub fn set_encoding(&mut self, encoding: u8) {
        self.encoding = encoding;
    }

    pub fn integer(&self) -> Option<u32> {
        match self.value {
            RawValue::Integer(n) => Some(n),
            _ => None,
        }
    }

    pub fn binary(&self) -> Option<&[u8]> {
        match &self.value {
            RawValue::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// ISO-8859-1 text, if the field holds narrow text.
    pub fn ascii(&self) -> Option<String> {
        match &self.value {
            RawValue::Ascii(bytes) => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            _ => None,
        }
    }

    /// Wide text, if the field holds UTF-16.
    pub fn unicode(&self) -> Option<String> {
        match &self.value {
            RawValue::Unicode(units) => Some(String::from_utf16_lossy(units)),
            _ => None,
        }
    }

    pub fn set_integer(&mut self, n: u32) {
        self.value = RawValue::Integer(n);
    }

    pub fn set_binary(&mut self, bytes: &[u8]) {
        self.value = RawValue::Binary(bytes.to_vec());
    }

    /// Store as ISO-8859-1; characters above U+00FF become `?`.
    pub fn set_ascii(&mut self, text: &str) {
        let bytes = text
            .chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect();
        self.value = RawValue::Ascii(bytes);
    }

    pub fn set_unicode(&mut self, text: &str) {
        self.value = RawValue::Unicode(text.encode_utf16().collect());
    }

    /// Bytes this field takes up in an ID3v2 frame body.
    pub fn encoded_len(&self) -> usize {
        match &self.value {
            RawValue::Integer(_) if self.code == info::code::COUNTER => 4,
            RawValue::Integer(_) => 1,
            RawValue::Binary(bytes) => bytes.len(),
            // terminator
            RawValue::Ascii(bytes) => bytes.len() + 1,
            // BOM + terminator
            RawValue::Unicode(units) => 2 + units.len() * 2 + 2,
        }
    }
}

/// A raw, field-typed frame record as a store holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    code: u16,
    fields: Vec<RawField>,
}

impl RawFrame {
    /// A record with no fields. Stores use this for frames they cannot shape.
    pub fn new(code: u16) -> Self {
        RawFrame {
            code,
            fields: Vec::new(),
        }
    }

    /// An empty record pre-shaped with every field the frame kind declares.
    pub fn allocate(code: u16) -> Option<Self> {
        let (_, frame) = info::frame_by_code(code)?;
        Some(RawFrame {
            code,
            fields: frame
                .fields
                .iter()
                .map(|spec| RawField::new(spec.code, spec.kind))
                .collect(),
        })
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn field(&self, code: u8) -> Option<&RawField> {
        self.fields.iter().find(|f| f.code == code)
    }

    pub fn field_mut(&mut self, code: u8) -> Option<&mut RawField> {
        self.fields.iter_mut().find(|f| f.code == code)
    }

    pub fn fields(&self) -> &[RawField] {
        &self.fields
    }

    pub fn push_field(&mut self, field: RawField) {
        self.fields.push(field);
    }

    /// The record's `textenc` value (0 when the frame has none).
    pub fn text_encoding(&self) -> u32 {
        self.field(info::code::TEXTENC)
            .and_then(RawField::integer)
            .unwrap_or(0)
    }

    /// Set the record's `textenc` field, if the frame kind has one.
    pub fn set_text_encoding(&mut self, encoding: u32) {
        if let Some(field) = self.field_mut(info::code::TEXTENC) {
            field.set_integer(encoding);
        }
    }

    /// Frame header plus body, as an ID3v2 frame.
    pub fn encoded_len(&self) -> usize {
        FRAME_HEADER_LEN + self.fields.iter().map(RawField::encoded_len).sum::<usize>()
    }
}

const TAG_HEADER_LEN: usize = 10;
const FRAME_HEADER_LEN: usize = 10;
const PADDING_BLOCK: usize = 2048;

/// Estimated size of a V2 tag holding `frames`, padded up to the next
/// 2 KiB block when `padding`, plus a V1 tag when `with_v1`.
pub(crate) fn estimate_size(frames: &[RawFrame], padding: bool, with_v1: bool) -> usize {
    let mut v2 = if frames.is_empty() {
        0
    } else {
        TAG_HEADER_LEN + frames.iter().map(RawFrame::encoded_len).sum::<usize>()
    };
    if padding {
        v2 = v2.next_multiple_of(PADDING_BLOCK);
    }
    v2 + if with_v1 { v1::BLOCK_LEN } else { 0 }
}

/// The operations a tag collection needs from its store.
///
/// Writing is a three-phase sequence the caller drives:
/// 1. drop: [`strip`](TagStore::strip) the target tag types from the file
/// 2. rebind: [`rebind`](TagStore::rebind) to the file for the target types
/// 3. rebuild: [`add`](TagStore::add) each record, then
///    [`persist`](TagStore::persist)
///
/// Failures are reported through the returned masks, never as panics.
pub trait TagStore {
    /// Bind to `path`, loading the frames of the tag types in `filter`.
    /// May be called again to rebind.
    fn associate(&mut self, path: &Path, filter: TagType);

    /// Records currently held, in store order.
    fn frames(&self) -> &[RawFrame];

    /// An empty record shaped for frame `code`, or `None` if the store does
    /// not know the frame kind.
    fn allocate(&self, code: u16) -> Option<RawFrame> {
        RawFrame::allocate(code)
    }

    /// Stage a record for the next persist.
    fn add(&mut self, frame: RawFrame);

    /// Drop every held record.
    fn clear(&mut self);

    /// Clear, then associate again.
    fn rebind(&mut self, path: &Path, filter: TagType) {
        self.clear();
        self.associate(path, filter);
    }

    fn set_padding(&mut self, padding: bool);

    /// Remove tag types from the file; returns those actually removed.
    fn strip(&mut self, kind: TagType) -> TagType;

    /// Write the held records; returns the tag types actually written.
    fn persist(&mut self, kind: TagType) -> TagType;

    /// Whether a tag of `kind` was found when the store was associated.
    fn has_tag_type(&self, kind: TagType) -> bool;

    fn estimated_size(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::{FrameId, code};

    #[test]
    fn allocate_shapes_declared_fields() {
        let raw = RawFrame::allocate(FrameId::Comm.code().unwrap()).unwrap();
        let codes: Vec<u8> = raw.fields().iter().map(RawField::code).collect();
        assert_eq!(
            codes,
            vec![code::TEXTENC, code::LANGUAGE, code::DESCRIPTION, code::TEXT]
        );
        assert_eq!(raw.field(code::TEXT).unwrap().field_type(), FieldType::Text);
        assert!(RawFrame::allocate(0).is_none());
    }

    #[test]
    fn ascii_is_latin1_with_replacement() {
        let mut field = RawField::new(code::TEXT, FieldType::Text);
        field.set_ascii("Café ☕");
        assert_eq!(field.ascii().as_deref(), Some("Café ?"));
        assert_eq!(field.unicode(), None);
    }

    #[test]
    fn unicode_keeps_every_char() {
        let mut field = RawField::new(code::TEXT, FieldType::Text);
        field.set_unicode("Café ☕");
        assert_eq!(field.unicode().as_deref(), Some("Café ☕"));
        assert_eq!(field.ascii(), None);
    }

    #[test]
    fn size_counts_headers_and_fields() {
        let mut raw = RawFrame::allocate(FrameId::Tit2.code().unwrap()).unwrap();
        raw.field_mut(code::TEXT).unwrap().set_ascii("abc");
        // tag header + frame header + textenc byte + "abc\0"
        assert_eq!(estimate_size(&[raw.clone()], false, false), 10 + 10 + 1 + 4);
        assert_eq!(estimate_size(&[raw], true, false), 2048);
        assert_eq!(estimate_size(&[], true, true), 128);
    }
}
