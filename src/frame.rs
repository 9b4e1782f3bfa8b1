//! One frame of a tag: a frame ID plus an ordered field → value mapping.
//!
//! - Values are a closed sum: integer, bytes or text
//! - Field order is insertion order (it is also the encode order)
//! - Nothing here consults the registry; validity is checked by the tag

use std::fmt;
use std::ops::Index;

use crate::info::{FieldId, FrameId};

/// The value held by one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Integer(u32),
    Binary(Vec<u8>),
    Text(String),
}

impl FieldValue {
    pub fn as_integer(&self) -> Option<u32> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<u8> for FieldValue {
    fn from(n: u8) -> Self {
        FieldValue::Integer(n.into())
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(bytes: Vec<u8>) -> Self {
        FieldValue::Binary(bytes)
    }
}

impl From<&[u8]> for FieldValue {
    fn from(bytes: &[u8]) -> Self {
        FieldValue::Binary(bytes.to_vec())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_owned())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(n) => write!(f, "{n}"),
            FieldValue::Binary(bytes) => write!(f, "<{} bytes>", bytes.len()),
            FieldValue::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// A structured frame value.
///
/// ```
/// use sonora_tags::{FieldId, FieldValue, Frame, FrameId};
///
/// let cover = Frame::new(FrameId::Apic)
///     .with(FieldId::MimeType, "image/jpeg")
///     .with(FieldId::PictureType, 3u32)
///     .with(FieldId::Description, "A pretty picture")
///     .with(FieldId::Textenc, 0u32)
///     .with(FieldId::Data, vec![0xffu8, 0xd8]);
///
/// assert_eq!(cover[FieldId::PictureType], FieldValue::Integer(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    id: FrameId,
    fields: Vec<(FieldId, FieldValue)>,
}

impl Frame {
    pub fn new(id: impl Into<FrameId>) -> Self {
        Frame {
            id: id.into(),
            fields: Vec::new(),
        }
    }

    /// `{id, text}`: the shape `Tag::set_text` appends.
    pub fn with_text(id: impl Into<FrameId>, text: impl Into<String>) -> Self {
        Frame::new(id).with(FieldId::Text, text.into())
    }

    /// Builder form of [`Frame::set`].
    pub fn with(mut self, field: impl Into<FieldId>, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    pub fn id(&self) -> &FrameId {
        &self.id
    }

    pub fn get(&self, field: &FieldId) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(key, _)| key == field)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, field: &FieldId) -> Option<&mut FieldValue> {
        self.fields
            .iter_mut()
            .find(|(key, _)| key == field)
            .map(|(_, value)| value)
    }

    /// Set a field. An existing key keeps its position; a new key is appended.
    /// Returns the previous value.
    pub fn set(
        &mut self,
        field: impl Into<FieldId>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        let field = field.into();
        let value = value.into();
        match self.get_mut(&field) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((field, value));
                None
            }
        }
    }

    pub fn remove(&mut self, field: &FieldId) -> Option<FieldValue> {
        let pos = self.fields.iter().position(|(key, _)| key == field)?;
        Some(self.fields.remove(pos).1)
    }

    pub fn contains(&self, field: &FieldId) -> bool {
        self.get(field).is_some()
    }

    /// Fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldId, &FieldValue)> + '_ {
        self.fields.iter().map(|(key, value)| (key, value))
    }

    pub fn field_ids(&self) -> impl Iterator<Item = &FieldId> + '_ {
        self.fields.iter().map(|(key, _)| key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The `text` field, if present and textual.
    pub fn text(&self) -> Option<&str> {
        self.get(&FieldId::Text).and_then(FieldValue::as_text)
    }

    /// The `description` field, if present and textual.
    pub fn description(&self) -> Option<&str> {
        self.get(&FieldId::Description)
            .and_then(FieldValue::as_text)
    }

    /// The `textenc` field: 0 for ISO-8859-1, anything above for unicode.
    pub fn text_encoding(&self) -> Option<u32> {
        self.get(&FieldId::Textenc).and_then(FieldValue::as_integer)
    }
}

/// Direct field access. Panics when the field is absent; use [`Frame::get`]
/// when absence is expected.
impl Index<&FieldId> for Frame {
    type Output = FieldValue;

    fn index(&self, field: &FieldId) -> &FieldValue {
        match self.get(field) {
            Some(value) => value,
            None => panic!("frame {} has no field `{}`", self.id, field),
        }
    }
}

impl Index<FieldId> for Frame {
    type Output = FieldValue;

    fn index(&self, field: FieldId) -> &FieldValue {
        &self[&field]
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{id: {}", self.id)?;
        for (key, value) in &self.fields {
            write!(f, ", {key}: {value}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_keeps_position_of_existing_key() {
        let mut frame = Frame::new(FrameId::Comm)
            .with(FieldId::Textenc, 0u32)
            .with(FieldId::Text, "first");

        let old = frame.set(FieldId::Textenc, 1u32);
        assert_eq!(old, Some(FieldValue::Integer(0)));

        let keys: Vec<&FieldId> = frame.field_ids().collect();
        assert_eq!(keys, vec![&FieldId::Textenc, &FieldId::Text]);
        assert_eq!(frame.text_encoding(), Some(1));
    }

    #[test]
    fn with_text_builds_id_and_text() {
        let frame = Frame::with_text(FrameId::Tit2, "Shy Boy");
        assert_eq!(frame.id(), &FrameId::Tit2);
        assert_eq!(frame.text(), Some("Shy Boy"));
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn remove_drops_field() {
        let mut frame = Frame::with_text("TALB", "Piece By Piece");
        assert_eq!(
            frame.remove(&FieldId::Text),
            Some(FieldValue::Text("Piece By Piece".into()))
        );
        assert!(frame.is_empty());
        assert_eq!(frame.remove(&FieldId::Text), None);
    }

    #[test]
    fn unknown_keys_are_representable() {
        let frame = Frame::new("TALB").with("invalid", "text");
        assert!(frame.contains(&FieldId::Unknown("invalid".into())));
        assert_eq!(frame.to_string(), r#"{id: TALB, invalid: "text"}"#);
    }

    #[test]
    #[should_panic(expected = "has no field `text`")]
    fn indexing_missing_field_panics() {
        let frame = Frame::new(FrameId::Tlan);
        let _ = &frame[FieldId::Text];
    }
}
