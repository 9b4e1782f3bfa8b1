//! info/mod.rs
//!
//! Frame metadata registry.
//!
//! Static tables describing every known frame ID and field ID:
//! - [`frame`] / [`frame_by_code`] resolve a frame to its code and field list
//! - [`field_type`] gives the one type a (frame, field) pair has
//! - [`field`] / [`field_code`] resolve a field to its code
//!
//! Lookups return `None` for anything outside the tables. Callers treat that
//! as "invalid", never as a crash.

mod fields;
mod frames;

pub use fields::{FieldId, FieldInfo, code};
pub use frames::FrameId;

/// The storage type of a field. Fixed per (frame, field) pair by the tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Integer,
    Binary,
    Text,
}

impl FieldType {
    /// Numeric type code stores tag their fields with.
    pub const fn code(self) -> u8 {
        match self {
            FieldType::Integer => 0,
            FieldType::Binary => 1,
            FieldType::Text => 2,
        }
    }

    pub const fn from_code(code: u8) -> Option<FieldType> {
        match code {
            0 => Some(FieldType::Integer),
            1 => Some(FieldType::Binary),
            2 => Some(FieldType::Text),
            _ => None,
        }
    }
}

/// One declared field of a frame: field code plus its type in this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub code: u8,
    pub kind: FieldType,
}

impl FieldSpec {
    pub fn id(&self) -> FieldId {
        // Field lists are built from `code` constants only.
        FieldId::from_code(self.code).unwrap_or_else(|| FieldId::Unknown(self.code.to_string()))
    }
}

/// Registry entry for one frame ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    pub code: u16,
    pub name: &'static str,
    pub description: &'static str,
    pub fields: &'static [FieldSpec],
}

impl FrameInfo {
    pub fn id(&self) -> FrameId {
        FrameId::from_name(self.name)
    }

    /// Declared field IDs, in declaration order.
    pub fn field_ids(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.fields.iter().map(FieldSpec::id)
    }

    /// The [`FieldSpec`] for `field` if this frame declares it.
    pub fn spec(&self, field: &FieldId) -> Option<FieldSpec> {
        let code = field.code()?;
        self.fields.iter().copied().find(|spec| spec.code == code)
    }

    pub fn declares(&self, field: &FieldId) -> bool {
        self.spec(field).is_some()
    }
}

/// Look a frame up by ID.
pub fn frame(id: &FrameId) -> Option<FrameInfo> {
    id.info()
}

/// Look a frame up by its numeric code.
pub fn frame_by_code(code: u16) -> Option<(FrameId, FrameInfo)> {
    let id = FrameId::from_code(code)?;
    let info = id.info()?;
    Some((id, info))
}

/// Every known frame, in code order.
pub fn frames() -> impl Iterator<Item = FrameInfo> {
    (1..=frames::LAST_CODE).filter_map(|code| frame_by_code(code).map(|(_, info)| info))
}

/// The type of `field` within `frame`, or `None` if the frame is unknown or
/// does not declare the field.
pub fn field_type(frame: &FrameId, field: &FieldId) -> Option<FieldType> {
    frame.info()?.spec(field).map(|spec| spec.kind)
}

pub fn field(id: &FieldId) -> Option<FieldInfo> {
    id.info()
}

pub fn field_code(id: &FieldId) -> Option<u8> {
    id.code()
}
