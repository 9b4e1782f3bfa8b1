//! translate/read.rs
//! Decode a raw store record into a `Frame`.
//!
//! - The registry decides which fields exist and how each is typed.
//! - Fields the record lacks are left out of the frame, not an error.

use crate::frame::{FieldValue, Frame};
use crate::info::{self, FieldType};
use crate::store::{RawField, RawFrame};

/// Returns `None` when the record's frame code is unknown; the caller decides
/// what to do with such frames (the tag drops them).
pub(crate) fn read_frame(raw: &RawFrame) -> Option<Frame> {
    let (id, frame_info) = info::frame_by_code(raw.code())?;
    let wide = raw.text_encoding() > 0;

    let mut frame = Frame::new(id);
    for spec in frame_info.fields {
        let Some(field) = raw.field(spec.code) else {
            continue;
        };
        let field_id = spec.id();
        if let Some(value) = read_value(field, spec.kind, wide && field_id.is_encoding_sensitive()) {
            frame.set(field_id, value);
        }
    }
    Some(frame)
}

fn read_value(field: &RawField, kind: FieldType, wide: bool) -> Option<FieldValue> {
    match kind {
        FieldType::Integer => field.integer().map(FieldValue::Integer),
        FieldType::Binary => field.binary().map(|b| FieldValue::Binary(b.to_vec())),
        FieldType::Text => {
            // Prefer the representation the encoding asks for; a store may
            // still hold the other one (e.g. narrow text under textenc 1).
            let text = if wide {
                field.unicode().or_else(|| field.ascii())
            } else {
                field.ascii().or_else(|| field.unicode())
            };
            text.map(FieldValue::Text)
        }
    }
}
