//! translate/write.rs
//! Encode a `Frame` into a fresh raw store record.

use crate::frame::{FieldValue, Frame};
use crate::info::{FieldId, FieldType, FrameInfo};
use crate::store::{RawField, RawFrame};

/// Write every field of `frame` that its frame kind declares into `raw`.
///
/// - `textenc` goes first: text fields written after it depend on it
/// - undeclared fields are skipped and returned, in frame order
/// - a value the declared type cannot hold is skipped too (not returned)
pub(crate) fn write_frame(frame: &Frame, info: &FrameInfo, raw: &mut RawFrame) -> Vec<FieldId> {
    let mut skipped = Vec::new();

    let mut textenc = None;
    if let Some(value) = frame.get(&FieldId::Textenc) {
        if !info.declares(&FieldId::Textenc) {
            skipped.push(FieldId::Textenc);
        } else if let Some(encoding) = integer_value(value) {
            raw.set_text_encoding(encoding);
            textenc = Some(encoding);
        } else {
            log::trace!("{}: `textenc` value {value} is not an integer", frame.id());
        }
    }
    let wide = textenc.is_some_and(|enc| enc > 0);

    for (field_id, value) in frame.fields() {
        if *field_id == FieldId::Textenc {
            continue;
        }
        let Some(spec) = info.spec(field_id) else {
            log::trace!("{}: skipping undeclared field `{field_id}`", frame.id());
            skipped.push(field_id.clone());
            continue;
        };
        let Some(field) = raw.field_mut(spec.code) else {
            continue;
        };

        let written = match spec.kind {
            FieldType::Integer => write_integer(field, value),
            FieldType::Binary => write_binary(field, value),
            FieldType::Text => {
                write_text(field, value, wide && field_id.is_encoding_sensitive(), textenc)
            }
        };
        if !written {
            log::trace!(
                "{}: `{field_id}` value {value} does not fit a {:?} field",
                frame.id(),
                spec.kind
            );
        }
    }

    skipped
}

fn integer_value(value: &FieldValue) -> Option<u32> {
    match value {
        FieldValue::Integer(n) => Some(*n),
        FieldValue::Text(s) => s.trim().parse().ok(),
        FieldValue::Binary(_) => None,
    }
}

fn write_integer(field: &mut RawField, value: &FieldValue) -> bool {
    let Some(n) = integer_value(value) else {
        return false;
    };
    field.set_integer(n);
    true
}

fn write_binary(field: &mut RawField, value: &FieldValue) -> bool {
    match value {
        FieldValue::Binary(bytes) => field.set_binary(bytes),
        FieldValue::Text(s) => field.set_binary(s.as_bytes()),
        FieldValue::Integer(_) => return false,
    }
    true
}

fn write_text(field: &mut RawField, value: &FieldValue, wide: bool, textenc: Option<u32>) -> bool {
    let text = match value {
        FieldValue::Text(s) => s.clone(),
        FieldValue::Integer(n) => n.to_string(),
        FieldValue::Binary(_) => return false,
    };
    if wide {
        let encoding = textenc.map_or(1, |enc| u8::try_from(enc).unwrap_or(u8::MAX));
        field.set_encoding(encoding);
        field.set_unicode(&text);
    } else {
        field.set_ascii(&text);
    }
    true
}
