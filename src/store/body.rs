//! store/body.rs
//! ID3v2 frame bodies laid out straight from the registry's field list.
//!
//! `id3` has typed content for the common frames only; everything else
//! (PCNT, USER, MCDI, LINK, OWNE, COMR, ETCO, ...) travels as opaque bytes.
//! This module turns those bytes into field-typed records and back:
//! - integers are one byte; `counter` is big-endian, at least 4 bytes,
//!   and takes the rest of the body when it comes last
//! - `language` is three ISO-8859-1 bytes
//! - other text is terminated unless it comes last; encoding-sensitive
//!   text follows the frame's `textenc`, the rest is ISO-8859-1
//! - binary takes the rest of the body; anywhere else it is a 4-byte frame ID

use super::{RawField, RawFrame};
use crate::info::{self, FieldId, FieldSpec, FieldType, code};

const LANGUAGE_LEN: usize = 3;
const LINKED_ID_LEN: usize = 4;
const COUNTER_LEN: usize = 4;

const LATIN1: u8 = 0;
const UTF16: u8 = 1;
const UTF16BE: u8 = 2;
const UTF8: u8 = 3;

pub(super) fn is_sensitive(field_code: u8) -> bool {
    FieldId::from_code(field_code).is_some_and(|f| f.is_encoding_sensitive())
}

/// Shape a record for `frame_code` and fill it from an ID3v2 frame body.
/// A body shorter than the layout leaves the remaining fields empty.
pub(crate) fn decode(frame_code: u16, body: &[u8]) -> Option<RawFrame> {
    let (_, frame) = info::frame_by_code(frame_code)?;
    let mut raw = RawFrame::allocate(frame_code)?;
    let mut rest = body;
    let mut encoding = LATIN1;

    for (i, spec) in frame.fields.iter().enumerate() {
        let last = i + 1 == frame.fields.len();
        let Some(field) = raw.field_mut(spec.code) else {
            continue;
        };
        rest = match spec.kind {
            FieldType::Integer => {
                let (head, tail) = split(rest, integer_len(spec, last, rest.len()));
                let n = parse_be_u64(head).map_or(0, |n| u32::try_from(n).unwrap_or(u32::MAX));
                field.set_integer(n);
                if spec.code == code::TEXTENC {
                    encoding = u8::try_from(n).unwrap_or(LATIN1);
                }
                tail
            }
            FieldType::Binary => {
                let len = if last { rest.len() } else { LINKED_ID_LEN };
                let (head, tail) = split(rest, len);
                field.set_binary(head);
                tail
            }
            FieldType::Text if spec.code == code::LANGUAGE => {
                let (head, tail) = split(rest, LANGUAGE_LEN);
                field.set_ascii(&decode_text(head, LATIN1));
                tail
            }
            FieldType::Text => {
                let enc = if is_sensitive(spec.code) { encoding } else { LATIN1 };
                let (head, tail) = if last {
                    (trim_terminators(rest, enc), &[][..])
                } else {
                    split_terminated(rest, enc)
                };
                set_text(field, &decode_text(head, enc), enc);
                tail
            }
        };
    }
    Some(raw)
}

/// The ID3v2 frame body for a record, or `None` if its code is unknown.
pub(crate) fn encode(raw: &RawFrame) -> Option<Vec<u8>> {
    let (_, frame) = info::frame_by_code(raw.code())?;
    let encoding = u8::try_from(raw.text_encoding()).unwrap_or(UTF16);
    let mut out = Vec::new();

    for (i, spec) in frame.fields.iter().enumerate() {
        let last = i + 1 == frame.fields.len();
        let field = raw.field(spec.code);
        match spec.kind {
            FieldType::Integer => {
                let n = field.and_then(RawField::integer).unwrap_or(0);
                if spec.code == code::COUNTER {
                    out.extend_from_slice(&n.to_be_bytes());
                } else {
                    out.push(u8::try_from(n).unwrap_or(u8::MAX));
                }
            }
            FieldType::Binary => {
                let bytes = field.and_then(RawField::binary).unwrap_or_default();
                if last {
                    out.extend_from_slice(bytes);
                } else {
                    let mut id = [0u8; LINKED_ID_LEN];
                    for (slot, b) in id.iter_mut().zip(bytes) {
                        *slot = *b;
                    }
                    out.extend_from_slice(&id);
                }
            }
            FieldType::Text => {
                let text = field
                    .and_then(|f| f.unicode().or_else(|| f.ascii()))
                    .unwrap_or_default();
                if spec.code == code::LANGUAGE {
                    let mut lang = encode_text(&text, LATIN1);
                    lang.resize(LANGUAGE_LEN, b' ');
                    out.extend_from_slice(&lang);
                    continue;
                }
                let enc = if is_sensitive(spec.code) { encoding } else { LATIN1 };
                out.extend(encode_text(&text, enc));
                if !last {
                    out.extend_from_slice(terminator(enc));
                }
            }
        }
    }
    Some(out)
}

fn integer_len(spec: &FieldSpec, last: bool, remaining: usize) -> usize {
    match spec.code {
        code::COUNTER if last => remaining,
        code::COUNTER => COUNTER_LEN,
        _ => 1,
    }
}

fn split(bytes: &[u8], len: usize) -> (&[u8], &[u8]) {
    bytes.split_at(len.min(bytes.len()))
}

fn is_wide(enc: u8) -> bool {
    matches!(enc, UTF16 | UTF16BE)
}

fn terminator(enc: u8) -> &'static [u8] {
    if is_wide(enc) { &[0, 0] } else { &[0] }
}

/// Text up to the first terminator, and what follows it.
fn split_terminated(bytes: &[u8], enc: u8) -> (&[u8], &[u8]) {
    let end = if is_wide(enc) {
        bytes.chunks_exact(2).position(|c| c[0] == 0 && c[1] == 0).map(|i| i * 2)
    } else {
        bytes.iter().position(|&b| b == 0)
    };
    match end {
        Some(end) => (&bytes[..end], &bytes[end + terminator(enc).len()..]),
        None => (bytes, &[]),
    }
}

fn trim_terminators(mut bytes: &[u8], enc: u8) -> &[u8] {
    let term = terminator(enc);
    while bytes.len() >= term.len() && bytes.ends_with(term) {
        bytes = &bytes[..bytes.len() - term.len()];
    }
    bytes
}

fn decode_text(bytes: &[u8], enc: u8) -> String {
    match enc {
        UTF16 => match bytes {
            [0xfe, 0xff, rest @ ..] => utf16(rest, u16::from_be_bytes),
            [0xff, 0xfe, rest @ ..] => utf16(rest, u16::from_le_bytes),
            _ => utf16(bytes, u16::from_le_bytes),
        },
        UTF16BE => utf16(bytes, u16::from_be_bytes),
        UTF8 => String::from_utf8_lossy(bytes).into_owned(),
        _ => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

fn utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes.chunks_exact(2).map(|c| unit([c[0], c[1]])).collect();
    String::from_utf16_lossy(&units)
}

fn encode_text(text: &str, enc: u8) -> Vec<u8> {
    match enc {
        UTF16 => [0xff, 0xfe]
            .into_iter()
            .chain(text.encode_utf16().flat_map(u16::to_le_bytes))
            .collect(),
        UTF16BE => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        UTF8 => text.as_bytes().to_vec(),
        _ => text
            .chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect(),
    }
}

fn set_text(field: &mut RawField, text: &str, enc: u8) {
    if enc == LATIN1 {
        field.set_ascii(text);
    } else {
        field.set_encoding(enc);
        field.set_unicode(text);
    }
}

/// Big-endian integer of any length, as PCNT stores it. Longer than 8
/// bytes keeps the least significant 8.
fn parse_be_u64(bytes: &[u8]) -> Option<u64> {
    if bytes.is_empty() {
        return None;
    }
    let bytes = &bytes[bytes.len().saturating_sub(8)..];
    Some(bytes.iter().fold(0u64, |v, &b| (v << 8) | u64::from(b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::FrameId;
    use pretty_assertions::assert_eq;

    fn allocate(id: FrameId) -> RawFrame {
        RawFrame::allocate(id.code().unwrap()).unwrap()
    }

    #[test]
    fn play_counter_of_any_width() {
        let pcnt = FrameId::Pcnt.code().unwrap();
        let raw = decode(pcnt, &[0, 0, 0, 5]).unwrap();
        assert_eq!(raw.field(code::COUNTER).unwrap().integer(), Some(5));

        let raw = decode(pcnt, &[0, 0, 0, 0, 1, 0]).unwrap();
        assert_eq!(raw.field(code::COUNTER).unwrap().integer(), Some(256));

        let raw = decode(pcnt, &[1, 0, 0, 0, 0]).unwrap();
        assert_eq!(raw.field(code::COUNTER).unwrap().integer(), Some(u32::MAX));

        assert_eq!(encode(&raw).unwrap(), vec![0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn terms_of_use_keep_their_encoding() {
        let mut raw = allocate(FrameId::User);
        raw.set_text_encoding(1);
        raw.field_mut(code::LANGUAGE).unwrap().set_ascii("eng");
        let text = raw.field_mut(code::TEXT).unwrap();
        text.set_encoding(1);
        text.set_unicode("Café");

        let body = encode(&raw).unwrap();
        assert_eq!(&body[..4], &[1, b'e', b'n', b'g']);
        assert_eq!(&body[4..6], &[0xff, 0xfe]);
        assert_eq!(decode(raw.code(), &body), Some(raw));
    }

    #[test]
    fn linked_frame_id_is_fixed_width() {
        let mut raw = allocate(FrameId::Link);
        raw.field_mut(code::DATA).unwrap().set_binary(b"TALB");
        raw.field_mut(code::URL).unwrap().set_ascii("http://example.com");
        raw.field_mut(code::TEXT).unwrap().set_ascii("extra");

        let body = encode(&raw).unwrap();
        assert_eq!(&body[..5], b"TALBh");
        assert_eq!(decode(raw.code(), &body), Some(raw));
    }

    #[test]
    fn wide_terminator_is_aligned() {
        // "ĀA" is 00 01 41 00: an unaligned 00 00 straddles the two units
        let mut body = vec![1, b'e', b'n', b'g', 2, 1];
        body.extend_from_slice(&[0xff, 0xfe, 0x00, 0x01, 0x41, 0x00, 0x00, 0x00, 7, 7]);
        let raw = decode(FrameId::Sylt.code().unwrap(), &body).unwrap();
        assert_eq!(raw.field(code::TIMESTAMPFORMAT).unwrap().integer(), Some(2));
        assert_eq!(
            raw.field(code::DESCRIPTION).unwrap().unicode().as_deref(),
            Some("ĀA")
        );
        assert_eq!(raw.field(code::DATA).unwrap().binary(), Some(&[7u8, 7][..]));
    }

    #[test]
    fn short_bodies_leave_fields_empty() {
        let raw = decode(FrameId::Owne.code().unwrap(), &[0]).unwrap();
        assert_eq!(raw.field(code::TEXT).unwrap().ascii().as_deref(), Some(""));
        assert_eq!(raw.field(code::DATA).unwrap().binary(), Some(&[][..]));
        assert_eq!(decode(0, &[]), None);
    }

    #[test]
    fn utf8_text_decodes() {
        let mut body = vec![3];
        body.extend_from_slice("恨み節".as_bytes());
        body.push(0);
        let raw = decode(FrameId::Tipl.code().unwrap(), &body).unwrap();
        let text = raw.field(code::TEXT).unwrap();
        assert_eq!(text.unicode().as_deref(), Some("恨み節"));
        assert_eq!(text.encoding(), 3);
    }
}
