//! store/id3_file.rs
//! A tag store over real files, using the `id3` crate for the binary codec.
//!
//! - V2 tags are read and written with `id3::Tag`
//! - V1 tags are read and stripped with `id3::v1::Tag`, and written as a
//!   hand-built block (see `v1.rs`)
//! - Typed `id3` contents are flattened into field-typed records and back;
//!   every other registry frame goes through the body codec in `body.rs`
//!
//! `textenc` survives a round trip for frames whose bytes the store sees
//! (TXXX, GEOB and the body-codec frames). For the other typed contents
//! `id3` drops the encoding when reading, so it is inferred: 0 unless the
//! text needs more than ISO-8859-1.
//!
//! I/O problems never escape: they are logged and show up as empty masks.

use std::path::{Path, PathBuf};

use id3::frame::{
    Comment, Content, EncapsulatedObject, ExtendedLink, ExtendedText, Lyrics, Picture,
    PictureType, Popularimeter, Private, UniqueFileIdentifier, Unknown,
};
use id3::{Encoding, TagLike, Version};

use super::body::{self, is_sensitive};
use super::{RawField, RawFrame, TagStore, estimate_size, v1};
use crate::error::Result;
use crate::info::{self, FrameId, code};
use crate::types::TagType;

/// Language written when a comment/lyrics frame has no valid one.
const UNKNOWN_LANGUAGE: &str = "XXX";

#[derive(Debug)]
pub struct Id3FileStore {
    path: Option<PathBuf>,
    frames: Vec<RawFrame>,
    found: TagType,
    padding: bool,
}

impl Default for Id3FileStore {
    fn default() -> Self {
        Id3FileStore {
            path: None,
            frames: Vec::new(),
            found: TagType::NONE,
            padding: true,
        }
    }
}

impl Id3FileStore {
    pub fn new() -> Self {
        Id3FileStore::default()
    }

    fn load(&mut self, path: &Path, filter: TagType) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }

        if filter.contains(TagType::V2) {
            if let Some(tag) = read_v2(path)? {
                self.found |= TagType::V2;
                self.frames.extend(tag.frames().filter_map(raw_from_frame));
            }
        }
        if filter.contains(TagType::V1) {
            if let Some(tag) = read_v1(path)? {
                self.found |= TagType::V1;
                for raw in raw_from_v1(&tag) {
                    if !self.frames.iter().any(|f| f.code() == raw.code()) {
                        self.frames.push(raw);
                    }
                }
            }
        }
        Ok(())
    }

    fn strip_path(path: &Path, kind: TagType) -> Result<TagType> {
        let mut stripped = TagType::NONE;
        if kind.contains(TagType::V2) && id3::Tag::remove_from_path(path)? {
            stripped |= TagType::V2;
        }
        if kind.contains(TagType::V1) && id3::v1::Tag::remove_from_path(path)? {
            stripped |= TagType::V1;
        }
        Ok(stripped)
    }

    fn write_v2(&self, path: &Path) -> Result<bool> {
        let mut tag = id3::Tag::new();
        for raw in &self.frames {
            match frame_from_raw(raw) {
                Some(frame) => {
                    let _ = tag.add_frame(frame);
                }
                None => log::warn!(
                    "{}: frame code {} has no id3 content mapping, not written",
                    path.display(),
                    raw.code()
                ),
            }
        }
        if tag.frames().next().is_none() {
            return Ok(false);
        }
        tag.write_to_path(path, Version::Id3v24)?;
        Ok(true)
    }

    fn write_v1(&self, path: &Path) -> Result<bool> {
        let Some(block) = v1::encode(&self.frames) else {
            return Ok(false);
        };
        // replace, never stack a second block
        id3::v1::Tag::remove_from_path(path)?;
        v1::append(path, &block)?;
        Ok(true)
    }
}

impl TagStore for Id3FileStore {
    fn associate(&mut self, path: &Path, filter: TagType) {
        self.path = Some(path.to_path_buf());
        self.frames.clear();
        self.found = TagType::NONE;

        if let Err(err) = self.load(path, filter) {
            log::warn!("{}: reading tag failed: {err}", path.display());
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
        // id3 picks its own padding when encoding; kept for size estimates.
        self.padding = padding;
    }

    fn strip(&mut self, kind: TagType) -> TagType {
        let Some(path) = &self.path else {
            return TagType::NONE;
        };
        if !path.exists() {
            return TagType::NONE;
        }
        match Id3FileStore::strip_path(path, kind) {
            Ok(stripped) => stripped,
            Err(err) => {
                log::warn!("{}: stripping tag failed: {err}", path.display());
                TagType::NONE
            }
        }
    }

    fn persist(&mut self, kind: TagType) -> TagType {
        let Some(path) = &self.path else {
            return TagType::NONE;
        };

        let mut written = TagType::NONE;
        if kind.contains(TagType::V2) {
            match self.write_v2(path) {
                Ok(true) => written |= TagType::V2,
                Ok(false) => {}
                Err(err) => log::warn!("{}: writing tag failed: {err}", path.display()),
            }
        }
        if kind.contains(TagType::V1) {
            match self.write_v1(path) {
                Ok(true) => written |= TagType::V1,
                Ok(false) => {}
                Err(err) => log::warn!("{}: writing V1 tag failed: {err}", path.display()),
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

fn is_no_tag(err: &id3::Error) -> bool {
    matches!(err.kind, id3::ErrorKind::NoTag)
}

fn read_v2(path: &Path) -> Result<Option<id3::Tag>> {
    match id3::Tag::read_from_path(path) {
        Ok(tag) => Ok(Some(tag)),
        Err(err) if is_no_tag(&err) => Ok(None),
        Err(id3::Error {
            partial_tag: Some(tag),
            description,
            ..
        }) => {
            log::warn!("{}: keeping partly decoded tag: {description}", path.display());
            Ok(Some(tag))
        }
        Err(err) => Err(err.into()),
    }
}

fn read_v1(path: &Path) -> Result<Option<id3::v1::Tag>> {
    match id3::v1::Tag::read_from_path(path) {
        Ok(tag) => Ok(Some(tag)),
        Err(err) if is_no_tag(&err) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// A field value about to be put into a raw record.
enum Slot<'a> {
    Text(&'a str),
    Integer(u32),
    Bytes(&'a [u8]),
}

/// Flatten one id3 frame into a raw record. Only frames whose ID the
/// registry does not know are skipped.
fn raw_from_frame(frame: &id3::Frame) -> Option<RawFrame> {
    let Some(frame_code) = FrameId::from_name(frame.id()).code() else {
        log::debug!("skipping unknown frame {}", frame.id());
        return None;
    };
    if let Some(slots) = slots(frame.content()) {
        let mut raw = RawFrame::allocate(frame_code)?;
        fill(&mut raw, &slots, frame.encoding());
        return Some(raw);
    }

    let unknown = match frame.content().to_unknown() {
        Ok(unknown) => unknown,
        Err(err) => {
            log::warn!("skipping {}: content cannot be re-encoded: {err}", frame.id());
            return None;
        }
    };
    let mut raw = body::decode(frame_code, &unknown.data)?;
    if !matches!(frame.content(), Content::Unknown(_)) {
        settle_encoding(&mut raw);
    }
    Some(raw)
}

fn slots(content: &Content) -> Option<Vec<(u8, Slot<'_>)>> {
    use Slot::{Bytes, Integer, Text};

    let slots = match content {
        Content::Text(text) => vec![(code::TEXT, Text(text))],
        Content::ExtendedText(t) => vec![
            (code::DESCRIPTION, Text(&t.description)),
            (code::TEXT, Text(&t.value)),
        ],
        Content::Link(url) => vec![(code::URL, Text(url))],
        Content::ExtendedLink(l) => vec![
            (code::DESCRIPTION, Text(&l.description)),
            (code::URL, Text(&l.link)),
        ],
        Content::Comment(c) => vec![
            (code::LANGUAGE, Text(&c.lang)),
            (code::DESCRIPTION, Text(&c.description)),
            (code::TEXT, Text(&c.text)),
        ],
        Content::Lyrics(l) => vec![
            (code::LANGUAGE, Text(&l.lang)),
            (code::DESCRIPTION, Text(&l.description)),
            (code::TEXT, Text(&l.text)),
        ],
        Content::Picture(p) => vec![
            (code::MIMETYPE, Text(&p.mime_type)),
            (code::PICTURETYPE, Integer(picture_type_code(&p.picture_type).into())),
            (code::DESCRIPTION, Text(&p.description)),
            (code::DATA, Bytes(&p.data)),
        ],
        Content::Popularimeter(p) => vec![
            (code::EMAIL, Text(&p.user)),
            (code::RATING, Integer(p.rating.into())),
            (code::COUNTER, Integer(u32::try_from(p.counter).unwrap_or(u32::MAX))),
        ],
        Content::EncapsulatedObject(o) => vec![
            (code::MIMETYPE, Text(&o.mime_type)),
            (code::FILENAME, Text(&o.filename)),
            (code::DESCRIPTION, Text(&o.description)),
            (code::DATA, Bytes(&o.data)),
        ],
        Content::Private(p) => vec![
            (code::OWNER, Text(&p.owner_identifier)),
            (code::DATA, Bytes(&p.private_data)),
        ],
        Content::UniqueFileIdentifier(u) => vec![
            (code::OWNER, Text(&u.owner_identifier)),
            (code::DATA, Bytes(&u.identifier)),
        ],
        _ => return None,
    };
    Some(slots)
}

fn is_latin1(text: &str) -> bool {
    text.chars().all(|c| u32::from(c) <= 0xff)
}

/// Put slots into a shaped record. The frame's own encoding wins when `id3`
/// kept it; otherwise sensitive text that does not fit ISO-8859-1 switches
/// the record to UTF-16.
fn fill(raw: &mut RawFrame, slots: &[(u8, Slot<'_>)], encoding: Option<Encoding>) {
    let declared = encoding.map(encoding_code).filter(|&enc| enc != 0);
    let needs_wide = slots
        .iter()
        .any(|(c, slot)| matches!(slot, Slot::Text(s) if is_sensitive(*c) && !is_latin1(s)));
    let wide = declared.or(needs_wide.then_some(1));
    if let Some(enc) = wide {
        raw.set_text_encoding(enc.into());
    }

    for (field_code, slot) in slots {
        let Some(field) = raw.field_mut(*field_code) else {
            continue;
        };
        match (slot, wide) {
            (Slot::Text(s), Some(enc)) if is_sensitive(*field_code) => {
                field.set_encoding(enc);
                field.set_unicode(s);
            }
            (Slot::Text(s), _) => field.set_ascii(s),
            (Slot::Integer(n), _) => field.set_integer(*n),
            (Slot::Bytes(b), _) => field.set_binary(b),
        }
    }
}

/// `to_unknown` re-encodes parsed content as UTF-8. Fold that back into the
/// narrow or UTF-16 choice [`fill`] makes for typed contents.
fn settle_encoding(raw: &mut RawFrame) {
    let texts: Vec<(u8, String)> = raw
        .fields()
        .iter()
        .filter_map(|f| Some((f.code(), f.unicode()?)))
        .collect();
    let wide = texts.iter().any(|(_, s)| !is_latin1(s));
    raw.set_text_encoding(u32::from(wide));
    for (field_code, text) in texts {
        let Some(field) = raw.field_mut(field_code) else {
            continue;
        };
        if wide {
            field.set_encoding(1);
        } else {
            field.set_encoding(0);
            field.set_ascii(&text);
        }
    }
}

fn encoding_code(encoding: Encoding) -> u8 {
    match encoding {
        Encoding::Latin1 => 0,
        Encoding::UTF16 => 1,
        Encoding::UTF16BE => 2,
        Encoding::UTF8 => 3,
    }
}

/// The encoding `id3` should write a record's text in. Narrow records only
/// ever hold ISO-8859-1, so `textenc` 0 is safe as Latin-1.
fn id3_encoding(raw: &RawFrame) -> Encoding {
    match raw.text_encoding() {
        0 if raw.fields().iter().all(|f| f.unicode().is_none()) => Encoding::Latin1,
        2 => Encoding::UTF16BE,
        3 => Encoding::UTF8,
        _ => Encoding::UTF16,
    }
}

/// The V1 slots as raw text records.
fn raw_from_v1(tag: &id3::v1::Tag) -> Vec<RawFrame> {
    let track = tag.track.map(|n| n.to_string());
    let genre = (tag.genre_id != u8::MAX).then(|| format!("({})", tag.genre_id));

    let mut out = Vec::new();
    let entries: [(FrameId, Option<&str>); 7] = [
        (FrameId::Tit2, Some(tag.title.as_str())),
        (FrameId::Tpe1, Some(tag.artist.as_str())),
        (FrameId::Talb, Some(tag.album.as_str())),
        (FrameId::Tyer, Some(tag.year.as_str())),
        (FrameId::Trck, track.as_deref()),
        (FrameId::Comm, Some(tag.comment.as_str())),
        (FrameId::Tcon, genre.as_deref()),
    ];
    for (id, text) in entries {
        let Some(text) = text.map(str::trim).filter(|s| !s.is_empty()) else {
            continue;
        };
        let Some(mut raw) = id.code().and_then(RawFrame::allocate) else {
            continue;
        };
        if let Some(field) = raw.field_mut(code::TEXT) {
            field.set_ascii(text);
        }
        if let Some(field) = raw.field_mut(code::LANGUAGE) {
            field.set_ascii(UNKNOWN_LANGUAGE);
        }
        out.push(raw);
    }
    out
}

/// Rebuild an id3 frame from a raw record.
fn frame_from_raw(raw: &RawFrame) -> Option<id3::Frame> {
    let (id, _) = info::frame_by_code(raw.code())?;
    let name = id.as_str();

    let text = |c: u8| {
        raw.field(c)
            .and_then(|f| f.unicode().or_else(|| f.ascii()))
            .unwrap_or_default()
    };
    let bytes = |c: u8| {
        raw.field(c)
            .and_then(RawField::binary)
            .map(<[u8]>::to_vec)
            .unwrap_or_default()
    };
    let int = |c: u8| raw.field(c).and_then(RawField::integer).unwrap_or(0);
    let lang = || {
        let lang = text(code::LANGUAGE);
        if lang.len() == 3 {
            lang
        } else {
            UNKNOWN_LANGUAGE.to_string()
        }
    };

    let content = match id {
        FrameId::Txxx => Content::ExtendedText(ExtendedText {
            description: text(code::DESCRIPTION),
            value: text(code::TEXT),
        }),
        FrameId::Wxxx => Content::ExtendedLink(ExtendedLink {
            description: text(code::DESCRIPTION),
            link: text(code::URL),
        }),
        FrameId::Comm => Content::Comment(Comment {
            lang: lang(),
            description: text(code::DESCRIPTION),
            text: text(code::TEXT),
        }),
        FrameId::Uslt => Content::Lyrics(Lyrics {
            lang: lang(),
            description: text(code::DESCRIPTION),
            text: text(code::TEXT),
        }),
        FrameId::Apic => Content::Picture(Picture {
            mime_type: text(code::MIMETYPE),
            picture_type: picture_type(int(code::PICTURETYPE)),
            description: text(code::DESCRIPTION),
            data: bytes(code::DATA),
        }),
        FrameId::Popm => Content::Popularimeter(Popularimeter {
            user: text(code::EMAIL),
            rating: u8::try_from(int(code::RATING)).unwrap_or(u8::MAX),
            counter: int(code::COUNTER).into(),
        }),
        FrameId::Geob => Content::EncapsulatedObject(EncapsulatedObject {
            mime_type: text(code::MIMETYPE),
            filename: text(code::FILENAME),
            description: text(code::DESCRIPTION),
            data: bytes(code::DATA),
        }),
        FrameId::Priv => Content::Private(Private {
            owner_identifier: text(code::OWNER),
            private_data: bytes(code::DATA),
        }),
        FrameId::Ufid => Content::UniqueFileIdentifier(UniqueFileIdentifier {
            owner_identifier: text(code::OWNER),
            identifier: bytes(code::DATA),
        }),
        // id3 only writes these as a parsed people list
        FrameId::Tipl | FrameId::Tmcl => opaque(raw)?,
        _ if name.starts_with('T') => Content::Text(text(code::TEXT)),
        _ if name.starts_with('W') => Content::Link(text(code::URL)),
        _ => opaque(raw)?,
    };
    Some(id3::Frame::with_content(name, content).set_encoding(Some(id3_encoding(raw))))
}

fn opaque(raw: &RawFrame) -> Option<Content> {
    Some(Content::Unknown(Unknown {
        data: body::encode(raw)?,
        version: Version::Id3v24,
    }))
}

fn picture_type_code(kind: &PictureType) -> u8 {
    match kind {
        PictureType::Other => 0,
        PictureType::Icon => 1,
        PictureType::OtherIcon => 2,
        PictureType::CoverFront => 3,
        PictureType::CoverBack => 4,
        PictureType::Leaflet => 5,
        PictureType::Media => 6,
        PictureType::LeadArtist => 7,
        PictureType::Artist => 8,
        PictureType::Conductor => 9,
        PictureType::Band => 10,
        PictureType::Composer => 11,
        PictureType::Lyricist => 12,
        PictureType::RecordingLocation => 13,
        PictureType::DuringRecording => 14,
        PictureType::DuringPerformance => 15,
        PictureType::ScreenCapture => 16,
        PictureType::BrightFish => 17,
        PictureType::Illustration => 18,
        PictureType::BandLogo => 19,
        PictureType::PublisherLogo => 20,
        PictureType::Undefined(n) => *n,
    }
}

fn picture_type(value: u32) -> PictureType {
    match value {
        0 => PictureType::Other,
        1 => PictureType::Icon,
        2 => PictureType::OtherIcon,
        3 => PictureType::CoverFront,
        4 => PictureType::CoverBack,
        5 => PictureType::Leaflet,
        6 => PictureType::Media,
        7 => PictureType::LeadArtist,
        8 => PictureType::Artist,
        9 => PictureType::Conductor,
        10 => PictureType::Band,
        11 => PictureType::Composer,
        12 => PictureType::Lyricist,
        13 => PictureType::RecordingLocation,
        14 => PictureType::DuringRecording,
        15 => PictureType::DuringPerformance,
        16 => PictureType::ScreenCapture,
        17 => PictureType::BrightFish,
        18 => PictureType::Illustration,
        19 => PictureType::BandLogo,
        20 => PictureType::PublisherLogo,
        n => PictureType::Undefined(u8::try_from(n).unwrap_or(u8::MAX)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_content_becomes_narrow_record() {
        let frame = id3::Frame::text("TIT2", "Shy Boy");
        let raw = raw_from_frame(&frame).unwrap();
        assert_eq!(raw.text_encoding(), 0);
        assert_eq!(
            raw.field(code::TEXT).unwrap().ascii().as_deref(),
            Some("Shy Boy")
        );
    }

    #[test]
    fn non_latin1_text_switches_to_wide() {
        let frame = id3::Frame::with_content(
            "COMM",
            Content::Comment(Comment {
                lang: "jpn".to_string(),
                description: String::new(),
                text: "恨み節".to_string(),
            }),
        );
        let raw = raw_from_frame(&frame).unwrap();
        assert_eq!(raw.text_encoding(), 1);
        assert_eq!(
            raw.field(code::TEXT).unwrap().unicode().as_deref(),
            Some("恨み節")
        );
        // language is never wide
        assert_eq!(
            raw.field(code::LANGUAGE).unwrap().ascii().as_deref(),
            Some("jpn")
        );
    }

    #[test]
    fn picture_survives_both_directions() {
        let frame = id3::Frame::with_content(
            "APIC",
            Content::Picture(Picture {
                mime_type: "image/jpeg".to_string(),
                picture_type: PictureType::CoverFront,
                description: "cover".to_string(),
                data: vec![0xff, 0xd8, 0xff],
            }),
        );
        let raw = raw_from_frame(&frame).unwrap();
        assert_eq!(raw.field(code::PICTURETYPE).unwrap().integer(), Some(3));

        let back = frame_from_raw(&raw).unwrap();
        assert_eq!(back.id(), "APIC");
        match back.content() {
            Content::Picture(p) => {
                assert_eq!(p.mime_type, "image/jpeg");
                assert_eq!(p.picture_type, PictureType::CoverFront);
                assert_eq!(p.data, vec![0xff, 0xd8, 0xff]);
            }
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn comment_without_language_gets_placeholder() {
        let mut raw = RawFrame::allocate(FrameId::Comm.code().unwrap()).unwrap();
        raw.field_mut(code::TEXT).unwrap().set_ascii("chunky bacon");
        let frame = frame_from_raw(&raw).unwrap();
        match frame.content() {
            Content::Comment(c) => {
                assert_eq!(c.lang, "XXX");
                assert_eq!(c.text, "chunky bacon");
            }
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn frames_without_typed_content_travel_as_bytes() {
        let mut raw = RawFrame::allocate(FrameId::Pcnt.code().unwrap()).unwrap();
        raw.field_mut(code::COUNTER).unwrap().set_integer(5);
        let frame = frame_from_raw(&raw).unwrap();
        assert_eq!(frame.id(), "PCNT");
        match frame.content() {
            Content::Unknown(u) => assert_eq!(u.data, vec![0, 0, 0, 5]),
            other => panic!("unexpected content {other:?}"),
        }
        assert_eq!(raw_from_frame(&frame), Some(raw));
    }

    #[test]
    fn play_counter_is_read_from_its_bytes() {
        let frame = id3::Frame::with_content(
            "PCNT",
            Content::Unknown(Unknown {
                data: vec![0, 0, 1, 0],
                version: Version::Id3v24,
            }),
        );
        let raw = raw_from_frame(&frame).unwrap();
        assert_eq!(raw.field(code::COUNTER).unwrap().integer(), Some(256));
        assert!(raw.field(code::DATA).is_none());
    }

    #[test]
    fn parsed_contents_without_mapping_are_kept() {
        let frame = id3::Frame::with_content(
            "TIPL",
            Content::InvolvedPeopleList(id3::frame::InvolvedPeopleList {
                items: vec![id3::frame::InvolvedPeopleListItem {
                    involvement: "producer".to_string(),
                    involvee: "Mike Batt".to_string(),
                }],
            }),
        );
        let raw = raw_from_frame(&frame).unwrap();
        assert_eq!(raw.text_encoding(), 0);
        assert_eq!(
            raw.field(code::TEXT).unwrap().ascii().as_deref(),
            Some("producer\0Mike Batt")
        );
    }

    #[test]
    fn declared_encoding_is_carried_both_ways() {
        let mut raw = RawFrame::allocate(FrameId::Txxx.code().unwrap()).unwrap();
        raw.set_text_encoding(1);
        raw.field_mut(code::DESCRIPTION).unwrap().set_ascii("key");
        raw.field_mut(code::TEXT).unwrap().set_ascii("value");
        let frame = frame_from_raw(&raw).unwrap();
        assert_eq!(frame.encoding(), Some(Encoding::UTF16));

        let back = raw_from_frame(&frame).unwrap();
        assert_eq!(back.text_encoding(), 1);
        assert_eq!(back.field(code::TEXT).unwrap().unicode().as_deref(), Some("value"));

        let narrow = RawFrame::allocate(FrameId::Tit2.code().unwrap()).unwrap();
        assert_eq!(frame_from_raw(&narrow).unwrap().encoding(), Some(Encoding::Latin1));
    }

    #[test]
    fn picture_type_codes_round_trip() {
        for n in 0..=20u32 {
            assert_eq!(u32::from(picture_type_code(&picture_type(n))), n);
        }
        assert_eq!(picture_type(42), PictureType::Undefined(42));
    }
}
