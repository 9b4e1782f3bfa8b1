//! store/v1.rs
//! The 128-byte ID3v1.1 block, built from raw records.
//!
//! `id3` reads and removes V1 tags but cannot write them, so the block is
//! laid out here, slot for slot as `id3::v1::Tag` reads it back.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::ops::Range;
use std::path::Path;

use super::RawFrame;
use crate::info::{FrameId, code};

pub(crate) const BLOCK_LEN: usize = 128;

const TITLE: Range<usize> = 3..33;
const ARTIST: Range<usize> = 33..63;
const ALBUM: Range<usize> = 63..93;
const YEAR: Range<usize> = 93..97;
const COMMENT: Range<usize> = 97..127;
/// The comment slot when byte 126 carries a track number (ID3v1.1).
const SHORT_COMMENT: Range<usize> = 97..125;
const TRACK: usize = 126;
const GENRE: usize = 127;
const NO_GENRE: u8 = u8::MAX;

/// The V1 block for `frames`: the first title, artist, album, year,
/// comment, track and genre. `None` when there is nothing to put in it.
pub(crate) fn encode(frames: &[RawFrame]) -> Option<[u8; BLOCK_LEN]> {
    let text = |id: FrameId| -> Option<String> {
        let frame_code = id.code()?;
        let field = frames.iter().find(|f| f.code() == frame_code)?.field(code::TEXT)?;
        field
            .unicode()
            .or_else(|| field.ascii())
            .filter(|s| !s.trim().is_empty())
    };

    let title = text(FrameId::Tit2);
    let artist = text(FrameId::Tpe1);
    let album = text(FrameId::Talb);
    let year = text(FrameId::Tyer);
    let comment = text(FrameId::Comm);
    let track = text(FrameId::Trck).and_then(|t| track_number(&t));
    let genre = text(FrameId::Tcon).and_then(|t| genre_id(&t));

    if title.is_none()
        && artist.is_none()
        && album.is_none()
        && year.is_none()
        && comment.is_none()
        && track.is_none()
        && genre.is_none()
    {
        return None;
    }

    let mut block = [0u8; BLOCK_LEN];
    block[..3].copy_from_slice(b"TAG");
    put(&mut block[TITLE], title.as_deref());
    put(&mut block[ARTIST], artist.as_deref());
    put(&mut block[ALBUM], album.as_deref());
    put(&mut block[YEAR], year.as_deref());
    match track {
        Some(n) => {
            put(&mut block[SHORT_COMMENT], comment.as_deref());
            block[TRACK] = n;
        }
        None => put(&mut block[COMMENT], comment.as_deref()),
    }
    block[GENRE] = genre.unwrap_or(NO_GENRE);
    Some(block)
}

/// Append a block to the end of the file. The file must exist.
pub(crate) fn append(path: &Path, block: &[u8; BLOCK_LEN]) -> io::Result<()> {
    let mut file = OpenOptions::new().append(true).open(path)?;
    file.write_all(block)
}

/// ISO-8859-1, cut to the slot, zero-filled.
fn put(slot: &mut [u8], text: Option<&str>) {
    let Some(text) = text else { return };
    for (b, c) in slot.iter_mut().zip(text.trim().chars()) {
        *b = u8::try_from(u32::from(c)).unwrap_or(b'?');
    }
}

/// "3" or "3/12"; V1 has no room for 0 or anything above 255.
fn track_number(text: &str) -> Option<u8> {
    let n = text.split('/').next()?.trim().parse::<u8>().ok()?;
    (n != 0).then_some(n)
}

/// "(17)", "(17)Rock" or "17".
fn genre_id(text: &str) -> Option<u8> {
    let text = text.trim();
    let number = match text.strip_prefix('(') {
        Some(rest) => rest.split_once(')')?.0,
        None => text,
    };
    number.trim().parse().ok().filter(|&n| n != NO_GENRE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_frame(id: FrameId, text: &str) -> RawFrame {
        let mut raw = RawFrame::allocate(id.code().unwrap()).unwrap();
        raw.field_mut(code::TEXT).unwrap().set_ascii(text);
        raw
    }

    #[test]
    fn nothing_to_write_is_none() {
        assert_eq!(encode(&[]), None);
        assert_eq!(encode(&[text_frame(FrameId::Tcom, "Mike Batt")]), None);
    }

    #[test]
    fn slots_hold_what_id3_reads_back() {
        let frames = [
            text_frame(FrameId::Tit2, "Shy Boy"),
            text_frame(FrameId::Tpe1, "Katie Melua"),
            text_frame(FrameId::Tyer, "2005"),
            text_frame(FrameId::Trck, "1/12"),
            text_frame(FrameId::Tcon, "(12)Other"),
        ];
        let block = encode(&frames).unwrap();
        let tag = id3::v1::Tag::read_from(io::Cursor::new(block.to_vec())).unwrap();
        assert_eq!(tag.title, "Shy Boy");
        assert_eq!(tag.artist, "Katie Melua");
        assert_eq!(tag.album, "");
        assert_eq!(tag.year, "2005");
        assert_eq!(tag.track, Some(1));
        assert_eq!(tag.genre_id, 12);
    }

    #[test]
    fn long_text_is_cut_to_the_slot() {
        let title = "Nine Million Bicycles In Beijing, That's A Fact";
        let block = encode(&[text_frame(FrameId::Tit2, title)]).unwrap();
        assert_eq!(&block[TITLE], &title.as_bytes()[..30]);
        assert_eq!(block[GENRE], NO_GENRE);
    }

    #[test]
    fn genre_and_track_parsing() {
        assert_eq!(genre_id("(17)"), Some(17));
        assert_eq!(genre_id("17"), Some(17));
        assert_eq!(genre_id("Rock"), None);
        assert_eq!(track_number("3/12"), Some(3));
        assert_eq!(track_number("0"), None);
        assert_eq!(track_number("300"), None);
    }
}
