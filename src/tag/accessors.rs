//! tag/accessors.rs
//! Natural-name shortcuts over [`Tag::text`] and [`Tag::set_text`], plus a
//! few helpers for frames that are looked up by description.

use super::Tag;
use super::util::parse_slash_pair_u32;
use crate::frame::Frame;
use crate::info::{FieldId, FrameId};
use crate::store::TagStore;

macro_rules! text_accessors {
    ($($id:ident => $get:ident, $set:ident;)*) => {
        impl<S: TagStore> Tag<S> {
            $(
                #[doc = concat!("Text of the first `", stringify!($id), "` frame.")]
                pub fn $get(&self) -> Option<&str> {
                    self.text(&FrameId::$id)
                }

                #[doc = concat!("Replace the `", stringify!($id), "` frames; `None` removes them.")]
                pub fn $set(&mut self, text: Option<&str>) {
                    self.set_text(FrameId::$id, text);
                }
            )*
        }
    };
}

text_accessors! {
    Tit2 => title, set_title;
    Tpe1 => performer, set_performer;
    Tpe1 => artist, set_artist;
    Talb => album, set_album;
    Tcon => genre, set_genre;
    Tyer => year, set_year;
    Trck => track, set_track;
    Tpos => part_of_set, set_part_of_set;
    Tpos => disc, set_disc;
    Comm => comment, set_comment;
    Tcom => composer, set_composer;
    Tit1 => grouping, set_grouping;
    Tbpm => bpm, set_bpm;
    Tit3 => subtitle, set_subtitle;
    Tdat => date, set_date;
    Time => time, set_time;
    Tlan => language, set_language;
    Uslt => lyrics, set_lyrics;
    Text => lyricist, set_lyricist;
    Tpe2 => band, set_band;
    Tpe3 => conductor, set_conductor;
    Tpe4 => interpreted_by, set_interpreted_by;
    Tpub => publisher, set_publisher;
    Tenc => encoded_by, set_encoded_by;
}

impl<S: TagStore> Tag<S> {
    /// Text of the first `TXXX` frame with this description.
    pub fn user_frame_text(&self, description: &str) -> Option<&str> {
        self.iter()
            .find(|f| is_user_frame(f, description))
            .and_then(Frame::text)
    }

    /// Replace the `TXXX` frames with this description; `None` removes them.
    pub fn set_user_frame_text(&mut self, description: &str, text: Option<&str>) {
        self.retain(|f| !is_user_frame(f, description));
        if let Some(text) = text {
            self.push(
                Frame::new(FrameId::Txxx)
                    .with(FieldId::Description, description)
                    .with(FieldId::Text, text),
            );
        }
    }

    /// Every `COMM` frame, in tag order.
    pub fn comment_frames(&self) -> impl Iterator<Item = &Frame> + '_ {
        self.iter().filter(|f| *f.id() == FrameId::Comm)
    }

    /// `TRCK` as (track, total).
    pub fn track_numbers(&self) -> (Option<u32>, Option<u32>) {
        parse_slash_pair_u32(self.track())
    }

    /// `TPOS` as (disc, total).
    pub fn disc_numbers(&self) -> (Option<u32>, Option<u32>) {
        parse_slash_pair_u32(self.part_of_set())
    }
}

fn is_user_frame(frame: &Frame, description: &str) -> bool {
    *frame.id() == FrameId::Txxx && frame.description() == Some(description)
}

#[cfg(test)]
mod tests {
    use crate::frame::Frame;
    use crate::info::{FieldId, FrameId};
    use crate::store::{MemoryDisk, MemoryStore};
    use crate::tag::Tag;
    use crate::types::TagOptions;

    fn empty() -> Tag<MemoryStore> {
        Tag::with_store(MemoryDisk::new().store(), "x.mp3", TagOptions::default())
    }

    #[test]
    fn aliases_share_a_frame() {
        let mut tag = empty();
        tag.set_artist(Some("Katie Melua"));
        assert_eq!(tag.performer(), Some("Katie Melua"));
        tag.set_performer(None);
        assert_eq!(tag.artist(), None);

        tag.set_disc(Some("2/3"));
        assert_eq!(tag.part_of_set(), Some("2/3"));
        assert_eq!(tag.disc_numbers(), (Some(2), Some(3)));
    }

    #[test]
    fn accessors_read_the_first_match() {
        let mut tag = empty();
        tag.push(Frame::with_text(FrameId::Comm, "chunky bacon"));
        tag.push(Frame::with_text(FrameId::Comm, "really."));
        assert_eq!(tag.comment(), Some("chunky bacon"));
        assert_eq!(tag.comment_frames().count(), 2);
    }

    #[test]
    fn user_frames_are_keyed_by_description() {
        let mut tag = empty();
        tag.set_user_frame_text("MusicBrainz Album Id", Some("992dc19a"));
        tag.push(
            Frame::new(FrameId::Txxx)
                .with(FieldId::Description, "Other")
                .with(FieldId::Text, "x"),
        );
        assert_eq!(tag.user_frame_text("MusicBrainz Album Id"), Some("992dc19a"));
        assert_eq!(tag.user_frame_text("Inexistent"), None);

        tag.set_user_frame_text("MusicBrainz Album Id", None);
        assert_eq!(tag.user_frame_text("MusicBrainz Album Id"), None);
        assert_eq!(tag.user_frame_text("Other"), Some("x"));
    }

    #[test]
    fn user_frame_text_outlives_the_description() {
        let mut tag = empty();
        tag.set_user_frame_text("MusicBrainz Album Id", Some("992dc19a"));
        let text = {
            let key = String::from("MusicBrainz Album Id");
            tag.user_frame_text(&key)
        };
        assert_eq!(text, Some("992dc19a"));
    }

    #[test]
    fn track_numbers_parse_pairs() {
        let mut tag = empty();
        assert_eq!(tag.track_numbers(), (None, None));
        tag.set_track(Some("1/12"));
        assert_eq!(tag.track_numbers(), (Some(1), Some(12)));
    }
}
