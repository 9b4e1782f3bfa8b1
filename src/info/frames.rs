//! info/frames.rs
//!
//! The frame universe: every standard ID3v2 frame ID, its numeric code,
//! a human description and the ordered list of fields it declares.

use std::fmt;
use std::str::FromStr;

use super::fields::code::*;
use super::{FieldSpec, FieldType, FrameInfo};

const fn int(code: u8) -> FieldSpec {
    FieldSpec {
        code,
        kind: FieldType::Integer,
    }
}

const fn bin(code: u8) -> FieldSpec {
    FieldSpec {
        code,
        kind: FieldType::Binary,
    }
}

const fn txt(code: u8) -> FieldSpec {
    FieldSpec {
        code,
        kind: FieldType::Text,
    }
}

const DATA_ONLY: &[FieldSpec] = &[bin(DATA)];
const TEXT_FRAME: &[FieldSpec] = &[int(TEXTENC), txt(TEXT)];
const URL_FRAME: &[FieldSpec] = &[txt(URL)];
const TIMED_DATA: &[FieldSpec] = &[int(TIMESTAMPFORMAT), bin(DATA)];
const OWNER_DATA: &[FieldSpec] = &[txt(OWNER), bin(DATA)];
const OWNER_SYMBOL_DATA: &[FieldSpec] = &[txt(OWNER), int(ID), bin(DATA)];

const APIC: &[FieldSpec] = &[
    int(TEXTENC),
    txt(MIMETYPE),
    int(PICTURETYPE),
    txt(DESCRIPTION),
    bin(DATA),
];
const COMM: &[FieldSpec] = &[int(TEXTENC), txt(LANGUAGE), txt(DESCRIPTION), txt(TEXT)];
const COMR: &[FieldSpec] = &[
    int(TEXTENC),
    txt(TEXT),
    txt(URL),
    txt(DESCRIPTION),
    txt(MIMETYPE),
    bin(DATA),
];
const GEOB: &[FieldSpec] = &[
    int(TEXTENC),
    txt(MIMETYPE),
    txt(FILENAME),
    txt(DESCRIPTION),
    bin(DATA),
];
const LINK: &[FieldSpec] = &[bin(DATA), txt(URL), txt(TEXT)];
const OWNE: &[FieldSpec] = &[int(TEXTENC), txt(TEXT), bin(DATA)];
const PCNT: &[FieldSpec] = &[int(COUNTER)];
const POPM: &[FieldSpec] = &[txt(EMAIL), int(RATING), int(COUNTER)];
const SIGN: &[FieldSpec] = &[int(ID), bin(DATA)];
const SYLT: &[FieldSpec] = &[
    int(TEXTENC),
    txt(LANGUAGE),
    int(TIMESTAMPFORMAT),
    int(CONTENTTYPE),
    txt(DESCRIPTION),
    bin(DATA),
];
const TXXX: &[FieldSpec] = &[int(TEXTENC), txt(DESCRIPTION), txt(TEXT)];
const USER: &[FieldSpec] = &[int(TEXTENC), txt(LANGUAGE), txt(TEXT)];
const USLT: &[FieldSpec] = &[int(TEXTENC), txt(LANGUAGE), txt(DESCRIPTION), txt(TEXT)];
const WXXX: &[FieldSpec] = &[int(TEXTENC), txt(DESCRIPTION), txt(URL)];

macro_rules! frame_table {
    ($($variant:ident = $code:literal, $name:literal, $desc:literal, $fields:ident;)+) => {
        /// A frame symbol.
        ///
        /// Known frames are the registry's closed universe; `Unknown` holds
        /// any other four-character ID (e.g. a typo like `TITS`), which the
        /// registry never resolves.
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum FrameId {
            $($variant,)+
            Unknown(String),
        }

        impl FrameId {
            pub fn as_str(&self) -> &str {
                match self {
                    $(FrameId::$variant => $name,)+
                    FrameId::Unknown(name) => name,
                }
            }

            /// Registry entry, or `None` for unknown symbols.
            pub fn info(&self) -> Option<FrameInfo> {
                let (code, name, description, fields) = match self {
                    $(FrameId::$variant => ($code, $name, $desc, $fields),)+
                    FrameId::Unknown(_) => return None,
                };
                Some(FrameInfo {
                    code,
                    name,
                    description,
                    fields,
                })
            }

            pub fn from_code(value: u16) -> Option<FrameId> {
                match value {
                    $($code => Some(FrameId::$variant),)+
                    _ => None,
                }
            }

            /// Parse a frame name; names outside the registry become `Unknown`.
            pub fn from_name(name: &str) -> FrameId {
                match name {
                    $($name => FrameId::$variant,)+
                    other => FrameId::Unknown(other.to_owned()),
                }
            }
        }
    };
}

frame_table! {
    Aenc = 1, "AENC", "Audio encryption", OWNER_DATA;
    Apic = 2, "APIC", "Attached picture", APIC;
    Aspi = 3, "ASPI", "Audio seek point index", DATA_ONLY;
    Comm = 4, "COMM", "Comments", COMM;
    Comr = 5, "COMR", "Commercial frame", COMR;
    Encr = 6, "ENCR", "Encryption method registration", OWNER_SYMBOL_DATA;
    Equ2 = 7, "EQU2", "Equalisation (2)", DATA_ONLY;
    Equa = 8, "EQUA", "Equalization", DATA_ONLY;
    Etco = 9, "ETCO", "Event timing codes", TIMED_DATA;
    Geob = 10, "GEOB", "General encapsulated object", GEOB;
    Grid = 11, "GRID", "Group identification registration", OWNER_SYMBOL_DATA;
    Ipls = 12, "IPLS", "Involved people list", TEXT_FRAME;
    Link = 13, "LINK", "Linked information", LINK;
    Mcdi = 14, "MCDI", "Music CD identifier", DATA_ONLY;
    Mllt = 15, "MLLT", "MPEG location lookup table", DATA_ONLY;
    Owne = 16, "OWNE", "Ownership frame", OWNE;
    Priv = 17, "PRIV", "Private frame", OWNER_DATA;
    Pcnt = 18, "PCNT", "Play counter", PCNT;
    Popm = 19, "POPM", "Popularimeter", POPM;
    Poss = 20, "POSS", "Position synchronisation frame", TIMED_DATA;
    Rbuf = 21, "RBUF", "Recommended buffer size", DATA_ONLY;
    Rva2 = 22, "RVA2", "Relative volume adjustment (2)", DATA_ONLY;
    Rvad = 23, "RVAD", "Relative volume adjustment", DATA_ONLY;
    Rvrb = 24, "RVRB", "Reverb", DATA_ONLY;
    Seek = 25, "SEEK", "Seek frame", DATA_ONLY;
    Sign = 26, "SIGN", "Signature frame", SIGN;
    Sylt = 27, "SYLT", "Synchronized lyric/text", SYLT;
    Sytc = 28, "SYTC", "Synchronized tempo codes", TIMED_DATA;
    Talb = 29, "TALB", "Album/Movie/Show title", TEXT_FRAME;
    Tbpm = 30, "TBPM", "BPM (beats per minute)", TEXT_FRAME;
    Tcom = 31, "TCOM", "Composer", TEXT_FRAME;
    Tcon = 32, "TCON", "Content type", TEXT_FRAME;
    Tcop = 33, "TCOP", "Copyright message", TEXT_FRAME;
    Tdat = 34, "TDAT", "Date", TEXT_FRAME;
    Tden = 35, "TDEN", "Encoding time", TEXT_FRAME;
    Tdly = 36, "TDLY", "Playlist delay", TEXT_FRAME;
    Tdor = 37, "TDOR", "Original release time", TEXT_FRAME;
    Tdrc = 38, "TDRC", "Recording time", TEXT_FRAME;
    Tdrl = 39, "TDRL", "Release time", TEXT_FRAME;
    Tdtg = 40, "TDTG", "Tagging time", TEXT_FRAME;
    Tipl = 41, "TIPL", "Involved people list", TEXT_FRAME;
    Tenc = 42, "TENC", "Encoded by", TEXT_FRAME;
    Text = 43, "TEXT", "Lyricist/Text writer", TEXT_FRAME;
    Tflt = 44, "TFLT", "File type", TEXT_FRAME;
    Time = 45, "TIME", "Time", TEXT_FRAME;
    Tit1 = 46, "TIT1", "Content group description", TEXT_FRAME;
    Tit2 = 47, "TIT2", "Title/songname/content description", TEXT_FRAME;
    Tit3 = 48, "TIT3", "Subtitle/Description refinement", TEXT_FRAME;
    Tkey = 49, "TKEY", "Initial key", TEXT_FRAME;
    Tlan = 50, "TLAN", "Language(s)", TEXT_FRAME;
    Tlen = 51, "TLEN", "Length", TEXT_FRAME;
    Tmcl = 52, "TMCL", "Musician credits list", TEXT_FRAME;
    Tmed = 53, "TMED", "Media type", TEXT_FRAME;
    Tmoo = 54, "TMOO", "Mood", TEXT_FRAME;
    Toal = 55, "TOAL", "Original album/movie/show title", TEXT_FRAME;
    Tofn = 56, "TOFN", "Original filename", TEXT_FRAME;
    Toly = 57, "TOLY", "Original lyricist(s)/text writer(s)", TEXT_FRAME;
    Tope = 58, "TOPE", "Original artist(s)/performer(s)", TEXT_FRAME;
    Tory = 59, "TORY", "Original release year", TEXT_FRAME;
    Town = 60, "TOWN", "File owner/licensee", TEXT_FRAME;
    Tpe1 = 61, "TPE1", "Lead performer(s)/Soloist(s)", TEXT_FRAME;
    Tpe2 = 62, "TPE2", "Band/orchestra/accompaniment", TEXT_FRAME;
    Tpe3 = 63, "TPE3", "Conductor/performer refinement", TEXT_FRAME;
    Tpe4 = 64, "TPE4", "Interpreted, remixed, or otherwise modified by", TEXT_FRAME;
    Tpos = 65, "TPOS", "Part of a set", TEXT_FRAME;
    Tpro = 66, "TPRO", "Produced notice", TEXT_FRAME;
    Tpub = 67, "TPUB", "Publisher", TEXT_FRAME;
    Trck = 68, "TRCK", "Track number/Position in set", TEXT_FRAME;
    Trda = 69, "TRDA", "Recording dates", TEXT_FRAME;
    Trsn = 70, "TRSN", "Internet radio station name", TEXT_FRAME;
    Trso = 71, "TRSO", "Internet radio station owner", TEXT_FRAME;
    Tsiz = 72, "TSIZ", "Size", TEXT_FRAME;
    Tsoa = 73, "TSOA", "Album sort order", TEXT_FRAME;
    Tsop = 74, "TSOP", "Performer sort order", TEXT_FRAME;
    Tsot = 75, "TSOT", "Title sort order", TEXT_FRAME;
    Tsrc = 76, "TSRC", "ISRC (international standard recording code)", TEXT_FRAME;
    Tsse = 77, "TSSE", "Software/Hardware and settings used for encoding", TEXT_FRAME;
    Tsst = 78, "TSST", "Set subtitle", TEXT_FRAME;
    Txxx = 79, "TXXX", "User defined text information", TXXX;
    Tyer = 80, "TYER", "Year", TEXT_FRAME;
    Ufid = 81, "UFID", "Unique file identifier", OWNER_DATA;
    User = 82, "USER", "Terms of use", USER;
    Uslt = 83, "USLT", "Unsynchronized lyric/text transcription", USLT;
    Wcom = 84, "WCOM", "Commercial information", URL_FRAME;
    Wcop = 85, "WCOP", "Copyright/Legal information", URL_FRAME;
    Woaf = 86, "WOAF", "Official audio file webpage", URL_FRAME;
    Woar = 87, "WOAR", "Official artist/performer webpage", URL_FRAME;
    Woas = 88, "WOAS", "Official audio source webpage", URL_FRAME;
    Wors = 89, "WORS", "Official internet radio station homepage", URL_FRAME;
    Wpay = 90, "WPAY", "Payment", URL_FRAME;
    Wpub = 91, "WPUB", "Official publisher webpage", URL_FRAME;
    Wxxx = 92, "WXXX", "User defined URL link frame", WXXX;
}

/// Highest frame code in the table; codes run contiguously from 1.
pub(crate) const LAST_CODE: u16 = 92;

impl FrameId {
    pub fn code(&self) -> Option<u16> {
        self.info().map(|info| info.code)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FrameId::Unknown(_))
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrameId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FrameId::from_name(s))
    }
}

impl From<&str> for FrameId {
    fn from(name: &str) -> Self {
        FrameId::from_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_maps_to_one_frame_and_back() {
        for value in 1..=LAST_CODE {
            let id = FrameId::from_code(value).expect("contiguous codes");
            assert_eq!(id.code(), Some(value));
            assert_eq!(FrameId::from_name(id.as_str()), id);
        }
        assert_eq!(FrameId::from_code(0), None);
        assert_eq!(FrameId::from_code(LAST_CODE + 1), None);
    }

    #[test]
    fn unknown_name_is_kept_verbatim() {
        let id: FrameId = "TITS".parse().unwrap();
        assert_eq!(id, FrameId::Unknown("TITS".to_string()));
        assert!(!id.is_known());
        assert_eq!(id.info(), None);
    }

    #[test]
    fn apic_declares_picture_fields_in_order() {
        let info = FrameId::Apic.info().unwrap();
        assert_eq!(info.name, "APIC");
        assert_eq!(
            info.field_ids().map(|f| f.to_string()).collect::<Vec<_>>(),
            vec!["textenc", "mimetype", "picturetype", "description", "data"]
        );
    }
}
