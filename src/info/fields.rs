//! info/fields.rs
//!
//! The field universe: every field ID a frame may declare, with its numeric
//! code and whether its text depends on the frame's `textenc` field.

use std::fmt;
use std::str::FromStr;

/// Numeric field codes, as used by stores to key raw fields.
pub mod code {
    pub const TEXTENC: u8 = 1;
    pub const TEXT: u8 = 2;
    pub const URL: u8 = 3;
    pub const DATA: u8 = 4;
    pub const DESCRIPTION: u8 = 5;
    pub const OWNER: u8 = 6;
    pub const EMAIL: u8 = 7;
    pub const RATING: u8 = 8;
    pub const FILENAME: u8 = 9;
    pub const LANGUAGE: u8 = 10;
    pub const PICTURETYPE: u8 = 11;
    pub const IMAGEFORMAT: u8 = 12;
    pub const MIMETYPE: u8 = 13;
    pub const COUNTER: u8 = 14;
    pub const ID: u8 = 15;
    pub const VOLUMEADJ: u8 = 16;
    pub const NUMBITS: u8 = 17;
    pub const VOLCHGRIGHT: u8 = 18;
    pub const VOLCHGLEFT: u8 = 19;
    pub const PEAKVOLRIGHT: u8 = 20;
    pub const PEAKVOLLEFT: u8 = 21;
    pub const TIMESTAMPFORMAT: u8 = 22;
    pub const CONTENTTYPE: u8 = 23;
}

/// Registry entry for one field ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub code: u8,
    pub name: &'static str,
    pub description: &'static str,
    /// Text of this field follows the frame's `textenc` (ASCII at 0, wide above).
    pub encoding_sensitive: bool,
}

macro_rules! field_table {
    ($($variant:ident = $code:ident, $name:literal, $desc:literal, $sensitive:literal;)+) => {
        /// A field symbol.
        ///
        /// Known fields are the registry's closed universe; `Unknown` holds
        /// any other key a frame was built with, so it can be reported as
        /// invalid instead of being unrepresentable.
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum FieldId {
            $($variant,)+
            Unknown(String),
        }

        impl FieldId {
            pub fn as_str(&self) -> &str {
                match self {
                    $(FieldId::$variant => $name,)+
                    FieldId::Unknown(name) => name,
                }
            }

            /// Registry entry, or `None` for unknown symbols.
            pub fn info(&self) -> Option<FieldInfo> {
                let (code, name, description, encoding_sensitive) = match self {
                    $(FieldId::$variant => (code::$code, $name, $desc, $sensitive),)+
                    FieldId::Unknown(_) => return None,
                };
                Some(FieldInfo {
                    code,
                    name,
                    description,
                    encoding_sensitive,
                })
            }

            pub fn from_code(value: u8) -> Option<FieldId> {
                match value {
                    $(code::$code => Some(FieldId::$variant),)+
                    _ => None,
                }
            }

            /// Parse a field name; names outside the registry become `Unknown`.
            pub fn from_name(name: &str) -> FieldId {
                match name {
                    $($name => FieldId::$variant,)+
                    other => FieldId::Unknown(other.to_owned()),
                }
            }
        }
    };
}

field_table! {
    Textenc = TEXTENC, "textenc", "Text encoding (unicode or ASCII)", false;
    Text = TEXT, "text", "Text field", true;
    Url = URL, "url", "A URL", false;
    Data = DATA, "data", "Data field", false;
    Description = DESCRIPTION, "description", "Description field", true;
    Owner = OWNER, "owner", "Owner field", false;
    Email = EMAIL, "email", "Email field", false;
    Rating = RATING, "rating", "Rating field", false;
    Filename = FILENAME, "filename", "Filename field", true;
    Language = LANGUAGE, "language", "Language field", false;
    PictureType = PICTURETYPE, "picturetype", "Picture type field", false;
    ImageFormat = IMAGEFORMAT, "imageformat", "Image format field", false;
    MimeType = MIMETYPE, "mimetype", "Mimetype field", false;
    Counter = COUNTER, "counter", "Counter field", false;
    Id = ID, "id", "Identifier/Symbol field", false;
    VolumeAdj = VOLUMEADJ, "volumeadj", "Volume adjustment field", false;
    NumBits = NUMBITS, "numbits", "Number of bits field", false;
    VolChgRight = VOLCHGRIGHT, "volchgright", "Right volume change field", false;
    VolChgLeft = VOLCHGLEFT, "volchgleft", "Left volume change field", false;
    PeakVolRight = PEAKVOLRIGHT, "peakvolright", "Right peak volume field", false;
    PeakVolLeft = PEAKVOLLEFT, "peakvolleft", "Left peak volume field", false;
    TimestampFormat = TIMESTAMPFORMAT, "timestampformat", "SYLT timestamp format", false;
    ContentType = CONTENTTYPE, "contenttype", "SYLT content type", false;
}

impl FieldId {
    pub fn code(&self) -> Option<u8> {
        self.info().map(|info| info.code)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FieldId::Unknown(_))
    }

    pub fn is_encoding_sensitive(&self) -> bool {
        self.info().is_some_and(|info| info.encoding_sensitive)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FieldId::from_name(s))
    }
}

impl From<&str> for FieldId {
    fn from(name: &str) -> Self {
        FieldId::from_name(name)
    }
}
