//! Small value types shared by the tag collection and the stores.
//!
//! Rule of thumb:
//! - These are "boring bags of data"
//! - No registry lookups
//! - No filesystem code

use std::fmt;

bitflags::bitflags! {
    /// Bitmask selecting which tag versions an operation applies to.
    ///
    /// The same vocabulary is used for read filters, write targets and the
    /// masks stores report back ("what was actually stripped/written").
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TagType: u8 {
        /// No tag type.
        const NONE = 0;
        /// ID3 version 1.
        const V1 = 1;
        /// ID3 version 2.
        const V2 = 1 << 1;
        /// Both ID3 versions.
        const BOTH = Self::V1.bits() | Self::V2.bits();
        /// All tag types, including ones no store knows yet.
        const ALL = 0xff;
    }
}

impl Default for TagType {
    fn default() -> Self {
        TagType::NONE
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if *self == TagType::NONE {
            "none"
        } else if *self == TagType::V1 {
            "v1"
        } else if *self == TagType::V2 {
            "v2"
        } else if *self == TagType::BOTH {
            "v1+v2"
        } else if *self == TagType::ALL {
            "all"
        } else {
            return write!(f, "{:#04x}", self.bits());
        };
        f.write_str(name)
    }
}

/// Options a [`Tag`](crate::Tag) is opened with.
///
/// - `read_type`: which tag versions to read; also the default write target
/// - `padding`: whether the store may pad the written tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagOptions {
    pub read_type: TagType,
    pub padding: bool,
}

impl Default for TagOptions {
    fn default() -> Self {
        TagOptions {
            read_type: TagType::ALL,
            padding: true,
        }
    }
}

impl TagOptions {
    pub fn read_type(mut self, read_type: TagType) -> Self {
        self.read_type = read_type;
        self
    }

    pub fn padding(mut self, padding: bool) -> Self {
        self.padding = padding;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_is_v1_or_v2() {
        assert_eq!(TagType::V1 | TagType::V2, TagType::BOTH);
        assert_eq!(TagType::BOTH.bits(), 3);
    }

    #[test]
    fn all_contains_every_version() {
        assert!(TagType::ALL.contains(TagType::V1));
        assert!(TagType::ALL.contains(TagType::BOTH));
        assert!(!TagType::V1.contains(TagType::V2));
        assert!(TagType::NONE.is_empty());
    }

    #[test]
    fn intersects_checks_shared_bits() {
        assert!(TagType::BOTH.intersects(TagType::V2));
        assert!(!TagType::V1.intersects(TagType::V2));
        assert_eq!(TagType::ALL & TagType::V2, TagType::V2);
    }

    #[test]
    fn unnamed_bits_are_kept_and_shown_as_hex() {
        let odd = TagType::from_bits_retain(0x04) | TagType::V1;
        assert_eq!(odd.bits(), 0x05);
        assert!(TagType::ALL.contains(odd));
        assert_eq!(odd.to_string(), "0x05");
        assert_eq!(TagType::BOTH.to_string(), "v1+v2");
        assert_eq!(TagType::default(), TagType::NONE);
    }

    #[test]
    fn default_options_read_everything_with_padding() {
        let opts = TagOptions::default();
        assert_eq!(opts.read_type, TagType::ALL);
        assert!(opts.padding);

        let opts = opts.read_type(TagType::V1).padding(false);
        assert_eq!(opts.read_type, TagType::V1);
        assert!(!opts.padding);
    }
}
