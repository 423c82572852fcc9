//! Domain models for the playlist pipeline
//!
//! Everything here is transient: entries are rebuilt from the file on every
//! run and dropped once the playlist has been rendered.

use std::fmt;

// =============================================================================
// Attributes
// =============================================================================

pub const ATTR_NAME: &str = "tvg-name";
pub const ATTR_ID: &str = "tvg-id";
pub const ATTR_LOGO: &str = "tvg-logo";
pub const ATTR_GROUP: &str = "group-title";

/// Category value that counts as "not set" alongside the empty string.
pub const PLACEHOLDER_CATEGORY: &str = "undefined";

/// Attributes found on a descriptor line.
///
/// The four attributes the enricher manages get their own fields; anything
/// else is kept in source order so it survives a rewrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorAttributes {
    pub name: String,
    pub id: String,
    pub logo: String,
    pub group: String,
    pub extra: Vec<(String, String)>,
}

impl DescriptorAttributes {
    /// Build from `(key, value)` pairs. The first occurrence of a known key
    /// wins; repeated unknown keys are all kept.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut attributes = Self::default();
        let mut seen = [false; 4];

        for (key, value) in pairs {
            let key = key.into();
            let value = value.into();
            let slot = match key.as_str() {
                ATTR_NAME => Some((0, &mut attributes.name)),
                ATTR_ID => Some((1, &mut attributes.id)),
                ATTR_LOGO => Some((2, &mut attributes.logo)),
                ATTR_GROUP => Some((3, &mut attributes.group)),
                _ => None,
            };

            match slot {
                Some((index, field)) => {
                    if !seen[index] {
                        seen[index] = true;
                        *field = value;
                    }
                }
                None => attributes.extra.push((key, value)),
            }
        }

        attributes
    }
}

// =============================================================================
// Parsed input
// =============================================================================

/// One descriptor line plus the reference line that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Zero-based index of the entry in the source file
    pub position: usize,
    /// Descriptor line exactly as read (without line terminator)
    pub descriptor: String,
    /// Duration token between `#EXTINF:` and the attributes, usually `-1`
    pub duration: String,
    pub attributes: DescriptorAttributes,
    /// Text after the separator comma, untouched
    pub raw_title: String,
    /// Opaque media reference; never modified
    pub reference: String,
}

/// Line terminator detected in the source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPlaylist {
    /// Every line that is not part of a recognized entry, in source order
    pub header: Vec<String>,
    pub entries: Vec<RawEntry>,
    pub line_ending: LineEnding,
}

// =============================================================================
// Titles and metadata
// =============================================================================

/// Title split into its bare text and an optional release year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedTitle {
    pub bare_title: String,
    /// Four ASCII digits, or `None`
    pub year: Option<String>,
}

/// What a metadata lookup resolved for one title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    pub canonical_id: String,
    pub canonical_title: String,
    pub category: String,
    /// Full artwork URL; may be empty
    pub artwork_url: String,
    pub release_year: Option<String>,
}

// =============================================================================
// Output
// =============================================================================

/// Entry after the merge policy ran, ready for ordering and rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedEntry {
    pub position: usize,
    pub original_descriptor: String,
    pub duration: String,
    pub extra_attributes: Vec<(String, String)>,
    pub bare_title: String,
    /// Empty when no year is known
    pub year: String,
    /// Numeric year, 0 when unknown
    pub year_number: u32,
    pub display_title: String,
    pub final_name: String,
    pub final_id: String,
    pub final_artwork: String,
    pub final_category: String,
    pub reference: String,
    pub base_title: String,
}

impl EnrichedEntry {
    /// Key used to decide saga membership.
    pub fn group_key(&self) -> String {
        self.base_title.to_lowercase()
    }
}

impl fmt::Display for EnrichedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_title)
    }
}
