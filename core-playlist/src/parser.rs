//! # Entry Parser
//!
//! Splits playlist text into header lines and `(descriptor, reference)` entries.
//!
//! A descriptor has the shape
//! `#EXTINF:<duration>[ key="value"]*,<title>`; the line right after it is its
//! reference. Anything that does not fit (lines before the first descriptor,
//! comments between entries, a descriptor with no reference line, a descriptor
//! whose attribute run cannot be read) is kept verbatim in the header so it is
//! written back untouched.

use crate::error::{PlaylistError, Result};
use crate::models::{DescriptorAttributes, LineEnding, ParsedPlaylist, RawEntry};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

pub const DESCRIPTOR_MARKER: &str = "#EXTINF:";

static DESCRIPTOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^#EXTINF:(?P<duration>-?[0-9]+(?:\.[0-9]+)?)(?P<attrs>(?:\s+[A-Za-z0-9_.:-]+="[^"]*")*)\s*,(?P<title>.*)$"#,
    )
    .expect("valid descriptor regex")
});

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?P<key>[A-Za-z0-9_.:-]+)="(?P<value>[^"]*)""#).expect("valid attribute regex")
});

/// Borrow raw file bytes as text. Playlists must be UTF-8.
pub fn decode(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| PlaylistError::InvalidEncoding(e.to_string()))
}

/// Parse playlist text. Never fails: unrecognized lines land in the header.
pub fn parse(contents: &str) -> ParsedPlaylist {
    let line_ending = if contents.contains("\r\n") {
        LineEnding::CrLf
    } else {
        LineEnding::Lf
    };

    let mut lines: Vec<&str> = contents
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    if contents.ends_with('\n') || contents.is_empty() {
        lines.pop();
    }

    let mut header = Vec::new();
    let mut entries = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];
        let reference = lines.get(index + 1).copied();

        match (parse_descriptor(line), reference) {
            (Some(descriptor), Some(reference)) if !reference.starts_with(DESCRIPTOR_MARKER) => {
                trace!(position = entries.len(), title = %descriptor.raw_title, "Parsed entry");
                entries.push(RawEntry {
                    position: entries.len(),
                    descriptor: line.to_string(),
                    duration: descriptor.duration,
                    attributes: descriptor.attributes,
                    raw_title: descriptor.raw_title,
                    reference: reference.to_string(),
                });
                index += 2;
            }
            (descriptor, _) => {
                if descriptor.is_some() || line.starts_with(DESCRIPTOR_MARKER) {
                    debug!(line = index + 1, "Descriptor without usable reference kept as header");
                }
                header.push(line.to_string());
                index += 1;
            }
        }
    }

    debug!(
        entries = entries.len(),
        header_lines = header.len(),
        "Parsed playlist"
    );

    ParsedPlaylist {
        header,
        entries,
        line_ending,
    }
}

struct Descriptor {
    duration: String,
    attributes: DescriptorAttributes,
    raw_title: String,
}

fn parse_descriptor(line: &str) -> Option<Descriptor> {
    let captures = DESCRIPTOR.captures(line)?;
    let attrs = captures.name("attrs").map(|m| m.as_str()).unwrap_or_default();

    let pairs = ATTRIBUTE
        .captures_iter(attrs)
        .filter_map(|c| Some((c.name("key")?.as_str(), c.name("value")?.as_str())));

    Some(Descriptor {
        duration: captures.name("duration")?.as_str().to_string(),
        attributes: DescriptorAttributes::from_pairs(pairs),
        raw_title: captures.name("title")?.as_str().to_string(),
    })
}
