//! Rendering enriched entries back to playlist text

use crate::models::{EnrichedEntry, LineEnding, ATTR_GROUP, ATTR_ID, ATTR_LOGO, ATTR_NAME};

use std::fmt::Write as _;

/// What a rewrite would change compared to the source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    /// Entries whose descriptor line differs from the original
    pub rewritten: usize,
    /// Whether the output order differs from the source order
    pub reordered: bool,
}

impl ChangeSummary {
    pub fn has_changes(&self) -> bool {
        self.rewritten > 0 || self.reordered
    }
}

/// Render the descriptor line for one entry.
///
/// The four managed attributes always come first, in a fixed order, followed
/// by any other attributes the source line carried.
pub fn render_descriptor(entry: &EnrichedEntry) -> String {
    let mut line = format!("#EXTINF:{}", entry.duration);

    let managed = [
        (ATTR_NAME, entry.final_name.as_str()),
        (ATTR_ID, entry.final_id.as_str()),
        (ATTR_LOGO, entry.final_artwork.as_str()),
        (ATTR_GROUP, entry.final_category.as_str()),
    ];
    let extra = entry
        .extra_attributes
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()));

    for (key, value) in managed.into_iter().chain(extra) {
        let _ = write!(line, " {}=\"{}\"", key, attribute_value(value));
    }

    line.push(',');
    line.push_str(&single_line(&entry.display_title));
    line
}

/// Render the full playlist: header lines verbatim, then each entry's
/// descriptor and reference line. Every line is terminated.
pub fn render(header: &[String], entries: &[EnrichedEntry], line_ending: LineEnding) -> String {
    let newline = line_ending.as_str();
    let mut out = String::new();

    for line in header {
        out.push_str(line);
        out.push_str(newline);
    }
    for entry in entries {
        out.push_str(&render_descriptor(entry));
        out.push_str(newline);
        out.push_str(&entry.reference);
        out.push_str(newline);
    }

    out
}

/// Compare ordered entries against their source form.
pub fn summarize_changes(ordered: &[EnrichedEntry]) -> ChangeSummary {
    let rewritten = ordered
        .iter()
        .filter(|entry| render_descriptor(entry) != entry.original_descriptor)
        .count();
    let reordered = ordered
        .iter()
        .enumerate()
        .any(|(index, entry)| entry.position != index);

    ChangeSummary {
        rewritten,
        reordered,
    }
}

// Attribute values must not contain `"` or line breaks.
fn attribute_value(value: &str) -> String {
    single_line(value).replace('"', "'")
}

fn single_line(value: &str) -> String {
    if value.contains(['\r', '\n']) {
        value
            .split(['\r', '\n'])
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        value.to_string()
    }
}
