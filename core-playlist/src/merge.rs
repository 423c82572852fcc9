//! Field merge policy
//!
//! Combines what the playlist already says about an entry with what the
//! metadata lookup returned. Lookup values win for name, artwork and year;
//! the identifier is never touched; a category the user already set is kept.

use crate::models::{EnrichedEntry, MetadataRecord, NormalizedTitle, RawEntry, PLACEHOLDER_CATEGORY};
use crate::title::{base_title, year_number};

/// Build the enriched form of `raw`. Infallible; a missing lookup keeps the
/// existing attributes.
pub fn merge(
    raw: &RawEntry,
    normalized: &NormalizedTitle,
    lookup: Option<&MetadataRecord>,
) -> EnrichedEntry {
    let existing = &raw.attributes;
    let bare_title = normalized.bare_title.clone();

    let final_name = lookup
        .map(|record| record.canonical_title.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| bare_title.clone());

    let final_artwork = lookup
        .map(|record| record.artwork_url.as_str())
        .filter(|url| !url.is_empty())
        .unwrap_or(existing.logo.as_str())
        .to_string();

    let final_category = merge_category(&existing.group, lookup.map(|r| r.category.as_str()));

    let year = lookup
        .and_then(|record| record.release_year.as_deref())
        .filter(|year| !year.is_empty())
        .or(normalized.year.as_deref())
        .unwrap_or_default()
        .to_string();

    let display_title = if year.is_empty() {
        bare_title.clone()
    } else {
        format!("{} ({})", bare_title, year)
    };

    EnrichedEntry {
        position: raw.position,
        original_descriptor: raw.descriptor.clone(),
        duration: raw.duration.clone(),
        extra_attributes: existing.extra.clone(),
        base_title: base_title(&bare_title),
        year_number: year_number(&year),
        year,
        display_title,
        bare_title,
        final_name,
        final_id: existing.id.clone(),
        final_artwork,
        final_category,
        reference: raw.reference.clone(),
    }
}

/// True for an empty or `undefined` category (case-insensitive).
pub fn is_placeholder_category(category: &str) -> bool {
    category.is_empty() || category.eq_ignore_ascii_case(PLACEHOLDER_CATEGORY)
}

fn merge_category(existing: &str, looked_up: Option<&str>) -> String {
    match looked_up.map(str::trim) {
        Some(category) if is_placeholder_category(existing) && !category.is_empty() => {
            category.to_string()
        }
        _ => existing.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DescriptorAttributes;
    use crate::title::normalize;

    fn raw_entry(title: &str, attributes: DescriptorAttributes) -> RawEntry {
        RawEntry {
            position: 3,
            descriptor: format!("#EXTINF:-1,{}", title),
            duration: "-1".to_string(),
            attributes,
            raw_title: title.to_string(),
            reference: "http://host/movie.mp4".to_string(),
        }
    }

    fn record() -> MetadataRecord {
        MetadataRecord {
            canonical_id: "269149".to_string(),
            canonical_title: "Zootopia".to_string(),
            category: "Animación".to_string(),
            artwork_url: "https://image.tmdb.org/t/p/w500/poster.jpg".to_string(),
            release_year: Some("2016".to_string()),
        }
    }

    #[test]
    fn test_merge_with_lookup() {
        let raw = raw_entry(
            "Zootopia",
            DescriptorAttributes {
                id: "keep-me".to_string(),
                group: "undefined".to_string(),
                ..Default::default()
            },
        );
        let entry = merge(&raw, &normalize(&raw.raw_title), Some(&record()));

        assert_eq!(entry.final_name, "Zootopia");
        assert_eq!(entry.final_id, "keep-me");
        assert_eq!(entry.final_artwork, "https://image.tmdb.org/t/p/w500/poster.jpg");
        assert_eq!(entry.final_category, "Animación");
        assert_eq!(entry.year, "2016");
        assert_eq!(entry.year_number, 2016);
        assert_eq!(entry.display_title, "Zootopia (2016)");
        assert_eq!(entry.reference, "http://host/movie.mp4");
        assert_eq!(entry.position, 3);
    }

    #[test]
    fn test_merge_without_lookup_keeps_existing() {
        let raw = raw_entry(
            "Toy Story 3 2010",
            DescriptorAttributes {
                logo: "old.png".to_string(),
                group: "Kids".to_string(),
                ..Default::default()
            },
        );
        let entry = merge(&raw, &normalize(&raw.raw_title), None);

        assert_eq!(entry.final_name, "Toy Story 3");
        assert_eq!(entry.final_artwork, "old.png");
        assert_eq!(entry.final_category, "Kids");
        assert_eq!(entry.year, "2010");
        assert_eq!(entry.display_title, "Toy Story 3 (2010)");
        assert_eq!(entry.base_title, "Toy Story");
    }

    #[test]
    fn test_real_category_is_never_overwritten() {
        let raw = raw_entry(
            "Zootopia",
            DescriptorAttributes {
                group: "Family".to_string(),
                ..Default::default()
            },
        );
        let entry = merge(&raw, &normalize(&raw.raw_title), Some(&record()));
        assert_eq!(entry.final_category, "Family");
    }

    #[test]
    fn test_placeholder_category_is_case_insensitive() {
        assert!(is_placeholder_category(""));
        assert!(is_placeholder_category("UNDEFINED"));
        assert!(is_placeholder_category("Undefined"));
        assert!(!is_placeholder_category("Drama"));
        assert!(!is_placeholder_category(" undefined "));
        assert!(!is_placeholder_category(" "));
    }

    #[test]
    fn test_empty_lookup_fields_fall_back() {
        let raw = raw_entry(
            "Obscure 1971",
            DescriptorAttributes {
                logo: "old.png".to_string(),
                group: "UNDEFINED".to_string(),
                ..Default::default()
            },
        );
        let empty = MetadataRecord {
            canonical_id: "1".to_string(),
            ..Default::default()
        };
        let entry = merge(&raw, &normalize(&raw.raw_title), Some(&empty));

        assert_eq!(entry.final_name, "Obscure");
        assert_eq!(entry.final_artwork, "old.png");
        assert_eq!(entry.final_category, "UNDEFINED");
        assert_eq!(entry.year, "1971");
    }

    #[test]
    fn test_no_year_anywhere() {
        let raw = raw_entry("Up", DescriptorAttributes::default());
        let entry = merge(&raw, &normalize(&raw.raw_title), None);
        assert_eq!(entry.year, "");
        assert_eq!(entry.year_number, 0);
        assert_eq!(entry.display_title, "Up");
    }
}
