//! Title font sizing.

use regex::RegexBuilder;

use crate::document::Document;
use crate::index::TextRange;
use crate::requests::EditOperation;

/// Font size in points for a title of this length.
pub fn title_font_size(title: &str) -> f64 {
    match title.trim().chars().count() {
        0..=20 => 18.0,
        21..=40 => 16.0,
        _ => 14.0,
    }
}

/// Range of the first text run whose trimmed content equals `title`,
/// ignoring case.
pub fn find_title_run(document: &Document, title: &str) -> Option<TextRange> {
    let title = title.trim();
    if title.is_empty() {
        return None;
    }

    let pattern = format!(r"^\s*{}\s*$", regex::escape(title));
    let re = RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()?;

    let mut found = None;
    document.for_each_text_run(|element, run| {
        if found.is_none() && re.is_match(&run.content) {
            found = Some(TextRange::new(element.start_index, element.end_index));
        }
    });
    found
}

/// Font-size request for the title run, or `None` when no run matches.
pub fn title_requests(document: &Document, title: &str) -> Option<EditOperation> {
    find_title_run(document, title)
        .map(|range| EditOperation::font_size(range, title_font_size(title)))
}
