//! Placeholder discovery over a document's content tree.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::document::Document;
use crate::index::{utf16_len, utf16_offset, TextRange};

static ANY_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("placeholder pattern is valid"));

/// The literal token for a placeholder name: `{{name}}`.
pub fn placeholder_token(name: &str) -> String {
    format!("{{{{{}}}}}", name)
}

/// Occurrence ranges of each named placeholder, covering the full
/// `{{name}}` token. Every requested name is present in the result; names
/// that do not occur map to an empty list.
pub fn locate(document: &Document, names: &[&str]) -> BTreeMap<String, Vec<TextRange>> {
    let tokens: Vec<(String, String)> = names
        .iter()
        .map(|name| (name.to_string(), placeholder_token(name)))
        .collect();

    let mut found: BTreeMap<String, Vec<TextRange>> = tokens
        .iter()
        .map(|(name, _)| (name.clone(), Vec::new()))
        .collect();

    document.for_each_text_run(|element, run| {
        for (name, token) in &tokens {
            let token_len = utf16_len(token);
            for (byte_idx, _) in run.content.match_indices(token.as_str()) {
                let start = element.start_index + utf16_offset(&run.content, byte_idx);
                if let Some(ranges) = found.get_mut(name) {
                    ranges.push(TextRange::new(start, start + token_len));
                }
            }
        }
    });

    found
}

/// Every `{{...}}` token in the document, keyed by the name inside the braces.
pub fn locate_any(document: &Document) -> BTreeMap<String, Vec<TextRange>> {
    let mut found: BTreeMap<String, Vec<TextRange>> = BTreeMap::new();

    document.for_each_text_run(|element, run| {
        for caps in ANY_PLACEHOLDER.captures_iter(&run.content) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let start = element.start_index + utf16_offset(&run.content, whole.start());
            let end = start + utf16_len(whole.as_str());
            found
                .entry(name.as_str().to_string())
                .or_default()
                .push(TextRange::new(start, end));
        }
    });

    found
}

/// First occurrence of `{{name}}` in document order.
pub fn locate_first(document: &Document, name: &str) -> Option<TextRange> {
    locate(document, &[name])
        .remove(name)
        .and_then(|ranges| ranges.into_iter().next())
}
