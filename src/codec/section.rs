//! Splitting a page body into heading-addressable sections.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::properties::Section;

/// Opening or closing line of a fenced code block.
static RE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:```|~~~)").expect("fence pattern is valid"));

/// Heading line: one to six '#', whitespace, then the heading text.
static RE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.+)").expect("heading pattern is valid"));

struct OpenSection {
    id: String,
    heading: String,
    /// Byte offset of the first body line.
    body_start: usize,
}

fn close(open: OpenSection, body: &str) -> Section {
    let body = body.trim().to_string();
    let search_text = format!("{} {}", open.heading, body).to_lowercase();
    Section {
        id: open.id,
        heading: open.heading,
        body,
        search_text,
    }
}

/// Scan page content line by line and extract its sections.
///
/// A fence flag toggles on lines opening or closing a fenced code block so
/// headings inside code are ignored. Six per-level counters produce the
/// positional section ids: a heading of level `L` increments counter `L` and
/// zeroes all deeper counters; the id is the underscore-joined sequence of
/// non-zero counters up to `L`. The section body runs from the line after the
/// heading to the next unfenced heading or end of content.
pub fn extract_sections(content: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    if content.is_empty() {
        return sections;
    }

    let mut counters = [0u32; 6];
    let mut in_fence = false;
    let mut offset = 0usize;
    let mut open: Option<OpenSection> = None;

    for raw in content.split_inclusive('\n') {
        let line = raw.trim_end_matches('\n').trim_end_matches('\r');
        if RE_FENCE.is_match(line) {
            in_fence = !in_fence;
        }
        if !in_fence {
            if let Some(caps) = RE_HEADING.captures(line) {
                if let Some(prev) = open.take() {
                    let body = &content[prev.body_start..offset];
                    sections.push(close(prev, body));
                }
                let level = caps[1].len();
                counters[level - 1] += 1;
                for deeper in counters[level..].iter_mut() {
                    *deeper = 0;
                }
                let id = counters[..level]
                    .iter()
                    .filter(|c| **c > 0)
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join("_");
                open = Some(OpenSection {
                    id,
                    heading: caps[2].trim().to_string(),
                    body_start: offset + raw.len(),
                });
            }
        }
        offset += raw.len();
    }

    if let Some(prev) = open.take() {
        let body = &content[prev.body_start..];
        sections.push(close(prev, body));
    }
    sections
}
