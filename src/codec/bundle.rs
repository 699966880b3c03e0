//! Splitting raw bundle text into ordered page records.
//!
//! Wire format: a sequence of `<!--key:"value" key2:"value2"-->` header
//! blocks, each owning the body text up to the next header or end of input.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{codec::ParseDiagnostic, error::KmError, properties::RawPage};

/// A metadata header block. Bodies are carved out of the gaps between
/// consecutive header matches, which keeps the scan non-greedy without
/// needing lookahead.
static RE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--(.*?)-->").expect("header pattern is valid"));

/// One `key:"value"` pair inside a header block.
static RE_META: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(\w+):"([^"]+)""#).expect("metadata pattern is valid"));

fn parse_tags(csv: &str) -> BTreeSet<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Split raw bundle text into ordered `RawPage` records.
///
/// Recognized metadata keys are `id`, `title`, `parent` and `tags`
/// (comma-separated); unknown keys pass through into [`RawPage::extra`]
/// unvalidated. Blocks without an `id` are skipped with a diagnostic.
///
/// Zero parsed pages is the single fatal condition of the whole core and
/// returns [`KmError::EmptyBundle`].
pub fn parse_bundle(text: &str) -> Result<(Vec<RawPage>, Vec<ParseDiagnostic>), KmError> {
    let mut records = Vec::new();
    let mut diagnostics = Vec::new();

    let headers: Vec<regex::Captures<'_>> = RE_HEADER.captures_iter(text).collect();
    for (block, caps) in headers.iter().enumerate() {
        let whole = caps.get(0).expect("capture group 0 always participates");
        let header = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let body_end = headers
            .get(block + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());

        let mut record = RawPage {
            content: text[whole.end()..body_end].trim().to_string(),
            ..RawPage::default()
        };
        for kv in RE_META.captures_iter(header) {
            let value = kv[2].trim().to_string();
            match &kv[1] {
                "id" => record.id = value,
                "title" => record.title = Some(value),
                "parent" => record.parent = Some(value),
                "tags" => record.tags = parse_tags(&value),
                key => {
                    record.extra.insert(key.to_string(), value);
                }
            }
        }

        if record.id.is_empty() {
            tracing::warn!(block, "metadata block has no id; skipping");
            diagnostics.push(ParseDiagnostic::warning(format!(
                "metadata block {block} has no id; skipped"
            )));
            continue;
        }
        records.push(record);
    }

    if records.is_empty() {
        return Err(KmError::EmptyBundle);
    }
    tracing::debug!(pages = records.len(), "parsed bundle records");
    Ok((records, diagnostics))
}
