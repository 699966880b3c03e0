//! Ranked multi-field search over the finished graph.
//!
//! Queries are tokenized, candidates are gated by a cheap substring test over
//! each page's combined lowercase search text, and survivors are scored with
//! fixed field weights. Sections are scored independently so results can deep
//! link into the matching region of a page. No state is retained between
//! calls; every invocation re-scans the candidate set, which is bounded by
//! bundle size rather than query complexity.

use regex::{escape as re_escape, Regex};
use serde::{Deserialize, Serialize};

use crate::{
    graph::{collation_key, DocumentGraph},
    properties::PageIdx,
};

const W_TITLE: u32 = 5;
const W_TAG: u32 = 3;
const W_BODY: u32 = 1;
const W_SECTION_TITLE: u32 = 3;
const W_SECTION_BODY: u32 = 1;
const W_PHRASE_TITLE: u32 = 5;
const W_PHRASE_BODY: u32 = 2;
const W_SECTION_PHRASE: u32 = 1;
/// Cap on the per-page bonus for breadth of matching sections, so page length
/// never dominates the ranking.
const SECTION_COUNT_CAP: u32 = 4;

/// One matching section of a result page, by position in
/// [`Page::sections`](crate::properties::Page::sections).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMatch {
    pub section: usize,
    pub score: u32,
}

/// A ranked search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub page: PageIdx,
    pub score: u32,
    /// Matching sections, sorted by their own score descending.
    pub sections: Vec<SectionMatch>,
}

/// Lowercase, split on whitespace, drop tokens shorter than two characters.
pub(crate) fn tokenize(query: &str) -> Vec<String> {
    query
        .trim()
        .to_lowercase()
        .split_whitespace()
        .filter(|t| t.chars().count() >= 2)
        .map(String::from)
        .collect()
}

fn matches_all_tokens(text: &str, tokens: &[String]) -> bool {
    tokens.iter().all(|t| text.contains(t.as_str()))
}

/// One combined pattern matching any token as a whole word. Tokens are
/// escaped; strings are lowercased by the caller, so no case-insensitive
/// flag is needed.
fn combined_regex(tokens: &[String]) -> Regex {
    let pattern = tokens
        .iter()
        .map(|t| format!(r"\b{}\b", re_escape(t)))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&pattern).expect("escaped tokens always form a valid pattern")
}

impl DocumentGraph {
    /// Rank pages and their sections by weighted relevance to `query`.
    ///
    /// A page is a candidate only if its combined search text contains every
    /// token as a substring. Word-boundary matches score title, tags and body
    /// independently; multi-token queries additionally score the whole query
    /// as a phrase (title takes precedence over body). Ties are broken by
    /// accent- and case-insensitive title order, so ranking is deterministic.
    ///
    /// A query with no usable tokens yields an empty result; the caller falls
    /// back to showing the full tree.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return Vec::new();
        }
        let phrase = (tokens.len() > 1).then(|| query.trim().to_lowercase());
        let word_re = combined_regex(&tokens);

        let mut hits = Vec::new();
        for (idx, page) in self.pages() {
            if !matches_all_tokens(&page.search_text, &tokens) {
                continue;
            }

            let mut score = 0;
            if word_re.is_match(&page.title_lc) {
                score += W_TITLE;
            }
            if word_re.is_match(&page.tags_lc) {
                score += W_TAG;
            }
            if word_re.is_match(&page.body_lc) {
                score += W_BODY;
            }
            if let Some(phrase) = &phrase {
                if page.title_lc.contains(phrase.as_str()) {
                    score += W_PHRASE_TITLE;
                } else if page.body_lc.contains(phrase.as_str()) {
                    score += W_PHRASE_BODY;
                }
            }

            let mut sections = Vec::new();
            for (position, section) in page.sections.iter().enumerate() {
                if !matches_all_tokens(&section.search_text, &tokens) {
                    continue;
                }
                let heading_lc = section.heading.to_lowercase();
                let body_lc = section.body.to_lowercase();
                let mut section_score = 0;
                if word_re.is_match(&heading_lc) {
                    section_score += W_SECTION_TITLE;
                }
                if word_re.is_match(&body_lc) {
                    section_score += W_SECTION_BODY;
                }
                if let Some(phrase) = &phrase {
                    if heading_lc.contains(phrase.as_str()) || body_lc.contains(phrase.as_str()) {
                        section_score += W_SECTION_PHRASE;
                    }
                }
                sections.push(SectionMatch {
                    section: position,
                    score: section_score,
                });
            }
            // Stable sort keeps document order among equally scored sections.
            sections.sort_by(|a, b| b.score.cmp(&a.score));
            score += SECTION_COUNT_CAP.min(sections.len() as u32);

            hits.push(SearchHit {
                page: idx,
                score,
                sections,
            });
        }

        hits.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| self.sort_by_title(a.page, b.page))
        });
        hits
    }
}
