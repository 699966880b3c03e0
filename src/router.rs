//! Path-based addressing over the document graph.
//!
//! Addresses are URL fragments of the form `#seg1#seg2#...#anchor`: an
//! ordered root-to-page sequence of page ids, with any trailing unmatched
//! segment treated as an in-page anchor (commonly a section id). Resolution is
//! deliberately tolerant: a fragment never fails to resolve, it degrades to
//! the deepest matching page and ultimately to an anchor on root. Degraded
//! routes are reported on the `tracing` warn channel so link rot stays
//! observable in development.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{graph::DocumentGraph, properties::PageIdx};

/// A resolved address: the deepest matching page plus any in-page anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTarget {
    pub page: PageIdx,
    pub anchor: String,
    /// True when no segment resolved past root and the whole remaining path
    /// was treated as an anchor on root.
    pub fallback: bool,
}

/// Receiver for the single effectful routing operation, implemented by the
/// navigation UI collaborator (in a browser, the address fragment).
pub trait Navigator {
    fn set_fragment(&mut self, fragment: &str);
}

impl DocumentGraph {
    /// Precomputed root-relative hash path; empty for root.
    pub fn hash_of(&self, idx: PageIdx) -> &str {
        &self.page(idx).hash
    }

    /// Walk from root, matching each segment against the current node's
    /// children by id. Stops at the deepest node for which a match exists;
    /// trailing unmatched segments are tolerated, not an error.
    pub fn find<S: AsRef<str>>(&self, segments: &[S]) -> PageIdx {
        let mut node = self.root();
        'segments: for segment in segments {
            for &child in &self.page(node).children {
                if self.page(child).id == segment.as_ref() {
                    node = child;
                    continue 'segments;
                }
            }
            break;
        }
        node
    }

    /// Normalize a bare hash fragment or an absolute link into a
    /// [`RouteTarget`].
    ///
    /// An empty fragment resolves to root with no anchor. Otherwise the
    /// fragment is split into segments, the deepest matching page is resolved
    /// via [`DocumentGraph::find`], and segments beyond that page's own hash
    /// path become the anchor. If nothing resolves past root, the entire
    /// remaining path is an anchor on root rather than a dead link.
    pub fn parse_target(&self, hash_or_href: &str) -> RouteTarget {
        let fragment = normalize_fragment(hash_or_href);
        if fragment.is_empty() {
            return RouteTarget {
                page: self.root(),
                anchor: String::new(),
                fallback: false,
            };
        }

        let segments: Vec<&str> = fragment.split('#').filter(|s| !s.is_empty()).collect();
        let page = self.find(&segments);
        let base = self.hash_of(page);
        let matched = if base.is_empty() {
            0
        } else {
            base.split('#').count()
        };

        if !segments.is_empty() && matched == 0 {
            tracing::warn!(
                fragment = %fragment,
                "no segment resolved past root; treating path as an anchor on root"
            );
            return RouteTarget {
                page: self.root(),
                anchor: segments.join("#"),
                fallback: true,
            };
        }

        RouteTarget {
            page,
            anchor: segments[matched..].join("#"),
            fallback: false,
        }
    }

    /// Update the address fragment to point at `idx` — the sole effectful
    /// operation of the router.
    pub fn nav(&self, idx: PageIdx, navigator: &mut impl Navigator) {
        navigator.set_fragment(&format!("#{}", self.hash_of(idx)));
    }

    /// Build an absolute deep link for a page plus optional in-page anchor.
    pub fn build_deep_url(&self, base_url: &str, idx: PageIdx, anchor: &str) -> String {
        let page_hash = self.hash_of(idx);
        let mut out = format!("{base_url}#{page_hash}");
        if !anchor.is_empty() {
            if !page_hash.is_empty() {
                out.push('#');
            }
            out.push_str(anchor);
        }
        out
    }
}

/// Extract the fragment body from either a bare `#...` hash or a full href.
fn normalize_fragment(hash_or_href: &str) -> String {
    if let Some(fragment) = hash_or_href.strip_prefix('#') {
        return fragment.to_string();
    }
    if let Ok(url) = Url::parse(hash_or_href) {
        return url.fragment().unwrap_or("").to_string();
    }
    // Relative href without a base: everything after the first '#'.
    hash_or_href
        .split_once('#')
        .map(|(_, fragment)| fragment.to_string())
        .unwrap_or_default()
}
