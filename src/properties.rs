//! Data model for the page graph: raw bundle records, linked pages, and
//! heading sections.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Arena index of a page within its [`DocumentGraph`](crate::graph::DocumentGraph).
///
/// Parent and child references are stored as indices assigned at discovery
/// time, so acyclic structure is checked once at construction instead of being
/// assumed on every traversal.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PageIdx(pub(crate) usize);

impl PageIdx {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A page record as parsed straight out of the bundle text, before linking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPage {
    pub id: String,
    pub title: Option<String>,
    /// Id of the intended parent page. Invalid or absent means the page starts
    /// out orphaned and is re-attached during cluster promotion.
    pub parent: Option<String>,
    pub tags: BTreeSet<String>,
    pub content: String,
    /// Unrecognized metadata keys, preserved verbatim for forward
    /// compatibility.
    pub extra: BTreeMap<String, String>,
}

/// A heading-delimited, independently addressable region of a page body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Deterministic positional anchor id: the underscore-joined sequence of
    /// non-zero heading counters, e.g. `"3_2_1"`. Ids shift when headings are
    /// inserted or removed; that is an accepted tradeoff of being independent
    /// of heading text.
    pub id: String,
    pub heading: String,
    /// Text between this heading and the next unfenced heading (or end of
    /// page), trimmed.
    pub body: String,
    /// Lowercased `heading body`, precomputed for the search gate.
    pub search_text: String,
}

/// A node in the content hierarchy: one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    /// Falls back to the page id when the bundle omits a title.
    pub title: String,
    /// None only for the graph root.
    pub parent: Option<PageIdx>,
    /// Ordered; document order for authored children, promotion order for
    /// promoted cluster representatives.
    pub children: Vec<PageIdx>,
    pub tags: BTreeSet<String>,
    /// Raw body text; turning it into displayed markup belongs to the
    /// external renderer.
    pub content: String,
    pub sections: Vec<Section>,
    /// Precomputed `#`-joined ancestor ids from (excluding) root down to this
    /// page; empty for root.
    pub hash: String,
    /// Set only on promoted cluster representatives: the sequential id of the
    /// disconnected cluster this page was re-parented for.
    pub cluster: Option<u32>,
    pub extra: BTreeMap<String, String>,

    // Derived lowercase fields, computed once at build time so query
    // filtering never re-lowercases page bodies.
    pub(crate) title_lc: String,
    pub(crate) tags_lc: String,
    pub(crate) body_lc: String,
    pub(crate) search_text: String,
}

impl Page {
    /// Whether this page is a promoted representative of an orphan cluster.
    pub fn is_secondary(&self) -> bool {
        self.cluster.is_some()
    }

    /// Combined lowercase title + tags + body.
    pub fn search_text(&self) -> &str {
        &self.search_text
    }
}
