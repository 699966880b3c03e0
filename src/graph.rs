//! Linking flat page records into a rooted, fully reachable document graph.
//!
//! Construction is a two-phase pure transform over an arena of pages. The link
//! phase resolves parent references by id and cuts any parent cycle the wire
//! format can express; the promotion phase re-parents one representative of
//! each disconnected cluster under root. The finished [`DocumentGraph`] is
//! immutable: a new bundle discards it wholesale and builds a fresh one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::{
    codec::{extract_sections, parse_bundle, ParseDiagnostic},
    error::KmError,
    properties::{Page, PageIdx, RawPage},
};

/// Id of the page treated as graph root when present; otherwise the first
/// parsed page becomes root.
pub const ROOT_ID: &str = "home";

/// Result of a parse: the immutable graph plus everything noteworthy that
/// happened while building it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedGraph {
    pub graph: DocumentGraph,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// An owned, fully linked page graph.
///
/// Replaces the module-scoped page list / id lookup / root triple of the
/// original design with an explicit value, so tests and previews can hold
/// multiple independent graphs without cross-contamination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentGraph {
    pages: Vec<Page>,
    by_id: BTreeMap<String, PageIdx>,
    root: PageIdx,
}

impl DocumentGraph {
    /// Parse a bundle and build the graph in one pass.
    ///
    /// The only failure is [`KmError::EmptyBundle`]; every downstream anomaly
    /// is absorbed and reported in [`ParsedGraph::diagnostics`].
    pub fn parse(text: &str) -> Result<ParsedGraph, KmError> {
        let (records, mut diagnostics) = parse_bundle(text)?;
        let graph = build_graph(records, &mut diagnostics);
        Ok(ParsedGraph { graph, diagnostics })
    }

    pub fn root(&self) -> PageIdx {
        self.root
    }

    pub fn page(&self, idx: PageIdx) -> &Page {
        &self.pages[idx.0]
    }

    pub fn page_by_id(&self, id: &str) -> Option<PageIdx> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// All pages in document order.
    pub fn pages(&self) -> impl Iterator<Item = (PageIdx, &Page)> {
        self.pages
            .iter()
            .enumerate()
            .map(|(idx, page)| (PageIdx(idx), page))
    }

    /// Parent chain from `idx` (exclusive) up to root (inclusive). Finite by
    /// construction.
    pub fn ancestors(&self, idx: PageIdx) -> impl Iterator<Item = PageIdx> + '_ {
        std::iter::successors(self.page(idx).parent, move |cur| self.page(*cur).parent)
    }

    /// Recursive count of pages below `idx`.
    pub fn descendant_count(&self, idx: PageIdx) -> usize {
        let mut count = 0;
        let mut stack = vec![idx];
        while let Some(cur) = stack.pop() {
            for child in &self.page(cur).children {
                count += 1;
                stack.push(*child);
            }
        }
        count
    }

    /// Deterministic title ordering: accent- and case-insensitive, the tie
    /// break used by ranked search results and sidebar listings.
    pub fn sort_by_title(&self, a: PageIdx, b: PageIdx) -> std::cmp::Ordering {
        collation_key(&self.page(a).title).cmp(&collation_key(&self.page(b).title))
    }

    #[cfg(test)]
    pub(crate) fn arena_mut(&mut self) -> (&mut Vec<Page>, PageIdx) {
        (&mut self.pages, self.root)
    }
}

/// Collation key approximating a base-sensitivity collator: NFKD decompose,
/// strip combining marks, lowercase.
pub(crate) fn collation_key(s: &str) -> String {
    s.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn new_page(raw: RawPage) -> Page {
    let RawPage {
        id,
        title,
        parent: _,
        tags,
        content,
        extra,
    } = raw;
    let title = title.unwrap_or_else(|| id.clone());
    let sections = extract_sections(&content);

    let title_lc = title.to_lowercase();
    let tags_lc = tags
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let body_lc = content.to_lowercase();
    let search_text = format!("{title_lc} {tags_lc} {body_lc}");

    Page {
        id,
        title,
        parent: None,
        children: Vec::new(),
        tags,
        content,
        sections,
        hash: String::new(),
        cluster: None,
        extra,
        title_lc,
        tags_lc,
        body_lc,
        search_text,
    }
}

fn build_graph(records: Vec<RawPage>, diagnostics: &mut Vec<ParseDiagnostic>) -> DocumentGraph {
    // Last-write-wins id dedup, keeping each page at its first-occurrence
    // position in document order.
    let mut order: Vec<String> = Vec::new();
    let mut latest: BTreeMap<String, RawPage> = BTreeMap::new();
    for record in records {
        if latest.contains_key(&record.id) {
            tracing::warn!(id = %record.id, "duplicate page id; later block replaces earlier");
            diagnostics.push(ParseDiagnostic::DuplicateId {
                id: record.id.clone(),
            });
        } else {
            order.push(record.id.clone());
        }
        latest.insert(record.id.clone(), record);
    }

    // Arena allocation in document order, parent refs kept aside for linking.
    let mut pages: Vec<Page> = Vec::with_capacity(order.len());
    let mut parent_refs: Vec<Option<String>> = Vec::with_capacity(order.len());
    let mut by_id: BTreeMap<String, PageIdx> = BTreeMap::new();
    for id in &order {
        let raw = latest.remove(id).expect("every ordered id has a record");
        by_id.insert(raw.id.clone(), PageIdx(pages.len()));
        parent_refs.push(raw.parent.clone());
        pages.push(new_page(raw));
    }
    let root = by_id.get(ROOT_ID).copied().unwrap_or(PageIdx(0));

    link_parents(&mut pages, &parent_refs, &by_id, root, diagnostics);
    cut_cycles(&mut pages, diagnostics);
    attach_secondary_homes(&mut pages, root, diagnostics);
    compute_hashes(&mut pages);

    tracing::debug!(
        pages = pages.len(),
        root = %pages[root.0].id,
        "document graph built"
    );
    DocumentGraph { pages, by_id, root }
}

/// Resolve parent references by id. Root never takes a parent; unknown
/// parents leave the page orphaned for the promotion phase; a page naming
/// itself is treated the same way.
fn link_parents(
    pages: &mut [Page],
    parent_refs: &[Option<String>],
    by_id: &BTreeMap<String, PageIdx>,
    root: PageIdx,
    diagnostics: &mut Vec<ParseDiagnostic>,
) {
    for idx in 0..pages.len() {
        if idx == root.0 {
            continue;
        }
        let Some(parent_ref) = parent_refs[idx].as_deref() else {
            continue;
        };
        match by_id.get(parent_ref.trim()).copied() {
            Some(parent) if parent.0 != idx => {
                pages[idx].parent = Some(parent);
                pages[parent.0].children.push(PageIdx(idx));
            }
            Some(_) => {
                tracing::warn!(id = %pages[idx].id, "page declares itself as parent; orphaned");
                diagnostics.push(ParseDiagnostic::warning(format!(
                    "page '{}' declares itself as parent; treated as orphan",
                    pages[idx].id
                )));
            }
            None => {}
        }
    }
}

/// Detect parent cycles with a three-color chain walk and cut each one at the
/// page where the loop closes. Acyclicity is an invariant from here on.
fn cut_cycles(pages: &mut [Page], diagnostics: &mut Vec<ParseDiagnostic>) {
    const FRESH: u8 = 0;
    const ON_CHAIN: u8 = 1;
    const DONE: u8 = 2;

    let mut state = vec![FRESH; pages.len()];
    for start in 0..pages.len() {
        if state[start] != FRESH {
            continue;
        }
        let mut chain = vec![start];
        state[start] = ON_CHAIN;
        while let Some(next) = pages[*chain.last().expect("chain is non-empty")].parent {
            match state[next.0] {
                FRESH => {
                    state[next.0] = ON_CHAIN;
                    chain.push(next.0);
                }
                ON_CHAIN => {
                    // The edge we are standing on closes a loop.
                    let at = *chain.last().expect("chain is non-empty");
                    let id = pages[at].id.clone();
                    detach(pages, at);
                    tracing::warn!(id = %id, "parent chain forms a cycle; detaching page");
                    diagnostics.push(ParseDiagnostic::CycleCut { id });
                    break;
                }
                _ => break,
            }
        }
        for idx in chain {
            state[idx] = DONE;
        }
    }
}

fn detach(pages: &mut [Page], idx: usize) {
    if let Some(parent) = pages[idx].parent.take() {
        pages[parent.0].children.retain(|c| c.0 != idx);
    }
}

/// Guarantee every page is reachable from root.
///
/// Pages are grouped by topmost ancestor; every group whose top is not root
/// is an orphan cluster. The member with the largest subtree (memoized counts,
/// taken before any mutation) is re-parented under root and flagged with a
/// sequential cluster id; the rest of the cluster keeps its authored
/// structure beneath it. Idempotent, and no page is ever dropped: worst case
/// a page becomes a one-member promoted cluster.
pub(crate) fn attach_secondary_homes(
    pages: &mut [Page],
    root: PageIdx,
    diagnostics: &mut Vec<ParseDiagnostic>,
) {
    let counts = descendant_counts(pages);

    fn top_of(pages: &[Page], mut idx: usize) -> usize {
        while let Some(parent) = pages[idx].parent {
            idx = parent.0;
        }
        idx
    }

    // First-encounter order keeps cluster ids deterministic.
    let mut cluster_order: Vec<usize> = Vec::new();
    let mut clusters: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for idx in 0..pages.len() {
        let top = top_of(pages, idx);
        if top == root.0 {
            continue;
        }
        if !clusters.contains_key(&top) {
            cluster_order.push(top);
        }
        clusters.entry(top).or_default().push(idx);
    }

    let mut next_cluster = 0u32;
    for top in cluster_order {
        let members = &clusters[&top];
        let rep = *members
            .iter()
            .reduce(|best, candidate| {
                if counts[*candidate] > counts[*best] {
                    candidate
                } else {
                    best
                }
            })
            .expect("clusters are non-empty");
        if pages[rep].parent.is_none() {
            pages[rep].parent = Some(root);
            pages[rep].cluster = Some(next_cluster);
            pages[root.0].children.push(PageIdx(rep));
            diagnostics.push(ParseDiagnostic::ClusterPromoted {
                id: pages[rep].id.clone(),
                cluster: next_cluster,
                members: members.len(),
            });
            next_cluster += 1;
        }
    }
}

/// Subtree size per page. Runs before promotion mutates anything; terminates
/// because [`cut_cycles`] already restored acyclicity.
fn descendant_counts(pages: &[Page]) -> Vec<usize> {
    fn walk(pages: &[Page], memo: &mut [Option<usize>], idx: usize) -> usize {
        if let Some(count) = memo[idx] {
            return count;
        }
        let count = pages[idx]
            .children
            .iter()
            .map(|child| 1 + walk(pages, memo, child.0))
            .sum();
        memo[idx] = Some(count);
        count
    }
    let mut memo = vec![None; pages.len()];
    (0..pages.len())
        .map(|idx| walk(pages, &mut memo, idx))
        .collect()
}

/// Precompute every page's root-relative hash path: ancestor ids from
/// (excluding) root down to (including) the page, `#`-joined. Empty for root.
pub(crate) fn compute_hashes(pages: &mut [Page]) {
    for idx in 0..pages.len() {
        let mut segments = Vec::new();
        let mut cursor = idx;
        while let Some(parent) = pages[cursor].parent {
            segments.push(pages[cursor].id.clone());
            cursor = parent.0;
        }
        segments.reverse();
        pages[idx].hash = segments.join("#");
    }
}
