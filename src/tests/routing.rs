//! Tests for hash-path resolution and navigation.

use test_log::test;

use super::helpers::*;
use crate::router::{Navigator, RouteTarget};

#[derive(Default)]
struct TestNavigator {
    fragments: Vec<String>,
}

impl Navigator for TestNavigator {
    fn set_fragment(&mut self, fragment: &str) {
        self.fragments.push(fragment.to_string());
    }
}

#[test]
fn test_hash_of_is_root_relative() {
    let parsed = sample_graph();
    let graph = &parsed.graph;
    assert_eq!(graph.hash_of(graph.root()), "");
    assert_eq!(graph.hash_of(graph.page_by_id("guide").unwrap()), "guide");
    assert_eq!(graph.hash_of(graph.page_by_id("api").unwrap()), "guide#api");
    // Promoted cluster representatives hang directly off root.
    assert_eq!(
        graph.hash_of(graph.page_by_id("lost_child").unwrap()),
        "lost#lost_child"
    );
}

#[test]
fn test_find_walks_children_by_id() {
    let parsed = sample_graph();
    let graph = &parsed.graph;
    let api = graph.page_by_id("api").unwrap();
    assert_eq!(graph.find(&["guide", "api"]), api);
    assert_eq!(graph.find::<&str>(&[]), graph.root());
}

#[test]
fn test_find_tolerates_trailing_unmatched_segments() {
    let parsed = sample_graph();
    let graph = &parsed.graph;
    let guide = graph.page_by_id("guide").unwrap();
    assert_eq!(graph.find(&["guide", "1_1", "whatever"]), guide);
    assert_eq!(graph.find(&["nope"]), graph.root());
}

#[test]
fn test_parse_target_page_and_anchor() {
    let parsed = sample_graph();
    let graph = &parsed.graph;
    let guide = graph.page_by_id("guide").unwrap();
    let api = graph.page_by_id("api").unwrap();

    assert_eq!(
        graph.parse_target("#guide#api"),
        RouteTarget {
            page: api,
            anchor: String::new(),
            fallback: false,
        }
    );
    assert_eq!(
        graph.parse_target("#guide#1_1"),
        RouteTarget {
            page: guide,
            anchor: "1_1".to_string(),
            fallback: false,
        }
    );
}

#[test]
fn test_parse_target_empty_hash_is_root() {
    let parsed = sample_graph();
    let graph = &parsed.graph;
    for href in ["", "#"] {
        let target = graph.parse_target(href);
        assert_eq!(target.page, graph.root());
        assert_eq!(target.anchor, "");
        assert!(!target.fallback);
    }
}

#[test]
fn test_parse_target_never_dead_links() {
    let parsed = sample_graph();
    let graph = &parsed.graph;
    let target = graph.parse_target("#doesnotexist");
    assert_eq!(target.page, graph.root());
    assert_eq!(target.anchor, "doesnotexist");
    assert!(target.fallback);

    // Multi-segment misses keep the whole remainder as the anchor.
    let target = graph.parse_target("#no#such#path");
    assert_eq!(target.page, graph.root());
    assert_eq!(target.anchor, "no#such#path");
    assert!(target.fallback);
}

#[test]
fn test_parse_target_accepts_absolute_hrefs() {
    let parsed = sample_graph();
    let graph = &parsed.graph;
    let api = graph.page_by_id("api").unwrap();
    let target = graph.parse_target("https://example.com/wiki/index.html#guide#api");
    assert_eq!(target.page, api);
    assert_eq!(target.anchor, "");

    let target = graph.parse_target("https://example.com/wiki/");
    assert_eq!(target.page, graph.root());
}

#[test]
fn test_nav_sets_the_fragment() {
    let parsed = sample_graph();
    let graph = &parsed.graph;
    let mut navigator = TestNavigator::default();
    graph.nav(graph.page_by_id("api").unwrap(), &mut navigator);
    graph.nav(graph.root(), &mut navigator);
    assert_eq!(navigator.fragments, vec!["#guide#api", "#"]);
}

#[test]
fn test_build_deep_url() {
    let parsed = sample_graph();
    let graph = &parsed.graph;
    let guide = graph.page_by_id("guide").unwrap();
    assert_eq!(
        graph.build_deep_url("https://example.com/", guide, "1_1"),
        "https://example.com/#guide#1_1"
    );
    assert_eq!(
        graph.build_deep_url("https://example.com/", graph.root(), "overview"),
        "https://example.com/#overview"
    );
    assert_eq!(
        graph.build_deep_url("https://example.com/", guide, ""),
        "https://example.com/#guide"
    );
}
