//! # km-core
//!
//! Parse a single concatenated text document (a "bundle") describing a
//! hierarchical set of articles into an in-memory navigable page graph,
//! resolve URL-fragment addresses against that graph, and answer ranked
//! multi-field search queries over it.
//!
//! ## Overview
//!
//! A bundle is a sequence of metadata header blocks, each followed by a body
//! that runs to the next header or end of input:
//!
//! ```text
//! <!--id:"home" title:"Home"-->
//! Welcome
//! <!--id:"a" title:"Alpha" parent:"home"-->
//! # Intro
//! Hello world
//! ```
//!
//! [`graph::DocumentGraph::parse`] turns this into an owned, immutable graph:
//! flat records are linked into a rooted tree (disconnected clusters are
//! promoted under root so everything stays reachable), each page body is split
//! into heading-addressable sections, and root-relative hash paths are
//! precomputed. The router ([`router`]) and search engine ([`query`]) are pure
//! readers over the finished graph; a new bundle discards and fully rebuilds
//! it.
//!
//! The only error the core propagates is [`KmError::EmptyBundle`] (zero pages
//! parsed). Orphaned pages, unresolvable routes, and duplicate ids all degrade
//! to well-defined fallbacks, observable through
//! [`codec::ParseDiagnostic`] and the `tracing` warn channel.
//!
//! ## Quick start
//!
//! ```rust
//! use km_core::graph::DocumentGraph;
//!
//! # fn main() -> Result<(), km_core::KmError> {
//! let bundle = "<!--id:\"home\" title:\"Home\"-->\nWelcome\n\
//!               <!--id:\"a\" title:\"Alpha\" parent:\"home\"-->\n# Intro\nHello world";
//! let parsed = DocumentGraph::parse(bundle)?;
//! let graph = parsed.graph;
//!
//! let alpha = graph.page_by_id("a").expect("parsed above");
//! assert_eq!(graph.hash_of(alpha), "a");
//! assert_eq!(graph.page(alpha).sections[0].id, "1");
//!
//! let target = graph.parse_target("#a#1");
//! assert_eq!(target.page, alpha);
//! assert_eq!(target.anchor, "1");
//!
//! let hits = graph.search("hello");
//! assert_eq!(hits[0].page, alpha);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module guide
//!
//! - [`codec`]: bundle and section parsing plus parse diagnostics
//! - [`graph`]: the `DocumentGraph` arena and its builder
//! - [`router`]: hash-path resolution and navigation
//! - [`query`]: ranked search over pages and sections
//! - [`source`]: `BundleSource`/`CacheStore` collaborator interfaces
//! - [`config`]: TOML site configuration
//!
//! Rendering page content to markup, UI chrome, and the network fetch itself
//! are external collaborators and out of scope here.

pub mod codec;
pub mod config;
pub mod error;
pub mod graph;
pub mod properties;
pub mod query;
pub mod router;
pub mod source;
#[cfg(test)]
mod tests;

pub use error::*;
