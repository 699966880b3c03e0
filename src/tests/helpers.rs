//! Shared fixtures for the unit test modules.

use crate::graph::{DocumentGraph, ParsedGraph};

/// A small but representative bundle: a root, a nested branch, a page with
/// fenced code and multiple heading levels, and a two-page orphan cluster.
pub fn sample_bundle() -> &'static str {
    r#"<!--id:"home" title:"Home" tags:"start"-->
Welcome to the wiki.

# Overview
General notes.
<!--id:"guide" title:"User Guide" parent:"home" tags:"docs,help"-->
# Install
Run the installer.

```
# not a heading
```

## Configure
Edit the settings file.

# Usage
Daily usage notes.
<!--id:"api" title:"API Reference" parent:"guide" tags:"docs"-->
Functions and types.
<!--id:"lost" title:"Lost Page" parent:"nowhere"-->
# Orphan Notes
This cluster is disconnected.
<!--id:"lost_child" title:"Lost Child" parent:"lost"-->
More notes.
"#
}

pub fn sample_graph() -> ParsedGraph {
    DocumentGraph::parse(sample_bundle()).expect("sample bundle parses")
}
