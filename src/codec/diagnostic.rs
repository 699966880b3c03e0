//! Non-fatal observations produced while parsing a bundle and building its
//! graph.
//!
//! Diagnostics never stop construction. They exist so callers can warn on (or
//! reject) degraded input without the core guessing which policy is wanted:
//! duplicate ids keep their last-write-wins behavior, orphan clusters are
//! promoted, and parent cycles are cut, all with a diagnostic left behind.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseDiagnostic {
    /// A later metadata block reused an existing page id. The later block
    /// silently replaced the earlier one.
    DuplicateId { id: String },

    /// This page's parent chain looped back on itself; the page was detached
    /// from its parent to restore acyclicity.
    CycleCut { id: String },

    /// Representative of a cluster disconnected from root, re-parented under
    /// root so the whole cluster stays navigable.
    ClusterPromoted {
        id: String,
        cluster: u32,
        members: usize,
    },

    /// A warning about degraded-but-recoverable input (e.g. a metadata block
    /// without an id).
    Warning(String),

    /// An informational message about the parse.
    Info(String),
}

impl ParseDiagnostic {
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning(message.into())
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::Info(message.into())
    }

    pub fn is_duplicate_id(&self) -> bool {
        matches!(self, Self::DuplicateId { .. })
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { id } => {
                write!(f, "Duplicate page id '{id}': later block replaces earlier")
            }
            Self::CycleCut { id } => {
                write!(f, "Parent cycle cut at page '{id}'")
            }
            Self::ClusterPromoted {
                id,
                cluster,
                members,
            } => {
                write!(
                    f,
                    "Promoted '{id}' as secondary home for cluster {cluster} ({members} pages)"
                )
            }
            Self::Warning(msg) => write!(f, "Warning: {msg}"),
            Self::Info(msg) => write!(f, "Info: {msg}"),
        }
    }
}
