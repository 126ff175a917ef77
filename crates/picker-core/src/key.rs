//! Stable identity of discovered containers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cache key derived from a remote item's immutable identifier.
///
/// Keys compare by value, so two batches describing the same remote container
/// resolve to the same cached [`crate::Node`] regardless of which parent
/// delivered them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(String);

impl NodeKey {
    /// Builds a key from the remote identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the remote identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeKey {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}
