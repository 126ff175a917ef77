//! Entries discovered inside a container's listing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::key::NodeKey;

/// Kind of container a [`ContainerRef`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    /// Top-level container listed by the root fetch.
    Notebook,
    /// Container nested inside a notebook or another section group.
    SectionGroup,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Notebook => "notebook",
            Self::SectionGroup => "section group",
        };
        f.write_str(label)
    }
}

/// Reference to a container whose own listing is fetched separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRef {
    key: NodeKey,
    name: String,
    kind: ContainerKind,
}

impl ContainerRef {
    /// Builds a container reference.
    #[must_use]
    pub fn new(key: NodeKey, name: impl Into<String>, kind: ContainerKind) -> Self {
        Self {
            key,
            name: name.into(),
            kind,
        }
    }

    /// Identity used to cache the container's node.
    #[must_use]
    pub const fn key(&self) -> &NodeKey {
        &self.key
    }

    /// Display name shown in listings.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind of container.
    #[must_use]
    pub const fn kind(&self) -> ContainerKind {
        self.kind
    }
}

/// Descriptor of a selectable leaf, forwarded verbatim to the host.
///
/// None of the fields are interpreted by the picker; timestamps stay in the
/// textual form the remote service returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafPayload {
    /// Remote identifier of the leaf.
    pub id: String,
    /// Display name of the leaf.
    pub name: String,
    /// Endpoint listing the leaf's pages.
    #[serde(default)]
    pub pages_url: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created_time: String,
    /// Last modification timestamp.
    #[serde(default)]
    pub modified_time: String,
    /// Display name of the last editor.
    #[serde(default)]
    pub last_modified_by: String,
}

impl LeafPayload {
    /// Builds a payload with only the identifier and name populated.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Discriminant of a [`ChildRef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildKind {
    /// Selectable item that ends the session.
    Leaf,
    /// Item that can be navigated into.
    Container,
}

/// A discovered tree entry, in the order its batch delivered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildRef {
    /// Selectable leaf.
    Leaf(LeafPayload),
    /// Navigable container.
    Container(ContainerRef),
}

impl ChildRef {
    /// Convenience constructor for container entries.
    #[must_use]
    pub fn container(key: impl Into<String>, name: impl Into<String>, kind: ContainerKind) -> Self {
        Self::Container(ContainerRef::new(NodeKey::new(key), name, kind))
    }

    /// Convenience constructor for leaf entries.
    #[must_use]
    pub fn leaf(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Leaf(LeafPayload::new(id, name))
    }

    /// Returns the entry's discriminant.
    #[must_use]
    pub const fn kind(&self) -> ChildKind {
        match self {
            Self::Leaf(_) => ChildKind::Leaf,
            Self::Container(_) => ChildKind::Container,
        }
    }

    /// Name shown for the entry in a listing.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Leaf(payload) => &payload.name,
            Self::Container(container) => container.name(),
        }
    }

    /// Cache key of a container entry; leaves have none.
    #[must_use]
    pub const fn container_key(&self) -> Option<&NodeKey> {
        match self {
            Self::Leaf(_) => None,
            Self::Container(container) => Some(container.key()),
        }
    }
}
