//! Listing sources and the wire items they return.
//!
//! A [`TreeSource`] answers two questions: what sits at the top of the tree,
//! and what sits inside a given container. Answers are raw [`RemoteItem`]s;
//! [`classify`] turns them into the [`ChildRef`]s the controller understands,
//! resolving the item discriminant exactly once.

use picker_core::{ChildRef, ContainerKind, Credential, LeafPayload, NodeKey};
use serde::Deserialize;
use tracing::warn;

use crate::error::FetchError;

/// Item as returned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RemoteItem {
    /// Top-level container.
    Notebook {
        /// Immutable remote identifier.
        id: String,
        /// Display name.
        name: String,
    },
    /// Nested container.
    SectionGroup {
        /// Immutable remote identifier.
        id: String,
        /// Display name.
        name: String,
    },
    /// Selectable leaf.
    Section(LeafPayload),
    /// Any item type this picker does not know how to show.
    #[serde(other)]
    Unrecognized,
}

impl RemoteItem {
    /// Converts the item into a child entry; unrecognised items yield `None`.
    #[must_use]
    pub fn into_child(self) -> Option<ChildRef> {
        match self {
            Self::Notebook { id, name } => {
                Some(ChildRef::container(id, name, ContainerKind::Notebook))
            }
            Self::SectionGroup { id, name } => {
                Some(ChildRef::container(id, name, ContainerKind::SectionGroup))
            }
            Self::Section(payload) => Some(ChildRef::Leaf(payload)),
            Self::Unrecognized => None,
        }
    }
}

/// Classifies a batch, dropping items of unknown type.
#[must_use]
pub fn classify(items: Vec<RemoteItem>) -> Vec<ChildRef> {
    let total = items.len();
    let children: Vec<ChildRef> = items.into_iter().filter_map(RemoteItem::into_child).collect();
    let dropped = total - children.len();
    if dropped > 0 {
        warn!(
            target: "picker_dispatch::source",
            event = "items_dropped",
            dropped,
            "ignoring items of unrecognised type"
        );
    }
    children
}

/// Backend that lists the contents of the remote tree.
///
/// Calls block until the listing is available; the dispatcher decides when
/// and how many to issue.
pub trait TreeSource: Send + Sync {
    /// Lists the top-level containers.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the listing cannot be produced.
    fn list_root(&self, credential: &Credential) -> Result<Vec<RemoteItem>, FetchError>;

    /// Lists the children of the container identified by `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the listing cannot be produced.
    fn list_children(
        &self,
        credential: &Credential,
        key: &NodeKey,
    ) -> Result<Vec<RemoteItem>, FetchError>;
}
