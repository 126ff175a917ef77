//! Insert-once mapping from discovered container identity to its node.

use std::collections::HashMap;
use std::sync::Arc;

use crate::key::NodeKey;
use crate::node::Node;

/// Result of resolving a discovered container against the cache.
#[derive(Debug, Clone)]
pub struct Registration {
    /// The canonical node for the container.
    pub node: Arc<Node>,
    /// `true` when this call created the node and its fetch must be started.
    pub is_new: bool,
}

/// Cache holding at most one [`Node`] per [`NodeKey`].
///
/// Entries are never replaced or evicted individually; the whole cache is
/// cleared when the owning controller is disposed.
#[derive(Debug, Default)]
pub(crate) struct NodeCache {
    nodes: HashMap<NodeKey, Arc<Node>>,
}

impl NodeCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, key: &NodeKey) -> Option<&Arc<Node>> {
        self.nodes.get(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the existing node for `key` or inserts the one built by `create`.
    pub(crate) fn get_or_insert_with(
        &mut self,
        key: &NodeKey,
        create: impl FnOnce() -> Node,
    ) -> Registration {
        if let Some(node) = self.nodes.get(key) {
            return Registration {
                node: Arc::clone(node),
                is_new: false,
            };
        }

        let node = Arc::new(create());
        self.nodes.insert(key.clone(), Arc::clone(&node));
        Registration { node, is_new: true }
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
    }
}
