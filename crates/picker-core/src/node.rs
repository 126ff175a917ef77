//! Response-delivery target for one container listing.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::{debug, warn};

use crate::controller::Shared;
use crate::errors::BatchError;
use crate::item::ChildRef;
use crate::key::NodeKey;

/// Loading state of a [`Node`]. Moves from `Loading` to `Loaded` once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// No successful batch has been delivered yet.
    Loading,
    /// Children are final.
    Loaded,
}

/// Header shown while a node is on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    /// Main heading, the node's own name.
    pub title: String,
    /// Secondary heading, the title of the node it was opened from.
    pub subtitle: Option<String>,
    /// Whether a back arrow is shown.
    pub show_arrow: bool,
}

/// Presentation layer hook notified when a node finishes loading.
pub trait NodeObserver: Send {
    /// Called once, after the node's children become final.
    fn node_loaded(&self, node: &Node);
}

/// Why a delivery left the node untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discard {
    /// A batch was already applied.
    AlreadyLoaded,
    /// The batch carried an error.
    BatchFailed,
    /// The owning controller is gone or disposed.
    Disposed,
}

/// Result of [`Node::deliver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The batch was applied.
    Applied {
        /// Number of children appended.
        children: usize,
        /// Containers seen for the first time whose fetch was started.
        discovered: usize,
    },
    /// The batch was ignored.
    Discarded(Discard),
}

struct NodeInner {
    state: NodeState,
    children: Vec<ChildRef>,
    subtitle: Option<String>,
    show_arrow: bool,
    observer: Option<Box<dyn NodeObserver>>,
}

/// Cached loading state and children of one container, or of the root.
pub struct Node {
    key: Option<NodeKey>,
    title: String,
    inner: Mutex<NodeInner>,
    link: Weak<Shared>,
}

impl Node {
    pub(crate) fn root(title: String, subtitle: String, link: Weak<Shared>) -> Self {
        Self::build(None, title, Some(subtitle), link)
    }

    pub(crate) fn discovered(key: NodeKey, title: String, link: Weak<Shared>) -> Self {
        Self::build(Some(key), title, None, link)
    }

    fn build(
        key: Option<NodeKey>,
        title: String,
        subtitle: Option<String>,
        link: Weak<Shared>,
    ) -> Self {
        Self {
            key,
            title,
            inner: Mutex::new(NodeInner {
                state: NodeState::Loading,
                children: Vec::new(),
                subtitle,
                show_arrow: false,
                observer: None,
            }),
            link,
        }
    }

    /// Cache key; `None` for the root.
    #[must_use]
    pub const fn key(&self) -> Option<&NodeKey> {
        self.key.as_ref()
    }

    /// Whether this is the session root.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.key.is_none()
    }

    /// The node's own display name.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Current loading state.
    #[must_use]
    pub fn state(&self) -> NodeState {
        self.lock().state
    }

    /// Whether no successful batch has arrived yet.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state() == NodeState::Loading
    }

    /// Snapshot of the children in arrival order.
    #[must_use]
    pub fn children(&self) -> Vec<ChildRef> {
        self.lock().children.clone()
    }

    /// Finds a child by its display name.
    #[must_use]
    pub fn child_named(&self, name: &str) -> Option<ChildRef> {
        self.lock()
            .children
            .iter()
            .find(|child| child.display_name() == name)
            .cloned()
    }

    /// Snapshot of the header bookkeeping.
    #[must_use]
    pub fn presentation(&self) -> Presentation {
        let inner = self.lock();
        Presentation {
            title: self.title.clone(),
            subtitle: inner.subtitle.clone(),
            show_arrow: inner.show_arrow,
        }
    }

    /// Applies a fetched batch.
    ///
    /// Only the first successful batch takes effect. Failed batches are
    /// dropped and the node keeps loading; nothing retries them. Every
    /// container in the batch is registered with the controller, and the ones
    /// seen for the first time are handed to the dispatcher for prefetching.
    /// Deliveries arriving after the controller was disposed are discarded.
    pub fn deliver(&self, batch: Result<Vec<ChildRef>, BatchError>) -> DeliveryOutcome {
        let Some(shared) = self.link.upgrade().filter(|shared| !shared.is_disposed()) else {
            debug!(
                target: "picker_core::node",
                event = "delivery_discarded",
                key = ?self.key,
                "controller disposed; dropping late delivery"
            );
            return DeliveryOutcome::Discarded(Discard::Disposed);
        };

        let mut inner = self.lock();
        if inner.state == NodeState::Loaded {
            debug!(
                target: "picker_core::node",
                event = "delivery_discarded",
                key = ?self.key,
                "node already loaded; ignoring extra batch"
            );
            return DeliveryOutcome::Discarded(Discard::AlreadyLoaded);
        }

        let children = match batch {
            Ok(children) => children,
            Err(error) => {
                warn!(
                    target: "picker_core::node",
                    event = "batch_failed",
                    key = ?self.key,
                    error = %error,
                    "batch failed; node stays loading"
                );
                return DeliveryOutcome::Discarded(Discard::BatchFailed);
            }
        };

        let mut discovered = Vec::new();
        for child in &children {
            let ChildRef::Container(container) = child else {
                continue;
            };
            let Some(registration) = shared.resolve_or_create(container) else {
                return DeliveryOutcome::Discarded(Discard::Disposed);
            };
            if registration.is_new {
                discovered.push(registration.node);
            }
        }

        let appended = children.len();
        inner.children = children;
        inner.state = NodeState::Loaded;
        let observer = inner.observer.take();
        drop(inner);

        debug!(
            target: "picker_core::node",
            event = "batch_applied",
            key = ?self.key,
            children = appended,
            discovered = discovered.len(),
            "node loaded"
        );

        let discovered_count = discovered.len();
        for node in discovered {
            shared.dispatch_fetch(node);
        }
        if let Some(observer) = observer {
            observer.node_loaded(self);
        }

        DeliveryOutcome::Applied {
            children: appended,
            discovered: discovered_count,
        }
    }

    /// Attaches a presentation observer.
    ///
    /// A node that is already loaded notifies the observer immediately instead
    /// of storing it. Attaching replaces any previous observer.
    pub fn attach_observer(&self, observer: Box<dyn NodeObserver>) {
        let mut inner = self.lock();
        if inner.state == NodeState::Loaded {
            drop(inner);
            observer.node_loaded(self);
            return;
        }
        inner.observer = Some(observer);
    }

    /// Detaches the pending observer, for example when its view is torn down.
    pub fn detach_observer(&self) -> Option<Box<dyn NodeObserver>> {
        self.lock().observer.take()
    }

    pub(crate) fn mark_navigated(&self, parent_title: &str) {
        let mut inner = self.lock();
        inner.show_arrow = true;
        inner.subtitle = Some(parent_title.to_owned());
    }

    fn lock(&self) -> MutexGuard<'_, NodeInner> {
        self.inner.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        formatter
            .debug_struct("Node")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("state", &inner.state)
            .field("children", &inner.children.len())
            .finish_non_exhaustive()
    }
}

/// Convenience for observers kept behind an `Arc`.
impl<T> NodeObserver for Arc<T>
where
    T: NodeObserver + Sync,
{
    fn node_loaded(&self, node: &Node) {
        (**self).node_loaded(node);
    }
}
