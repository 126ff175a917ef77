//! Navigation controller owning the node cache and the dispatcher handle.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};

use tracing::{debug, error, info};

use crate::cache::{NodeCache, Registration};
use crate::dispatcher::{Credential, Dispatcher};
use crate::errors::{ControllerError, FatalError};
use crate::item::{ChildRef, ContainerRef, LeafPayload};
use crate::key::NodeKey;
use crate::node::Node;
use crate::outcome::SessionOutcome;

/// Title and subtitle given to the root node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootLabels {
    /// Root heading.
    pub title: String,
    /// Secondary heading shown above the root listing.
    pub subtitle: String,
}

impl RootLabels {
    /// Builds root labels.
    #[must_use]
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
        }
    }
}

impl Default for RootLabels {
    fn default() -> Self {
        Self::new("Notebooks", "OneNote")
    }
}

/// What the host should do after a navigation event.
#[derive(Debug, Clone)]
pub enum Navigation {
    /// A leaf was picked; the session is over.
    Selected(LeafPayload),
    /// A container should be pushed onto the view stack.
    Display(Arc<Node>),
}

#[derive(Default)]
struct FatalSlot {
    fired: bool,
    pending: Option<FatalError>,
}

/// State reachable from nodes through a weak back-reference.
pub(crate) struct Shared {
    labels: RootLabels,
    cache: Mutex<NodeCache>,
    dispatcher: RwLock<Option<Arc<dyn Dispatcher>>>,
    disposed: AtomicBool,
    fatal: Mutex<FatalSlot>,
}

impl Shared {
    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Looks up or registers the node for `container`; `None` once disposed.
    pub(crate) fn resolve_or_create(
        self: &Arc<Self>,
        container: &ContainerRef,
    ) -> Option<Registration> {
        let registration = {
            let mut cache = self.cache();
            // Checked under the cache lock so a concurrent dispose cannot
            // clear the cache between the check and the insert.
            if self.is_disposed() {
                return None;
            }
            cache.get_or_insert_with(container.key(), || {
                Node::discovered(
                    container.key().clone(),
                    container.name().to_owned(),
                    Arc::downgrade(self),
                )
            })
        };
        if registration.is_new {
            debug!(
                target: "picker_core::controller",
                event = "container_discovered",
                key = %container.key(),
                kind = %container.kind(),
                "registered container"
            );
        }
        Some(registration)
    }

    pub(crate) fn dispatch_fetch(&self, node: Arc<Node>) {
        if let Some(dispatcher) = self.dispatcher() {
            dispatcher.fetch(node);
        }
    }

    fn dispatcher(&self) -> Option<Arc<dyn Dispatcher>> {
        self.dispatcher
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn cache(&self) -> MutexGuard<'_, NodeCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report_fatal(&self, error: FatalError) -> bool {
        let mut slot = self.fatal.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.fired || self.is_disposed() {
            debug!(
                target: "picker_core::controller",
                event = "fatal_error_ignored",
                error = %error,
                "fatal error already reported"
            );
            return false;
        }
        slot.fired = true;
        slot.pending = Some(error);
        true
    }
}

/// Single-fire channel through which a dispatcher reports session-ending
/// failures that are not tied to one node.
#[derive(Clone)]
pub struct FatalErrorReporter {
    shared: Weak<Shared>,
}

impl FatalErrorReporter {
    /// Records `error` if it is the first one reported.
    ///
    /// Returns `false` when an earlier error was already recorded or the
    /// controller is gone.
    pub fn report(&self, error: impl Into<FatalError>) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.report_fatal(error.into()))
    }
}

impl fmt::Debug for FatalErrorReporter {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("FatalErrorReporter")
    }
}

/// Coordinates discovery, speculative prefetch and navigation for a session.
///
/// The host constructs one controller per session and keeps it alive across
/// transient view teardown; views come and go, the controller and its cache
/// stay. Every container found in any delivered batch is registered and its
/// fetch started immediately, so most navigation lands on a node that has
/// already loaded. Navigating into a node that is still loading asks the
/// dispatcher to bump its priority.
pub struct NavigationController {
    shared: Arc<Shared>,
    root: Mutex<Option<Arc<Node>>>,
}

impl NavigationController {
    /// Builds a controller over the supplied dispatcher.
    #[must_use]
    pub fn new(dispatcher: Arc<dyn Dispatcher>, labels: RootLabels) -> Self {
        Self {
            shared: Arc::new(Shared {
                labels,
                cache: Mutex::new(NodeCache::new()),
                dispatcher: RwLock::new(Some(dispatcher)),
                disposed: AtomicBool::new(false),
                fatal: Mutex::new(FatalSlot::default()),
            }),
            root: Mutex::new(None),
        }
    }

    /// Creates the root node and asks the dispatcher to start fetching it.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::AlreadyInitialised`] on a second call and
    /// [`ControllerError::Disposed`] after [`Self::dispose`].
    pub fn initialize(&self, credential: Credential) -> Result<Arc<Node>, ControllerError> {
        let dispatcher = self
            .shared
            .dispatcher()
            .filter(|_| !self.shared.is_disposed())
            .ok_or(ControllerError::Disposed)?;

        let root = {
            let mut slot = self.root.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.is_some() {
                return Err(ControllerError::AlreadyInitialised);
            }
            let root = Arc::new(Node::root(
                self.shared.labels.title.clone(),
                self.shared.labels.subtitle.clone(),
                Arc::downgrade(&self.shared),
            ));
            *slot = Some(Arc::clone(&root));
            root
        };

        info!(
            target: "picker_core::controller",
            event = "session_initialised",
            root = %root.title(),
            "starting root fetch"
        );
        dispatcher.begin(Arc::clone(&root), credential, self.fatal_error_reporter());
        Ok(root)
    }

    /// The root node, once initialised and until disposed.
    #[must_use]
    pub fn root(&self) -> Option<Arc<Node>> {
        self.root
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the cached node for `container`, creating it on first sight.
    ///
    /// The caller owns starting the fetch when [`Registration::is_new`] is set;
    /// batch delivery does this automatically.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Disposed`] after [`Self::dispose`].
    pub fn resolve_or_create_node(
        &self,
        container: &ContainerRef,
    ) -> Result<Registration, ControllerError> {
        self.shared
            .resolve_or_create(container)
            .ok_or(ControllerError::Disposed)
    }

    /// Resolves a user's tap on `child` inside `parent`.
    ///
    /// Leaves resolve to a selection. Containers resolve to their cached node,
    /// whose header is updated to show a back arrow and `parent`'s title; a
    /// node still loading is escalated with the dispatcher.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Disposed`] after [`Self::dispose`] and
    /// [`ControllerError::UnregisteredContainer`] when `child` never appeared
    /// in a delivered batch.
    pub fn navigate_into(
        &self,
        parent: &Node,
        child: &ChildRef,
    ) -> Result<Navigation, ControllerError> {
        if self.shared.is_disposed() {
            return Err(ControllerError::Disposed);
        }

        let container = match child {
            ChildRef::Leaf(payload) => {
                info!(
                    target: "picker_core::controller",
                    event = "leaf_selected",
                    id = %payload.id,
                    "leaf selected"
                );
                return Ok(Navigation::Selected(payload.clone()));
            }
            ChildRef::Container(container) => container,
        };

        let node = self
            .cached(container.key())
            .ok_or_else(|| ControllerError::unregistered(container.key().clone()))?;
        node.mark_navigated(parent.title());

        if node.is_loading() {
            if let Some(dispatcher) = self.shared.dispatcher() {
                debug!(
                    target: "picker_core::controller",
                    event = "fetch_prioritised",
                    key = %container.key(),
                    "escalating fetch for opened container"
                );
                dispatcher.prioritize(container.key());
            }
        }

        Ok(Navigation::Display(node))
    }

    /// Converts a session-ending failure into the terminal outcome.
    pub fn handle_fatal_error(&self, error: FatalError) -> SessionOutcome {
        let classification = match &error {
            FatalError::Api(_) => "api",
            FatalError::System(_) => "system",
        };
        error!(
            target: "picker_core::controller",
            event = "fatal_error",
            classification,
            error = %error,
            "session failed"
        );
        SessionOutcome::from(error)
    }

    /// Channel handed to the dispatcher for failures outside any node.
    #[must_use]
    pub fn fatal_error_reporter(&self) -> FatalErrorReporter {
        FatalErrorReporter {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Takes the failure recorded through the reporter, if any.
    #[must_use]
    pub fn take_fatal_error(&self) -> Option<FatalError> {
        self.shared
            .fatal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .take()
    }

    /// Returns the cached node for `key`.
    #[must_use]
    pub fn cached(&self, key: &NodeKey) -> Option<Arc<Node>> {
        self.shared.cache().get(key).cloned()
    }

    /// Number of containers discovered so far.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.shared.cache().len()
    }

    /// Whether [`Self::dispose`] has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.shared.is_disposed()
    }

    /// Releases the cache, the root and the dispatcher handle.
    ///
    /// Fetches already in flight may still complete inside the dispatcher;
    /// their deliveries are discarded. Repeated calls do nothing.
    pub fn dispose(&self) {
        let released = {
            let mut cache = self.shared.cache();
            if self.shared.disposed.swap(true, Ordering::AcqRel) {
                return;
            }
            let count = cache.len();
            cache.clear();
            count
        };
        self.root
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.shared
            .dispatcher
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        info!(
            target: "picker_core::controller",
            event = "controller_disposed",
            released,
            "navigation controller disposed"
        );
    }
}

impl fmt::Debug for NavigationController {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("NavigationController")
            .field("labels", &self.shared.labels)
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}
