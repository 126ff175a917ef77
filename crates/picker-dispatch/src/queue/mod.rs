//! Priority-aware fetch queue implementing the controller's dispatcher seam.
//!
//! [`QueueDispatcher`] never fetches on the caller's thread. `begin`, `fetch`
//! and `prioritize` only reorder the pending queue; the host decides how much
//! work happens by calling [`QueueDispatcher::pump`] with an admission limit.
//! Escalated containers jump to the front of the queue, so the container the
//! user is looking at is fetched next.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use picker_core::{
    BatchError, Credential, DeliveryOutcome, Dispatcher, FatalErrorReporter, Node, NodeKey,
};
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::source::{TreeSource, classify};

struct Context {
    credential: Credential,
    errors: FatalErrorReporter,
}

#[derive(Default)]
struct QueueState {
    context: Option<Arc<Context>>,
    pending: VecDeque<Arc<Node>>,
    seen: HashSet<NodeKey>,
}

impl QueueState {
    fn position(&self, key: &NodeKey) -> Option<usize> {
        self.pending
            .iter()
            .position(|node| node.key() == Some(key))
    }
}

/// Dispatcher that queues fetches and performs them on demand.
pub struct QueueDispatcher<S> {
    source: S,
    state: Mutex<QueueState>,
}

impl<S> QueueDispatcher<S> {
    /// Creates an idle dispatcher over `source`.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: Mutex::new(QueueState::default()),
        }
    }

    /// Keys of the pending container fetches, front first.
    ///
    /// A pending root fetch has no key and is not listed.
    #[must_use]
    pub fn pending_keys(&self) -> Vec<NodeKey> {
        self.lock()
            .pending
            .iter()
            .filter_map(|node| node.key().cloned())
            .collect()
    }

    /// Number of pending fetches, including the root.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    /// Whether nothing is waiting to be fetched.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.lock().pending.is_empty()
    }

    /// The wrapped listing source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_job(&self) -> Option<(Arc<Node>, Arc<Context>)> {
        let mut state = self.lock();
        let context = state.context.clone()?;
        state.pending.pop_front().map(|node| (node, context))
    }
}

impl<S: TreeSource> QueueDispatcher<S> {
    /// Performs at most `limit` pending fetches and returns how many ran.
    ///
    /// Containers discovered while pumping join the back of the queue and
    /// count against the same limit.
    pub fn pump(&self, limit: usize) -> usize {
        let mut performed = 0;
        while performed < limit {
            let Some((node, context)) = self.next_job() else {
                break;
            };
            self.perform(&node, &context);
            performed += 1;
        }
        if performed > 0 {
            debug!(
                target: "picker_dispatch::queue",
                event = "pump_finished",
                performed,
                remaining = self.pending_len(),
                "pumped fetch queue"
            );
        }
        performed
    }

    /// Pumps until the queue is empty and returns how many fetches ran.
    pub fn drain(&self) -> usize {
        self.pump(usize::MAX)
    }

    fn perform(&self, node: &Node, context: &Context) {
        let Some(key) = node.key() else {
            match self.source.list_root(&context.credential) {
                Ok(items) => log_delivery(node, node.deliver(Ok(classify(items)))),
                Err(error) => report(context, error),
            }
            return;
        };

        match self.source.list_children(&context.credential, key) {
            Ok(items) => log_delivery(node, node.deliver(Ok(classify(items)))),
            Err(FetchError::Api(failure)) => {
                let message = format!("listing '{key}' failed");
                log_delivery(node, node.deliver(Err(BatchError::with_source(message, failure))));
            }
            Err(error) => report(context, error),
        }
    }
}

fn log_delivery(node: &Node, outcome: DeliveryOutcome) {
    debug!(
        target: "picker_dispatch::queue",
        event = "listing_delivered",
        key = ?node.key(),
        outcome = ?outcome,
        "delivered listing"
    );
}

fn report(context: &Context, error: FetchError) {
    warn!(
        target: "picker_dispatch::queue",
        event = "fatal_fetch_failure",
        error = %error,
        "fetch failure ends the session"
    );
    context.errors.report(error.into_fatal());
}

impl<S: TreeSource> Dispatcher for QueueDispatcher<S> {
    fn begin(&self, root: Arc<Node>, credential: Credential, errors: FatalErrorReporter) {
        let mut state = self.lock();
        if state.context.is_some() {
            warn!(
                target: "picker_dispatch::queue",
                event = "begin_repeated",
                "dispatcher already started; ignoring"
            );
            return;
        }
        state.context = Some(Arc::new(Context { credential, errors }));
        state.pending.push_front(root);
        info!(
            target: "picker_dispatch::queue",
            event = "dispatcher_started",
            "queued root listing"
        );
    }

    fn fetch(&self, node: Arc<Node>) {
        let Some(key) = node.key().cloned() else {
            warn!(
                target: "picker_dispatch::queue",
                event = "root_fetch_rejected",
                "root listing is only fetched through begin"
            );
            return;
        };
        let mut state = self.lock();
        if !state.seen.insert(key.clone()) {
            debug!(
                target: "picker_dispatch::queue",
                event = "fetch_deduplicated",
                key = %key,
                "container already queued"
            );
            return;
        }
        state.pending.push_back(node);
    }

    fn prioritize(&self, key: &NodeKey) {
        let mut state = self.lock();
        let Some(position) = state.position(key) else {
            debug!(
                target: "picker_dispatch::queue",
                event = "prioritize_ignored",
                key = %key,
                "container not pending"
            );
            return;
        };
        if let Some(node) = state.pending.remove(position) {
            state.pending.push_front(node);
            debug!(
                target: "picker_dispatch::queue",
                event = "fetch_prioritised",
                key = %key,
                from = position,
                "moved container to the front"
            );
        }
    }
}

impl<S> fmt::Debug for QueueDispatcher<S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("QueueDispatcher")
            .field("pending", &self.pending_keys())
            .finish_non_exhaustive()
    }
}
