//! Recording dispatcher used in tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::controller::FatalErrorReporter;
use crate::dispatcher::{Credential, Dispatcher};
use crate::errors::ApiFailure;
use crate::key::NodeKey;
use crate::node::Node;

/// Discriminates the kind of call recorded by the stub dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallKind {
    /// `begin` was invoked for the root.
    Begin,
    /// `fetch` was invoked for a discovered container.
    Fetch(NodeKey),
    /// `prioritize` was invoked.
    Prioritize(NodeKey),
}

#[derive(Default)]
struct RecordingState {
    calls: Vec<CallKind>,
    root: Option<Arc<Node>>,
    nodes: HashMap<NodeKey, Arc<Node>>,
    reporter: Option<FatalErrorReporter>,
    credential: Option<Credential>,
    fail_begin: Option<ApiFailure>,
}

/// Test double that records every call and keeps the nodes it was handed so
/// tests can deliver batches to them.
#[derive(Clone, Default)]
pub struct RecordingDispatcher {
    shared: Arc<Mutex<RecordingState>>,
}

impl RecordingDispatcher {
    /// Creates a dispatcher that accepts every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dispatcher whose root fetch fails with `failure`.
    pub fn failing_begin(failure: ApiFailure) -> Self {
        let dispatcher = Self::new();
        with_state(&dispatcher.shared, |state| state.fail_begin = Some(failure));
        dispatcher
    }

    /// Returns the recorded call sequence.
    pub fn calls(&self) -> Vec<CallKind> {
        with_state(&self.shared, |state| state.calls.clone())
    }

    /// Keys handed to `fetch`, in order.
    pub fn fetched(&self) -> Vec<NodeKey> {
        with_state(&self.shared, |state| {
            state
                .calls
                .iter()
                .filter_map(|call| match call {
                    CallKind::Fetch(key) => Some(key.clone()),
                    _ => None,
                })
                .collect()
        })
    }

    /// Keys handed to `prioritize`, in order.
    pub fn prioritised(&self) -> Vec<NodeKey> {
        with_state(&self.shared, |state| {
            state
                .calls
                .iter()
                .filter_map(|call| match call {
                    CallKind::Prioritize(key) => Some(key.clone()),
                    _ => None,
                })
                .collect()
        })
    }

    /// Root handed to `begin`.
    pub fn root(&self) -> Option<Arc<Node>> {
        with_state(&self.shared, |state| state.root.clone())
    }

    /// Node handed to `fetch` for `key`.
    pub fn node(&self, key: &str) -> Option<Arc<Node>> {
        with_state(&self.shared, |state| state.nodes.get(&NodeKey::from(key)).cloned())
    }

    /// Fatal-error channel handed to `begin`.
    pub fn reporter(&self) -> Option<FatalErrorReporter> {
        with_state(&self.shared, |state| state.reporter.clone())
    }

    /// Credential handed to `begin`.
    pub fn credential(&self) -> Option<Credential> {
        with_state(&self.shared, |state| state.credential.clone())
    }
}

fn with_state<R>(
    shared: &Arc<Mutex<RecordingState>>,
    action: impl FnOnce(&mut RecordingState) -> R,
) -> R {
    let mut state = shared.lock().unwrap_or_else(|poison| poison.into_inner());
    action(&mut state)
}

impl Dispatcher for RecordingDispatcher {
    fn begin(&self, root: Arc<Node>, credential: Credential, errors: FatalErrorReporter) {
        let failure = with_state(&self.shared, |state| {
            state.calls.push(CallKind::Begin);
            state.root = Some(root);
            state.credential = Some(credential);
            state.reporter = Some(errors.clone());
            state.fail_begin.take()
        });
        if let Some(failure) = failure {
            errors.report(failure);
        }
    }

    fn fetch(&self, node: Arc<Node>) {
        with_state(&self.shared, |state| {
            let Some(key) = node.key().cloned() else {
                panic!("root must never be handed to fetch");
            };
            state.calls.push(CallKind::Fetch(key.clone()));
            state.nodes.insert(key, node);
        });
    }

    fn prioritize(&self, key: &NodeKey) {
        with_state(&self.shared, |state| {
            state.calls.push(CallKind::Prioritize(key.clone()));
        });
    }
}
