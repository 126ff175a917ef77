//! BDD test world encapsulating a session and its stub dispatcher.

use std::sync::Arc;

use crate::controller::{NavigationController, RootLabels};
use crate::dispatcher::Credential;
use crate::errors::{ApiFailure, BatchError, ControllerError};
use crate::item::ChildRef;
use crate::node::{DeliveryOutcome, Node};
use crate::session::{Session, Step};

use super::recording_dispatcher::RecordingDispatcher;

/// Shared state exercised by BDD step implementations.
pub struct TestWorld {
    /// Stub dispatcher shared with the controller.
    pub dispatcher: RecordingDispatcher,
    /// Controller under test.
    pub controller: Arc<NavigationController>,
    /// Session shell, once started.
    pub session: Option<Session>,
    /// Last step returned by the session.
    pub last_step: Option<Step>,
    /// Last delivery outcome observed.
    pub last_delivery: Option<DeliveryOutcome>,
    /// Last error observed while starting the session.
    pub last_error: Option<ControllerError>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::with_dispatcher(RecordingDispatcher::new())
    }
}

impl TestWorld {
    /// Builds a world around the supplied dispatcher.
    pub fn with_dispatcher(dispatcher: RecordingDispatcher) -> Self {
        let controller = Arc::new(NavigationController::new(
            Arc::new(dispatcher.clone()),
            RootLabels::default(),
        ));
        Self {
            dispatcher,
            controller,
            session: None,
            last_step: None,
            last_delivery: None,
            last_error: None,
        }
    }

    /// Builds a world whose root fetch fails with a structured error.
    pub fn with_failing_root(failure: ApiFailure) -> Self {
        Self::with_dispatcher(RecordingDispatcher::failing_begin(failure))
    }

    /// Starts the session and stores any error.
    pub fn start(&mut self) {
        match Session::start(Arc::clone(&self.controller), Credential::new("token")) {
            Ok(session) => self.session = Some(session),
            Err(error) => self.last_error = Some(error),
        }
    }

    /// Returns the running session.
    pub fn session(&mut self) -> &mut Session {
        self.session
            .as_mut()
            .unwrap_or_else(|| panic!("session has not been started"))
    }

    /// Root node handed to the dispatcher.
    pub fn root(&self) -> Arc<Node> {
        self.dispatcher
            .root()
            .unwrap_or_else(|| panic!("root was never handed to the dispatcher"))
    }

    /// Node handed to the dispatcher for `key`.
    pub fn node(&self, key: &str) -> Arc<Node> {
        self.dispatcher
            .node(key)
            .unwrap_or_else(|| panic!("container {key} was never fetched"))
    }

    /// Delivers a successful batch to the root.
    pub fn deliver_root(&mut self, children: Vec<ChildRef>) {
        self.last_delivery = Some(self.root().deliver(Ok(children)));
    }

    /// Delivers a successful batch to the container keyed `key`.
    pub fn deliver(&mut self, key: &str, children: Vec<ChildRef>) {
        self.last_delivery = Some(self.node(key).deliver(Ok(children)));
    }

    /// Delivers a failed batch to the container keyed `key`.
    pub fn deliver_error(&mut self, key: &str, message: &str) {
        self.last_delivery = Some(self.node(key).deliver(Err(BatchError::new(message))));
    }

    /// Opens the child named `name` in the node currently on screen.
    pub fn open(&mut self, name: &str) {
        let current = self.session().current();
        let child = current
            .child_named(name)
            .unwrap_or_else(|| panic!("no child named {name} in {}", current.title()));
        let step = self.session().open(&child);
        self.last_step = Some(step);
    }

    /// Goes back one level.
    pub fn back(&mut self) {
        let step = self.session().back();
        self.last_step = Some(step);
    }

    /// Cancels the session.
    pub fn cancel(&mut self) {
        let step = self.session().cancel();
        self.last_step = Some(step);
    }

    /// Drains the out-of-band failure channel.
    pub fn poll(&mut self) {
        let step = self.session().poll();
        self.last_step = Some(step);
    }
}
