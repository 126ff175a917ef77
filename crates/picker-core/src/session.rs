//! Linear navigation stack over nodes, ending in exactly one outcome.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, info};

use crate::controller::{Navigation, NavigationController};
use crate::dispatcher::Credential;
use crate::errors::{ControllerError, FatalError, PanicFailure};
use crate::item::ChildRef;
use crate::node::Node;
use crate::outcome::{SessionOutcome, SessionResult};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// The root fetch was started but the root has not been shown yet.
    Initializing,
    /// The user is moving through the tree.
    Browsing,
    /// An outcome was surfaced; every later call is ignored.
    Finished,
}

/// Effect of a session event on the host's view stack.
#[derive(Debug, Clone)]
pub enum Step {
    /// Show this node.
    Display(Arc<Node>),
    /// The session ended with this outcome.
    Finished(SessionOutcome),
    /// The session had already finished; nothing happened.
    Ignored,
}

/// Host-side shell that turns user events into controller calls.
///
/// The root is held separately from the stack, so `depth` counts only the
/// containers the user opened. Backing out past the root cancels.
#[derive(Debug)]
pub struct Session {
    controller: Arc<NavigationController>,
    root: Arc<Node>,
    stack: Vec<Arc<Node>>,
    phase: SessionPhase,
    outcome: Option<SessionOutcome>,
}

impl Session {
    /// Initialises `controller` and starts the root fetch.
    ///
    /// # Errors
    ///
    /// Propagates [`NavigationController::initialize`] failures.
    pub fn start(
        controller: Arc<NavigationController>,
        credential: Credential,
    ) -> Result<Self, ControllerError> {
        let root = controller.initialize(credential)?;
        Ok(Self {
            controller,
            root,
            stack: Vec::new(),
            phase: SessionPhase::Initializing,
            outcome: None,
        })
    }

    /// Records that the root listing is on screen.
    ///
    /// Returns `false` unless this call moved the session into browsing.
    pub fn root_displayed(&mut self) -> bool {
        if self.phase != SessionPhase::Initializing {
            return false;
        }
        self.phase = SessionPhase::Browsing;
        true
    }

    /// Opens `child` from the node currently on screen.
    pub fn open(&mut self, child: &ChildRef) -> Step {
        if let Some(step) = self.interrupt() {
            return step;
        }
        self.root_displayed();

        let parent = self.current();
        match self.controller.navigate_into(&parent, child) {
            Ok(Navigation::Selected(payload)) => self.finish(SessionOutcome::Selected(payload)),
            Ok(Navigation::Display(node)) => {
                self.stack.push(Arc::clone(&node));
                debug!(
                    target: "picker_core::session",
                    event = "container_opened",
                    title = %node.title(),
                    depth = self.stack.len(),
                    "pushed container"
                );
                Step::Display(node)
            }
            Err(error) => self.fail(FatalError::system(error)),
        }
    }

    /// Pops one entry; backing out of the root cancels the session.
    pub fn back(&mut self) -> Step {
        if let Some(step) = self.interrupt() {
            return step;
        }
        if self.stack.pop().is_none() {
            return self.cancel();
        }
        Step::Display(self.current())
    }

    /// Ends the session without a selection.
    pub fn cancel(&mut self) -> Step {
        if self.phase == SessionPhase::Finished {
            return Step::Ignored;
        }
        self.finish(SessionOutcome::Cancelled)
    }

    /// Ends the session with a classified failure.
    pub fn fail(&mut self, error: FatalError) -> Step {
        if self.phase == SessionPhase::Finished {
            debug!(
                target: "picker_core::session",
                event = "late_failure_ignored",
                error = %error,
                "session already finished"
            );
            return Step::Ignored;
        }
        let outcome = self.controller.handle_fatal_error(error);
        self.finish(outcome)
    }

    /// Surfaces a failure the dispatcher reported out of band, if any.
    pub fn poll(&mut self) -> Step {
        self.interrupt().unwrap_or(Step::Ignored)
    }

    /// Runs `action` and turns a panic inside it into a system error.
    pub fn guard(&mut self, action: impl FnOnce(&mut Self) -> Step) -> Step {
        match panic::catch_unwind(AssertUnwindSafe(|| action(self))) {
            Ok(step) => step,
            Err(payload) => {
                let failure = PanicFailure::from_payload(payload.as_ref());
                self.fail(FatalError::from(failure))
            }
        }
    }

    /// Node on top of the stack, or the root.
    #[must_use]
    pub fn current(&self) -> Arc<Node> {
        Arc::clone(self.stack.last().unwrap_or(&self.root))
    }

    /// The session root.
    #[must_use]
    pub const fn root(&self) -> &Arc<Node> {
        &self.root
    }

    /// Number of containers opened above the root.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The terminal outcome, once surfaced.
    #[must_use]
    pub const fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    /// Host-facing encoding of the terminal outcome.
    #[must_use]
    pub fn result(&self) -> Option<SessionResult> {
        self.outcome.as_ref().map(SessionResult::from)
    }

    /// Controller backing this session.
    #[must_use]
    pub const fn controller(&self) -> &Arc<NavigationController> {
        &self.controller
    }

    fn interrupt(&mut self) -> Option<Step> {
        if self.phase == SessionPhase::Finished {
            return Some(Step::Ignored);
        }
        self.controller
            .take_fatal_error()
            .map(|error| self.fail(error))
    }

    fn finish(&mut self, outcome: SessionOutcome) -> Step {
        self.phase = SessionPhase::Finished;
        self.stack.clear();
        self.outcome = Some(outcome.clone());
        self.controller.dispose();
        info!(
            target: "picker_core::session",
            event = "session_finished",
            outcome = outcome.label(),
            "session finished"
        );
        Step::Finished(outcome)
    }
}
