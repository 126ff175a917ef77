//! Replays scripted navigation steps against a live session.

use std::sync::Arc;

use picker_core::{
    ChildRef, Credential, NavigationController, RootLabels, Session, SessionOutcome, Step,
};
use picker_dispatch::{QueueDispatcher, TreeSource};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::output::ListingView;

/// Token that steps back out of the current container.
pub(crate) const BACK_STEP: &str = "..";
/// Token that closes the picker without a selection.
pub(crate) const CANCEL_STEP: &str = "!cancel";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StepCommand<'a> {
    Open(&'a str),
    Back,
    Cancel,
}

impl<'a> StepCommand<'a> {
    pub(crate) fn parse(raw: &'a str) -> Self {
        match raw {
            BACK_STEP => Self::Back,
            CANCEL_STEP => Self::Cancel,
            name => Self::Open(name),
        }
    }
}

/// Where a replay stopped.
#[derive(Debug)]
pub(crate) enum Finale {
    /// The session surfaced its outcome.
    Finished(SessionOutcome),
    /// The steps ran out while the user was still browsing.
    Browsing(ListingView),
}

pub(crate) struct Replay<S: TreeSource> {
    dispatcher: Arc<QueueDispatcher<S>>,
    session: Session,
    window: usize,
}

impl<S: TreeSource + 'static> Replay<S> {
    pub(crate) fn start(
        source: S,
        labels: RootLabels,
        credential: Credential,
        window: usize,
    ) -> Result<Self, AppError> {
        let dispatcher = Arc::new(QueueDispatcher::new(source));
        let controller = Arc::new(NavigationController::new(dispatcher.clone(), labels));
        let session = Session::start(controller, credential)?;
        info!(
            target: "picker_cli::replay",
            event = "session_started",
            window,
            "session started"
        );
        Ok(Self {
            dispatcher,
            session,
            window,
        })
    }

    /// Runs every step in order and reports where the session ended up.
    ///
    /// Steps after the session finishes are skipped.
    pub(crate) fn run(mut self, steps: &[String]) -> Result<Finale, AppError> {
        if let Some(outcome) = self.settle() {
            return Ok(Finale::Finished(outcome));
        }
        self.session.root_displayed();

        for (index, raw) in steps.iter().enumerate() {
            let step = match StepCommand::parse(raw) {
                StepCommand::Back => self.session.guard(Session::back),
                StepCommand::Cancel => self.session.guard(Session::cancel),
                StepCommand::Open(name) => match self.resolve(name)? {
                    Some(child) => self.session.guard(|session| session.open(&child)),
                    None => Step::Ignored,
                },
            };
            debug!(
                target: "picker_cli::replay",
                event = "step_replayed",
                step = %raw,
                depth = self.session.depth(),
                "replayed step"
            );
            if matches!(step, Step::Finished(_)) || self.settle().is_some() {
                let skipped = steps.len() - index - 1;
                if skipped > 0 {
                    warn!(
                        target: "picker_cli::replay",
                        event = "steps_skipped",
                        skipped,
                        "session finished before every step ran"
                    );
                }
                break;
            }
        }

        if let Some(outcome) = self.finished() {
            return Ok(Finale::Finished(outcome));
        }
        self.await_current();
        if let Some(outcome) = self.surface_failure() {
            return Ok(Finale::Finished(outcome));
        }
        Ok(Finale::Browsing(ListingView::from_node(&self.session.current())))
    }

    /// Finds `name` among the children of the node on screen.
    ///
    /// Returns `Ok(None)` when a failure ended the session while waiting for
    /// the listing.
    fn resolve(&mut self, name: &str) -> Result<Option<ChildRef>, AppError> {
        self.await_current();
        if self.surface_failure().is_some() {
            return Ok(None);
        }
        let current = self.session.current();
        if current.is_loading() {
            return Err(AppError::StillLoading {
                step: name.to_owned(),
                title: current.title().to_owned(),
            });
        }
        current
            .child_named(name)
            .map(Some)
            .ok_or_else(|| AppError::UnknownStep {
                step: name.to_owned(),
                title: current.title().to_owned(),
            })
    }

    /// Pumps one admission window and surfaces any reported failure.
    fn settle(&mut self) -> Option<SessionOutcome> {
        self.dispatcher.pump(self.window);
        self.surface_failure()
    }

    /// Pumps single fetches until the node on screen is loaded or the queue
    /// runs dry.
    fn await_current(&self) {
        let current = self.session.current();
        while current.is_loading() && self.dispatcher.pump(1) > 0 {}
    }

    fn surface_failure(&mut self) -> Option<SessionOutcome> {
        match self.session.poll() {
            Step::Finished(outcome) => Some(outcome),
            Step::Display(_) | Step::Ignored => self.finished(),
        }
    }

    fn finished(&self) -> Option<SessionOutcome> {
        self.session.outcome().cloned()
    }
}
