//! Contract of the asynchronous fetch engine consumed by the controller.

use std::fmt;
use std::sync::Arc;

use crate::controller::FatalErrorReporter;
use crate::key::NodeKey;
use crate::node::Node;

/// Opaque access token forwarded to the dispatcher.
///
/// The value never appears in `Debug` output or telemetry.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps an access token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for use in outbound requests.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Fetch engine that fills [`Node`]s with their children.
///
/// Implementations perform fetches asynchronously and report each result by
/// calling [`Node::deliver`] on the node they were handed. Admission control
/// and any bound on concurrent fetches belong to the implementation; the
/// controller hands over every container it discovers.
pub trait Dispatcher: Send + Sync {
    /// Starts the session by fetching the root listing.
    ///
    /// Called exactly once per controller. Failures that cannot be pinned to
    /// a single node, including a failure of this root fetch, go to `errors`.
    fn begin(&self, root: Arc<Node>, credential: Credential, errors: FatalErrorReporter);

    /// Starts fetching a newly discovered container at default priority.
    ///
    /// Only nodes registered in the controller's cache are passed here.
    fn fetch(&self, node: Arc<Node>);

    /// Hints that `key` is now on screen and should be fetched sooner.
    ///
    /// Best effort: unknown or already completed keys are ignored.
    fn prioritize(&self, key: &NodeKey);
}

impl fmt::Debug for dyn Dispatcher {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("Dispatcher")
    }
}
