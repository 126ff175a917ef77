//! Navigation and prefetch controller for browsing a remote item tree.
#![deny(missing_docs)]
//!
//! A session starts from an unkeyed root [`Node`] and discovers the rest of
//! the tree as listings arrive. Every container seen in any delivered batch is
//! registered in the controller's node cache and handed to the [`Dispatcher`] straight
//! away, so by the time the user opens a container its children have usually
//! arrived. Opening a container that is still loading escalates its fetch.
//!
//! The [`NavigationController`] owns the cache and the dispatcher handle and
//! outlives any transient view. The [`Session`] shell keeps the linear view
//! stack and surfaces exactly one [`SessionOutcome`]. Fetching itself lives
//! behind the [`Dispatcher`] trait so tests and hosts can inject their own
//! engine.

mod cache;
mod controller;
mod dispatcher;
mod errors;
mod item;
mod key;
mod node;
mod outcome;
mod session;

pub use cache::Registration;
pub use controller::{FatalErrorReporter, Navigation, NavigationController, RootLabels};
pub use dispatcher::{Credential, Dispatcher};
pub use errors::{ApiFailure, BatchError, ControllerError, FatalError, PanicFailure, SystemFailure};
pub use item::{ChildKind, ChildRef, ContainerKind, ContainerRef, LeafPayload};
pub use key::NodeKey;
pub use node::{Discard, DeliveryOutcome, Node, NodeObserver, NodeState, Presentation};
pub use outcome::{SessionOutcome, SessionResult};
pub use session::{Session, SessionPhase, Step};

#[cfg(test)]
mod tests;
