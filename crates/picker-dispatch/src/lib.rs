//! Reference fetch engine for the picker navigation controller.
//!
//! The controller hands every discovered container to its dispatcher straight
//! away and never bounds the fan-out itself. This crate supplies a dispatcher
//! that does: [`QueueDispatcher`] keeps discovered containers in a queue,
//! moves escalated ones to the front, and only fetches when the host pumps it
//! with an admission limit.
//!
//! Listings come from a [`TreeSource`]. [`FixtureTree`] is an in-memory
//! source loaded from a JSON document, used by the CLI and by tests.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use picker_core::{Credential, NavigationController, RootLabels};
//! use picker_dispatch::{FixtureTree, QueueDispatcher};
//!
//! let tree = FixtureTree::from_json(
//!     r#"{ "items": [{ "type": "notebook", "id": "nb", "name": "Work" }] }"#,
//! )?;
//! let dispatcher = Arc::new(QueueDispatcher::new(tree));
//! let controller = NavigationController::new(dispatcher.clone(), RootLabels::default());
//! let root = controller.initialize(Credential::new("token"))?;
//!
//! dispatcher.pump(4);
//! assert_eq!(root.children().len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod fixture;
pub mod queue;
pub mod source;

#[cfg(test)]
mod tests;

pub use self::error::{FetchError, FixtureError};
pub use self::fixture::FixtureTree;
pub use self::queue::QueueDispatcher;
pub use self::source::{RemoteItem, TreeSource, classify};
