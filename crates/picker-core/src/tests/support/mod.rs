//! Shared fixtures and helpers for controller tests.

mod recording_dispatcher;
mod world;

use std::sync::Arc;

use rstest::fixture;

use crate::controller::{NavigationController, RootLabels};
use crate::item::{ChildRef, ContainerKind};

pub use recording_dispatcher::{CallKind, RecordingDispatcher};
pub use world::TestWorld;

/// Controller wired to a fresh recording dispatcher.
#[fixture]
pub fn harness() -> (RecordingDispatcher, NavigationController) {
    let dispatcher = RecordingDispatcher::new();
    let controller = NavigationController::new(Arc::new(dispatcher.clone()), RootLabels::default());
    (dispatcher, controller)
}

/// Builds a notebook entry keyed and named `name`.
pub fn notebook(name: &str) -> ChildRef {
    ChildRef::container(name, name, ContainerKind::Notebook)
}

/// Builds a section group entry keyed and named `name`.
pub fn section_group(name: &str) -> ChildRef {
    ChildRef::container(name, name, ContainerKind::SectionGroup)
}

/// Builds a leaf entry with identifier `id`.
pub fn section(id: &str, name: &str) -> ChildRef {
    ChildRef::leaf(id, name)
}
