//! Crate-level integration and BDD tests.

use std::sync::Arc;

use picker_core::{Credential, NavigationController, NodeKey, RootLabels};

use crate::fixture::FixtureTree;
use crate::queue::QueueDispatcher;

mod behaviour;

#[test]
fn end_to_end_queue_over_fixture() {
    let tree = FixtureTree::from_json(
        r#"{ "items": [
            { "type": "notebook", "id": "nb", "name": "Work", "items": [
                { "type": "section", "id": "s", "name": "Inbox" }
            ] }
        ] }"#,
    )
    .unwrap_or_else(|error| panic!("bad fixture: {error}"));
    let dispatcher = Arc::new(QueueDispatcher::new(tree));
    let controller = NavigationController::new(dispatcher.clone(), RootLabels::default());
    controller
        .initialize(Credential::new("token"))
        .unwrap_or_else(|error| panic!("initialise failed: {error}"));

    assert_eq!(dispatcher.drain(), 2);

    let notebook = controller
        .cached(&NodeKey::from("nb"))
        .unwrap_or_else(|| panic!("nb should be cached"));
    assert_eq!(
        notebook.child_named("Inbox").map(|child| child.display_name().to_owned()),
        Some(String::from("Inbox"))
    );
}
