//! Behavioural tests for the prefetch queue using `rstest-bdd`.

use std::cell::RefCell;
use std::sync::Arc;

use picker_core::{Credential, FatalError, NavigationController, Node, NodeKey, RootLabels};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::json;

use crate::fixture::FixtureTree;
use crate::queue::QueueDispatcher;

struct Running {
    dispatcher: Arc<QueueDispatcher<FixtureTree>>,
    controller: NavigationController,
    root: Arc<Node>,
}

#[derive(Default)]
struct TestWorld {
    running: Option<Running>,
    fatal: Option<FatalError>,
}

impl TestWorld {
    fn start(&mut self, document: &serde_json::Value) {
        let tree = FixtureTree::from_json(&document.to_string())
            .unwrap_or_else(|error| panic!("bad fixture: {error}"));
        let dispatcher = Arc::new(QueueDispatcher::new(tree));
        let controller = NavigationController::new(dispatcher.clone(), RootLabels::default());
        let root = controller
            .initialize(Credential::new("token"))
            .unwrap_or_else(|error| panic!("initialise failed: {error}"));
        self.running = Some(Running {
            dispatcher,
            controller,
            root,
        });
    }

    fn running(&self) -> &Running {
        self.running
            .as_ref()
            .unwrap_or_else(|| panic!("no fixture tree loaded"))
    }

    fn container(&self, name: &str) -> Arc<Node> {
        self.running()
            .controller
            .cached(&NodeKey::from(name))
            .unwrap_or_else(|| panic!("container {name} was never discovered"))
    }

    fn collect_fatal(&mut self) {
        if self.fatal.is_none() {
            self.fatal = self.running().controller.take_fatal_error();
        }
    }
}

fn notebook(name: &str) -> serde_json::Value {
    json!({
        "type": "notebook",
        "id": name,
        "name": name,
        "items": [{ "type": "section", "id": format!("{name}-inbox"), "name": "Inbox" }]
    })
}

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

#[given("a fixture tree with notebooks \"{first}\" and \"{second}\"")]
fn given_two_notebooks(world: &RefCell<TestWorld>, first: String, second: String) {
    let document = json!({ "items": [notebook(&first), notebook(&second)] });
    world.borrow_mut().start(&document);
}

#[given("a fixture tree where notebook \"{name}\" fails with code \"{code}\"")]
fn given_failing_notebook(world: &RefCell<TestWorld>, name: String, code: String) {
    let document = json!({
        "items": [{
            "type": "notebook",
            "id": name,
            "name": name,
            "error": { "code": code, "message": "listing rejected" }
        }]
    });
    world.borrow_mut().start(&document);
}

#[given("a fixture tree whose root fails with code \"{code}\"")]
fn given_failing_root(world: &RefCell<TestWorld>, code: String) {
    let document = json!({ "error": { "code": code, "message": "token expired" } });
    world.borrow_mut().start(&document);
}

#[given("the root listing has been fetched")]
fn given_root_fetched(world: &RefCell<TestWorld>) {
    let world = world.borrow();
    assert_eq!(world.running().dispatcher.pump(1), 1);
    assert!(!world.running().root.is_loading());
}

#[when("the queue is drained")]
fn when_drained(world: &RefCell<TestWorld>) {
    let mut world = world.borrow_mut();
    world.running().dispatcher.drain();
    world.collect_fatal();
}

#[when("the queue is pumped once")]
fn when_pumped_once(world: &RefCell<TestWorld>) {
    let mut world = world.borrow_mut();
    world.running().dispatcher.pump(1);
    world.collect_fatal();
}

#[when("the user opens \"{name}\"")]
fn when_user_opens(world: &RefCell<TestWorld>, name: String) {
    let world = world.borrow();
    let running = world.running();
    let child = running
        .root
        .child_named(&name)
        .unwrap_or_else(|| panic!("root has no child named {name}"));
    running
        .controller
        .navigate_into(&running.root, &child)
        .unwrap_or_else(|error| panic!("navigate failed: {error}"));
}

#[then("every container is loaded")]
fn then_all_loaded(world: &RefCell<TestWorld>) {
    let world = world.borrow();
    let running = world.running();
    assert!(!running.root.is_loading());
    for child in running.root.children() {
        if let Some(key) = child.container_key() {
            assert!(!world.container(key.as_str()).is_loading(), "{key} still loading");
        }
    }
    assert!(running.dispatcher.is_idle());
}

#[then("container \"{name}\" is loaded")]
fn then_container_loaded(world: &RefCell<TestWorld>, name: String) {
    assert!(!world.borrow().container(&name).is_loading());
}

#[then("container \"{name}\" is still loading")]
fn then_container_loading(world: &RefCell<TestWorld>, name: String) {
    assert!(world.borrow().container(&name).is_loading());
}

#[then("no session-ending failure was reported")]
fn then_no_fatal(world: &RefCell<TestWorld>) {
    let world = world.borrow();
    assert!(world.fatal.is_none(), "unexpected failure: {:?}", world.fatal);
}

#[then("the session-ending failure has API code \"{code}\"")]
fn then_fatal_code(world: &RefCell<TestWorld>, code: String) {
    let world = world.borrow();
    match world.fatal.as_ref() {
        Some(FatalError::Api(failure)) => assert_eq!(failure.code, code),
        other => panic!("expected api failure, got {other:?}"),
    }
}

#[scenario(
    path = "tests/features/prefetch_queue.feature",
    name = "The whole discovered tree is fetched without navigation"
)]
fn whole_tree_prefetched(#[from(world)] _: RefCell<TestWorld>) {}

#[scenario(
    path = "tests/features/prefetch_queue.feature",
    name = "An opened container is fetched before its siblings"
)]
fn opened_container_first(#[from(world)] _: RefCell<TestWorld>) {}

#[scenario(
    path = "tests/features/prefetch_queue.feature",
    name = "A failed container listing stays loading"
)]
fn failed_listing_stays_loading(#[from(world)] _: RefCell<TestWorld>) {}

#[scenario(
    path = "tests/features/prefetch_queue.feature",
    name = "A failed root listing ends the session"
)]
fn failed_root_ends_session(#[from(world)] _: RefCell<TestWorld>) {}
