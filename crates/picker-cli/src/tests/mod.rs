//! Runtime tests driving [`run_with_loader`] with in-memory streams.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use picker_config::Config;
use rstest::{fixture, rstest};
use tempfile::NamedTempFile;

use crate::config::ConfigLoader;
use crate::errors::AppError;
use crate::{IoStreams, run_with_loader};


pub(crate) const TREE: &str = r#"{
    "items": [
        { "type": "notebook", "id": "work", "name": "Work", "items": [
            { "type": "section", "id": "s-inbox", "name": "Inbox",
              "pagesUrl": "fixture:///sections/s-inbox/pages" }
        ] },
        { "type": "section", "id": "s-loose", "name": "Loose" }
    ]
}"#;

/// Hands out a fixed configuration and records what it was asked to load.
pub(crate) struct StaticLoader {
    config: Config,
}

impl StaticLoader {
    pub(crate) fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        self.config.validate()?;
        Ok(self.config.clone())
    }
}

/// Output captured from one runtime invocation.
#[derive(Debug)]
pub(crate) struct Captured {
    pub(crate) exit: ExitCode,
    pub(crate) stdout: String,
    pub(crate) stderr: String,
}

pub(crate) fn write_tree(document: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap_or_else(|error| panic!("tempfile: {error}"));
    file.write_all(document.as_bytes())
        .unwrap_or_else(|error| panic!("write fixture: {error}"));
    file
}

pub(crate) fn invoke(loader: &StaticLoader, args: &[&str]) -> Captured {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = {
        let mut io = IoStreams::new(&mut stdout, &mut stderr, false);
        run_with_loader(args.iter().map(OsString::from), &mut io, loader)
    };
    Captured {
        exit,
        stdout: String::from_utf8(stdout).unwrap_or_else(|error| panic!("stdout: {error}")),
        stderr: String::from_utf8(stderr).unwrap_or_else(|error| panic!("stderr: {error}")),
    }
}

#[fixture]
fn tree_file() -> NamedTempFile {
    write_tree(TREE)
}

fn tree_path(file: &NamedTempFile) -> &str {
    file.path()
        .to_str()
        .unwrap_or_else(|| panic!("temporary path is not UTF-8"))
}

fn loader() -> StaticLoader {
    StaticLoader::new(Config::default().with_prefetch_window(1))
}

#[rstest]
fn selecting_a_leaf_prints_the_selection(tree_file: NamedTempFile) {
    let captured = invoke(
        &loader(),
        &["picker", "--tree", tree_path(&tree_file), "Work", "Inbox"],
    );

    assert_eq!(captured.exit, ExitCode::SUCCESS);
    let result: serde_json::Value = serde_json::from_str(&captured.stdout)
        .unwrap_or_else(|error| panic!("stdout is not JSON: {error}"));
    assert_eq!(result["selection"]["id"], "s-inbox");
    assert_eq!(
        result["selection"]["pagesUrl"],
        "fixture:///sections/s-inbox/pages"
    );
}

#[rstest]
fn cancelling_exits_with_one(tree_file: NamedTempFile) {
    let captured = invoke(&loader(), &["picker", "--tree", tree_path(&tree_file), "!cancel"]);

    assert_eq!(captured.exit, ExitCode::from(1));
    assert_eq!(captured.stdout.trim(), r#"{"cancelled":true}"#);
}

#[rstest]
fn human_listing_of_an_opened_container(tree_file: NamedTempFile) {
    let captured = invoke(
        &loader(),
        &[
            "picker",
            "--tree",
            tree_path(&tree_file),
            "--output",
            "human",
            "Work",
        ],
    );

    assert_eq!(captured.exit, ExitCode::SUCCESS);
    assert_eq!(captured.stdout, "Work\n< Notebooks\n  Inbox\n");
}

#[rstest]
fn root_labels_come_from_configuration(tree_file: NamedTempFile) {
    let loader = StaticLoader::new(Config::default().with_root_labels("Shelves", "Library"));

    let captured = invoke(
        &loader,
        &["picker", "--tree", tree_path(&tree_file), "--output", "human"],
    );

    assert_eq!(captured.stdout, "Shelves\nLibrary\n  Work/\n  Loose\n");
}

#[rstest]
fn api_failures_exit_with_two() {
    let file = write_tree(r#"{ "error": { "code": "401", "message": "token expired" } }"#);

    let captured = invoke(&loader(), &["picker", "--tree", tree_path(&file)]);

    assert_eq!(captured.exit, ExitCode::from(2));
    let result: serde_json::Value = serde_json::from_str(&captured.stdout)
        .unwrap_or_else(|error| panic!("stdout is not JSON: {error}"));
    assert_eq!(result["cancelled"], false);
    assert_eq!(result["apiError"]["code"], "401");
    assert_eq!(result["apiError"]["url"], "fixture:///notebooks");
}

#[rstest]
fn unknown_steps_are_usage_failures(tree_file: NamedTempFile) {
    let captured = invoke(&loader(), &["picker", "--tree", tree_path(&tree_file), "Personal"]);

    assert_eq!(captured.exit, ExitCode::from(2));
    assert!(captured.stdout.is_empty());
    assert!(
        captured.stderr.contains("'Notebooks' has no entry named 'Personal'"),
        "stderr: {}",
        captured.stderr
    );
}

#[rstest]
fn missing_tree_files_are_reported() {
    let captured = invoke(&loader(), &["picker", "--tree", "/nonexistent/tree.json"]);

    assert_eq!(captured.exit, ExitCode::from(2));
    assert!(captured.stderr.contains("failed to load tree"), "stderr: {}", captured.stderr);
}

#[rstest]
fn missing_tree_flag_is_a_usage_error() {
    let captured = invoke(&loader(), &["picker", "Work"]);

    assert_eq!(captured.exit, ExitCode::from(2));
    assert!(captured.stderr.contains("--tree"), "stderr: {}", captured.stderr);
}

#[rstest]
fn invalid_configuration_is_rejected(tree_file: NamedTempFile) {
    let loader = StaticLoader::new(Config::default().with_prefetch_window(0));

    let captured = invoke(&loader, &["picker", "--tree", tree_path(&tree_file)]);

    assert_eq!(captured.exit, ExitCode::from(2));
    assert!(
        captured.stderr.contains("prefetch window"),
        "stderr: {}",
        captured.stderr
    );
}

#[rstest]
fn help_is_printed_to_stdout() {
    let captured = invoke(&loader(), &["picker", "--help"]);

    assert_eq!(captured.exit, ExitCode::SUCCESS);
    assert!(captured.stdout.contains("--tree"));
    assert!(captured.stderr.is_empty());
}
