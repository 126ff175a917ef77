//! In-memory tree loaded from a JSON document.
//!
//! The document nests containers inside containers:
//!
//! ```json
//! {
//!   "items": [
//!     { "type": "notebook", "id": "nb-1", "name": "Work", "items": [
//!       { "type": "section", "id": "s-1", "name": "Inbox" }
//!     ] },
//!     { "type": "notebook", "id": "nb-2", "name": "Broken",
//!       "error": { "code": "500", "message": "backend unavailable" } }
//!   ]
//! }
//! ```
//!
//! A container, or the document itself, may carry an `error` instead of
//! items. Setting `"transport": true` on an error simulates a request that
//! never produced an answer rather than a structured service failure.

use std::collections::HashMap;

use camino::Utf8Path;
use picker_core::{ApiFailure, Credential, LeafPayload, NodeKey};
use serde::Deserialize;

use crate::error::{FetchError, FixtureError};
use crate::source::{RemoteItem, TreeSource};

const ROOT_URL: &str = "fixture:///notebooks";

#[derive(Debug, Deserialize)]
struct FixtureDocument {
    #[serde(default)]
    items: Vec<FixtureEntry>,
    #[serde(default)]
    error: Option<FixtureFailure>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum FixtureEntry {
    Notebook(FixtureContainer),
    SectionGroup(FixtureContainer),
    Section(LeafPayload),
    #[serde(other)]
    Unrecognized,
}

#[derive(Debug, Deserialize)]
struct FixtureContainer {
    id: String,
    name: String,
    #[serde(default)]
    items: Vec<FixtureEntry>,
    #[serde(default)]
    error: Option<FixtureFailure>,
}

#[derive(Debug, Clone, Deserialize)]
struct FixtureFailure {
    code: String,
    message: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    transport: bool,
}

impl FixtureFailure {
    fn to_fetch_error(&self, default_url: &str) -> FetchError {
        if self.transport {
            return FetchError::transport(self.message.clone());
        }
        let url = self.url.clone().unwrap_or_else(|| default_url.to_owned());
        FetchError::Api(ApiFailure::new(
            self.code.clone(),
            self.message.clone(),
            url,
        ))
    }
}

#[derive(Debug, Clone)]
enum Listing {
    Items(Vec<RemoteItem>),
    Failure(FixtureFailure),
}

impl Listing {
    fn build(items: Vec<FixtureEntry>, error: Option<FixtureFailure>) -> (Self, Vec<Pending>) {
        if let Some(failure) = error {
            return (Self::Failure(failure), Vec::new());
        }
        let mut remote = Vec::with_capacity(items.len());
        let mut nested = Vec::new();
        for entry in items {
            match entry {
                FixtureEntry::Notebook(container) => {
                    remote.push(RemoteItem::Notebook {
                        id: container.id.clone(),
                        name: container.name.clone(),
                    });
                    nested.push(Pending::from(container));
                }
                FixtureEntry::SectionGroup(container) => {
                    remote.push(RemoteItem::SectionGroup {
                        id: container.id.clone(),
                        name: container.name.clone(),
                    });
                    nested.push(Pending::from(container));
                }
                FixtureEntry::Section(payload) => remote.push(RemoteItem::Section(payload)),
                FixtureEntry::Unrecognized => remote.push(RemoteItem::Unrecognized),
            }
        }
        (Self::Items(remote), nested)
    }

    fn answer(&self, default_url: &str) -> Result<Vec<RemoteItem>, FetchError> {
        match self {
            Self::Items(items) => Ok(items.clone()),
            Self::Failure(failure) => Err(failure.to_fetch_error(default_url)),
        }
    }
}

struct Pending {
    key: NodeKey,
    items: Vec<FixtureEntry>,
    error: Option<FixtureFailure>,
}

impl From<FixtureContainer> for Pending {
    fn from(container: FixtureContainer) -> Self {
        Self {
            key: NodeKey::new(container.id),
            items: container.items,
            error: container.error,
        }
    }
}

/// [`TreeSource`] answering from a fixed, fully materialised tree.
#[derive(Debug, Clone)]
pub struct FixtureTree {
    root: Listing,
    containers: HashMap<NodeKey, Listing>,
}

impl FixtureTree {
    /// Parses a fixture document.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Parse`] when the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        let document: FixtureDocument = serde_json::from_str(json).map_err(FixtureError::parse)?;
        Ok(Self::from_document(document))
    }

    /// Reads and parses a fixture file.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Read`] when the file cannot be read and
    /// [`FixtureError::Parse`] when its contents are malformed.
    pub fn from_path(path: &Utf8Path) -> Result<Self, FixtureError> {
        let json = std::fs::read_to_string(path).map_err(|source| FixtureError::Read {
            path: path.to_owned(),
            source: source.into(),
        })?;
        Self::from_json(&json)
    }

    fn from_document(document: FixtureDocument) -> Self {
        let (root, mut queue) = Listing::build(document.items, document.error);
        let mut containers = HashMap::new();
        while let Some(pending) = queue.pop() {
            if containers.contains_key(&pending.key) {
                continue;
            }
            let (listing, nested) = Listing::build(pending.items, pending.error);
            containers.insert(pending.key, listing);
            queue.extend(nested);
        }
        Self { root, containers }
    }

    /// Number of containers described by the fixture.
    #[must_use]
    pub fn container_count(&self) -> usize {
        self.containers.len()
    }
}

impl TreeSource for FixtureTree {
    fn list_root(&self, _credential: &Credential) -> Result<Vec<RemoteItem>, FetchError> {
        self.root.answer(ROOT_URL)
    }

    fn list_children(
        &self,
        _credential: &Credential,
        key: &NodeKey,
    ) -> Result<Vec<RemoteItem>, FetchError> {
        let url = format!("fixture:///containers/{key}/children");
        self.containers.get(key).map_or_else(
            || {
                Err(FetchError::Api(ApiFailure::new(
                    "404",
                    format!("container '{key}' does not exist"),
                    url.clone(),
                )))
            },
            |listing| listing.answer(&url),
        )
    }
}
