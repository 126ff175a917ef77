//! Rendering of session results and node listings.
//!
//! A finished session always prints its [`SessionResult`] as JSON. A session
//! still browsing prints the node on screen, either as text for terminals or
//! as a JSON listing for pipelines.

use std::io::{self, Write};

use clap::ValueEnum;
use picker_core::{ChildRef, Node, SessionResult};
use serde::Serialize;

/// Output format selection for listings.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Selects `human` for terminal output and `json` for redirected output.
    #[default]
    Auto,
    /// Always render human-readable output.
    Human,
    /// Always emit JSON.
    Json,
}

/// Output format after resolving `auto` based on TTY detection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolvedOutputFormat {
    /// Indented text listing.
    Human,
    /// Single-line JSON documents.
    Json,
}

impl OutputFormat {
    /// Resolves the output format based on whether stdout is a terminal.
    #[must_use]
    pub const fn resolve(self, stdout_is_terminal: bool) -> ResolvedOutputFormat {
        match self {
            Self::Auto => {
                if stdout_is_terminal {
                    ResolvedOutputFormat::Human
                } else {
                    ResolvedOutputFormat::Json
                }
            }
            Self::Human => ResolvedOutputFormat::Human,
            Self::Json => ResolvedOutputFormat::Json,
        }
    }
}

/// Kind of a listed entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Can be opened.
    Container,
    /// Selecting it ends the session.
    Leaf,
}

/// One child of a listed node.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct EntryView {
    /// Display name.
    pub name: String,
    /// Container key or leaf identifier.
    pub id: String,
    /// Whether the entry opens or selects.
    pub kind: EntryKind,
}

impl From<&ChildRef> for EntryView {
    fn from(child: &ChildRef) -> Self {
        match child {
            ChildRef::Leaf(payload) => Self {
                name: payload.name.clone(),
                id: payload.id.clone(),
                kind: EntryKind::Leaf,
            },
            ChildRef::Container(container) => Self {
                name: container.name().to_owned(),
                id: container.key().as_str().to_owned(),
                kind: EntryKind::Container,
            },
        }
    }
}

/// Snapshot of the node on screen.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    /// Main heading.
    pub title: String,
    /// Secondary heading, when one is shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Whether a back arrow is shown.
    pub show_arrow: bool,
    /// Whether the node's children are still outstanding.
    pub loading: bool,
    /// Children in arrival order.
    pub children: Vec<EntryView>,
}

impl ListingView {
    /// Captures the presentation and children of `node`.
    #[must_use]
    pub fn from_node(node: &Node) -> Self {
        let presentation = node.presentation();
        Self {
            title: presentation.title,
            subtitle: presentation.subtitle,
            show_arrow: presentation.show_arrow,
            loading: node.is_loading(),
            children: node.children().iter().map(EntryView::from).collect(),
        }
    }
}

/// Writes `listing` to `out` in the requested format.
///
/// # Errors
///
/// Returns an I/O error when writing fails; JSON encoding errors are
/// surfaced as [`io::ErrorKind::InvalidData`].
pub fn write_listing<W: Write>(
    out: &mut W,
    listing: &ListingView,
    format: ResolvedOutputFormat,
) -> io::Result<()> {
    match format {
        ResolvedOutputFormat::Json => {
            serde_json::to_writer(&mut *out, listing).map_err(io::Error::from)?;
            writeln!(out)
        }
        ResolvedOutputFormat::Human => {
            writeln!(out, "{}", listing.title)?;
            if let Some(subtitle) = &listing.subtitle {
                let arrow = if listing.show_arrow { "< " } else { "" };
                writeln!(out, "{arrow}{subtitle}")?;
            }
            if listing.loading {
                return writeln!(out, "  (loading)");
            }
            if listing.children.is_empty() {
                return writeln!(out, "  (empty)");
            }
            for entry in &listing.children {
                match entry.kind {
                    EntryKind::Container => writeln!(out, "  {}/", entry.name)?,
                    EntryKind::Leaf => writeln!(out, "  {}", entry.name)?,
                }
            }
            Ok(())
        }
    }
}

/// Writes the terminal result of a session as JSON.
///
/// Terminals get the pretty-printed form.
///
/// # Errors
///
/// Returns an I/O error when writing fails.
pub fn write_result<W: Write>(
    out: &mut W,
    result: &SessionResult,
    format: ResolvedOutputFormat,
) -> io::Result<()> {
    match format {
        ResolvedOutputFormat::Json => serde_json::to_writer(&mut *out, result),
        ResolvedOutputFormat::Human => serde_json::to_writer_pretty(&mut *out, result),
    }
    .map_err(io::Error::from)?;
    writeln!(out)
}
