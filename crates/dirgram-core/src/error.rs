//! Error types for tree mutation, configuration, listing and rendering.

use std::path::PathBuf;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::node::NodeKind;

/// Errors raised by synthetic tree mutations.
///
/// A mutation that fails leaves the tree exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A sibling with the same name already exists under the target parent.
    #[error("Name collision: {parent} already has a child named {name:?}")]
    NameCollision {
        parent: CompactString,
        name: CompactString,
    },

    /// An operation needed a node of a different kind.
    #[error("{name:?} is a {actual}, expected a {expected}")]
    WrongKind {
        name: CompactString,
        expected: NodeKind,
        actual: NodeKind,
    },

    /// The handle does not refer to a live node.
    #[error("Node not found")]
    NodeNotFound,

    /// No child with the given name exists.
    #[error("{parent} has no child named {name:?}")]
    NoSuchChild {
        parent: CompactString,
        name: CompactString,
    },

    /// A `/`-separated lookup path did not resolve.
    #[error("Path {path:?} not found under {root}")]
    PathNotFound {
        root: CompactString,
        path: String,
    },

    /// Reparenting would make a node its own ancestor.
    #[error("Cannot move {name:?} underneath itself")]
    Cycle { name: CompactString },
}

/// Errors raised while building or validating a render configuration.
///
/// These are always reported before traversal starts (or, for values
/// introduced by a formatter override, before the affected node is drawn).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Unrecognized style name.
    #[error("Style {0:?} not recognized, must be one of lines, dash, spaces, plus, arrow or emoji")]
    UnknownStyle(String),

    /// Unrecognized style token key.
    #[error("Unknown style token {0:?}")]
    UnknownToken(String),

    /// Unrecognized beyond policy.
    #[error("Beyond policy {0:?} must be \"ellipsis\", \"content\" or a string starting with \"_\"")]
    InvalidBeyond(String),

    /// Unparsable item limit.
    #[error("Invalid item limit {0:?}")]
    InvalidItemLimit(String),

    /// A filter pattern is not a valid regular expression.
    #[error("Invalid pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Other invalid configuration.
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Classification of listing failures, matched against the
/// acceptable set of a render configuration.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ListErrorKind {
    /// Permission was denied.
    PermissionDenied,
    /// The container vanished or never existed.
    NotFound,
    /// The node cannot be listed because it is not a container.
    NotAContainer,
    /// Any other failure.
    Other,
}

/// Failure to enumerate the children of a container.
#[derive(Debug, Clone, Error)]
#[error("Cannot list {path}: {message}")]
pub struct ListError {
    /// Logical or real path of the container.
    pub path: PathBuf,
    /// Kind used for the tolerate-or-abort decision.
    pub kind: ListErrorKind,
    /// Human-readable message.
    pub message: String,
}

impl ListError {
    /// Create a listing error.
    pub fn new(path: impl Into<PathBuf>, kind: ListErrorKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }

    /// Create a listing error from an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: &std::io::Error) -> Self {
        let kind = match source.kind() {
            std::io::ErrorKind::PermissionDenied => ListErrorKind::PermissionDenied,
            std::io::ErrorKind::NotFound => ListErrorKind::NotFound,
            std::io::ErrorKind::NotADirectory => ListErrorKind::NotAContainer,
            _ => ListErrorKind::Other,
        };
        Self::new(path, kind, source.to_string())
    }
}

/// Errors that abort a render.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// The configuration (or a formatter override) is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A listing failed with a kind that is not tolerated.
    #[error(transparent)]
    Listing(#[from] ListError),

    /// Building a synthetic tree from a source failed.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Errors raised when materializing a synthetic tree on disk.
#[derive(Debug, Error)]
pub enum RealizeError {
    /// Target already exists.
    #[error("Already exists: {path}")]
    AlreadyExists { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A node name is not a single path component.
    #[error("Name {name:?} cannot be used as a file name")]
    InvalidName { name: CompactString },

    /// The node handle is stale.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

impl RealizeError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::AlreadyExists => Self::AlreadyExists { path },
            _ => Self::Io { path, source },
        }
    }
}
