//! Core types for dirgram.
//!
//! This crate provides the data structures shared by the renderer and the
//! parser: synthetic trees, render configuration, style tokens and errors.

mod config;
mod error;
mod node;
mod realize;
mod style;
mod tree;

pub use config::{
    Beyond, ConfigOverride, FirstKind, Formatter, ItemLimit, Mask, Pattern, RenderConfig,
    RenderConfigBuilder, RenderConfigBuilderError, SortKey,
};
pub use error::{ConfigError, ListError, ListErrorKind, RealizeError, RenderError, TreeError};
pub use node::{Entry, NodeBody, NodeId, NodeKind, SyntheticNode};
pub use realize::realize;
pub use style::{Style, StyleTokens};
pub use tree::{Descendants, SyntheticTree, TreeSnapshot};
