//! Diagram rendering engine for dirgram.
//!
//! Any tree-shaped data can be drawn once it implements [`TreeSource`]:
//! real directories ([`FsSource`]), synthetic trees ([`SyntheticSource`])
//! or an ad-hoc handle type wrapped in closures ([`FnSource`]).
//!
//! # Example
//!
//! ```rust
//! use dirgram_core::{NodeKind, RenderConfig, SyntheticTree};
//! use dirgram_render::render_synthetic;
//!
//! let mut tree = SyntheticTree::new();
//! let root = tree.new_root(NodeKind::Container, "root");
//! tree.create_leaf(root, "a.txt").unwrap();
//!
//! let text = render_synthetic(&tree, root, &RenderConfig::default()).unwrap();
//! assert_eq!(text, "root/\n└─a.txt");
//! ```
//!
//! Rendering a directory on disk:
//!
//! ```rust,no_run
//! use dirgram_core::{Beyond, RenderConfig};
//! use dirgram_render::render_path;
//!
//! let config = RenderConfig::builder()
//!     .depth_limit(2usize)
//!     .beyond(Beyond::Counts)
//!     .sort(true)
//!     .build()
//!     .unwrap();
//! println!("{}", render_path(".", &config).unwrap());
//! ```

mod capture;
mod engine;
mod listing;
mod sort;
mod source;

pub use capture::capture;
pub use engine::{render, render_path, render_synthetic};
pub use sort::{natural_cmp, sort_by_name};
pub use source::{FnSource, FsSource, SyntheticSource, TreeSource};

// Re-export core types for convenience
pub use dirgram_core::{RenderConfig, RenderError};
