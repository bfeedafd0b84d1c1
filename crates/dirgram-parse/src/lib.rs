//! Read text tree diagrams back into synthetic trees.
//!
//! The parser understands the output of `dirgram` in every built-in style
//! as well as most hand-drawn or `tree`-command diagrams.
//!
//! # Example
//!
//! ```rust
//! use dirgram_parse::parse;
//!
//! let (tree, root) = parse("mypkg/\n    __init__.py\n    test/\n        test_app.py").unwrap();
//! assert_eq!(tree.child_names(root), ["__init__.py", "test"]);
//! ```

mod options;
mod parser;

pub use options::{ParseOptions, ParseOptionsBuilder, ParseOptionsBuilderError};
pub use options::{default_name_chars, default_start_chars};
pub use parser::{ParseError, parse, parse_with};
