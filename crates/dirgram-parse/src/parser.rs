//! Diagram text to synthetic tree.

use regex::Regex;
use thiserror::Error;
use tracing::{debug, trace};

use dirgram_core::{NodeId, NodeKind, SyntheticTree, TreeError};

use crate::options::ParseOptions;

/// Errors raised while reading a diagram.
#[derive(Debug, Error)]
pub enum ParseError {
    /// No line of the text held a recognizable name.
    #[error("No entries found in diagram")]
    Empty,

    /// A caller-supplied header or name regex does not compile.
    #[error("Invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The diagram names the same child twice under one parent.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// One recognized line of the diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Line<'a> {
    /// Header width in characters.
    depth: usize,
    /// Name as written, trailing separators included.
    name: &'a str,
}

impl Line<'_> {
    fn has_trailing_separator(&self) -> bool {
        self.name.ends_with(['/', '\\'])
    }

    fn bare_name(&self) -> &str {
        self.name.trim_end_matches(['/', '\\'])
    }
}

/// Compiled form of the header and name rules.
struct Scanner<'o> {
    options: &'o ParseOptions,
    header: Option<Regex>,
    name: Option<Regex>,
}

impl<'o> Scanner<'o> {
    fn new(options: &'o ParseOptions) -> Result<Self, ParseError> {
        Ok(Self {
            options,
            header: options.header_regex.as_deref().map(anchored).transpose()?,
            name: options.name_regex.as_deref().map(anchored).transpose()?,
        })
    }

    /// Split a line into header width and name, or skip it.
    fn scan<'a>(&self, line: &'a str) -> Option<Line<'a>> {
        let header_end = match &self.header {
            Some(re) => re.find(line)?.end(),
            None => line.find(|c| self.options.is_start_char(c))?,
        };
        let (header, rest) = line.split_at(header_end);

        let raw = match &self.name {
            Some(re) => re.find(rest)?.as_str(),
            None => {
                let body = rest
                    .find(|c| !self.options.is_name_char(c))
                    .unwrap_or(rest.len());
                let slashes = rest[body..]
                    .find(|c| c != '/' && c != '\\')
                    .map_or(rest.len(), |n| body + n);
                &rest[..slashes]
            }
        };

        let name = match raw.find('#') {
            Some(idx) if self.options.parse_comments => raw[..idx].trim(),
            _ => raw,
        }
        .trim_end();

        if name.is_empty() {
            return None;
        }
        Some(Line {
            depth: header.chars().count(),
            name,
        })
    }
}

fn anchored(pattern: &str) -> Result<Regex, ParseError> {
    Regex::new(&format!("^(?:{pattern})")).map_err(|source| ParseError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Parse a diagram with default options.
pub fn parse(text: &str) -> Result<(SyntheticTree, NodeId), ParseError> {
    parse_with(text, &ParseOptions::default())
}

/// Parse a diagram into a synthetic tree, returning the tree and its root.
///
/// Header width orders lines; each line hangs under the nearest earlier
/// line with a narrower header. A line is a container when its name ends in
/// a separator or the next line is indented further. When the diagram has
/// several top-level lines, or indented lines before the first top-level
/// one, they are gathered under a synthesized root named
/// [`ParseOptions::super_name`].
pub fn parse_with(
    text: &str,
    options: &ParseOptions,
) -> Result<(SyntheticTree, NodeId), ParseError> {
    let scanner = Scanner::new(options)?;
    let lines: Vec<Line<'_>> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| scanner.scan(line))
        .collect();

    let min_depth = lines.iter().map(|l| l.depth).min().ok_or(ParseError::Empty)?;
    let first_top = lines.iter().position(|l| l.depth == min_depth).unwrap_or(0);
    let needs_super = lines.iter().filter(|l| l.depth == min_depth).count() > 1
        || first_top > 0;

    let mut tree = SyntheticTree::new();
    let super_root = needs_super.then(|| {
        debug!(name = %options.super_name, "diagram has no single root, adding one");
        tree.new_root(NodeKind::Container, options.super_name.as_str())
    });

    let mut root = super_root;
    // (depth, node) of the chain of open ancestors.
    let mut stack: Vec<(usize, NodeId)> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let deeper_next = lines.get(i + 1).is_some_and(|next| next.depth > line.depth);
        let kind = NodeKind::from_container_flag(line.has_trailing_separator() || deeper_next);

        while stack.last().is_some_and(|&(depth, _)| depth >= line.depth) {
            stack.pop();
        }
        let parent = stack.last().map(|&(_, id)| id).or(super_root);
        trace!(depth = line.depth, name = line.bare_name(), ?kind, "parsed line");

        let id = match parent {
            Some(parent) => match kind {
                NodeKind::Container => tree.create_container(parent, line.bare_name())?,
                NodeKind::Leaf => tree.create_leaf(parent, line.bare_name())?,
            },
            None => {
                let id = tree.new_root(kind, line.bare_name());
                root = Some(id);
                id
            }
        };
        stack.push((line.depth, id));
    }

    let root = root.ok_or(ParseError::Empty)?;
    Ok((tree, root))
}
