//! Depth-first diagram renderer.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, trace};

use dirgram_core::{Entry, NodeId, NodeKind, RenderConfig, RenderError, StyleTokens, SyntheticTree};

use crate::listing::{Candidate, candidates, select};
use crate::source::{FsSource, SyntheticSource, TreeSource};

/// Render the tree below `root` as diagram text.
///
/// The configuration is validated before anything is listed. The result
/// has no trailing newline.
pub fn render<S: TreeSource>(
    source: &S,
    root: &S::Node,
    config: &RenderConfig,
) -> Result<String, RenderError> {
    config.validate()?;

    let name = source.name(root).into_owned();
    let kind = NodeKind::from_container_flag(source.is_container(root));
    let path = Path::new(&name).to_path_buf();
    let entry = Entry {
        name: &name,
        kind,
        depth: 0,
        path: &path,
    };
    let update = config.formatter.as_ref().and_then(|f| f.format(&entry));
    let effective = config.apply(update.as_ref())?;

    let mut renderer = Renderer {
        source,
        incomplete: BTreeSet::new(),
        lines: vec![decorated(&effective.tokens, kind, &name)],
    };
    if kind.is_container() {
        renderer.expand(root, 0, &path, config, &effective)?;
    }

    Ok(renderer.lines.join("\n").trim().to_string())
}

/// Render a real directory.
pub fn render_path(path: impl AsRef<Path>, config: &RenderConfig) -> Result<String, RenderError> {
    render(&FsSource::new(), &path.as_ref().to_path_buf(), config)
}

/// Render a node of a synthetic tree.
pub fn render_synthetic(
    tree: &SyntheticTree,
    root: NodeId,
    config: &RenderConfig,
) -> Result<String, RenderError> {
    render(&SyntheticSource::new(tree), &root, config)
}

struct Renderer<'s, S> {
    source: &'s S,
    /// Depths that still have siblings left to draw.
    incomplete: BTreeSet<usize>,
    lines: Vec<String>,
}

impl<S: TreeSource> Renderer<'_, S> {
    /// Draw the children of a container whose own line is already emitted.
    ///
    /// `inherited` is the config handed down by the parent, `effective` the
    /// one this node was drawn with after its own formatter override.
    fn expand(
        &mut self,
        node: &S::Node,
        depth: usize,
        path: &Path,
        inherited: &RenderConfig,
        effective: &RenderConfig,
    ) -> Result<(), RenderError> {
        // At the limit, only a beyond line needs the listing.
        let at_depth_limit = effective.depth_limit.is_some_and(|limit| depth >= limit);
        if at_depth_limit && effective.beyond.is_none() {
            return Ok(());
        }

        let children = match self.source.list_children(node) {
            Ok(children) => children,
            Err(err) if effective.tolerates(err.kind) => {
                debug!(path = %err.path.display(), kind = %err.kind, "listing failed, tagging node");
                if let Some(line) = self.lines.last_mut() {
                    line.push_str(&effective.denied_tag);
                }
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let threaded = if effective.sticky_formatter {
            effective
        } else {
            inherited
        };
        trace!(depth, children = children.len(), path = %path.display(), "expanding container");

        let listed = candidates(self.source, children, depth + 1, path, threaded)?;
        let selection = select(listed, effective, at_depth_limit);

        let beyond = effective
            .beyond
            .as_ref()
            .filter(|_| at_depth_limit || !selection.remainder.is_empty())
            .map(|beyond| {
                let (containers, leaves) = selection.hidden_counts();
                beyond.summary(containers, leaves).into_owned()
            });

        let total = selection.shown.len() + usize::from(beyond.is_some());
        if total == 0 {
            return Ok(());
        }

        self.incomplete.insert(depth);
        for (i, child) in selection.shown.iter().enumerate() {
            let last = i + 1 == total;
            self.push_child_line(child, depth, last);
            if child.is_container() {
                self.expand(&child.node, depth + 1, &child.path, threaded, &child.config)?;
            }
        }

        if let Some(text) = beyond {
            let mut line = self.header(&threaded.tokens, depth);
            line.push_str(&threaded.tokens.last);
            line.push_str(&text);
            self.incomplete.remove(&depth);
            self.lines.push(line);
        }

        Ok(())
    }

    fn push_child_line(&mut self, child: &Candidate<'_, S::Node>, depth: usize, last: bool) {
        let tokens = &child.config.tokens;
        let mut line = self.header(tokens, depth);
        if last {
            line.push_str(&tokens.last);
            self.incomplete.remove(&depth);
        } else {
            line.push_str(&tokens.split);
        }
        line.push_str(&decorated(tokens, child.kind, &child.name));
        self.lines.push(line);
    }

    /// Column fillers for every ancestor depth below `depth`.
    fn header(&self, tokens: &StyleTokens, depth: usize) -> String {
        (0..depth)
            .map(|d| {
                if self.incomplete.contains(&d) {
                    tokens.extend.as_str()
                } else {
                    tokens.space.as_str()
                }
            })
            .collect()
    }
}

fn decorated(tokens: &StyleTokens, kind: NodeKind, name: &str) -> String {
    let (start, end) = tokens.decoration(kind.is_container());
    format!("{start}{name}{end}")
}
