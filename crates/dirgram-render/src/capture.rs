//! Copy any tree source into a synthetic tree.

use std::path::Path;

use tracing::debug;

use dirgram_core::{Entry, NodeId, NodeKind, RenderConfig, RenderError, SyntheticTree};

use crate::listing::{candidates, select};
use crate::source::TreeSource;

/// Build a synthetic tree mirroring `root`.
///
/// Depth limit, item limit, sorting, filters and formatter overrides apply
/// exactly as they would in a render; beyond summaries have no counterpart
/// and are dropped. Containers whose listing fails with a tolerated kind are
/// captured empty.
pub fn capture<S: TreeSource>(
    source: &S,
    root: &S::Node,
    config: &RenderConfig,
) -> Result<(SyntheticTree, NodeId), RenderError> {
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

    let mut capturer = Capturer {
        source,
        tree: SyntheticTree::new(),
    };
    let root_id = capturer.tree.new_root(kind, name.as_str());
    if kind.is_container() {
        capturer.fill(root, root_id, 0, &path, config, &effective)?;
    }
    debug!(nodes = capturer.tree.len(), "captured tree");
    Ok((capturer.tree, root_id))
}

struct Capturer<'s, S> {
    source: &'s S,
    tree: SyntheticTree,
}

impl<S: TreeSource> Capturer<'_, S> {
    fn fill(
        &mut self,
        node: &S::Node,
        id: NodeId,
        depth: usize,
        path: &Path,
        inherited: &RenderConfig,
        effective: &RenderConfig,
    ) -> Result<(), RenderError> {
        if effective.depth_limit.is_some_and(|limit| depth >= limit) {
            return Ok(());
        }

        let children = match self.source.list_children(node) {
            Ok(children) => children,
            Err(err) if effective.tolerates(err.kind) => {
                debug!(path = %err.path.display(), kind = %err.kind, "listing failed, capturing empty");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let threaded = if effective.sticky_formatter {
            effective
        } else {
            inherited
        };
        let listed = candidates(self.source, children, depth + 1, path, threaded)?;
        let selection = select(listed, effective, false);

        for child in &selection.shown {
            let child_id = match child.kind {
                NodeKind::Container => self.tree.create_container(id, child.name.as_str())?,
                NodeKind::Leaf => self.tree.create_leaf(id, child.name.as_str())?,
            };
            if child.is_container() {
                self.fill(
                    &child.node,
                    child_id,
                    depth + 1,
                    &child.path,
                    threaded,
                    &child.config,
                )?;
            }
        }

        Ok(())
    }
}
