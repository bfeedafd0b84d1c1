//! Materialize a synthetic tree on disk.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{RealizeError, TreeError};
use crate::node::{NodeId, NodeKind};
use crate::tree::SyntheticTree;

/// Create `id` and everything below it inside `dest`.
///
/// Containers become directories and leaves become empty files. Existing
/// entries are never overwritten. Returns the path created for `id`.
pub fn realize(
    tree: &SyntheticTree,
    id: NodeId,
    dest: impl AsRef<Path>,
) -> Result<PathBuf, RealizeError> {
    let dest = dest.as_ref();
    let root = dest.join(tree.get(id).ok_or(TreeError::NodeNotFound)?.name());
    for node_id in tree.descendants(id) {
        check_name(tree.name(node_id))?;
    }
    debug!(root = %root.display(), nodes = tree.descendants(id).count(), "realizing tree");

    let mut stack = vec![(id, root.clone())];
    while let Some((node_id, path)) = stack.pop() {
        match tree.kind(node_id).ok_or(TreeError::NodeNotFound)? {
            NodeKind::Container => {
                fs::create_dir(&path).map_err(|e| RealizeError::io(&path, e))?;
                for &child in tree.children(node_id) {
                    stack.push((child, path.join(tree.name(child))));
                }
            }
            NodeKind::Leaf => {
                fs::OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(&path)
                    .map_err(|e| RealizeError::io(&path, e))?;
            }
        }
    }

    Ok(root)
}

/// Names must stay inside their parent directory.
fn check_name(name: &str) -> Result<(), RealizeError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
        _ => Err(RealizeError::InvalidName { name: name.into() }),
    }
}
