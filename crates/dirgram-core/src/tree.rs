//! Arena-backed synthetic tree of containers and leaves.

use compact_str::CompactString;
use generational_arena::Arena;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::TreeError;
use crate::node::{NodeBody, NodeId, NodeKind, SyntheticNode};

/// In-memory forest of named containers and leaves.
///
/// Nodes live in a generational arena and refer to each other through
/// [`NodeId`] handles: containers own an ordered child list, children keep a
/// lookup-only parent handle. Sibling names are unique and depths are kept
/// in sync on every reparent.
#[derive(Debug, Clone, Default)]
pub struct SyntheticTree {
    arena: Arena<SyntheticNode>,
}

impl SyntheticTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached root node.
    pub fn new_root(&mut self, kind: NodeKind, name: impl Into<CompactString>) -> NodeId {
        NodeId(self.arena.insert(SyntheticNode::new(name.into(), kind)))
    }

    /// Number of live nodes across all roots.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Check if the tree holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Check if a handle still refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    /// Get a node by handle.
    pub fn get(&self, id: NodeId) -> Option<&SyntheticNode> {
        self.arena.get(id.0)
    }

    fn node(&self, id: NodeId) -> Result<&SyntheticNode, TreeError> {
        self.arena.get(id.0).ok_or(TreeError::NodeNotFound)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SyntheticNode, TreeError> {
        self.arena.get_mut(id.0).ok_or(TreeError::NodeNotFound)
    }

    /// Name of a node, empty for stale handles.
    pub fn name(&self, id: NodeId) -> &str {
        self.get(id).map(SyntheticNode::name).unwrap_or_default()
    }

    /// Kind of a node.
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get(id).map(SyntheticNode::kind)
    }

    /// Depth of a node (root = 0).
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        self.get(id).map(SyntheticNode::depth)
    }

    /// Parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(SyntheticNode::parent)
    }

    /// Children of a node in order; empty for leaves and stale handles.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(SyntheticNode::children).unwrap_or_default()
    }

    /// Names of the children of a node, in order.
    pub fn child_names(&self, id: NodeId) -> Vec<&str> {
        self.children(id).iter().map(|&c| self.name(c)).collect()
    }

    /// Find a direct child by name.
    pub fn child_by_name(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.name(c) == name)
    }

    /// All other children of this node's parent.
    pub fn siblings(&self, id: NodeId) -> Vec<NodeId> {
        match self.parent(id) {
            Some(parent) => self
                .children(parent)
                .iter()
                .copied()
                .filter(|&c| c != id)
                .collect(),
            None => Vec::new(),
        }
    }

    /// `/`-joined names from the root down to this node.
    pub fn path(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.get(node_id) {
                Some(node) => {
                    names.push(node.name());
                    current = node.parent();
                }
                None => break,
            }
        }
        names.reverse();
        names.join("/")
    }

    /// Resolve a `/`-separated path of child names below `id`.
    pub fn lookup(&self, id: NodeId, path: &str) -> Result<NodeId, TreeError> {
        let mut current = id;
        for part in path.split('/').filter(|p| !p.is_empty()) {
            current = self
                .child_by_name(current, part)
                .ok_or_else(|| TreeError::PathNotFound {
                    root: self.name(id).into(),
                    path: path.to_string(),
                })?;
        }
        Ok(current)
    }

    /// Check if `ancestor` is `id` or lies above it.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.parent(node_id);
        }
        false
    }

    /// Create a container under `parent`.
    pub fn create_container(
        &mut self,
        parent: NodeId,
        name: impl Into<CompactString>,
    ) -> Result<NodeId, TreeError> {
        self.create_child(parent, NodeKind::Container, name.into())
    }

    /// Create a leaf under `parent`.
    pub fn create_leaf(
        &mut self,
        parent: NodeId,
        name: impl Into<CompactString>,
    ) -> Result<NodeId, TreeError> {
        self.create_child(parent, NodeKind::Leaf, name.into())
    }

    /// Create several containers under `parent`, stopping at the first failure.
    pub fn create_containers<I, S>(&mut self, parent: NodeId, names: I) -> Result<Vec<NodeId>, TreeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        names
            .into_iter()
            .map(|name| self.create_container(parent, name))
            .collect()
    }

    /// Create several leaves under `parent`, stopping at the first failure.
    pub fn create_leaves<I, S>(&mut self, parent: NodeId, names: I) -> Result<Vec<NodeId>, TreeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        names
            .into_iter()
            .map(|name| self.create_leaf(parent, name))
            .collect()
    }

    /// Create a child of the given kind under `parent`.
    pub fn create_child(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        name: CompactString,
    ) -> Result<NodeId, TreeError> {
        self.check_attach(parent, &name)?;
        let id = self.new_root(kind, name);
        self.attach(id, parent);
        Ok(id)
    }

    /// Verify that a child named `name` could be appended to `parent`.
    fn check_attach(&self, parent: NodeId, name: &str) -> Result<(), TreeError> {
        let parent_node = self.node(parent)?;
        if !parent_node.is_container() {
            return Err(TreeError::WrongKind {
                name: parent_node.name.clone(),
                expected: NodeKind::Container,
                actual: parent_node.kind(),
            });
        }
        if self.child_by_name(parent, name).is_some() {
            return Err(TreeError::NameCollision {
                parent: parent_node.name.clone(),
                name: name.into(),
            });
        }
        Ok(())
    }

    /// Append a detached node to `parent` and re-derive depths.
    fn attach(&mut self, id: NodeId, parent: NodeId) {
        let parent_depth = match self.arena.get_mut(parent.0) {
            Some(SyntheticNode {
                body: NodeBody::Container { children },
                depth,
                ..
            }) => {
                children.push(id);
                *depth
            }
            _ => return,
        };
        if let Some(node) = self.arena.get_mut(id.0) {
            node.parent = Some(parent);
        }
        self.set_depths(id, parent_depth + 1);
    }

    /// Remove `id` from its parent's child list, making it a root.
    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(SyntheticNode {
            body: NodeBody::Container { children },
            ..
        }) = self.arena.get_mut(parent.0)
        {
            children.retain(|&c| c != id);
        }
        if let Some(node) = self.arena.get_mut(id.0) {
            node.parent = None;
        }
        self.set_depths(id, 0);
    }

    /// Set the depth of `id` and recursively of its whole subtree.
    fn set_depths(&mut self, id: NodeId, depth: usize) {
        let mut stack = vec![(id, depth)];
        while let Some((node_id, depth)) = stack.pop() {
            if let Some(node) = self.arena.get_mut(node_id.0) {
                node.depth = depth;
                stack.extend(node.children().iter().map(|&c| (c, depth + 1)));
            }
        }
    }

    /// Move `id` under `new_parent`, or detach it into a root with `None`.
    ///
    /// The move is atomic: on error the tree is unchanged.
    pub fn set_parent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<(), TreeError> {
        let name = self.node(id)?.name.clone();
        match new_parent {
            None => {
                self.detach(id);
                Ok(())
            }
            Some(parent) => {
                if self.parent(id) == Some(parent) {
                    return Ok(());
                }
                self.check_attach(parent, &name)?;
                if self.is_ancestor_or_self(id, parent) {
                    return Err(TreeError::Cycle { name });
                }
                self.detach(id);
                self.attach(id, parent);
                Ok(())
            }
        }
    }

    /// Rename a node, rejecting a collision with a sibling.
    pub fn rename(&mut self, id: NodeId, name: impl Into<CompactString>) -> Result<(), TreeError> {
        let name = name.into();
        if let Some(parent) = self.node(id)?.parent {
            if let Some(existing) = self.child_by_name(parent, &name) {
                if existing != id {
                    return Err(TreeError::NameCollision {
                        parent: self.name(parent).into(),
                        name,
                    });
                }
            }
        }
        self.node_mut(id)?.name = name;
        Ok(())
    }

    /// Detach a node and free it together with its subtree.
    pub fn remove(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.node(id)?;
        self.detach(id);
        let doomed: Vec<NodeId> = self.descendants(id).collect();
        for node_id in doomed {
            self.arena.remove(node_id.0);
        }
        Ok(())
    }

    /// Delete the child named `name` from `parent`.
    pub fn delete(&mut self, parent: NodeId, name: &str) -> Result<(), TreeError> {
        self.delete_many(parent, [name])
    }

    /// Delete several children by name; all names are verified first and
    /// repeated names are deleted once.
    pub fn delete_many<'n, I>(&mut self, parent: NodeId, names: I) -> Result<(), TreeError>
    where
        I: IntoIterator<Item = &'n str>,
    {
        let mut targets = Vec::new();
        for name in names {
            let child = self
                .child_by_name(parent, name)
                .ok_or_else(|| TreeError::NoSuchChild {
                    parent: self.name(parent).into(),
                    name: name.into(),
                })?;
            if !targets.contains(&child) {
                targets.push(child);
            }
        }
        for child in targets {
            self.remove(child)?;
        }
        Ok(())
    }

    /// Delete every child of `parent`.
    pub fn clear_children(&mut self, parent: NodeId) -> Result<(), TreeError> {
        let children = self.node(parent)?.children().to_vec();
        for child in children {
            self.remove(child)?;
        }
        Ok(())
    }

    /// Remove everything more than `depth_limit` levels below `id`.
    ///
    /// With a limit of 0 all children of `id` are removed.
    pub fn trim(&mut self, id: NodeId, depth_limit: usize) -> Result<(), TreeError> {
        let base = self.node(id)?.depth;
        let cutoff = base + depth_limit;
        let at_cutoff: Vec<NodeId> = self
            .descendants(id)
            .filter(|&n| self.depth(n) == Some(cutoff))
            .collect();
        trace!(count = at_cutoff.len(), cutoff, "trimming synthetic tree");
        for node_id in at_cutoff {
            self.clear_children(node_id)?;
        }
        Ok(())
    }

    /// Pre-order iterator over `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let stack = if self.contains(id) { vec![id] } else { Vec::new() };
        Descendants { tree: self, stack }
    }

    /// Apply `f` to `id` and every node below it, in pre-order.
    ///
    /// The visiting order is fixed before the first call, so `f` may mutate
    /// the tree; nodes removed along the way are skipped.
    pub fn walk_apply<F>(&mut self, id: NodeId, mut f: F) -> Result<(), TreeError>
    where
        F: FnMut(&mut SyntheticTree, NodeId) -> Result<(), TreeError>,
    {
        let order: Vec<NodeId> = self.descendants(id).collect();
        for node_id in order {
            if self.contains(node_id) {
                f(self, node_id)?;
            }
        }
        Ok(())
    }

    /// Deep copy of a subtree as a new, unlinked root.
    pub fn copy_subtree(&mut self, id: NodeId) -> Result<NodeId, TreeError> {
        let snapshot = self.snapshot(id)?;
        Ok(self.insert_snapshot(&snapshot, None))
    }

    /// Count containers and leaves among `ids`.
    pub fn count_kinds(&self, ids: &[NodeId]) -> (usize, usize) {
        ids.iter().fold((0, 0), |(dirs, files), &id| match self.kind(id) {
            Some(NodeKind::Container) => (dirs + 1, files),
            Some(NodeKind::Leaf) => (dirs, files + 1),
            None => (dirs, files),
        })
    }

    /// Nested, serializable copy of a subtree.
    pub fn snapshot(&self, id: NodeId) -> Result<TreeSnapshot, TreeError> {
        let node = self.node(id)?;
        let children = node
            .children()
            .iter()
            .map(|&c| self.snapshot(c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TreeSnapshot {
            name: node.name.clone(),
            kind: node.kind(),
            children,
        })
    }

    /// Build a tree from a snapshot, returning the tree and its root.
    pub fn from_snapshot(snapshot: &TreeSnapshot) -> (Self, NodeId) {
        let mut tree = Self::new();
        let root = tree.insert_snapshot(snapshot, None);
        (tree, root)
    }

    fn insert_snapshot(&mut self, snapshot: &TreeSnapshot, parent: Option<NodeId>) -> NodeId {
        let id = self.new_root(snapshot.kind, snapshot.name.clone());
        if let Some(parent) = parent {
            self.attach(id, parent);
        }
        if snapshot.kind.is_container() {
            for child in &snapshot.children {
                self.insert_snapshot(child, Some(id));
            }
        }
        id
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    tree: &'a SyntheticTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Reverse so the first child is popped next.
        self.stack
            .extend(self.tree.children(current).iter().rev().copied());
        Some(current)
    }
}

/// Owned, nested form of a subtree used for copies and (de)serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    /// Node name.
    pub name: CompactString,
    /// Container or leaf.
    pub kind: NodeKind,
    /// Children in order (always empty for leaves).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeSnapshot>,
}
