//! Node handles, kinds and the read-only entry view handed to callbacks.

use std::fmt;
use std::path::Path;

use compact_str::CompactString;
use generational_arena::Index;
use serde::{Deserialize, Serialize};

/// Handle to a node inside a [`SyntheticTree`](crate::SyntheticTree).
///
/// Handles are generational: once a node is removed, its handle never
/// resolves again, even if the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) Index);

impl NodeId {
    /// Raw slot index, useful only for debugging output.
    pub fn slot(self) -> usize {
        self.0.into_raw_parts().0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "NodeId({slot}v{generation})")
    }
}

/// Whether a node can hold children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Directory-like node.
    Container,
    /// File-like node.
    Leaf,
}

impl NodeKind {
    /// Check if this is a container.
    pub const fn is_container(self) -> bool {
        matches!(self, NodeKind::Container)
    }

    /// Check if this is a leaf.
    pub const fn is_leaf(self) -> bool {
        matches!(self, NodeKind::Leaf)
    }

    /// Kind from an `is_container` flag.
    pub const fn from_container_flag(is_container: bool) -> Self {
        if is_container {
            NodeKind::Container
        } else {
            NodeKind::Leaf
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Container => write!(f, "container"),
            NodeKind::Leaf => write!(f, "leaf"),
        }
    }
}

/// Body of a synthetic node: containers own an ordered child list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeBody {
    /// Directory-like node with children in insertion order.
    Container { children: Vec<NodeId> },
    /// File-like node.
    Leaf,
}

impl NodeBody {
    /// Kind tag of this body.
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeBody::Container { .. } => NodeKind::Container,
            NodeBody::Leaf => NodeKind::Leaf,
        }
    }
}

/// A single node stored in a synthetic tree.
#[derive(Debug, Clone)]
pub struct SyntheticNode {
    /// Name, unique among siblings.
    pub(crate) name: CompactString,
    /// Lookup-only back-reference; `None` for roots.
    pub(crate) parent: Option<NodeId>,
    /// Derived: `parent.depth + 1`, or 0 for roots.
    pub(crate) depth: usize,
    pub(crate) body: NodeBody,
}

impl SyntheticNode {
    pub(crate) fn new(name: CompactString, kind: NodeKind) -> Self {
        let body = match kind {
            NodeKind::Container => NodeBody::Container {
                children: Vec::new(),
            },
            NodeKind::Leaf => NodeBody::Leaf,
        };
        Self {
            name,
            parent: None,
            depth: 0,
            body,
        }
    }

    /// Node name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent handle, `None` for roots.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Depth below the root (root = 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Container or leaf.
    pub fn kind(&self) -> NodeKind {
        self.body.kind()
    }

    /// Node body.
    pub fn body(&self) -> &NodeBody {
        &self.body
    }

    /// Children in order; empty for leaves.
    pub fn children(&self) -> &[NodeId] {
        match &self.body {
            NodeBody::Container { children } => children,
            NodeBody::Leaf => &[],
        }
    }

    /// Check if this node is a container.
    pub fn is_container(&self) -> bool {
        self.kind().is_container()
    }
}

/// Source-agnostic view of a node passed to masks and formatters.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    /// Node name as reported by the tree source.
    pub name: &'a str,
    /// Container or leaf.
    pub kind: NodeKind,
    /// Depth below the render root (root = 0).
    pub depth: usize,
    /// Logical path from the render root, root name included.
    pub path: &'a Path,
}

impl Entry<'_> {
    /// Check if the entry is a container.
    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }
}
