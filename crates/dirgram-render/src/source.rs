//! Tree sources the engine can walk.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use dirgram_core::{ListError, ListErrorKind, NodeId, SyntheticTree};

/// Narrow view of anything shaped like a tree of containers and leaves.
///
/// Listings must preserve the source's natural enumeration order; the engine
/// does all reordering itself.
pub trait TreeSource {
    /// Handle to one node of the source.
    type Node;

    /// Display name of a node.
    fn name<'a>(&'a self, node: &'a Self::Node) -> Cow<'a, str>;

    /// Whether a node can have children.
    fn is_container(&self, node: &Self::Node) -> bool;

    /// Children of a container in source order.
    fn list_children(&self, node: &Self::Node) -> Result<Vec<Self::Node>, ListError>;
}

/// Real directories, addressed by path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl FsSource {
    /// Create a filesystem source.
    pub fn new() -> Self {
        Self
    }
}

impl TreeSource for FsSource {
    type Node = PathBuf;

    fn name<'a>(&'a self, node: &'a PathBuf) -> Cow<'a, str> {
        match node.file_name() {
            Some(name) => name.to_string_lossy(),
            // `/`, `.` and `..` have no final component.
            None => node.as_os_str().to_string_lossy(),
        }
    }

    fn is_container(&self, node: &PathBuf) -> bool {
        node.is_dir()
    }

    fn list_children(&self, node: &PathBuf) -> Result<Vec<PathBuf>, ListError> {
        let entries = fs::read_dir(node).map_err(|e| ListError::io(node, &e))?;
        entries
            .map(|entry| {
                entry
                    .map(|e| e.path())
                    .map_err(|e| ListError::io(node, &e))
            })
            .collect()
    }
}

/// Nodes of an in-memory [`SyntheticTree`].
#[derive(Debug, Clone, Copy)]
pub struct SyntheticSource<'t> {
    tree: &'t SyntheticTree,
}

impl<'t> SyntheticSource<'t> {
    /// Wrap a tree.
    pub fn new(tree: &'t SyntheticTree) -> Self {
        Self { tree }
    }

    /// The wrapped tree.
    pub fn tree(&self) -> &'t SyntheticTree {
        self.tree
    }
}

impl TreeSource for SyntheticSource<'_> {
    type Node = NodeId;

    fn name<'a>(&'a self, node: &'a NodeId) -> Cow<'a, str> {
        Cow::Borrowed(self.tree.name(*node))
    }

    fn is_container(&self, node: &NodeId) -> bool {
        self.tree.get(*node).is_some_and(|n| n.is_container())
    }

    fn list_children(&self, node: &NodeId) -> Result<Vec<NodeId>, ListError> {
        match self.tree.get(*node) {
            Some(n) if n.is_container() => Ok(n.children().to_vec()),
            Some(_) => Err(ListError::new(
                self.tree.path(*node),
                ListErrorKind::NotAContainer,
                "leaves have no children",
            )),
            None => Err(ListError::new(
                Path::new("<removed>"),
                ListErrorKind::NotFound,
                "node no longer exists",
            )),
        }
    }
}

/// Adapter built from three closures over any handle type.
pub struct FnSource<N, FName, FIsContainer, FList> {
    name: FName,
    is_container: FIsContainer,
    list_children: FList,
    _node: std::marker::PhantomData<fn(&N)>,
}

impl<N, FName, FIsContainer, FList> FnSource<N, FName, FIsContainer, FList>
where
    FName: Fn(&N) -> String,
    FIsContainer: Fn(&N) -> bool,
    FList: Fn(&N) -> Result<Vec<N>, ListError>,
{
    /// Create an adapter from name, kind and listing closures.
    pub fn new(name: FName, is_container: FIsContainer, list_children: FList) -> Self {
        Self {
            name,
            is_container,
            list_children,
            _node: std::marker::PhantomData,
        }
    }
}

impl<N, FName, FIsContainer, FList> TreeSource for FnSource<N, FName, FIsContainer, FList>
where
    FName: Fn(&N) -> String,
    FIsContainer: Fn(&N) -> bool,
    FList: Fn(&N) -> Result<Vec<N>, ListError>,
{
    type Node = N;

    fn name<'a>(&'a self, node: &'a N) -> Cow<'a, str> {
        Cow::Owned((self.name)(node))
    }

    fn is_container(&self, node: &N) -> bool {
        (self.is_container)(node)
    }

    fn list_children(&self, node: &N) -> Result<Vec<N>, ListError> {
        (self.list_children)(node)
    }
}
