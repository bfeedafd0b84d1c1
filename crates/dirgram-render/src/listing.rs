//! Turning a raw child listing into the items actually drawn.
//!
//! Order of operations: formatter overrides, sort, filter, limit.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use itertools::Itertools;

use dirgram_core::{Entry, ItemLimit, NodeKind, Pattern, RenderConfig, RenderError};

use crate::sort::sort_by_name;
use crate::source::TreeSource;

/// One child of the container being expanded.
pub(crate) struct Candidate<'c, N> {
    pub node: N,
    pub name: String,
    pub kind: NodeKind,
    pub depth: usize,
    /// Logical path from the render root, own name included.
    pub path: PathBuf,
    /// Config this child is drawn and expanded with.
    pub config: Cow<'c, RenderConfig>,
}

impl<N> Candidate<'_, N> {
    pub fn entry(&self) -> Entry<'_> {
        Entry {
            name: &self.name,
            kind: self.kind,
            depth: self.depth,
            path: &self.path,
        }
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }
}

/// Wrap raw children as candidates, running the formatter on each one.
pub(crate) fn candidates<'c, S: TreeSource>(
    source: &S,
    children: Vec<S::Node>,
    depth: usize,
    parent_path: &Path,
    threaded: &'c RenderConfig,
) -> Result<Vec<Candidate<'c, S::Node>>, RenderError> {
    children
        .into_iter()
        .map(|node| -> Result<_, RenderError> {
            let name = source.name(&node).into_owned();
            let kind = NodeKind::from_container_flag(source.is_container(&node));
            let path = parent_path.join(&name);
            let entry = Entry {
                name: &name,
                kind,
                depth,
                path: &path,
            };
            let update = threaded.formatter.as_ref().and_then(|f| f.format(&entry));
            let config = threaded.apply(update.as_ref())?;
            Ok(Candidate {
                node,
                name,
                kind,
                depth,
                path,
                config,
            })
        })
        .collect()
}

/// Items drawn for one container, plus the ones hidden by a limit.
pub(crate) struct Selection<'c, N> {
    pub shown: Vec<Candidate<'c, N>>,
    pub remainder: Vec<Candidate<'c, N>>,
}

impl<N> Selection<'_, N> {
    /// Containers and leaves hidden by the limit.
    pub fn hidden_counts(&self) -> (usize, usize) {
        let containers = self.remainder.iter().filter(|c| c.is_container()).count();
        (containers, self.remainder.len() - containers)
    }
}

/// Sort, filter and limit a listing according to `config`.
///
/// At the depth limit every surviving item becomes remainder.
pub(crate) fn select<'c, N>(
    mut items: Vec<Candidate<'c, N>>,
    config: &RenderConfig,
    at_depth_limit: bool,
) -> Selection<'c, N> {
    if config.needs_sort() {
        sort_by_name(
            &mut items,
            |c| c.name.as_str(),
            |c| c.kind,
            config.sort_key.as_ref(),
            config.sort_reverse,
            config.first,
        );
    }

    let items: Vec<_> = items.into_iter().filter(|c| keep(c, config)).collect();

    if at_depth_limit {
        return Selection {
            shown: Vec::new(),
            remainder: items,
        };
    }

    let (shown, remainder) = apply_limit(items, config.item_limit);
    Selection { shown, remainder }
}

/// Include/exclude filtering, or the mask alone when one is set.
pub(crate) fn keep<N>(candidate: &Candidate<'_, N>, config: &RenderConfig) -> bool {
    if let Some(mask) = &config.mask {
        return mask.keep(&candidate.entry());
    }

    let (include, exclude) = match candidate.kind {
        NodeKind::Container => (&config.include_containers, &config.exclude_containers),
        NodeKind::Leaf => (&config.include_leaves, &config.exclude_leaves),
    };
    let matches = |patterns: &[Pattern]| {
        patterns
            .iter()
            .any(|p| p.matches(&candidate.name, config.regex))
    };

    // An include match wins over any exclude match.
    if !include.is_empty() {
        return matches(include);
    }
    !matches(exclude)
}

/// Split a listing into the items within the limit and the rest, keeping order.
pub(crate) fn apply_limit<T: HasKind>(items: Vec<T>, limit: ItemLimit) -> (Vec<T>, Vec<T>) {
    match limit {
        ItemLimit::Unlimited => (items, Vec::new()),
        ItemLimit::Total(n) => {
            let mut shown = items;
            let remainder = shown.split_off(n.min(shown.len()));
            (shown, remainder)
        }
        ItemLimit::PerKind { containers, leaves } => {
            let mut seen_containers = 0;
            let mut seen_leaves = 0;
            items.into_iter().partition_map(|item| {
                let (seen, cap) = if item.kind().is_container() {
                    (&mut seen_containers, containers)
                } else {
                    (&mut seen_leaves, leaves)
                };
                *seen += 1;
                if cap.is_none_or(|cap| *seen <= cap) {
                    itertools::Either::Left(item)
                } else {
                    itertools::Either::Right(item)
                }
            })
        }
    }
}

/// Anything that knows whether it is a container.
pub(crate) trait HasKind {
    fn kind(&self) -> NodeKind;
}

impl<N> HasKind for Candidate<'_, N> {
    fn kind(&self) -> NodeKind {
        self.kind
    }
}
