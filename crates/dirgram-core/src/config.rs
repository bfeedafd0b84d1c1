//! Render configuration types.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use compact_str::CompactString;
use derive_builder::Builder;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{ConfigError, ListErrorKind};
use crate::node::Entry;
use crate::style::{Style, StyleTokens};

/// Cap on how many children of one container are drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemLimit {
    /// Draw every child.
    #[default]
    Unlimited,
    /// Draw the first `n` surviving children.
    Total(usize),
    /// Cap containers and leaves independently; `None` leaves a side unlimited.
    PerKind {
        containers: Option<usize>,
        leaves: Option<usize>,
    },
}

impl FromStr for ItemLimit {
    type Err = ConfigError;

    /// Accepts `"5"`, `"none"`, or a `containers,leaves` pair such as `"2,none"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        fn side(s: &str, whole: &str) -> Result<Option<usize>, ConfigError> {
            match s.trim().to_ascii_lowercase().as_str() {
                "none" | "unlimited" | "" => Ok(None),
                n => n
                    .parse()
                    .map(Some)
                    .map_err(|_| ConfigError::InvalidItemLimit(whole.to_string())),
            }
        }

        match s.split_once(',') {
            Some((containers, leaves)) => Ok(ItemLimit::PerKind {
                containers: side(containers, s)?,
                leaves: side(leaves, s)?,
            }),
            None => Ok(match side(s, s)? {
                Some(n) => ItemLimit::Total(n),
                None => ItemLimit::Unlimited,
            }),
        }
    }
}

/// What to draw in place of children hidden by a limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Beyond {
    /// A literal `...`.
    Ellipsis,
    /// `"<n> folder(s), <m> file(s)"` counted over the hidden children.
    Counts,
    /// A fixed string.
    Text(String),
}

impl Beyond {
    /// Summary line for a remainder holding `containers` and `leaves`.
    pub fn summary(&self, containers: usize, leaves: usize) -> Cow<'_, str> {
        match self {
            Beyond::Ellipsis => Cow::Borrowed("..."),
            Beyond::Counts => Cow::Owned(format!("{containers} folder(s), {leaves} file(s)")),
            Beyond::Text(text) => Cow::Borrowed(text),
        }
    }
}

impl FromStr for Beyond {
    type Err = ConfigError;

    /// Accepts `ellipsis`, `content`/`contents`, or `_` followed by custom text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(text) = s.strip_prefix('_') {
            return Ok(Beyond::Text(text.to_string()));
        }
        match s.to_ascii_lowercase().as_str() {
            "ellipsis" => Ok(Beyond::Ellipsis),
            "content" | "contents" => Ok(Beyond::Counts),
            _ => Err(ConfigError::InvalidBeyond(s.to_string())),
        }
    }
}

/// Which kind to list first when grouping children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FirstKind {
    /// Containers before leaves.
    #[strum(to_string = "containers", serialize = "folders")]
    Containers,
    /// Leaves before containers.
    #[strum(to_string = "leaves", serialize = "files")]
    Leaves,
}

/// A name filter, matched literally or as a regular expression.
///
/// The regex is compiled once up front; a source that is not a valid regex
/// is only an error when the configuration runs in regex mode.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Pattern {
    source: String,
    regex: Option<Regex>,
}

impl Pattern {
    /// Create a pattern from its source text.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let regex = Regex::new(&source).ok();
        Self { source, regex }
    }

    /// Source text of the pattern.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match a name: regex search in regex mode, exact equality otherwise.
    pub fn matches(&self, name: &str, regex_mode: bool) -> bool {
        if regex_mode {
            self.regex.as_ref().is_some_and(|re| re.is_match(name))
        } else {
            self.source == name
        }
    }

    /// Report an invalid regex.
    pub fn check_regex(&self) -> Result<(), ConfigError> {
        match Regex::new(&self.source) {
            Ok(_) => Ok(()),
            Err(e) => Err(ConfigError::InvalidPattern {
                pattern: self.source.clone(),
                message: e.to_string(),
            }),
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl From<String> for Pattern {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}

impl From<&str> for Pattern {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.source
    }
}

/// Declares a cloneable, `Debug`-printable wrapper around a shared callback.
macro_rules! callback {
    ($(#[$meta:meta])* $name:ident, $($sig:tt)+) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name(Arc<dyn $($sig)+ + Send + Sync>);

        impl $name {
            /// Wrap a closure.
            pub fn new(f: impl $($sig)+ + Send + Sync + 'static) -> Self {
                Self(Arc::new(f))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(concat!(stringify!($name), "(..)"))
            }
        }
    };
}

callback!(
    /// Maps a name to the key it is sorted by (compared naturally).
    SortKey,
    Fn(&str) -> String
);

callback!(
    /// Keep/drop predicate that replaces all include/exclude filtering.
    Mask,
    Fn(&Entry<'_>) -> bool
);

callback!(
    /// Per-node configuration override.
    Formatter,
    Fn(&Entry<'_>) -> Option<ConfigOverride>
);

impl SortKey {
    /// Sort key of a name.
    pub fn key(&self, name: &str) -> String {
        (self.0)(name)
    }
}

impl Mask {
    /// Whether an entry survives filtering.
    pub fn keep(&self, entry: &Entry<'_>) -> bool {
        (self.0)(entry)
    }
}

impl Formatter {
    /// Override for an entry, if any.
    pub fn format(&self, entry: &Entry<'_>) -> Option<ConfigOverride> {
        (self.0)(entry)
    }
}

/// Partial configuration returned by a [`Formatter`].
///
/// `None` leaves a field alone. Fields that are themselves optional use a
/// nested `Option`, so `Some(None)` clears them.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverride {
    pub depth_limit: Option<Option<usize>>,
    pub item_limit: Option<ItemLimit>,
    pub beyond: Option<Option<Beyond>>,
    pub sort: Option<bool>,
    pub sort_reverse: Option<bool>,
    pub sort_key: Option<Option<SortKey>>,
    pub first: Option<Option<FirstKind>>,
    pub include_containers: Option<Vec<Pattern>>,
    pub exclude_containers: Option<Vec<Pattern>>,
    pub include_leaves: Option<Vec<Pattern>>,
    pub exclude_leaves: Option<Vec<Pattern>>,
    pub regex: Option<bool>,
    pub mask: Option<Option<Mask>>,
    /// Replace the whole token table before applying `tokens`.
    pub style: Option<Style>,
    /// Token updates by key, applied in order with [`StyleTokens::set`].
    pub tokens: Vec<(CompactString, CompactString)>,
    pub sticky_formatter: Option<bool>,
    pub denied_tag: Option<String>,
}

impl ConfigOverride {
    /// Add a token update.
    pub fn token(mut self, key: impl Into<CompactString>, value: impl Into<CompactString>) -> Self {
        self.tokens.push((key.into(), value.into()));
        self
    }

    /// Check if the override changes nothing.
    pub fn is_empty(&self) -> bool {
        self.depth_limit.is_none()
            && self.item_limit.is_none()
            && self.beyond.is_none()
            && self.sort.is_none()
            && self.sort_reverse.is_none()
            && self.sort_key.is_none()
            && self.first.is_none()
            && self.include_containers.is_none()
            && self.exclude_containers.is_none()
            && self.include_leaves.is_none()
            && self.exclude_leaves.is_none()
            && self.regex.is_none()
            && self.mask.is_none()
            && self.style.is_none()
            && self.tokens.is_empty()
            && self.sticky_formatter.is_none()
            && self.denied_tag.is_none()
    }
}

/// Options controlling a single render.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct RenderConfig {
    /// Deepest level whose children are drawn (None = unlimited).
    #[builder(default, setter(strip_option))]
    pub depth_limit: Option<usize>,

    /// Cap on children drawn per container.
    #[builder(default)]
    pub item_limit: ItemLimit,

    /// Summary drawn for children hidden by a limit.
    #[builder(default, setter(strip_option))]
    pub beyond: Option<Beyond>,

    /// Sort children naturally by name (or by `sort_key`).
    #[builder(default = "false")]
    pub sort: bool,

    /// Reverse the sort order.
    #[builder(default = "false")]
    pub sort_reverse: bool,

    #[builder(default, setter(strip_option))]
    #[serde(skip)]
    pub sort_key: Option<SortKey>,

    /// Group one kind before the other (implies sorting).
    #[builder(default, setter(strip_option))]
    pub first: Option<FirstKind>,

    #[builder(default, setter(each(name = "include_container", into)))]
    pub include_containers: Vec<Pattern>,

    #[builder(default, setter(each(name = "exclude_container", into)))]
    pub exclude_containers: Vec<Pattern>,

    #[builder(default, setter(each(name = "include_leaf", into)))]
    pub include_leaves: Vec<Pattern>,

    #[builder(default, setter(each(name = "exclude_leaf", into)))]
    pub exclude_leaves: Vec<Pattern>,

    /// Treat filter patterns as regular expressions.
    #[builder(default = "false")]
    pub regex: bool,

    /// Predicate that decides filtering on its own when present.
    #[builder(default, setter(strip_option))]
    #[serde(skip)]
    pub mask: Option<Mask>,

    /// Tokens the diagram is drawn with.
    #[builder(default)]
    pub tokens: StyleTokens,

    /// Per-node override callback.
    #[builder(default, setter(strip_option))]
    #[serde(skip)]
    pub formatter: Option<Formatter>,

    /// Let formatter overrides carry over to descendants.
    #[builder(default = "false")]
    pub sticky_formatter: bool,

    /// Listing failures drawn as a denied tag instead of aborting.
    #[builder(default = "default_acceptable_errors()")]
    pub acceptable_errors: HashSet<ListErrorKind>,

    /// Appended to the line of a container that could not be listed.
    #[builder(default = "default_denied_tag()")]
    pub denied_tag: String,
}

fn default_acceptable_errors() -> HashSet<ListErrorKind> {
    HashSet::from([ListErrorKind::PermissionDenied])
}

fn default_denied_tag() -> String {
    " [ACCESS DENIED]".to_string()
}

fn check_patterns<'a>(mut patterns: impl Iterator<Item = &'a Pattern>) -> Result<(), ConfigError> {
    patterns.try_for_each(Pattern::check_regex)
}

impl RenderConfigBuilder {
    /// Use a built-in style scaled to `indent` columns.
    pub fn style(&mut self, style: Style, indent: usize) -> &mut Self {
        self.tokens = Some(StyleTokens::from_style(style, indent));
        self
    }

    fn validate(&self) -> Result<(), String> {
        if self.regex != Some(true) {
            return Ok(());
        }
        let patterns = [
            &self.include_containers,
            &self.exclude_containers,
            &self.include_leaves,
            &self.exclude_leaves,
        ];
        check_patterns(patterns.into_iter().flatten().flatten()).map_err(|e| e.to_string())
    }
}

impl From<RenderConfigBuilderError> for ConfigError {
    fn from(err: RenderConfigBuilderError) -> Self {
        ConfigError::Invalid {
            message: err.to_string(),
        }
    }
}

impl RenderConfig {
    /// Create a new render config builder.
    pub fn builder() -> RenderConfigBuilder {
        RenderConfigBuilder::default()
    }

    /// Config drawing with a built-in style at the given indent.
    pub fn with_style(style: Style, indent: usize) -> Self {
        Self {
            tokens: StyleTokens::from_style(style, indent),
            ..Self::default()
        }
    }

    /// Report invalid patterns before anything is drawn.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.regex {
            check_patterns(self.all_patterns())?;
        }
        Ok(())
    }

    fn all_patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.include_containers
            .iter()
            .chain(&self.exclude_containers)
            .chain(&self.include_leaves)
            .chain(&self.exclude_leaves)
    }

    /// Whether children must be reordered before filtering.
    pub fn needs_sort(&self) -> bool {
        self.sort || self.first.is_some()
    }

    /// Whether a listing failure of this kind is drawn instead of raised.
    pub fn tolerates(&self, kind: ListErrorKind) -> bool {
        self.acceptable_errors.contains(&kind)
    }

    /// Apply an override to a copy of this config and validate the result.
    pub fn merged(&self, update: &ConfigOverride) -> Result<RenderConfig, ConfigError> {
        let mut config = self.clone();

        if let Some(depth_limit) = update.depth_limit {
            config.depth_limit = depth_limit;
        }
        if let Some(item_limit) = update.item_limit {
            config.item_limit = item_limit;
        }
        if let Some(beyond) = &update.beyond {
            config.beyond = beyond.clone();
        }
        if let Some(sort) = update.sort {
            config.sort = sort;
        }
        if let Some(sort_reverse) = update.sort_reverse {
            config.sort_reverse = sort_reverse;
        }
        if let Some(sort_key) = &update.sort_key {
            config.sort_key = sort_key.clone();
        }
        if let Some(first) = update.first {
            config.first = first;
        }
        for (target, source) in [
            (&mut config.include_containers, &update.include_containers),
            (&mut config.exclude_containers, &update.exclude_containers),
            (&mut config.include_leaves, &update.include_leaves),
            (&mut config.exclude_leaves, &update.exclude_leaves),
        ] {
            if let Some(patterns) = source {
                target.clone_from(patterns);
            }
        }
        if let Some(regex) = update.regex {
            config.regex = regex;
        }
        if let Some(mask) = &update.mask {
            config.mask = mask.clone();
        }
        if let Some(style) = update.style {
            let width = config.tokens.split.chars().count();
            config.tokens = StyleTokens::from_style(style, width);
        }
        for (key, value) in &update.tokens {
            config.tokens.set(key, value)?;
        }
        if let Some(sticky) = update.sticky_formatter {
            config.sticky_formatter = sticky;
        }
        if let Some(tag) = &update.denied_tag {
            config.denied_tag.clone_from(tag);
        }

        config.validate()?;
        Ok(config)
    }

    /// Config for one node: this config, or a merged copy if `update` is set.
    pub fn apply(&self, update: Option<&ConfigOverride>) -> Result<Cow<'_, RenderConfig>, ConfigError> {
        match update {
            Some(update) if !update.is_empty() => self.merged(update).map(Cow::Owned),
            _ => Ok(Cow::Borrowed(self)),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            depth_limit: None,
            item_limit: ItemLimit::Unlimited,
            beyond: None,
            sort: false,
            sort_reverse: false,
            sort_key: None,
            first: None,
            include_containers: Vec::new(),
            exclude_containers: Vec::new(),
            include_leaves: Vec::new(),
            exclude_leaves: Vec::new(),
            regex: false,
            mask: None,
            tokens: StyleTokens::default(),
            formatter: None,
            sticky_formatter: false,
            acceptable_errors: default_acceptable_errors(),
            denied_tag: default_denied_tag(),
        }
    }
}
