//! Built-in diagram styles and the eight tokens a render draws with.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::ConfigError;

/// Named token tables shipped with the renderer.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Style {
    /// Box-drawing branches (`├─`, `│ `, `└─`).
    #[default]
    Lines,
    /// ASCII pipes and dashes.
    Dash,
    /// Indentation only.
    Spaces,
    /// ASCII pluses.
    Plus,
    /// Indentation with `>` in front of every name.
    Arrow,
    /// Box-drawing branches with folder and page glyphs.
    Emoji,
}

impl Style {
    /// Parse a style name, reporting unknown names as configuration errors.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        name.parse()
            .map_err(|_| ConfigError::UnknownStyle(name.to_string()))
    }

    /// Token table at the default width of 2.
    pub fn tokens(self) -> StyleTokens {
        let (split, extend, last, start) = match self {
            Style::Lines => ("├─", "│ ", "└─", ""),
            Style::Dash => ("|-", "| ", "|-", ""),
            Style::Spaces => ("  ", "  ", "  ", ""),
            Style::Plus => ("+-", "| ", "+-", ""),
            Style::Arrow => ("  ", "  ", "  ", ">"),
            Style::Emoji => {
                return StyleTokens {
                    container_start: "📁 ".into(),
                    leaf_start: "📄 ".into(),
                    ..Style::Lines.tokens()
                };
            }
        };
        StyleTokens {
            split: split.into(),
            extend: extend.into(),
            space: "  ".into(),
            last: last.into(),
            container_start: start.into(),
            leaf_start: start.into(),
            container_end: "/".into(),
            leaf_end: CompactString::default(),
        }
    }
}

/// The strings a diagram is assembled from.
///
/// `split`, `extend`, `space` and `last` are the structural tokens scaled by
/// the indent width; the other four decorate node names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleTokens {
    /// Branch to a sibling that is not the last one.
    pub split: CompactString,
    /// Column filler below an ancestor with more siblings to come.
    pub extend: CompactString,
    /// Column filler below an ancestor that was the last sibling.
    pub space: CompactString,
    /// Branch to the last sibling.
    #[serde(rename = "final")]
    pub last: CompactString,
    /// Prefix of container names.
    pub container_start: CompactString,
    /// Prefix of leaf names.
    pub leaf_start: CompactString,
    /// Suffix of container names.
    pub container_end: CompactString,
    /// Suffix of leaf names.
    pub leaf_end: CompactString,
}

impl Default for StyleTokens {
    fn default() -> Self {
        Style::Lines.tokens()
    }
}

impl StyleTokens {
    /// Tokens of a built-in style scaled to `indent` columns.
    pub fn from_style(style: Style, indent: usize) -> Self {
        style.tokens().with_indent(indent)
    }

    /// Scale the structural tokens to `indent` characters.
    ///
    /// Width 0 empties them, a shorter width truncates, a longer one repeats
    /// each token's final character.
    pub fn with_indent(mut self, indent: usize) -> Self {
        for token in [
            &mut self.split,
            &mut self.extend,
            &mut self.space,
            &mut self.last,
        ] {
            *token = scale_token(token, indent);
        }
        self
    }

    /// Use one string for all four structural tokens.
    pub fn apply_uniform(&mut self, token: &str) {
        self.split = token.into();
        self.extend = token.into();
        self.space = token.into();
        self.last = token.into();
    }

    /// Use one prefix for both containers and leaves.
    pub fn apply_any_start(&mut self, token: &str) {
        self.container_start = token.into();
        self.leaf_start = token.into();
    }

    /// Use one suffix for both containers and leaves.
    pub fn apply_any_end(&mut self, token: &str) {
        self.container_end = token.into();
        self.leaf_end = token.into();
    }

    /// Set a single token by key.
    ///
    /// Keys are the field names, plus `final` for the last-sibling branch and
    /// the `folder*`/`file*` aliases for the name decorations.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let slot = match key {
            "split" => &mut self.split,
            "extend" => &mut self.extend,
            "space" => &mut self.space,
            "final" | "last" => &mut self.last,
            "container_start" | "folderstart" => &mut self.container_start,
            "leaf_start" | "filestart" => &mut self.leaf_start,
            "container_end" | "folderend" => &mut self.container_end,
            "leaf_end" | "fileend" => &mut self.leaf_end,
            "uniform" => {
                self.apply_uniform(value);
                return Ok(());
            }
            "anystart" | "any_start" => {
                self.apply_any_start(value);
                return Ok(());
            }
            "anyend" | "any_end" => {
                self.apply_any_end(value);
                return Ok(());
            }
            _ => return Err(ConfigError::UnknownToken(key.to_string())),
        };
        *slot = value.into();
        Ok(())
    }

    /// Start and end decoration for a node kind.
    pub fn decoration(&self, is_container: bool) -> (&str, &str) {
        if is_container {
            (self.container_start.as_str(), self.container_end.as_str())
        } else {
            (self.leaf_start.as_str(), self.leaf_end.as_str())
        }
    }
}

fn scale_token(token: &str, width: usize) -> CompactString {
    let len = token.chars().count();
    if width <= len {
        return token.chars().take(width).collect();
    }
    match token.chars().last() {
        Some(fill) => {
            let mut scaled = CompactString::from(token);
            scaled.extend(std::iter::repeat_n(fill, width - len));
            scaled
        }
        None => CompactString::default(),
    }
}
