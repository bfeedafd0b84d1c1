//! Parser options.

use derive_builder::Builder;

const RESERVED: &str = "/:?\"*<>|";
const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Letters, digits and punctuation, minus characters that cannot appear in
/// a portable file name.
fn filtered_keyboard() -> String {
    ('a'..='z')
        .chain('A'..='Z')
        .chain('0'..='9')
        .chain(PUNCTUATION.chars())
        .filter(|c| !RESERVED.contains(*c))
        .collect()
}

/// Characters that may open a name; everything before the first of them
/// is structural header.
pub fn default_start_chars() -> String {
    filtered_keyboard()
        .chars()
        .filter(|c| !"+=-".contains(*c))
        .collect()
}

/// Characters that may continue a name.
pub fn default_name_chars() -> String {
    let mut chars = filtered_keyboard();
    chars.push(' ');
    chars
}

/// Options for reading a diagram.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ParseOptions {
    /// Characters that open a name.
    #[builder(default = "default_start_chars()")]
    pub start_chars: String,

    /// Characters allowed inside a name.
    #[builder(default = "default_name_chars()")]
    pub name_chars: String,

    /// Regex matching the header at the start of each line; replaces
    /// `start_chars` when set.
    #[builder(default, setter(strip_option))]
    pub header_regex: Option<String>,

    /// Regex matching the name right after the header; replaces
    /// `name_chars` when set.
    #[builder(default, setter(strip_option))]
    pub name_regex: Option<String>,

    /// Name of the synthesized root when the diagram has several top-level
    /// entries.
    #[builder(default = "\"FakeDir\".to_string()")]
    pub super_name: String,

    /// Drop everything from `#` to the end of a name.
    #[builder(default = "true")]
    pub parse_comments: bool,

    /// Also accept non-ASCII letters and digits as start and name
    /// characters.
    #[builder(default = "true")]
    pub unicode_names: bool,
}

impl ParseOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref start) = self.start_chars {
            if start.is_empty() {
                return Err("start_chars cannot be empty".to_string());
            }
        }
        if let Some(ref name) = self.super_name {
            if name.is_empty() {
                return Err("super_name cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

impl ParseOptions {
    /// Create a new options builder.
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::default()
    }

    /// Whether `c` may open a name.
    pub fn is_start_char(&self, c: char) -> bool {
        self.start_chars.contains(c) || self.is_unicode_alphanumeric(c)
    }

    /// Whether `c` may continue a name.
    pub fn is_name_char(&self, c: char) -> bool {
        self.name_chars.contains(c) || self.is_unicode_alphanumeric(c)
    }

    fn is_unicode_alphanumeric(&self, c: char) -> bool {
        self.unicode_names && !c.is_ascii() && c.is_alphanumeric()
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            start_chars: default_start_chars(),
            name_chars: default_name_chars(),
            header_regex: None,
            name_regex: None,
            super_name: "FakeDir".to_string(),
            parse_comments: true,
            unicode_names: true,
        }
    }
}
