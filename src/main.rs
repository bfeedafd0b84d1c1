//! dirgram - Render directory trees as text diagrams and read them back.
//!
//! Usage:
//!   dirgram [PATH]                  Draw a directory
//!   dirgram parse <FILE|->          Re-draw a diagram, or export it as JSON
//!   dirgram realize <FILE> <DEST>   Create a diagram's folders and files on disk
//!   dirgram --help                  Show help

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use tracing::debug;
use tracing_subscriber::prelude::*;

use dirgram_core::{
    Beyond, FirstKind, ItemLimit, ListErrorKind, Pattern, RenderConfig, Style, realize,
};
use dirgram_parse::ParseOptions;
use dirgram_render::{render_path, render_synthetic};

#[derive(Parser)]
#[command(
    name = "dirgram",
    version,
    about = "Render directory trees as text diagrams",
    long_about = "dirgram draws folder structures as text diagrams.\n\n\
                  Run `dirgram [PATH]` to draw a directory, or use the \
                  subcommands to work with diagrams you already have."
)]
struct Cli {
    /// Directory to draw (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    #[command(flatten)]
    render: RenderArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Read a diagram and draw it again with the given options
    Parse {
        /// Diagram file, or `-` for stdin
        input: PathBuf,

        /// Print the parsed tree as JSON instead of a diagram
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        parse: ParseArgs,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Create the folders and empty files of a diagram on disk
    Realize {
        /// Diagram file, or `-` for stdin
        input: PathBuf,

        /// Directory the diagram's root is created in
        dest: PathBuf,

        #[command(flatten)]
        parse: ParseArgs,
    },
}

/// Options shared by every command that draws a diagram.
#[derive(Args, Debug)]
struct RenderArgs {
    /// JSON render configuration; other flags are applied on top
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Built-in style: lines, dash, spaces, plus, arrow, emoji
    #[arg(short, long, value_parser = Style::parse)]
    style: Option<Style>,

    /// Width of each indentation level
    #[arg(short, long)]
    indent: Option<usize>,

    /// Deepest level whose contents are drawn
    #[arg(short, long)]
    depth_limit: Option<usize>,

    /// Children drawn per folder: `N`, `none`, or `FOLDERS,FILES`
    #[arg(short = 'n', long)]
    item_limit: Option<ItemLimit>,

    /// Line for hidden children: `ellipsis`, `content`, or `_text`
    #[arg(short, long, allow_hyphen_values = true)]
    beyond: Option<Beyond>,

    /// List folders or files first (implies sorting)
    #[arg(long)]
    first: Option<FirstKind>,

    /// Sort children by name
    #[arg(long)]
    sort: bool,

    /// Reverse the sort order
    #[arg(long)]
    sort_reverse: bool,

    /// Only draw folders matching PATTERN (repeatable)
    #[arg(long, value_name = "PATTERN")]
    include_folders: Vec<String>,

    /// Skip folders matching PATTERN (repeatable)
    #[arg(long, value_name = "PATTERN")]
    exclude_folders: Vec<String>,

    /// Only draw files matching PATTERN (repeatable)
    #[arg(long, value_name = "PATTERN")]
    include_files: Vec<String>,

    /// Skip files matching PATTERN (repeatable)
    #[arg(long, value_name = "PATTERN")]
    exclude_files: Vec<String>,

    /// Treat patterns as regular expressions
    #[arg(short, long)]
    regex: bool,

    /// Override one token, e.g. `split=|--` or `folderstart=[D] `
    #[arg(long, value_name = "KEY=VALUE", value_parser = parse_token)]
    token: Vec<(String, String)>,

    /// Listing failures to tag instead of abort on (repeatable)
    #[arg(long, value_name = "KIND")]
    tolerate: Vec<ListErrorKind>,

    /// Text appended to folders that could not be listed
    #[arg(long)]
    denied_tag: Option<String>,
}

/// Options for reading diagrams.
#[derive(Args, Debug)]
struct ParseArgs {
    /// Name of the root added when a diagram has several top-level entries
    #[arg(long, default_value = "FakeDir")]
    super_name: String,

    /// Keep `#` comments as part of names
    #[arg(long)]
    keep_comments: bool,
}

fn parse_token(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))
}

impl RenderArgs {
    /// Build the render configuration: config file first, then flags.
    fn to_config(&self) -> Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Invalid config file {}", path.display()))?
            }
            None => RenderConfig::default(),
        };

        if let Some(style) = self.style {
            config.tokens = style.tokens();
        }
        if let Some(indent) = self.indent {
            config.tokens = std::mem::take(&mut config.tokens).with_indent(indent);
        }
        for (key, value) in &self.token {
            config.tokens.set(key, value)?;
        }

        if self.depth_limit.is_some() {
            config.depth_limit = self.depth_limit;
        }
        if let Some(item_limit) = self.item_limit {
            config.item_limit = item_limit;
        }
        if self.beyond.is_some() {
            config.beyond.clone_from(&self.beyond);
        }
        if self.first.is_some() {
            config.first = self.first;
        }
        config.sort |= self.sort;
        config.sort_reverse |= self.sort_reverse;
        config.regex |= self.regex;

        for (target, patterns) in [
            (&mut config.include_containers, &self.include_folders),
            (&mut config.exclude_containers, &self.exclude_folders),
            (&mut config.include_leaves, &self.include_files),
            (&mut config.exclude_leaves, &self.exclude_files),
        ] {
            target.extend(patterns.iter().map(|p| Pattern::new(p.as_str())));
        }

        if !self.tolerate.is_empty() {
            config.acceptable_errors = self.tolerate.iter().copied().collect();
        }
        if let Some(tag) = &self.denied_tag {
            config.denied_tag.clone_from(tag);
        }

        config.validate()?;
        Ok(config)
    }
}

impl ParseArgs {
    fn to_options(&self) -> Result<ParseOptions> {
        ParseOptions::builder()
            .super_name(self.super_name.as_str())
            .parse_comments(!self.keep_comments)
            .build()
            .map_err(|e| eyre!("Invalid parse options: {e}"))
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Parse {
            input,
            json,
            parse,
            render,
        }) => {
            run_parse(&input, json, &parse, &render)?;
        }
        Some(Command::Realize { input, dest, parse }) => {
            run_realize(&input, &dest, &parse)?;
        }
        None => {
            let config = cli.render.to_config()?;
            let diagram = render_path(&cli.path, &config)
                .with_context(|| format!("Failed to draw {}", cli.path.display()))?;
            println!("{diagram}");
        }
    }

    Ok(())
}

/// Log to stderr so diagrams on stdout stay clean.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Read a diagram from a file, or from stdin for `-`.
fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        io::read_to_string(io::stdin()).context("Failed to read stdin")
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))
    }
}

/// Parse a diagram and print it again, or dump it as JSON.
fn run_parse(input: &Path, json: bool, parse: &ParseArgs, render: &RenderArgs) -> Result<()> {
    let text = read_input(input)?;
    let (tree, root) =
        dirgram_parse::parse_with(&text, &parse.to_options()?).context("Failed to parse diagram")?;
    debug!(nodes = tree.len(), "parsed diagram");

    if json {
        let snapshot = tree.snapshot(root)?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        let config = render.to_config()?;
        println!("{}", render_synthetic(&tree, root, &config)?);
    }

    Ok(())
}

/// Parse a diagram and create it under `dest`.
fn run_realize(input: &Path, dest: &Path, parse: &ParseArgs) -> Result<()> {
    let text = read_input(input)?;
    let (tree, root) =
        dirgram_parse::parse_with(&text, &parse.to_options()?).context("Failed to parse diagram")?;

    let created = realize(&tree, root, dest)
        .with_context(|| format!("Failed to create diagram in {}", dest.display()))?;
    eprintln!("Created {}", created.display());

    Ok(())
}
