use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "metadelta",
    about = "Structural diff, composition and change packaging for XML metadata",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Split a metadata document into one file per entry
    Decompose(DecomposeArgs),
    /// Rebuild a metadata document from a directory of entry files
    Compose(ComposeArgs),
    /// Show changed and removed entries between two documents
    Diff(DiffArgs),
    /// Build a change package between two revisions
    Changeset(ChangesetArgs),
}

#[derive(Args)]
pub struct DecomposeArgs {
    /// Document to split
    pub file: PathBuf,
    /// Directory receiving the entry files
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct ComposeArgs {
    /// Directory of entry files
    pub input: PathBuf,
    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct DiffArgs {
    /// Old revision of the document
    pub old: PathBuf,
    /// New revision of the document
    pub new: PathBuf,
    /// Section reported even when unchanged
    #[arg(long = "always", value_name = "SECTION")]
    pub always: Vec<String>,
}

#[derive(Args)]
pub struct ChangesetArgs {
    /// Base revision
    #[arg(long)]
    pub from: String,
    /// Target revision; the working tree when omitted
    #[arg(long)]
    pub to: Option<String>,
    /// Change package directory
    #[arg(short, long)]
    pub output: PathBuf,
    /// Destructive package directory
    #[arg(long)]
    pub destructive: Option<PathBuf>,
    /// Configuration file; `metadelta.toml` in the repository when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Worker threads
    #[arg(short, long)]
    pub jobs: Option<usize>,
    /// Repository root
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,
    /// Override the configured source root
    #[arg(long)]
    pub source_root: Option<String>,
    /// Override the manifest API version
    #[arg(long)]
    pub api_version: Option<String>,
    /// Skip writing package manifests
    #[arg(long)]
    pub no_manifest: bool,
}
