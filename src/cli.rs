//! CLI argument parsing for the provisioning workflow.
//!
//! The CLI only collects inputs; configuration layering and every decision
//! about workspace state live in the library modules.
use crate::tool::IMPORT_KIND_REST;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "gqlprov",
    version,
    about = "Provision and deploy a GraphQL-over-REST API with the StepZen CLI",
    after_help = "Commands:\n  provision   Clean, init, login, configure, verify, deploy, and start\n  status      Report workspace, credential, and schema state\n  clean       Remove the tool cache from the workspace\n\nExamples:\n  gqlprov provision --workspace ./api\n  gqlprov provision --mode import --query-name users --query-type User --import-name users\n  gqlprov status --workspace ./api --json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Emit debug-level logs (RUST_LOG overrides)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Provision(ProvisionArgs),
    Status(StatusArgs),
    Clean(CleanArgs),
}

/// Inputs shared by every command that touches a workspace.
#[derive(Args, Debug, Clone)]
pub struct WorkspaceArgs {
    /// Workspace directory holding generated artifacts (defaults to the config value or `.`)
    #[arg(long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// How the Configure step produces schema files.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Synthesize the schema from the base fragment
    Static,
    /// Derive the schema with the tool's `import` subcommand
    Import,
}

/// Provision command inputs.
#[derive(Parser, Debug)]
#[command(about = "Run the full provisioning pipeline")]
pub struct ProvisionArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    /// Configure mode
    #[arg(long, value_enum, default_value_t = ModeArg::Static)]
    pub mode: ModeArg,

    /// Deployment endpoint as folder/name
    #[arg(long, value_name = "NAME")]
    pub api_name: Option<String>,

    /// REST endpoint bound to the generated Query field
    #[arg(long, value_name = "URL")]
    pub rest_endpoint: Option<String>,

    /// Import source kind (`rest` uses the curl importer)
    #[arg(long, value_name = "KIND", default_value = IMPORT_KIND_REST)]
    pub import_kind: String,

    /// Import connection (REST URL for `rest`; defaults to the REST endpoint)
    #[arg(long, value_name = "CONN")]
    pub import_connection: Option<String>,

    /// Query field name for REST imports
    #[arg(long, value_name = "NAME")]
    pub query_name: Option<String>,

    /// Query type name for REST imports
    #[arg(long, value_name = "TYPE")]
    pub query_type: Option<String>,

    /// Schema name for REST imports
    #[arg(long, value_name = "NAME")]
    pub import_name: Option<String>,

    /// Per-command timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Keep the existing tool cache instead of removing it first
    #[arg(long)]
    pub keep_cache: bool,

    /// Stop after deploy instead of starting the API
    #[arg(long)]
    pub no_start: bool,

    /// Emit the step report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Status command inputs.
#[derive(Parser, Debug)]
#[command(about = "Summarize workspace provisioning state")]
pub struct StatusArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

/// Clean command inputs.
#[derive(Parser, Debug)]
#[command(about = "Remove the tool cache from the workspace")]
pub struct CleanArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
}
