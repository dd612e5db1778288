use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod artifacts;
mod cli;
mod error;
mod tool;
mod util;
mod workflow;
mod workspace;

use cli::{CleanArgs, Command, ModeArg, ProvisionArgs, RootArgs, StatusArgs, WorkspaceArgs};
use tool::{ImportSource, ProcessRunner};
use workflow::{ConfigureMode, PipelineOptions, ProvisioningPipeline};
use workspace::{CredentialStore, ProvisionConfig, WorkspacePaths};

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Provision(args) => cmd_provision(&args),
        Command::Status(args) => cmd_status(&args),
        Command::Clean(args) => cmd_clean(&args),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_provision(args: &ProvisionArgs) -> Result<()> {
    let mut config = layered_config(&args.workspace)?;
    if let Some(api_name) = &args.api_name {
        config.api_name = api_name.clone();
    }
    if let Some(endpoint) = &args.rest_endpoint {
        config.rest_endpoint = endpoint.clone();
    }
    if let Some(timeout_secs) = args.timeout_secs {
        config.timeout_secs = timeout_secs;
    }
    workspace::validate_config(&config)?;

    let options = PipelineOptions {
        mode: configure_mode(args, &config),
        clean: !args.keep_cache,
        start: !args.no_start,
    };
    let runner = ProcessRunner::new(
        &config.tool_command,
        &config.workspace_dir,
        Duration::from_secs(config.timeout_secs),
    )?;
    let credentials = CredentialStore::new(workspace::credentials_path(&config)?);
    let pipeline = ProvisioningPipeline::new(&config, credentials, &runner);

    tracing::info!(
        workspace = %config.workspace_dir.display(),
        api = %config.api_name,
        "provisioning"
    );
    let report = pipeline.run(&options)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

fn cmd_status(args: &StatusArgs) -> Result<()> {
    let config = layered_config(&args.workspace)?;
    let paths = WorkspacePaths::new(config.workspace_dir.clone());
    let credentials = CredentialStore::new(workspace::credentials_path(&config)?);
    let status = workflow::workspace_status(&paths, &credentials)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print!("{}", workflow::render_status_text(&status));
    }
    Ok(())
}

fn cmd_clean(args: &CleanArgs) -> Result<()> {
    let config = layered_config(&args.workspace)?;
    let paths = WorkspacePaths::new(config.workspace_dir.clone());
    let removed = workspace::clean_cache(&paths.cache_dir())?;
    if removed {
        println!("removed {}", paths.cache_dir().display());
    } else {
        println!("no cache at {}", paths.cache_dir().display());
    }
    Ok(())
}

/// Defaults, then the config file, then environment, then `--workspace`.
fn layered_config(args: &WorkspaceArgs) -> Result<ProvisionConfig> {
    let mut config = workspace::load_config(args.config.as_deref())?;
    workspace::apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    if let Some(dir) = &args.workspace {
        config.workspace_dir = dir.clone();
    }
    config.workspace_dir = absolute_dir(&config.workspace_dir)?;
    Ok(config)
}

fn absolute_dir(dir: &std::path::Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(anyhow!("workspace {} is not a directory", dir.display()));
    }
    dir.canonicalize()
        .with_context(|| format!("resolve workspace {}", dir.display()))
}

fn configure_mode(args: &ProvisionArgs, config: &ProvisionConfig) -> ConfigureMode {
    match args.mode {
        ModeArg::Static => ConfigureMode::Static,
        ModeArg::Import if ImportSource::is_rest_kind(&args.import_kind) => {
            ConfigureMode::Import(ImportSource::Rest {
                endpoint: args
                    .import_connection
                    .clone()
                    .unwrap_or_else(|| config.rest_endpoint.clone()),
                query_name: args.query_name.clone(),
                query_type: args.query_type.clone(),
                name: args.import_name.clone(),
                headers: config.rest_headers.clone(),
            })
        }
        ModeArg::Import => ConfigureMode::Import(ImportSource::Other {
            kind: args.import_kind.clone(),
            connection: args.import_connection.clone(),
        }),
    }
}
