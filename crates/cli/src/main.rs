//! Kube Panel CLI
//!
//! A command-line client for the panel API: list and inspect resources,
//! show cluster usage, and create, apply or delete manifests.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{cluster, manifests, parse_kind, resources};
use panel_lib::ResourceKind;
use std::path::PathBuf;

/// Kube Panel CLI
#[derive(Parser)]
#[command(name = "kpctl")]
#[command(author, version, about = "CLI for the Kube Panel dashboard", long_about = None)]
pub struct Cli {
    /// Panel endpoint URL (can also be set via KPCTL_PANEL_URL env var)
    #[arg(long, env = "KPCTL_PANEL_URL")]
    pub panel_url: Option<String>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<output::OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List resources of one kind
    Get {
        /// Resource kind (nodes, pods, services, namespaces, deployments, ingresses)
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,

        /// Namespace (all namespaces if not specified)
        #[arg(long, short)]
        namespace: Option<String>,
    },

    /// Show cluster-wide CPU, memory and storage usage
    Metrics,

    /// Show the manifest of a single resource
    Show {
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,

        /// Resource name
        name: String,

        #[arg(long, short)]
        namespace: Option<String>,
    },

    /// Create a resource from a manifest file
    Create {
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,

        /// YAML or JSON manifest
        #[arg(long, short)]
        file: PathBuf,
    },

    /// Replace a resource with the manifest from a file
    Apply {
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,

        /// Resource name
        name: String,

        /// YAML or JSON manifest
        #[arg(long, short)]
        file: PathBuf,

        #[arg(long, short)]
        namespace: Option<String>,
    },

    /// Delete a resource
    Delete {
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,

        /// Resource name
        name: String,

        #[arg(long, short)]
        namespace: Option<String>,
    },
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::Config::load()?;
    let format = cli
        .format
        .unwrap_or_else(|| output::OutputFormat::from_config(config.default_format.as_deref()));

    // Initialize client
    let client = client::ApiClient::new(&config.panel_url(cli.panel_url))?;

    // Execute command
    match cli.command {
        Commands::Get { kind, namespace } => {
            resources::list(&client, kind, namespace, format).await?;
        }
        Commands::Metrics => {
            cluster::show_metrics(&client, format).await?;
        }
        Commands::Show {
            kind,
            name,
            namespace,
        } => {
            resources::show(&client, kind, &config.namespace(namespace), &name).await?;
        }
        Commands::Create { kind, file } => {
            manifests::create(&client, kind, &file, format).await?;
        }
        Commands::Apply {
            kind,
            name,
            file,
            namespace,
        } => {
            manifests::apply(&client, kind, &config.namespace(namespace), &name, &file, format)
                .await?;
        }
        Commands::Delete {
            kind,
            name,
            namespace,
        } => {
            manifests::delete(&client, kind, &config.namespace(namespace), &name, format).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
