//! json-inspector command line
//!
//! # Usage
//!
//! ```bash
//! # Render a document, collapsed to the configured depth
//! json-inspector tree payload.json
//!
//! # Fully expanded, with a node selected
//! cat payload.json | json-inspector tree - --expand-all --select 'users[0].roles'
//!
//! # Run a query against a configured source
//! json-inspector query tracker --options '{"operation": "find_issue", "issue_id": "PRJ-1"}'
//!
//! # Check a source is reachable
//! json-inspector test-connection tracker
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use json_inspector::{
    inspect_document, logging, run_source_query, test_source_connection, InspectOptions,
    InspectorConfig,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "json-inspector")]
#[command(version)]
#[command(about = "Inspect JSON documents as trees and query Jira or RethinkDB sources")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: config/inspector.yaml)
    #[arg(long, global = true, env = "JSON_INSPECTOR_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a JSON document as a tree
    Tree {
        /// Input file, `-` for stdin
        file: PathBuf,

        /// Expand every composite node
        #[arg(long)]
        expand_all: bool,

        /// Path of the node to select, e.g. `a.b[0]`
        #[arg(long)]
        select: Option<String>,

        /// Path of the node to hover
        #[arg(long)]
        hover: Option<String>,
    },

    /// Run a query against a configured source
    Query {
        /// Source name from the config
        source: String,

        /// Query options as JSON
        #[arg(long)]
        options: String,

        /// Data source id passed to the plugin
        #[arg(long, default_value = "cli")]
        data_source_id: String,
    },

    /// Test the connection of a configured source
    TestConnection {
        /// Source name from the config
        source: String,
    },
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    logging::init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Tree {
            file,
            expand_all,
            select,
            hover,
        } => cmd_tree(
            cli.config,
            file,
            InspectOptions {
                expand_all,
                select,
                hover,
            },
        ),
        Commands::Query {
            source,
            options,
            data_source_id,
        } => cmd_query(cli.config, &source, &options, &data_source_id).await,
        Commands::TestConnection { source } => cmd_test_connection(cli.config, &source).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

fn cmd_tree(config: Option<PathBuf>, file: PathBuf, options: InspectOptions) -> Result<()> {
    let config = InspectorConfig::load(config.as_deref())?;
    let document = read_input(&file)?;
    let painted = inspect_document(&document, &config.tree, &options)?;
    print!("{painted}");
    Ok(())
}

async fn cmd_query(
    config: Option<PathBuf>,
    source: &str,
    options: &str,
    data_source_id: &str,
) -> Result<()> {
    let config = InspectorConfig::load(config.as_deref())?;
    let query_options: serde_json::Value =
        serde_json::from_str(options).context("--options is not valid JSON")?;

    let registry = query_plugins::default_registry();
    let result =
        run_source_query(&config, &registry, source, &query_options, data_source_id).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn cmd_test_connection(config: Option<PathBuf>, source: &str) -> Result<()> {
    let config = InspectorConfig::load(config.as_deref())?;
    let registry = query_plugins::default_registry();
    let result = test_source_connection(&config, &registry, source).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn read_input(file: &Path) -> Result<String> {
    if file.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
    }
}
