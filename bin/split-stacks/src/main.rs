// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # split-stacks
//!
//! Command-line interface for the nested-stack splitter.
//!
//! ## Usage
//! ```bash
//! # Split a packaged template into nested stacks
//! split-stacks split --template .serverless --service service.json --config split.toml
//!
//! # Print the analysis report without writing anything
//! split-stacks analyze --template .serverless --service service.json
//!
//! # Inspect template structure
//! split-stacks inspect --template .serverless
//!
//! # Show everything that references one resource
//! split-stacks inspect --template .serverless --resource UsersTable
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "split-stacks",
    about = "Split an oversized infrastructure template into nested stacks",
    version,
    author
)]
struct Cli {
    /// Path to a TOML split configuration file.
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split the template and write root, nested documents and manifest.
    Split {
        /// Template file or package directory.
        #[arg(short, long, default_value = ".serverless")]
        template: std::path::PathBuf,

        /// Service description (JSON) with the functions and their events.
        #[arg(short, long)]
        service: std::path::PathBuf,

        /// Output directory; defaults to the template's directory.
        #[arg(short, long)]
        out: Option<std::path::PathBuf>,

        /// Placement manifest of a previous run.
        #[arg(short, long)]
        existing: Option<std::path::PathBuf>,

        /// Also write the analysis report.
        #[arg(long)]
        analyze: bool,
    },

    /// Classify and link without writing; print the analysis report.
    Analyze {
        /// Template file or package directory.
        #[arg(short, long, default_value = ".serverless")]
        template: std::path::PathBuf,

        /// Service description (JSON).
        #[arg(short, long)]
        service: std::path::PathBuf,

        /// Print JSON instead of markdown.
        #[arg(long)]
        json: bool,
    },

    /// Inspect a template: resource counts by type and reference totals.
    Inspect {
        /// Template file or package directory.
        #[arg(short, long, default_value = ".serverless")]
        template: std::path::PathBuf,

        /// List the references pointing at this logical id.
        #[arg(short, long)]
        resource: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging based on verbosity.
    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Split {
            template,
            service,
            out,
            existing,
            analyze,
        } => {
            commands::split::execute(cli.config, template, service, out, existing, analyze).await
        }
        Commands::Analyze {
            template,
            service,
            json,
        } => commands::analyze::execute(cli.config, template, service, json).await,
        Commands::Inspect { template, resource } => {
            commands::inspect::execute(template, resource).await
        }
    }
}
