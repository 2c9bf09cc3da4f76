// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared loading helpers.

pub mod analyze;
pub mod inspect;
pub mod split;

use anyhow::Context;
use stack_planner::ServiceDefinition;
use stack_splitter::SplitConfig;
use std::path::{Path, PathBuf};
use template_ir::{template::Validated, Template, TemplateLoader};
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Loads the split config, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<SplitConfig> {
    match path {
        Some(path) => SplitConfig::from_file(path)
            .with_context(|| format!("failed to load config from '{}'", path.display())),
        None => Ok(SplitConfig::default()),
    }
}

/// Loads the template and the service description.
pub async fn load_inputs(
    template: &Path,
    service: &Path,
) -> anyhow::Result<(Template<Validated>, ServiceDefinition)> {
    let template_path: PathBuf = TemplateLoader::resolve(template);
    let content = tokio::fs::read_to_string(&template_path)
        .await
        .with_context(|| format!("failed to read template '{}'", template_path.display()))?;
    let template = Template::from_json(&content)
        .and_then(|t| t.validate())
        .with_context(|| format!("invalid template '{}'", template_path.display()))?;

    let content = tokio::fs::read_to_string(service)
        .await
        .with_context(|| format!("failed to read service '{}'", service.display()))?;
    let service = ServiceDefinition::from_json(&content)
        .with_context(|| format!("invalid service '{}'", service.display()))?;

    Ok((template, service))
}
