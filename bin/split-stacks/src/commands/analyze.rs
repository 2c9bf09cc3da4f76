// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `split-stacks analyze` command: dry run that prints the analysis report.

use stack_planner::{AwsNaming, Placements};
use stack_splitter::{SplitConfig, Splitter};
use std::path::PathBuf;

pub async fn execute(
    config: Option<PathBuf>,
    template: PathBuf,
    service: PathBuf,
    json: bool,
) -> anyhow::Result<()> {
    let config = SplitConfig {
        analyze: true,
        ..super::load_config(config.as_deref())?
    };
    let (template, service) = super::load_inputs(&template, &service).await?;

    let output = Splitter::new(config, template)
        .classify(&service, Some(&AwsNaming), &Placements::new())?
        .link()?
        .sequence()?;

    let Some(analysis) = output.analysis else {
        anyhow::bail!("analysis was not produced");
    };
    if json {
        println!("{}", analysis.to_json()?);
    } else {
        println!("{}", analysis.to_markdown());
    }
    Ok(())
}
