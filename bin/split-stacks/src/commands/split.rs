// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `split-stacks split` command: classify, link, sequence and write.
//!
//! Runs the full type-state pipeline:
//! ```text
//! Splitter<Idle> → classify → <Classified> → link → <Linked> → sequence
//! ```
//! Nothing is written unless every stage succeeds.

use anyhow::Context;
use stack_planner::{AwsNaming, Placements};
use stack_splitter::Splitter;
use std::path::{Path, PathBuf};
use template_ir::{TemplateLoader, TEMPLATE_FILE};

/// File name of the placement manifest.
pub const PLACEMENTS_FILE: &str = "stack-placements.json";

pub async fn execute(
    config: Option<PathBuf>,
    template: PathBuf,
    service: PathBuf,
    out: Option<PathBuf>,
    existing: Option<PathBuf>,
    analyze: bool,
) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              split-stacks · Splitter                ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    // ── Configuration ──────────────────────────────────────────
    let mut split_config = super::load_config(config.as_deref())?;
    split_config.analyze |= analyze;

    let template_path = TemplateLoader::resolve(&template);
    let out_dir = match out {
        Some(dir) => dir,
        None => template_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    println!("  Config:");
    println!("   Template: {}", template_path.display());
    println!("   Service:  {}", service.display());
    println!("   Output:   {}", out_dir.display());
    println!();

    let (template, service) = super::load_inputs(&template_path, &service).await?;
    let existing = load_placements(existing, &out_dir).await?;

    // ── Type-State Pipeline ────────────────────────────────────
    println!("  [1/3] Classifying {} resources...", template.num_resources());
    let classified = Splitter::new(split_config, template).classify(
        &service,
        Some(&AwsNaming),
        &existing,
    )?;
    println!("        {}", classified.assignment().summary());

    println!("  [2/3] Rewriting cross-stack references...");
    let linked = classified.link()?;
    println!("        {}", linked.linked().summary());

    println!("  [3/3] Sequencing nested stacks...");
    let output = linked.sequence()?;
    for (level, stacks) in output.deployment_order().iter().enumerate() {
        println!("        Level {level}: {}", stacks.join(", "));
    }
    println!();

    // ── Write ──────────────────────────────────────────────────
    tokio::fs::create_dir_all(&out_dir)
        .await
        .with_context(|| format!("failed to create '{}'", out_dir.display()))?;

    write_json(&out_dir.join(TEMPLATE_FILE), &output.root).await?;
    for (file, doc) in &output.nested {
        write_json(&out_dir.join(file), doc).await?;
    }
    write(&out_dir.join(PLACEMENTS_FILE), output.placements_json()?).await?;

    if let Some(analysis) = &output.analysis {
        let stem = format!("stack-analysis-{}", analysis.timestamp.timestamp_millis());
        write(&out_dir.join(format!("{stem}.json")), analysis.to_json()?).await?;
        write(&out_dir.join(format!("{stem}-summary.md")), analysis.to_markdown()).await?;
        println!("  Analysis: {}", out_dir.join(format!("{stem}.json")).display());
    }

    println!("{}", output.log);
    println!(
        "  Wrote root + {} nested stacks to {}",
        output.nested.len(),
        out_dir.display()
    );
    Ok(())
}

/// Reads the explicit manifest, or the one a previous run left in `out_dir`.
async fn load_placements(explicit: Option<PathBuf>, out_dir: &Path) -> anyhow::Result<Placements> {
    let path = match explicit {
        Some(path) => path,
        None => {
            let previous = out_dir.join(PLACEMENTS_FILE);
            if !tokio::fs::try_exists(&previous).await.unwrap_or(false) {
                return Ok(Placements::new());
            }
            previous
        }
    };
    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read placements '{}'", path.display()))?;
    let placements: Placements = serde_json::from_str(&content)
        .with_context(|| format!("invalid placements '{}'", path.display()))?;
    tracing::info!("loaded {} existing placements from '{}'", placements.len(), path.display());
    Ok(placements)
}

async fn write_json(path: &Path, value: &serde_json::Value) -> anyhow::Result<()> {
    write(path, serde_json::to_string_pretty(value)?).await
}

async fn write(path: &Path, content: String) -> anyhow::Result<()> {
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("failed to write '{}'", path.display()))?;
    tracing::debug!("wrote '{}'", path.display());
    Ok(())
}
