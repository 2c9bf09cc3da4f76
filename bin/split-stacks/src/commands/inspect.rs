// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `split-stacks inspect` command: display template structure.
//!
//! Prints resource counts by type and how close the template is to the
//! per-document resource ceiling. With `--resource`, also lists every
//! reference pointing at that logical id.

use stack_planner::is_always_root;
use stack_splitter::analysis::RESOURCE_CEILING;
use std::path::PathBuf;
use template_ir::TemplateLoader;

pub async fn execute(template: PathBuf, resource: Option<String>) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║            split-stacks · Template Inspector        ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let path = TemplateLoader::resolve(&template);
    let template = TemplateLoader::load(&path).map_err(|e| {
        anyhow::anyhow!("failed to load template from '{}': {e}", path.display())
    })?;

    // ── Summary ────────────────────────────────────────────────
    let total = template.num_resources();
    let pinned = template.iter_resources().filter(|r| is_always_root(r)).count();
    let conditional = template
        .iter_resources()
        .filter(|r| r.condition.is_some())
        .count();

    println!("  Template: {}", path.display());
    println!("  Resources: {total} / {RESOURCE_CEILING}");
    println!("  References: {}", template.num_references());
    println!("  Parameters: {}", template.parameters.len());
    println!("  Pinned to root: {pinned} (+{conditional} conditional)");
    println!();

    // ── Per-Type Detail ────────────────────────────────────────
    let mut counts: Vec<_> = template.type_counts().into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    println!("  {:<44} {:>8}", "Type", "Count");
    println!("  {}", "-".repeat(54));
    for (resource_type, count) in counts {
        println!("  {:<44} {:>8}", truncate(resource_type, 44), count);
    }
    println!();

    if total > RESOURCE_CEILING {
        println!("  Over the ceiling by {}: a split is required.", total - RESOURCE_CEILING);
    }

    // ── Referrers ──────────────────────────────────────────────
    if let Some(id) = resource {
        if template.resource(&id).is_none() && !template.is_parameter(&id) {
            anyhow::bail!("'{id}' is neither a resource nor a parameter of the template");
        }
        let referrers = template.references_to(&id);
        println!();
        println!("  References to {id}: {}", referrers.len());
        for r in &referrers {
            let attr = r.attribute.as_deref().map(|a| format!(".{a}")).unwrap_or_default();
            println!("    ├─ {} ({}{attr})", r.source_id, r.kind);
        }
    }
    Ok(())
}

/// Truncates a string to `max_len` with ellipsis if needed.
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
