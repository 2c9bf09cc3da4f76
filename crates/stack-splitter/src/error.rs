// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the splitting pipeline.

/// Errors that abort a split before any document is produced.
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    /// A reference names something that is neither a resource, a template
    /// parameter nor a pseudo parameter.
    #[error("resource '{source_id}' references '{target}', which is not defined in the template")]
    UnresolvedReference { source_id: String, target: String },

    /// Partitions depend on each other in a cycle.
    #[error(
        "circular dependency between nested stacks: {}. \
         Move the mutually referencing resources into the same stack or into root.",
        partitions.join(", ")
    )]
    DependencyCycle { partitions: Vec<String> },

    /// The template could not be loaded or is malformed.
    #[error("template error: {0}")]
    TemplateError(#[from] template_ir::TemplateError),

    /// Classification failed.
    #[error("planner error: {0}")]
    PlannerError(#[from] stack_planner::PlannerError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
