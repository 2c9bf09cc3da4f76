// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the stack planner.

/// Errors that can occur while classifying resources into partitions.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// A function lacks the grouping key while the stack-name strategy is active.
    #[error(
        "Function \"{function}\" must have a stackName defined when using the perStackName strategy. \
         Add a stackName to every function or disable the perStackName strategy."
    )]
    MissingStackName { function: String },

    /// A resource was assigned to a second partition without `force`.
    #[error("resource '{logical_id}' is already assigned to '{existing}', refusing to also assign it to '{requested}'")]
    DuplicateAssignment {
        logical_id: String,
        existing: String,
        requested: String,
    },

    /// A custom rule cannot match anything or has no destination.
    #[error("invalid custom rule #{index}: {detail}")]
    InvalidRule { index: usize, detail: String },

    /// The service description could not be read or parsed.
    #[error("invalid service definition: {0}")]
    InvalidService(String),
}
