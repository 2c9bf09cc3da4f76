// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for template loading and graph construction.

/// Errors that can occur when working with template representations.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The template file could not be read.
    #[error("failed to read template: {0}")]
    ReadError(#[from] std::io::Error),

    /// The template JSON is malformed.
    #[error("failed to parse template: {0}")]
    ParseError(#[from] serde_json::Error),

    /// A resource definition is invalid (e.g., missing `Type`).
    #[error("invalid resource '{logical_id}': {detail}")]
    InvalidResource { logical_id: String, detail: String },

    /// The template as a whole is malformed.
    #[error("invalid template: {0}")]
    InvalidTemplate(String),
}
