// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Template loading from disk.
//!
//! Accepts either a path to a compiled template file or a directory that
//! contains one under the conventional packaging name.

use crate::{template, Template, TemplateError};
use std::path::{Path, PathBuf};

/// Conventional file name of the compiled template inside a package directory.
pub const TEMPLATE_FILE: &str = "cloudformation-template-update-stack.json";

/// Loads a template from disk into a validated [`Template`].
///
/// # Example
/// ```no_run
/// use template_ir::TemplateLoader;
/// use std::path::Path;
///
/// let template = TemplateLoader::load(Path::new("./.serverless")).unwrap();
/// println!("Loaded {} resources", template.num_resources());
/// ```
pub struct TemplateLoader;

impl TemplateLoader {
    /// Loads and validates a template from a file or package directory.
    pub fn load(path: &Path) -> Result<Template<template::Validated>, TemplateError> {
        let file = Self::resolve(path);
        tracing::debug!("loading template from '{}'", file.display());
        let content = std::fs::read_to_string(&file)?;
        let template = Template::from_json(&content)?.validate()?;
        tracing::info!("{}", template.summary());
        Ok(template)
    }

    /// Resolves a directory to the template file it contains.
    pub fn resolve(path: &Path) -> PathBuf {
        if path.is_dir() {
            path.join(TEMPLATE_FILE)
        } else {
            path.to_path_buf()
        }
    }
}
