// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # template-ir
//!
//! In-memory representation of a declarative infrastructure template.
//!
//! - [`Resource`] — one named resource: type, properties, `DependsOn`.
//! - [`Template`] — the whole document with resources in document order,
//!   using a **type-state pattern** (`Loaded` → `Validated`).
//! - [`Reference`] — a derived edge between resources, found by a
//!   structural scan for `Ref`, `Fn::GetAtt`, `Fn::Sub` and `Fn::Join`.
//! - [`TemplateLoader`] — reads a compiled template from disk.
//!
//! # Example
//! ```no_run
//! use template_ir::TemplateLoader;
//! use std::path::Path;
//!
//! let template = TemplateLoader::load(Path::new("./.serverless")).unwrap();
//! println!("{}", template.summary());
//! for resource in template.iter_resources() {
//!     println!("  {}", resource.summary());
//! }
//! ```

mod error;
mod loader;
pub mod references;
mod resource;
pub mod template;

pub use error::TemplateError;
pub use loader::{TemplateLoader, TEMPLATE_FILE};
pub use references::{find_references, rewrite_references, Reference, ReferenceKind, Rewrite};
pub use resource::Resource;
pub use template::Template;
