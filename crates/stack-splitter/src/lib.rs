// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # stack-splitter
//!
//! Turns a classified template into deployable nested stacks.
//!
//! The splitter takes:
//! - A validated `Template` from `template-ir`.
//! - A frozen `Assignment` produced by the `stack-planner` strategy chain.
//!
//! And produces a root document with one stack resource per partition,
//! one document per partition, the placement manifest and, optionally, an
//! analysis report.
//!
//! # Type-State Pipeline
//! ```text
//! Splitter<Idle> → Splitter<Classified> → Splitter<Linked> → SplitOutput
//! ```
//! Transitions are compile-time checked.
//!
//! # Stages
//! - [`rewrite`]: cross-partition references become outputs on the
//!   exporting side and parameters on the importing side.
//! - [`sequence`]: partitions are levelled so every stack deploys after
//!   the stacks it imports from; cycles are fatal.
//! - [`analysis`]: read-only diagnostics over the result.

pub mod analysis;
mod config;
mod error;
pub mod rewrite;
pub mod sequence;
mod splitter;

pub use analysis::{log_summary, StackAnalysis};
pub use config::SplitConfig;
pub use error::SplitError;
pub use rewrite::{link, CrossReference, LinkOptions, LinkedTemplate, NestedDocument};
pub use sequence::{DependencyGraph, DependencyNode};
pub use splitter::{Classified, Idle, Linked, SplitOutput, SplitState, Splitter};
