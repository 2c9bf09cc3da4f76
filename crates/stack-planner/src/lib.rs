// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # stack-planner
//!
//! Classifies the resources of a validated `Template` into nested-stack
//! partitions using an ordered chain of pluggable strategies.
//!
//! # Strategies
//!
//! | Priority | Strategy | Destination |
//! |---|---|---|
//! | 1 | [`CustomRules`] | Destination of the first matching rule |
//! | 2 | [`StackNameStrategy`] | The function's `stackName` group |
//! | 3 | [`PerFunction`] | One partition per function (suffixed) |
//! | 4 | [`PerType`] | One partition per type family (suffixed) |
//! | 5 | [`PerGroupFunction`] | `FunctionGroup<k>` hash buckets |
//!
//! The first strategy to claim a resource wins; unclaimed resources stay
//! in root. A strategy may also pin a resource to root, which ends the
//! chain for it. Identity roles, the deployment bucket and the API entry
//! point never leave root.
//!
//! # Trait-Based Extensibility
//!
//! All strategies implement [`MigrationStrategy`]:
//!
//! ```ignore
//! struct Queues;
//! impl MigrationStrategy for Queues {
//!     fn name(&self) -> &str { "queues" }
//!     fn priority(&self) -> StrategyPriority { StrategyPriority::Custom }
//!     fn is_active(&self) -> bool { true }
//!     fn classify(&mut self, r: &Resource) -> Classification {
//!         if r.is_type("SQS", "Queue") {
//!             Classification::Claim(Migration::new("Queues", PartitionKind::Custom, "queue"))
//!         } else {
//!             Classification::Decline
//!         }
//!     }
//! }
//! ```
//!
//! # Example
//! ```no_run
//! use stack_planner::{AwsNaming, Placements, ServiceDefinition, StackNameStrategy, StrategyEngine};
//! use template_ir::TemplateLoader;
//! use std::path::Path;
//!
//! let template = TemplateLoader::load(Path::new("./.serverless")).unwrap();
//! let service = ServiceDefinition::from_file(Path::new("service.json")).unwrap();
//! let strategy = StackNameStrategy::new(true, &service, None, Some(&AwsNaming)).unwrap();
//! let mut engine = StrategyEngine::new(vec![Box::new(strategy)]);
//! let assignment = engine.classify(&template, &Placements::new()).unwrap().freeze(&template);
//! println!("{}", assignment.summary());
//! ```

mod engine;
mod error;
mod naming;
pub mod registry;
mod service;
pub mod strategy;

pub use engine::{StrategyEngine, StrategyReport, EXISTING_REASON};
pub use error::PlannerError;
pub use naming::{sanitize_partition_name, AwsNaming, Naming};
pub use registry::{
    Assignment, Location, Partition, PartitionKind, PartitionRegistry, Placements, StackPlacement,
    ROOT,
};
pub use service::{EventSource, FunctionDef, FunctionRegistry, HttpEvent, ServiceDefinition};
pub use strategy::custom::{CustomRule, CustomRules};
pub use strategy::per_function::PerFunction;
pub use strategy::per_group_function::PerGroupFunction;
pub use strategy::per_type::{PerType, DEFAULT_TYPE_MAP};
pub use strategy::stack_name::StackNameStrategy;
pub use strategy::{is_always_root, Classification, Migration, MigrationStrategy, StrategyPriority};
