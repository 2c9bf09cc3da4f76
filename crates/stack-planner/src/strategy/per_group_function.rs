// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Hash-bucketed function groups.
//!
//! Function-adjacent resources are spread over a fixed number of
//! partitions `FunctionGroup1..=FunctionGroupN` by a hash of the
//! normalised function name. The hash is FNV-1a over the UTF-8 bytes, so
//! a function stays in the same bucket across runs and toolchains.

use crate::registry::PartitionKind;
use crate::strategy::{
    is_gateway_route, Classification, FunctionIndex, Migration, MigrationStrategy, StrategyPriority,
};
use crate::{FunctionRegistry, Naming};
use template_ir::Resource;

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a.
pub fn stable_hash(s: &str) -> u32 {
    s.bytes()
        .fold(FNV_OFFSET, |hash, b| (hash ^ u32::from(b)).wrapping_mul(FNV_PRIME))
}

/// Buckets function resources into `nested_stack_count` partitions.
#[derive(Debug, Clone)]
pub struct PerGroupFunction {
    active: bool,
    functions: FunctionIndex,
    nested_stack_count: u32,
}

impl PerGroupFunction {
    /// A `nested_stack_count` of zero is treated as one.
    pub fn new(
        active: bool,
        registry: &dyn FunctionRegistry,
        naming: Option<&dyn Naming>,
        nested_stack_count: u32,
    ) -> Self {
        Self {
            active,
            functions: FunctionIndex::new(registry.functions().iter().map(|f| f.name.as_str()), naming),
            nested_stack_count: nested_stack_count.max(1),
        }
    }

    /// Returns the 1-based bucket of a normalised function name.
    pub fn bucket(&self, normalized: &str) -> u32 {
        1 + stable_hash(normalized) % self.nested_stack_count
    }
}

impl MigrationStrategy for PerGroupFunction {
    fn name(&self) -> &str {
        "per-group-function"
    }

    fn priority(&self) -> StrategyPriority {
        StrategyPriority::PerGroupFunction
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn classify(&mut self, resource: &Resource) -> Classification {
        if is_gateway_route(resource) {
            return Classification::Decline;
        }
        let Some(entry) = self.functions.match_prefix(&resource.logical_id) else {
            return Classification::Decline;
        };
        let bucket = self.bucket(&entry.normalized);
        Classification::Claim(Migration::new(
            format!("FunctionGroup{bucket}"),
            PartitionKind::PerGroupFunction,
            format!("Function group {bucket}: {}", entry.name),
        ))
    }
}
