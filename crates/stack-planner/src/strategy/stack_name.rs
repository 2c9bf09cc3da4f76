// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Stack-name (custom group) strategy.
//!
//! Every function declares a `stackName`; all resources generated for
//! functions sharing a name are co-located in one partition.
//!
//! # Matching
//!
//! - Function-adjacent resources (the function, its permissions, versions,
//!   log group, ...) are matched by the longest normalised function name
//!   that prefixes their logical id.
//! - Gateway methods are matched to the function serving the route.
//!   Path-segment resources and the per-path `OPTIONS` method are matched
//!   only when every function routed through them is in the same group;
//!   otherwise they are shared and pinned to root, so no later strategy
//!   can move them either.
//!
//! Construction fails if any function lacks a `stackName` while the
//! strategy is active. Partial grouping is rejected rather than letting
//! the ungrouped functions fall back to root unnoticed.

use crate::naming::sanitize_partition_name;
use crate::registry::PartitionKind;
use crate::strategy::{
    is_always_root, is_gateway_route, Classification, FunctionIndex, GatewayIndex, GatewayRoutes,
    Migration, MigrationStrategy, StrategyPriority,
};
use crate::{FunctionRegistry, HttpEvent, Naming, PlannerError};
use std::collections::HashMap;
use template_ir::Resource;

/// Sanitised group name that marks a partition as shared infrastructure.
const SHARED: &str = "Shared";

/// Groups resources by their function's `stackName`.
#[derive(Debug, Clone, Default)]
pub struct StackNameStrategy {
    active: bool,
    functions: FunctionIndex,
    /// Function name → raw group key.
    group_of: HashMap<String, String>,
    gateway: GatewayRoutes,
}

impl StackNameStrategy {
    /// Builds the group map from the function registry.
    ///
    /// `events` and `naming` are optional collaborators: without naming no
    /// resource matches, without events gateway resources are not claimed.
    pub fn new(
        active: bool,
        registry: &dyn FunctionRegistry,
        events: Option<&[HttpEvent]>,
        naming: Option<&dyn Naming>,
    ) -> Result<Self, PlannerError> {
        if !active {
            return Ok(Self::default());
        }

        let mut group_of = HashMap::new();
        for function in registry.functions() {
            match function.stack_name.as_deref().map(str::trim) {
                Some(group) if !group.is_empty() => {
                    group_of.insert(function.name.clone(), group.to_string());
                }
                _ => {
                    return Err(PlannerError::MissingStackName {
                        function: function.name.clone(),
                    })
                }
            }
        }

        let functions =
            FunctionIndex::new(registry.functions().iter().map(|f| f.name.as_str()), naming);
        let gateway = GatewayIndex::new(events, naming).resolve(|f| group_of.get(f).cloned());

        tracing::debug!(
            "stack-name strategy: {} functions in {} groups, {} gateway resources mapped",
            group_of.len(),
            group_of.values().collect::<std::collections::HashSet<_>>().len(),
            gateway.len(),
        );

        Ok(Self {
            active,
            functions,
            group_of,
            gateway,
        })
    }

    fn owning_function(&self, resource: &Resource) -> Option<&str> {
        if is_gateway_route(resource) {
            self.gateway.owner(&resource.logical_id)
        } else {
            self.functions
                .match_prefix(&resource.logical_id)
                .map(|entry| entry.name.as_str())
        }
    }
}

impl MigrationStrategy for StackNameStrategy {
    fn name(&self) -> &str {
        "stack-name"
    }

    fn priority(&self) -> StrategyPriority {
        StrategyPriority::StackName
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn classify(&mut self, resource: &Resource) -> Classification {
        if !self.active || is_always_root(resource) {
            return Classification::Decline;
        }
        if is_gateway_route(resource) && self.gateway.is_shared(&resource.logical_id) {
            return Classification::PinRoot;
        }
        let Some(group) = self
            .owning_function(resource)
            .and_then(|function| self.group_of.get(function))
        else {
            return Classification::Decline;
        };

        let destination = sanitize_partition_name(group);
        let kind = if destination == SHARED {
            PartitionKind::Shared
        } else {
            PartitionKind::CustomGroup
        };
        let reason = format!("Grouped by stackName: {group}");
        Classification::Claim(Migration::new(destination, kind, reason))
    }
}
