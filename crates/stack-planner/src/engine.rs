// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The classification pass.
//!
//! [`StrategyEngine::classify`] walks the template once, in document
//! order, and returns an owned [`PartitionRegistry`]:
//!
//! 1. Placements from a previous run are pinned first.
//! 2. Always-root resources and resources with a `Condition` are skipped.
//! 3. Active strategies are consulted in priority order; the first verdict
//!    that is not a decline wins. A root pin ends the chain. A claim on an
//!    already placed resource is ignored unless it is forced.

use crate::naming::sanitize_partition_name;
use crate::registry::{PartitionRegistry, Placements};
use crate::strategy::{is_always_root, Classification, Migration, MigrationStrategy};
use crate::PlannerError;
use indexmap::IndexMap;
use template_ir::{template::Validated, Resource, Template};

/// Reason recorded for placements carried over from a previous run.
pub const EXISTING_REASON: &str = "Existing placement";

/// What one strategy contributed to the last classification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct StrategyReport {
    /// Partition → number of resources this strategy moved there.
    pub claimed: IndexMap<String, usize>,
    /// Resources this strategy kept in root.
    pub pinned: Vec<String>,
}

impl StrategyReport {
    /// Total number of resources moved by the strategy.
    pub fn num_claimed(&self) -> usize {
        self.claimed.values().sum()
    }
}

/// Runs an ordered chain of [`MigrationStrategy`]s over a template.
pub struct StrategyEngine {
    strategies: Vec<Box<dyn MigrationStrategy>>,
    max_resources_per_stack: usize,
    reports: IndexMap<String, StrategyReport>,
}

impl StrategyEngine {
    /// Default capacity of a suffixable partition.
    pub const DEFAULT_MAX_RESOURCES: usize = 200;

    /// Creates an engine; strategies are sorted by priority, so callers may
    /// pass them in any order.
    pub fn new(mut strategies: Vec<Box<dyn MigrationStrategy>>) -> Self {
        strategies.sort_by_key(|s| s.priority());
        Self {
            strategies,
            max_resources_per_stack: Self::DEFAULT_MAX_RESOURCES,
            reports: IndexMap::new(),
        }
    }

    /// Sets the capacity used when a claim allows suffixed partitions.
    pub fn with_max_resources(mut self, max: usize) -> Self {
        self.max_resources_per_stack = max.max(1);
        self
    }

    /// Names of the active strategies in evaluation order.
    pub fn active_strategies(&self) -> Vec<&str> {
        self.strategies
            .iter()
            .filter(|s| s.is_active())
            .map(|s| s.name())
            .collect()
    }

    /// Accepted claims and root pins of the last [`Self::classify`] call,
    /// one entry per active strategy in evaluation order.
    pub fn strategy_reports(&self) -> &IndexMap<String, StrategyReport> {
        &self.reports
    }

    /// Classifies every resource of `template`.
    pub fn classify(
        &mut self,
        template: &Template<Validated>,
        existing: &Placements,
    ) -> Result<PartitionRegistry, PlannerError> {
        let mut registry = PartitionRegistry::new();
        let reports = self
            .active_strategies()
            .into_iter()
            .map(|name| (name.to_string(), StrategyReport::default()))
            .collect();
        self.reports = reports;

        for (logical_id, placement) in existing {
            match template.resource(logical_id) {
                None => {
                    tracing::warn!(
                        "existing placement of '{logical_id}' ignored: resource no longer in template"
                    );
                }
                Some(resource) if pinned_to_root(resource) => {
                    tracing::warn!(
                        "existing placement of '{logical_id}' ignored: resource must stay in root"
                    );
                }
                Some(_) => {
                    let name = sanitize_partition_name(&placement.partition);
                    registry.assign(logical_id, &name, placement.kind, EXISTING_REASON, false)?;
                }
            }
        }

        for resource in template.iter_resources() {
            if pinned_to_root(resource) {
                tracing::debug!("'{}' stays in root", resource.logical_id);
                continue;
            }

            let (strategy, migration) = match self.first_verdict(resource) {
                Some((strategy, Classification::Claim(migration))) => (strategy, migration),
                Some((strategy, _)) => {
                    if registry.partition_of(&resource.logical_id).is_none() {
                        tracing::debug!("{strategy}: '{}' pinned to root", resource.logical_id);
                        self.reports
                            .entry(strategy)
                            .or_default()
                            .pinned
                            .push(resource.logical_id.clone());
                    }
                    continue;
                }
                None => continue,
            };

            if let Some(current) = registry.partition_of(&resource.logical_id) {
                if !migration.force {
                    tracing::debug!(
                        "'{}' already placed in '{current}', ignoring {strategy} claim",
                        resource.logical_id
                    );
                    continue;
                }
            }

            let destination = self.destination(&registry, &migration);
            tracing::debug!(
                "{strategy}: '{}' → '{destination}' ({})",
                resource.logical_id,
                migration.reason
            );
            registry.assign(
                &resource.logical_id,
                &destination,
                migration.kind,
                &migration.reason,
                migration.force,
            )?;
            *self
                .reports
                .entry(strategy)
                .or_default()
                .claimed
                .entry(destination)
                .or_insert(0) += 1;
        }

        tracing::info!(
            "classified {} resources: {} migrated into {} partitions",
            template.num_resources(),
            registry.num_assigned(),
            registry.partitions().filter(|p| !p.is_empty()).count(),
        );
        Ok(registry)
    }

    /// The first verdict that is not a decline, with the strategy's name.
    fn first_verdict(&mut self, resource: &Resource) -> Option<(String, Classification)> {
        self.strategies
            .iter_mut()
            .filter(|s| s.is_active())
            .find_map(|s| match s.classify(resource) {
                Classification::Decline => None,
                verdict => Some((s.name().to_string(), verdict)),
            })
    }

    /// Sanitises the destination and, for suffixable claims, picks the
    /// first of `Name`, `Name2`, `Name3`, ... with room left.
    fn destination(&self, registry: &PartitionRegistry, migration: &Migration) -> String {
        let base = sanitize_partition_name(&migration.destination);
        if !migration.allow_suffix {
            return base;
        }
        (1..)
            .map(|n| if n == 1 { base.clone() } else { format!("{base}{n}") })
            .find(|name| registry.len_of(name) < self.max_resources_per_stack)
            .unwrap_or(base)
    }
}

/// Always-root resources and conditional resources never leave root.
fn pinned_to_root(resource: &Resource) -> bool {
    is_always_root(resource) || resource.condition.is_some()
}
