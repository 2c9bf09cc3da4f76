// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Partition registry: the output of the strategy engine.
//!
//! The registry is built incrementally while resources are classified and
//! then frozen into an [`Assignment`], the read-only contract between the
//! planner and the reference rewriter. Every resource of the template is
//! in exactly one place: the root, or exactly one named partition.

use crate::PlannerError;
use indexmap::IndexMap;
use std::collections::HashMap;
use template_ir::{template::Validated, Template};

/// Display name used for the root document in reports.
pub const ROOT: &str = "root";

/// Which mechanism created a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PartitionKind {
    Root,
    Shared,
    #[serde(rename = "byCustomGroup")]
    CustomGroup,
    PerFunction,
    PerType,
    PerGroupFunction,
    Custom,
}

impl PartitionKind {
    /// Returns a human-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Shared => "shared",
            Self::CustomGroup => "byCustomGroup",
            Self::PerFunction => "perFunction",
            Self::PerType => "perType",
            Self::PerGroupFunction => "perGroupFunction",
            Self::Custom => "custom",
        }
    }
}

impl std::fmt::Display for PartitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named subset of the template's resources, deployed as its own document.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Partition {
    /// Sanitised partition name.
    pub name: String,
    /// Mechanism that created this partition.
    pub kind: PartitionKind,
    /// Logical ids in assignment order.
    pub resources: Vec<String>,
    /// Reason recorded by the first assignment.
    pub reason: String,
}

impl Partition {
    /// Creates an empty partition.
    pub fn new(name: impl Into<String>, kind: PartitionKind, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            resources: Vec::new(),
            reason: reason.into(),
        }
    }

    /// Returns the number of resources in this partition.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns `true` if nothing is assigned here.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// A pinned placement from a previous run, keyed by logical id in [`Placements`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StackPlacement {
    pub partition: String,
    pub kind: PartitionKind,
}

/// Placement manifest: logical id → nested partition.
pub type Placements = IndexMap<String, StackPlacement>;

/// Where a resource lives after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location<'a> {
    Root,
    Nested(&'a str),
}

impl<'a> Location<'a> {
    /// Returns the report name of this location.
    pub fn name(&self) -> &'a str {
        match self {
            Self::Root => ROOT,
            Self::Nested(name) => *name,
        }
    }
}

/// Tracks partitions and enforces one partition per resource.
#[derive(Debug, Clone, Default)]
pub struct PartitionRegistry {
    partitions: IndexMap<String, Partition>,
    owner: HashMap<String, String>,
}

impl PartitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `logical_id` to the partition `name`, creating it on first use.
    ///
    /// A second assignment of the same id fails unless `force` is set, in
    /// which case the resource moves.
    pub fn assign(
        &mut self,
        logical_id: &str,
        name: &str,
        kind: PartitionKind,
        reason: &str,
        force: bool,
    ) -> Result<(), PlannerError> {
        if let Some(existing) = self.owner.get(logical_id) {
            if existing == name {
                return Ok(());
            }
            if !force {
                return Err(PlannerError::DuplicateAssignment {
                    logical_id: logical_id.to_string(),
                    existing: existing.clone(),
                    requested: name.to_string(),
                });
            }
            let existing = existing.clone();
            if let Some(previous) = self.partitions.get_mut(&existing) {
                previous.resources.retain(|id| id != logical_id);
            }
            tracing::debug!("forced move of '{logical_id}' from '{existing}' to '{name}'");
        }

        self.partitions
            .entry(name.to_string())
            .or_insert_with(|| Partition::new(name, kind, reason))
            .resources
            .push(logical_id.to_string());
        self.owner.insert(logical_id.to_string(), name.to_string());
        Ok(())
    }

    /// Returns the partition a resource was assigned to, if any.
    pub fn partition_of(&self, logical_id: &str) -> Option<&str> {
        self.owner.get(logical_id).map(String::as_str)
    }

    /// Returns the number of resources currently in `name`.
    pub fn len_of(&self, name: &str) -> usize {
        self.partitions.get(name).map_or(0, Partition::len)
    }

    /// Returns the partitions in creation order.
    pub fn partitions(&self) -> impl Iterator<Item = &Partition> {
        self.partitions.values()
    }

    /// Returns the number of migrated resources.
    pub fn num_assigned(&self) -> usize {
        self.owner.len()
    }

    /// Freezes the registry against the template it was built from.
    ///
    /// Partitions emptied by forced moves are dropped; every unassigned
    /// resource lands in root, in template order.
    pub fn freeze(self, template: &Template<Validated>) -> Assignment {
        let root = template
            .iter_resources()
            .filter(|r| !self.owner.contains_key(&r.logical_id))
            .map(|r| r.logical_id.clone())
            .collect();
        let partitions = self
            .partitions
            .into_iter()
            .filter(|(_, p)| !p.is_empty())
            .collect();
        Assignment {
            root,
            partitions,
            owner: self.owner,
        }
    }
}

/// Final, read-only resource placement.
#[derive(Debug, Clone)]
pub struct Assignment {
    root: Vec<String>,
    partitions: IndexMap<String, Partition>,
    owner: HashMap<String, String>,
}

impl Assignment {
    /// Returns where `logical_id` lives; unknown ids are reported as root,
    /// so callers check existence against the template first.
    pub fn location(&self, logical_id: &str) -> Location<'_> {
        match self.owner.get(logical_id) {
            Some(name) => Location::Nested(name),
            None => Location::Root,
        }
    }

    /// Resources remaining in root, in template order.
    pub fn root_resources(&self) -> &[String] {
        &self.root
    }

    /// Nested partitions in creation order.
    pub fn partitions(&self) -> impl Iterator<Item = &Partition> {
        self.partitions.values()
    }

    /// Returns a partition by name.
    pub fn partition(&self, name: &str) -> Option<&Partition> {
        self.partitions.get(name)
    }

    /// Returns the number of nested partitions.
    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Returns the placement manifest for the next run.
    pub fn placements(&self) -> Placements {
        self.partitions
            .values()
            .flat_map(|p| {
                p.resources.iter().map(|id| {
                    (
                        id.clone(),
                        StackPlacement {
                            partition: p.name.clone(),
                            kind: p.kind,
                        },
                    )
                })
            })
            .collect()
    }

    /// Returns a human-readable summary of the assignment.
    pub fn summary(&self) -> String {
        let migrated: usize = self.partitions.values().map(Partition::len).sum();
        let sizes: Vec<String> = self
            .partitions
            .values()
            .map(|p| format!("{}={}", p.name, p.len()))
            .collect();
        format!(
            "Assignment: {} resources migrated into {} nested stacks, {} left in root, sizes: [{}]",
            migrated,
            self.partitions.len(),
            self.root.len(),
            sizes.join(", "),
        )
    }
}
