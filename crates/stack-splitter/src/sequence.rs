// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Partition dependency graph and deployment levels.
//!
//! Nodes are root plus every nested partition; an edge `P → Q` means `P`
//! reads a value exported by `Q` (or waits on one of its resources).
//! Root is fixed at level 0. Every other node is placed at
//! `1 + max(level of its dependencies)` by repeated relaxation; a pass
//! that places nothing while nodes remain unplaced means a cycle.

use crate::rewrite::LinkedTemplate;
use crate::SplitError;
use indexmap::{IndexMap, IndexSet};
use stack_planner::ROOT;

/// Level of a node that has not been placed.
pub const UNRESOLVED: i64 = -1;

/// One partition in the dependency graph.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyNode {
    pub partition: String,
    pub level: i64,
    pub depends_on: IndexSet<String>,
    pub depended_on_by: IndexSet<String>,
}

impl DependencyNode {
    fn new(partition: &str) -> Self {
        Self {
            partition: partition.to_string(),
            level: UNRESOLVED,
            depends_on: IndexSet::new(),
            depended_on_by: IndexSet::new(),
        }
    }
}

/// Partition-level dependency graph.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: IndexMap<String, DependencyNode>,
}

impl DependencyGraph {
    /// Builds the graph from partition → dependencies edges.
    ///
    /// Root's own dependencies are recorded but do not affect levels.
    pub fn from_edges<'a>(
        edges: impl IntoIterator<Item = (&'a String, &'a IndexSet<String>)>,
    ) -> Self {
        let mut graph = Self::default();
        graph.node_mut(ROOT);
        for (partition, targets) in edges {
            graph.node_mut(partition);
            for target in targets.iter().filter(|t| *t != partition) {
                graph.node_mut(partition).depends_on.insert(target.clone());
                graph.node_mut(target).depended_on_by.insert(partition.clone());
            }
        }
        graph
    }

    /// Builds the graph of a linked template.
    pub fn build(linked: &LinkedTemplate) -> Self {
        Self::from_edges(&linked.dependencies)
    }

    fn node_mut(&mut self, partition: &str) -> &mut DependencyNode {
        self.nodes
            .entry(partition.to_string())
            .or_insert_with(|| DependencyNode::new(partition))
    }

    /// Assigns levels, failing on a cycle.
    pub fn resolve_levels(&mut self) -> Result<(), SplitError> {
        for node in self.nodes.values_mut() {
            node.level = if node.partition == ROOT { 0 } else { UNRESOLVED };
        }

        loop {
            let mut progress = false;
            let pending: Vec<String> = self
                .nodes
                .values()
                .filter(|n| n.level == UNRESOLVED)
                .map(|n| n.partition.clone())
                .collect();
            if pending.is_empty() {
                break;
            }

            for name in &pending {
                let levels: Option<Vec<i64>> = self.nodes[name.as_str()]
                    .depends_on
                    .iter()
                    .map(|dep| {
                        self.nodes
                            .get(dep.as_str())
                            .map(|n| n.level)
                            .filter(|l| *l != UNRESOLVED)
                    })
                    .collect();
                if let Some(levels) = levels {
                    let level = 1 + levels.into_iter().max().unwrap_or(0);
                    if let Some(node) = self.nodes.get_mut(name.as_str()) {
                        node.level = level;
                    }
                    progress = true;
                }
            }

            if !progress {
                tracing::warn!("dependency cycle among nested stacks: {pending:?}");
                return Err(SplitError::DependencyCycle { partitions: pending });
            }
        }

        tracing::debug!("dependency levels: {:?}", self.deployment_order());
        Ok(())
    }

    /// Returns the level of a partition.
    pub fn level(&self, partition: &str) -> Option<i64> {
        self.nodes.get(partition).map(|n| n.level)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &DependencyNode> {
        self.nodes.values()
    }

    /// Partitions grouped by level, root first. Partitions in the same
    /// level can be deployed in parallel.
    pub fn deployment_order(&self) -> Vec<Vec<String>> {
        let max = self.nodes.values().map(|n| n.level).max().unwrap_or(0);
        (0..=max)
            .map(|level| {
                self.nodes
                    .values()
                    .filter(|n| n.level == level)
                    .map(|n| n.partition.clone())
                    .collect()
            })
            .collect()
    }

    /// Writes `DependsOn` between nested stack resources in the root
    /// document.
    pub fn apply(&self, linked: &mut LinkedTemplate) {
        for node in self.nodes.values().filter(|n| n.partition != ROOT) {
            let stack_ids: Vec<String> = node
                .depends_on
                .iter()
                .filter_map(|dep| linked.nested.get(dep).map(|d| d.stack_id.clone()))
                .collect();
            if let Some(resource) = linked.stack_resource_mut(&node.partition) {
                for id in stack_ids {
                    if !resource.depends_on.contains(&id) {
                        resource.depends_on.push(id);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &[&str])]) -> DependencyGraph {
        let edges: IndexMap<String, IndexSet<String>> = edges
            .iter()
            .map(|(from, to)| (from.to_string(), to.iter().map(|t| t.to_string()).collect()))
            .collect();
        DependencyGraph::from_edges(&edges)
    }

    #[test]
    fn test_levels() {
        let mut g = graph(&[("A", &[]), ("B", &["root"]), ("C", &["A", "B"]), ("D", &["C", "A"])]);
        g.resolve_levels().unwrap();
        assert_eq!(g.level("root"), Some(0));
        assert_eq!(g.level("A"), Some(1));
        assert_eq!(g.level("B"), Some(1));
        assert_eq!(g.level("C"), Some(2));
        assert_eq!(g.level("D"), Some(3));
        assert_eq!(
            g.deployment_order(),
            vec![vec!["root"], vec!["A", "B"], vec!["C"], vec!["D"]]
        );
        let a = g.nodes().find(|n| n.partition == "A").unwrap();
        assert!(a.depended_on_by.contains("C"));
    }

    #[test]
    fn test_root_dependencies_ignored() {
        let mut g = graph(&[("root", &["A"]), ("A", &["root"])]);
        g.resolve_levels().unwrap();
        assert_eq!(g.level("A"), Some(1));
    }

    #[test]
    fn test_mutual_dependency_is_cycle() {
        let mut g = graph(&[("A", &["B"]), ("B", &["A"]), ("C", &[])]);
        let err = g.resolve_levels().unwrap_err();
        match err {
            SplitError::DependencyCycle { partitions } => assert_eq!(partitions, vec!["A", "B"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_self_edge_ignored() {
        let mut g = graph(&[("A", &["A"])]);
        g.resolve_levels().unwrap();
        assert_eq!(g.level("A"), Some(1));
    }
}
