// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Read-only diagnostics over a finished split.
//!
//! [`StackAnalysis`] is built from the original template, the frozen
//! [`Assignment`] and the resolved [`DependencyGraph`]; nothing here
//! changes placement. It serialises to the JSON report schema and renders
//! to markdown with [`StackAnalysis::to_markdown`].

use crate::rewrite::LinkedTemplate;
use crate::sequence::DependencyGraph;
use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use stack_planner::{
    sanitize_partition_name, Assignment, FunctionRegistry, Location, PartitionKind, StrategyReport,
    ROOT,
};
use std::fmt::Write as _;
use template_ir::{template::Validated, ReferenceKind, Template};

/// Partitions smaller than this are flagged as underutilised.
pub const UNDERUTILIZED_THRESHOLD: usize = 20;

/// Partitions larger than this are flagged as approaching the ceiling.
pub const LARGE_STACK_THRESHOLD: usize = 450;

/// Resources referenced from more partitions than this are flagged.
pub const HIGHLY_SHARED_THRESHOLD: usize = 3;

/// Hard per-document resource ceiling of the deployment system.
pub const RESOURCE_CEILING: usize = 500;

// ── Report schema ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackAnalysis {
    pub timestamp: DateTime<Utc>,
    pub summary: AnalysisSummary,
    pub stacks: IndexMap<String, StackReport>,
    pub reference_map: ReferenceMap,
    pub dependency_graph: DependencyLayers,
    pub potential_optimizations: Vec<Optimization>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    /// Number of nested stacks.
    pub total_stacks: usize,
    pub total_resources: usize,
    /// Number of cross-stack references.
    pub total_references: usize,
    pub resource_distribution: IndexMap<String, usize>,
    pub potential_issues: Vec<Issue>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackReport {
    #[serde(rename = "type")]
    pub kind: PartitionKind,
    pub resource_count: usize,
    /// Grouping key, for stacks created from `stackName`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<String>,
    pub resources: IndexMap<String, ResourceReport>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceReport {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub references: Vec<String>,
    pub cross_stack_references: Vec<StackLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackLink {
    pub target_stack: String,
    pub target_resource: String,
    pub reference_type: ReferenceKind,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceMap {
    /// Target logical id → everything referencing it.
    pub by_resource: IndexMap<String, Referrers>,
    pub cross_stack_references: Vec<CrossStackEdge>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Referrers {
    pub referenced_by: Vec<Referrer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Referrer {
    pub stack: String,
    pub resource: String,
    #[serde(rename = "type")]
    pub kind: ReferenceKind,
}

/// `from`/`to` are `<stack>/<logical id>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossStackEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: ReferenceKind,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DependencyLayers {
    pub layers: IndexMap<String, Layer>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub level: i64,
    pub depends_on: Vec<String>,
    pub depended_on_by: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    CircularDependencyRisk,
    HighlySharedResource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub severity: Severity,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    pub stacks: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationKind {
    UnderutilizedStack,
    LargeStack,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Optimization {
    #[serde(rename = "type")]
    pub kind: OptimizationKind,
    pub stack: String,
    pub resource_count: usize,
    pub suggestion: String,
}

// ── Building ───────────────────────────────────────────────────

impl StackAnalysis {
    /// Builds the report. `functions` is used to list the functions of
    /// stack-name groups.
    pub fn build(
        template: &Template<Validated>,
        assignment: &Assignment,
        graph: &DependencyGraph,
        functions: Option<&dyn FunctionRegistry>,
    ) -> Self {
        let mut stacks = IndexMap::new();
        stacks.insert(
            ROOT.to_string(),
            stack_report(template, assignment, PartitionKind::Root, assignment.root_resources()),
        );
        for partition in assignment.partitions() {
            let mut report = stack_report(template, assignment, partition.kind, &partition.resources);
            if partition.kind == PartitionKind::CustomGroup || partition.kind == PartitionKind::Shared {
                if let Some(registry) = functions {
                    let members: Vec<_> = registry
                        .functions()
                        .iter()
                        .filter(|f| {
                            f.stack_name
                                .as_deref()
                                .is_some_and(|g| sanitize_partition_name(g) == partition.name)
                        })
                        .collect();
                    report.stack_name = members.first().and_then(|f| f.stack_name.clone());
                    report.functions = members.iter().map(|f| f.name.clone()).collect();
                }
            }
            stacks.insert(partition.name.clone(), report);
        }

        let reference_map = reference_map(template, assignment);
        let resource_distribution: IndexMap<String, usize> = stacks
            .iter()
            .map(|(name, s)| (name.clone(), s.resource_count))
            .collect();

        let summary = AnalysisSummary {
            total_stacks: assignment.num_partitions(),
            total_resources: resource_distribution.values().sum(),
            total_references: reference_map.cross_stack_references.len(),
            resource_distribution,
            potential_issues: detect_issues(&reference_map),
        };

        let dependency_graph = DependencyLayers {
            layers: graph
                .nodes()
                .map(|n| {
                    (
                        n.partition.clone(),
                        Layer {
                            level: n.level,
                            depends_on: n.depends_on.iter().cloned().collect(),
                            depended_on_by: n.depended_on_by.iter().cloned().collect(),
                        },
                    )
                })
                .collect(),
        };

        let potential_optimizations = find_optimizations(&stacks);

        Self {
            timestamp: Utc::now(),
            summary,
            stacks,
            reference_map,
            dependency_graph,
            potential_optimizations,
        }
    }

    /// Serialises the report to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Renders the human-readable summary.
    pub fn to_markdown(&self) -> String {
        let mut md = String::from("# Stack Analysis Summary\n\n");
        let _ = writeln!(md, "Generated: {}\n", self.timestamp.to_rfc3339());

        md.push_str("## Overview\n");
        let _ = writeln!(md, "- Total Stacks: {}", self.summary.total_stacks);
        let _ = writeln!(md, "- Total Resources: {}", self.summary.total_resources);
        let _ = writeln!(md, "- Cross-Stack References: {}\n", self.summary.total_references);

        md.push_str("## Stack Distribution\n");
        for (stack, count) in &self.summary.resource_distribution {
            let _ = writeln!(md, "- {stack}: {count} resources");
        }

        if !self.summary.potential_issues.is_empty() {
            md.push_str("\n## Potential Issues\n");
            for issue in &self.summary.potential_issues {
                let _ = writeln!(md, "- **{}**: {}", issue.severity.as_str(), issue.description);
            }
        }

        if !self.potential_optimizations.is_empty() {
            md.push_str("\n## Optimization Opportunities\n");
            for opt in &self.potential_optimizations {
                let _ = writeln!(
                    md,
                    "- {} ({}: {} resources)",
                    opt.suggestion, opt.stack, opt.resource_count
                );
            }
        }

        md.push_str("\n## Dependency Hierarchy\n");
        let mut layers: Vec<_> = self.dependency_graph.layers.iter().collect();
        layers.sort_by_key(|(_, layer)| layer.level);
        for (stack, layer) in layers {
            let _ = write!(md, "- Level {}: {stack}", layer.level);
            if !layer.depends_on.is_empty() {
                let _ = write!(md, " (depends on: {})", layer.depends_on.join(", "));
            }
            md.push('\n');
        }
        md
    }
}

fn stack_report(
    template: &Template<Validated>,
    assignment: &Assignment,
    kind: PartitionKind,
    ids: &[String],
) -> StackReport {
    let resources: IndexMap<String, ResourceReport> = ids
        .iter()
        .filter_map(|id| template.resource(id))
        .map(|resource| {
            let here = assignment.location(&resource.logical_id);
            let references = resource.references();
            let cross_stack_references = references
                .iter()
                .filter(|r| template.resource(&r.target_id).is_some())
                .filter_map(|r| {
                    let there = assignment.location(&r.target_id);
                    (there != here).then(|| StackLink {
                        target_stack: there.name().to_string(),
                        target_resource: r.target_id.clone(),
                        reference_type: r.kind,
                    })
                })
                .collect();
            (
                resource.logical_id.clone(),
                ResourceReport {
                    resource_type: resource.resource_type.clone(),
                    references: references.into_iter().map(|r| r.target_id).collect(),
                    cross_stack_references,
                },
            )
        })
        .collect();
    StackReport {
        kind,
        resource_count: resources.len(),
        stack_name: None,
        functions: Vec::new(),
        resources,
    }
}

fn reference_map(template: &Template<Validated>, assignment: &Assignment) -> ReferenceMap {
    let mut map = ReferenceMap::default();
    for resource in template.iter_resources() {
        let here = assignment.location(&resource.logical_id);
        for reference in resource.references() {
            map.by_resource
                .entry(reference.target_id.clone())
                .or_default()
                .referenced_by
                .push(Referrer {
                    stack: here.name().to_string(),
                    resource: resource.logical_id.clone(),
                    kind: reference.kind,
                });

            if template.resource(&reference.target_id).is_none() {
                continue;
            }
            let there = assignment.location(&reference.target_id);
            if there != here {
                map.cross_stack_references.push(CrossStackEdge {
                    from: format!("{}/{}", here.name(), resource.logical_id),
                    to: format!("{}/{}", there.name(), reference.target_id),
                    kind: reference.kind,
                });
            }
        }
    }
    map
}

fn detect_issues(map: &ReferenceMap) -> Vec<Issue> {
    let mut issues = Vec::new();

    let stack_of = |path: &str| path.split('/').next().unwrap_or_default().to_string();
    let mut edges: IndexMap<String, IndexSet<String>> = IndexMap::new();
    for edge in &map.cross_stack_references {
        edges.entry(stack_of(&edge.from)).or_default().insert(stack_of(&edge.to));
    }
    let mut reported: IndexSet<(String, String)> = IndexSet::new();
    for (from, targets) in &edges {
        for to in targets {
            let mutual = edges.get(to).is_some_and(|back| back.contains(from));
            let pair = if from < to {
                (from.clone(), to.clone())
            } else {
                (to.clone(), from.clone())
            };
            if mutual && reported.insert(pair) {
                issues.push(Issue {
                    kind: IssueKind::CircularDependencyRisk,
                    severity: Severity::Warning,
                    description: format!("Mutual references between '{from}' and '{to}'"),
                    resource: None,
                    stacks: vec![from.clone(), to.clone()],
                });
            }
        }
    }

    for (resource, referrers) in &map.by_resource {
        let stacks: IndexSet<&str> = referrers.referenced_by.iter().map(|r| r.stack.as_str()).collect();
        if stacks.len() > HIGHLY_SHARED_THRESHOLD {
            issues.push(Issue {
                kind: IssueKind::HighlySharedResource,
                severity: Severity::Info,
                description: format!(
                    "Resource '{resource}' is referenced by {} different stacks",
                    stacks.len()
                ),
                resource: Some(resource.clone()),
                stacks: stacks.into_iter().map(str::to_string).collect(),
            });
        }
    }
    issues
}

fn find_optimizations(stacks: &IndexMap<String, StackReport>) -> Vec<Optimization> {
    let mut out = Vec::new();
    for (name, stack) in stacks {
        let fixed = matches!(stack.kind, PartitionKind::Root | PartitionKind::Shared);
        if !fixed && stack.resource_count < UNDERUTILIZED_THRESHOLD {
            out.push(Optimization {
                kind: OptimizationKind::UnderutilizedStack,
                stack: name.clone(),
                resource_count: stack.resource_count,
                suggestion: "Consider merging with another small stack to reduce overhead".into(),
            });
        }
        if stack.resource_count > LARGE_STACK_THRESHOLD {
            out.push(Optimization {
                kind: OptimizationKind::LargeStack,
                stack: name.clone(),
                resource_count: stack.resource_count,
                suggestion: format!(
                    "Stack approaching the {RESOURCE_CEILING}-resource limit, consider splitting"
                ),
            });
        }
    }
    out
}

// ── Log summary ────────────────────────────────────────────────

/// Renders what each strategy moved, then a tree of every document with
/// its parameters, outputs and cross-stack references.
pub fn log_summary(linked: &LinkedTemplate, strategies: &IndexMap<String, StrategyReport>) -> String {
    let migrated: usize = linked.nested.values().map(|d| d.num_resources()).sum();
    let mut out = String::new();
    let names: Vec<&str> = strategies.keys().map(String::as_str).collect();
    let _ = writeln!(out, "Using strategies: {}", names.join(", "));
    for (name, report) in strategies {
        if report.claimed.is_empty() && report.pinned.is_empty() {
            continue;
        }
        let stacks: Vec<String> = report
            .claimed
            .iter()
            .map(|(partition, n)| format!("{partition}: {n}"))
            .collect();
        let _ = writeln!(
            out,
            "├─ {name}: {} resources into {} stacks ({})",
            report.num_claimed(),
            report.claimed.len(),
            stacks.join(", ")
        );
        if !report.pinned.is_empty() {
            let _ = writeln!(out, "│  └─ Kept in root: {}", report.pinned.join(", "));
        }
    }
    let _ = writeln!(
        out,
        "Summary: {migrated} resources migrated into {} nested stacks",
        linked.nested.len()
    );

    let root_refs: Vec<_> = linked
        .cross_references
        .iter()
        .filter(|c| c.source_stack == ROOT)
        .collect();
    let _ = writeln!(out, "└─ (root): {} resources", linked.root.num_resources());
    if !root_refs.is_empty() {
        let _ = writeln!(out, "   └─ References ({}):", root_refs.len());
        for c in root_refs {
            let _ = writeln!(out, "      ├─ {} → {}/{}", c.source_id, c.target_stack, c.target_id);
        }
    }

    for doc in linked.nested.values() {
        let _ = writeln!(out, "└─ {}: {} resources", doc.name, doc.num_resources());
        if !doc.parameters.is_empty() {
            let _ = writeln!(out, "   ├─ Parameters ({}):", doc.parameters.len());
            for (name, p) in &doc.parameters {
                let _ = writeln!(out, "   │  ├─ {name}: {}", p.param_type);
            }
        }
        if !doc.outputs.is_empty() {
            let _ = writeln!(out, "   ├─ Outputs ({}):", doc.outputs.len());
            for name in doc.outputs.keys() {
                let _ = writeln!(out, "   │  ├─ {name}");
            }
        }
        let refs: Vec<_> = linked
            .cross_references
            .iter()
            .filter(|c| c.source_stack == doc.name)
            .collect();
        if !refs.is_empty() {
            let _ = writeln!(out, "   └─ References ({}):", refs.len());
            for c in refs {
                let attr = c.attribute.as_deref().map(|a| format!(".{a}")).unwrap_or_default();
                let _ = writeln!(
                    out,
                    "      ├─ {}: {}({}{attr}) from {}",
                    c.source_id, c.kind, c.target_id, c.target_stack
                );
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stack_planner::{FunctionDef, PartitionRegistry};

    fn template(resources: serde_json::Value) -> Template<Validated> {
        Template::from_value(json!({ "Resources": resources }))
            .unwrap()
            .validate()
            .unwrap()
    }

    fn assign(
        t: &Template<Validated>,
        kind: PartitionKind,
        placements: &[(&str, &str)],
    ) -> Assignment {
        let mut r = PartitionRegistry::new();
        for (id, partition) in placements {
            r.assign(id, partition, kind, "test", false).unwrap();
        }
        r.freeze(t)
    }

    fn analyse(t: &Template<Validated>, a: &Assignment) -> StackAnalysis {
        let edges: IndexMap<String, IndexSet<String>> = IndexMap::new();
        let graph = DependencyGraph::from_edges(&edges);
        StackAnalysis::build(t, a, &graph, None)
    }

    fn lambda_referencing(target: &str) -> serde_json::Value {
        json!({ "Type": "AWS::Lambda::Function", "Properties": { "T": { "Ref": target } } })
    }

    #[test]
    fn test_distribution_and_cross_references() {
        let t = template(json!({
            "Table": { "Type": "AWS::DynamoDB::Table" },
            "A": lambda_referencing("Table"),
            "B": lambda_referencing("Table")
        }));
        let a = assign(&t, PartitionKind::CustomGroup, &[("A", "Group1"), ("B", "Group1")]);
        let report = analyse(&t, &a);

        assert_eq!(report.summary.total_stacks, 1);
        assert_eq!(report.summary.total_resources, 3);
        assert_eq!(report.summary.resource_distribution["root"], 1);
        assert_eq!(report.summary.resource_distribution["Group1"], 2);
        assert_eq!(report.summary.total_references, 2);
        assert_eq!(report.reference_map.cross_stack_references[0].from, "Group1/A");
        assert_eq!(report.reference_map.cross_stack_references[0].to, "root/Table");
        assert_eq!(report.reference_map.by_resource["Table"].referenced_by.len(), 2);
        assert_eq!(
            report.stacks["Group1"].resources["A"].cross_stack_references[0].target_stack,
            "root"
        );
    }

    #[test]
    fn test_circular_risk_reported_once() {
        let t = template(json!({
            "A": lambda_referencing("B"),
            "B": lambda_referencing("A")
        }));
        let a = assign(&t, PartitionKind::Custom, &[("A", "One"), ("B", "Two")]);
        let issues = analyse(&t, &a).summary.potential_issues;
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::CircularDependencyRisk);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].stacks, vec!["One", "Two"]);
    }

    #[test]
    fn test_highly_shared_resource() {
        let t = template(json!({
            "Table": { "Type": "AWS::DynamoDB::Table" },
            "A": lambda_referencing("Table"),
            "B": lambda_referencing("Table"),
            "C": lambda_referencing("Table"),
            "D": lambda_referencing("Table")
        }));
        let three = assign(&t, PartitionKind::Custom, &[("A", "P1"), ("B", "P2"), ("C", "P3")]);
        assert!(analyse(&t, &three)
            .summary
            .potential_issues
            .iter()
            .all(|i| i.kind != IssueKind::HighlySharedResource));

        let four = assign(
            &t,
            PartitionKind::Custom,
            &[("A", "P1"), ("B", "P2"), ("C", "P3"), ("D", "P4")],
        );
        let issues = analyse(&t, &four).summary.potential_issues;
        let shared = issues
            .iter()
            .find(|i| i.kind == IssueKind::HighlySharedResource)
            .unwrap();
        assert_eq!(shared.resource.as_deref(), Some("Table"));
        assert_eq!(shared.severity, Severity::Info);
    }

    #[test]
    fn test_optimizations() {
        let mut resources = serde_json::Map::new();
        for i in 0..451 {
            resources.insert(format!("Q{i}"), json!({ "Type": "AWS::SQS::Queue" }));
        }
        resources.insert("Small".into(), json!({ "Type": "AWS::SQS::Queue" }));
        resources.insert("Common".into(), json!({ "Type": "AWS::SQS::Queue" }));
        let t = template(serde_json::Value::Object(resources));

        let mut r = PartitionRegistry::new();
        for i in 0..451 {
            r.assign(&format!("Q{i}"), "Big", PartitionKind::PerType, "", false).unwrap();
        }
        r.assign("Small", "Tiny", PartitionKind::PerType, "", false).unwrap();
        r.assign("Common", "Shared", PartitionKind::Shared, "", false).unwrap();
        let a = r.freeze(&t);

        let opts = analyse(&t, &a).potential_optimizations;
        let kinds: Vec<_> = opts.iter().map(|o| (o.kind, o.stack.as_str())).collect();
        assert_eq!(
            kinds,
            vec![
                (OptimizationKind::LargeStack, "Big"),
                (OptimizationKind::UnderutilizedStack, "Tiny"),
            ]
        );
    }

    #[test]
    fn test_stack_name_functions_listed() {
        let t = template(json!({ "ALambdaFunction": { "Type": "AWS::Lambda::Function" } }));
        let a = assign(&t, PartitionKind::CustomGroup, &[("ALambdaFunction", "Group1")]);
        let fns = vec![FunctionDef::new("a", "h").with_stack_name("group1")];
        let edges: IndexMap<String, IndexSet<String>> = IndexMap::new();
        let report = StackAnalysis::build(&t, &a, &DependencyGraph::from_edges(&edges), Some(&fns));
        assert_eq!(report.stacks["Group1"].stack_name.as_deref(), Some("group1"));
        assert_eq!(report.stacks["Group1"].functions, vec!["a"]);
    }

    #[test]
    fn test_json_and_markdown() {
        let t = template(json!({
            "Table": { "Type": "AWS::DynamoDB::Table" },
            "A": lambda_referencing("Table")
        }));
        let a = assign(&t, PartitionKind::CustomGroup, &[("A", "Group1")]);
        let report = analyse(&t, &a);

        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["summary"]["totalStacks"], 1);
        assert_eq!(value["stacks"]["Group1"]["type"], "byCustomGroup");
        assert_eq!(value["stacks"]["root"]["resourceCount"], 1);
        assert_eq!(value["referenceMap"]["crossStackReferences"][0]["type"], "Ref");
        assert_eq!(value["potentialOptimizations"][0]["type"], "underutilized_stack");

        let md = report.to_markdown();
        assert!(md.starts_with("# Stack Analysis Summary"));
        assert!(md.contains("- Group1: 1 resources"));
        assert!(md.contains("## Optimization Opportunities"));
    }

    #[test]
    fn test_log_summary_lists_strategy_reports() {
        let t = template(json!({
            "Table": { "Type": "AWS::DynamoDB::Table" },
            "Fn": lambda_referencing("Table")
        }));
        let a = assign(&t, PartitionKind::CustomGroup, &[("Fn", "Api")]);
        let linked = crate::link(&t, &a, &crate::LinkOptions::default()).unwrap();

        let mut strategies = IndexMap::new();
        strategies.insert(
            "stack-name".to_string(),
            StrategyReport {
                claimed: [("Api".to_string(), 1)].into_iter().collect(),
                pinned: vec!["ApiGatewayResourceApi".to_string()],
            },
        );
        strategies.insert("per-type".to_string(), StrategyReport::default());

        let log = log_summary(&linked, &strategies);
        assert!(log.starts_with("Using strategies: stack-name, per-type\n"));
        assert!(log.contains("├─ stack-name: 1 resources into 1 stacks (Api: 1)"));
        assert!(log.contains("Kept in root: ApiGatewayResourceApi"));
        assert!(!log.contains("├─ per-type"));
        assert!(log.contains("└─ Api: 1 resources"));
    }
}
