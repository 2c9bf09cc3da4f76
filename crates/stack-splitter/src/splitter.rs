// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The split pipeline with type-state–enforced stage ordering.
//!
//! ```text
//! Splitter<Idle>
//!     │  .classify()
//!     ▼
//! Splitter<Classified>
//!     │  .link()
//!     ▼
//! Splitter<Linked>
//!     │  .sequence()
//!     ▼
//!   SplitOutput
//! ```
//!
//! Each transition consumes the previous stage, so a template can never be
//! rewritten before its assignment is frozen or written before its
//! dependencies are resolved.

use crate::analysis::{log_summary, StackAnalysis};
use crate::rewrite::{link, LinkOptions, LinkedTemplate};
use crate::sequence::DependencyGraph;
use crate::{SplitConfig, SplitError};
use indexmap::IndexMap;
use serde_json::Value;
use stack_planner::{Assignment, FunctionDef, Naming, Placements, ServiceDefinition, StrategyReport};
use std::time::Instant;
use template_ir::{template::Validated, Template};

// ── Type-state markers ─────────────────────────────────────────

/// Template loaded, nothing classified.
#[derive(Debug)]
pub struct Idle;

/// Every resource has a frozen placement.
#[derive(Debug)]
pub struct Classified {
    assignment: Assignment,
    /// Active strategies in evaluation order with what each one moved.
    strategies: IndexMap<String, StrategyReport>,
    functions: Vec<FunctionDef>,
}

/// Cross-partition references are rewritten.
#[derive(Debug)]
pub struct Linked {
    assignment: Assignment,
    strategies: IndexMap<String, StrategyReport>,
    functions: Vec<FunctionDef>,
    linked: LinkedTemplate,
}

/// Sealed trait for pipeline stages.
pub trait SplitState: std::fmt::Debug {}
impl SplitState for Idle {}
impl SplitState for Classified {}
impl SplitState for Linked {}

// ── Output ─────────────────────────────────────────────────────

/// Everything a finished split produces.
#[derive(Debug)]
pub struct SplitOutput {
    /// The root document.
    pub root: Value,
    /// `(file name, document)` per nested partition, in creation order.
    pub nested: Vec<(String, Value)>,
    /// Placement manifest to feed into the next run.
    pub placements: Placements,
    pub graph: DependencyGraph,
    /// Present when `analyze` is set.
    pub analysis: Option<StackAnalysis>,
    /// Tree rendering of every document.
    pub log: String,
}

impl SplitOutput {
    /// Partitions grouped by deployment level.
    pub fn deployment_order(&self) -> Vec<Vec<String>> {
        self.graph.deployment_order()
    }

    /// Serialises the placement manifest.
    pub fn placements_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.placements)
    }
}

// ── Splitter ───────────────────────────────────────────────────

/// The split pipeline.
///
/// # Example
/// ```no_run
/// use stack_splitter::{SplitConfig, Splitter};
/// use stack_planner::{AwsNaming, Placements, ServiceDefinition};
/// use template_ir::TemplateLoader;
/// use std::path::Path;
///
/// # fn example() -> Result<(), stack_splitter::SplitError> {
/// let template = TemplateLoader::load(Path::new("./.serverless"))?;
/// let service = ServiceDefinition::from_file(Path::new("service.json"))?;
/// let output = Splitter::new(SplitConfig::default(), template)
///     .classify(&service, Some(&AwsNaming), &Placements::new())?
///     .link()?
///     .sequence()?;
/// println!("{}", output.log);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Splitter<S: SplitState = Idle> {
    config: SplitConfig,
    template: Template<Validated>,
    state: S,
}

impl<S: SplitState> Splitter<S> {
    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// The template as loaded.
    pub fn template(&self) -> &Template<Validated> {
        &self.template
    }
}

// ── Idle → Classified ──────────────────────────────────────────

impl Splitter<Idle> {
    pub fn new(config: SplitConfig, template: Template<Validated>) -> Self {
        tracing::info!("{}", template.summary());
        Self {
            config,
            template,
            state: Idle,
        }
    }

    /// Runs the strategy chain and freezes the assignment.
    ///
    /// `existing` is the placement manifest of a previous run; its entries
    /// are kept as they are.
    pub fn classify(
        self,
        service: &ServiceDefinition,
        naming: Option<&dyn Naming>,
        existing: &Placements,
    ) -> Result<Splitter<Classified>, SplitError> {
        let start = Instant::now();
        if !self.config.any_strategy() {
            tracing::warn!("no strategy enabled; every resource stays in root");
        }

        let mut engine = self.config.create_engine(service, naming)?;
        tracing::info!("using strategies: {}", engine.active_strategies().join(", "));

        let assignment = engine.classify(&self.template, existing)?.freeze(&self.template);
        let strategies = engine.strategy_reports().clone();
        for (name, report) in &strategies {
            tracing::debug!(
                "{name}: claimed {} resources, pinned {} to root",
                report.num_claimed(),
                report.pinned.len()
            );
        }
        tracing::info!(
            "{} ({} ms)",
            assignment.summary(),
            start.elapsed().as_millis()
        );

        Ok(Splitter {
            config: self.config,
            template: self.template,
            state: Classified {
                assignment,
                strategies,
                functions: service.functions.clone(),
            },
        })
    }
}

// ── Classified → Linked ────────────────────────────────────────

impl Splitter<Classified> {
    pub fn assignment(&self) -> &Assignment {
        &self.state.assignment
    }

    /// What each active strategy moved or pinned.
    pub fn strategy_reports(&self) -> &IndexMap<String, StrategyReport> {
        &self.state.strategies
    }

    /// Rewrites cross-partition references into parameters and outputs.
    pub fn link(self) -> Result<Splitter<Linked>, SplitError> {
        let options = LinkOptions {
            artifact_prefix: self.config.artifact_prefix.clone(),
            deployment_bucket: self.config.deployment_bucket.clone(),
        };
        let linked = link(&self.template, &self.state.assignment, &options)?;
        tracing::info!("{}", linked.summary());

        let Classified {
            assignment,
            strategies,
            functions,
        } = self.state;
        Ok(Splitter {
            config: self.config,
            template: self.template,
            state: Linked {
                assignment,
                strategies,
                functions,
                linked,
            },
        })
    }
}

// ── Linked → SplitOutput ───────────────────────────────────────

impl Splitter<Linked> {
    pub fn assignment(&self) -> &Assignment {
        &self.state.assignment
    }

    pub fn linked(&self) -> &LinkedTemplate {
        &self.state.linked
    }

    /// Resolves deployment levels, orders the stack resources and
    /// serialises every document.
    ///
    /// Fails with [`SplitError::DependencyCycle`] when nested partitions
    /// depend on each other.
    pub fn sequence(self) -> Result<SplitOutput, SplitError> {
        let Linked {
            assignment,
            strategies,
            functions,
            mut linked,
        } = self.state;

        let mut graph = DependencyGraph::build(&linked);
        graph.resolve_levels()?;
        graph.apply(&mut linked);

        let analysis = self.config.analyze.then(|| {
            StackAnalysis::build(&self.template, &assignment, &graph, Some(&functions))
        });
        if let Some(analysis) = &analysis {
            for issue in &analysis.summary.potential_issues {
                tracing::warn!("{}: {}", issue.severity.as_str(), issue.description);
            }
        }

        let log = log_summary(&linked, &strategies);
        for line in log.lines() {
            tracing::info!("{line}");
        }

        Ok(SplitOutput {
            root: linked.root.to_value(),
            nested: linked
                .nested
                .values()
                .map(|doc| (doc.file_name(), doc.to_value()))
                .collect(),
            placements: assignment.placements(),
            graph,
            analysis,
            log,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template() -> Template<Validated> {
        Template::from_value(json!({
            "Resources": {
                "Queue": { "Type": "AWS::SQS::Queue" },
                "Alarm": {
                    "Type": "AWS::CloudWatch::Alarm",
                    "Properties": { "Dimensions": [{ "Value": { "Fn::GetAtt": ["Queue", "QueueName"] } }] }
                },
                "WorkerLogGroup": { "Type": "AWS::Logs::LogGroup" }
            }
        }))
        .unwrap()
        .validate()
        .unwrap()
    }

    #[test]
    fn test_full_pipeline_default_config() {
        let service = ServiceDefinition::default();
        let output = Splitter::new(SplitConfig::default(), template())
            .classify(&service, None, &Placements::new())
            .unwrap()
            .link()
            .unwrap()
            .sequence()
            .unwrap();

        let files: Vec<_> = output.nested.iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(files, ["AlarmsNestedStack.json", "LogGroupsNestedStack.json"]);
        assert!(output.root["Resources"]["Queue"].is_object());
        assert_eq!(
            output.root["Resources"]["AlarmsNestedStack"]["Type"],
            "AWS::CloudFormation::Stack"
        );
        assert_eq!(output.placements["Alarm"].partition, "Alarms");
        assert!(output.analysis.is_none());
        assert_eq!(output.deployment_order()[0], vec!["root"]);
        assert!(output.log.contains("Using strategies: per-type"));
        assert!(output.log.contains("├─ per-type: 2 resources into 2 stacks (Alarms: 1, LogGroups: 1)"));
    }

    #[test]
    fn test_stage_accessors() {
        let service = ServiceDefinition::default();
        let classified = Splitter::new(SplitConfig::default(), template())
            .classify(&service, None, &Placements::new())
            .unwrap();
        assert_eq!(classified.assignment().num_partitions(), 2);
        assert_eq!(classified.template().num_resources(), 3);
        let per_type = &classified.strategy_reports()["per-type"];
        assert_eq!(per_type.claimed["Alarms"], 1);
        assert_eq!(per_type.claimed["LogGroups"], 1);

        let linked = classified.link().unwrap();
        assert_eq!(linked.linked().cross_references.len(), 1);
        assert_eq!(linked.assignment().root_resources(), ["Queue"]);
    }

    #[test]
    fn test_analysis_enabled() {
        let config = SplitConfig {
            analyze: true,
            ..Default::default()
        };
        let output = Splitter::new(config, template())
            .classify(&ServiceDefinition::default(), None, &Placements::new())
            .unwrap()
            .link()
            .unwrap()
            .sequence()
            .unwrap();
        let analysis = output.analysis.unwrap();
        assert_eq!(analysis.summary.total_stacks, 2);
        assert_eq!(analysis.summary.total_resources, 3);
    }

    #[test]
    fn test_existing_placements_respected() {
        let first = Splitter::new(SplitConfig::default(), template())
            .classify(&ServiceDefinition::default(), None, &Placements::new())
            .unwrap();
        let placements = first.assignment().placements();

        let config = SplitConfig {
            per_type: false,
            ..Default::default()
        };
        let second = Splitter::new(config, template())
            .classify(&ServiceDefinition::default(), None, &placements)
            .unwrap();
        assert_eq!(
            second.assignment().partition("Alarms").unwrap().resources,
            vec!["Alarm"]
        );
    }
}
