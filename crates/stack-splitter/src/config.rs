// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Split configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! per_stack_name = true
//! per_type = false
//! nested_stack_count = 10
//! max_resources_per_stack = 200
//! analyze = true
//! artifact_prefix = "serverless/billing/dev"
//!
//! [type_map]
//! "AWS::DynamoDB::Table" = "Data"
//!
//! [[custom]]
//! logical_id_prefix = "Reports"
//! destination = "Reporting"
//! ```

use crate::SplitError;
use indexmap::IndexMap;
use stack_planner::{
    CustomRule, CustomRules, EventSource, MigrationStrategy, Naming, PerFunction, PerGroupFunction,
    PerType, ServiceDefinition, StackNameStrategy, StrategyEngine,
};
use std::path::Path;

/// Configuration for a split run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// One partition per function.
    pub per_function: bool,
    /// One partition per resource type family.
    pub per_type: bool,
    /// Group functions by their `stackName`.
    #[serde(alias = "per_custom_group")]
    pub per_stack_name: bool,
    /// Hash-bucket functions into `nested_stack_count` partitions.
    pub per_group_function: bool,
    /// Number of buckets for `per_group_function`.
    pub nested_stack_count: u32,
    /// Capacity of a suffixable partition before it spills over.
    pub max_resources_per_stack: usize,
    /// Write the analysis report next to the documents.
    pub analyze: bool,
    /// Key prefix of the nested documents in the deployment bucket.
    pub artifact_prefix: String,
    /// Deployment bucket name; the root template's bucket when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_bucket: Option<String>,
    /// Type → destination overrides for `per_type`.
    pub type_map: IndexMap<String, String>,
    /// Custom placement rules, checked first.
    pub custom: Vec<CustomRule>,
}

impl SplitConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, SplitError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SplitError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, SplitError> {
        toml::from_str(toml_str)
            .map_err(|e| SplitError::ConfigError(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, SplitError> {
        toml::to_string_pretty(self)
            .map_err(|e| SplitError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Returns `true` if at least one strategy is switched on.
    pub fn any_strategy(&self) -> bool {
        self.per_function
            || self.per_type
            || self.per_stack_name
            || self.per_group_function
            || !self.custom.is_empty()
    }

    /// Creates the strategies enabled by this config, in priority order.
    ///
    /// Fails if a custom rule is invalid or if `per_stack_name` is on and a
    /// function has no `stackName`.
    pub fn create_strategies(
        &self,
        service: &ServiceDefinition,
        naming: Option<&dyn Naming>,
    ) -> Result<Vec<Box<dyn MigrationStrategy>>, SplitError> {
        let events = service.http_events();
        let events = events.as_deref();

        let strategies: Vec<Box<dyn MigrationStrategy>> = vec![
            Box::new(CustomRules::new(self.custom.clone())?),
            Box::new(StackNameStrategy::new(self.per_stack_name, service, events, naming)?),
            Box::new(PerFunction::new(self.per_function, service, events, naming)),
            Box::new(PerType::new(self.per_type, &self.type_map)),
            Box::new(PerGroupFunction::new(
                self.per_group_function,
                service,
                naming,
                self.nested_stack_count,
            )),
        ];
        Ok(strategies)
    }

    /// Creates a [`StrategyEngine`] running [`Self::create_strategies`].
    pub fn create_engine(
        &self,
        service: &ServiceDefinition,
        naming: Option<&dyn Naming>,
    ) -> Result<StrategyEngine, SplitError> {
        Ok(StrategyEngine::new(self.create_strategies(service, naming)?)
            .with_max_resources(self.max_resources_per_stack))
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            per_function: false,
            per_type: true,
            per_stack_name: false,
            per_group_function: false,
            nested_stack_count: 10,
            max_resources_per_stack: StrategyEngine::DEFAULT_MAX_RESOURCES,
            analyze: false,
            artifact_prefix: "serverless".to_string(),
            deployment_bucket: None,
            type_map: IndexMap::new(),
            custom: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stack_planner::{AwsNaming, FunctionDef, PlannerError};

    #[test]
    fn test_default() {
        let c = SplitConfig::default();
        assert!(c.per_type);
        assert!(!c.per_stack_name);
        assert_eq!(c.nested_stack_count, 10);
        assert_eq!(c.max_resources_per_stack, 200);
        assert!(c.any_strategy());
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
per_custom_group = true
per_type = false
analyze = true
artifact_prefix = "deploys/dev"

[type_map]
"AWS::DynamoDB::Table" = "Data"

[[custom]]
logical_id_prefix = "Reports"
destination = "Reporting"
force = true
"#;
        let c = SplitConfig::from_toml(toml).unwrap();
        assert!(c.per_stack_name);
        assert!(!c.per_type);
        assert!(c.analyze);
        assert_eq!(c.artifact_prefix, "deploys/dev");
        assert_eq!(c.type_map["AWS::DynamoDB::Table"], "Data");
        assert_eq!(c.custom.len(), 1);
        assert!(c.custom[0].force);
        assert_eq!(c.nested_stack_count, 10);
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let mut c = SplitConfig {
            per_stack_name: true,
            deployment_bucket: Some("artifacts".into()),
            ..Default::default()
        };
        c.type_map.insert("AWS::SQS::Queue".into(), "Queues".into());
        let toml = c.to_toml().unwrap();
        assert_eq!(SplitConfig::from_toml(&toml).unwrap(), c);
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            SplitConfig::from_toml("per_type = \"yes\""),
            Err(SplitError::ConfigError(_))
        ));
    }

    #[test]
    fn test_create_strategies_order() {
        let service = ServiceDefinition::new(vec![FunctionDef::new("a", "h").with_stack_name("g")]);
        let c = SplitConfig {
            per_stack_name: true,
            ..Default::default()
        };
        let engine = c.create_engine(&service, Some(&AwsNaming)).unwrap();
        assert_eq!(engine.active_strategies(), ["stack-name", "per-type"]);
    }

    #[test]
    fn test_create_strategies_missing_stack_name() {
        let service = ServiceDefinition::new(vec![FunctionDef::new("a", "h")]);
        let c = SplitConfig {
            per_stack_name: true,
            ..Default::default()
        };
        assert!(matches!(
            c.create_strategies(&service, Some(&AwsNaming)),
            Err(SplitError::PlannerError(PlannerError::MissingStackName { .. }))
        ));
    }
}
