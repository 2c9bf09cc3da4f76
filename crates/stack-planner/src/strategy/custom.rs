// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! User-supplied placement rules.
//!
//! Rules are checked in declaration order and the first matching rule
//! wins. A rule matches when every selector it sets matches:
//!
//! ```toml
//! [[custom]]
//! logical_id_prefix = "Reports"
//! resource_type = "AWS::DynamoDB::Table"
//! destination = "Reporting"
//! ```

use crate::registry::PartitionKind;
use crate::strategy::{Classification, Migration, MigrationStrategy, StrategyPriority};
use crate::PlannerError;
use template_ir::Resource;

/// A single custom placement rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CustomRule {
    /// Exact logical id.
    #[serde(default)]
    pub logical_id: Option<String>,
    /// Logical id prefix.
    #[serde(default)]
    pub logical_id_prefix: Option<String>,
    /// Exact resource type.
    #[serde(default)]
    pub resource_type: Option<String>,
    /// Partition the matched resources go to.
    pub destination: String,
    /// Move resources pinned by an earlier run.
    #[serde(default)]
    pub force: bool,
}

impl CustomRule {
    fn matches(&self, resource: &Resource) -> bool {
        self.logical_id.as_deref().map_or(true, |id| resource.logical_id == id)
            && self
                .logical_id_prefix
                .as_deref()
                .map_or(true, |p| resource.logical_id.starts_with(p))
            && self
                .resource_type
                .as_deref()
                .map_or(true, |t| resource.resource_type == t)
    }

    fn has_selector(&self) -> bool {
        self.logical_id.is_some() || self.logical_id_prefix.is_some() || self.resource_type.is_some()
    }
}

/// Applies [`CustomRule`]s in order.
#[derive(Debug, Clone, Default)]
pub struct CustomRules {
    rules: Vec<CustomRule>,
}

impl CustomRules {
    /// Validates and wraps the rules. Rule numbers in errors and reasons
    /// are 1-based.
    pub fn new(rules: Vec<CustomRule>) -> Result<Self, PlannerError> {
        for (i, rule) in rules.iter().enumerate() {
            if !rule.has_selector() {
                return Err(PlannerError::InvalidRule {
                    index: i + 1,
                    detail: "rule has no logical_id, logical_id_prefix or resource_type".into(),
                });
            }
            if rule.destination.trim().is_empty() {
                return Err(PlannerError::InvalidRule {
                    index: i + 1,
                    detail: "destination is empty".into(),
                });
            }
        }
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl MigrationStrategy for CustomRules {
    fn name(&self) -> &str {
        "custom"
    }

    fn priority(&self) -> StrategyPriority {
        StrategyPriority::Custom
    }

    fn is_active(&self) -> bool {
        !self.rules.is_empty()
    }

    fn classify(&mut self, resource: &Resource) -> Classification {
        let Some((i, rule)) = self
            .rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.matches(resource))
        else {
            return Classification::Decline;
        };
        Classification::Claim(
            Migration::new(&rule.destination, PartitionKind::Custom, format!("Custom rule #{}", i + 1))
                .forced(rule.force),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(prefix: &str, destination: &str) -> CustomRule {
        CustomRule {
            logical_id_prefix: Some(prefix.into()),
            destination: destination.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let mut s = CustomRules::new(vec![rule("Orders", "Orders"), rule("Order", "Misc")]).unwrap();
        let m = s.classify(&Resource::new("OrdersTable", "AWS::DynamoDB::Table")).migration().unwrap();
        assert_eq!(m.destination, "Orders");
        assert_eq!(m.reason, "Custom rule #1");
        let m = s.classify(&Resource::new("OrderQueue", "AWS::SQS::Queue")).migration().unwrap();
        assert_eq!(m.destination, "Misc");
        assert_eq!(m.reason, "Custom rule #2");
        assert_eq!(s.classify(&Resource::new("Users", "AWS::SQS::Queue")), Classification::Decline);
    }

    #[test]
    fn test_all_selectors_must_match() {
        let mut s = CustomRules::new(vec![CustomRule {
            logical_id_prefix: Some("Reports".into()),
            resource_type: Some("AWS::DynamoDB::Table".into()),
            destination: "Reporting".into(),
            force: true,
            ..Default::default()
        }])
        .unwrap();
        assert_eq!(s.classify(&Resource::new("ReportsQueue", "AWS::SQS::Queue")), Classification::Decline);
        let m = s.classify(&Resource::new("ReportsTable", "AWS::DynamoDB::Table")).migration().unwrap();
        assert!(m.force);
        assert_eq!(m.kind, PartitionKind::Custom);
    }

    #[test]
    fn test_invalid_rules() {
        let no_selector = CustomRule {
            destination: "X".into(),
            ..Default::default()
        };
        assert!(matches!(
            CustomRules::new(vec![rule("A", "A"), no_selector]),
            Err(PlannerError::InvalidRule { index: 2, .. })
        ));
        assert!(matches!(
            CustomRules::new(vec![rule("A", " ")]),
            Err(PlannerError::InvalidRule { index: 1, .. })
        ));
    }

    #[test]
    fn test_inactive_without_rules() {
        assert!(!CustomRules::new(Vec::new()).unwrap().is_active());
    }
}
