// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! One partition per resource type family.
//!
//! Resource types are looked up in a type → destination map. The built-in
//! map covers the high-volume types the packaging framework generates per
//! function; entries from configuration override it, and an empty
//! destination removes a built-in entry.

use crate::registry::PartitionKind;
use crate::strategy::{Classification, Migration, MigrationStrategy, StrategyPriority};
use indexmap::IndexMap;
use template_ir::Resource;

/// Built-in type → destination map.
pub const DEFAULT_TYPE_MAP: &[(&str, &str)] = &[
    ("AWS::ApiGateway::Method", "API"),
    ("AWS::ApiGateway::Resource", "API"),
    ("AWS::CloudWatch::Alarm", "Alarms"),
    ("AWS::Lambda::Permission", "Permissions"),
    ("AWS::Lambda::Version", "Versions"),
    ("AWS::Logs::LogGroup", "LogGroups"),
    ("AWS::Logs::MetricFilter", "Filters"),
    ("AWS::Logs::SubscriptionFilter", "Subscriptions"),
    ("AWS::Lambda::EventSourceMapping", "EventSourceMappings"),
];

/// Places resources by type.
#[derive(Debug, Clone, Default)]
pub struct PerType {
    active: bool,
    map: IndexMap<String, String>,
}

impl PerType {
    /// Builds the map from [`DEFAULT_TYPE_MAP`] plus `overrides`.
    pub fn new(active: bool, overrides: &IndexMap<String, String>) -> Self {
        let mut map: IndexMap<String, String> = DEFAULT_TYPE_MAP
            .iter()
            .map(|(t, d)| (t.to_string(), d.to_string()))
            .collect();
        for (resource_type, destination) in overrides {
            if destination.trim().is_empty() {
                map.shift_remove(resource_type);
            } else {
                map.insert(resource_type.clone(), destination.clone());
            }
        }
        Self { active, map }
    }

    /// Returns the destination for a resource type, if mapped.
    pub fn destination(&self, resource_type: &str) -> Option<&str> {
        self.map.get(resource_type).map(String::as_str)
    }
}

impl MigrationStrategy for PerType {
    fn name(&self) -> &str {
        "per-type"
    }

    fn priority(&self) -> StrategyPriority {
        StrategyPriority::PerType
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn classify(&mut self, resource: &Resource) -> Classification {
        let Some(destination) = self.destination(&resource.resource_type) else {
            return Classification::Decline;
        };
        Classification::Claim(
            Migration::new(
                destination,
                PartitionKind::PerType,
                format!("Per type: {}", resource.resource_type),
            )
            .with_suffix(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_map() {
        let mut s = PerType::new(true, &IndexMap::new());
        let m = s
            .classify(&Resource::new("UsersLambdaPermissionApiGateway", "AWS::Lambda::Permission"))
            .migration()
            .unwrap();
        assert_eq!(m.destination, "Permissions");
        assert_eq!(m.reason, "Per type: AWS::Lambda::Permission");
        assert!(m.allow_suffix);
        assert_eq!(s.classify(&Resource::new("Table", "AWS::DynamoDB::Table")), Classification::Decline);
    }

    #[test]
    fn test_overrides() {
        let overrides: IndexMap<String, String> = [
            ("AWS::DynamoDB::Table".to_string(), "Data".to_string()),
            ("AWS::Lambda::Version".to_string(), String::new()),
            ("AWS::CloudWatch::Alarm".to_string(), "Monitoring".to_string()),
        ]
        .into_iter()
        .collect();
        let s = PerType::new(true, &overrides);
        assert_eq!(s.destination("AWS::DynamoDB::Table"), Some("Data"));
        assert_eq!(s.destination("AWS::Lambda::Version"), None);
        assert_eq!(s.destination("AWS::CloudWatch::Alarm"), Some("Monitoring"));
        assert_eq!(s.destination("AWS::Logs::LogGroup"), Some("LogGroups"));
    }
}
