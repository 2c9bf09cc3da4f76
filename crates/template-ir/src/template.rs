// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Template graph: the full document as an ordered map of resources.
//!
//! # Type-State Pattern
//!
//! ```text
//! Template<Loaded>     — sections parsed, not yet checked.
//!       │  .validate()
//!       ▼
//! Template<Validated>  — ids and DependsOn verified, ready for planning.
//! ```
//!
//! The planner only accepts `Template<Validated>`, so it never sees a
//! resource without a type or a dangling `DependsOn`.

use crate::references::Reference;
use crate::{Resource, TemplateError};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

// ── Type-state markers ─────────────────────────────────────────────

/// Marker: template has been parsed but not validated.
#[derive(Debug, Clone)]
pub struct Loaded;

/// Marker: template has been validated and is ready for planning.
#[derive(Debug, Clone)]
pub struct Validated;

/// Sealed trait for template states.
pub trait TemplateState: fmt::Debug + Clone {}
impl TemplateState for Loaded {}
impl TemplateState for Validated {}

// ── Template ───────────────────────────────────────────────────────

/// A declarative infrastructure template.
///
/// Resources keep their document order; every later stage iterates them
/// in that order so a run is deterministic.
#[derive(Debug, Clone)]
pub struct Template<S: TemplateState = Loaded> {
    /// Template `Description`, if any.
    pub description: Option<String>,
    /// `Parameters` section.
    pub parameters: Map<String, Value>,
    /// `Conditions` section.
    pub conditions: Map<String, Value>,
    /// `Resources` section in document order.
    pub resources: IndexMap<String, Resource>,
    /// `Outputs` section.
    pub outputs: Map<String, Value>,
    /// Every other top-level section (`Mappings`, `Metadata`, ...).
    pub extra: Map<String, Value>,
    _state: std::marker::PhantomData<S>,
}

// ── Loaded state ───────────────────────────────────────────────────

impl Template<Loaded> {
    /// Creates a template holding only the given resources.
    pub fn new(resources: Vec<Resource>) -> Self {
        Self {
            description: None,
            parameters: Map::new(),
            conditions: Map::new(),
            resources: resources
                .into_iter()
                .map(|r| (r.logical_id.clone(), r))
                .collect(),
            outputs: Map::new(),
            extra: Map::new(),
            _state: std::marker::PhantomData,
        }
    }

    /// Parses a template from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, TemplateError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Builds a template from an already-parsed JSON document.
    pub fn from_value(value: Value) -> Result<Self, TemplateError> {
        let Value::Object(mut doc) = value else {
            return Err(TemplateError::InvalidTemplate(
                "template root is not an object".into(),
            ));
        };

        let mut section = |name: &str| -> Result<Map<String, Value>, TemplateError> {
            match doc.shift_remove(name) {
                None => Ok(Map::new()),
                Some(Value::Object(map)) => Ok(map),
                Some(_) => Err(TemplateError::InvalidTemplate(format!(
                    "section '{name}' is not an object"
                ))),
            }
        };

        let parameters = section("Parameters")?;
        let conditions = section("Conditions")?;
        let raw_resources = section("Resources")?;
        let outputs = section("Outputs")?;

        let description = match doc.shift_remove("Description") {
            None => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        };

        let mut resources = IndexMap::with_capacity(raw_resources.len());
        for (logical_id, body) in &raw_resources {
            resources.insert(logical_id.clone(), Resource::from_value(logical_id, body)?);
        }

        Ok(Self {
            description,
            parameters,
            conditions,
            resources,
            outputs,
            extra: doc,
            _state: std::marker::PhantomData,
        })
    }

    /// Validates the template and transitions to the `Validated` state.
    ///
    /// # Checks
    /// - At least one resource is defined.
    /// - Logical ids are non-empty and alphanumeric.
    /// - No resource has an empty `Type`.
    /// - Every `DependsOn` entry names a resource of this template.
    pub fn validate(self) -> Result<Template<Validated>, TemplateError> {
        if self.resources.is_empty() {
            return Err(TemplateError::InvalidTemplate(
                "template contains no resources".into(),
            ));
        }

        for (logical_id, resource) in &self.resources {
            if logical_id.is_empty() || !logical_id.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(TemplateError::InvalidResource {
                    logical_id: logical_id.clone(),
                    detail: "logical id must be non-empty and alphanumeric".into(),
                });
            }
            if resource.resource_type.trim().is_empty() {
                return Err(TemplateError::InvalidResource {
                    logical_id: logical_id.clone(),
                    detail: "resource type is empty".into(),
                });
            }
            for dep in &resource.depends_on {
                if !self.resources.contains_key(dep) {
                    return Err(TemplateError::InvalidResource {
                        logical_id: logical_id.clone(),
                        detail: format!("DependsOn names unknown resource '{dep}'"),
                    });
                }
            }
        }

        Ok(Template {
            description: self.description,
            parameters: self.parameters,
            conditions: self.conditions,
            resources: self.resources,
            outputs: self.outputs,
            extra: self.extra,
            _state: std::marker::PhantomData,
        })
    }
}

// ── Validated state ────────────────────────────────────────────────

impl Template<Validated> {
    /// Returns the total number of resources.
    pub fn num_resources(&self) -> usize {
        self.resources.len()
    }

    /// Returns an iterator over the resources in document order.
    pub fn iter_resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Returns a resource by logical id.
    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    /// Returns `true` if `name` is declared in the `Parameters` section.
    pub fn is_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    /// Returns resource counts per type, sorted by type name.
    pub fn type_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for r in self.iter_resources() {
            *counts.entry(r.resource_type.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Returns every reference whose target is `logical_id`.
    pub fn references_to(&self, logical_id: &str) -> Vec<Reference> {
        self.iter_resources()
            .flat_map(|r| r.references())
            .filter(|r| r.target_id == logical_id)
            .collect()
    }

    /// Returns the total number of references made by all resources.
    pub fn num_references(&self) -> usize {
        self.iter_resources().map(|r| r.references().len()).sum()
    }

    /// Returns a summary string describing the template.
    pub fn summary(&self) -> String {
        format!(
            "Template: {} resources of {} types, {} parameters, {} outputs, {} references",
            self.num_resources(),
            self.type_counts().len(),
            self.parameters.len(),
            self.outputs.len(),
            self.num_references(),
        )
    }
}

// ── Shared implementations ─────────────────────────────────────────

impl<S: TemplateState> Template<S> {
    /// Serialises the template back to a JSON document.
    pub fn to_value(&self) -> Value {
        let mut doc = self.extra.clone();
        if let Some(description) = &self.description {
            doc.insert("Description".into(), Value::String(description.clone()));
        }
        let sections = [
            ("Parameters", &self.parameters),
            ("Conditions", &self.conditions),
        ];
        for (name, section) in sections {
            if !section.is_empty() {
                doc.insert(name.into(), Value::Object(section.clone()));
            }
        }
        doc.insert(
            "Resources".into(),
            Value::Object(
                self.resources
                    .iter()
                    .map(|(id, r)| (id.clone(), r.to_value()))
                    .collect(),
            ),
        );
        if !self.outputs.is_empty() {
            doc.insert("Outputs".into(), Value::Object(self.outputs.clone()));
        }
        Value::Object(doc)
    }
}

impl<S: TemplateState> fmt::Display for Template<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Template ({} resources):", self.resources.len())?;
        for resource in self.resources.values() {
            writeln!(f, "  {}", resource.summary())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_json() -> Value {
        json!({
            "AWSTemplateFormatVersion": "2010-09-09",
            "Description": "sample",
            "Parameters": { "Stage": { "Type": "String" } },
            "Resources": {
                "Table": { "Type": "AWS::DynamoDB::Table" },
                "UsersLambdaFunction": {
                    "Type": "AWS::Lambda::Function",
                    "Properties": {
                        "Environment": { "Variables": {
                            "TABLE": { "Ref": "Table" },
                            "STAGE": { "Ref": "Stage" }
                        }}
                    },
                    "DependsOn": "UsersLogGroup"
                },
                "UsersLogGroup": { "Type": "AWS::Logs::LogGroup" }
            },
            "Outputs": { "TableName": { "Value": { "Ref": "Table" } } }
        })
    }

    #[test]
    fn test_from_value_and_validate() {
        let t = Template::from_value(sample_json()).unwrap().validate().unwrap();
        assert_eq!(t.num_resources(), 3);
        assert!(t.is_parameter("Stage"));
        assert_eq!(t.outputs.len(), 1);
        assert_eq!(t.extra.get("AWSTemplateFormatVersion"), Some(&json!("2010-09-09")));
    }

    #[test]
    fn test_document_order_preserved() {
        let t = Template::from_value(sample_json()).unwrap().validate().unwrap();
        let ids: Vec<_> = t.iter_resources().map(|r| r.logical_id.as_str()).collect();
        assert_eq!(ids, ["Table", "UsersLambdaFunction", "UsersLogGroup"]);
    }

    #[test]
    fn test_validate_empty() {
        assert!(Template::new(vec![]).validate().is_err());
    }

    #[test]
    fn test_validate_bad_logical_id() {
        let t = Template::new(vec![Resource::new("bad-id", "AWS::SNS::Topic")]);
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_validate_dangling_depends_on() {
        let mut topic = Resource::new("Topic", "AWS::SNS::Topic");
        topic.depends_on.push("Missing".into());
        let t = Template::new(vec![topic]);
        let err = t.validate().unwrap_err();
        assert!(err.to_string().contains("Missing"));
    }

    #[test]
    fn test_section_not_object() {
        let err = Template::from_value(json!({ "Resources": [] })).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidTemplate(_)));
    }

    #[test]
    fn test_references_to() {
        let t = Template::from_value(sample_json()).unwrap().validate().unwrap();
        let refs = t.references_to("Table");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].source_id, "UsersLambdaFunction");
    }

    #[test]
    fn test_type_counts_and_summary() {
        let t = Template::from_value(sample_json()).unwrap().validate().unwrap();
        assert_eq!(t.type_counts().get("AWS::Logs::LogGroup"), Some(&1));
        let s = t.summary();
        assert!(s.contains("3 resources"));
        assert!(s.contains("2 references"));
    }

    #[test]
    fn test_to_value_roundtrip() {
        let original = sample_json();
        let t = Template::from_value(original.clone()).unwrap();
        assert_eq!(t.to_value(), original);
    }

    #[test]
    fn test_display() {
        let t = Template::new(vec![Resource::new("Topic", "AWS::SNS::Topic")]);
        assert!(format!("{t}").contains("Topic"));
    }
}
