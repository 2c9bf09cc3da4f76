// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Resource definitions for the template IR.
//!
//! A [`Resource`] is one entry of the template's `Resources` section. Its
//! identity is the logical id; the definition itself is never mutated by
//! the planner, only copied into the document it is finally assigned to.

use crate::references::{find_references, rewrite_references, Reference, Rewrite};
use crate::TemplateError;
use serde_json::{Map, Value};

/// A single named resource of the template.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Unique identifier within the template (e.g., `"UsersLambdaFunction"`).
    pub logical_id: String,
    /// Resource type (e.g., `"AWS::Lambda::Function"`).
    pub resource_type: String,
    /// The `Properties` block, or `Value::Null` when absent.
    pub properties: Value,
    /// Explicit `DependsOn` entries, normalised to a list.
    pub depends_on: Vec<String>,
    /// Name of the template condition guarding this resource, if any.
    pub condition: Option<String>,
    /// Any other top-level keys (`DeletionPolicy`, `Metadata`, ...), kept verbatim.
    pub attributes: Map<String, Value>,
}

impl Resource {
    /// Creates a resource with no properties.
    pub fn new(logical_id: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            resource_type: resource_type.into(),
            properties: Value::Null,
            depends_on: Vec::new(),
            condition: None,
            attributes: Map::new(),
        }
    }

    /// Sets the `Properties` block.
    pub fn with_properties(mut self, properties: Value) -> Self {
        self.properties = properties;
        self
    }

    /// Parses a resource from its JSON definition.
    pub fn from_value(logical_id: &str, value: &Value) -> Result<Self, TemplateError> {
        let invalid = |detail: &str| TemplateError::InvalidResource {
            logical_id: logical_id.to_string(),
            detail: detail.to_string(),
        };

        let body = value
            .as_object()
            .ok_or_else(|| invalid("definition is not an object"))?;

        let resource_type = body
            .get("Type")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("missing string 'Type'"))?
            .to_string();

        let depends_on = match body.get("DependsOn") {
            None => Vec::new(),
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| invalid("'DependsOn' entries must be strings"))
                })
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(invalid("'DependsOn' must be a string or a list")),
        };

        let condition = match body.get("Condition") {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(invalid("'Condition' must be a string")),
        };

        let attributes = body
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), "Type" | "Properties" | "DependsOn" | "Condition"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(Self {
            logical_id: logical_id.to_string(),
            resource_type,
            properties: body.get("Properties").cloned().unwrap_or(Value::Null),
            depends_on,
            condition,
            attributes,
        })
    }

    /// Serialises the resource back into its JSON definition.
    pub fn to_value(&self) -> Value {
        let mut body = Map::new();
        body.insert("Type".into(), Value::String(self.resource_type.clone()));
        if !self.properties.is_null() {
            body.insert("Properties".into(), self.properties.clone());
        }
        match self.depends_on.as_slice() {
            [] => {}
            [single] => {
                body.insert("DependsOn".into(), Value::String(single.clone()));
            }
            many => {
                body.insert(
                    "DependsOn".into(),
                    Value::Array(many.iter().cloned().map(Value::String).collect()),
                );
            }
        }
        if let Some(condition) = &self.condition {
            body.insert("Condition".into(), Value::String(condition.clone()));
        }
        for (k, v) in &self.attributes {
            body.insert(k.clone(), v.clone());
        }
        Value::Object(body)
    }

    /// Returns every reference made by this resource.
    ///
    /// `Properties` and the verbatim attributes (`Metadata`,
    /// `UpdatePolicy`, `CreationPolicy`, ...) are scanned; `DependsOn` and
    /// `Condition` name ids directly and are not references.
    pub fn references(&self) -> Vec<Reference> {
        let mut refs = find_references(&self.logical_id, &self.properties);
        for value in self.attributes.values() {
            refs.extend(find_references(&self.logical_id, value));
        }
        refs
    }

    /// Applies `rewrite` to every reference found by [`Self::references`].
    pub fn rewrite_references<F>(&mut self, rewrite: &mut F)
    where
        F: FnMut(&Reference) -> Option<Rewrite>,
    {
        rewrite_references(&self.logical_id, &mut self.properties, rewrite);
        for value in self.attributes.values_mut() {
            rewrite_references(&self.logical_id, value, rewrite);
        }
    }

    /// Returns `true` if the resource type is `service::kind` for the given pair,
    /// e.g. `is_type("Lambda", "Function")`.
    pub fn is_type(&self, service: &str, kind: &str) -> bool {
        let mut parts = self.resource_type.split("::");
        matches!(
            (parts.next(), parts.next(), parts.next(), parts.next()),
            (Some("AWS"), Some(s), Some(k), None) if s == service && k == kind
        )
    }

    /// Returns a one-line summary of the resource.
    pub fn summary(&self) -> String {
        let refs = self.references().len();
        format!("{:<40} {:<36} refs={refs}", self.logical_id, self.resource_type)
    }
}
