// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Function definitions and HTTP routes of the service being split.
//!
//! The planner consumes these through two narrow traits:
//! [`FunctionRegistry`] (ordered function definitions) and
//! [`EventSource`] (gateway routes). [`ServiceDefinition`] implements both
//! from the service description document.
//!
//! # Format
//! ```json
//! {
//!   "service": "billing",
//!   "functions": {
//!     "invoices": {
//!       "handler": "src/invoices.handler",
//!       "stackName": "billing",
//!       "events": [
//!         { "http": { "path": "invoices/{id}", "method": "get" } },
//!         { "http": "POST invoices" }
//!       ]
//!     }
//!   }
//! }
//! ```

use crate::PlannerError;
use indexmap::IndexMap;
use serde_json::Value;
use std::path::Path;

/// A single function of the service.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDef {
    /// Function name (the key in the `functions` map).
    #[serde(skip)]
    pub name: String,
    /// Handler entry point.
    #[serde(default)]
    pub handler: String,
    /// Grouping key used by the stack-name strategy.
    #[serde(default)]
    pub stack_name: Option<String>,
    /// Raw event declarations; only `http` events are interpreted.
    #[serde(default)]
    pub events: Vec<Value>,
}

impl FunctionDef {
    /// Creates a function with a handler and no events.
    pub fn new(name: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handler: handler.into(),
            stack_name: None,
            events: Vec::new(),
        }
    }

    /// Sets the grouping key.
    pub fn with_stack_name(mut self, stack_name: impl Into<String>) -> Self {
        self.stack_name = Some(stack_name.into());
        self
    }

    /// Adds an `http` event for `method path`.
    pub fn with_http(mut self, method: &str, path: &str) -> Self {
        self.events
            .push(serde_json::json!({ "http": { "method": method, "path": path } }));
        self
    }

    /// Returns the HTTP routes declared by this function.
    ///
    /// Malformed `http` entries are skipped.
    pub fn http_events(&self) -> Vec<HttpEvent> {
        self.events
            .iter()
            .filter_map(|event| event.get("http"))
            .filter_map(|http| match parse_http(http) {
                Some((method, path)) => Some(HttpEvent {
                    function_name: self.name.clone(),
                    path,
                    method,
                }),
                None => {
                    tracing::debug!("ignoring malformed http event on function '{}'", self.name);
                    None
                }
            })
            .collect()
    }
}

fn parse_http(http: &Value) -> Option<(String, String)> {
    match http {
        Value::String(shorthand) => {
            let (method, path) = shorthand.trim().split_once(char::is_whitespace)?;
            Some((method.to_string(), path.trim().trim_matches('/').to_string()))
        }
        Value::Object(map) => {
            let method = map.get("method")?.as_str()?;
            let path = map.get("path")?.as_str()?;
            Some((method.to_string(), path.trim_matches('/').to_string()))
        }
        _ => None,
    }
}

/// One gateway route: `method path` served by `function_name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HttpEvent {
    pub function_name: String,
    /// Path without leading or trailing `/` (e.g. `"users/{id}"`).
    pub path: String,
    pub method: String,
}

/// Enumerable, ordered mapping of function name to definition.
pub trait FunctionRegistry {
    fn functions(&self) -> &[FunctionDef];
}

/// Ordered list of gateway routes.
///
/// `None` means the gateway collaborator is absent; gateway resources
/// then simply fall through to later strategies or root.
pub trait EventSource {
    fn http_events(&self) -> Option<Vec<HttpEvent>>;
}

impl FunctionRegistry for [FunctionDef] {
    fn functions(&self) -> &[FunctionDef] {
        self
    }
}

impl FunctionRegistry for Vec<FunctionDef> {
    fn functions(&self) -> &[FunctionDef] {
        self
    }
}

impl EventSource for [HttpEvent] {
    fn http_events(&self) -> Option<Vec<HttpEvent>> {
        Some(self.to_vec())
    }
}

#[derive(serde::Deserialize)]
struct RawService {
    #[serde(default)]
    service: Option<Value>,
    #[serde(default)]
    functions: IndexMap<String, FunctionDef>,
}

/// The service description: its name and its functions in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceDefinition {
    pub service: Option<String>,
    pub functions: Vec<FunctionDef>,
}

impl ServiceDefinition {
    /// Creates a service from function definitions.
    pub fn new(functions: Vec<FunctionDef>) -> Self {
        Self {
            service: None,
            functions,
        }
    }

    /// Loads a service description from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, PlannerError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PlannerError::InvalidService(format!("cannot read '{}': {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    /// Parses a service description from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, PlannerError> {
        let raw: RawService = serde_json::from_str(json)
            .map_err(|e| PlannerError::InvalidService(e.to_string()))?;
        let service = raw.service.map(|s| match s {
            Value::String(name) => name,
            Value::Object(map) => map
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            other => other.to_string(),
        });
        let functions = raw
            .functions
            .into_iter()
            .map(|(name, mut def)| {
                def.name = name;
                def
            })
            .collect();
        Ok(Self { service, functions })
    }
}

impl FunctionRegistry for ServiceDefinition {
    fn functions(&self) -> &[FunctionDef] {
        &self.functions
    }
}

impl EventSource for ServiceDefinition {
    fn http_events(&self) -> Option<Vec<HttpEvent>> {
        let events: Vec<HttpEvent> = self
            .functions
            .iter()
            .flat_map(FunctionDef::http_events)
            .collect();
        (!events.is_empty()).then_some(events)
    }
}
