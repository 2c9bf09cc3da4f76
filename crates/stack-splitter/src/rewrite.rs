// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Cross-partition reference rewriting.
//!
//! Once the [`Assignment`] is frozen, every reference that crosses a
//! partition boundary is replaced by output/parameter linkage:
//!
//! ```text
//!  nested Q                    root                          nested P
//!  Outputs:                    QNestedStack                  Parameters:
//!    TableArnOutput  ───────►    Outputs.TableArnOutput ───►   TableArnParameter
//!      GetAtt Table.Arn        PNestedStack.Parameters:      Properties:
//!                                TableArnParameter             Ref TableArnParameter
//! ```
//!
//! - Target in a nested partition `Q`: `Q` exports `<Target><Attr>Output`.
//! - Source in a nested partition `P`: `P` declares `<Target><Attr>Parameter`
//!   and its stack resource binds it to the value as seen from root.
//! - Source in root: the reference becomes a `GetAtt` on `Q`'s outputs.
//! - Root template parameters are passed through under their own name.
//!
//! `DependsOn` entries that cross a boundary are lifted to the nested
//! stack resources.

use crate::SplitError;
use indexmap::{IndexMap, IndexSet};
use serde_json::{json, Map, Value};
use stack_planner::{Assignment, Location, Partition, PartitionKind, ROOT};
use template_ir::{
    find_references, template::Validated, Reference, ReferenceKind, Resource, Rewrite, Template,
};
use std::collections::HashMap;

/// Resource type of a nested stack in the root document.
pub const STACK_TYPE: &str = "AWS::CloudFormation::Stack";

/// Logical id of the deployment bucket in the root document.
pub const DEPLOYMENT_BUCKET: &str = "ServerlessDeploymentBucket";

const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Returns the logical id of a partition's stack resource in root.
pub fn stack_logical_id(partition: &str) -> String {
    let mut id: String = partition.chars().filter(char::is_ascii_alphanumeric).collect();
    id.push_str("NestedStack");
    id
}

/// `<Target><Attr>` with everything but ASCII alphanumerics dropped.
fn link_name(reference: &Reference) -> String {
    reference
        .target_id
        .chars()
        .chain(reference.attribute.iter().flat_map(|a| a.chars()))
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// Returns `base`, or `base2`, `base3`, ... for the first name `free` accepts.
fn unique_name(base: &str, mut free: impl FnMut(&str) -> bool) -> String {
    if free(base) {
        return base.to_string();
    }
    (2u32..)
        .map(|n| format!("{base}{n}"))
        .find(|candidate| free(candidate))
        .unwrap_or_else(|| base.to_string())
}

// ── Options ────────────────────────────────────────────────────

/// Where the nested documents will be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOptions {
    /// Key prefix inside the deployment bucket.
    pub artifact_prefix: String,
    /// Bucket name; `Ref ServerlessDeploymentBucket` when unset.
    pub deployment_bucket: Option<String>,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            artifact_prefix: "serverless".to_string(),
            deployment_bucket: None,
        }
    }
}

impl LinkOptions {
    /// Returns the `TemplateURL` value for a nested document file.
    pub fn template_url(&self, file_name: &str) -> Value {
        let key = format!("{}/{file_name}", self.artifact_prefix.trim_matches('/'));
        match &self.deployment_bucket {
            Some(bucket) => Value::String(format!("https://s3.amazonaws.com/{bucket}/{key}")),
            None => json!({
                "Fn::Join": ["", [
                    "https://s3.amazonaws.com/",
                    { "Ref": DEPLOYMENT_BUCKET },
                    format!("/{key}"),
                ]]
            }),
        }
    }
}

// ── Records ────────────────────────────────────────────────────

/// One rewritten cross-partition reference.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossReference {
    pub kind: ReferenceKind,
    pub source_stack: String,
    pub source_id: String,
    pub target_stack: String,
    pub target_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    /// Output exported by the target partition, if nested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Parameter declared by the source partition, if nested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

impl CrossReference {
    fn new(reference: &Reference, source_stack: &str, target_stack: &str) -> Self {
        Self {
            kind: reference.kind,
            source_stack: source_stack.to_string(),
            source_id: reference.source_id.clone(),
            target_stack: target_stack.to_string(),
            target_id: reference.target_id.clone(),
            attribute: reference.attribute.clone(),
            output: None,
            parameter: None,
        }
    }
}

/// A parameter of a nested document and the root-side value bound to it.
#[derive(Debug, Clone, PartialEq)]
pub struct StackParameter {
    pub binding: Value,
    pub param_type: String,
}

/// A nested document ready to be written.
#[derive(Debug, Clone)]
pub struct NestedDocument {
    pub name: String,
    /// Logical id of this document's stack resource in root.
    pub stack_id: String,
    pub kind: PartitionKind,
    pub reason: String,
    pub parameters: IndexMap<String, StackParameter>,
    pub resources: IndexMap<String, Resource>,
    pub outputs: IndexMap<String, Value>,
    /// Root resources the stack resource must wait for.
    pub root_dependencies: IndexSet<String>,
    mappings: Option<Value>,
}

impl NestedDocument {
    fn new(partition: &Partition, template: &Template<Validated>) -> Self {
        Self {
            name: partition.name.clone(),
            stack_id: stack_logical_id(&partition.name),
            kind: partition.kind,
            reason: partition.reason.clone(),
            parameters: IndexMap::new(),
            resources: partition
                .resources
                .iter()
                .filter_map(|id| template.resource(id).map(|r| (id.clone(), r.clone())))
                .collect(),
            outputs: IndexMap::new(),
            root_dependencies: IndexSet::new(),
            mappings: template.extra.get("Mappings").cloned(),
        }
    }

    /// File name the document is written to and referenced by.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.stack_id)
    }

    pub fn num_resources(&self) -> usize {
        self.resources.len()
    }

    /// Serialises the document.
    pub fn to_value(&self) -> Value {
        let mut doc = Map::new();
        doc.insert("AWSTemplateFormatVersion".into(), json!(TEMPLATE_FORMAT_VERSION));
        doc.insert(
            "Description".into(),
            json!(format!("Nested stack {} ({})", self.name, self.reason)),
        );
        if !self.parameters.is_empty() {
            let params: Map<String, Value> = self
                .parameters
                .iter()
                .map(|(name, p)| (name.clone(), json!({ "Type": p.param_type })))
                .collect();
            doc.insert("Parameters".into(), Value::Object(params));
        }
        if let Some(mappings) = &self.mappings {
            doc.insert("Mappings".into(), mappings.clone());
        }
        let resources: Map<String, Value> = self
            .resources
            .iter()
            .map(|(id, r)| (id.clone(), r.to_value()))
            .collect();
        doc.insert("Resources".into(), Value::Object(resources));
        if !self.outputs.is_empty() {
            let outputs: Map<String, Value> = self
                .outputs
                .iter()
                .map(|(name, v)| (name.clone(), json!({ "Value": v })))
                .collect();
            doc.insert("Outputs".into(), Value::Object(outputs));
        }
        Value::Object(doc)
    }

    /// Builds this document's stack resource for the root document.
    fn stack_resource(&self, options: &LinkOptions) -> Resource {
        let mut properties = Map::new();
        properties.insert("TemplateURL".into(), options.template_url(&self.file_name()));
        if !self.parameters.is_empty() {
            let bindings: Map<String, Value> = self
                .parameters
                .iter()
                .map(|(name, p)| (name.clone(), p.binding.clone()))
                .collect();
            properties.insert("Parameters".into(), Value::Object(bindings));
        }
        let mut resource = Resource::new(&self.stack_id, STACK_TYPE).with_properties(Value::Object(properties));
        resource.depends_on = self.root_dependencies.iter().cloned().collect();
        resource
    }
}

/// The rewritten template: root plus nested documents.
#[derive(Debug, Clone)]
pub struct LinkedTemplate {
    /// Root document, including one stack resource per nested document.
    pub root: Template<Validated>,
    pub nested: IndexMap<String, NestedDocument>,
    pub cross_references: Vec<CrossReference>,
    /// Partition → partitions it depends on (`root` included).
    pub dependencies: IndexMap<String, IndexSet<String>>,
}

impl LinkedTemplate {
    /// Returns the stack resource of a nested partition.
    pub fn stack_resource_mut(&mut self, partition: &str) -> Option<&mut Resource> {
        let id = &self.nested.get(partition)?.stack_id;
        self.root.resources.get_mut(id)
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "LinkedTemplate: {} root resources, {} nested stacks, {} cross-stack references",
            self.root.num_resources(),
            self.nested.len(),
            self.cross_references.len(),
        )
    }
}

// ── Exports ────────────────────────────────────────────────────

/// Outputs each nested partition must export, named once per
/// `(target, attribute)` pair.
#[derive(Debug, Default)]
struct Exports {
    names: HashMap<(String, Option<String>), String>,
    outputs: IndexMap<String, IndexMap<String, Value>>,
}

impl Exports {
    fn collect(template: &Template<Validated>, assignment: &Assignment) -> Self {
        let mut exports = Self::default();
        for reference in all_references(template) {
            let Location::Nested(target) = assignment.location(&reference.target_id) else {
                continue;
            };
            if assignment.location(&reference.source_id) == Location::Nested(target) {
                continue;
            }
            exports.add(target, &reference);
        }
        exports
    }

    fn add(&mut self, partition: &str, reference: &Reference) {
        let key = (reference.target_id.clone(), reference.attribute.clone());
        if self.names.contains_key(&key) {
            return;
        }
        let outputs = self.outputs.entry(partition.to_string()).or_default();
        let name = unique_name(&format!("{}Output", link_name(reference)), |n| {
            !outputs.contains_key(n)
        });
        outputs.insert(name.clone(), reference.target_expression());
        self.names.insert(key, name);
    }

    fn output_name(&self, reference: &Reference) -> Option<&str> {
        self.names
            .get(&(reference.target_id.clone(), reference.attribute.clone()))
            .map(String::as_str)
    }
}

/// References from every resource and from the root `Outputs`.
fn all_references(template: &Template<Validated>) -> Vec<Reference> {
    let mut references: Vec<Reference> = template
        .iter_resources()
        .flat_map(Resource::references)
        .collect();
    for (name, output) in &template.outputs {
        references.extend(find_references(&format!("Outputs.{name}"), output));
    }
    references
}

/// Binds `binding` to a parameter named `base` (or a unique variant).
fn bind(
    parameters: &mut IndexMap<String, StackParameter>,
    base: &str,
    binding: Value,
    param_type: &str,
) -> String {
    let name = unique_name(base, |n| {
        parameters.get(n).map_or(true, |p| p.binding == binding)
    });
    parameters.entry(name.clone()).or_insert(StackParameter {
        binding,
        param_type: param_type.to_string(),
    });
    name
}

fn output_binding(partition: &str, output: &str) -> Value {
    json!({ "Fn::GetAtt": [stack_logical_id(partition), format!("Outputs.{output}")] })
}

// ── Linking ────────────────────────────────────────────────────

/// Rewrites every cross-partition reference of `template` according to
/// `assignment`.
///
/// Fails with [`SplitError::UnresolvedReference`] if any reference names
/// something the template does not define.
pub fn link(
    template: &Template<Validated>,
    assignment: &Assignment,
    options: &LinkOptions,
) -> Result<LinkedTemplate, SplitError> {
    for reference in all_references(template) {
        let target = &reference.target_id;
        if !template.resources.contains_key(target) && !template.is_parameter(target) {
            return Err(SplitError::UnresolvedReference {
                source_id: reference.source_id,
                target: target.clone(),
            });
        }
    }

    let mut exports = Exports::collect(template, assignment);
    let mut nested: IndexMap<String, NestedDocument> = assignment
        .partitions()
        .map(|p| (p.name.clone(), NestedDocument::new(p, template)))
        .collect();

    let mut cross_references = Vec::new();
    let mut dependencies: IndexMap<String, IndexSet<String>> = std::iter::once(ROOT.to_string())
        .chain(nested.keys().cloned())
        .map(|name| (name, IndexSet::new()))
        .collect();

    for doc in nested.values_mut() {
        let NestedDocument {
            name,
            parameters,
            resources,
            outputs,
            root_dependencies,
            ..
        } = doc;
        let name = name.as_str();
        let depends = dependencies.entry(name.to_string()).or_default();

        for resource in resources.values_mut() {
            let mut rewrite = |reference: &Reference| -> Option<Rewrite> {
                let target = reference.target_id.as_str();
                let mut record = CrossReference::new(reference, name, ROOT);

                let (base, binding, param_type) = if !template.resources.contains_key(target) {
                    let param_type = template
                        .parameters
                        .get(target)
                        .and_then(|p| p.get("Type"))
                        .and_then(Value::as_str)
                        .unwrap_or("String");
                    (target.to_string(), json!({ "Ref": target }), param_type)
                } else {
                    match assignment.location(target) {
                        Location::Nested(q) if q == name => return None,
                        Location::Nested(q) => {
                            let output = exports.output_name(reference)?.to_string();
                            record.target_stack = q.to_string();
                            let binding = output_binding(q, &output);
                            record.output = Some(output);
                            (format!("{}Parameter", link_name(reference)), binding, "String")
                        }
                        Location::Root => (
                            format!("{}Parameter", link_name(reference)),
                            reference.target_expression(),
                            "String",
                        ),
                    }
                };

                let parameter = bind(parameters, &base, binding, param_type);
                depends.insert(record.target_stack.clone());
                record.parameter = Some(parameter.clone());
                cross_references.push(record);
                Some(Rewrite {
                    expression: json!({ "Ref": parameter }),
                    name: parameter,
                })
            };
            resource.rewrite_references(&mut rewrite);

            resource.depends_on.retain(|dep| match assignment.location(dep) {
                Location::Nested(q) if q == name => true,
                Location::Nested(q) => {
                    depends.insert(q.to_string());
                    false
                }
                Location::Root => {
                    root_dependencies.insert(dep.clone());
                    depends.insert(ROOT.to_string());
                    false
                }
            });
        }

        if let Some(exported) = exports.outputs.shift_remove(name) {
            *outputs = exported;
        }
    }

    // Root resources and outputs read nested values through stack outputs.
    let mut root = template.clone();
    let root_depends = dependencies.entry(ROOT.to_string()).or_default();
    let mut root_rewrite = |reference: &Reference| -> Option<Rewrite> {
        if !template.resources.contains_key(&reference.target_id) {
            return None;
        }
        let Location::Nested(q) = assignment.location(&reference.target_id) else {
            return None;
        };
        let output = exports.output_name(reference)?.to_string();
        let mut record = CrossReference::new(reference, ROOT, q);
        record.output = Some(output.clone());
        cross_references.push(record);
        root_depends.insert(q.to_string());
        Some(Rewrite {
            name: link_name(reference),
            expression: output_binding(q, &output),
        })
    };

    let mut root_resources = IndexMap::new();
    for id in assignment.root_resources() {
        let Some(original) = template.resource(id) else {
            continue;
        };
        let mut resource = original.clone();
        resource.rewrite_references(&mut root_rewrite);
        let depends_on: IndexSet<String> = resource
            .depends_on
            .iter()
            .map(|dep| match assignment.location(dep) {
                Location::Nested(q) => stack_logical_id(q),
                Location::Root => dep.clone(),
            })
            .collect();
        resource.depends_on = depends_on.into_iter().collect();
        root_resources.insert(id.clone(), resource);
    }
    for (name, output) in root.outputs.iter_mut() {
        template_ir::rewrite_references(&format!("Outputs.{name}"), output, &mut root_rewrite);
    }

    for doc in nested.values() {
        if root_resources.contains_key(&doc.stack_id) {
            return Err(SplitError::ConfigError(format!(
                "nested stack id '{}' collides with an existing resource",
                doc.stack_id
            )));
        }
        root_resources.insert(doc.stack_id.clone(), doc.stack_resource(options));
    }
    root.resources = root_resources;

    let linked = LinkedTemplate {
        root,
        nested,
        cross_references,
        dependencies,
    };
    tracing::info!("{}", linked.summary());
    Ok(linked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stack_planner::{PartitionKind, PartitionRegistry};

    fn template(json: Value) -> Template<Validated> {
        Template::from_value(json).unwrap().validate().unwrap()
    }

    fn assign(t: &Template<Validated>, placements: &[(&str, &str)]) -> Assignment {
        let mut r = PartitionRegistry::new();
        for (id, partition) in placements {
            r.assign(id, partition, PartitionKind::Custom, "test", false).unwrap();
        }
        r.freeze(t)
    }

    fn sample() -> Template<Validated> {
        template(json!({
            "Parameters": { "Stage": { "Type": "String" } },
            "Resources": {
                "Table": { "Type": "AWS::DynamoDB::Table" },
                "Topic": { "Type": "AWS::SNS::Topic" },
                "Fn": {
                    "Type": "AWS::Lambda::Function",
                    "DependsOn": ["Topic"],
                    "Properties": {
                        "Environment": { "Variables": {
                            "TABLE": { "Ref": "Table" },
                            "TOPIC": { "Fn::Sub": "${Topic}-${Stage}" },
                            "REGION": { "Ref": "AWS::Region" }
                        } }
                    }
                },
                "Alarm": {
                    "Type": "AWS::CloudWatch::Alarm",
                    "Properties": { "Dimensions": [{ "Value": { "Ref": "Fn" } }] }
                }
            },
            "Outputs": { "FnArn": { "Value": { "Fn::GetAtt": ["Fn", "Arn"] } } }
        }))
    }

    #[test]
    fn test_nested_source_root_target() {
        let t = sample();
        let a = assign(&t, &[("Fn", "Api")]);
        let linked = link(&t, &a, &LinkOptions::default()).unwrap();
        let api = &linked.nested["Api"];

        let fn_props = &api.resources["Fn"].properties;
        assert_eq!(fn_props["Environment"]["Variables"]["TABLE"], json!({ "Ref": "TableParameter" }));
        assert_eq!(
            fn_props["Environment"]["Variables"]["TOPIC"],
            json!({ "Fn::Sub": "${TopicParameter}-${Stage}" })
        );
        assert_eq!(fn_props["Environment"]["Variables"]["REGION"], json!({ "Ref": "AWS::Region" }));
        assert_eq!(api.parameters["TableParameter"].binding, json!({ "Ref": "Table" }));
        assert_eq!(api.parameters["Stage"].binding, json!({ "Ref": "Stage" }));

        // DependsOn on a root resource moves to the stack resource.
        assert!(api.resources["Fn"].depends_on.is_empty());
        assert_eq!(linked.root.resources["ApiNestedStack"].depends_on, vec!["Topic"]);
        assert!(linked.dependencies["Api"].contains(ROOT));
    }

    #[test]
    fn test_root_source_nested_target() {
        let t = sample();
        let a = assign(&t, &[("Fn", "Api")]);
        let linked = link(&t, &a, &LinkOptions::default()).unwrap();

        assert_eq!(
            linked.nested["Api"].outputs["FnOutput"],
            json!({ "Ref": "Fn" })
        );
        assert_eq!(
            linked.nested["Api"].outputs["FnArnOutput"],
            json!({ "Fn::GetAtt": ["Fn", "Arn"] })
        );
        assert_eq!(
            linked.root.resources["Alarm"].properties["Dimensions"][0]["Value"],
            json!({ "Fn::GetAtt": ["ApiNestedStack", "Outputs.FnOutput"] })
        );
        assert_eq!(
            linked.root.outputs["FnArn"]["Value"],
            json!({ "Fn::GetAtt": ["ApiNestedStack", "Outputs.FnArnOutput"] })
        );
    }

    #[test]
    fn test_nested_to_nested() {
        let t = sample();
        let a = assign(&t, &[("Fn", "Api"), ("Table", "Data")]);
        let linked = link(&t, &a, &LinkOptions::default()).unwrap();

        assert_eq!(linked.nested["Data"].outputs["TableOutput"], json!({ "Ref": "Table" }));
        assert_eq!(
            linked.nested["Api"].parameters["TableParameter"].binding,
            json!({ "Fn::GetAtt": ["DataNestedStack", "Outputs.TableOutput"] })
        );
        let stack = &linked.root.resources["ApiNestedStack"];
        assert_eq!(stack.resource_type, STACK_TYPE);
        assert_eq!(
            stack.properties["Parameters"]["TableParameter"],
            json!({ "Fn::GetAtt": ["DataNestedStack", "Outputs.TableOutput"] })
        );
        assert!(linked.dependencies["Api"].contains("Data"));

        let record = linked
            .cross_references
            .iter()
            .find(|c| c.target_id == "Table")
            .unwrap();
        assert_eq!(record.source_stack, "Api");
        assert_eq!(record.target_stack, "Data");
        assert_eq!(record.output.as_deref(), Some("TableOutput"));
        assert_eq!(record.parameter.as_deref(), Some("TableParameter"));
    }

    #[test]
    fn test_same_partition_untouched() {
        let t = sample();
        let a = assign(&t, &[("Fn", "All"), ("Table", "All"), ("Topic", "All"), ("Alarm", "All")]);
        let linked = link(&t, &a, &LinkOptions::default()).unwrap();
        let all = &linked.nested["All"];
        assert_eq!(
            all.resources["Fn"].properties["Environment"]["Variables"]["TABLE"],
            json!({ "Ref": "Table" })
        );
        assert_eq!(all.resources["Fn"].depends_on, vec!["Topic"]);
        // Only the template parameter crosses.
        assert_eq!(all.parameters.len(), 1);
        assert!(all.parameters.contains_key("Stage"));
    }

    #[test]
    fn test_metadata_references_rewritten() {
        let t = template(json!({
            "Resources": {
                "Table": { "Type": "AWS::DynamoDB::Table" },
                "Fn": {
                    "Type": "AWS::Lambda::Function",
                    "Metadata": { "Source": { "Fn::GetAtt": ["Table", "Arn"] } }
                }
            }
        }));
        let a = assign(&t, &[("Fn", "Api")]);
        let linked = link(&t, &a, &LinkOptions::default()).unwrap();
        let api = &linked.nested["Api"];
        assert_eq!(
            api.resources["Fn"].attributes["Metadata"]["Source"],
            json!({ "Ref": "TableArnParameter" })
        );
        assert_eq!(
            api.parameters["TableArnParameter"].binding,
            json!({ "Fn::GetAtt": ["Table", "Arn"] })
        );

        let dangling = template(json!({
            "Resources": {
                "Fn": {
                    "Type": "AWS::Lambda::Function",
                    "UpdatePolicy": { "Alias": { "Ref": "Gone" } }
                }
            }
        }));
        let err = link(&dangling, &assign(&dangling, &[]), &LinkOptions::default()).unwrap_err();
        assert!(matches!(err, SplitError::UnresolvedReference { ref target, .. } if target == "Gone"));
    }

    #[test]
    fn test_unresolved_reference() {
        let t = template(json!({
            "Resources": {
                "Fn": {
                    "Type": "AWS::Lambda::Function",
                    "Properties": { "Role": { "Fn::GetAtt": ["Missing", "Arn"] } }
                }
            }
        }));
        let a = assign(&t, &[]);
        let err = link(&t, &a, &LinkOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            SplitError::UnresolvedReference { ref source_id, ref target } if source_id == "Fn" && target == "Missing"
        ));
    }

    #[test]
    fn test_template_url() {
        let named = LinkOptions {
            artifact_prefix: "/deploys/dev/".into(),
            deployment_bucket: Some("artifacts".into()),
        };
        assert_eq!(
            named.template_url("ApiNestedStack.json"),
            json!("https://s3.amazonaws.com/artifacts/deploys/dev/ApiNestedStack.json")
        );
        let default = LinkOptions::default().template_url("ApiNestedStack.json");
        assert_eq!(default["Fn::Join"][1][1], json!({ "Ref": DEPLOYMENT_BUCKET }));
    }

    #[test]
    fn test_stack_logical_id() {
        assert_eq!(stack_logical_id("Billing-api"), "BillingapiNestedStack");
        assert_eq!(stack_logical_id("Group1"), "Group1NestedStack");
    }

    #[test]
    fn test_nested_document_value() {
        let t = sample();
        let a = assign(&t, &[("Fn", "Api")]);
        let linked = link(&t, &a, &LinkOptions::default()).unwrap();
        let doc = linked.nested["Api"].to_value();
        assert_eq!(doc["AWSTemplateFormatVersion"], "2010-09-09");
        assert_eq!(doc["Parameters"]["Stage"]["Type"], "String");
        assert_eq!(doc["Resources"]["Fn"]["Type"], "AWS::Lambda::Function");
        assert!(doc["Outputs"]["FnOutput"]["Value"].is_object());
        assert_eq!(linked.nested["Api"].file_name(), "ApiNestedStack.json");
    }
}
