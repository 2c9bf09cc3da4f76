// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Example: Compare split configurations on a synthetic service.
//!
//! Different strategy combinations produce different partitionings of the
//! same template, with different numbers of stacks and cross-stack
//! references.
//!
//! ```bash
//! cargo run -p stack-splitter --example strategy_comparison
//! ```

use serde_json::{json, Map, Value};
use stack_planner::{AwsNaming, FunctionDef, Placements, ServiceDefinition};
use stack_splitter::{SplitConfig, Splitter};
use template_ir::{template::Validated, Template};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("warn").init();

    let (template, service) = build_service(24)?;
    println!("Template: {}\n", template.summary());

    let configs = [
        ("per-type", SplitConfig::default()),
        (
            "per-function",
            SplitConfig {
                per_function: true,
                ..Default::default()
            },
        ),
        (
            "stack-name",
            SplitConfig {
                per_stack_name: true,
                per_type: false,
                ..Default::default()
            },
        ),
        (
            "group-function(4)",
            SplitConfig {
                per_group_function: true,
                per_type: false,
                nested_stack_count: 4,
                ..Default::default()
            },
        ),
    ];

    println!(
        "{:<20} {:>8} {:>8} {:>8} {:>8}",
        "Config", "Stacks", "Root", "Refs", "Levels",
    );
    println!("{}", "-".repeat(56));

    for (label, config) in configs {
        let result = Splitter::new(config, template.clone())
            .classify(&service, Some(&AwsNaming), &Placements::new())
            .and_then(|s| s.link())
            .and_then(|s| {
                let refs = s.linked().cross_references.len();
                let root = s.assignment().root_resources().len();
                s.sequence().map(|out| (out, root, refs))
            });
        match result {
            Ok((output, root, refs)) => println!(
                "{:<20} {:>8} {:>8} {:>8} {:>8}",
                label,
                output.nested.len(),
                root,
                refs,
                output.deployment_order().len(),
            ),
            Err(e) => println!("{label:<20} FAIL: {e}"),
        }
    }

    Ok(())
}

/// `n` functions spread over three stack-name groups, each with a log
/// group, a version and a permission, all reading one shared table.
fn build_service(n: usize) -> Result<(Template<Validated>, ServiceDefinition), Box<dyn std::error::Error>> {
    let groups = ["billing", "reports", "accounts"];
    let mut resources = Map::new();
    resources.insert("IamRoleLambdaExecution".into(), json!({ "Type": "AWS::IAM::Role" }));
    resources.insert("DataTable".into(), json!({ "Type": "AWS::DynamoDB::Table" }));

    let mut functions = Vec::with_capacity(n);
    for i in 0..n {
        let function = format!("worker{i}");
        functions.push(FunctionDef::new(&function, "handler").with_stack_name(groups[i % groups.len()]));

        let id = format!("Worker{i}");
        resources.insert(format!("{id}LogGroup"), json!({ "Type": "AWS::Logs::LogGroup" }));
        resources.insert(
            format!("{id}LambdaFunction"),
            json!({
                "Type": "AWS::Lambda::Function",
                "Properties": {
                    "Role": { "Fn::GetAtt": ["IamRoleLambdaExecution", "Arn"] },
                    "Environment": { "Variables": { "TABLE": { "Ref": "DataTable" } } }
                },
                "DependsOn": [format!("{id}LogGroup")]
            }),
        );
        resources.insert(
            format!("{id}LambdaVersion"),
            json!({
                "Type": "AWS::Lambda::Version",
                "Properties": { "FunctionName": { "Ref": format!("{id}LambdaFunction") } }
            }),
        );
        resources.insert(
            format!("{id}LambdaPermission"),
            json!({
                "Type": "AWS::Lambda::Permission",
                "Properties": { "FunctionName": { "Fn::GetAtt": [format!("{id}LambdaFunction"), "Arn"] } }
            }),
        );
    }

    let template = Template::from_value(json!({ "Resources": Value::Object(resources) }))?.validate()?;
    Ok((template, ServiceDefinition::new(functions)))
}
