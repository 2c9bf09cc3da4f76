// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! One partition per function.
//!
//! Function-adjacent resources and the gateway methods a function serves
//! alone are moved into a partition named after the normalised function.
//! Overflowing partitions spill into `Name2`, `Name3`, ...

use crate::registry::PartitionKind;
use crate::strategy::{
    is_gateway_route, Classification, FunctionEntry, FunctionIndex, GatewayIndex, GatewayRoutes,
    Migration, MigrationStrategy, StrategyPriority,
};
use crate::{FunctionRegistry, HttpEvent, Naming};
use template_ir::Resource;

/// Places each function's resources in its own partition.
#[derive(Debug, Clone, Default)]
pub struct PerFunction {
    active: bool,
    functions: FunctionIndex,
    gateway: GatewayRoutes,
}

impl PerFunction {
    pub fn new(
        active: bool,
        registry: &dyn FunctionRegistry,
        events: Option<&[HttpEvent]>,
        naming: Option<&dyn Naming>,
    ) -> Self {
        if !active {
            return Self::default();
        }
        Self {
            active,
            functions: FunctionIndex::new(registry.functions().iter().map(|f| f.name.as_str()), naming),
            gateway: GatewayIndex::new(events, naming).resolve(|f| Some(f.to_string())),
        }
    }

    fn owner(&self, resource: &Resource) -> Option<&FunctionEntry> {
        if is_gateway_route(resource) {
            self.functions.by_name(self.gateway.owner(&resource.logical_id)?)
        } else {
            self.functions.match_prefix(&resource.logical_id)
        }
    }
}

impl MigrationStrategy for PerFunction {
    fn name(&self) -> &str {
        "per-function"
    }

    fn priority(&self) -> StrategyPriority {
        StrategyPriority::PerFunction
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn classify(&mut self, resource: &Resource) -> Classification {
        let Some(entry) = self.owner(resource) else {
            return Classification::Decline;
        };
        Classification::Claim(
            Migration::new(
                &entry.normalized,
                PartitionKind::PerFunction,
                format!("Per function: {}", entry.name),
            )
            .with_suffix(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AwsNaming, FunctionDef};

    #[test]
    fn test_function_resources_get_own_partition() {
        let fns = vec![FunctionDef::new("users", "h"), FunctionDef::new("orders", "h")];
        let mut s = PerFunction::new(true, &fns, None, Some(&AwsNaming));
        let m = s
            .classify(&Resource::new("UsersLogGroup", "AWS::Logs::LogGroup"))
            .migration()
            .unwrap();
        assert_eq!(m.destination, "Users");
        assert_eq!(m.reason, "Per function: users");
        assert!(m.allow_suffix);
        assert_eq!(s.classify(&Resource::new("DataTable", "AWS::DynamoDB::Table")), Classification::Decline);
    }

    #[test]
    fn test_gateway_method_follows_function() {
        let fns = vec![
            FunctionDef::new("users", "h").with_http("GET", "accounts"),
            FunctionDef::new("admin", "h").with_http("POST", "accounts"),
        ];
        let events: Vec<HttpEvent> = fns.iter().flat_map(FunctionDef::http_events).collect();
        let mut s = PerFunction::new(true, &fns, Some(&events), Some(&AwsNaming));
        let get = Resource::new("ApiGatewayMethodAccountsGet", "AWS::ApiGateway::Method");
        assert_eq!(s.classify(&get).migration().unwrap().destination, "Users");
        let path = Resource::new("ApiGatewayResourceAccounts", "AWS::ApiGateway::Resource");
        assert_eq!(s.classify(&path), Classification::Decline);
    }

    #[test]
    fn test_inactive() {
        let fns = vec![FunctionDef::new("users", "h")];
        let s = PerFunction::new(false, &fns, None, Some(&AwsNaming));
        assert!(!s.is_active());
    }
}
