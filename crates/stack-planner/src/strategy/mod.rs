// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`MigrationStrategy`] trait and strategy implementations.
//!
//! Strategies are consulted in a fixed [`StrategyPriority`] order; more
//! specific, manual rules always win over generic fallbacks.

pub mod custom;
pub mod per_function;
pub mod per_group_function;
pub mod per_type;
pub mod stack_name;

use crate::registry::PartitionKind;
use crate::{HttpEvent, Naming};
use indexmap::{IndexMap, IndexSet};
use template_ir::Resource;

/// Priority slot of a strategy. Lower slots are consulted first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StrategyPriority {
    Custom,
    StackName,
    PerFunction,
    PerType,
    PerGroupFunction,
}

/// A strategy's claim on a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// Raw destination name; the engine sanitises it.
    pub destination: String,
    /// Kind recorded if this claim creates the partition.
    pub kind: PartitionKind,
    /// Diagnostic reason.
    pub reason: String,
    /// Move the resource even if an earlier phase already placed it.
    pub force: bool,
    /// Spill into `Name2`, `Name3`, ... when `Name` is full.
    pub allow_suffix: bool,
}

impl Migration {
    pub fn new(destination: impl Into<String>, kind: PartitionKind, reason: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            kind,
            reason: reason.into(),
            force: false,
            allow_suffix: false,
        }
    }

    pub fn forced(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_suffix(mut self) -> Self {
        self.allow_suffix = true;
        self
    }
}

/// A strategy's verdict on one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Move the resource into a partition.
    Claim(Migration),
    /// Keep the resource in root; later strategies are not consulted.
    PinRoot,
    /// Let the next strategy (or root) decide.
    Decline,
}

impl Classification {
    /// The claimed migration, if this is a claim.
    pub fn migration(self) -> Option<Migration> {
        match self {
            Self::Claim(m) => Some(m),
            Self::PinRoot | Self::Decline => None,
        }
    }
}

/// Trait for classification strategies.
///
/// Strategies are purely algorithmic: everything they need from the
/// service is captured at construction.
pub trait MigrationStrategy: Send {
    /// Human-readable name of this strategy.
    fn name(&self) -> &str;

    /// Fixed slot in the evaluation order.
    fn priority(&self) -> StrategyPriority;

    /// Whether this strategy participates at all.
    fn is_active(&self) -> bool;

    /// Claims `resource` for a partition, pins it to root, or declines.
    fn classify(&mut self, resource: &Resource) -> Classification;
}

// ── Always-root resources ──────────────────────────────────────────

/// Resource types that never leave the root document.
const ALWAYS_ROOT_TYPES: &[&str] = &["AWS::IAM::Role", "AWS::ApiGateway::RestApi"];

/// Logical ids that never leave the root document.
const ALWAYS_ROOT_IDS: &[&str] = &[
    "ServerlessDeploymentBucket",
    "ServerlessDeploymentBucketPolicy",
    "ApiGatewayRestApi",
    "IamRoleLambdaExecution",
    "IamRoleCustomResourcesLambdaExecution",
];

/// Returns `true` for identity/access roles, the deployment artifact
/// bucket and its policy, and the API entry point.
pub fn is_always_root(resource: &Resource) -> bool {
    ALWAYS_ROOT_TYPES.contains(&resource.resource_type.as_str())
        || ALWAYS_ROOT_IDS.contains(&resource.logical_id.as_str())
}

/// Returns `true` for gateway method and path-segment resources.
pub(crate) fn is_gateway_route(resource: &Resource) -> bool {
    resource.is_type("ApiGateway", "Method") || resource.is_type("ApiGateway", "Resource")
}

// ── Function-name prefix index ─────────────────────────────────────

/// A function known by its normalised resource-id prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FunctionEntry {
    pub name: String,
    pub normalized: String,
}

/// Normalised function names, longest first.
///
/// Matching longest first means `Func10LambdaFunction` is attributed to
/// `Func10` when both `Func1` and `Func10` exist.
#[derive(Debug, Clone, Default)]
pub(crate) struct FunctionIndex {
    entries: Vec<FunctionEntry>,
}

impl FunctionIndex {
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>, naming: Option<&dyn Naming>) -> Self {
        let Some(naming) = naming else {
            return Self::default();
        };
        let mut entries: Vec<FunctionEntry> = names
            .into_iter()
            .map(|name| FunctionEntry {
                name: name.to_string(),
                normalized: naming.normalized_function_name(name),
            })
            .collect();
        entries.sort_by(|a, b| {
            b.normalized
                .len()
                .cmp(&a.normalized.len())
                .then_with(|| a.normalized.cmp(&b.normalized))
        });
        Self { entries }
    }

    /// Finds the function whose normalised name prefixes `logical_id`.
    ///
    /// The character following the prefix must not be a lowercase letter,
    /// so `User` does not claim `UsersLambdaFunction`.
    pub fn match_prefix(&self, logical_id: &str) -> Option<&FunctionEntry> {
        self.entries.iter().find(|e| {
            logical_id
                .strip_prefix(e.normalized.as_str())
                .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_lowercase()))
        })
    }

    pub fn by_name(&self, name: &str) -> Option<&FunctionEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Gateway route index ────────────────────────────────────────────

/// Gateway logical ids correlated with the functions that own them.
///
/// Method ids map to exactly one function; path-segment ids (and the
/// per-path CORS `OPTIONS` method) map to every function whose routes
/// traverse them.
#[derive(Debug, Clone, Default)]
pub(crate) struct GatewayIndex {
    methods: IndexMap<String, String>,
    shared: IndexMap<String, IndexSet<String>>,
}

impl GatewayIndex {
    pub fn new(events: Option<&[HttpEvent]>, naming: Option<&dyn Naming>) -> Self {
        let (Some(events), Some(naming)) = (events, naming) else {
            return Self::default();
        };
        let mut index = Self::default();

        for event in events {
            let resource_name = naming.api_resource_name(&event.path);
            index.methods.insert(
                naming.method_logical_id(&resource_name, &event.method),
                event.function_name.clone(),
            );
            index
                .shared
                .entry(naming.method_logical_id(&resource_name, "OPTIONS"))
                .or_default()
                .insert(event.function_name.clone());

            let mut prefix = String::new();
            for segment in event.path.split('/').filter(|s| !s.is_empty()) {
                if !prefix.is_empty() {
                    prefix.push('/');
                }
                prefix.push_str(segment);
                index
                    .shared
                    .entry(naming.resource_logical_id(&prefix))
                    .or_default()
                    .insert(event.function_name.clone());
            }
        }
        index
    }

    /// Resolves every gateway id to a single owning function, given a
    /// grouping of functions. Ids whose functions fall into more than one
    /// group are reported as shared; they belong in root.
    pub fn resolve<G, F>(&self, group_of: F) -> GatewayRoutes
    where
        G: Eq + std::hash::Hash + std::fmt::Debug,
        F: Fn(&str) -> Option<G>,
    {
        let mut routes = GatewayRoutes {
            owners: self
                .methods
                .iter()
                .filter(|(id, _)| !self.shared.contains_key(*id))
                .map(|(id, f)| (id.clone(), f.clone()))
                .collect(),
            shared: IndexSet::new(),
        };

        for (id, functions) in &self.shared {
            let groups: IndexSet<G> = functions.iter().filter_map(|f| group_of(f.as_str())).collect();
            if groups.len() == 1 {
                if let Some(first) = functions.first() {
                    routes.owners.insert(id.clone(), first.clone());
                }
            } else {
                tracing::warn!("gateway resource '{id}' is shared by {groups:?}; leaving it in root");
                routes.shared.insert(id.clone());
            }
        }
        routes
    }
}

/// Gateway ids after grouping.
#[derive(Debug, Clone, Default)]
pub(crate) struct GatewayRoutes {
    owners: IndexMap<String, String>,
    shared: IndexSet<String>,
}

impl GatewayRoutes {
    /// The single function owning `logical_id`.
    pub fn owner(&self, logical_id: &str) -> Option<&str> {
        self.owners.get(logical_id).map(String::as_str)
    }

    /// Whether `logical_id` is traversed by more than one group.
    pub fn is_shared(&self, logical_id: &str) -> bool {
        self.shared.contains(logical_id)
    }

    /// Number of ids with a single owner.
    pub fn len(&self) -> usize {
        self.owners.len()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::IdentityNaming;
    use super::*;
    use crate::AwsNaming;

    #[test]
    fn test_always_root() {
        assert!(is_always_root(&Resource::new("AnyRole", "AWS::IAM::Role")));
        assert!(is_always_root(&Resource::new("ServerlessDeploymentBucket", "AWS::S3::Bucket")));
        assert!(is_always_root(&Resource::new("ApiGatewayRestApi", "AWS::ApiGateway::RestApi")));
        assert!(!is_always_root(&Resource::new("UploadsBucket", "AWS::S3::Bucket")));
    }

    #[test]
    fn test_function_index_longest_first() {
        let idx = FunctionIndex::new(["func1", "func10"], Some(&IdentityNaming));
        assert_eq!(idx.match_prefix("func10LambdaFunction").unwrap().name, "func10");
        assert_eq!(idx.match_prefix("func1LambdaFunction").unwrap().name, "func1");
        assert!(idx.match_prefix("otherLambdaFunction").is_none());
    }

    #[test]
    fn test_function_index_falls_back_to_shorter() {
        let idx = FunctionIndex::new(["func1"], Some(&IdentityNaming));
        assert_eq!(idx.match_prefix("func10LambdaFunction").unwrap().name, "func1");
    }

    #[test]
    fn test_function_index_word_boundary() {
        let idx = FunctionIndex::new(["a"], Some(&AwsNaming));
        assert!(idx.match_prefix("ALambdaFunction").is_some());
        assert!(idx.match_prefix("ApiGatewayDeployment123").is_none());
    }

    #[test]
    fn test_function_index_without_naming() {
        let idx = FunctionIndex::new(["a"], None);
        assert!(idx.is_empty());
        assert!(idx.match_prefix("aLambdaFunction").is_none());
    }

    #[test]
    fn test_gateway_index_resolution() {
        let events = vec![
            HttpEvent { function_name: "f1".into(), path: "unique".into(), method: "GET".into() },
            HttpEvent { function_name: "f2".into(), path: "shared".into(), method: "GET".into() },
            HttpEvent { function_name: "f1".into(), path: "shared".into(), method: "POST".into() },
        ];
        let idx = GatewayIndex::new(Some(&events), Some(&AwsNaming));

        // Group by function: the shared path has two owners.
        let by_function = idx.resolve(|f| Some(f.to_string()));
        assert_eq!(by_function.owner("ApiGatewayResourceUnique"), Some("f1"));
        assert_eq!(by_function.owner("ApiGatewayMethodSharedGet"), Some("f2"));
        assert_eq!(by_function.owner("ApiGatewayMethodSharedPost"), Some("f1"));
        assert!(by_function.owner("ApiGatewayResourceShared").is_none());
        assert!(by_function.is_shared("ApiGatewayResourceShared"));
        assert!(by_function.is_shared("ApiGatewayMethodSharedOptions"));
        assert!(!by_function.is_shared("ApiGatewayResourceUnique"));

        // Same group for both functions: the shared path resolves.
        let one_group = idx.resolve(|_| Some("g"));
        assert_eq!(one_group.owner("ApiGatewayResourceShared"), Some("f2"));
        assert!(!one_group.is_shared("ApiGatewayResourceShared"));
    }

    #[test]
    fn test_gateway_index_nested_paths() {
        let events = vec![HttpEvent {
            function_name: "f".into(),
            path: "users/{id}/orders".into(),
            method: "get".into(),
        }];
        let idx = GatewayIndex::new(Some(&events), Some(&AwsNaming));
        let resolved = idx.resolve(|f| Some(f.to_string()));
        for id in [
            "ApiGatewayResourceUsers",
            "ApiGatewayResourceUsersIdVar",
            "ApiGatewayResourceUsersIdVarOrders",
            "ApiGatewayMethodUsersIdVarOrdersGet",
            "ApiGatewayMethodUsersIdVarOrdersOptions",
        ] {
            assert_eq!(resolved.owner(id), Some("f"), "{id}");
        }
    }

    #[test]
    fn test_gateway_index_absent_events() {
        let idx = GatewayIndex::new(None, Some(&AwsNaming));
        let routes = idx.resolve(|f| Some(f.to_string()));
        assert_eq!(routes.len(), 0);
        assert!(!routes.is_shared("ApiGatewayResourceUsers"));
    }
}
