// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Logical-id naming rules.
//!
//! The planner correlates generated resources with the functions and
//! routes that produced them purely by name, so it must derive ids
//! exactly the way the packaging framework does. [`Naming`] is that
//! contract; [`AwsNaming`] is the framework's own scheme.

/// Derives the logical ids the packaging framework generates.
pub trait Naming: Send + Sync {
    /// Canonical resource-id form of a function name (`"get-user"` → `"GetDashuser"`).
    fn normalized_function_name(&self, function_name: &str) -> String;

    /// Resource-name fragment for an HTTP path (`"users/{id}"` → `"UsersIdVar"`).
    fn api_resource_name(&self, path: &str) -> String;

    /// Logical id of the method resource for a resource-name fragment and verb.
    fn method_logical_id(&self, resource_name: &str, method: &str) -> String;

    /// Logical id of the path-segment resource for a (partial) path.
    fn resource_logical_id(&self, path: &str) -> String;
}

/// The packaging framework's naming scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsNaming;

impl AwsNaming {
    fn normalize_path_part(part: &str) -> String {
        let replaced = part.replace('-', "Dash");
        let unbraced = match (replaced.find('{'), replaced.rfind('}')) {
            (Some(open), Some(close)) if open < close => format!(
                "{}{}Var{}",
                &replaced[..open],
                &replaced[open + 1..close],
                &replaced[close + 1..]
            ),
            _ => replaced,
        };
        let cleaned: String = unbraced.chars().filter(char::is_ascii_alphanumeric).collect();
        upper_first(&cleaned)
    }

    fn normalize_path(path: &str) -> String {
        path.split('/').map(Self::normalize_path_part).collect()
    }
}

impl Naming for AwsNaming {
    fn normalized_function_name(&self, function_name: &str) -> String {
        upper_first(&function_name.replace('-', "Dash").replace('_', "Underscore"))
    }

    fn api_resource_name(&self, path: &str) -> String {
        Self::normalize_path(path.trim_matches('/'))
    }

    fn method_logical_id(&self, resource_name: &str, method: &str) -> String {
        format!(
            "ApiGatewayMethod{resource_name}{}",
            upper_first(&method.to_lowercase())
        )
    }

    fn resource_logical_id(&self, path: &str) -> String {
        format!("ApiGatewayResource{}", Self::normalize_path(path.trim_matches('/')))
    }
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Literal prepended to partition names that do not start with a letter.
const FALLBACK_PREFIX: &str = "Stack";

/// Sanitises a raw destination into a valid partition name.
///
/// Characters outside `[A-Za-z0-9-]` become `-`, runs of `-` collapse,
/// leading and trailing `-` are trimmed, the first letter is capitalised,
/// and [`FALLBACK_PREFIX`] is prepended when the result does not start
/// with a letter.
pub fn sanitize_partition_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }
    let trimmed = upper_first(out.trim_matches('-'));
    if trimmed.starts_with(|c: char| c.is_ascii_alphabetic()) {
        trimmed
    } else {
        format!("{FALLBACK_PREFIX}{trimmed}")
    }
}
