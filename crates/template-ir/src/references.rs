// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Structural reference scanning and in-place rewriting.
//!
//! References are never stored on a resource; they are derived on demand
//! by walking a JSON value and recognising the four intrinsic idioms:
//!
//! | Idiom | Example | Kind |
//! |---|---|---|
//! | `Ref` | `{"Ref": "Table"}` | [`ReferenceKind::Ref`] |
//! | `Fn::GetAtt` | `{"Fn::GetAtt": ["Table", "Arn"]}` or `"Table.Arn"` | [`ReferenceKind::GetAtt`] |
//! | `Fn::Sub` | `"arn:${Table}/${Bucket.Arn}"` | [`ReferenceKind::Sub`] |
//! | `Fn::Join` | direct `Ref`/`GetAtt` elements of the joined list | [`ReferenceKind::Join`] |
//!
//! Pseudo parameters (`AWS::Region`, `AWS::StackName`, ...) are not
//! references to anything in the template and are skipped.

use serde_json::{Map, Value};
use std::ops::Range;

/// How a reference is expressed in the source value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ReferenceKind {
    Ref,
    GetAtt,
    Sub,
    Join,
}

impl ReferenceKind {
    /// Returns a human-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ref => "Ref",
            Self::GetAtt => "GetAtt",
            Self::Sub => "Sub",
            Self::Join => "Join",
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structural pointer from one resource to another resource (or parameter).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Reference {
    pub kind: ReferenceKind,
    pub source_id: String,
    pub target_id: String,
    pub attribute: Option<String>,
}

impl Reference {
    /// Returns the intrinsic expression that evaluates this reference in
    /// the document where the target lives.
    pub fn target_expression(&self) -> Value {
        match &self.attribute {
            Some(attr) => serde_json::json!({ "Fn::GetAtt": [self.target_id, attr] }),
            None => serde_json::json!({ "Ref": self.target_id }),
        }
    }
}

/// Replacement for a reference found by [`rewrite_references`].
///
/// `expression` replaces `Ref`/`GetAtt` objects. Inside `Fn::Sub` the
/// placeholder is renamed to `${name}`; when `expression` is not simply
/// `{"Ref": name}`, the name is bound to `expression` in the variable map.
#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite {
    pub name: String,
    pub expression: Value,
}

/// Returns `true` for pseudo parameters such as `AWS::Region`.
pub fn is_pseudo_parameter(name: &str) -> bool {
    name.starts_with("AWS::")
}

/// Finds every reference in `value`, attributing it to `source_id`.
pub fn find_references(source_id: &str, value: &Value) -> Vec<Reference> {
    let mut out = Vec::new();
    scan(source_id, value, &mut out);
    out
}

fn scan(source_id: &str, value: &Value, out: &mut Vec<Reference>) {
    match value {
        Value::Array(items) => items.iter().for_each(|v| scan(source_id, v, out)),
        Value::Object(map) => {
            if let Some(reference) = direct_reference(source_id, map, ReferenceKind::Ref) {
                out.push(reference);
                return;
            }
            if let Some(sub) = map.get("Fn::Sub") {
                scan_sub(source_id, sub, out);
                return;
            }
            if let Some(Value::Array(args)) = map.get("Fn::Join") {
                if let [delimiter, Value::Array(elements)] = args.as_slice() {
                    scan(source_id, delimiter, out);
                    for element in elements {
                        match element.as_object().and_then(|m| {
                            direct_reference(source_id, m, ReferenceKind::Join)
                        }) {
                            Some(reference) => out.push(reference),
                            None => scan(source_id, element, out),
                        }
                    }
                    return;
                }
            }
            map.values().for_each(|v| scan(source_id, v, out));
        }
        _ => {}
    }
}

/// Recognises `{"Ref": X}` and `{"Fn::GetAtt": ...}` objects.
///
/// `plain_kind` is the kind reported for a `Ref`; `GetAtt` objects are
/// reported as `GetAtt` unless `plain_kind` is `Join`.
fn direct_reference(
    source_id: &str,
    map: &Map<String, Value>,
    plain_kind: ReferenceKind,
) -> Option<Reference> {
    if map.len() != 1 {
        return None;
    }
    let (target, attribute) = if let Some(Value::String(target)) = map.get("Ref") {
        (target.clone(), None)
    } else {
        let (target, attribute) = parse_get_att(map.get("Fn::GetAtt")?)?;
        (target, Some(attribute))
    };
    if is_pseudo_parameter(&target) {
        return None;
    }
    let kind = match (plain_kind, &attribute) {
        (ReferenceKind::Join, _) => ReferenceKind::Join,
        (_, Some(_)) => ReferenceKind::GetAtt,
        (kind, None) => kind,
    };
    Some(Reference {
        kind,
        source_id: source_id.to_string(),
        target_id: target,
        attribute,
    })
}

fn parse_get_att(value: &Value) -> Option<(String, String)> {
    match value {
        Value::Array(parts) => match parts.as_slice() {
            [Value::String(target), Value::String(attr)] => Some((target.clone(), attr.clone())),
            _ => None,
        },
        Value::String(dotted) => {
            let (target, attr) = dotted.split_once('.')?;
            Some((target.to_string(), attr.to_string()))
        }
        _ => None,
    }
}

fn scan_sub(source_id: &str, sub: &Value, out: &mut Vec<Reference>) {
    let (template, vars) = match sub {
        Value::String(s) => (s.as_str(), None),
        Value::Array(args) => match args.as_slice() {
            [Value::String(s)] => (s.as_str(), None),
            [Value::String(s), Value::Object(vars)] => (s.as_str(), Some(vars)),
            _ => return,
        },
        _ => return,
    };

    for (_, name) in placeholders(template) {
        let (target, attribute) = match name.split_once('.') {
            Some((t, a)) => (t, Some(a.to_string())),
            None => (name, None),
        };
        if is_pseudo_parameter(target) || vars.is_some_and(|v| v.contains_key(name)) {
            continue;
        }
        out.push(Reference {
            kind: ReferenceKind::Sub,
            source_id: source_id.to_string(),
            target_id: target.to_string(),
            attribute,
        });
    }

    if let Some(vars) = vars {
        vars.values().for_each(|v| scan(source_id, v, out));
    }
}

/// Returns the byte ranges (including `${` and `}`) and names of all
/// `${...}` placeholders, skipping `${!Literal}` escapes.
fn placeholders(template: &str) -> Vec<(Range<usize>, &str)> {
    let mut found = Vec::new();
    let mut cursor = 0;
    while let Some(offset) = template[cursor..].find("${") {
        let start = cursor + offset;
        let Some(len) = template[start + 2..].find('}') else {
            break;
        };
        let end = start + 2 + len + 1;
        let name = &template[start + 2..end - 1];
        if !name.starts_with('!') && !name.is_empty() {
            found.push((start..end, name.trim()));
        }
        cursor = end;
    }
    found
}

/// Walks `value` and replaces references for which `rewrite` returns a
/// [`Rewrite`]. References for which it returns `None` are left untouched.
pub fn rewrite_references<F>(source_id: &str, value: &mut Value, rewrite: &mut F)
where
    F: FnMut(&Reference) -> Option<Rewrite>,
{
    match value {
        Value::Array(items) => items
            .iter_mut()
            .for_each(|v| rewrite_references(source_id, v, rewrite)),
        Value::Object(map) => {
            if let Some(reference) = direct_reference(source_id, map, ReferenceKind::Ref) {
                if let Some(r) = rewrite(&reference) {
                    *value = r.expression;
                }
                return;
            }
            if map.contains_key("Fn::Sub") {
                if let Some(sub) = map.get_mut("Fn::Sub") {
                    rewrite_sub(source_id, sub, rewrite);
                }
                return;
            }
            if let Some(Value::Array(args)) = map.get_mut("Fn::Join") {
                if let [delimiter, Value::Array(elements)] = args.as_mut_slice() {
                    rewrite_references(source_id, delimiter, rewrite);
                    for element in elements.iter_mut() {
                        let reference = element.as_object().and_then(|m| {
                            direct_reference(source_id, m, ReferenceKind::Join)
                        });
                        match reference {
                            Some(reference) => {
                                if let Some(r) = rewrite(&reference) {
                                    *element = r.expression;
                                }
                            }
                            None => rewrite_references(source_id, element, rewrite),
                        }
                    }
                    return;
                }
            }
            map.values_mut()
                .for_each(|v| rewrite_references(source_id, v, rewrite));
        }
        _ => {}
    }
}

fn rewrite_sub<F>(source_id: &str, sub: &mut Value, rewrite: &mut F)
where
    F: FnMut(&Reference) -> Option<Rewrite>,
{
    let (template, mut vars) = match sub {
        Value::String(s) => (s.clone(), Map::new()),
        Value::Array(args) => match args.as_slice() {
            [Value::String(s)] => (s.clone(), Map::new()),
            [Value::String(s), Value::Object(vars)] => (s.clone(), vars.clone()),
            _ => return,
        },
        _ => return,
    };

    for v in vars.values_mut() {
        rewrite_references(source_id, v, rewrite);
    }

    let mut rendered = String::with_capacity(template.len());
    let mut last = 0;
    for (range, name) in placeholders(&template) {
        if vars.contains_key(name) {
            continue;
        }
        let (target, attribute) = match name.split_once('.') {
            Some((t, a)) => (t, Some(a.to_string())),
            None => (name, None),
        };
        if is_pseudo_parameter(target) {
            continue;
        }
        let reference = Reference {
            kind: ReferenceKind::Sub,
            source_id: source_id.to_string(),
            target_id: target.to_string(),
            attribute,
        };
        let Some(r) = rewrite(&reference) else {
            continue;
        };
        rendered.push_str(&template[last..range.start]);
        rendered.push_str(&format!("${{{}}}", r.name));
        last = range.end;
        if r.expression != serde_json::json!({ "Ref": r.name }) {
            vars.insert(r.name, r.expression);
        }
    }
    rendered.push_str(&template[last..]);

    *sub = if vars.is_empty() {
        Value::String(rendered)
    } else {
        Value::Array(vec![Value::String(rendered), Value::Object(vars)])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn targets(value: &Value) -> Vec<(ReferenceKind, String, Option<String>)> {
        find_references("Src", value)
            .into_iter()
            .map(|r| (r.kind, r.target_id, r.attribute))
            .collect()
    }

    #[test]
    fn test_find_ref_and_get_att() {
        let value = json!({
            "Role": { "Fn::GetAtt": ["Role", "Arn"] },
            "Env": { "Variables": { "TABLE": { "Ref": "Table" } } },
            "Dotted": { "Fn::GetAtt": "Queue.Arn" }
        });
        assert_eq!(
            targets(&value),
            vec![
                (ReferenceKind::GetAtt, "Role".into(), Some("Arn".into())),
                (ReferenceKind::Ref, "Table".into(), None),
                (ReferenceKind::GetAtt, "Queue".into(), Some("Arn".into())),
            ]
        );
    }

    #[test]
    fn test_pseudo_parameters_skipped() {
        let value = json!([{ "Ref": "AWS::Region" }, { "Fn::Sub": "${AWS::AccountId}-${Bucket}" }]);
        assert_eq!(targets(&value), vec![(ReferenceKind::Sub, "Bucket".into(), None)]);
    }

    #[test]
    fn test_sub_forms() {
        let value = json!({
            "A": { "Fn::Sub": "arn:${Table.Arn}/${!Literal}" },
            "B": { "Fn::Sub": ["${Local}-${Topic}", { "Local": { "Ref": "Queue" } }] }
        });
        assert_eq!(
            targets(&value),
            vec![
                (ReferenceKind::Sub, "Table".into(), Some("Arn".into())),
                (ReferenceKind::Sub, "Topic".into(), None),
                (ReferenceKind::Ref, "Queue".into(), None),
            ]
        );
    }

    #[test]
    fn test_join_elements() {
        let value = json!({ "Fn::Join": ["", [
            "arn:",
            { "Ref": "Bucket" },
            { "Fn::GetAtt": ["Table", "StreamArn"] },
            { "Fn::Select": [0, [{ "Ref": "Nested" }]] }
        ]]});
        assert_eq!(
            targets(&value),
            vec![
                (ReferenceKind::Join, "Bucket".into(), None),
                (ReferenceKind::Join, "Table".into(), Some("StreamArn".into())),
                (ReferenceKind::Ref, "Nested".into(), None),
            ]
        );
    }

    #[test]
    fn test_rewrite_ref_and_join() {
        let mut value = json!({
            "A": { "Ref": "Table" },
            "B": { "Fn::Join": [":", [{ "Ref": "Table" }, { "Ref": "Other" }]] }
        });
        rewrite_references("Src", &mut value, &mut |r: &Reference| {
            (r.target_id == "Table").then(|| Rewrite {
                name: "TableParameter".into(),
                expression: json!({ "Ref": "TableParameter" }),
            })
        });
        assert_eq!(
            value,
            json!({
                "A": { "Ref": "TableParameter" },
                "B": { "Fn::Join": [":", [{ "Ref": "TableParameter" }, { "Ref": "Other" }]] }
            })
        );
    }

    #[test]
    fn test_rewrite_sub_to_parameter() {
        let mut value = json!({ "Fn::Sub": "${Table.Arn}/index/${Other}" });
        rewrite_references("Src", &mut value, &mut |r: &Reference| {
            (r.target_id == "Table").then(|| Rewrite {
                name: "TableArnParameter".into(),
                expression: json!({ "Ref": "TableArnParameter" }),
            })
        });
        assert_eq!(value, json!({ "Fn::Sub": "${TableArnParameter}/index/${Other}" }));
    }

    #[test]
    fn test_rewrite_sub_binds_expression() {
        let mut value = json!({ "Fn::Sub": "q=${Queue}" });
        rewrite_references("Src", &mut value, &mut |_: &Reference| {
            Some(Rewrite {
                name: "QueueOutput".into(),
                expression: json!({ "Fn::GetAtt": ["QueuesNestedStack", "Outputs.QueueOutput"] }),
            })
        });
        assert_eq!(
            value,
            json!({ "Fn::Sub": ["q=${QueueOutput}", {
                "QueueOutput": { "Fn::GetAtt": ["QueuesNestedStack", "Outputs.QueueOutput"] }
            }]})
        );
    }

    #[test]
    fn test_placeholders_unterminated() {
        assert_eq!(placeholders("a ${B} ${C"), vec![(2..6, "B")]);
    }

    #[test]
    fn test_target_expression() {
        let r = Reference {
            kind: ReferenceKind::Sub,
            source_id: "S".into(),
            target_id: "T".into(),
            attribute: Some("Arn".into()),
        };
        assert_eq!(r.target_expression(), json!({ "Fn::GetAtt": ["T", "Arn"] }));
    }
}
