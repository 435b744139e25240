use crate::constants;
use crate::segmentation::operand::{self, OperandMatch};
use crate::value::{Attributes, Value};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// One node of the segmentation DSL. A segments document is a tree of
/// `and`/`or`/`not` combinators over two leaf predicates: `custom_variable`
/// (a single key/operand pair matched against the attribute map) and `user`
/// (a comma-separated allowlist matched against the reserved
/// `_vwo_user_id` attribute).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SegmentNode {
    #[serde(rename = "and")]
    And(Vec<SegmentNode>),
    #[serde(rename = "or")]
    Or(Vec<SegmentNode>),
    #[serde(rename = "not")]
    Not(Box<SegmentNode>),
    #[serde(rename = "custom_variable")]
    CustomVariable(HashMap<String, Value>),
    #[serde(rename = "user")]
    User(String),
}

/// Campaigns and variations carry `"segments": {}` when no segmentation is
/// configured; map that (and null/absent) to `None` instead of failing the
/// enum deserialization.
pub(crate) fn deserialize_segments<'de, D>(deserializer: D) -> Result<Option<SegmentNode>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    match raw {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(ref map) if map.is_empty() => Ok(None),
        other => serde_json::from_value(other)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Evaluates a segments tree against the attribute map.
pub fn evaluate(node: &SegmentNode, attributes: &Attributes) -> bool {
    match node {
        SegmentNode::And(children) => children.iter().all(|child| evaluate(child, attributes)),
        SegmentNode::Or(children) => children.iter().any(|child| evaluate(child, attributes)),
        SegmentNode::Not(child) => !evaluate(child, attributes),
        SegmentNode::CustomVariable(payload) => evaluate_custom_variable(payload, attributes),
        SegmentNode::User(operand) => evaluate_user_list(operand, attributes),
    }
}

/// A `custom_variable` leaf holds exactly one (key, operand) pair. A key
/// absent from the attribute map evaluates false regardless of operand.
fn evaluate_custom_variable(payload: &HashMap<String, Value>, attributes: &Attributes) -> bool {
    let (operand_key, operand) = match payload.iter().next() {
        Some((k, v)) => (k, v),
        None => return false,
    };
    let tag = match attributes.get(operand_key) {
        Some(tag) => tag,
        None => return false,
    };

    let (match_type, operand_value) = operand::pre_process_operand_value(&operand.canonical_string());
    let (operand_value, tag_value) =
        operand::normalize_values(operand_value, tag.canonical_string());

    match match_type {
        OperandMatch::CaseInsensitiveEquals => {
            !tag_value.is_empty() && operand_value.to_lowercase() == tag_value.to_lowercase()
        }
        OperandMatch::Contains => !tag_value.is_empty() && tag_value.contains(&operand_value),
        OperandMatch::EndsWith => !tag_value.is_empty() && tag_value.ends_with(&operand_value),
        OperandMatch::StartsWith => !tag_value.is_empty() && tag_value.starts_with(&operand_value),
        OperandMatch::Regex => operand::matches_regex(&tag_value, &operand_value),
        OperandMatch::Equals => tag_value == operand_value,
    }
}

/// A `user` leaf is a comma-separated list of user IDs; entries are trimmed
/// before comparing against the injected `_vwo_user_id` attribute.
fn evaluate_user_list(operand: &str, attributes: &Attributes) -> bool {
    let user_id = match attributes.get(constants::VWO_USER_ID_KEY) {
        Some(value) => value.canonical_string(),
        None => return false,
    };
    operand.split(',').any(|entry| entry.trim() == user_id)
}
