//! Rule evaluation service
//!
//! Compiles rule catalog entries into condition trees and evaluates them
//! against a fact record, producing an ordered list of role intents.

use std::cmp::Ordering;

use crate::models::{
    Combinator, Condition, ConditionNode, FactRecord, Intent, Overrides, Rule, RuleOperator,
    SERVER_ADD_EVENT,
};
use crate::utils::RuleError;

/// A rule ready for evaluation
#[derive(Debug, Clone)]
struct CompiledRule {
    name: String,
    conditions: ConditionNode,
    /// `None` for events the engine does not act on
    intent: Option<(String, Overrides)>,
}

/// Evaluates enabled rules against facts
pub struct RuleEvaluator {
    rules: Vec<CompiledRule>,
}

impl RuleEvaluator {
    /// Compile a rule catalog.
    ///
    /// Disabled rules are dropped silently; malformed rules are dropped with a warning.
    pub fn new(rules: &[Rule]) -> Self {
        let rules = rules
            .iter()
            .filter(|rule| rule.enabled)
            .filter_map(|rule| match compile_rule(rule) {
                Ok(compiled) => Some(compiled),
                Err(e) => {
                    tracing::warn!("Skipping rule '{}': {}", rule.label(), e);
                    None
                }
            })
            .collect();

        Self { rules }
    }

    /// Number of rules that will be evaluated
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every rule in catalog order, one intent per matching rule
    pub fn evaluate(&self, facts: &FactRecord) -> Vec<Intent> {
        let facts = facts.to_value();

        self.rules
            .iter()
            .filter_map(|rule| {
                let matched = evaluate_node(&rule.conditions, &facts);
                tracing::debug!("Rule '{}' matched={}", rule.name, matched);
                if !matched {
                    return None;
                }

                let (role, overrides) = rule.intent.as_ref()?;
                Some(Intent {
                    rule: rule.name.clone(),
                    role: role.clone(),
                    overrides: overrides.clone(),
                })
            })
            .collect()
    }
}

fn compile_rule(rule: &Rule) -> Result<CompiledRule, RuleError> {
    let conditions = rule
        .conditions
        .as_ref()
        .filter(|c| !c.is_null())
        .ok_or(RuleError::MissingConditions)?;
    let conditions = compile_conditions(conditions)?;

    let event = rule.event.as_ref().ok_or(RuleError::MissingRole)?;
    let intent = if event.event_type == SERVER_ADD_EVENT {
        let params = &event.params;
        let role = params
            .role
            .as_deref()
            .map(|r| r.trim().to_uppercase())
            .filter(|r| !r.is_empty())
            .ok_or(RuleError::MissingRole)?;
        let overrides = Overrides {
            status: params.status,
            cpu: params.cpu.clone(),
            ram: params.ram.clone(),
            disk_list: params.disk_list.clone().filter(|d| !d.is_empty()),
        };
        Some((role, overrides))
    } else {
        tracing::debug!(
            "Rule '{}' emits unsupported event type '{}'",
            rule.label(),
            event.event_type
        );
        None
    };

    Ok(CompiledRule {
        name: rule.label().to_string(),
        conditions,
        intent,
    })
}

/// Compile a raw condition tree.
///
/// Accepts the engine form (`{"all": [...]}`, `{"any": [...]}`, `{"fact", "operator", "value"}`)
/// and the authoring form (`{"type": "group", "groupType", "children"}`, `{"type": "rule", ...}`).
pub fn compile_conditions(value: &serde_json::Value) -> Result<ConditionNode, RuleError> {
    let Some(obj) = value.as_object() else {
        return Err(RuleError::InvalidNode(value.to_string()));
    };

    if let Some(children) = obj.get("all") {
        return compile_group(Combinator::All, children);
    }
    if let Some(children) = obj.get("any") {
        return compile_group(Combinator::Any, children);
    }

    match obj.get("type").and_then(|t| t.as_str()) {
        Some("group") => {
            let combinator = match obj
                .get("groupType")
                .and_then(|g| g.as_str())
                .map(|g| g.to_lowercase())
                .as_deref()
            {
                Some("all") | Some("and") => Combinator::All,
                Some("any") | Some("or") => Combinator::Any,
                _ => return Err(RuleError::InvalidNode(value.to_string())),
            };
            compile_group(combinator, obj.get("children").unwrap_or(&serde_json::Value::Null))
        }
        Some("rule") | None if obj.contains_key("fact") => compile_leaf(obj),
        _ => Err(RuleError::InvalidNode(value.to_string())),
    }
}

fn compile_group(
    combinator: Combinator,
    children: &serde_json::Value,
) -> Result<ConditionNode, RuleError> {
    let Some(children) = children.as_array() else {
        return Err(RuleError::InvalidNode(children.to_string()));
    };
    if children.is_empty() {
        return Err(RuleError::EmptyGroup);
    }

    let children = children
        .iter()
        .map(compile_conditions)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ConditionNode::Group {
        combinator,
        children,
    })
}

fn compile_leaf(
    obj: &serde_json::Map<String, serde_json::Value>,
) -> Result<ConditionNode, RuleError> {
    let fact = obj
        .get("fact")
        .and_then(|f| f.as_str())
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .ok_or_else(|| RuleError::InvalidNode(format!("{:?}", obj)))?;

    let operator = obj
        .get("operator")
        .and_then(|o| o.as_str())
        .unwrap_or_default();
    let operator: RuleOperator = operator
        .parse()
        .map_err(|_| RuleError::UnknownOperator(operator.to_string()))?;

    Ok(ConditionNode::Leaf(Condition {
        fact: fact.to_string(),
        operator,
        value: obj.get("value").cloned().unwrap_or(serde_json::Value::Null),
    }))
}

/// Evaluate a condition tree against facts
pub fn evaluate_node(node: &ConditionNode, facts: &serde_json::Value) -> bool {
    match node {
        ConditionNode::Leaf(condition) => evaluate_condition(condition, facts),
        ConditionNode::Group {
            combinator: Combinator::All,
            children,
        } => children.iter().all(|child| evaluate_node(child, facts)),
        ConditionNode::Group {
            combinator: Combinator::Any,
            children,
        } => children.iter().any(|child| evaluate_node(child, facts)),
    }
}

fn evaluate_condition(condition: &Condition, facts: &serde_json::Value) -> bool {
    match get_fact_value(facts, &condition.fact) {
        Some(value) => {
            let result = match_value(value, &condition.operator, &condition.value);
            tracing::debug!(
                "Condition: path='{}' operator='{:?}' rule_value={:?} fact_value={:?} matched={}",
                condition.fact,
                condition.operator,
                condition.value,
                value,
                result
            );
            result
        }
        None => {
            tracing::debug!("Condition: path='{}' fact not found, matched=false", condition.fact);
            false
        }
    }
}

/// Get a fact value by path (e.g., "scale.required" -> facts["scale"]["required"])
fn get_fact_value<'a>(facts: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    path.split('.').try_fold(facts, |current, part| current.get(part))
}

/// Match a fact value against a rule value
fn match_value(
    fact_value: &serde_json::Value,
    operator: &RuleOperator,
    rule_value: &serde_json::Value,
) -> bool {
    match operator {
        RuleOperator::Equal => values_equal(fact_value, rule_value),
        RuleOperator::NotEqual => !values_equal(fact_value, rule_value),
        RuleOperator::GreaterThan => {
            compare_values(fact_value, rule_value) == Some(Ordering::Greater)
        }
        RuleOperator::GreaterThanInclusive => matches!(
            compare_values(fact_value, rule_value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        RuleOperator::LessThan => compare_values(fact_value, rule_value) == Some(Ordering::Less),
        RuleOperator::LessThanInclusive => matches!(
            compare_values(fact_value, rule_value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        RuleOperator::In => match rule_value.as_array() {
            Some(arr) => arr.iter().any(|v| values_equal(fact_value, v)),
            None => false,
        },
        RuleOperator::NotIn => match rule_value.as_array() {
            Some(arr) => !arr.iter().any(|v| values_equal(fact_value, v)),
            None => true,
        },
        RuleOperator::Contains => contains(fact_value, rule_value).unwrap_or(false),
        RuleOperator::DoesNotContain => contains(fact_value, rule_value)
            .map(|found| !found)
            .unwrap_or(false),
    }
}

/// Equality with numbers compared by value (so `1` equals `1.0`)
fn values_equal(a: &serde_json::Value, b: &serde_json::Value) -> bool {
    match (a, b) {
        (serde_json::Value::Number(an), serde_json::Value::Number(bn)) => {
            an.as_f64() == bn.as_f64()
        }
        _ => a == b,
    }
}

/// Compare two JSON values for ordering; values of different kinds are not ordered
fn compare_values(a: &serde_json::Value, b: &serde_json::Value) -> Option<Ordering> {
    match (a, b) {
        (serde_json::Value::Number(an), serde_json::Value::Number(bn)) => {
            an.as_f64()?.partial_cmp(&bn.as_f64()?)
        }
        (serde_json::Value::String(as_), serde_json::Value::String(bs)) => Some(as_.cmp(bs)),
        _ => None,
    }
}

/// Membership of a value in an array fact (or substring of a string fact)
fn contains(fact_value: &serde_json::Value, rule_value: &serde_json::Value) -> Option<bool> {
    match fact_value {
        serde_json::Value::Array(items) => Some(items.iter().any(|v| values_equal(v, rule_value))),
        serde_json::Value::String(s) => rule_value.as_str().map(|needle| s.contains(needle)),
        _ => None,
    }
}
