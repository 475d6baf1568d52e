//! Proposal rule data model
//!
//! Rules come from an external catalog as loosely typed documents. A [`Rule`]
//! keeps the raw condition tree and event so that one malformed entry can be
//! skipped without rejecting the whole catalog; the rule evaluator compiles
//! them into [`ConditionNode`] trees.

use serde::{Deserialize, Serialize};

use super::server::{lenient_opt_disks, lenient_opt_text, lenient_status};
use super::{Disk, ServerStatus};

/// Event type that requests a server role
pub const SERVER_ADD_EVENT: &str = "server-add";

/// A rule catalog entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,

    #[serde(default)]
    pub name: String,

    /// Disabled (or unflagged) rules are never evaluated
    #[serde(default)]
    pub enabled: bool,

    /// Informational only; rules run in catalog order
    #[serde(default)]
    pub priority: i64,

    /// Raw condition tree
    #[serde(default)]
    pub conditions: Option<serde_json::Value>,

    #[serde(default)]
    pub event: Option<RuleEvent>,
}

impl Rule {
    /// Label used in logs
    pub fn label(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else {
            self.id.as_deref().unwrap_or("<unnamed>")
        }
    }
}

/// Event emitted when a rule's conditions hold
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleEvent {
    #[serde(rename = "type", default)]
    pub event_type: String,

    #[serde(default)]
    pub params: EventParams,
}

/// Parameters of a `server-add` event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventParams {
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub role: Option<String>,

    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<ServerStatus>,

    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub cpu: Option<String>,

    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub ram: Option<String>,

    #[serde(default, alias = "diskList", deserialize_with = "lenient_opt_disks")]
    pub disk_list: Option<Vec<Disk>>,

    /// Advisory instance count; the sizing formula decides the real count
    #[serde(default, deserialize_with = "lenient_opt_text")]
    pub count: Option<String>,
}

/// Combinator of a group node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// Every child must hold
    #[default]
    All,
    /// At least one child must hold
    Any,
}

/// Comparison operators for leaf conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanInclusive,
    LessThan,
    LessThanInclusive,
    /// Fact value is one of the listed values
    In,
    /// Fact value is none of the listed values
    NotIn,
    /// Fact array contains the value
    Contains,
    /// Fact array does not contain the value
    DoesNotContain,
}

impl std::str::FromStr for RuleOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "equal" | "=" | "==" => Ok(RuleOperator::Equal),
            "notEqual" | "!=" => Ok(RuleOperator::NotEqual),
            "greaterThan" | ">" => Ok(RuleOperator::GreaterThan),
            "greaterThanInclusive" | ">=" => Ok(RuleOperator::GreaterThanInclusive),
            "lessThan" | "<" => Ok(RuleOperator::LessThan),
            "lessThanInclusive" | "<=" => Ok(RuleOperator::LessThanInclusive),
            "in" => Ok(RuleOperator::In),
            "notIn" | "not_in" => Ok(RuleOperator::NotIn),
            "contains" => Ok(RuleOperator::Contains),
            "doesNotContain" | "not_contains" => Ok(RuleOperator::DoesNotContain),
            other => Err(format!("unknown operator '{}'", other)),
        }
    }
}

/// A single comparison against a fact
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Fact path (dot separated)
    pub fact: String,
    pub operator: RuleOperator,
    pub value: serde_json::Value,
}

/// Compiled condition tree
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionNode {
    Leaf(Condition),
    Group {
        combinator: Combinator,
        children: Vec<ConditionNode>,
    },
}

impl ConditionNode {
    pub fn leaf(fact: &str, operator: RuleOperator, value: serde_json::Value) -> Self {
        ConditionNode::Leaf(Condition {
            fact: fact.to_string(),
            operator,
            value,
        })
    }

    pub fn all(children: Vec<ConditionNode>) -> Self {
        ConditionNode::Group {
            combinator: Combinator::All,
            children,
        }
    }

    pub fn any(children: Vec<ConditionNode>) -> Self {
        ConditionNode::Group {
            combinator: Combinator::Any,
            children,
        }
    }
}
