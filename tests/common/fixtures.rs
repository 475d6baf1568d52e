//! Catalog fixtures
//!
//! A rule, server-default and brand catalog shaped like the ones the store
//! serves in production.

use serde_json::json;

use tenant_topology::models::{Brand, Rule, ServerDefault};
use tenant_topology::services::StaticCatalog;

/// Rule adding `role` when a boolean fact is true
pub fn flag_rule(name: &str, fact: &str, role: &str) -> Rule {
    serde_json::from_value(json!({
        "name": name,
        "enabled": true,
        "priority": 10,
        "conditions": {
            "all": [{"fact": fact, "operator": "equal", "value": true}]
        },
        "event": {"type": "server-add", "params": {"role": role}}
    }))
    .expect("valid rule fixture")
}

/// The standard rule catalog, one rule per proposable role
pub fn standard_rules() -> Vec<Rule> {
    vec![
        flag_rule("Scale servers", "needsScale", "SCALE"),
        flag_rule("Composite servers", "hasOtherBrand", "CX"),
        flag_rule("Web application", "needsWebapp", "WEBAPP"),
        flag_rule("BI server", "needsBiServer", "BI"),
        flag_rule("Document server", "needsDocServer", "DOC"),
        flag_rule("Reverse proxy", "needsProxy", "PROXY"),
    ]
}

/// Rule written in the authoring (group/rule) form with a numeric comparison
pub fn authored_scale_rule() -> Rule {
    serde_json::from_value(json!({
        "name": "Scale above 30 seats",
        "enabled": true,
        "conditions": {
            "type": "group",
            "groupType": "all",
            "children": [
                {"type": "rule", "fact": "totalLicenses", "operator": "greaterThan", "value": 30}
            ]
        },
        "event": {"type": "server-add", "params": {"role": "scale", "cpu": "8", "ram": "16"}}
    }))
    .expect("valid rule fixture")
}

pub fn standard_defaults() -> Vec<ServerDefault> {
    serde_json::from_value(json!([
        {
            "role": "DB",
            "defaultStatus": "required",
            "defaultCpu": "8",
            "defaultRam": "32",
            "defaultDiskList": [
                {"letter": "C", "size": "150"},
                {"letter": "D", "size": "500"}
            ]
        },
        {
            "role": "SCALE",
            "defaultCpu": "4",
            "defaultRam": "16",
            "defaultDiskList": [{"letter": "C", "size": "120"}]
        },
        {
            "role": "WEBAPP",
            "defaultStatus": "recommended",
            "defaultCpu": "2",
            "defaultRam": "8",
            "defaultDiskList": [{"letter": "C", "size": "80"}]
        }
    ]))
    .expect("valid server default fixtures")
}

pub fn standard_brands() -> Vec<Brand> {
    serde_json::from_value(json!([
        {"_id": "b-kia", "code": "KIA", "description": "Kia", "requiresProxy": true},
        {"_id": "b-peugeot", "code": "PEU", "description": "Peugeot"},
        {"_id": "b-citroen", "code": "CIT", "description": "Citroen"},
        {"_id": "b-nissan", "code": "NIS", "description": "Nissan", "requiresNetworkAppliance": true},
        {"_id": "b-renault", "code": "REN", "description": "Renault"}
    ]))
    .expect("valid brand fixtures")
}

/// In-memory catalog with the standard fixtures
pub fn standard_catalog() -> StaticCatalog {
    StaticCatalog {
        rules: standard_rules(),
        server_defaults: standard_defaults(),
        brands: standard_brands(),
    }
}
