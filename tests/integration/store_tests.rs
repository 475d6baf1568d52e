//! Tenant store integration tests
//!
//! Runs the store client and the tenant endpoints against a mock store.

use axum::http::StatusCode;
use serde_json::{json, Value};

use tenant_topology::services::{CatalogProvider, ProposalService};
use tenant_topology::utils::CatalogError;

use crate::common::{MockStore, TestApp};

fn stored_tenant() -> Value {
    json!({
        "_id": "t-1",
        "tenant_name": "Acme Group",
        "companies": [{
            "_id": "c-1",
            "name": "Acme Motors",
            "category": "WORKSHOP",
            "tax_id": "01234567890",
            "licenses": 12,
            "web_licenses": 3,
            "brands": []
        }],
        "infrastructure": {
            "type": "ON_PREMISE",
            "integrations": ["image_gui"],
            "server_list": [
                {"_id": "s-web", "role": "WEBAPP", "status": "required", "cpu": "2", "ram": "8",
                 "disk_list": [{"_id": "d-1", "letter": "C", "size": "80"}]}
            ],
            "server_hint": "WEBAPP",
            "customer_notes": "kept as-is"
        },
        "owner": "sales"
    })
}

#[tokio::test]
async fn test_store_client_reads_tenant() {
    let store = MockStore::start().await;
    store.serve_tenant("t-1", stored_tenant()).await;

    let client = store.client();
    let tenant = client.get_tenant("t-1").await.unwrap().expect("tenant");

    assert_eq!(tenant.id.as_deref(), Some("t-1"));
    assert_eq!(tenant.companies[0].licenses, 12);
    assert_eq!(tenant.servers()[0].id.as_deref(), Some("s-web"));
    assert_eq!(
        tenant.infrastructure.extra.get("customer_notes"),
        Some(&json!("kept as-is"))
    );
    assert_eq!(tenant.extra.get("owner"), Some(&json!("sales")));

    assert!(client.get_tenant("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_store_client_reports_server_errors() {
    let store = MockStore::start().await;
    store.fail_get("/groups/t-1", 500).await;

    let err = store.client().get_tenant("t-1").await.unwrap_err();
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_store_catalogs() {
    let store = MockStore::start().await;
    store
        .serve_get(
            "/rules",
            json!([
                {
                    "_id": "r-1",
                    "name": "Web application",
                    "enabled": true,
                    "conditions": {"all": [{"fact": "needsWebapp", "operator": "equal", "value": true}]},
                    "event": {"type": "server-add", "params": {"role": "WEBAPP"}}
                },
                {"name": "Draft rule", "enabled": false}
            ]),
        )
        .await;
    store
        .serve_get(
            "/serverdefaults",
            json!({"server_defaults": [
                {"role": "WEBAPP", "defaultCpu": 2, "defaultRam": "8",
                 "defaultDiskList": [{"letter": "C", "size": 60}]}
            ]}),
        )
        .await;
    store
        .serve_get("/brandsadm", json!([{"_id": "b-1", "description": "Kia"}]))
        .await;

    let client = store.client();
    assert_eq!(client.rules().await.unwrap().len(), 2);

    let defaults = client.server_defaults().await.unwrap();
    assert_eq!(defaults[0].default_cpu.as_deref(), Some("2"));
    assert_eq!(defaults[0].system_drive_size(), Some("60"));

    let service = ProposalService::load(&client).await.unwrap();
    assert_eq!(service.rule_count(), 1);
    assert_eq!(service.brands().len(), 1);
}

#[tokio::test]
async fn test_store_rule_catalog_failure() {
    let store = MockStore::start().await;
    store.fail_get("/rules", 503).await;

    let result = store.client().rules().await;
    assert!(matches!(
        result,
        Err(CatalogError::Status {
            catalog: "rules",
            status: 503,
            ..
        })
    ));
}

#[tokio::test]
async fn test_degraded_catalogs_still_propose() {
    let store = MockStore::start().await;
    store
        .serve_get(
            "/rules",
            json!([{
                "name": "Web application",
                "enabled": true,
                "conditions": {"all": [{"fact": "needsWebapp", "operator": "equal", "value": true}]},
                "event": {"type": "server-add", "params": {"role": "WEBAPP"}}
            }]),
        )
        .await;
    store.fail_get("/serverdefaults", 500).await;
    store.fail_get("/brandsadm", 500).await;

    let client = store.client();
    let service = ProposalService::load(&client).await.unwrap();
    assert!(service.defaults().is_empty());

    let tenant: tenant_topology::models::TenantDocument =
        serde_json::from_value(stored_tenant()).unwrap();
    let proposal = service.propose(&tenant, tenant.infrastructure.mode);

    let roles: Vec<&str> = proposal.server_list.iter().map(|s| s.role.as_str()).collect();
    assert_eq!(roles, vec!["DB", "WEBAPP"]);
    assert_eq!(proposal.server_list[0].disk_list[0].size, "150");
    assert_eq!(proposal.server_list[1].id.as_deref(), Some("s-web"));
    assert_eq!(proposal.server_list[1].disk_list[0].size, "100GB");
}

#[tokio::test]
async fn test_get_tenant_adds_baseline() {
    let store = MockStore::start().await;
    store.serve_tenant("t-1", stored_tenant()).await;
    let app = TestApp::with_store(&store.config());

    let response = app.get("/api/v1/tenants/t-1").await;
    response.assert_ok();

    let json: Value = response.json();
    let servers = json["infrastructure"]["server_list"].as_array().unwrap();
    assert_eq!(servers.len(), 2);
    assert_eq!(servers[0]["role"], "DB");
    assert_eq!(servers[0]["cpu"], "8");
    assert_eq!(servers[1]["_id"], "s-web");
    assert_eq!(json["infrastructure"]["customer_notes"], "kept as-is");
}

#[tokio::test]
async fn test_get_unknown_tenant() {
    let store = MockStore::start().await;
    let app = TestApp::with_store(&store.config());

    app.get("/api/v1/tenants/nope").await.assert_not_found();
}

#[tokio::test]
async fn test_get_tenant_store_failure() {
    let store = MockStore::start().await;
    store.fail_get("/groups/t-1", 500).await;
    let app = TestApp::with_store(&store.config());

    let response = app.get("/api/v1/tenants/t-1").await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let json: Value = response.json();
    assert_eq!(json["error"], "store_error");
}

#[tokio::test]
async fn test_create_tenant_refreshes_server_hint() {
    let store = MockStore::start().await;
    store.accept_create("t-2").await;
    let app = TestApp::with_store(&store.config());

    let mut document = stored_tenant();
    document["infrastructure"]["server_list"] = json!([
        {"role": "DB", "status": "required", "disk_list": [{"letter": "C", "size": "150"}]},
        {"role": "SCALE-1", "status": "required", "disk_list": [{"letter": "C", "size": "120"}]},
        {"role": "SCALE-2", "status": "recommended", "disk_list": [{"letter": "C", "size": "120"}]},
        {"role": "WEBAPP", "status": "required", "disk_list": [{"letter": "C", "size": "80"}]}
    ]);
    document["infrastructure"]["server_hint"] = json!("stale");

    let response = app.post_json("/api/v1/tenants", document).await;
    response.assert_created();
    let created: Value = response.json();
    assert_eq!(created["_id"], "t-2");

    let sent = store.last_body("POST").await.expect("posted document");
    assert_eq!(sent["infrastructure"]["server_hint"], "DB+SCALE+WEBAPP");
    assert_eq!(sent["infrastructure"]["customer_notes"], "kept as-is");
}

#[tokio::test]
async fn test_create_invalid_tenant_is_not_stored() {
    let store = MockStore::start().await;
    let app = TestApp::with_store(&store.config());

    let mut document = stored_tenant();
    document["companies"][0]["tax_id"] = json!("123");

    let response = app.post_json("/api/v1/tenants", document).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let json: Value = response.json();
    assert_eq!(json["error"], "validation_error");
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("Company #1: tax id must be 11 digits"));

    assert!(store.received().await.is_empty());
}

#[tokio::test]
async fn test_update_tenant() {
    let store = MockStore::start().await;
    store.accept_update("t-1", stored_tenant()).await;
    let app = TestApp::with_store(&store.config());

    let response = app.put_json("/api/v1/tenants/t-1", stored_tenant()).await;
    response.assert_ok();

    let received = store.received().await;
    assert_eq!(received, vec![("PUT".to_string(), "/groups/t-1".to_string())]);

    let sent = store.last_body("PUT").await.expect("updated document");
    assert_eq!(sent["infrastructure"]["server_hint"], "WEBAPP");
}

#[tokio::test]
async fn test_duplicate_tax_id_check() {
    let store = MockStore::start().await;
    store.duplicate_check("01234567890", true).await;
    store.duplicate_check("09876543210", false).await;
    let app = TestApp::with_store(&store.config());

    let taken: Value = app
        .get("/api/v1/companies/check-duplicate/01234567890")
        .await
        .json();
    assert_eq!(taken, json!({ "duplicate": true }));

    let free: Value = app
        .get("/api/v1/companies/check-duplicate/09876543210")
        .await
        .json();
    assert_eq!(free, json!({ "duplicate": false }));
}

fn tenant_with_new_company(tax_id: &str) -> Value {
    let mut document = stored_tenant();
    document["companies"]
        .as_array_mut()
        .expect("companies")
        .push(json!({
            "name": "Beta Cars",
            "category": "DEALER",
            "tax_id": tax_id,
            "licenses": 4,
            "brands": []
        }));
    document
}

#[tokio::test]
async fn test_create_rejects_taken_tax_id() {
    let store = MockStore::start().await;
    store.duplicate_check("11122233344", true).await;
    let app = TestApp::with_store(&store.config());

    let response = app
        .post_json("/api/v1/tenants", tenant_with_new_company("11122233344"))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    let json: Value = response.json();
    assert_eq!(json["error"], "conflict");
    assert!(json["message"].as_str().unwrap().contains("Beta Cars"));

    let received = store.received().await;
    assert_eq!(
        received,
        vec![(
            "GET".to_string(),
            "/companies/check-duplicate/11122233344".to_string()
        )]
    );
}

#[tokio::test]
async fn test_create_checks_only_unsaved_companies() {
    let store = MockStore::start().await;
    store.duplicate_check("11122233344", false).await;
    store.accept_create("t-3").await;
    let app = TestApp::with_store(&store.config());

    app.post_json("/api/v1/tenants", tenant_with_new_company("11122233344"))
        .await
        .assert_created();

    let received = store.received().await;
    assert_eq!(
        received,
        vec![
            (
                "GET".to_string(),
                "/companies/check-duplicate/11122233344".to_string()
            ),
            ("POST".to_string(), "/groups".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_update_rejects_taken_tax_id() {
    let store = MockStore::start().await;
    store.duplicate_check("11122233344", true).await;
    let app = TestApp::with_store(&store.config());

    app.put_json("/api/v1/tenants/t-1", tenant_with_new_company("11122233344"))
        .await
        .assert_status(StatusCode::CONFLICT);

    assert!(store
        .received()
        .await
        .iter()
        .all(|(method, _)| method == "GET"));
}
