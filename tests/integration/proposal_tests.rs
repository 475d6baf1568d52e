//! Proposal engine integration tests
//!
//! Exercise the full extract, evaluate and reconcile pipeline over stored
//! documents, the way the store round-trips them.

use std::path::PathBuf;

use rstest::rstest;

use tenant_topology::models::{
    Brand, BrandCatalog, CompanyCategory, DeploymentMode, Disk, Rule, Server, ServerDefault,
    ServerStatus, TenantDocument,
};
use tenant_topology::services::{FileCatalog, ProposalService};

use crate::common::{
    authored_scale_rule, roles_of, standard_brands, standard_defaults, standard_rules,
    stored_server, tenant, CompanyBuilder,
};

fn service() -> ProposalService {
    ProposalService::new(
        &standard_rules(),
        standard_defaults(),
        BrandCatalog::new(standard_brands()),
    )
}

/// Simulate the store assigning ids to everything it saves
fn store_round_trip(mut document: TenantDocument) -> TenantDocument {
    for (i, server) in document.infrastructure.server_list.iter_mut().enumerate() {
        server.id.get_or_insert_with(|| format!("srv-{}", i));
        for (j, disk) in server.disk_list.iter_mut().enumerate() {
            disk.id.get_or_insert_with(|| format!("srv-{}-disk-{}", i, j));
        }
    }
    document
}

#[test]
fn test_recompute_after_save_is_stable() {
    let service = service();
    let doc = tenant(
        "Stable",
        DeploymentMode::HostedCloud,
        vec![CompanyBuilder::new("Acme Motors")
            .licenses(75, 4)
            .brand("b-kia")
            .brand("b-peugeot")
            .build()],
    );

    let first = service.propose(&doc, doc.infrastructure.mode);
    let mut saved = doc.clone();
    saved.apply_proposal(&first);
    let saved = store_round_trip(saved);

    let second = service.propose(&saved, saved.infrastructure.mode);
    assert_eq!(second.server_list, saved.infrastructure.server_list);
    assert_eq!(second.server_hint, first.server_hint);
}

#[test]
fn test_rule_disk_layout_is_stable_across_saves() {
    let mut rules = standard_rules();
    let bi_rule: Rule = serde_json::from_value(serde_json::json!({
        "name": "BI with archive disk",
        "enabled": true,
        "conditions": {"all": [{"fact": "needsBiServer", "operator": "equal", "value": true}]},
        "event": {"type": "server-add", "params": {
            "role": "BI",
            "disk_list": [{"letter": "C", "size": "80"}, {"letter": "E", "size": "1TB"}]
        }}
    }))
    .unwrap();
    rules.insert(0, bi_rule);

    let mut defaults = standard_defaults();
    defaults.push(ServerDefault {
        role: "BI".to_string(),
        default_disk_list: vec![Disk::new("C", "100")],
        ..Default::default()
    });

    let service = ProposalService::new(&rules, defaults, BrandCatalog::new(standard_brands()));
    let doc = tenant(
        "Reporting",
        DeploymentMode::HostedCloud,
        vec![CompanyBuilder::new("Acme").licenses(20, 0).build()],
    )
    .with_integrations(&["bi_saas_qlik_datatransfer"]);

    let first = service.propose(&doc, DeploymentMode::HostedCloud);
    let bi = first.server_list.iter().find(|s| s.role == "BI").unwrap();
    assert_eq!(bi.disk_list, vec![Disk::new("C", "100"), Disk::new("E", "1TB")]);

    let mut saved = doc.clone();
    saved.apply_proposal(&first);
    let second = service.propose(&saved, DeploymentMode::HostedCloud);
    assert_eq!(second.server_list, first.server_list);
}

#[test]
fn test_scale_ids_survive_webapp_removal_and_return() {
    let service = service();
    let mut doc = tenant(
        "Toggling",
        DeploymentMode::HostedCloud,
        vec![CompanyBuilder::new("Acme").licenses(45, 4).build()],
    )
    .with_servers(vec![
        stored_server("s-db", "DB", ServerStatus::Required, &[("C", "150")]),
        stored_server("s-1", "SCALE-1", ServerStatus::Required, &[("C", "120"), ("D", "300")]),
        stored_server("s-2", "SCALE-2", ServerStatus::Recommended, &[("C", "120")]),
    ]);
    let scale_before: Vec<Server> = doc.servers()[1..].to_vec();

    for (round, web_seats) in [4, 0, 4].into_iter().enumerate() {
        doc.companies[0].web_licenses = web_seats;

        let proposal = service.propose(&doc, DeploymentMode::HostedCloud);
        let expected_roles = if web_seats > 0 {
            vec!["DB", "SCALE-1", "SCALE-2", "WEBAPP"]
        } else {
            vec!["DB", "SCALE-1", "SCALE-2"]
        };
        assert_eq!(roles_of(&proposal.server_list), expected_roles, "round {}", round);

        for (scale, before) in proposal.server_list[1..3].iter().zip(&scale_before) {
            assert_eq!(scale.id, before.id, "round {}", round);
            assert_eq!(scale.disk_list, before.disk_list, "round {}", round);
        }

        doc.apply_proposal(&proposal);
        doc = store_round_trip(doc);
    }
}

#[test]
fn test_user_edits_survive_recompute() {
    let service = service();
    let doc = tenant(
        "Edited",
        DeploymentMode::HostedCloud,
        vec![CompanyBuilder::new("Acme").licenses(45, 0).build()],
    )
    .with_servers(vec![
        stored_server("s-db", "DB", ServerStatus::Required, &[("C", "999"), ("E", "2TB")]),
        stored_server("s-1", "SCALE-1", ServerStatus::Recommended, &[("C", "10"), ("D", "300")]),
    ]);

    let proposal = service.propose(&doc, DeploymentMode::HostedCloud);
    assert_eq!(roles_of(&proposal.server_list), vec!["DB", "SCALE-1", "SCALE-2"]);

    let db = &proposal.server_list[0];
    assert_eq!(db.id.as_deref(), Some("s-db"));
    assert_eq!(db.cpu.as_deref(), Some("4"));
    assert_eq!(db.disk_list[0].size, "150");
    assert_eq!(db.disk_list[1], doc.servers()[0].disk_list[1]);

    let scale = &proposal.server_list[1];
    assert_eq!(scale.id.as_deref(), Some("s-1"));
    assert_eq!(scale.status, Some(ServerStatus::Required));
    assert_eq!(scale.disk_list[0].id.as_deref(), Some("s-1-disk-0"));
    assert_eq!(scale.disk_list[0].size, "120");
    assert_eq!(scale.disk_list[1].size, "300");

    let fresh = &proposal.server_list[2];
    assert!(fresh.id.is_none());
    assert_eq!(fresh.status, Some(ServerStatus::Recommended));
    assert!(fresh.disk_list.iter().all(|d| d.id.is_none()));
}

#[test]
fn test_invalid_disk_list_is_normalised() {
    let service = service();
    let mut broken = stored_server("s-web", "WEBAPP", ServerStatus::Required, &[]);
    broken.disk_list = vec![Disk::new("C", ""), Disk::new("D", "100")];

    let doc = tenant(
        "Broken",
        DeploymentMode::HostedCloud,
        vec![CompanyBuilder::new("Acme").licenses(0, 5).build()],
    )
    .with_servers(vec![broken]);

    let proposal = service.propose(&doc, DeploymentMode::HostedCloud);
    let webapp = &proposal.server_list[1];
    assert_eq!(webapp.role, "WEBAPP");
    assert_eq!(webapp.disk_list, vec![Disk::new("C", "80")]);
    assert_eq!(webapp.id.as_deref(), Some("s-web"));
}

#[test]
fn test_grouped_manufacturers_share_one_composite_server() {
    let service = service();
    let doc = tenant(
        "Grouped",
        DeploymentMode::OnPremise,
        vec![
            CompanyBuilder::new("Alpha Cars").brand("b-peugeot").brand("b-kia").build(),
            CompanyBuilder::new("Beta Cars").brand("b-citroen").brand("b-kia").build(),
        ],
    );

    let proposal = service.propose(&doc, DeploymentMode::OnPremise);
    assert_eq!(
        roles_of(&proposal.server_list),
        vec!["DB", "CX_PSA_AlphaCars", "CX_KIA_AlphaCars", "CX_KIA_BetaCars", "PROXY"]
    );
    assert_eq!(proposal.server_hint, "DB+CX+PROXY");
    assert!(proposal.facts.has_psa);
}

#[rstest]
#[case(DeploymentMode::HostedCloud, true)]
#[case(DeploymentMode::OnPremise, false)]
fn test_nissan_only_tenant(#[case] mode: DeploymentMode, #[case] appliance: bool) {
    let service = service();
    let doc = tenant(
        "Nissan",
        mode,
        vec![CompanyBuilder::new("Yokohama Cars")
            .category(CompanyCategory::Workshop)
            .brand("b-nissan")
            .build()],
    );

    let proposal = service.propose(&doc, mode);
    assert_eq!(roles_of(&proposal.server_list), vec!["DB"]);
    assert!(proposal.has_vlan_segmentation);
    assert_eq!(proposal.has_network_appliance, appliance);
    assert!(proposal.facts.has_nissan);
    assert!(proposal.facts.has_grouped_manufacturer);
}

#[rstest]
#[case(0, vec!["DB"])]
#[case(30, vec!["DB", "SCALE-1"])]
#[case(41, vec!["DB", "SCALE-1", "SCALE-2"])]
#[case(90, vec!["DB", "SCALE-1", "SCALE-2", "SCALE-3"])]
fn test_scale_instances_follow_licenses(#[case] licenses: u32, #[case] expected: Vec<&str>) {
    let doc = tenant(
        "Sized",
        DeploymentMode::HostedCloud,
        vec![CompanyBuilder::new("Acme").licenses(licenses, 0).build()],
    );

    let proposal = service().propose(&doc, DeploymentMode::HostedCloud);
    assert_eq!(roles_of(&proposal.server_list), expected);
}

#[test]
fn test_shrinking_tenant_keeps_surviving_ids() {
    let service = service();
    let doc = tenant(
        "Shrinking",
        DeploymentMode::HostedCloud,
        vec![CompanyBuilder::new("Acme").licenses(31, 0).build()],
    )
    .with_servers(vec![
        stored_server("s-db", "DB", ServerStatus::Required, &[("C", "150")]),
        stored_server("s-1", "SCALE-1", ServerStatus::Required, &[("C", "120")]),
        stored_server("s-2", "SCALE-2", ServerStatus::Required, &[("C", "120")]),
        stored_server("s-3", "SCALE-3", ServerStatus::Recommended, &[("C", "120")]),
    ]);

    let proposal = service.propose(&doc, DeploymentMode::HostedCloud);
    assert_eq!(roles_of(&proposal.server_list), vec!["DB", "SCALE-1"]);
    assert_eq!(proposal.server_list[1].id.as_deref(), Some("s-1"));
}

#[test]
fn test_every_proposal_has_a_baseline() {
    let service = service();
    let docs = vec![
        TenantDocument::default(),
        tenant(
            "No DB",
            DeploymentMode::Hybrid,
            vec![CompanyBuilder::new("Acme").licenses(10, 10).build()],
        )
        .with_servers(vec![Server::new("WEBAPP")]),
    ];

    for doc in docs {
        let proposal = service.propose(&doc, doc.infrastructure.mode);
        let baselines = proposal.server_list.iter().filter(|s| s.role == "DB").count();
        assert_eq!(baselines, 1);
        assert_eq!(proposal.server_list[0].role, "DB");
    }
}

#[test]
fn test_authored_rule_with_overrides() {
    let service = ProposalService::new(&[authored_scale_rule()], Vec::new(), BrandCatalog::default());
    let doc = tenant(
        "Authored",
        DeploymentMode::HostedCloud,
        vec![CompanyBuilder::new("Acme").licenses(45, 0).build()],
    );

    let proposal = service.propose(&doc, DeploymentMode::HostedCloud);
    assert_eq!(roles_of(&proposal.server_list), vec!["DB", "SCALE-1", "SCALE-2"]);
    assert!(proposal.server_list[1..]
        .iter()
        .all(|s| s.cpu.as_deref() == Some("8") && s.ram.as_deref() == Some("16")));
    assert_eq!(proposal.server_list[1].disk_list, vec![Disk::new("C", "100GB")]);
}

#[test]
fn test_embedded_brands_need_no_catalog() {
    let service = ProposalService::new(&standard_rules(), Vec::new(), BrandCatalog::default());
    let doc = tenant(
        "Embedded",
        DeploymentMode::HostedCloud,
        vec![CompanyBuilder::new("Acme")
            .brand(Brand {
                description: "Audi".to_string(),
                requires_network_appliance: true,
                ..Default::default()
            })
            .brand("unknown-id")
            .build()],
    );

    let proposal = service.propose(&doc, DeploymentMode::HostedCloud);
    assert_eq!(
        roles_of(&proposal.server_list),
        vec!["DB", "CX_VGI_Acme", "CX_UNKNOWN-ID_Acme"]
    );
    assert!(proposal.has_network_appliance);
}

fn shipped_catalog() -> FileCatalog {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config");
    FileCatalog::new(
        Some(dir.join("rules.yaml")),
        Some(dir.join("server_defaults.yaml")),
        Some(dir.join("brands.yaml")),
    )
}

#[tokio::test]
async fn test_shipped_catalogs_compile() {
    let service = ProposalService::load(&shipped_catalog()).await.unwrap();
    assert_eq!(service.rule_count(), 6);
    assert_eq!(service.defaults().len(), 7);
    assert_eq!(service.brands().len(), 14);
}

#[tokio::test]
async fn test_shipped_catalogs_full_tenant() {
    let doc = tenant(
        "Shipped",
        DeploymentMode::Hybrid,
        vec![
            CompanyBuilder::new("Rossi Auto")
                .licenses(30, 2)
                .brand("toyota")
                .brand("dacia")
                .build(),
            CompanyBuilder::new("Verdi S.p.A.")
                .licenses(10, 0)
                .brand("renault")
                .build(),
        ],
    )
    .with_integrations(&["documentale_zucchetti", "bi_saas_qlik_datatransfer"]);

    let proposal = ProposalService::propose_with(&shipped_catalog(), &doc, DeploymentMode::Hybrid)
        .await
        .unwrap();

    assert_eq!(
        roles_of(&proposal.server_list),
        vec![
            "DB",
            "SCALE-1",
            "SCALE-2",
            "CX_TOYOTA_RossiAuto",
            "CX_RENAULT_RossiAuto",
            "WEBAPP",
            "BI",
            "DOC",
            "PROXY"
        ]
    );
    assert_eq!(proposal.server_list[0].disk_list.len(), 3);
    assert_eq!(proposal.server_list[7].disk_list[1].size, "1000");
    assert_eq!(proposal.server_list[8].status, Some(ServerStatus::Recommended));
    assert!(proposal.has_proxy);
    assert!(!proposal.has_network_appliance);
}
