//! Proposal step definitions

use cucumber::{then, when};

use crate::features::support::TestWorld;
use tenant_topology::models::ServerStatus;

#[when("the proposal is computed")]
async fn compute_proposal(world: &mut TestWorld) {
    let mode = world.document.infrastructure.mode;
    let proposal = world.service().propose(&world.document, mode);
    world.proposal = Some(proposal);
}

#[when("the proposal is saved")]
async fn save_proposal(world: &mut TestWorld) {
    world.save_proposal();
}

#[then(expr = "the proposed roles are {string}")]
async fn proposed_roles(world: &mut TestWorld, expected: String) {
    let expected: Vec<&str> = expected.split(',').map(str::trim).collect();
    let actual: Vec<&str> = world
        .proposal()
        .server_list
        .iter()
        .map(|s| s.role.as_str())
        .collect();
    assert_eq!(actual, expected);
}

#[then(expr = "the server hint is {string}")]
async fn server_hint(world: &mut TestWorld, expected: String) {
    assert_eq!(world.proposal().server_hint, expected);
}

#[then(expr = "server {string} is {string}")]
async fn server_status(world: &mut TestWorld, role: String, status: String) {
    let server = world
        .proposal()
        .server_list
        .iter()
        .find(|s| s.role == role)
        .unwrap_or_else(|| panic!("No server with role {}", role));
    assert_eq!(server.status, ServerStatus::parse(&status));
}

#[then("the proposal is unchanged")]
async fn proposal_unchanged(world: &mut TestWorld) {
    let saved = world.saved.as_ref().expect("No proposal saved");
    let current = world.proposal();

    assert_eq!(current.server_list, world.document.infrastructure.server_list);
    assert_eq!(current.server_hint, saved.server_hint);
    assert_eq!(current.facts, saved.facts);
}

#[then("VLAN segmentation is required")]
async fn vlan_required(world: &mut TestWorld) {
    assert!(world.proposal().has_vlan_segmentation);
}

#[then("a network appliance is required")]
async fn appliance_required(world: &mut TestWorld) {
    assert!(world.proposal().has_network_appliance);
}
