//! BDD step definitions for the action gate feature

use std::sync::Arc;

use cucumber::{given, then, when};

use hackathon_sync::gate::{ActionGate, ActionKey, ActionKind, ActionStatus};

use crate::world::SyncWorld;

fn parse_kind(s: &str) -> ActionKind {
    match s {
        "invite" => ActionKind::Invite,
        "send-emails" => ActionKind::SendEmails,
        "generate-plan" => ActionKind::GeneratePlan,
        "generate-problems" => ActionKind::GenerateProblems,
        other => panic!("Unknown action kind: {}", other),
    }
}

fn parse_status(s: &str) -> ActionStatus {
    match s {
        "idle" => ActionStatus::Idle,
        "running" => ActionStatus::Running,
        "succeeded" => ActionStatus::Succeeded,
        "failed" => ActionStatus::Failed,
        other => panic!("Unknown action status: {}", other),
    }
}

fn gate(world: &SyncWorld) -> &ActionGate {
    world.gate.as_ref().expect("gate not created")
}

#[given("an empty action gate")]
fn empty_gate(world: &mut SyncWorld) {
    world.gate = Some(Arc::new(ActionGate::new()));
    world.starts.clear();
}

#[when(expr = "I start {string} for hackathon {string}")]
async fn start_action(world: &mut SyncWorld, kind: String, id: String) {
    let key = ActionKey::new(id, parse_kind(&kind));
    let granted = gate(world).try_start(&key).await;
    world.starts.push(granted);
}

#[when(expr = "{string} for hackathon {string} succeeds")]
async fn action_succeeds(world: &mut SyncWorld, kind: String, id: String) {
    let key = ActionKey::new(id, parse_kind(&kind));
    gate(world).complete(&key, Ok(())).await;
}

#[when(expr = "{string} for hackathon {string} fails with {string}")]
async fn action_fails(world: &mut SyncWorld, kind: String, id: String, message: String) {
    let key = ActionKey::new(id, parse_kind(&kind));
    gate(world).complete(&key, Err(message)).await;
}

#[when("the view is unmounted")]
async fn view_unmounted(world: &mut SyncWorld) {
    gate(world).clear().await;
}

#[then(expr = "start {int} is granted")]
fn start_granted(world: &mut SyncWorld, n: usize) {
    assert!(world.starts[n - 1], "start {} was denied", n);
}

#[then(expr = "start {int} is denied")]
fn start_denied(world: &mut SyncWorld, n: usize) {
    assert!(!world.starts[n - 1], "start {} was granted", n);
}

#[then(expr = "{string} for hackathon {string} is {string}")]
async fn action_status(world: &mut SyncWorld, kind: String, id: String, status: String) {
    let key = ActionKey::new(id, parse_kind(&kind));
    assert_eq!(gate(world).status(&key).await.status, parse_status(&status));
}

#[then(expr = "{string} for hackathon {string} records the error {string}")]
async fn action_error(world: &mut SyncWorld, kind: String, id: String, message: String) {
    let key = ActionKey::new(id, parse_kind(&kind));
    let record = gate(world).status(&key).await;
    assert_eq!(record.last_error.as_deref(), Some(message.as_str()));
}
