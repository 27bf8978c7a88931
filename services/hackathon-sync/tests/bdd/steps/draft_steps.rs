//! BDD step definitions for the hackathon draft feature

use std::sync::atomic::Ordering;
use std::sync::Arc;

use cucumber::{given, then, when};

use hackathon_sync::draft::DraftSubmitter;
use hackathon_sync::error::ErrorKind;
use hackathon_sync::model::{HackathonDraft, ResourceCollection};
use hackathon_sync::state::{new_store, snapshot};

use crate::world::{hackathon, split_names, SyncWorld};

async fn listed_ids(world: &SyncWorld) -> Vec<String> {
    let store = world.hackathons.as_ref().expect("hackathon list not set");
    snapshot(store)
        .await
        .value
        .iter()
        .map(|h| h.id.clone())
        .collect()
}

#[given(expr = "the hackathon list holds {string}")]
fn hackathon_list(world: &mut SyncWorld, ids: String) {
    let items = split_names(&ids)
        .iter()
        .map(|id| hackathon(id, "Existing"))
        .collect();
    world.hackathons = Some(new_store(ResourceCollection::from_items(items, 50)));
}

#[given("the plan service is failing")]
fn plan_service_failing(world: &mut SyncWorld) {
    world.api.plan_failing.store(true, Ordering::SeqCst);
}

#[given(expr = "a draft with topic {string}")]
fn draft_with_topic(world: &mut SyncWorld, topic: String) {
    world.draft = HackathonDraft::new(topic);
}

#[given(expr = "the draft location is {string}")]
fn draft_location(world: &mut SyncWorld, location: String) {
    world.draft.location = Some(location);
}

#[when("I submit the draft")]
async fn submit_draft(world: &mut SyncWorld) {
    let store = Arc::clone(world.hackathons.as_ref().expect("hackathon list not set"));
    let submitter = DraftSubmitter::for_hackathons(world.api.clone(), store)
        .with_errors(world.errors.clone());
    let result = submitter.submit(&mut world.draft).await;
    world.submit_result = Some(result);
}

#[then("the submission succeeds")]
fn submission_succeeds(world: &mut SyncWorld) {
    let result = world.submit_result.as_ref().expect("nothing submitted");
    assert!(result.is_ok(), "{:?}", result);
}

#[then("the submission is rejected as invalid")]
fn submission_invalid(world: &mut SyncWorld) {
    match world.submit_result.as_ref().expect("nothing submitted") {
        Err(e) => assert_eq!(e.kind(), ErrorKind::Validation),
        Ok(h) => panic!("expected a validation error, created {:?}", h),
    }
}

#[then("the submission fails")]
fn submission_fails(world: &mut SyncWorld) {
    let result = world.submit_result.as_ref().expect("nothing submitted");
    assert!(result.is_err());
}

#[then(expr = "the hackathon list is {string}")]
async fn hackathon_list_is(world: &mut SyncWorld, ids: String) {
    assert_eq!(listed_ids(world).await, split_names(&ids));
}

#[then("the draft is cleared")]
fn draft_cleared(world: &mut SyncWorld) {
    assert_eq!(world.draft, HackathonDraft::default());
}

#[then(expr = "the draft still has topic {string} and location {string}")]
fn draft_preserved(world: &mut SyncWorld, topic: String, location: String) {
    assert_eq!(world.draft.topic, topic);
    assert_eq!(world.draft.location.as_deref(), Some(location.as_str()));
}

#[then(expr = "{int} plan request(s) was/were sent")]
fn plan_requests(world: &mut SyncWorld, count: usize) {
    assert_eq!(world.api.plan_calls.load(Ordering::SeqCst), count);
}

#[then(expr = "the error surface shows {string}")]
async fn error_surface_shows(world: &mut SyncWorld, context: String) {
    let report = world.errors.current().await.expect("no error reported");
    assert_eq!(report.context, context);
}

#[then("the error surface is clear")]
async fn error_surface_clear(world: &mut SyncWorld) {
    assert!(world.errors.current().await.is_none());
}
