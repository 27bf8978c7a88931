//! BDD step definitions for the team directory feature

use cucumber::{given, then, when};

use hackathon_sync::model::Team;

use crate::world::{split_names, SyncWorld};

fn add_team(world: &mut SyncWorld, name: String, challenge_id: Option<String>) {
    let id = format!("t{}", world.teams.len() + 1);
    world.teams.push(Team {
        id,
        name,
        members: Vec::new(),
        skills_needed: Vec::new(),
        challenge_id,
    });
}

fn refresh_visible(world: &mut SyncWorld) {
    world.visible = world
        .filter
        .apply(&world.teams)
        .into_iter()
        .map(|team| team.name.clone())
        .collect();
}

#[given(expr = "a team {string} assigned to challenge {string}")]
fn team_with_challenge(world: &mut SyncWorld, name: String, challenge_id: String) {
    add_team(world, name, Some(challenge_id));
}

#[given(expr = "a team {string} without a challenge")]
fn team_without_challenge(world: &mut SyncWorld, name: String) {
    add_team(world, name, None);
}

#[when(expr = "I filter teams by name {string}")]
fn filter_by_name(world: &mut SyncWorld, query: String) {
    world.filter.query = query;
    refresh_visible(world);
}

#[when(expr = "I filter teams by name {string} and challenge {string}")]
fn filter_by_name_and_challenge(world: &mut SyncWorld, query: String, challenge_id: String) {
    world.filter.query = query;
    world.filter.challenge_id = Some(challenge_id);
    refresh_visible(world);
}

#[when("I reset the team filter")]
fn reset_filter(world: &mut SyncWorld) {
    world.filter.reset();
    refresh_visible(world);
}

#[then(expr = "the visible teams are {string}")]
fn visible_teams(world: &mut SyncWorld, names: String) {
    assert_eq!(world.visible, split_names(&names));
}

#[then("no teams are visible")]
fn no_teams_visible(world: &mut SyncWorld) {
    assert!(world.visible.is_empty(), "visible: {:?}", world.visible);
}
