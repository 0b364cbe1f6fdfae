use pretty_assertions::assert_eq;
use uuid::Uuid;

use stadium_booking::database::models::{CreateTeamInput, CreateTeamRoomInput, SearchType, Team};

mod common;
use common::{MockData, TestEnv, match_day, seed_team};

fn team_room(branch_id: Uuid, team_id: Uuid, start: &str, end: &str) -> CreateTeamRoomInput {
    CreateTeamRoomInput {
        branch_id,
        team_id,
        scheduled_date: match_day().format("%Y-%m-%d").to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
    }
}

async fn named_team(env: &TestEnv, name: &str, description: Option<&str>) -> (Team, Vec<Uuid>) {
    let input = CreateTeamInput {
        name: name.to_string(),
        description: description.map(str::to_string),
        logo_url: None,
        roster_size: 2,
    };
    let roster = env.users(2).await;
    seed_team(&env.state, input, roster).await
}

#[tokio::test]
async fn blank_query_finds_nothing() {
    let env = TestEnv::new();
    env.branch_named("Harbourside Dome", "1 Quay Street").await;

    let results = env.state.search.search("   ", None).await.unwrap();
    assert_eq!(results.total_results, 0);
    assert!(results.branches.is_empty());
}

#[tokio::test]
async fn branches_match_on_name_or_address() {
    let env = TestEnv::new();
    env.branch_named("Harbourside Dome", "1 Quay Street").await;
    env.branch_named("Riverside Pitch", "12 Harbourside Road").await;
    let closed = env.branch_named("Harbourside Annex", "3 Quay Street").await;
    env.state
        .branches
        .deactivate_branch(closed.id)
        .await
        .unwrap();

    let results = env
        .state
        .search
        .search("HARBOURSIDE", Some(SearchType::Branches))
        .await
        .unwrap();
    assert_eq!(
        results
            .branches
            .iter()
            .map(|b| b.name.as_str())
            .collect::<Vec<_>>(),
        vec!["Harbourside Dome", "Riverside Pitch"]
    );
    assert_eq!(results.total_results, 2);
}

#[tokio::test]
async fn individual_rooms_match_owner_notes_and_branch() {
    let env = TestEnv::new();
    let branch = env.branch_named("Quixote Fields", "9 Mill Lane").await;
    let elsewhere = env.branch_named("Elm Grounds", "5 Birch Road").await;
    let owner = env.user_named("Lena Marsh").await;
    let other = env.user_named("Tomas Reed").await;

    let at_branch = env
        .state
        .individual_rooms
        .create_room(
            owner,
            MockData::individual_room(branch.id, match_day(), "09:00", "10:00", 4),
        )
        .await
        .unwrap();

    let mut with_notes = MockData::individual_room(elsewhere.id, match_day(), "11:00", "12:00", 4);
    with_notes.notes = Some("Bring the quixote bibs".to_string());
    let by_notes = env
        .state
        .individual_rooms
        .create_room(other, with_notes)
        .await
        .unwrap();

    let cancelled = env
        .state
        .individual_rooms
        .create_room(
            owner,
            MockData::individual_room(branch.id, match_day(), "13:00", "14:00", 4),
        )
        .await
        .unwrap();
    env.state
        .individual_rooms
        .cancel_room(owner, cancelled.room.id)
        .await
        .unwrap();

    let results = env
        .state
        .search
        .search("quixote", Some(SearchType::IndividualRooms))
        .await
        .unwrap();
    assert_eq!(
        results
            .individual_rooms
            .iter()
            .map(|s| s.room.id)
            .collect::<Vec<_>>(),
        vec![at_branch.room.id, by_notes.room.id]
    );
    assert_eq!(results.individual_rooms[0].filled_slots, 1);
    assert!(results.branches.is_empty());

    let by_owner = env
        .state
        .search
        .search("marsh", Some(SearchType::IndividualRooms))
        .await
        .unwrap();
    assert_eq!(by_owner.individual_rooms.len(), 1);
    assert_eq!(by_owner.individual_rooms[0].room.owner_id, owner);
}

#[tokio::test]
async fn team_rooms_match_either_side_and_teams_match_description() {
    let env = TestEnv::new();
    let branch = env.branch_named("Kestrel Stadium", "2 Aviary Road").await;
    let (falcons, falcons_roster) = named_team(&env, "Northern Falcons", None).await;
    let (owls, owls_roster) = named_team(&env, "Southern Owls", None).await;
    named_team(&env, "Pebble FC", Some("Sunday owls league")).await;
    let (reserve, reserve_roster) = named_team(&env, "Owls Reserve", None).await;
    env.state
        .teams
        .disband_team(reserve_roster[0], reserve.id)
        .await
        .unwrap();

    let room = env
        .state
        .team_rooms
        .create_room(
            falcons_roster[0],
            team_room(branch.id, falcons.id, "18:00", "19:00"),
        )
        .await
        .unwrap();
    env.state
        .team_rooms
        .join_room(owls_roster[0], room.id, owls.id)
        .await
        .unwrap();

    let rooms = env
        .state
        .search
        .search("owls", Some(SearchType::TeamRooms))
        .await
        .unwrap();
    assert_eq!(rooms.team_rooms.len(), 1);
    assert_eq!(rooms.team_rooms[0].room.id, room.id);
    assert_eq!(rooms.team_rooms[0].creator_team.team.name, "Northern Falcons");
    assert_eq!(
        rooms.team_rooms[0]
            .opponent_team
            .as_ref()
            .map(|t| t.team.name.as_str()),
        Some("Southern Owls")
    );

    let teams = env
        .state
        .search
        .search("owls", Some(SearchType::Teams))
        .await
        .unwrap();
    assert_eq!(
        teams
            .teams
            .iter()
            .map(|t| (t.team.name.as_str(), t.member_count))
            .collect::<Vec<_>>(),
        vec![("Pebble FC", 2), ("Southern Owls", 2)]
    );
    assert!(teams.team_rooms.is_empty());
}

#[tokio::test]
async fn rooms_type_covers_both_room_kinds() {
    let env = TestEnv::new();
    let branch = env.branch_named("Citadel Park", "4 Castle Row").await;
    let player = env.user().await;
    let (team, roster) = env.full_team(2).await;

    env.state
        .individual_rooms
        .create_room(
            player,
            MockData::individual_room(branch.id, match_day(), "09:00", "10:00", 4),
        )
        .await
        .unwrap();
    env.state
        .team_rooms
        .create_room(roster[0], team_room(branch.id, team.id, "18:00", "19:00"))
        .await
        .unwrap();

    let rooms = env
        .state
        .search
        .search("citadel", Some(SearchType::Rooms))
        .await
        .unwrap();
    assert!(rooms.branches.is_empty());
    assert_eq!(rooms.individual_rooms.len(), 1);
    assert_eq!(rooms.team_rooms.len(), 1);
    assert_eq!(rooms.total_results, 2);

    let everything = env.state.search.search("citadel", None).await.unwrap();
    assert_eq!(everything.branches.len(), 1);
    assert_eq!(everything.total_results, 3);
}

#[tokio::test]
async fn each_kind_is_capped_at_ten_results() {
    let env = TestEnv::new();
    for i in 0..12 {
        env.branch_named(&format!("Lantern {:02}", i), "7 Lamp Street")
            .await;
    }

    let results = env
        .state
        .search
        .search("lantern", Some(SearchType::Branches))
        .await
        .unwrap();
    assert_eq!(results.branches.len(), 10);
    assert_eq!(results.branches[0].name, "Lantern 00");
    assert_eq!(results.total_results, 10);
}
