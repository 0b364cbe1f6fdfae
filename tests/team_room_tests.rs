use futures::future::join_all;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use stadium_booking::database::models::{
    CreateTeamRoomInput, NotificationType, PageRequest, TeamRoomFilter, TeamRoomStatus,
};
use stadium_booking::services::BookingError;

mod common;
use common::{MockData, TestEnv, match_day};

fn team_room(branch_id: Uuid, team_id: Uuid, start: &str, end: &str) -> CreateTeamRoomInput {
    CreateTeamRoomInput {
        branch_id,
        team_id,
        scheduled_date: match_day().format("%Y-%m-%d").to_string(),
        start_time: start.to_string(),
        end_time: end.to_string(),
    }
}

#[tokio::test]
async fn incomplete_roster_cannot_open_a_room() {
    let env = TestEnv::new();
    let branch = env.branch().await;
    let (team, roster) = env.team(5, 4).await;

    let err = env
        .state
        .team_rooms
        .create_room(roster[0], team_room(branch.id, team.id, "18:00", "19:00"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BookingError::TeamNotFullRoster { roster_size: 5 }
    ));
}

#[tokio::test]
async fn only_the_captain_opens_a_room() {
    let env = TestEnv::new();
    let branch = env.branch().await;
    let (team, roster) = env.full_team(3).await;

    let err = env
        .state
        .team_rooms
        .create_room(roster[1], team_room(branch.id, team.id, "18:00", "19:00"))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::NotCaptain));
}

#[tokio::test]
async fn created_room_waits_for_an_opponent() {
    let env = TestEnv::new();
    let branch = env.branch().await;
    let (team, roster) = env.full_team(5).await;

    let room = env
        .state
        .team_rooms
        .create_room(roster[0], team_room(branch.id, team.id, "18:00", "19:00"))
        .await
        .unwrap();

    assert_eq!(room.status, TeamRoomStatus::Open);
    assert_eq!(room.opponent_team_id, None);
    assert_eq!(room.required_team_size, 5);
    assert_eq!(room.creator_team_id, team.id);
}

#[tokio::test]
async fn opponent_roster_must_match_the_required_size() {
    let env = TestEnv::new();
    let branch = env.branch().await;
    let (creator, creator_roster) = env.full_team(5).await;
    let (bigger, bigger_roster) = env.full_team(6).await;

    let room = env
        .state
        .team_rooms
        .create_room(
            creator_roster[0],
            team_room(branch.id, creator.id, "18:00", "19:00"),
        )
        .await
        .unwrap();

    let err = env
        .state
        .team_rooms
        .join_room(bigger_roster[0], room.id, bigger.id)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::TeamSizeMismatch { required: 5 }));
    assert_eq!(err.to_string(), "Team size mismatch. Required: 5 players");
}

#[tokio::test]
async fn matching_fills_the_opponent_once() {
    let env = TestEnv::new();
    let branch = env.branch().await;
    let (creator, creator_roster) = env.full_team(5).await;
    let (opponent, opponent_roster) = env.full_team(5).await;
    let (late, late_roster) = env.full_team(5).await;

    let room = env
        .state
        .team_rooms
        .create_room(
            creator_roster[0],
            team_room(branch.id, creator.id, "18:00", "19:00"),
        )
        .await
        .unwrap();
    env.notifier.clear();

    let matched = env
        .state
        .team_rooms
        .join_room(opponent_roster[0], room.id, opponent.id)
        .await
        .unwrap();
    assert_eq!(matched.status, TeamRoomStatus::Matched);
    assert_eq!(matched.opponent_team_id, Some(opponent.id));
    assert_eq!(
        env.notifier.types_for(creator_roster[0]),
        vec![NotificationType::BookingConfirmation]
    );

    let err = env
        .state
        .team_rooms
        .join_room(late_roster[0], room.id, late.id)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::RoomAlreadyMatched));

    let detail = env.state.team_rooms.get_room(room.id).await.unwrap();
    assert_eq!(detail.branch_name, branch.name);
    assert_eq!(detail.creator_team.team.id, creator.id);
    assert_eq!(
        detail.opponent_team.map(|t| t.team.id),
        Some(opponent.id)
    );
}

#[tokio::test]
async fn join_checks_the_opponent_side() {
    let env = TestEnv::new();
    let branch = env.branch().await;
    let (creator, creator_roster) = env.full_team(4).await;
    let (short, short_roster) = env.team(4, 3).await;
    let (opponent, opponent_roster) = env.full_team(4).await;

    let room = env
        .state
        .team_rooms
        .create_room(
            creator_roster[0],
            team_room(branch.id, creator.id, "18:00", "19:00"),
        )
        .await
        .unwrap();

    let err = env
        .state
        .team_rooms
        .join_room(creator_roster[0], room.id, creator.id)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::CannotJoinOwnRoom));

    let err = env
        .state
        .team_rooms
        .join_room(opponent_roster[1], room.id, opponent.id)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::NotCaptain));

    let err = env
        .state
        .team_rooms
        .join_room(short_roster[0], room.id, short.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BookingError::TeamNotFullRoster { roster_size: 4 }
    ));

    let err = env
        .state
        .team_rooms
        .join_room(opponent_roster[0], Uuid::new_v4(), opponent.id)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::RoomNotFound));
}

#[tokio::test]
async fn overlapping_team_rooms_conflict() {
    let env = TestEnv::new();
    let branch = env.branch().await;
    let (team, roster) = env.full_team(3).await;

    env.state
        .team_rooms
        .create_room(roster[0], team_room(branch.id, team.id, "18:00", "19:00"))
        .await
        .unwrap();

    let err = env
        .state
        .team_rooms
        .create_room(roster[0], team_room(branch.id, team.id, "18:30", "19:30"))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::TeamConflict));

    env.state
        .team_rooms
        .create_room(roster[0], team_room(branch.id, team.id, "19:00", "20:00"))
        .await
        .unwrap();
}

#[tokio::test]
async fn member_with_an_individual_booking_blocks_the_match() {
    let env = TestEnv::new();
    let branch = env.branch().await;
    let (creator, creator_roster) = env.full_team(3).await;
    let (opponent, opponent_roster) = env.full_team(3).await;

    env.state
        .individual_rooms
        .create_room(
            opponent_roster[2],
            MockData::individual_room(branch.id, match_day(), "18:30", "19:30", 4),
        )
        .await
        .unwrap();

    let room = env
        .state
        .team_rooms
        .create_room(
            creator_roster[0],
            team_room(branch.id, creator.id, "18:00", "19:00"),
        )
        .await
        .unwrap();

    let err = env
        .state
        .team_rooms
        .join_room(opponent_roster[0], room.id, opponent.id)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::TeamMembersConflict));

    let err = env
        .state
        .team_rooms
        .create_room(
            opponent_roster[0],
            team_room(branch.id, opponent.id, "19:00", "20:00"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::TeamMembersConflict));
}

#[tokio::test]
async fn creator_captain_can_cancel_even_after_a_match() {
    let env = TestEnv::new();
    let branch = env.branch().await;
    let (creator, creator_roster) = env.full_team(2).await;
    let (opponent, opponent_roster) = env.full_team(2).await;

    let room = env
        .state
        .team_rooms
        .create_room(
            creator_roster[0],
            team_room(branch.id, creator.id, "10:00", "11:00"),
        )
        .await
        .unwrap();
    env.state
        .team_rooms
        .join_room(opponent_roster[0], room.id, opponent.id)
        .await
        .unwrap();

    let err = env
        .state
        .team_rooms
        .cancel_room(opponent_roster[0], room.id)
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::NotCreatorCaptain));

    let cancelled = env
        .state
        .team_rooms
        .cancel_room(creator_roster[0], room.id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, TeamRoomStatus::Cancelled);

    // the slot is free again for both teams
    env.state
        .team_rooms
        .create_room(
            opponent_roster[0],
            team_room(branch.id, opponent.id, "10:00", "11:00"),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn listing_filters_by_team_size_and_hides_cancelled_rooms() {
    let env = TestEnv::new();
    let branch = env.branch().await;
    let (fives, fives_roster) = env.full_team(5).await;
    let (threes, threes_roster) = env.full_team(3).await;

    let five_a_side = env
        .state
        .team_rooms
        .create_room(
            fives_roster[0],
            team_room(branch.id, fives.id, "09:00", "10:00"),
        )
        .await
        .unwrap();
    let three_a_side = env
        .state
        .team_rooms
        .create_room(
            threes_roster[0],
            team_room(branch.id, threes.id, "09:00", "10:00"),
        )
        .await
        .unwrap();
    let dropped = env
        .state
        .team_rooms
        .create_room(
            threes_roster[0],
            team_room(branch.id, threes.id, "12:00", "13:00"),
        )
        .await
        .unwrap();
    env.state
        .team_rooms
        .cancel_room(threes_roster[0], dropped.id)
        .await
        .unwrap();

    let page = env
        .state
        .team_rooms
        .list_rooms(TeamRoomFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);

    let page = env
        .state
        .team_rooms
        .list_rooms(
            TeamRoomFilter {
                team_size: Some(5),
                ..TeamRoomFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    let ids: Vec<Uuid> = page.items.iter().map(|d| d.room.id).collect();
    assert_eq!(ids, vec![five_a_side.id]);
    assert_eq!(page.items[0].creator_team.member_count, 5);

    let page = env
        .state
        .team_rooms
        .list_rooms(
            TeamRoomFilter {
                team_size: Some(3),
                status: Some(TeamRoomStatus::Open),
                ..TeamRoomFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    let ids: Vec<Uuid> = page.items.iter().map(|d| d.room.id).collect();
    assert_eq!(ids, vec![three_a_side.id]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_challengers_produce_a_single_match() {
    let env = TestEnv::new();
    let branch = env.branch().await;
    let (creator, creator_roster) = env.full_team(2).await;

    let room = env
        .state
        .team_rooms
        .create_room(
            creator_roster[0],
            team_room(branch.id, creator.id, "20:00", "21:00"),
        )
        .await
        .unwrap();

    let mut challengers = Vec::new();
    for _ in 0..6 {
        let (team, roster) = env.full_team(2).await;
        challengers.push((roster[0], team.id));
    }

    let handles: Vec<_> = challengers
        .into_iter()
        .map(|(captain, team_id)| {
            let rooms = env.state.team_rooms.clone();
            let room_id = room.id;
            tokio::spawn(async move { rooms.join_room(captain, room_id, team_id).await })
        })
        .collect();

    let mut winners = Vec::new();
    let mut rejected = 0;
    for result in join_all(handles).await {
        match result.unwrap() {
            Ok(room) => winners.push(room.opponent_team_id),
            Err(BookingError::RoomAlreadyMatched) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(winners.len(), 1);
    assert_eq!(rejected, 5);

    let detail = env.state.team_rooms.get_room(room.id).await.unwrap();
    assert_eq!(detail.room.status, TeamRoomStatus::Matched);
    assert_eq!(detail.room.opponent_team_id, winners[0]);
}
