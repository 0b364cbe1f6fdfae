use chrono::NaiveDate;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::database::{
    models::{PageRequest, TeamRoom, TeamRoomFilter, TeamRoomStatus},
    repositories::branch::name_pattern,
    utils::sql,
};

const TEAM_ROOM_COLUMNS: &str = r#"
    id,
    branch_id,
    creator_team_id,
    opponent_team_id,
    scheduled_date,
    start_time,
    end_time,
    required_team_size,
    status,
    created_at,
    updated_at
"#;

pub async fn insert_room(
    tx: &mut Transaction<'_, Postgres>,
    room: &TeamRoom,
) -> Result<(), sqlx::Error> {
    sqlx::query(&sql(&format!(
        r#"
            INSERT INTO
                team_rooms ({TEAM_ROOM_COLUMNS})
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#
    )))
    .bind(room.id)
    .bind(room.branch_id)
    .bind(room.creator_team_id)
    .bind(room.opponent_team_id)
    .bind(room.scheduled_date)
    .bind(room.start_time)
    .bind(room.end_time)
    .bind(room.required_team_size)
    .bind(room.status)
    .bind(room.created_at)
    .bind(room.updated_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn update_room(
    tx: &mut Transaction<'_, Postgres>,
    room: &TeamRoom,
) -> Result<(), sqlx::Error> {
    sqlx::query(&sql(r#"
            UPDATE
                team_rooms
            SET
                opponent_team_id = ?,
                status = ?,
                updated_at = ?
            WHERE
                id = ?
        "#))
    .bind(room.opponent_team_id)
    .bind(room.status)
    .bind(room.updated_at)
    .bind(room.id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn find_room(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<TeamRoom>, sqlx::Error> {
    let room = sqlx::query_as::<_, TeamRoom>(&sql(&format!(
        "SELECT {TEAM_ROOM_COLUMNS} FROM team_rooms WHERE id = ?"
    )))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(room)
}

pub async fn lock_room(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<TeamRoom>, sqlx::Error> {
    let room = sqlx::query_as::<_, TeamRoom>(&sql(&format!(
        "SELECT {TEAM_ROOM_COLUMNS} FROM team_rooms WHERE id = ? FOR UPDATE"
    )))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(room)
}

pub async fn list_rooms(
    tx: &mut Transaction<'_, Postgres>,
    filter: &TeamRoomFilter,
    page: PageRequest,
) -> Result<(Vec<TeamRoom>, i64), sqlx::Error> {
    const FILTERS: &str = r#"
        status <> 'CANCELLED'
        AND (?::UUID IS NULL OR branch_id = ?)
        AND (?::VARCHAR IS NULL OR status = ?)
        AND (?::INTEGER IS NULL OR required_team_size = ?)
        AND (?::DATE IS NULL OR scheduled_date >= ?)
        AND (?::DATE IS NULL OR scheduled_date <= ?)
    "#;

    let total = sqlx::query_scalar::<_, i64>(&sql(&format!(
        "SELECT COUNT(*) FROM team_rooms WHERE {FILTERS}"
    )))
    .bind(filter.branch_id)
    .bind(filter.branch_id)
    .bind(filter.status)
    .bind(filter.status)
    .bind(filter.team_size)
    .bind(filter.team_size)
    .bind(filter.date_from)
    .bind(filter.date_from)
    .bind(filter.date_to)
    .bind(filter.date_to)
    .fetch_one(&mut **tx)
    .await?;

    let rooms = sqlx::query_as::<_, TeamRoom>(&sql(&format!(
        r#"
            SELECT
                {TEAM_ROOM_COLUMNS}
            FROM
                team_rooms
            WHERE
                {FILTERS}
            ORDER BY
                scheduled_date ASC,
                start_time ASC,
                created_at ASC
            LIMIT ? OFFSET ?
        "#
    )))
    .bind(filter.branch_id)
    .bind(filter.branch_id)
    .bind(filter.status)
    .bind(filter.status)
    .bind(filter.team_size)
    .bind(filter.team_size)
    .bind(filter.date_from)
    .bind(filter.date_from)
    .bind(filter.date_to)
    .bind(filter.date_to)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(&mut **tx)
    .await?;

    Ok((rooms, total))
}

pub async fn rooms_of_teams(
    tx: &mut Transaction<'_, Postgres>,
    team_ids: &[Uuid],
) -> Result<Vec<TeamRoom>, sqlx::Error> {
    if team_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rooms = sqlx::query_as::<_, TeamRoom>(&sql(&format!(
        r#"
            SELECT
                {TEAM_ROOM_COLUMNS}
            FROM
                team_rooms
            WHERE
                creator_team_id = ANY(?)
                OR opponent_team_id = ANY(?)
        "#
    )))
    .bind(team_ids)
    .bind(team_ids)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rooms)
}

pub async fn bookings_on(
    tx: &mut Transaction<'_, Postgres>,
    team_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<TeamRoom>, sqlx::Error> {
    let rooms = sqlx::query_as::<_, TeamRoom>(&sql(&format!(
        r#"
            SELECT
                {TEAM_ROOM_COLUMNS}
            FROM
                team_rooms
            WHERE
                (creator_team_id = ? OR opponent_team_id = ?)
                AND scheduled_date = ?
                AND status <> ?
        "#
    )))
    .bind(team_id)
    .bind(team_id)
    .bind(date)
    .bind(TeamRoomStatus::Cancelled)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rooms)
}

pub async fn search_rooms(
    tx: &mut Transaction<'_, Postgres>,
    text: &str,
    limit: i64,
) -> Result<Vec<TeamRoom>, sqlx::Error> {
    let Some(pattern) = name_pattern(Some(text)) else {
        return Ok(Vec::new());
    };

    let rooms = sqlx::query_as::<_, TeamRoom>(&sql(&format!(
        r#"
            SELECT
                {TEAM_ROOM_COLUMNS}
            FROM
                team_rooms
            WHERE
                status <> 'CANCELLED'
                AND (
                    EXISTS (
                        SELECT 1 FROM branches b
                        WHERE b.id = team_rooms.branch_id AND b.name ILIKE ?
                    )
                    OR EXISTS (
                        SELECT 1 FROM teams t
                        WHERE t.id IN (team_rooms.creator_team_id, team_rooms.opponent_team_id)
                            AND t.name ILIKE ?
                    )
                )
            ORDER BY
                scheduled_date ASC,
                start_time ASC,
                created_at ASC
            LIMIT ?
        "#
    )))
    .bind(&pattern)
    .bind(&pattern)
    .bind(limit)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rooms)
}
