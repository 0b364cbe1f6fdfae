use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::database::{
    models::{IndividualRoom, PageRequest, Participant, RoomFilter, RoomStatus},
    repositories::branch::name_pattern,
    utils::sql,
};

const ROOM_COLUMNS: &str = r#"
    r.id,
    r.branch_id,
    r.owner_id,
    r.scheduled_date,
    r.start_time,
    r.end_time,
    r.total_slots,
    r.notes,
    r.status,
    r.created_at,
    r.updated_at
"#;

pub async fn insert_room(
    tx: &mut Transaction<'_, Postgres>,
    room: &IndividualRoom,
) -> Result<(), sqlx::Error> {
    sqlx::query(&sql(r#"
            INSERT INTO
                individual_rooms (
                    id,
                    branch_id,
                    owner_id,
                    scheduled_date,
                    start_time,
                    end_time,
                    total_slots,
                    notes,
                    status,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#))
    .bind(room.id)
    .bind(room.branch_id)
    .bind(room.owner_id)
    .bind(room.scheduled_date)
    .bind(room.start_time)
    .bind(room.end_time)
    .bind(room.total_slots)
    .bind(&room.notes)
    .bind(room.status)
    .bind(room.created_at)
    .bind(room.updated_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Only the mutable parts of a room are written back: its status and notes.
pub async fn update_room(
    tx: &mut Transaction<'_, Postgres>,
    room: &IndividualRoom,
) -> Result<(), sqlx::Error> {
    sqlx::query(&sql(r#"
            UPDATE
                individual_rooms
            SET
                status = ?,
                notes = ?,
                updated_at = ?
            WHERE
                id = ?
        "#))
    .bind(room.status)
    .bind(&room.notes)
    .bind(room.updated_at)
    .bind(room.id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn find_room(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<IndividualRoom>, sqlx::Error> {
    let room = sqlx::query_as::<_, IndividualRoom>(&sql(&format!(
        "SELECT {ROOM_COLUMNS} FROM individual_rooms r WHERE r.id = ?"
    )))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(room)
}

/// Reads the room under a row lock held until the transaction ends.
pub async fn lock_room(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<IndividualRoom>, sqlx::Error> {
    let room = sqlx::query_as::<_, IndividualRoom>(&sql(&format!(
        "SELECT {ROOM_COLUMNS} FROM individual_rooms r WHERE r.id = ? FOR UPDATE"
    )))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(room)
}

pub async fn list_rooms(
    tx: &mut Transaction<'_, Postgres>,
    filter: &RoomFilter,
    page: PageRequest,
) -> Result<(Vec<IndividualRoom>, i64), sqlx::Error> {
    const FILTERS: &str = r#"
        r.status <> 'CANCELLED'
        AND (?::UUID IS NULL OR r.branch_id = ?)
        AND (?::VARCHAR IS NULL OR r.status = ?)
        AND (?::DATE IS NULL OR r.scheduled_date >= ?)
        AND (?::DATE IS NULL OR r.scheduled_date <= ?)
    "#;

    let total = sqlx::query_scalar::<_, i64>(&sql(&format!(
        "SELECT COUNT(*) FROM individual_rooms r WHERE {FILTERS}"
    )))
    .bind(filter.branch_id)
    .bind(filter.branch_id)
    .bind(filter.status)
    .bind(filter.status)
    .bind(filter.date_from)
    .bind(filter.date_from)
    .bind(filter.date_to)
    .bind(filter.date_to)
    .fetch_one(&mut **tx)
    .await?;

    let rooms = sqlx::query_as::<_, IndividualRoom>(&sql(&format!(
        r#"
            SELECT
                {ROOM_COLUMNS}
            FROM
                individual_rooms r
            WHERE
                {FILTERS}
            ORDER BY
                r.scheduled_date ASC,
                r.start_time ASC,
                r.created_at ASC
            LIMIT ? OFFSET ?
        "#
    )))
    .bind(filter.branch_id)
    .bind(filter.branch_id)
    .bind(filter.status)
    .bind(filter.status)
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

pub async fn rooms_of_user(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<Vec<IndividualRoom>, sqlx::Error> {
    let rooms = sqlx::query_as::<_, IndividualRoom>(&sql(&format!(
        r#"
            SELECT
                {ROOM_COLUMNS}
            FROM
                individual_rooms r
                INNER JOIN individual_room_participants p ON p.room_id = r.id
            WHERE
                p.user_id = ?
        "#
    )))
    .bind(user_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rooms)
}

pub async fn bookings_on(
    tx: &mut Transaction<'_, Postgres>,
    user_ids: &[Uuid],
    date: NaiveDate,
) -> Result<Vec<IndividualRoom>, sqlx::Error> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rooms = sqlx::query_as::<_, IndividualRoom>(&sql(&format!(
        r#"
            SELECT DISTINCT
                {ROOM_COLUMNS}
            FROM
                individual_rooms r
                INNER JOIN individual_room_participants p ON p.room_id = r.id
            WHERE
                p.user_id = ANY(?)
                AND r.scheduled_date = ?
                AND r.status <> ?
        "#
    )))
    .bind(user_ids)
    .bind(date)
    .bind(RoomStatus::Cancelled)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rooms)
}

pub async fn insert_participant(
    tx: &mut Transaction<'_, Postgres>,
    participant: &Participant,
) -> Result<(), sqlx::Error> {
    sqlx::query(&sql(r#"
            INSERT INTO
                individual_room_participants (room_id, user_id, joined_at)
            VALUES
                (?, ?, ?)
        "#))
    .bind(participant.room_id)
    .bind(participant.user_id)
    .bind(participant.joined_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn delete_participant(
    tx: &mut Transaction<'_, Postgres>,
    room_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(&sql(r#"
            DELETE FROM
                individual_room_participants
            WHERE
                room_id = ?
                AND user_id = ?
        "#))
    .bind(room_id)
    .bind(user_id)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn is_participant(
    tx: &mut Transaction<'_, Postgres>,
    room_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let exists = sqlx::query_scalar::<_, bool>(&sql(r#"
            SELECT
                EXISTS (
                    SELECT 1
                    FROM individual_room_participants
                    WHERE room_id = ? AND user_id = ?
                )
        "#))
    .bind(room_id)
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(exists)
}

pub async fn count_participants(
    tx: &mut Transaction<'_, Postgres>,
    room_id: Uuid,
) -> Result<i64, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>(&sql(r#"
            SELECT
                COUNT(*)
            FROM
                individual_room_participants
            WHERE
                room_id = ?
        "#))
    .bind(room_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(count)
}

pub async fn list_participants(
    tx: &mut Transaction<'_, Postgres>,
    room_id: Uuid,
) -> Result<Vec<Participant>, sqlx::Error> {
    let participants = sqlx::query_as::<_, Participant>(&sql(r#"
            SELECT
                room_id,
                user_id,
                joined_at
            FROM
                individual_room_participants
            WHERE
                room_id = ?
            ORDER BY
                joined_at ASC
        "#))
    .bind(room_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(participants)
}

pub async fn participant_counts(
    tx: &mut Transaction<'_, Postgres>,
    room_ids: &[Uuid],
) -> Result<HashMap<Uuid, i64>, sqlx::Error> {
    if room_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, (Uuid, i64)>(&sql(r#"
            SELECT
                room_id,
                COUNT(*)
            FROM
                individual_room_participants
            WHERE
                room_id = ANY(?)
            GROUP BY
                room_id
        "#))
    .bind(room_ids)
    .fetch_all(&mut **tx)
    .await?;

    let mut counts: HashMap<Uuid, i64> = room_ids.iter().map(|id| (*id, 0)).collect();
    counts.extend(rows);
    Ok(counts)
}

pub async fn search_rooms(
    tx: &mut Transaction<'_, Postgres>,
    text: &str,
    limit: i64,
) -> Result<Vec<IndividualRoom>, sqlx::Error> {
    let Some(pattern) = name_pattern(Some(text)) else {
        return Ok(Vec::new());
    };

    let rooms = sqlx::query_as::<_, IndividualRoom>(&sql(&format!(
        r#"
            SELECT
                {ROOM_COLUMNS}
            FROM
                individual_rooms r
                INNER JOIN branches b ON b.id = r.branch_id
                INNER JOIN users u ON u.id = r.owner_id
            WHERE
                r.status <> 'CANCELLED'
                AND (
                    b.name ILIKE ?
                    OR u.display_name ILIKE ?
                    OR r.notes ILIKE ?
                )
            ORDER BY
                r.scheduled_date ASC,
                r.start_time ASC,
                r.created_at ASC
            LIMIT ?
        "#
    )))
    .bind(&pattern)
    .bind(&pattern)
    .bind(&pattern)
    .bind(limit)
    .fetch_all(&mut **tx)
    .await?;

    Ok(rooms)
}
