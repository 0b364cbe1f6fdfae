use std::collections::HashMap;

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::database::{
    models::{PageRequest, Team, TeamMember, TeamStatus},
    repositories::branch::name_pattern,
    utils::sql,
};

const TEAM_COLUMNS: &str = r#"
    t.id,
    t.name,
    t.description,
    t.logo_url,
    t.captain_id,
    t.roster_size,
    t.status,
    t.created_at,
    t.updated_at
"#;

// Team management methods
pub async fn insert_team(
    tx: &mut Transaction<'_, Postgres>,
    team: &Team,
) -> Result<(), sqlx::Error> {
    sqlx::query(&sql(r#"
            INSERT INTO
                teams (
                    id,
                    name,
                    description,
                    logo_url,
                    captain_id,
                    roster_size,
                    status,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#))
    .bind(team.id)
    .bind(&team.name)
    .bind(&team.description)
    .bind(&team.logo_url)
    .bind(team.captain_id)
    .bind(team.roster_size)
    .bind(team.status)
    .bind(team.created_at)
    .bind(team.updated_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn update_team(
    tx: &mut Transaction<'_, Postgres>,
    team: &Team,
) -> Result<(), sqlx::Error> {
    sqlx::query(&sql(r#"
            UPDATE
                teams
            SET
                name = ?,
                description = ?,
                logo_url = ?,
                captain_id = ?,
                status = ?,
                updated_at = ?
            WHERE
                id = ?
        "#))
    .bind(&team.name)
    .bind(&team.description)
    .bind(&team.logo_url)
    .bind(team.captain_id)
    .bind(team.status)
    .bind(team.updated_at)
    .bind(team.id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn find_team(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<Team>, sqlx::Error> {
    let team = sqlx::query_as::<_, Team>(&sql(&format!(
        "SELECT {TEAM_COLUMNS} FROM teams t WHERE t.id = ?"
    )))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(team)
}

/// Reads the team under a row lock; roster changes and room bookings for the
/// same team queue behind it.
pub async fn lock_team(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<Team>, sqlx::Error> {
    let team = sqlx::query_as::<_, Team>(&sql(&format!(
        "SELECT {TEAM_COLUMNS} FROM teams t WHERE t.id = ? FOR UPDATE"
    )))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(team)
}

pub async fn find_teams(
    tx: &mut Transaction<'_, Postgres>,
    ids: &[Uuid],
) -> Result<Vec<Team>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let teams = sqlx::query_as::<_, Team>(&sql(&format!(
        "SELECT {TEAM_COLUMNS} FROM teams t WHERE t.id = ANY(?)"
    )))
    .bind(ids)
    .fetch_all(&mut **tx)
    .await?;

    Ok(teams)
}

pub async fn list_active_teams(
    tx: &mut Transaction<'_, Postgres>,
    name: Option<&str>,
    page: PageRequest,
) -> Result<(Vec<Team>, i64), sqlx::Error> {
    let pattern = name_pattern(name);

    let total = sqlx::query_scalar::<_, i64>(&sql(r#"
            SELECT
                COUNT(*)
            FROM
                teams t
            WHERE
                t.status = ?
                AND (?::TEXT IS NULL OR t.name ILIKE ?)
        "#))
    .bind(TeamStatus::Active)
    .bind(&pattern)
    .bind(&pattern)
    .fetch_one(&mut **tx)
    .await?;

    let teams = sqlx::query_as::<_, Team>(&sql(&format!(
        r#"
            SELECT
                {TEAM_COLUMNS}
            FROM
                teams t
            WHERE
                t.status = ?
                AND (?::TEXT IS NULL OR t.name ILIKE ?)
            ORDER BY
                t.name ASC
            LIMIT ? OFFSET ?
        "#
    )))
    .bind(TeamStatus::Active)
    .bind(&pattern)
    .bind(&pattern)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(&mut **tx)
    .await?;

    Ok((teams, total))
}

pub async fn teams_captained_by(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<Vec<Team>, sqlx::Error> {
    let teams = sqlx::query_as::<_, Team>(&sql(&format!(
        r#"
            SELECT
                {TEAM_COLUMNS}
            FROM
                teams t
            WHERE
                t.captain_id = ?
                AND t.status = ?
            ORDER BY
                t.created_at DESC
        "#
    )))
    .bind(user_id)
    .bind(TeamStatus::Active)
    .fetch_all(&mut **tx)
    .await?;

    Ok(teams)
}

pub async fn teams_of_member(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<Vec<Team>, sqlx::Error> {
    let teams = sqlx::query_as::<_, Team>(&sql(&format!(
        r#"
            SELECT
                {TEAM_COLUMNS}
            FROM
                teams t
                INNER JOIN team_members m ON m.team_id = t.id
            WHERE
                m.user_id = ?
                AND t.status = ?
            ORDER BY
                t.name ASC
        "#
    )))
    .bind(user_id)
    .bind(TeamStatus::Active)
    .fetch_all(&mut **tx)
    .await?;

    Ok(teams)
}

pub async fn team_ids_of_user(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<Vec<Uuid>, sqlx::Error> {
    let ids = sqlx::query_scalar::<_, Uuid>(&sql(r#"
            SELECT
                team_id
            FROM
                team_members
            WHERE
                user_id = ?
        "#))
    .bind(user_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(ids)
}

// Team member management methods
pub async fn insert_member(
    tx: &mut Transaction<'_, Postgres>,
    member: &TeamMember,
) -> Result<(), sqlx::Error> {
    sqlx::query(&sql(r#"
            INSERT INTO
                team_members (team_id, user_id, joined_at)
            VALUES
                (?, ?, ?)
        "#))
    .bind(member.team_id)
    .bind(member.user_id)
    .bind(member.joined_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn delete_member(
    tx: &mut Transaction<'_, Postgres>,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(&sql(r#"
            DELETE FROM
                team_members
            WHERE
                team_id = ?
                AND user_id = ?
        "#))
    .bind(team_id)
    .bind(user_id)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn is_member(
    tx: &mut Transaction<'_, Postgres>,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let exists = sqlx::query_scalar::<_, bool>(&sql(r#"
            SELECT
                EXISTS (
                    SELECT 1
                    FROM team_members
                    WHERE team_id = ? AND user_id = ?
                )
        "#))
    .bind(team_id)
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(exists)
}

pub async fn count_members(
    tx: &mut Transaction<'_, Postgres>,
    team_id: Uuid,
) -> Result<i64, sqlx::Error> {
    let count = sqlx::query_scalar::<_, i64>(&sql(r#"
            SELECT
                COUNT(*)
            FROM
                team_members
            WHERE
                team_id = ?
        "#))
    .bind(team_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(count)
}

pub async fn list_members(
    tx: &mut Transaction<'_, Postgres>,
    team_id: Uuid,
) -> Result<Vec<TeamMember>, sqlx::Error> {
    let members = sqlx::query_as::<_, TeamMember>(&sql(r#"
            SELECT
                team_id,
                user_id,
                joined_at
            FROM
                team_members
            WHERE
                team_id = ?
            ORDER BY
                joined_at ASC
        "#))
    .bind(team_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(members)
}

pub async fn member_counts(
    tx: &mut Transaction<'_, Postgres>,
    team_ids: &[Uuid],
) -> Result<HashMap<Uuid, i64>, sqlx::Error> {
    if team_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, (Uuid, i64)>(&sql(r#"
            SELECT
                team_id,
                COUNT(*)
            FROM
                team_members
            WHERE
                team_id = ANY(?)
            GROUP BY
                team_id
        "#))
    .bind(team_ids)
    .fetch_all(&mut **tx)
    .await?;

    let mut counts: HashMap<Uuid, i64> = team_ids.iter().map(|id| (*id, 0)).collect();
    counts.extend(rows);
    Ok(counts)
}

pub async fn search_teams(
    tx: &mut Transaction<'_, Postgres>,
    text: &str,
    limit: i64,
) -> Result<Vec<Team>, sqlx::Error> {
    let Some(pattern) = name_pattern(Some(text)) else {
        return Ok(Vec::new());
    };

    let teams = sqlx::query_as::<_, Team>(&sql(&format!(
        r#"
            SELECT
                {TEAM_COLUMNS}
            FROM
                teams t
            WHERE
                t.status = ?
                AND (t.name ILIKE ? OR t.description ILIKE ?)
            ORDER BY
                t.name ASC
            LIMIT ?
        "#
    )))
    .bind(TeamStatus::Active)
    .bind(&pattern)
    .bind(&pattern)
    .bind(limit)
    .fetch_all(&mut **tx)
    .await?;

    Ok(teams)
}
