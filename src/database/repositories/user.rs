use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::database::{models::UserSummary, utils::sql};

pub async fn user_exists(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let exists = sqlx::query_scalar::<_, bool>(&sql(r#"
            SELECT
                EXISTS (
                    SELECT 1 FROM users WHERE id = ?
                )
        "#))
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(exists)
}

pub async fn find_users(
    tx: &mut Transaction<'_, Postgres>,
    ids: &[Uuid],
) -> Result<Vec<UserSummary>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let users = sqlx::query_as::<_, UserSummary>(&sql(r#"
            SELECT
                id,
                display_name
            FROM
                users
            WHERE
                id = ANY(?)
        "#))
    .bind(ids)
    .fetch_all(&mut **tx)
    .await?;

    Ok(users)
}

/// Mirrors an account from the identity provider so rooms and teams can
/// reference it.
pub async fn upsert_user(
    tx: &mut Transaction<'_, Postgres>,
    user: &UserSummary,
) -> Result<(), sqlx::Error> {
    sqlx::query(&sql(r#"
            INSERT INTO
                users (id, display_name)
            VALUES
                (?, ?)
            ON CONFLICT (id) DO UPDATE
            SET
                display_name = EXCLUDED.display_name
        "#))
    .bind(user.id)
    .bind(&user.display_name)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
