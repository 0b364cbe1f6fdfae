use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::database::{
    models::{Branch, PageRequest},
    utils::sql,
};

const BRANCH_COLUMNS: &str = r#"
    id,
    name,
    address,
    google_maps_url,
    operating_hours_start,
    operating_hours_end,
    contact_phone,
    contact_email,
    latitude,
    longitude,
    is_active,
    created_at,
    updated_at
"#;

pub async fn insert_branch(
    tx: &mut Transaction<'_, Postgres>,
    branch: &Branch,
) -> Result<(), sqlx::Error> {
    sqlx::query(&sql(&format!(
        r#"
            INSERT INTO
                branches ({BRANCH_COLUMNS})
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#
    )))
    .bind(branch.id)
    .bind(&branch.name)
    .bind(&branch.address)
    .bind(&branch.google_maps_url)
    .bind(branch.operating_hours_start)
    .bind(branch.operating_hours_end)
    .bind(&branch.contact_phone)
    .bind(&branch.contact_email)
    .bind(&branch.latitude)
    .bind(&branch.longitude)
    .bind(branch.is_active)
    .bind(branch.created_at)
    .bind(branch.updated_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn update_branch(
    tx: &mut Transaction<'_, Postgres>,
    branch: &Branch,
) -> Result<(), sqlx::Error> {
    sqlx::query(&sql(r#"
            UPDATE
                branches
            SET
                name = ?,
                address = ?,
                google_maps_url = ?,
                operating_hours_start = ?,
                operating_hours_end = ?,
                contact_phone = ?,
                contact_email = ?,
                latitude = ?,
                longitude = ?,
                is_active = ?,
                updated_at = ?
            WHERE
                id = ?
        "#))
    .bind(&branch.name)
    .bind(&branch.address)
    .bind(&branch.google_maps_url)
    .bind(branch.operating_hours_start)
    .bind(branch.operating_hours_end)
    .bind(&branch.contact_phone)
    .bind(&branch.contact_email)
    .bind(&branch.latitude)
    .bind(&branch.longitude)
    .bind(branch.is_active)
    .bind(branch.updated_at)
    .bind(branch.id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn find_branch(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<Branch>, sqlx::Error> {
    let branch = sqlx::query_as::<_, Branch>(&sql(&format!(
        "SELECT {BRANCH_COLUMNS} FROM branches WHERE id = ?"
    )))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(branch)
}

pub async fn find_branches(
    tx: &mut Transaction<'_, Postgres>,
    ids: &[Uuid],
) -> Result<Vec<Branch>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let branches = sqlx::query_as::<_, Branch>(&sql(&format!(
        "SELECT {BRANCH_COLUMNS} FROM branches WHERE id = ANY(?)"
    )))
    .bind(ids)
    .fetch_all(&mut **tx)
    .await?;

    Ok(branches)
}

pub async fn list_active_branches(
    tx: &mut Transaction<'_, Postgres>,
    name: Option<&str>,
    page: PageRequest,
) -> Result<(Vec<Branch>, i64), sqlx::Error> {
    let pattern = name_pattern(name);

    let total = sqlx::query_scalar::<_, i64>(&sql(r#"
            SELECT
                COUNT(*)
            FROM
                branches
            WHERE
                is_active = TRUE
                AND (?::TEXT IS NULL OR name ILIKE ?)
        "#))
    .bind(&pattern)
    .bind(&pattern)
    .fetch_one(&mut **tx)
    .await?;

    let branches = sqlx::query_as::<_, Branch>(&sql(&format!(
        r#"
            SELECT
                {BRANCH_COLUMNS}
            FROM
                branches
            WHERE
                is_active = TRUE
                AND (?::TEXT IS NULL OR name ILIKE ?)
            ORDER BY
                name ASC
            LIMIT ? OFFSET ?
        "#
    )))
    .bind(&pattern)
    .bind(&pattern)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(&mut **tx)
    .await?;

    Ok((branches, total))
}

/// `ILIKE` pattern for a name fragment; blank fragments match everything.
pub(crate) fn name_pattern(name: Option<&str>) -> Option<String> {
    name.map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(|fragment| {
            let escaped = fragment
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{escaped}%")
        })
}

pub async fn search_branches(
    tx: &mut Transaction<'_, Postgres>,
    text: &str,
    limit: i64,
) -> Result<Vec<Branch>, sqlx::Error> {
    let Some(pattern) = name_pattern(Some(text)) else {
        return Ok(Vec::new());
    };

    let branches = sqlx::query_as::<_, Branch>(&sql(&format!(
        r#"
            SELECT
                {BRANCH_COLUMNS}
            FROM
                branches
            WHERE
                is_active = TRUE
                AND (name ILIKE ? OR address ILIKE ?)
            ORDER BY
                name ASC
            LIMIT ?
        "#
    )))
    .bind(&pattern)
    .bind(&pattern)
    .bind(limit)
    .fetch_all(&mut **tx)
    .await?;

    Ok(branches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fragment_matches_everything() {
        assert_eq!(name_pattern(None), None);
        assert_eq!(name_pattern(Some("   ")), None);
    }

    #[test]
    fn fragment_is_wrapped_and_escaped() {
        assert_eq!(name_pattern(Some(" arena ")), Some("%arena%".to_string()));
        assert_eq!(name_pattern(Some("50%_off")), Some("%50\\%\\_off%".to_string()));
    }
}
