use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::models::UserRow;

const COLUMNS: &str =
    "id, email, display_name, role, campus_id, student_class, created_at, updated_at";

pub async fn list_all<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<UserRow>> {
    sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {COLUMNS} FROM users ORDER BY created_at ASC"
    ))
    .fetch_all(executor)
    .await
}

pub async fn get_by_email<'e>(
    executor: impl PgExecutor<'e>,
    email: &str,
) -> Result<Option<UserRow>> {
    sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
    ))
    .bind(email)
    .fetch_optional(executor)
    .await
}

pub async fn count_with_role<'e>(executor: impl PgExecutor<'e>, role: &str) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = $1")
        .bind(role)
        .fetch_one(executor)
        .await?;
    Ok(count)
}

/// Set role (and optionally campus). `campus_id = None` leaves the campus untouched.
pub async fn set_role<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    role: &str,
    campus_id: Option<Uuid>,
) -> Result<Option<UserRow>> {
    sqlx::query_as::<_, UserRow>(&format!(
        r#"
        UPDATE users
        SET role = $2,
            campus_id = COALESCE($3, campus_id),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(role)
    .bind(campus_id)
    .fetch_optional(executor)
    .await
}

pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
