use sqlx::{PgExecutor, Result};

use crate::models::CampusRow;

pub async fn list_all<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<CampusRow>> {
    sqlx::query_as::<_, CampusRow>(
        r#"
        SELECT id, name, status, created_at, updated_at
        FROM campuses
        ORDER BY name ASC
        "#,
    )
    .fetch_all(executor)
    .await
}
