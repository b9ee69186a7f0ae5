use sqlx::{PgExecutor, Result};

use crate::models::TransactionRow;

pub async fn list_all<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<TransactionRow>> {
    sqlx::query_as::<_, TransactionRow>(
        r#"
        SELECT id, campus_id, kind, amount, description, date
        FROM transactions
        ORDER BY date DESC
        "#,
    )
    .fetch_all(executor)
    .await
}
