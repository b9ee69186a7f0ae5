use sqlx::{PgExecutor, Result};

use crate::models::{BookRow, BorrowedBookRow};

pub async fn list_all<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<BookRow>> {
    sqlx::query_as::<_, BookRow>(
        r#"
        SELECT id, title, author, category, campus_id, status, created_at
        FROM books
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn list_all_borrows<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<BorrowedBookRow>> {
    sqlx::query_as::<_, BorrowedBookRow>(
        r#"
        SELECT id, user_id, book_id, campus_id, category, borrowed_at, returned_at,
               fine_amount, fine_status
        FROM borrowed_books
        "#,
    )
    .fetch_all(executor)
    .await
}
