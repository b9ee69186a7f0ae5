use sqlx::{PgExecutor, Result};
use uuid::Uuid;

use crate::models::GameRow;

#[derive(Debug, Clone)]
pub struct CreateGameData {
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateGameData {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<GameRow>> {
    sqlx::query_as::<_, GameRow>(
        r#"
        SELECT id, name, description, image_url, created_at, updated_at
        FROM games
        ORDER BY name ASC
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn get_by_id<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<Option<GameRow>> {
    sqlx::query_as::<_, GameRow>(
        r#"
        SELECT id, name, description, image_url, created_at, updated_at
        FROM games
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn create<'e>(executor: impl PgExecutor<'e>, data: CreateGameData) -> Result<GameRow> {
    sqlx::query_as::<_, GameRow>(
        r#"
        INSERT INTO games (name, description, image_url)
        VALUES ($1, $2, $3)
        RETURNING id, name, description, image_url, created_at, updated_at
        "#,
    )
    .bind(data.name)
    .bind(data.description)
    .bind(data.image_url)
    .fetch_one(executor)
    .await
}

pub async fn update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    data: UpdateGameData,
) -> Result<Option<GameRow>> {
    sqlx::query_as::<_, GameRow>(
        r#"
        UPDATE games
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            image_url = COALESCE($4, image_url),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, name, description, image_url, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(data.name)
    .bind(data.description)
    .bind(data.image_url)
    .fetch_optional(executor)
    .await
}

pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM games WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
