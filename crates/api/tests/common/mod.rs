#![allow(dead_code)]

use std::env;

use api::auth::{AuthConfig, Claims};
use api::config::ServiceConfig;
use api::gql::{build_schema, AppSchema};
use api::AppState;
use async_graphql::{Request, Variables};
use chrono::{Duration, FixedOffset, NaiveDate, Utc};
use infra::repos::CreateGameData;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret-for-integration-tests";

/// State over the in-process stores; nothing here needs PostgreSQL.
pub fn test_state() -> AppState {
    AppState::in_memory(AuthConfig::with_secret(TEST_SECRET), ServiceConfig::default())
        .expect("Failed to create AppState")
}

pub fn test_schema() -> (AppState, AppSchema) {
    let state = test_state();
    let schema = build_schema(state.clone());
    (state, schema)
}

/// State over the PostgreSQL database at `TEST_DATABASE_URL`, migrated to the
/// current schema. Returns `None` when the variable is unset so the suite
/// still runs on machines without a database.
pub async fn setup_test_db() -> Option<AppState> {
    let Ok(database_url) = env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL is not set; skipping PostgreSQL test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let state = AppState::postgres(
        pool,
        AuthConfig::with_secret(TEST_SECRET),
        ServiceConfig::default(),
    )
    .expect("Failed to create AppState");
    Some(state)
}

/// Insert a user row with a unique email and return its id and email.
pub async fn create_db_user(state: &AppState, display_name: &str) -> (Uuid, String) {
    let user_id = Uuid::new_v4();
    let email = format!("{user_id}@okul.edu.tr");

    sqlx::query(
        "INSERT INTO users (id, email, display_name, role, student_class) VALUES ($1, $2, $3, 'user', '9-A')",
    )
    .bind(user_id)
    .bind(&email)
    .bind(display_name)
    .execute(&state.db)
    .await
    .expect("Failed to create test user");

    (user_id, email)
}

/// Helper function to execute GraphQL queries and mutations
pub async fn execute_graphql(
    schema: &AppSchema,
    query: &str,
    variables: Option<Variables>,
    auth_claims: Option<Claims>,
) -> async_graphql::Response {
    let mut request = Request::new(query);

    if let Some(vars) = variables {
        request = request.variables(vars);
    }

    if let Some(claims) = auth_claims {
        request = request.data(claims);
    }

    schema.execute(request).await
}

/// Fresh user id plus JWT claims for `role`.
pub fn test_user(role: &str) -> (Uuid, Claims) {
    let user_id = Uuid::new_v4();
    let claims = Claims::new(
        user_id,
        format!("{role}-{user_id}@okul.edu.tr"),
        role.to_string(),
        None,
        60,
    );
    (user_id, claims)
}

pub async fn create_test_game(state: &AppState, name: &str) -> Uuid {
    state
        .games()
        .create(CreateGameData {
            name: name.to_string(),
            description: format!("{name} kutu oyunu"),
            image_url: None,
        })
        .await
        .expect("Failed to create test game")
        .id
}

/// A campus-local date safely in the future.
pub fn upcoming_date(offset: FixedOffset) -> NaiveDate {
    (Utc::now() + Duration::days(7))
        .with_timezone(&offset)
        .date_naive()
}

/// `code` extension of the first error, if any.
pub fn first_error_code(response: &async_graphql::Response) -> Option<String> {
    let error = response.errors.first()?;
    let extensions = error.extensions.as_ref()?;
    match extensions.get("code")? {
        async_graphql::Value::String(code) => Some(code.clone()),
        _ => None,
    }
}

pub fn assert_no_errors(response: &async_graphql::Response) {
    if !response.errors.is_empty() {
        panic!("GraphQL errors: {:?}", response.errors);
    }
}
