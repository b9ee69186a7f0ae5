use async_graphql::ErrorExtensions;

use crate::error::ErrorCode;

/// Storage failures as seen by GraphQL clients: the detail is logged and a
/// sanitized message is returned.
///
/// async-graphql has a blanket `impl<T: Display + Send + Sync + 'static> From<T> for Error`,
/// so a bare `?` would leak the driver message without a `code`. Prefer
/// [`DbResultExt::db_err`], [`coded`] or [`IntoGqlError`].
#[derive(Debug)]
pub struct GqlError(sqlx::Error);

impl std::fmt::Display for GqlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        tracing::error!("Database error: {}", self.0);
        write!(f, "Internal database error")
    }
}

impl std::error::Error for GqlError {}

impl From<sqlx::Error> for GqlError {
    fn from(e: sqlx::Error) -> Self {
        GqlError(e)
    }
}

impl ErrorExtensions for GqlError {
    fn extend(&self) -> async_graphql::Error {
        coded(ErrorCode::Internal, self.to_string())
    }
}

/// Build a GraphQL error carrying `code` in its extensions.
pub fn coded(code: ErrorCode, message: impl Into<String>) -> async_graphql::Error {
    async_graphql::Error::new(message).extend_with(|_, e| e.set("code", code.as_str()))
}

/// Domain errors that know which client-facing code they map to.
pub trait IntoGqlError {
    fn code(&self) -> ErrorCode;

    fn into_gql(self) -> async_graphql::Error
    where
        Self: std::fmt::Display + Sized,
    {
        coded(self.code(), self.to_string())
    }
}

/// `map_err` shorthand for domain errors implementing [`IntoGqlError`].
pub trait DomainResultExt<T> {
    fn into_gql(self) -> async_graphql::Result<T>;
}

impl<T, E> DomainResultExt<T> for std::result::Result<T, E>
where
    E: IntoGqlError + std::fmt::Display,
{
    fn into_gql(self) -> async_graphql::Result<T> {
        self.map_err(IntoGqlError::into_gql)
    }
}

/// Usage: `state.games().list().await.db_err()?`
pub trait DbResultExt<T> {
    fn db_err(self) -> async_graphql::Result<T>;
}

impl<T> DbResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn db_err(self) -> async_graphql::Result<T> {
        self.map_err(|e| GqlError::from(e).extend())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_are_sanitized_and_coded() {
        let result: Result<(), sqlx::Error> = Err(sqlx::Error::RowNotFound);
        let err = result.db_err().unwrap_err();

        assert_eq!(err.message, "Internal database error");
        let code = err
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .cloned();
        assert_eq!(code, Some(async_graphql::Value::from("internal")));
    }
}
