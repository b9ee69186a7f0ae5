pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod gql;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use state::AppState;
