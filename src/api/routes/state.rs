use crate::database::Database;

/// Shared application state passed to all Axum handlers via `.with_state()`.
///
/// Holds the connection pool; each handler checks out one connection for the
/// duration of its request.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}
