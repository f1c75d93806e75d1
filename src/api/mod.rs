pub mod routes;

// Re-export route handlers for convenience
pub use routes::app;
pub use routes::audit;
pub use routes::exports;
pub use routes::inventory;
pub use routes::state::AppState;
