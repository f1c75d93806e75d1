pub mod app;
pub mod audit;
pub mod common;
pub mod exports;
pub mod inventory;
pub mod state;
