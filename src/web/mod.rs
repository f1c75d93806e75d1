pub mod handlers;
pub mod pages;
