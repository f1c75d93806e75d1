pub mod audit;
pub mod common;
pub mod home;
pub mod purchases;
pub mod sales;
pub mod stock;
