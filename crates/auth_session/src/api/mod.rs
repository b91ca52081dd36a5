pub mod client;
pub mod models;
pub mod user_api;
