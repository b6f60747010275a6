pub mod download;
pub mod models;
pub mod routes;
pub mod services;
