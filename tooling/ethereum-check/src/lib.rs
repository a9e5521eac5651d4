pub mod checks;
pub mod client;
pub mod config;
pub mod models;
pub mod report;
pub mod service;
