// Library exports for Arcadia
// This allows integration tests and external code to use Arcadia modules

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repos;
pub mod services;
pub mod state;
