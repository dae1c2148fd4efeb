// ==============================================================================
// lib.rs - Weather API Gateway Library
// ==============================================================================
// Description: Request processing pipeline (auth gate, correlation logging,
//              response envelope) and the user/weather endpoints behind it
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod security;
pub mod state;
pub mod store;
pub mod validator;
pub mod weather;

pub use config::Config;
pub use routes::build_router;
pub use state::AppState;
