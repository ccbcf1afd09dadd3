//! Chirpy: a small social posting service
//!
//! Users register, log in for a JWT session token plus a refresh token,
//! and post short "chirps". A payment provider webhook upgrades users to
//! Chirpy Red.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
