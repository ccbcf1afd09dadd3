//! Chirpy domain models

pub mod chirp;
pub mod refresh_token;
pub mod requests;
pub mod user;

// Re-export for convenience
pub use chirp::{Chirp, ChirpResponse};
pub use refresh_token::RefreshToken;
pub use requests::{
    ChirpBody, ChirpListQuery, CleanedChirp, CreateUserRequest, LoginRequest, TokenResponse,
    UpdateChirpRequest, UpdateUserRequest, WebhookRequest,
};
pub use user::{UpdateUser, User, UserResponse};
