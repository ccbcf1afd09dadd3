//! Credential hashing, session tokens and request authorization

pub mod gate;
pub mod jwt;
pub mod password;

pub use gate::{AuthUser, BearerToken, authenticate, extract_api_key, extract_bearer};
pub use jwt::{JwtService, generate_refresh_token};
pub use password::{hash_password, verify_password};
