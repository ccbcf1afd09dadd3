//! Domain services sitting between the HTTP handlers and the repositories

pub mod chirps;
pub mod sessions;
pub mod users;
pub mod webhooks;

pub use chirps::{ChirpService, SortOrder, clean_body, sanitize_body};
pub use sessions::{SessionService, SessionTokens};
pub use users::UserService;
pub use webhooks::{WebhookOutcome, WebhookService};
