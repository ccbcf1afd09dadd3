//! Application state shared across handlers

use std::sync::Arc;

use crate::{
    auth::JwtService,
    config::AppConfig,
    metrics::HitCounter,
    repositories::Repositories,
    services::{ChirpService, SessionService, UserService, WebhookService},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt_service: JwtService,
    pub users: UserService,
    pub chirps: ChirpService,
    pub sessions: SessionService,
    pub webhooks: WebhookService,
    pub hits: HitCounter,
}

impl AppState {
    /// Wire the services over a set of repositories
    pub fn new(config: AppConfig, repositories: Repositories) -> Self {
        let jwt_service = JwtService::new(&config.token_secret);
        let sessions = SessionService::new(repositories.refresh_tokens, jwt_service.clone());
        let users = UserService::new(
            repositories.users.clone(),
            sessions.clone(),
            config.default_token_ttl(),
        );
        let chirps = ChirpService::new(repositories.chirps, repositories.users);
        let webhooks = WebhookService::new(config.polka_key.clone(), users.clone());

        Self {
            config: Arc::new(config),
            jwt_service,
            users,
            chirps,
            sessions,
            webhooks,
            hits: HitCounter::new(),
        }
    }
}
