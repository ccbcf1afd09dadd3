//! Payment provider webhook ingestion

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    services::users::UserService,
};

/// The only event that changes state
pub const USER_UPGRADED_EVENT: &str = "user.upgraded";

/// What a webhook delivery did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Upgraded,
    Ignored,
}

#[derive(Clone)]
pub struct WebhookService {
    api_key: String,
    users: UserService,
}

impl WebhookService {
    pub fn new(api_key: impl Into<String>, users: UserService) -> Self {
        Self {
            api_key: api_key.into(),
            users,
        }
    }

    /// Check a presented key against the configured one
    pub fn authorize(&self, api_key: &str) -> ApiResult<()> {
        if api_key != self.api_key {
            warn!("Rejected webhook with an unknown API key");
            return Err(ApiError::Unauthorized("Invalid API key".to_string()));
        }
        Ok(())
    }

    pub async fn handle_subscription_event(
        &self,
        api_key: &str,
        event: &str,
        user_id: Option<&str>,
    ) -> ApiResult<WebhookOutcome> {
        self.authorize(api_key)?;

        if event != USER_UPGRADED_EVENT {
            info!("Ignoring webhook event {:?}", event);
            return Ok(WebhookOutcome::Ignored);
        }

        let user_id = user_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::Validation("User ID is required".to_string()))?;

        // An unparseable ID cannot name a stored user
        let user_id = Uuid::parse_str(user_id)
            .map_err(|_| ApiError::NotFound("User not found".to_string()))?;

        self.users.set_subscription_flag(user_id).await?;
        Ok(WebhookOutcome::Upgraded)
    }
}
