//! Chirp storage rules and moderation

use std::sync::{Arc, OnceLock};

use chrono::Utc;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::Chirp,
    repositories::{ChirpRepository, UserRepository},
};

/// Longest accepted chirp, in characters
pub const MAX_CHIRP_LENGTH: usize = 140;

/// Replacement for a word containing a banned term
pub const PROFANITY_MASK: &str = "****";

fn profanity_regex() -> &'static Regex {
    static PROFANITY_REGEX: OnceLock<Regex> = OnceLock::new();
    PROFANITY_REGEX.get_or_init(|| {
        Regex::new(r"(?i)kerfuffle|sharbert|fornax").expect("Failed to compile profanity regex")
    })
}

/// Mask every space-separated word that contains a banned term
pub fn sanitize_body(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            if profanity_regex().is_match(word) {
                PROFANITY_MASK
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reject over-long bodies, then sanitize
pub fn clean_body(body: &str) -> ApiResult<String> {
    if body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(ApiError::Validation("Chirp is too long".to_string()));
    }

    Ok(sanitize_body(body))
}

/// Listing order by creation time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// `desc` sorts newest first; anything else, including nothing, is ascending
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

/// Chirp store
#[derive(Clone)]
pub struct ChirpService {
    chirps: Arc<dyn ChirpRepository>,
    users: Arc<dyn UserRepository>,
}

impl ChirpService {
    pub fn new(chirps: Arc<dyn ChirpRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { chirps, users }
    }

    pub async fn create(&self, user_id: Uuid, body: &str) -> ApiResult<Chirp> {
        let body = clean_body(body)?;

        if self.users.find_by_id(user_id).await?.is_none() {
            warn!("Chirp author {} does not exist", user_id);
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        let chirp = self.chirps.create(&Chirp::new(user_id, body)).await?;
        info!("User {} created chirp {}", user_id, chirp.id);
        Ok(chirp)
    }

    /// Replace a chirp's body. Ownership is not checked on this path.
    pub async fn update(&self, chirp_id: Uuid, body: &str) -> ApiResult<Chirp> {
        let body = clean_body(body)?;

        self.get_by_id(chirp_id).await?;

        let chirp = self
            .chirps
            .update_body(chirp_id, &body, Utc::now())
            .await?
            .ok_or_else(|| ApiError::NotFound("Chirp not found".to_string()))?;

        info!("Updated chirp {}", chirp.id);
        Ok(chirp)
    }

    /// Permanently delete a chirp owned by `caller`
    pub async fn delete(&self, chirp_id: Uuid, caller: Uuid) -> ApiResult<()> {
        let chirp = self.get_by_id(chirp_id).await?;

        if chirp.user_id != caller {
            warn!(
                "User {} tried to delete chirp {} owned by {}",
                caller, chirp.id, chirp.user_id
            );
            return Err(ApiError::Forbidden(
                "You are not authorized to delete this chirp".to_string(),
            ));
        }

        if !self.chirps.delete(chirp_id).await? {
            return Err(ApiError::NotFound("Chirp not found".to_string()));
        }

        info!("User {} deleted chirp {}", caller, chirp_id);
        Ok(())
    }

    /// All chirps, optionally restricted to one author, ordered by creation time
    pub async fn list(&self, author_id: Option<Uuid>, order: SortOrder) -> ApiResult<Vec<Chirp>> {
        let mut chirps: Vec<Chirp> = self
            .chirps
            .list()
            .await?
            .into_iter()
            .filter(|chirp| author_id.is_none_or(|author| chirp.user_id == author))
            .collect();

        // Both sorts are stable, so equal timestamps keep store order
        match order {
            SortOrder::Asc => chirps.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortOrder::Desc => chirps.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }

        Ok(chirps)
    }

    pub async fn get_by_id(&self, chirp_id: Uuid) -> ApiResult<Chirp> {
        self.chirps
            .find_by_id(chirp_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Chirp not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::User, repositories::MemoryStore};
    use chrono::{Duration, TimeZone};

    async fn setup() -> (ChirpService, MemoryStore, User, User) {
        let store = MemoryStore::new();
        let alice = UserRepository::create(&store, &User::new("a@x.io".into(), "h".into()))
            .await
            .unwrap();
        let bob = UserRepository::create(&store, &User::new("b@x.io".into(), "h".into()))
            .await
            .unwrap();
        let service = ChirpService::new(Arc::new(store.clone()), Arc::new(store.clone()));
        (service, store, alice, bob)
    }

    #[test]
    fn test_sanitize_body() {
        assert_eq!(sanitize_body("This is a kerfuffle"), "This is a ****");
        assert_eq!(sanitize_body("SHARBERT!"), "****");
        assert_eq!(
            sanitize_body("I hear Mastodon is better than Chirpy. sharbert I need to migrate"),
            "I hear Mastodon is better than Chirpy. **** I need to migrate"
        );
        assert_eq!(sanitize_body("Fornaxes  everywhere"), "****  everywhere");
        assert_eq!(sanitize_body("nothing to see here"), "nothing to see here");
        assert_eq!(sanitize_body(""), "");
    }

    #[test]
    fn test_length_boundary() {
        assert!(clean_body(&"a".repeat(MAX_CHIRP_LENGTH)).is_ok());
        assert!(matches!(
            clean_body(&"a".repeat(MAX_CHIRP_LENGTH + 1)),
            Err(ApiError::Validation(_))
        ));
        // Characters, not bytes
        assert!(clean_body(&"é".repeat(MAX_CHIRP_LENGTH)).is_ok());
    }

    #[test]
    fn test_sort_order_from_query() {
        assert_eq!(SortOrder::from_query(Some("desc")), SortOrder::Desc);
        assert_eq!(SortOrder::from_query(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::from_query(Some("")), SortOrder::Asc);
        assert_eq!(SortOrder::from_query(Some("sideways")), SortOrder::Asc);
        assert_eq!(SortOrder::from_query(None), SortOrder::Asc);
    }

    #[tokio::test]
    async fn test_create_sanitizes_and_checks_author() {
        let (service, _, alice, _) = setup().await;

        let chirp = service.create(alice.id, "what a kerfuffle").await.unwrap();
        assert_eq!(chirp.body, "what a ****");
        assert_eq!(chirp.user_id, alice.id);

        assert!(matches!(
            service.create(Uuid::new_v4(), "ghost").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_sorting_and_filtering() {
        let (service, store, alice, bob) = setup().await;
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        // Stored out of order on purpose
        for (owner, offset, body) in [
            (alice.id, 2, "third"),
            (bob.id, 0, "first"),
            (alice.id, 1, "second"),
        ] {
            let mut chirp = Chirp::new(owner, body.to_string());
            chirp.created_at = t1 + Duration::minutes(offset);
            ChirpRepository::create(&store, &chirp).await.unwrap();
        }

        let bodies = |chirps: Vec<Chirp>| chirps.into_iter().map(|c| c.body).collect::<Vec<_>>();

        assert_eq!(
            bodies(service.list(None, SortOrder::Asc).await.unwrap()),
            vec!["first", "second", "third"]
        );
        assert_eq!(
            bodies(service.list(None, SortOrder::Desc).await.unwrap()),
            vec!["third", "second", "first"]
        );
        assert_eq!(
            bodies(service.list(Some(alice.id), SortOrder::Desc).await.unwrap()),
            vec!["third", "second"]
        );
        assert!(
            service
                .list(Some(Uuid::new_v4()), SortOrder::Asc)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_delete_by_non_owner_is_forbidden() {
        let (service, _, alice, bob) = setup().await;
        let chirp = service.create(alice.id, "mine").await.unwrap();

        assert!(matches!(
            service.delete(chirp.id, bob.id).await,
            Err(ApiError::Forbidden(_))
        ));
        assert_eq!(service.get_by_id(chirp.id).await.unwrap().body, "mine");

        service.delete(chirp.id, alice.id).await.unwrap();
        assert!(matches!(
            service.get_by_id(chirp.id).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(chirp.id, alice.id).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_ignores_ownership() {
        let (service, _, alice, _) = setup().await;
        let chirp = service.create(alice.id, "draft").await.unwrap();

        let updated = service.update(chirp.id, "final fornax").await.unwrap();
        assert_eq!(updated.body, "final ****");
        assert_eq!(updated.user_id, alice.id);

        assert!(matches!(
            service.update(Uuid::new_v4(), "nope").await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            service.update(chirp.id, &"x".repeat(141)).await,
            Err(ApiError::Validation(_))
        ));
    }
}
