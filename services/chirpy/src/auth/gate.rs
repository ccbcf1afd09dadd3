//! Authorization gate: pulls credentials out of the `Authorization` header
//! and resolves session tokens to a user identity.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use tracing::warn;
use uuid::Uuid;

use crate::{
    auth::jwt::JwtService,
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Scheme used for session and refresh tokens
pub const BEARER_SCHEME: &str = "Bearer";

/// Scheme used by the payment provider's webhooks
pub const API_KEY_SCHEME: &str = "ApiKey";

fn extract_credential(headers: &HeaderMap, scheme: &str) -> ApiResult<String> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::AuthHeader("Missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| ApiError::AuthHeader("Malformed Authorization header".to_string()))?;

    let credential = header
        .strip_prefix(scheme)
        .ok_or_else(|| {
            ApiError::AuthHeader(format!("Authorization header must use the {} scheme", scheme))
        })?
        .trim();

    if credential.is_empty() {
        return Err(ApiError::AuthHeader(format!("Empty {} credential", scheme)));
    }

    Ok(credential.to_string())
}

/// Read a `Bearer` token from the request headers
pub fn extract_bearer(headers: &HeaderMap) -> ApiResult<String> {
    extract_credential(headers, BEARER_SCHEME)
}

/// Read an `ApiKey` credential from the request headers
pub fn extract_api_key(headers: &HeaderMap) -> ApiResult<String> {
    extract_credential(headers, API_KEY_SCHEME)
}

/// Resolve the bearer session token in `headers` to a user ID
pub fn authenticate(headers: &HeaderMap, jwt_service: &JwtService) -> ApiResult<Uuid> {
    let token = extract_bearer(headers)?;
    let user_id = jwt_service.validate_session_token(&token)?;

    if user_id.is_nil() {
        return Err(ApiError::Unauthorized("Invalid token".to_string()));
    }

    Ok(user_id)
}

/// Authenticated caller, resolved from a bearer session token
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> ApiResult<Self> {
        authenticate(&parts.headers, &state.jwt_service)
            .map(AuthUser)
            .inspect_err(|e| warn!("Rejected request to {}: {}", parts.uri.path(), e))
    }
}

/// Raw bearer credential, used where the bearer is a refresh token
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> ApiResult<Self> {
        extract_bearer(&parts.headers).map(BearerToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Duration;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer(&headers_with("Bearer abc.def")).unwrap(), "abc.def");
        assert_eq!(extract_bearer(&headers_with("Bearer   padded  ")).unwrap(), "padded");
    }

    #[test]
    fn test_extract_bearer_failures() {
        assert!(matches!(
            extract_bearer(&HeaderMap::new()),
            Err(ApiError::AuthHeader(_))
        ));
        assert!(matches!(
            extract_bearer(&headers_with("Basic dXNlcjpwYXNz")),
            Err(ApiError::AuthHeader(_))
        ));
        assert!(matches!(
            extract_bearer(&headers_with("Bearer ")),
            Err(ApiError::AuthHeader(_))
        ));
    }

    #[test]
    fn test_extract_api_key_uses_its_own_scheme() {
        assert_eq!(extract_api_key(&headers_with("ApiKey f271c8")).unwrap(), "f271c8");
        assert!(matches!(
            extract_api_key(&headers_with("Bearer f271c8")),
            Err(ApiError::AuthHeader(_))
        ));
        assert!(matches!(
            extract_bearer(&headers_with("ApiKey f271c8")),
            Err(ApiError::AuthHeader(_))
        ));
    }

    #[test]
    fn test_authenticate() {
        let jwt_service = JwtService::new("gate-secret");
        let user_id = Uuid::new_v4();
        let token = jwt_service
            .issue_session_token(user_id, Duration::seconds(60))
            .unwrap();

        let headers = headers_with(&format!("Bearer {}", token));
        assert_eq!(authenticate(&headers, &jwt_service).unwrap(), user_id);
    }

    #[test]
    fn test_authenticate_rejects_nil_subject() {
        let jwt_service = JwtService::new("gate-secret");
        let token = jwt_service
            .issue_session_token(Uuid::nil(), Duration::seconds(60))
            .unwrap();

        let headers = headers_with(&format!("Bearer {}", token));
        assert!(matches!(
            authenticate(&headers, &jwt_service),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_authenticate_rejects_bad_token() {
        let jwt_service = JwtService::new("gate-secret");
        let headers = headers_with("Bearer not-a-token");
        assert!(matches!(
            authenticate(&headers, &jwt_service),
            Err(ApiError::InvalidToken(_))
        ));
    }
}
