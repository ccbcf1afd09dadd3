//! Chirpy HTTP routes

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    AppState,
    auth::{AuthUser, BearerToken, authenticate, extract_api_key},
    error::{ApiError, ApiResult},
    extract::JsonBody,
    metrics::render_admin_metrics,
    middleware::count_hits,
    models::{
        ChirpBody, ChirpListQuery, ChirpResponse, CleanedChirp, CreateUserRequest, LoginRequest,
        TokenResponse, UpdateChirpRequest, UpdateUserRequest, UserResponse, WebhookRequest,
    },
    services::{SortOrder, WebhookOutcome, clean_body},
};

/// Create the router for the Chirpy service
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/healthz", get(health_check))
        .route("/validate_chirp", post(validate_chirp))
        .route("/users", post(create_user).put(update_user))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/revoke", post(revoke))
        .route(
            "/chirps",
            get(list_chirps).post(create_chirp).put(update_chirp),
        )
        .route("/chirps/:id", get(get_chirp).delete(delete_chirp))
        .route("/polka/webhooks", post(polka_webhook));

    let admin_routes = Router::new()
        .route("/metrics", get(admin_metrics))
        .route("/reset", post(admin_reset));

    let file_server: Router = Router::new()
        .fallback_service(ServeDir::new(&state.config.static_dir))
        .layer(middleware::from_fn_with_state(state.clone(), count_hits))
        .with_state(state.clone());

    Router::new()
        .nest("/api", api_routes)
        .nest("/admin", admin_routes)
        .nest_service("/app", file_server)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A path or query ID that is not a UUID names no stored record
fn parse_id(raw: &str, what: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("{} not found", what)))
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Check and clean a chirp body without storing it
pub async fn validate_chirp(
    JsonBody(payload): JsonBody<ChirpBody>,
) -> ApiResult<Json<CleanedChirp>> {
    let cleaned_body = clean_body(&payload.body)?;
    Ok(Json(CleanedChirp { cleaned_body }))
}

/// Register a new user
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .users
        .register(&payload.email, &payload.password)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Change the caller's email and/or password
pub async fn update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    if payload.is_empty() {
        return Err(ApiError::Validation(
            "Email or password are required".to_string(),
        ));
    }

    let user_id = authenticate(&headers, &state.jwt_service)?;
    let user = state
        .users
        .update_profile(user_id, payload.email, payload.password)
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Exchange credentials for a session and refresh token
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<Json<UserResponse>> {
    let (user, tokens) = state
        .users
        .authenticate(&payload.email, &payload.password, payload.expires_in_seconds)
        .await?;

    let mut response = UserResponse::from(user);
    response.token = Some(tokens.token);
    response.refresh_token = Some(tokens.refresh_token);

    Ok(Json(response))
}

/// Mint a new token pair from a refresh token
pub async fn refresh(
    State(state): State<AppState>,
    BearerToken(refresh_token): BearerToken,
) -> ApiResult<Json<TokenResponse>> {
    let tokens = state.sessions.refresh_session(&refresh_token).await?;
    Ok(Json(TokenResponse::from(tokens)))
}

pub async fn revoke(
    State(state): State<AppState>,
    BearerToken(refresh_token): BearerToken,
) -> ApiResult<StatusCode> {
    state.sessions.revoke_refresh_token(&refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List chirps, optionally by one author, sorted by creation time
pub async fn list_chirps(
    State(state): State<AppState>,
    Query(query): Query<ChirpListQuery>,
) -> ApiResult<Json<Vec<ChirpResponse>>> {
    let order = SortOrder::from_query(query.sort.as_deref());

    let author_id = match query.author_id.as_deref().filter(|id| !id.is_empty()) {
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => return Ok(Json(Vec::new())),
        },
        None => None,
    };

    let chirps = state.chirps.list(author_id, order).await?;
    Ok(Json(chirps.into_iter().map(ChirpResponse::from).collect()))
}

pub async fn get_chirp(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ChirpResponse>> {
    let chirp = state.chirps.get_by_id(parse_id(&id, "Chirp")?).await?;
    Ok(Json(ChirpResponse::from(chirp)))
}

/// Post a chirp as the authenticated user
pub async fn create_chirp(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(payload): JsonBody<ChirpBody>,
) -> ApiResult<impl IntoResponse> {
    let chirp = state.chirps.create(user_id, &payload.body).await?;
    Ok((StatusCode::CREATED, Json(ChirpResponse::from(chirp))))
}

pub async fn update_chirp(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<UpdateChirpRequest>,
) -> ApiResult<Json<ChirpResponse>> {
    let chirp_id = parse_id(&payload.id, "Chirp")?;
    let chirp = state.chirps.update(chirp_id, &payload.body).await?;
    Ok(Json(ChirpResponse::from(chirp)))
}

/// Delete one of the caller's chirps
pub async fn delete_chirp(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .chirps
        .delete(parse_id(&id, "Chirp")?, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Payment provider webhook; the API key is checked before the body
pub async fn polka_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<JsonBody<WebhookRequest>, ApiError>,
) -> ApiResult<StatusCode> {
    let api_key = extract_api_key(&headers)?;
    state.webhooks.authorize(&api_key)?;

    let JsonBody(payload) = payload?;
    let outcome = state
        .webhooks
        .handle_subscription_event(&api_key, &payload.event, payload.data.user_id.as_deref())
        .await?;

    if outcome == WebhookOutcome::Upgraded {
        info!("Processed {} webhook", payload.event);
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn admin_metrics(State(state): State<AppState>) -> Html<String> {
    Html(render_admin_metrics(state.hits.read()))
}

/// Reset the hit counter and delete every user; development only
pub async fn admin_reset(State(state): State<AppState>) -> ApiResult<Response> {
    if !state.config.is_dev() {
        warn!("Refused admin reset on platform {}", state.config.platform);
        return Ok((StatusCode::FORBIDDEN, "Forbidden").into_response());
    }

    state.users.delete_all().await?;
    state.hits.reset();

    info!("Admin reset completed");
    Ok("OK".into_response())
}
