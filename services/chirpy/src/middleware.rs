//! Request middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::state::AppState;

/// Count a file server hit, then pass the request on
pub async fn count_hits(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let hits = state.hits.increment();
    debug!("File server hit {} for {}", hits, req.uri().path());
    next.run(req).await
}
