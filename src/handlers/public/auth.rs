use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::middleware::{clear_session_cookie, read_cookie, session_cookie};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub next: Option<String>,
}

/// Only same-origin absolute paths are followed after sign-in.
pub fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => path.to_string(),
        _ => "/".to_string(),
    }
}

/// Name of the cookie holding the PKCE verifier for a pending sign-in.
pub fn verifier_cookie_name(session_cookie: &str) -> String {
    format!("{}-code-verifier", session_cookie)
}

/**
 * GET /auth/callback?code=&next= - finish sign-in
 *
 * Exchanges the one-time code for a session, stores the access token in the
 * session cookie and redirects to `next` (default `/`). A missing code or a
 * failed exchange redirects to `/login`.
 */
pub async fn callback(State(state): State<AppState>, headers: HeaderMap, Query(query): Query<CallbackQuery>) -> Response {
    let Some(code) = query.code.filter(|c| !c.trim().is_empty()) else {
        return Redirect::to("/login").into_response();
    };

    let security = &state.config.security;
    let verifier = read_cookie(&headers, &verifier_cookie_name(&security.session_cookie));

    match state.auth.exchange_code(&code, verifier.as_deref()).await {
        Ok(session) => {
            let next = safe_next(query.next.as_deref());
            info!("User {} signed in", session.user.id);
            let cookie = session_cookie(security, &session.access_token, session.expires_in);
            ([(header::SET_COOKIE, cookie)], Redirect::to(&next)).into_response()
        }
        Err(e) => {
            warn!("Sign-in code exchange failed: {}", e);
            Redirect::to("/login").into_response()
        }
    }
}

/// POST /auth/signout - drop the session cookie
pub async fn signout(State(state): State<AppState>) -> Response {
    let cookie = clear_session_cookie(&state.config.security);
    ([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response()
}
