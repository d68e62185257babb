use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::{gate, AuthState, GateDecision, Identity};
use crate::error::ApiError;
use crate::models::Profile;
use crate::state::AppState;

use super::auth::extract_token;

/// Caller that passed the admin gate, available to admin handlers as an extension.
#[derive(Clone, Debug)]
pub struct AdminUser {
    pub identity: Identity,
    pub profile: Profile,
}

impl AdminUser {
    pub fn has_full_access(&self) -> bool {
        gate::has_full_admin_access(Some(&self.profile))
    }
}

/// Resolves the caller and applies the admin gate before any admin handler runs.
pub async fn admin_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let token = extract_token(request.headers(), &state.config.security.session_cookie);
    let auth = state.sessions.resolve(token.as_deref()).await;

    let decision = gate::evaluate(&auth, request.uri().path());

    match decision {
        GateDecision::Pending => {
            let mut response = ApiError::service_unavailable("Checking permissions").into_response();
            response.headers_mut().insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
            response
        }
        GateDecision::Redirect(target) => Redirect::to(&target.location()).into_response(),
        GateDecision::Authorized => {
            if let AuthState::Authenticated { identity, .. } = &auth {
                if let Some(profile) = auth.profile() {
                    request
                        .extensions_mut()
                        .insert(AdminUser { identity: identity.clone(), profile: profile.clone() });
                }
            }
            next.run(request).await
        }
    }
}
