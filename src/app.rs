use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{any, get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::handlers::{admin, public};
use crate::middleware::admin_gate;
use crate::state::AppState;

/// The complete HTTP surface.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        // Public
        .route("/", get(public::status::root))
        .route("/health", get(public::status::health))
        .route("/robots.txt", get(public::robots::robots_txt))
        .route("/auth/callback", get(public::auth::callback))
        .route("/auth/signout", post(public::auth::signout))
        .merge(public_api_routes())
        // Admin (gated)
        .merge(admin_routes(state.clone()))
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_api_routes() -> Router<AppState> {
    use public::{directory, rankings, vip};

    Router::new()
        .route("/api/rankings", get(rankings::get))
        .route("/api/organization", get(directory::organization))
        .route("/api/schedules", get(directory::schedules))
        .route("/api/signatures", get(directory::signatures))
        .route("/api/seasons/active", get(directory::active_season))
        .route("/api/vip/lounge", get(vip::lounge))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    use admin::{content, dashboard, donations, members, rankings};

    Router::new()
        .route("/admin", get(dashboard::get))
        .route("/admin/members", get(members::get).patch(members::patch))
        .route("/admin/donations", get(donations::get).delete(donations::delete))
        .route("/admin/schedules", get(content::schedules))
        .route("/admin/signatures", get(content::signatures))
        .route("/admin/rankings", get(rankings::get))
        .route("/admin/rankings/rebuild", post(rankings::rebuild))
        // Unknown admin paths are still gated before answering 404
        .route("/admin/", any(admin_not_found))
        .route("/admin/*rest", any(admin_not_found))
        .route_layer(middleware::from_fn_with_state(state, admin_gate))
}

async fn admin_not_found() -> ApiError {
    ApiError::not_found("No such admin page")
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::AppConfig;
    use crate::models::Role;
    use crate::store::MemoryStore;
    use crate::testing::TestContext;

    fn mock_config() -> AppConfig {
        AppConfig::from_lookup(|key| (key == "USE_MOCK_DATA").then(|| "true".to_string())).unwrap()
    }

    fn app_with(ctx: TestContext) -> Router {
        router(AppState::new(mock_config(), ctx.store, ctx.auth))
    }

    fn app() -> Router {
        app_with(TestContext::new())
    }

    fn request(method: Method, uri: &str, role: Option<Role>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(role) = role {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", TestContext::token_for(role)));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn location(response: &axum::response::Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    #[tokio::test]
    async fn anonymous_admin_request_redirects_to_login() {
        let response = app().oneshot(request(Method::GET, "/admin/donations", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login?redirect=/admin/donations");
    }

    #[tokio::test]
    async fn member_and_vip_are_sent_home() {
        for role in [Role::Member, Role::Vip] {
            let response = app().oneshot(request(Method::GET, "/admin", Some(role))).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "role {:?}", role);
            assert_eq!(location(&response), "/");
        }
    }

    #[tokio::test]
    async fn admin_sees_protected_content_without_redirect() {
        let response = app().oneshot(request(Method::GET, "/admin/donations", Some(Role::Admin))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::LOCATION).is_none());

        let body = json_body(response).await;
        assert_eq!(body["meta"]["total_count"], 5);
        let amounts: Vec<i64> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["amount"].as_i64().unwrap())
            .collect();
        assert!(amounts.windows(2).all(|w| w[0] >= w[1]));
    }

    #[tokio::test]
    async fn signed_in_without_profile_fails_closed() {
        let req = Request::builder()
            .uri("/admin")
            .header(header::COOKIE, "rg-session=token-ghost")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn unknown_admin_paths_are_gated() {
        let response = app().oneshot(request(Method::GET, "/admin/nowhere", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = app().oneshot(request(Method::GET, "/admin/nowhere", Some(Role::Owner))).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn trailing_slash_admin_path_is_gated() {
        let response = app().oneshot(request(Method::GET, "/admin/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login?redirect=/admin/");
    }

    #[tokio::test]
    async fn malformed_query_parameters_use_the_error_envelope() {
        for (method, uri) in [
            (Method::DELETE, "/admin/donations"),
            (Method::DELETE, "/admin/donations?season_id=four"),
            (Method::GET, "/admin/rankings"),
            (Method::POST, "/admin/rankings/rebuild?season_id=x"),
        ] {
            let response = app().oneshot(request(method.clone(), uri, Some(Role::Owner))).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{} {}", method, uri);
            let body = json_body(response).await;
            assert_eq!(body["success"], false);
            assert_eq!(body["code"], "BAD_REQUEST");
        }

        let response = app().oneshot(request(Method::GET, "/api/rankings?season_id=x", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["success"], false);
    }

    #[tokio::test]
    async fn moderators_cannot_purge_donations() {
        let response = app()
            .oneshot(request(Method::DELETE, "/admin/donations?season_id=4", Some(Role::Moderator)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(response).await["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn purge_then_read_returns_no_rows_for_the_season() {
        let ctx = TestContext::new();
        let state = AppState::new(mock_config(), ctx.store, ctx.auth);

        let response = router(state.clone())
            .oneshot(request(Method::DELETE, "/admin/donations?season_id=4", Some(Role::Owner)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"].as_array().unwrap().len(), 4);

        let response = router(state)
            .oneshot(request(Method::GET, "/admin/donations?season_id=4", Some(Role::Admin)))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["data"], json!([]));
        assert_eq!(body["meta"]["total_count"], 0);
    }

    #[tokio::test]
    async fn patch_member_role_by_name_and_unit() {
        let req = Request::builder()
            .method(Method::PATCH)
            .uri("/admin/members?name=%EA%B0%80%EC%9C%A4&unit=excel")
            .header(header::AUTHORIZATION, format!("Bearer {}", TestContext::token_for(Role::Moderator)))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "role": "대표" }).to_string()))
            .unwrap();
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["data"][0]["name"], "가윤");
        assert_eq!(body["data"][0]["role"], "대표");
        assert_eq!(body["data"][0]["position_order"], 2);
    }

    #[tokio::test]
    async fn mistyped_patch_is_rejected_and_roster_stays_readable() {
        let ctx = TestContext::new();
        let state = AppState::new(mock_config(), ctx.store, ctx.auth);

        for body in [json!({ "unit": "gold" }), json!({ "role": 5 })] {
            let req = Request::builder()
                .method(Method::PATCH)
                .uri("/admin/members?name=%EA%B0%80%EC%9C%A4&unit=excel")
                .header(header::AUTHORIZATION, format!("Bearer {}", TestContext::token_for(Role::Moderator)))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            let response = router(state.clone()).oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);
            assert_eq!(json_body(response).await["code"], "VALIDATION_ERROR");
        }

        let response = router(state).oneshot(request(Method::GET, "/api/organization", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let gayun = body["data"].as_array().unwrap().iter().find(|m| m["name"] == "가윤").unwrap().clone();
        assert_eq!(gayun["unit"], "excel");
        assert_eq!(gayun["role"], "멤버");
    }

    #[tokio::test]
    async fn malformed_patch_body_uses_the_error_envelope() {
        let req = Request::builder()
            .method(Method::PATCH)
            .uri("/admin/members?name=x&unit=excel")
            .header(header::AUTHORIZATION, format!("Bearer {}", TestContext::token_for(Role::Admin)))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "INVALID_JSON");
    }

    #[tokio::test]
    async fn missing_relation_maps_to_404_envelope() {
        let app = app_with(TestContext::with_store(MemoryStore::unmigrated()));
        let response = app.oneshot(request(Method::GET, "/api/signatures", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "RELATION_NOT_FOUND");
    }

    #[tokio::test]
    async fn slow_identity_lookup_is_pending() {
        use crate::auth::{AuthError, AuthProvider, Identity, Session};
        use async_trait::async_trait;

        struct Unreachable;

        #[async_trait]
        impl AuthProvider for Unreachable {
            async fn exchange_code(&self, _: &str, _: Option<&str>) -> Result<Session, AuthError> {
                Err(AuthError::Network("down".into()))
            }
            async fn user_for_token(&self, _: &str) -> Result<Identity, AuthError> {
                Err(AuthError::Network("down".into()))
            }
        }

        let state = AppState::new(mock_config(), TestContext::new().store, Arc::new(Unreachable));
        let response = router(state).oneshot(request(Method::GET, "/admin", Some(Role::Admin))).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()[header::RETRY_AFTER], "1");
    }

    #[tokio::test]
    async fn callback_sets_cookie_and_follows_local_next() {
        let response = app()
            .oneshot(request(Method::GET, "/auth/callback?code=valid-code&next=/admin", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/admin");
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("rg-session="));
    }

    #[tokio::test]
    async fn callback_failures_go_to_login() {
        for uri in ["/auth/callback", "/auth/callback?code=bogus", "/auth/callback?code="] {
            let response = app().oneshot(request(Method::GET, uri, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
            assert_eq!(location(&response), "/login");
        }
    }

    #[tokio::test]
    async fn vip_lounge_admits_top_donors_and_full_admins() {
        let response = app()
            .oneshot(request(Method::GET, "/api/vip/lounge?season_id=4", Some(Role::Vip)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"]["rank"], 1);

        let response = app()
            .oneshot(request(Method::GET, "/api/vip/lounge?season_id=4", Some(Role::Member)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app().oneshot(request(Method::GET, "/api/vip/lounge", Some(Role::Owner))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app().oneshot(request(Method::GET, "/api/vip/lounge", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn public_rankings_accept_unit_filters() {
        let response = app().oneshot(request(Method::GET, "/api/rankings?season_id=4&unit=vip", None)).await.unwrap();
        let body = json_body(response).await;
        assert_eq!(body["data"][0]["donor_name"], "별빛");
        assert_eq!(body["data"][0]["percent"], 100.0);

        let response = app().oneshot(request(Method::GET, "/api/rankings?unit=gold", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
