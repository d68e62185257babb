use axum::{extract::State, http::header, response::IntoResponse};

use crate::state::AppState;

const DISALLOW_ALL_AGENTS: &[&str] = &["/admin/", "/admin/*", "/api/", "/api/*", "/_next/", "/login", "/signup"];
const DISALLOW_GOOGLEBOT: &[&str] = &["/admin/", "/api/"];

/// Render robots.txt for the given public site origin.
pub fn render(site_url: &str) -> String {
    let site_url = site_url.trim_end_matches('/');
    let mut out = String::new();

    out.push_str("User-agent: *\nAllow: /\n");
    for path in DISALLOW_ALL_AGENTS {
        out.push_str(&format!("Disallow: {}\n", path));
    }
    out.push_str("\nUser-agent: Googlebot\nAllow: /\n");
    for path in DISALLOW_GOOGLEBOT {
        out.push_str(&format!("Disallow: {}\n", path));
    }
    out.push_str(&format!("\nHost: {}\nSitemap: {}/sitemap.xml\n", site_url, site_url));
    out
}

/// GET /robots.txt
pub async fn robots_txt(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        render(&state.config.site.base_url),
    )
}
