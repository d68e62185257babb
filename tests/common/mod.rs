#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use rg_family_api::auth::{generate_token, Identity};

pub const JWT_SECRET: &str = "integration-test-secret";

pub const OWNER_ID: &str = "00000000-0000-4000-8000-000000000001";
pub const ADMIN_ID: &str = "00000000-0000-4000-8000-000000000002";
pub const MODERATOR_ID: &str = "00000000-0000-4000-8000-000000000003";
pub const MEMBER_ID: &str = "00000000-0000-4000-8000-000000000004";
pub const VIP_ID: &str = "00000000-0000-4000-8000-000000000005";

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    seed_path: PathBuf,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let seed_path = std::env::temp_dir().join(format!("rg-family-seed-{}.json", port));
        std::fs::write(&seed_path, serde_json::to_vec_pretty(&seed())?).context("failed to write seed file")?;

        // Mock-data mode: in-process store seeded from the file, tokens verified locally
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_rg-family-api"));
        cmd.env("PORT", port.to_string())
            .env("USE_MOCK_DATA", "true")
            .env("MOCK_DATA_PATH", &seed_path)
            .env("SUPABASE_JWT_SECRET", JWT_SECRET)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, seed_path, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("failed to build http client")
}

/// Signed access token for a seeded profile id.
pub fn token_for(id: &str) -> String {
    let identity = Identity { id: Uuid::parse_str(id).expect("valid uuid"), email: None };
    generate_token(&identity, JWT_SECRET, chrono::Duration::hours(1)).expect("token")
}

fn seed() -> Value {
    json!({
        "profiles": [
            { "id": OWNER_ID, "nickname": "owner", "role": "superadmin" },
            { "id": ADMIN_ID, "nickname": "admin", "role": "admin" },
            { "id": MODERATOR_ID, "nickname": "moderator", "role": "moderator" },
            { "id": MEMBER_ID, "nickname": "member", "role": "member" },
            { "id": VIP_ID, "nickname": "vip", "role": "vip" }
        ],
        "organization": [
            { "id": 1, "name": "린아", "role": "대표", "unit": "excel", "is_active": true, "position_order": 1 },
            { "id": 2, "name": "가윤", "role": "멤버", "unit": "excel", "is_active": true, "position_order": 2 },
            { "id": 3, "name": "다온", "role": "멤버", "unit": "crew", "is_active": false, "position_order": 0 }
        ],
        "donations": [
            { "id": 1, "season_id": 4, "donor_id": VIP_ID, "donor_name": "별빛", "amount": 12000, "unit": "excel" },
            { "id": 2, "season_id": 4, "donor_name": "달빛", "amount": 9000, "unit": "crew" },
            { "id": 3, "season_id": 4, "donor_name": "햇살", "amount": 1000, "unit": "excel" },
            { "id": 4, "season_id": 5, "donor_name": "새벽", "amount": 3000, "unit": "excel" },
            { "id": 5, "season_id": 5, "donor_name": "노을", "amount": 4000, "unit": "crew" }
        ],
        "signatures": [
            { "id": 1, "sig_number": 12, "title": "꽃길", "unit": "excel" },
            { "id": 2, "sig_number": 3, "title": "인사", "unit": "excel" },
            { "id": 3, "sig_number": 7, "title": "응원", "unit": "crew" }
        ],
        "schedules": [
            { "id": 1, "title": "정기 방송", "unit": "excel", "event_type": "broadcast", "start_datetime": "2025-03-03T11:00:00Z" },
            { "id": 2, "title": "합방", "unit": "crew", "event_type": "collab", "start_datetime": "2025-03-01T12:00:00Z" }
        ],
        "seasons": [
            { "id": 4, "name": "시즌 4", "start_date": "2024-09-01", "end_date": "2024-12-31", "is_active": false },
            { "id": 5, "name": "시즌 5", "start_date": "2025-01-01", "is_active": true }
        ],
        "season_donation_rankings": []
    })
}
