use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{Identity, MemoryAuthProvider};
use crate::models::Role;
use crate::store::{MemoryStore, Store};

/// Fixed profile ids, one per role.
pub const OWNER_ID: &str = "00000000-0000-4000-8000-000000000001";
pub const ADMIN_ID: &str = "00000000-0000-4000-8000-000000000002";
pub const MODERATOR_ID: &str = "00000000-0000-4000-8000-000000000003";
pub const MEMBER_ID: &str = "00000000-0000-4000-8000-000000000004";
pub const VIP_ID: &str = "00000000-0000-4000-8000-000000000005";
/// Signed in, but without a profile row.
pub const GHOST_ID: &str = "00000000-0000-4000-8000-000000000009";

/// Seeded in-memory store plus an auth provider that knows one token per role.
pub struct TestContext {
    pub store: Store,
    pub auth: Arc<MemoryAuthProvider>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_store(Self::seeded_store())
    }

    pub fn with_store(store: MemoryStore) -> Self {
        let mut auth = MemoryAuthProvider::new();
        for (role, id) in Self::role_ids() {
            auth = auth.with_token(Self::token_for(role), Self::identity(id));
        }
        auth = auth
            .with_token("token-ghost", Self::identity(GHOST_ID))
            .with_code("valid-code", Self::identity(ADMIN_ID));
        Self { store: Store::new(Arc::new(store)), auth: Arc::new(auth) }
    }

    pub fn seeded_store() -> MemoryStore {
        match MemoryStore::from_seed(Self::fixture()) {
            Ok(store) => store,
            Err(e) => panic!("fixture seed is invalid: {}", e),
        }
    }

    pub fn token_for(role: Role) -> String {
        format!("token-{}", role.as_str())
    }

    fn identity(id: &str) -> Identity {
        Identity { id: Uuid::parse_str(id).unwrap_or_default(), email: None }
    }

    fn role_ids() -> [(Role, &'static str); 5] {
        [
            (Role::Owner, OWNER_ID),
            (Role::Admin, ADMIN_ID),
            (Role::Moderator, MODERATOR_ID),
            (Role::Member, MEMBER_ID),
            (Role::Vip, VIP_ID),
        ]
    }

    /// Seed data keyed by collection name.
    pub fn fixture() -> Value {
        let profiles: Vec<Value> = Self::role_ids()
            .iter()
            .map(|(role, id)| json!({ "id": id, "nickname": format!("{}-user", role.as_str()), "role": role.as_str() }))
            .collect();

        json!({
            "profiles": profiles,
            "organization": [
                { "id": 1, "name": "린아", "role": "대표", "unit": "excel", "is_active": true, "position_order": 1 },
                { "id": 2, "name": "가윤", "role": "멤버", "unit": "excel", "is_active": true, "position_order": 2 },
                { "id": 3, "name": "다온", "role": "R대표", "unit": "crew", "is_active": true, "position_order": 1 },
                { "id": 4, "name": "나래", "role": "멤버", "unit": "crew", "is_active": false, "position_order": 2 }
            ],
            "donations": [
                { "id": 1, "season_id": 4, "donor_id": VIP_ID, "donor_name": "별빛", "amount": 5000, "unit": "excel" },
                { "id": 2, "season_id": 4, "donor_id": VIP_ID, "donor_name": "별빛", "amount": 7000, "unit": "crew" },
                { "id": 3, "season_id": 4, "donor_name": "달빛", "amount": 9000, "unit": "crew" },
                { "id": 4, "season_id": 4, "donor_name": "햇살", "amount": 1000, "unit": "excel" },
                { "id": 5, "season_id": 5, "donor_name": "새벽", "amount": 3000, "unit": "excel" }
            ],
            "signatures": [
                { "id": 1, "sig_number": 12, "title": "꽃길", "unit": "excel" },
                { "id": 2, "sig_number": 3, "title": "인사", "unit": "excel" },
                { "id": 3, "sig_number": 7, "title": "응원", "unit": "crew" }
            ],
            "schedules": [
                { "id": 1, "title": "정기 방송", "unit": "excel", "event_type": "broadcast", "start_datetime": "2025-03-03T11:00:00Z" },
                { "id": 2, "title": "합방", "unit": "crew", "event_type": "collab", "start_datetime": "2025-03-01T12:00:00Z" },
                { "id": 3, "title": "휴방", "event_type": "休", "start_datetime": "2025-04-01T00:00:00Z", "is_all_day": true }
            ],
            "seasons": [
                { "id": 4, "name": "시즌 4", "start_date": "2024-09-01", "end_date": "2024-12-31", "is_active": false },
                { "id": 5, "name": "시즌 5", "start_date": "2025-01-01", "is_active": true }
            ],
            "season_donation_rankings": []
        })
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
