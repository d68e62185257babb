pub mod claims;
pub mod gate;
pub mod gotrue;
pub mod memory;
pub mod session;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use claims::{generate_token, validate_access_token, Claims};
pub use gate::{GateDecision, Redirect};
pub use gotrue::GoTrueClient;
pub use memory::MemoryAuthProvider;
pub use session::{AuthState, ProfileState, SessionResolver};

/// An authenticated user as reported by the auth API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Result of exchanging a one-time sign-in code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: Identity,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("Invalid or expired sign-in code: {0}")]
    InvalidCode(String),

    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    #[error("Auth service unreachable: {0}")]
    Network(String),

    #[error("Auth service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// The hosted auth API: code exchange at sign-in and token lookup per request.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn exchange_code(&self, code: &str, code_verifier: Option<&str>) -> Result<Session, AuthError>;

    async fn user_for_token(&self, access_token: &str) -> Result<Identity, AuthError>;
}
