use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{AuthError, AuthProvider, Identity, Session};

/// Auth provider for mock-data mode and tests. Sign-in codes are single use.
#[derive(Default)]
pub struct MemoryAuthProvider {
    codes: Mutex<HashMap<String, Session>>,
    tokens: HashMap<String, Identity>,
}

impl MemoryAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a code that exchanges into a session for `identity`; the
    /// session's access token is also accepted afterwards.
    pub fn with_code(mut self, code: impl Into<String>, identity: Identity) -> Self {
        let access_token = format!("mock-token-{}", identity.id);
        self.tokens.insert(access_token.clone(), identity.clone());
        let session = Session { access_token, refresh_token: None, expires_in: Some(3600), user: identity };
        if let Ok(codes) = self.codes.get_mut() {
            codes.insert(code.into(), session);
        }
        self
    }

    pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn exchange_code(&self, code: &str, _code_verifier: Option<&str>) -> Result<Session, AuthError> {
        let mut codes = self
            .codes
            .lock()
            .map_err(|_| AuthError::Rejected { status: 500, message: "code table poisoned".to_string() })?;
        codes
            .remove(code)
            .ok_or_else(|| AuthError::InvalidCode("unknown or already used code".to_string()))
    }

    async fn user_for_token(&self, access_token: &str) -> Result<Identity, AuthError> {
        self.tokens
            .get(access_token)
            .cloned()
            .ok_or_else(|| AuthError::InvalidToken("unknown token".to_string()))
    }
}
