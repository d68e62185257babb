use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::models::{Profile, ProfileField, Role};
use crate::store::{Select, Store};

use super::{validate_access_token, AuthError, AuthProvider, Identity};

/// Outcome of looking up the caller's profile.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileState {
    Loaded(Profile),
    /// Signed in but no profile row exists.
    Missing,
    /// The lookup errored or timed out.
    Failed(String),
}

/// Per-request authentication state.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Identity could not be resolved yet (auth service slow or unreachable).
    Loading,
    Anonymous,
    Authenticated { identity: Identity, profile: ProfileState },
}

impl AuthState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthState::Authenticated { identity, .. } => Some(identity),
            _ => None,
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        match self {
            AuthState::Authenticated { profile: ProfileState::Loaded(profile), .. } => Some(profile),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.profile().map(|p| p.role)
    }
}

/// Builds an [`AuthState`] from a request's access token.
pub struct SessionResolver {
    auth: Arc<dyn AuthProvider>,
    store: Store,
    jwt_secret: Option<String>,
    timeout: Duration,
}

impl SessionResolver {
    pub fn new(auth: Arc<dyn AuthProvider>, store: Store, timeout: Duration) -> Self {
        Self { auth, store, jwt_secret: None, timeout }
    }

    /// Verify tokens locally with the shared secret instead of asking the auth API.
    pub fn with_jwt_secret(mut self, secret: Option<String>) -> Self {
        self.jwt_secret = secret;
        self
    }

    pub async fn resolve(&self, token: Option<&str>) -> AuthState {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return AuthState::Anonymous;
        };

        let identity = match timeout(self.timeout, self.identify(token)).await {
            Err(_) => {
                warn!("Identity lookup exceeded {:?}", self.timeout);
                return AuthState::Loading;
            }
            Ok(Err(AuthError::Network(e))) => {
                warn!("Identity lookup failed: {}", e);
                return AuthState::Loading;
            }
            Ok(Err(e)) => {
                debug!("Treating request as anonymous: {}", e);
                return AuthState::Anonymous;
            }
            Ok(Ok(identity)) => identity,
        };

        let profile = match timeout(self.timeout, self.load_profile(&identity)).await {
            Err(_) => ProfileState::Failed(format!("profile lookup exceeded {:?}", self.timeout)),
            Ok(Err(e)) => ProfileState::Failed(e.to_string()),
            Ok(Ok(Some(profile))) => ProfileState::Loaded(profile),
            Ok(Ok(None)) => ProfileState::Missing,
        };

        AuthState::Authenticated { identity, profile }
    }

    async fn identify(&self, token: &str) -> Result<Identity, AuthError> {
        match &self.jwt_secret {
            Some(secret) => validate_access_token(token, secret),
            None => self.auth.user_for_token(token).await,
        }
    }

    async fn load_profile(&self, identity: &Identity) -> Result<Option<Profile>, crate::store::StoreError> {
        let query = Select::<Profile>::new().eq(ProfileField::Id, identity.id.to_string()).limit(1);
        Ok(self.store.select(query).await?.rows.into_iter().next())
    }
}
