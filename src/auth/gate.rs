//! Admin access gate: maps an [`AuthState`] and the requested path to a decision.
//!
//! Decisions are pure and recomputed for every request.

use tracing::{debug, warn};

use crate::models::{Profile, Role};

use super::session::{AuthState, ProfileState};

/// Roles allowed into the admin surface.
pub const ALLOWED_ROLES: &[Role] = &[Role::Owner, Role::Admin, Role::Moderator];

/// Roles allowed to run destructive admin operations.
pub const FULL_ADMIN_ROLES: &[Role] = &[Role::Owner, Role::Admin];

/// Ranks at or above this position may enter the VIP lounge.
pub const VIP_RANK_LIMIT: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    Login { return_to: String },
    Home,
}

impl Redirect {
    pub fn location(&self) -> String {
        match self {
            Redirect::Login { return_to } => login_location(return_to),
            Redirect::Home => "/".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Identity still unresolved; render a waiting state.
    Pending,
    Authorized,
    Redirect(Redirect),
}

pub fn evaluate(state: &AuthState, path: &str) -> GateDecision {
    let decision = match state {
        AuthState::Loading => GateDecision::Pending,
        AuthState::Anonymous => GateDecision::Redirect(Redirect::Login { return_to: path.to_string() }),
        AuthState::Authenticated { identity, profile } => match profile {
            ProfileState::Loaded(p) if ALLOWED_ROLES.contains(&p.role) => GateDecision::Authorized,
            ProfileState::Loaded(p) => {
                debug!("User {} with role {} denied admin access", identity.id, p.role);
                GateDecision::Redirect(Redirect::Home)
            }
            ProfileState::Missing => {
                warn!("User {} has no profile; denying admin access", identity.id);
                GateDecision::Redirect(Redirect::Home)
            }
            ProfileState::Failed(reason) => {
                warn!("Role lookup for {} failed ({}); denying admin access", identity.id, reason);
                GateDecision::Redirect(Redirect::Home)
            }
        },
    };
    debug!("Gate decision for {}: {:?}", path, decision);
    decision
}

/// `/login?redirect=<path>`, keeping slashes readable.
pub fn login_location(return_to: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(return_to.as_bytes()).collect();
    format!("/login?redirect={}", encoded.replace("%2F", "/"))
}

pub fn has_admin_access(profile: Option<&Profile>) -> bool {
    profile.is_some_and(|p| ALLOWED_ROLES.contains(&p.role))
}

pub fn has_full_admin_access(profile: Option<&Profile>) -> bool {
    profile.is_some_and(|p| FULL_ADMIN_ROLES.contains(&p.role))
}

/// Full admins always; everyone else by season rank.
pub fn has_vip_lounge_access(rank: Option<u32>, profile: Option<&Profile>) -> bool {
    has_full_admin_access(profile) || rank.is_some_and(|r| (1..=VIP_RANK_LIMIT).contains(&r))
}
