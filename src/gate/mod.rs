//! Edge authorization gate
//!
//! A pure per-request decision: pass, send to login, or send to the landing
//! page. Every ambiguity (missing cookie, undecodable token, unknown role)
//! resolves to a redirect, never to a pass.

pub mod matcher;
pub mod routes;

pub use matcher::{classify, is_static_asset, matches, PathKind};
pub use routes::{allowed_prefixes, is_path_allowed};

use crate::auth::{self, CredentialStatus, Role};
use crate::config::GateConfig;
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Pass,
    /// `expired` marks a credential that was present but unusable
    RedirectToLogin { expired: bool },
    /// Signed in, but the role may not open this page
    RedirectToLanding,
}

impl GateDecision {
    /// Redirect target, `None` for `Pass`
    pub fn location(&self, config: &GateConfig) -> Option<String> {
        match self {
            GateDecision::Pass => None,
            GateDecision::RedirectToLogin { expired: false } => Some(config.login_path.clone()),
            GateDecision::RedirectToLogin { expired: true } => Some(format!("{}?expired=true", config.login_path)),
            GateDecision::RedirectToLanding => Some(config.landing_path.clone()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GateDecision::Pass => "pass",
            GateDecision::RedirectToLogin { expired: false } => "login",
            GateDecision::RedirectToLogin { expired: true } => "login_expired",
            GateDecision::RedirectToLanding => "landing",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Gate {
    config: GateConfig,
}

impl Gate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Decide for `path` at `now` (unix seconds)
    ///
    /// Clears the credential through `store` when it is expired or undecodable.
    pub fn check(&self, path: &str, store: &dyn SessionStore, now: i64) -> GateDecision {
        match classify(path, &self.config) {
            PathKind::StaticAsset | PathKind::AuthFlow => return GateDecision::Pass,
            PathKind::Protected => {}
        }

        let Some(token) = store.credential() else {
            return GateDecision::RedirectToLogin { expired: false };
        };

        match auth::inspect(&token, now, self.config.jwt_secret.as_deref()) {
            CredentialStatus::Valid(_) => {}
            CredentialStatus::Expired(_) | CredentialStatus::Malformed(_) => {
                store.clear_credential();
                return GateDecision::RedirectToLogin { expired: true };
            }
        }

        // A credential without a readable role is not a session
        let Some(role) = store.role().as_deref().and_then(Role::from_cookie) else {
            return GateDecision::RedirectToLogin { expired: false };
        };

        if is_path_allowed(role, path) {
            GateDecision::Pass
        } else {
            GateDecision::RedirectToLanding
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::tests::unsigned_token;
    use crate::session::MemorySessionStore;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000;

    fn live_token() -> String {
        unsigned_token(&json!({"exp": NOW + 3600}))
    }

    fn expired_token() -> String {
        unsigned_token(&json!({"exp": NOW - 1}))
    }

    fn session(token: &str, role: Role) -> MemorySessionStore {
        MemorySessionStore::with_session(token, role.to_cookie_value())
    }

    #[test]
    fn static_assets_always_pass() {
        let gate = Gate::default();
        let stores = [
            MemorySessionStore::new(),
            session(&expired_token(), Role::Professional),
            MemorySessionStore::with_session("garbage", "\"nobody\""),
        ];
        for store in &stores {
            for path in ["/_next/static/app.js", "/favicon.ico", "/images/logo.png", "/mural/photo.jpg"] {
                assert_eq!(gate.check(path, store, NOW), GateDecision::Pass, "{path}");
            }
        }
    }

    #[test]
    fn auth_pages_pass_even_when_signed_in() {
        let gate = Gate::default();
        let store = session(&live_token(), Role::Professional);
        assert_eq!(gate.check("/auth/login", &store, NOW), GateDecision::Pass);
        assert_eq!(gate.check("/auth/login", &MemorySessionStore::new(), NOW), GateDecision::Pass);
    }

    #[test]
    fn missing_credential_redirects_without_marker() {
        let gate = Gate::default();
        let store = MemorySessionStore::new();
        let decision = gate.check("/mural", &store, NOW);
        assert_eq!(decision, GateDecision::RedirectToLogin { expired: false });
        assert_eq!(decision.location(gate.config()).as_deref(), Some("/auth/login"));
    }

    #[test]
    fn expired_credential_is_cleared_and_marked() {
        let gate = Gate::default();
        let store = session(&expired_token(), Role::Professional);
        let decision = gate.check("/mural", &store, NOW);
        assert_eq!(decision, GateDecision::RedirectToLogin { expired: true });
        assert_eq!(decision.location(gate.config()).as_deref(), Some("/auth/login?expired=true"));
        assert_eq!(store.credential(), None);
        assert_eq!(store.clear_count(), 1);
    }

    #[test]
    fn exp_equal_to_now_counts_as_expired() {
        let gate = Gate::default();
        let store = session(&unsigned_token(&json!({"exp": NOW})), Role::Professional);
        assert_eq!(gate.check("/mural", &store, NOW), GateDecision::RedirectToLogin { expired: true });
    }

    #[test]
    fn malformed_tokens_are_treated_as_expired() {
        let gate = Gate::default();
        let bad_payload = format!("h.{}.s", base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, "oops"));
        for token in ["abc", "a.b", "a.b.c.d", "h.%%%.s", bad_payload.as_str()] {
            let store = session(token, Role::Professional);
            assert_eq!(
                gate.check("/mural", &store, NOW),
                GateDecision::RedirectToLogin { expired: true },
                "{token}"
            );
            assert_eq!(store.credential(), None);
        }
    }

    #[test]
    fn credential_without_usable_role_goes_to_login() {
        let gate = Gate::default();

        let store = MemorySessionStore::new();
        store.set_credential(live_token());
        assert_eq!(gate.check("/mural", &store, NOW), GateDecision::RedirectToLogin { expired: false });

        for raw in ["professional", "\"admin\"", "{}", "null"] {
            let store = MemorySessionStore::with_session(live_token(), raw);
            assert_eq!(
                gate.check("/mural", &store, NOW),
                GateDecision::RedirectToLogin { expired: false },
                "{raw}"
            );
            assert!(store.credential().is_some());
        }
    }

    #[test]
    fn role_disallowed_paths_go_to_landing() {
        let gate = Gate::default();
        let store = session(&live_token(), Role::Professional);
        let decision = gate.check("/store-info", &store, NOW);
        assert_eq!(decision, GateDecision::RedirectToLanding);
        assert_eq!(decision.location(gate.config()).as_deref(), Some("/mural"));

        let store = session(&live_token(), Role::PartnerSupplier);
        assert_eq!(gate.check("/events", &store, NOW), GateDecision::RedirectToLanding);
    }

    #[test]
    fn permitted_paths_pass() {
        let gate = Gate::default();
        let store = session(&live_token(), Role::Professional);
        assert_eq!(gate.check("/workshops/123", &store, NOW), GateDecision::Pass);
        assert_eq!(gate.check("/", &store, NOW), GateDecision::Pass);
    }

    #[test]
    fn root_still_requires_a_session() {
        let gate = Gate::default();
        assert_eq!(
            gate.check("/", &MemorySessionStore::new(), NOW),
            GateDecision::RedirectToLogin { expired: false }
        );
    }

    #[test]
    fn decision_matches_allow_list_for_every_role() {
        let gate = Gate::default();
        let paths = [
            "/", "/mural", "/recommended-professionals/9", "/store-info", "/help", "/plans", "/payment-confirmed",
            "/payment-confirmation", "/suppliers-store", "/workshops", "/events/4", "/benefits", "/settings",
        ];
        for role in Role::ALL {
            let store = session(&live_token(), role);
            for path in paths {
                let expected = if is_path_allowed(role, path) {
                    GateDecision::Pass
                } else {
                    GateDecision::RedirectToLanding
                };
                assert_eq!(gate.check(path, &store, NOW), expected, "{role} {path}");
            }
        }
    }

    #[test]
    fn secret_turns_forged_tokens_away() {
        let gate = Gate::new(GateConfig {
            jwt_secret: Some("s3cret".to_string()),
            ..GateConfig::default()
        });
        let store = session(&live_token(), Role::Professional);
        assert_eq!(gate.check("/mural", &store, NOW), GateDecision::RedirectToLogin { expired: true });
    }
}
