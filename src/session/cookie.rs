use std::sync::{Mutex, MutexGuard, PoisonError};

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::SessionStore;
use crate::config::GateConfig;

/// Session backed by the cookies of one incoming request
///
/// Clearing the credential queues a removal cookie; `into_jar` hands the jar
/// back so the response carries it.
pub struct CookieSession {
    jar: Mutex<CookieJar>,
    credential_cookie: String,
    role_cookie: String,
    secure: bool,
}

impl CookieSession {
    pub fn new(jar: CookieJar, config: &GateConfig) -> Self {
        Self {
            jar: Mutex::new(jar),
            credential_cookie: config.credential_cookie.clone(),
            role_cookie: config.role_cookie.clone(),
            secure: config.secure_cookies,
        }
    }

    pub fn into_jar(self) -> CookieJar {
        self.jar.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, CookieJar> {
        self.jar.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self, name: &str) -> Option<String> {
        self.lock()
            .get(name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }
}

impl SessionStore for CookieSession {
    fn credential(&self) -> Option<String> {
        self.read(&self.credential_cookie)
    }

    fn role(&self) -> Option<String> {
        self.read(&self.role_cookie)
    }

    fn clear_credential(&self) {
        let removal = Cookie::build((self.credential_cookie.clone(), ""))
            .path("/")
            .same_site(SameSite::Lax)
            .secure(self.secure);

        let mut jar = self.lock();
        *jar = jar.clone().remove(removal);
    }
}
