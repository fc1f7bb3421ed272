use tower_cookies::{Cookie, Cookies};

use crate::{
    error::SessionError,
    models::{User, UserId},
    utils::{create_token, verify_token},
};

pub const SESSION_COOKIE: &str = "expense_session";

/// What survives between requests. The user record itself is re-read from
/// the identity store on restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSession {
    pub user_id: UserId,
    pub email: String,
}

pub trait SessionPersistence {
    fn save_session(&self, user: &User) -> Result<(), SessionError>;
    fn load_session(&self) -> Option<PersistedSession>;
    fn clear_session(&self);
}

/// Signed JWT in an HTTP-only cookie.
#[derive(Clone)]
pub struct CookieSession {
    cookies: Cookies,
    secret: String,
    ttl_hours: i64,
}

impl CookieSession {
    pub fn new(cookies: Cookies, secret: impl Into<String>, ttl_hours: i64) -> Self {
        Self {
            cookies,
            secret: secret.into(),
            ttl_hours,
        }
    }
}

impl SessionPersistence for CookieSession {
    fn save_session(&self, user: &User) -> Result<(), SessionError> {
        let token = create_token(user, &self.secret, self.ttl_hours)?;

        let cookie = Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(tower_cookies::cookie::SameSite::Lax)
            .max_age(time::Duration::hours(self.ttl_hours))
            .build();

        self.cookies.add(cookie);
        Ok(())
    }

    fn load_session(&self) -> Option<PersistedSession> {
        let token = self.cookies.get(SESSION_COOKIE)?.value().to_string();

        let claims = match verify_token(&token, &self.secret) {
            Ok(claims) => claims,
            Err(err) => {
                log::debug!("discarding session token: {}", err);
                return None;
            }
        };

        Some(PersistedSession {
            user_id: claims.user_id()?,
            email: claims.email,
        })
    }

    fn clear_session(&self) {
        let mut cookie = Cookie::from(SESSION_COOKIE);
        cookie.set_path("/");
        self.cookies.remove(cookie);
    }
}
