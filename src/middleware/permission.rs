use tower_cookies::Cookies;

use crate::{
    config::Config,
    database::IdentityStore,
    models::{has_capability, Capability, User},
    projection::capability_labels,
    session::{CookieSession, SessionController},
};

/// Template-facing view of the signed-in user.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub department: String,
    pub role_label: String,
    pub capabilities: Vec<&'static str>,
    // Helper properties for templates
    pub can_submit: bool,
    pub can_review: bool,
}

impl CurrentUser {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            department: user.department.clone(),
            role_label: user.role.label().to_string(),
            capabilities: capability_labels(user.role),
            can_submit: has_capability(user.role, Capability::SubmitExpenses),
            can_review: has_capability(user.role, Capability::ReviewExpenses),
        }
    }
}

/// Restores the request's session from its cookie.
pub fn get_session(
    cookies: Cookies,
    config: &Config,
    identity: &IdentityStore,
) -> SessionController<CookieSession> {
    let persistence = CookieSession::new(cookies, config.jwt_secret.clone(), config.session_hours);
    SessionController::restore(persistence, identity)
}

pub fn current_user<P>(session: &SessionController<P>) -> Option<CurrentUser>
where
    P: crate::session::SessionPersistence,
{
    session.current_user().map(|user| CurrentUser::from_user(user))
}
