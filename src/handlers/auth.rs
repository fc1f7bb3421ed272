use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use askama::Template;
use serde::Deserialize;
use tower_cookies::Cookies;

use super::{redirect_with, render, Flash};
use crate::{
    database::IdentityStore,
    middleware::get_session,
    models::{LoginRequest, NewUser, Role},
    session::Command,
    AppState,
};

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    error: String,
    notice: String,
    email: String,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    error: String,
    form: RegisterForm,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    department: String,
    #[serde(default)]
    role: String,
}

impl RegisterForm {
    fn is_manager(&self) -> bool {
        self.role.parse::<Role>() == Ok(Role::Manager)
    }
}

pub async fn index(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    let store = state.db.read().await;
    let session = get_session(cookies, &state.config, &store.identity);
    if session.current_user().is_some() {
        Redirect::to("/dashboard")
    } else {
        Redirect::to("/login")
    }
}

pub async fn login_page(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(flash): Query<Flash>,
) -> Result<Response, StatusCode> {
    let store = state.db.read().await;
    let session = get_session(cookies, &state.config, &store.identity);
    if session.current_user().is_some() {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    let template = LoginTemplate {
        error: flash.error,
        notice: flash.notice,
        email: String::new(),
    };
    Ok(render(&template)?.into_response())
}

pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginRequest>,
) -> Result<Redirect, (StatusCode, Html<String>)> {
    let store = state.db.read().await;
    let mut session = get_session(cookies, &state.config, &store.identity);
    let email = form.email.clone();

    match session.login(&store.identity, form) {
        Ok(_) => Ok(Redirect::to("/dashboard")),
        Err(err) => {
            let template = LoginTemplate {
                error: err.to_string(),
                notice: String::new(),
                email,
            };
            let html = render(&template).map_err(|code| (code, Html(String::new())))?;
            Err((err.status_code(), html))
        }
    }
}

pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    let mut store = state.db.write().await;
    let mut session = get_session(cookies, &state.config, &store.identity);
    if let Err(err) = session.dispatch(&mut store, Command::Logout) {
        log::warn!("logout failed: {}", err);
    }
    Redirect::to("/login")
}

pub async fn register_page() -> RegisterTemplate {
    RegisterTemplate {
        error: String::new(),
        form: RegisterForm::default(),
    }
}

pub async fn register(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, (StatusCode, Html<String>)> {
    let candidate = NewUser {
        name: form.name.clone(),
        email: form.email.clone(),
        password: form.password.clone(),
        department: form.department.clone(),
        role: form.role.parse().ok(),
    };

    // Hashed outside the store lock.
    let outcome = match IdentityStore::prepare(candidate, state.config.bcrypt_cost) {
        Ok(prepared) => {
            let mut store = state.db.write().await;
            let mut session = get_session(cookies, &state.config, &store.identity);
            session.register(&mut store.identity, prepared)
        }
        Err(err) => Err(err.into()),
    };

    match outcome {
        Ok(_) => Ok(redirect_with(
            "/login",
            "notice",
            "Registration successful! Please login.",
        )),
        Err(err) => {
            let template = RegisterTemplate {
                error: err.to_string(),
                form: RegisterForm {
                    password: String::new(),
                    ..form
                },
            };
            let html = render(&template).map_err(|code| (code, Html(String::new())))?;
            Err((err.status_code(), html))
        }
    }
}
