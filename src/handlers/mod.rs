pub mod auth;
pub mod dashboard;
pub mod expenses;

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::error::ActionError;

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    status: u16,
    reason: String,
    message: String,
}

/// Flash messages carried across a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct Flash {
    #[serde(default)]
    pub notice: String,
    #[serde(default)]
    pub error: String,
}

pub(crate) fn render<T: Template>(template: &T) -> Result<Html<String>, StatusCode> {
    template.render().map(Html).map_err(|err| {
        log::error!("template rendering failed: {}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

pub(crate) fn redirect_with(path: &str, key: &str, message: &str) -> Redirect {
    Redirect::to(&format!("{}?{}={}", path, key, urlencoding::encode(message)))
}

/// Anonymous callers go back to the login page; everything else renders an
/// error page with the matching status.
pub(crate) fn error_response(err: ActionError) -> Response {
    if let ActionError::NotAuthenticated = err {
        return Redirect::to("/login").into_response();
    }

    let status = err.status_code();
    let template = ErrorTemplate {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Error").to_string(),
        message: err.to_string(),
    };
    match render(&template) {
        Ok(html) => (status, html).into_response(),
        Err(code) => code.into_response(),
    }
}
