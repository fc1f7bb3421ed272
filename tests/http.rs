use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use expense_approvals::{build_state, config::Config, create_router};
use tower::ServiceExt;

const BOUNDARY: &str = "expense-form-boundary";

fn build_test_router() -> Router {
    let state = build_state(Config::for_tests()).unwrap();
    create_router(state)
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn post_expense(fields: &[(&str, &str)], receipt: Option<&str>, cookie: &str) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    if let Some(file_name) = receipt {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"receipt\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\nnot really a receipt\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method(Method::POST)
        .uri("/expenses")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::COOKIE, cookie)
        .body(Body::from(body))
        .unwrap()
}

fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Logs in and returns the `name=value` pair to send back as a cookie.
async fn login(app: &Router, email: &str) -> String {
    let body = format!("email={}&password=password", urlencoding::encode(email));
    let response = app
        .clone()
        .oneshot(post_form("/login", &body, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn anonymous_visitors_are_sent_to_login() {
    let app = build_test_router();

    for uri in ["/", "/dashboard", "/expenses/new", "/expenses/1"] {
        let response = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/login", "{uri}");
    }

    let response = app.oneshot(get("/login", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Sign in"));
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = build_test_router();

    let response = app
        .oneshot(post_form(
            "/login",
            "email=employee%40demo.com&password=nope",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(body_text(response).await.contains("Invalid email or password"));
}

#[tokio::test]
async fn employee_sees_only_their_dashboard() {
    let app = build_test_router();
    let cookie = login(&app, "employee@demo.com").await;

    let response = app
        .clone()
        .oneshot(get("/dashboard", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("My Expenses"));
    assert!(html.contains("Business lunch with client"));
    assert!(html.contains("$85.50"));
    assert!(!html.contains("Pending approval"));

    // Restored session skips the login page.
    let response = app.oneshot(get("/", Some(&cookie))).await.unwrap();
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn employee_submits_an_expense() {
    let app = build_test_router();
    let cookie = login(&app, "employee@demo.com").await;

    let response = app
        .clone()
        .oneshot(post_expense(
            &[
                ("description", "Taxi"),
                ("amount", "20.00"),
                ("expense_date", "2024-02-01"),
                ("category", "TRAVEL"),
                ("comments", ""),
            ],
            Some("taxi.png"),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/dashboard?notice="));

    let response = app
        .clone()
        .oneshot(get("/expenses/3", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Taxi"));
    assert!(html.contains("$20.00"));
    assert!(html.contains("taxi.png"));
    assert!(html.contains("PENDING"));
}

#[tokio::test]
async fn incomplete_expense_is_shown_again_with_errors() {
    let app = build_test_router();
    let cookie = login(&app, "employee@demo.com").await;

    let response = app
        .oneshot(post_expense(
            &[("description", "Hotel"), ("amount", "0")],
            None,
            &cookie,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Please fill in all required fields: expense date, category"));
    assert!(html.contains("value=\"Hotel\""));
}

#[tokio::test]
async fn uploads_are_refused_before_the_body_is_read() {
    let app = build_test_router();
    let manager = login(&app, "manager@demo.com").await;

    // Not valid multipart: reading it would fail with 400.
    let garbled = |cookie: Option<&str>| {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/expenses")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from("this is not multipart")).unwrap()
    };

    let response = app.clone().oneshot(garbled(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let response = app.clone().oneshot(garbled(Some(&manager))).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.oneshot(get("/dashboard", Some(&manager))).await.unwrap();
    assert!(!body_text(response).await.contains("/expenses/3"));
}

#[tokio::test]
async fn manager_cannot_open_the_expense_form() {
    let app = build_test_router();
    let cookie = login(&app, "manager@demo.com").await;

    let response = app
        .oneshot(get("/expenses/new", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn manager_approves_after_confirming() {
    let app = build_test_router();
    let cookie = login(&app, "manager@demo.com").await;

    let response = app
        .clone()
        .oneshot(get("/expenses/1/approve", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response)
        .await
        .contains("Are you sure you want to approve this expense?"));

    let response = app
        .clone()
        .oneshot(post_form("/expenses/1/approve", "confirmed=yes", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/dashboard?notice=Expense%20approved%20successfully%21"
    );

    let response = app
        .clone()
        .oneshot(get("/expenses/1", Some(&cookie)))
        .await
        .unwrap();
    let html = body_text(response).await;
    assert!(html.contains("APPROVED"));
    assert!(html.contains("Jane Manager"));

    // A decided expense can't be decided again.
    let response = app
        .clone()
        .oneshot(post_form("/expenses/1/reject", "confirmed=yes", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/dashboard?error="));

    let response = app
        .oneshot(get("/expenses/1/reject", Some(&cookie)))
        .await
        .unwrap();
    assert!(location(&response).starts_with("/dashboard?error="));
}

#[tokio::test]
async fn manager_rejects_after_confirming() {
    let app = build_test_router();
    let cookie = login(&app, "manager@demo.com").await;

    let response = app
        .clone()
        .oneshot(get("/expenses/1/reject", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response)
        .await
        .contains("Are you sure you want to reject this expense?"));

    let response = app
        .clone()
        .oneshot(post_form("/expenses/1/reject", "confirmed=yes", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/dashboard?notice=Expense%20rejected%20successfully%21"
    );

    let response = app
        .oneshot(get("/expenses/1", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("REJECTED"));
    assert!(html.contains("Decided by"));
}

#[tokio::test]
async fn declining_the_confirmation_changes_nothing() {
    let app = build_test_router();
    let cookie = login(&app, "manager@demo.com").await;

    let response = app
        .clone()
        .oneshot(post_form("/expenses/1/reject", "confirmed=no", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");

    let response = app
        .oneshot(get("/expenses/1", Some(&cookie)))
        .await
        .unwrap();
    assert!(body_text(response).await.contains("PENDING"));
}

#[tokio::test]
async fn employee_cannot_approve() {
    let app = build_test_router();
    let cookie = login(&app, "employee@demo.com").await;

    let response = app
        .clone()
        .oneshot(post_form("/expenses/1/approve", "confirmed=yes", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(get("/expenses/1", Some(&cookie)))
        .await
        .unwrap();
    assert!(body_text(response).await.contains("PENDING"));
}

#[tokio::test]
async fn registration_then_scoped_access() {
    let app = build_test_router();

    let response = app
        .clone()
        .oneshot(post_form(
            "/register",
            "name=Mary+Sales&email=mary%40demo.com&password=password&department=Sales&role=",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/login?notice="));

    let response = app
        .clone()
        .oneshot(post_form(
            "/register",
            "name=Copy&email=employee%40demo.com&password=x&department=IT",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(body_text(response).await.contains("Email already exists"));

    let cookie = login(&app, "mary@demo.com").await;
    let response = app
        .clone()
        .oneshot(get("/dashboard", Some(&cookie)))
        .await
        .unwrap();
    let html = body_text(response).await;
    assert!(html.contains("Mary Sales"));
    assert!(!html.contains("Business lunch with client"));

    let response = app
        .oneshot(get("/expenses/1", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn manager_filters_the_full_list() {
    let app = build_test_router();
    let cookie = login(&app, "manager@demo.com").await;

    let response = app
        .oneshot(get("/dashboard?status=APPROVED&employee_id=", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Pending approval"));
    assert!(html.contains("Flight to conference"));
    assert!(html.contains("<option value=\"APPROVED\" selected>"));
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let app = build_test_router();
    let cookie = login(&app, "employee@demo.com").await;

    let response = app
        .oneshot(post_form("/logout", "", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap();
    assert!(cleared.starts_with("expense_session=;"));
}
