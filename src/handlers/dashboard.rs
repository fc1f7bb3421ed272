use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use askama::Template;
use serde::Deserialize;
use tower_cookies::Cookies;

use super::{error_response, render};
use crate::{
    filters,
    middleware::{current_user, get_session, CurrentUser},
    models::{ExpenseFilter, ExpenseStatus, Role, UserId},
    projection::{DashboardView, EmployeeSummary, ExpenseRow, ManagerSummary},
    AppState,
};

#[derive(Template)]
#[template(path = "employee/dashboard.html")]
struct EmployeeDashboardTemplate {
    current_user: CurrentUser,
    summary: EmployeeSummary,
    expenses: Vec<ExpenseRow>,
    notice: String,
    error: String,
}

#[derive(Template)]
#[template(path = "manager/dashboard.html")]
struct ManagerDashboardTemplate {
    current_user: CurrentUser,
    summary: ManagerSummary,
    pending: Vec<ExpenseRow>,
    all: Vec<ExpenseRow>,
    employees: Vec<SelectOption>,
    statuses: Vec<SelectOption>,
    is_filtered: bool,
    notice: String,
    error: String,
}

pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

// Filter values arrive as strings so an empty <select> doesn't fail
// deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    notice: String,
    #[serde(default)]
    error: String,
    #[serde(default)]
    employee_id: String,
    #[serde(default)]
    status: String,
}

impl DashboardQuery {
    fn filter(&self) -> ExpenseFilter {
        ExpenseFilter {
            employee_id: self.employee_id.trim().parse::<UserId>().ok(),
            status: self.status.parse::<ExpenseStatus>().ok(),
        }
    }
}

pub async fn dashboard(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let store = state.db.read().await;
    let session = get_session(cookies, &state.config, &store.identity);
    let filter = query.filter();

    let view = match session.dashboard(&store.ledger, filter) {
        Ok(view) => view,
        Err(err) => return error_response(err),
    };
    let Some(current_user) = current_user(&session) else {
        return error_response(crate::error::ActionError::NotAuthenticated);
    };

    let rendered = match view {
        DashboardView::Employee(view) => render(&EmployeeDashboardTemplate {
            current_user,
            summary: view.summary,
            expenses: view.expenses,
            notice: query.notice,
            error: query.error,
        }),
        DashboardView::Manager(view) => {
            let employees = store
                .identity
                .users()
                .iter()
                .filter(|user| user.role == Role::Employee)
                .map(|user| SelectOption {
                    value: user.id.to_string(),
                    label: user.name.clone(),
                    selected: filter.employee_id == Some(user.id),
                })
                .collect();
            let statuses = [
                ExpenseStatus::Pending,
                ExpenseStatus::Approved,
                ExpenseStatus::Rejected,
            ]
            .into_iter()
            .map(|status| SelectOption {
                value: status.code().to_string(),
                label: status.code().to_string(),
                selected: filter.status == Some(status),
            })
            .collect();

            render(&ManagerDashboardTemplate {
                current_user,
                summary: view.summary,
                pending: view.pending,
                all: view.all,
                employees,
                statuses,
                is_filtered: filter != ExpenseFilter::default(),
                notice: query.notice,
                error: query.error,
            })
        }
    };

    rendered.into_response()
}
