use axum::{
    extract::{Form, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Multipart;
use askama::Template;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_cookies::Cookies;

use super::{error_response, redirect_with, render};
use crate::{
    error::ActionError,
    filters,
    middleware::{current_user, get_session, CurrentUser},
    models::{ensure_authorized, Action, Decision, ExpenseCategory, ExpenseDraft, ExpenseId},
    projection::ExpenseDetail,
    session::{Command, CommandOutcome, SessionController, SessionPersistence},
    AppState,
};

#[derive(Template)]
#[template(path = "expenses/expense_form.html")]
struct ExpenseFormTemplate {
    current_user: CurrentUser,
    categories: Vec<CategoryOption>,
    form: ExpenseFormData,
    today: String,
    error: String,
}

#[derive(Template)]
#[template(path = "expenses/expense_detail.html")]
struct ExpenseDetailTemplate {
    current_user: CurrentUser,
    expense: ExpenseDetail,
    is_pending: bool,
}

#[derive(Template)]
#[template(path = "expenses/confirm.html")]
struct ConfirmTemplate {
    current_user: CurrentUser,
    expense: ExpenseDetail,
    verb: &'static str,
    action_path: String,
}

struct CategoryOption {
    code: String,
    label: String,
    selected: bool,
}

/// Raw form values, kept as typed so a rejected submission can be shown
/// again unchanged.
#[derive(Debug, Default)]
struct ExpenseFormData {
    description: String,
    amount: String,
    expense_date: String,
    category: String,
    comments: String,
}

impl ExpenseFormData {
    fn to_draft(&self, receipt_file_name: Option<String>) -> ExpenseDraft {
        ExpenseDraft {
            description: non_blank(&self.description),
            amount: self.amount.trim().parse::<Decimal>().ok(),
            expense_date: NaiveDate::parse_from_str(self.expense_date.trim(), "%Y-%m-%d").ok(),
            category: self.category.parse::<ExpenseCategory>().ok(),
            comments: non_blank(&self.comments),
            receipt_file_name,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DecisionForm {
    confirmed: Option<String>,
}

impl DecisionForm {
    fn is_confirmed(&self) -> bool {
        self.confirmed.as_deref() == Some("yes")
    }
}

pub async fn expense_form(State(state): State<AppState>, cookies: Cookies) -> Response {
    let store = state.db.read().await;
    let session = get_session(cookies, &state.config, &store.identity);
    match submitter(&session) {
        Ok(current_user) => {
            form_page(current_user, ExpenseFormData::default(), String::new(), StatusCode::OK)
        }
        Err(err) => error_response(err),
    }
}

pub async fn create_expense(
    State(state): State<AppState>,
    cookies: Cookies,
    multipart: Multipart,
) -> Response {
    // The upload is only read once the caller is known to be allowed to submit.
    {
        let store = state.db.read().await;
        let session = get_session(cookies.clone(), &state.config, &store.identity);
        if let Err(err) = submitter(&session) {
            return error_response(err);
        }
    }

    let (form, receipt_file_name) = match parse_expense_multipart(multipart).await {
        Ok(parsed) => parsed,
        Err(code) => return code.into_response(),
    };
    let draft = form.to_draft(receipt_file_name);

    let mut store = state.db.write().await;
    let mut session = get_session(cookies, &state.config, &store.identity);

    match session.dispatch(&mut store, Command::Submit(draft)) {
        Ok(_) => redirect_with("/dashboard", "notice", "Expense submitted successfully!")
            .into_response(),
        Err(err @ ActionError::Validation(_)) => match current_user(&session) {
            Some(current_user) => form_page(current_user, form, err.to_string(), err.status_code()),
            None => error_response(ActionError::NotAuthenticated),
        },
        Err(err) => error_response(err),
    }
}

pub async fn expense_detail(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(expense_id): Path<ExpenseId>,
) -> Response {
    let store = state.db.read().await;
    let session = get_session(cookies, &state.config, &store.identity);

    let expense = match session.expense_detail(&store.ledger, expense_id) {
        Ok(expense) => expense,
        Err(err) => return error_response(err),
    };
    let Some(current_user) = current_user(&session) else {
        return error_response(ActionError::NotAuthenticated);
    };

    let is_pending = !expense.status.is_terminal();
    let template = ExpenseDetailTemplate {
        current_user,
        expense,
        is_pending,
    };
    render(&template).into_response()
}

pub async fn approve_confirmation(
    state: State<AppState>,
    cookies: Cookies,
    path: Path<ExpenseId>,
) -> Response {
    confirmation(state, cookies, path, Decision::Approve).await
}

pub async fn reject_confirmation(
    state: State<AppState>,
    cookies: Cookies,
    path: Path<ExpenseId>,
) -> Response {
    confirmation(state, cookies, path, Decision::Reject).await
}

pub async fn approve_expense(
    state: State<AppState>,
    cookies: Cookies,
    path: Path<ExpenseId>,
    form: Form<DecisionForm>,
) -> Response {
    decide(state, cookies, path, form, Decision::Approve).await
}

pub async fn reject_expense(
    state: State<AppState>,
    cookies: Cookies,
    path: Path<ExpenseId>,
    form: Form<DecisionForm>,
) -> Response {
    decide(state, cookies, path, form, Decision::Reject).await
}

async fn confirmation(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(expense_id): Path<ExpenseId>,
    decision: Decision,
) -> Response {
    let store = state.db.read().await;
    let session = get_session(cookies, &state.config, &store.identity);

    let expense = match session.review_target(&store.ledger, expense_id, decision) {
        Ok(expense) => expense,
        Err(err @ ActionError::Ledger(_)) => {
            return redirect_with("/dashboard", "error", &err.to_string()).into_response()
        }
        Err(err) => return error_response(err),
    };
    let Some(current_user) = current_user(&session) else {
        return error_response(ActionError::NotAuthenticated);
    };

    let template = ConfirmTemplate {
        current_user,
        action_path: format!("/expenses/{}/{}", expense.id, decision.verb()),
        expense,
        verb: decision.verb(),
    };
    render(&template).into_response()
}

async fn decide(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(expense_id): Path<ExpenseId>,
    Form(form): Form<DecisionForm>,
    decision: Decision,
) -> Response {
    let mut store = state.db.write().await;
    let mut session = get_session(cookies, &state.config, &store.identity);
    let command = Command::Decide {
        expense_id,
        decision,
        confirmed: form.is_confirmed(),
    };

    match session.dispatch(&mut store, command) {
        Ok(CommandOutcome::Decided(expense)) => {
            let notice = format!("Expense {} successfully!", expense.status().code().to_lowercase());
            redirect_with("/dashboard", "notice", &notice).into_response()
        }
        Ok(_) => Redirect::to("/dashboard").into_response(),
        Err(err @ ActionError::Ledger(_)) => {
            redirect_with("/dashboard", "error", &err.to_string()).into_response()
        }
        Err(err) => error_response(err),
    }
}

fn submitter<P: SessionPersistence>(
    session: &SessionController<P>,
) -> Result<CurrentUser, ActionError> {
    let user = session.current_user().ok_or(ActionError::NotAuthenticated)?;
    ensure_authorized(user, Action::SubmitExpense, None)?;
    Ok(CurrentUser::from_user(user))
}

fn form_page(
    current_user: CurrentUser,
    form: ExpenseFormData,
    error: String,
    status: StatusCode,
) -> Response {
    let selected = form.category.parse::<ExpenseCategory>().ok();
    let categories = ExpenseCategory::known()
        .iter()
        .map(|category| CategoryOption {
            code: category.code().to_string(),
            label: category.label().to_string(),
            selected: selected.as_ref() == Some(category),
        })
        .collect();

    let template = ExpenseFormTemplate {
        current_user,
        categories,
        form,
        today: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
        error,
    };
    match render(&template) {
        Ok(html) => (status, html).into_response(),
        Err(code) => code.into_response(),
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Reads the expense form. The receipt's bytes are drained and dropped;
/// only its file name is kept.
async fn parse_expense_multipart(
    mut multipart: Multipart,
) -> Result<(ExpenseFormData, Option<String>), StatusCode> {
    let mut form = ExpenseFormData::default();
    let mut receipt_file_name = None;

    while let Some(field) = multipart.next_field().await.map_err(|_| StatusCode::BAD_REQUEST)? {
        let name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };

        if name == "receipt" {
            let file_name = field.file_name().map(|s| s.to_string());
            let data = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            if !data.is_empty() {
                receipt_file_name = file_name.filter(|f| !f.trim().is_empty());
            }
        } else {
            let text_value = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            match name.as_str() {
                "description" => form.description = text_value,
                "amount" => form.amount = text_value,
                "expense_date" => form.expense_date = text_value,
                "category" => form.category = text_value,
                "comments" => form.comments = text_value,
                _ => (),
            }
        }
    }
    Ok((form, receipt_file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn form_data_becomes_draft() {
        let form = ExpenseFormData {
            description: "  Taxi ".to_string(),
            amount: "20.5".to_string(),
            expense_date: "2024-02-01".to_string(),
            category: "travel".to_string(),
            comments: "   ".to_string(),
        };

        let draft = form.to_draft(Some("taxi.png".to_string()));
        assert_eq!(draft.description.as_deref(), Some("Taxi"));
        assert_eq!(draft.amount, Some(dec!(20.5)));
        assert_eq!(draft.expense_date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(draft.category, Some(ExpenseCategory::Travel));
        assert_eq!(draft.comments, None);
        assert_eq!(draft.receipt_file_name.as_deref(), Some("taxi.png"));
    }

    #[test]
    fn unparseable_values_are_treated_as_missing() {
        let form = ExpenseFormData {
            amount: "twenty".to_string(),
            expense_date: "01/02/2024".to_string(),
            ..ExpenseFormData::default()
        };

        let draft = form.to_draft(None);
        assert_eq!(draft.amount, None);
        assert_eq!(draft.expense_date, None);
        assert_eq!(draft.category, None);
    }

    #[test]
    fn only_an_explicit_yes_confirms() {
        let yes = DecisionForm {
            confirmed: Some("yes".to_string()),
        };
        let no = DecisionForm {
            confirmed: Some("no".to_string()),
        };
        assert!(yes.is_confirmed());
        assert!(!no.is_confirmed());
        assert!(!DecisionForm::default().is_confirmed());
    }
}
