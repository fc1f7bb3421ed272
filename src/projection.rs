//! Read-only views derived from the ledger for the signed-in user.
//!
//! Nothing here mutates state; handlers recompute a projection on every
//! request, so it always reflects the last completed mutation.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::{
    database::ExpenseLedger,
    models::{
        capabilities, Capability, Expense, ExpenseFilter, ExpenseId, ExpenseStatus, Role, User,
    },
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmployeeSummary {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagerSummary {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRow {
    pub id: ExpenseId,
    pub employee_name: String,
    pub description: String,
    pub category: String,
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    pub status: ExpenseStatus,
}

impl From<&Expense> for ExpenseRow {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id,
            employee_name: expense.employee.name.clone(),
            description: expense.description.clone(),
            category: expense.category.code().to_string(),
            amount: expense.amount,
            expense_date: expense.expense_date,
            status: expense.status(),
        }
    }
}

/// Everything the detail page shows, with optional values flattened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseDetail {
    pub id: ExpenseId,
    pub description: String,
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    pub category: String,
    pub status: ExpenseStatus,
    pub employee_name: String,
    pub employee_department: String,
    pub comments: String,
    pub receipt_file_name: String,
    pub submitted_at: DateTime<Utc>,
    pub approved_by: String,
    pub approved_at: Option<DateTime<Utc>>,
}

impl From<&Expense> for ExpenseDetail {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id,
            description: expense.description.clone(),
            amount: expense.amount,
            expense_date: expense.expense_date,
            category: expense.category.label().to_string(),
            status: expense.status(),
            employee_name: expense.employee.name.clone(),
            employee_department: expense.employee.department.clone(),
            comments: expense.comments.clone().unwrap_or_default(),
            receipt_file_name: expense.receipt_file_name.clone().unwrap_or_default(),
            submitted_at: expense.submitted_at,
            approved_by: expense
                .approved_by()
                .map(|u| u.name.clone())
                .unwrap_or_default(),
            approved_at: expense.approved_at(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeDashboard {
    pub summary: EmployeeSummary,
    pub expenses: Vec<ExpenseRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerDashboard {
    pub summary: ManagerSummary,
    /// Actionable rows.
    pub pending: Vec<ExpenseRow>,
    /// Read-only rows, narrowed by the requested filter.
    pub all: Vec<ExpenseRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardView {
    Employee(EmployeeDashboard),
    Manager(ManagerDashboard),
}

pub fn employee_summary(ledger: &ExpenseLedger, identity: &User) -> EmployeeSummary {
    ledger
        .list_by_employee(identity.id)
        .into_iter()
        .fold(EmployeeSummary::default(), |mut summary, expense| {
            summary.total += 1;
            match expense.status() {
                ExpenseStatus::Pending => summary.pending += 1,
                ExpenseStatus::Approved => summary.approved += 1,
                ExpenseStatus::Rejected => summary.rejected += 1,
            }
            summary
        })
}

pub fn manager_summary(ledger: &ExpenseLedger) -> ManagerSummary {
    ledger
        .list_all()
        .iter()
        .fold(ManagerSummary::default(), |mut summary, expense| {
            summary.total += 1;
            match expense.status() {
                ExpenseStatus::Pending => summary.pending += 1,
                ExpenseStatus::Approved => summary.approved += 1,
                ExpenseStatus::Rejected => summary.rejected += 1,
            }
            summary
        })
}

pub fn employee_rows(ledger: &ExpenseLedger, identity: &User) -> Vec<ExpenseRow> {
    rows(ledger.list_by_employee(identity.id))
}

pub fn pending_rows(ledger: &ExpenseLedger) -> Vec<ExpenseRow> {
    rows(ledger.list_pending())
}

pub fn all_rows(ledger: &ExpenseLedger, filter: ExpenseFilter) -> Vec<ExpenseRow> {
    rows(ledger.list_filtered(filter))
}

/// Picks the projection for the identity's role. `filter` only narrows the
/// manager's read-only list.
pub fn dashboard(ledger: &ExpenseLedger, identity: &User, filter: ExpenseFilter) -> DashboardView {
    match identity.role {
        Role::Employee => DashboardView::Employee(EmployeeDashboard {
            summary: employee_summary(ledger, identity),
            expenses: employee_rows(ledger, identity),
        }),
        Role::Manager => DashboardView::Manager(ManagerDashboard {
            summary: manager_summary(ledger),
            pending: pending_rows(ledger),
            all: all_rows(ledger, filter),
        }),
    }
}

/// Capability labels shown on the dashboard.
pub fn capability_labels(role: Role) -> Vec<&'static str> {
    capabilities(role).iter().copied().map(Capability::name).collect()
}

fn rows(expenses: Vec<&Expense>) -> Vec<ExpenseRow> {
    expenses.into_iter().map(ExpenseRow::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::seed;
    use crate::database::IdentityStore;
    use crate::models::{ExpenseCategory, ExpenseDraft};
    use rust_decimal_macros::dec;

    fn seeded() -> (ExpenseLedger, std::sync::Arc<User>, std::sync::Arc<User>) {
        let mut identity = IdentityStore::new(4);
        let (john, jane) = seed::seed_users(&mut identity).unwrap();
        (seed::seed_ledger(&john, &jane), john, jane)
    }

    fn taxi() -> ExpenseDraft {
        ExpenseDraft {
            description: Some("Taxi".to_string()),
            amount: Some(dec!(20.00)),
            expense_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            category: Some(ExpenseCategory::Travel),
            ..ExpenseDraft::default()
        }
    }

    #[test]
    fn submitting_taxi_updates_employee_summary() {
        let (mut ledger, john, _) = seeded();

        let expense = ledger.submit(john.clone(), taxi()).unwrap();
        assert_eq!(expense.id, 3);
        assert_eq!(expense.status(), ExpenseStatus::Pending);

        assert_eq!(
            employee_summary(&ledger, &john),
            EmployeeSummary {
                total: 3,
                pending: 2,
                approved: 1,
                rejected: 0
            }
        );
    }

    #[test]
    fn manager_summary_counts_every_status() {
        let (mut ledger, john, jane) = seeded();
        let submitted = ledger.submit(john, taxi()).unwrap();
        ledger.reject(submitted.id, jane).unwrap();

        assert_eq!(
            manager_summary(&ledger),
            ManagerSummary {
                total: 3,
                pending: 1,
                approved: 1,
                rejected: 1
            }
        );
    }

    #[test]
    fn dashboard_dispatches_on_role() {
        let (ledger, john, jane) = seeded();

        match dashboard(&ledger, &john, ExpenseFilter::default()) {
            DashboardView::Employee(view) => {
                assert_eq!(view.expenses.len(), 2);
                assert_eq!(view.summary.pending, 1);
            }
            other => panic!("expected employee view, got {other:?}"),
        }

        match dashboard(&ledger, &jane, ExpenseFilter::default()) {
            DashboardView::Manager(view) => {
                assert_eq!(view.pending.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);
                assert_eq!(view.all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
            }
            other => panic!("expected manager view, got {other:?}"),
        }
    }

    #[test]
    fn manager_filter_narrows_only_the_read_only_list() {
        let (ledger, _, jane) = seeded();
        let filter = ExpenseFilter {
            status: Some(ExpenseStatus::Approved),
            ..ExpenseFilter::default()
        };

        let DashboardView::Manager(view) = dashboard(&ledger, &jane, filter) else {
            panic!("expected manager view");
        };
        assert_eq!(view.all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(view.pending.len(), 1);
        assert_eq!(view.summary.total, 2);
    }

    #[test]
    fn other_employees_rows_are_not_projected() {
        let (mut ledger, john, _) = seeded();
        let mary = std::sync::Arc::new(User {
            id: 99,
            name: "Mary Sales".to_string(),
            email: "mary@demo.com".to_string(),
            ..(*john).clone()
        });
        ledger.submit(mary.clone(), taxi()).unwrap();

        assert_eq!(employee_rows(&ledger, &mary).len(), 1);
        assert_eq!(employee_rows(&ledger, &john).len(), 2);
    }

    #[test]
    fn detail_flattens_review_fields() {
        let (ledger, _, _) = seeded();
        let pending = ExpenseDetail::from(ledger.find_by_id(1).unwrap());
        let approved = ExpenseDetail::from(ledger.find_by_id(2).unwrap());

        assert_eq!(pending.approved_by, "");
        assert!(pending.approved_at.is_none());
        assert_eq!(pending.receipt_file_name, "lunch_receipt.jpg");
        assert_eq!(approved.approved_by, "Jane Manager");
        assert!(approved.approved_at.is_some());
    }
}
