//! Expense ledger: owns every expense record and its review lifecycle.
//!
//! The ledger performs no role checks. Callers apply the authorization
//! policy before invoking `approve`/`reject`.

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;

use crate::{
    error::{LedgerError, ValidationError},
    models::{
        Decision, Expense, ExpenseDraft, ExpenseFilter, ExpenseId, ExpenseStatus, Review, User,
        UserId,
    },
};

#[derive(Debug)]
pub struct ExpenseLedger {
    records: Vec<Expense>,
    next_id: ExpenseId,
}

impl Default for ExpenseLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpenseLedger {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }

    /// Builds a ledger from existing records, kept in the given order. New
    /// ids continue after the highest existing one.
    pub fn with_records(records: Vec<Expense>) -> Self {
        let next_id = records.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        Self { records, next_id }
    }

    pub fn submit(
        &mut self,
        employee: Arc<User>,
        draft: ExpenseDraft,
    ) -> Result<Expense, ValidationError> {
        let description = draft
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let mut missing = Vec::new();
        if description.is_none() {
            missing.push("description");
        }
        if draft.amount.is_none() {
            missing.push("amount");
        }
        if draft.expense_date.is_none() {
            missing.push("expense date");
        }
        if draft.category.is_none() {
            missing.push("category");
        }

        let (Some(description), Some(amount), Some(expense_date), Some(category)) =
            (description, draft.amount, draft.expense_date, draft.category)
        else {
            return Err(ValidationError::MissingFields(missing));
        };

        let amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount);
        }

        let expense = Expense {
            id: self.next_id,
            description,
            amount,
            expense_date,
            category,
            comments: non_blank(draft.comments),
            submitted_at: Utc::now(),
            employee,
            receipt_file_name: non_blank(draft.receipt_file_name),
            review: Review::Pending,
        };

        self.next_id += 1;
        self.records.push(expense.clone());
        Ok(expense)
    }

    pub fn approve(&mut self, id: ExpenseId, approver: Arc<User>) -> Result<Expense, LedgerError> {
        self.decide(id, Decision::Approve, approver)
    }

    pub fn reject(&mut self, id: ExpenseId, approver: Arc<User>) -> Result<Expense, LedgerError> {
        self.decide(id, Decision::Reject, approver)
    }

    /// PENDING -> APPROVED/REJECTED. Terminal records are left untouched.
    pub fn decide(
        &mut self,
        id: ExpenseId,
        decision: Decision,
        approver: Arc<User>,
    ) -> Result<Expense, LedgerError> {
        let expense = self
            .records
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(LedgerError::NotFound(id))?;

        if expense.status() != ExpenseStatus::Pending {
            return Err(LedgerError::InvalidTransition {
                id,
                status: expense.status(),
            });
        }

        expense.review = Review::Decided {
            decision,
            by: approver,
            at: Utc::now(),
        };
        Ok(expense.clone())
    }

    pub fn find_by_id(&self, id: ExpenseId) -> Option<&Expense> {
        self.records.iter().find(|e| e.id == id)
    }

    pub fn list_by_employee(&self, employee_id: UserId) -> Vec<&Expense> {
        self.records
            .iter()
            .filter(|e| e.is_owned_by(employee_id))
            .collect()
    }

    pub fn list_all(&self) -> &[Expense] {
        &self.records
    }

    pub fn list_pending(&self) -> Vec<&Expense> {
        self.list_filtered(ExpenseFilter {
            status: Some(ExpenseStatus::Pending),
            ..ExpenseFilter::default()
        })
    }

    pub fn list_filtered(&self, filter: ExpenseFilter) -> Vec<&Expense> {
        self.records.iter().filter(|e| filter.matches(e)).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
