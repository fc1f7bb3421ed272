use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::{User, UserId};

pub type ExpenseId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExpenseCategory {
    Travel,
    Food,
    Accommodation,
    Transportation,
    OfficeSupplies,
    Training,
    Other,
    /// Open-ended tag outside the built-in list.
    Custom(String),
}

static KNOWN_CATEGORIES: [ExpenseCategory; 7] = [
    ExpenseCategory::Travel,
    ExpenseCategory::Food,
    ExpenseCategory::Accommodation,
    ExpenseCategory::Transportation,
    ExpenseCategory::OfficeSupplies,
    ExpenseCategory::Training,
    ExpenseCategory::Other,
];

impl ExpenseCategory {
    pub fn known() -> &'static [ExpenseCategory] {
        &KNOWN_CATEGORIES
    }

    pub fn code(&self) -> &str {
        match self {
            ExpenseCategory::Travel => "TRAVEL",
            ExpenseCategory::Food => "FOOD",
            ExpenseCategory::Accommodation => "ACCOMMODATION",
            ExpenseCategory::Transportation => "TRANSPORTATION",
            ExpenseCategory::OfficeSupplies => "OFFICE_SUPPLIES",
            ExpenseCategory::Training => "TRAINING",
            ExpenseCategory::Other => "OTHER",
            ExpenseCategory::Custom(tag) => tag,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ExpenseCategory::Travel => "Travel",
            ExpenseCategory::Food => "Food",
            ExpenseCategory::Accommodation => "Accommodation",
            ExpenseCategory::Transportation => "Transportation",
            ExpenseCategory::OfficeSupplies => "Office Supplies",
            ExpenseCategory::Training => "Training",
            ExpenseCategory::Other => "Other",
            ExpenseCategory::Custom(tag) => tag,
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ExpenseCategory {
    type Err = ();

    /// Known codes match case-insensitively; any other non-blank text
    /// becomes a custom tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(());
        }
        let normalized = trimmed.to_ascii_uppercase().replace([' ', '-'], "_");
        let category = KNOWN_CATEGORIES
            .iter()
            .find(|c| c.code() == normalized)
            .cloned()
            .unwrap_or_else(|| ExpenseCategory::Custom(trimmed.to_string()));
        Ok(category)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpenseStatus {
    Pending,
    Approved,
    Rejected,
}

impl ExpenseStatus {
    pub fn code(self) -> &'static str {
        match self {
            ExpenseStatus::Pending => "PENDING",
            ExpenseStatus::Approved => "APPROVED",
            ExpenseStatus::Rejected => "REJECTED",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, ExpenseStatus::Pending)
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ExpenseStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(ExpenseStatus::Pending),
            "APPROVED" => Ok(ExpenseStatus::Approved),
            "REJECTED" => Ok(ExpenseStatus::Rejected),
            _ => Err(()),
        }
    }
}

/// Outcome a manager can give a pending expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn resulting_status(self) -> ExpenseStatus {
        match self {
            Decision::Approve => ExpenseStatus::Approved,
            Decision::Reject => ExpenseStatus::Rejected,
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Reject => "reject",
        }
    }
}

/// Review state of an expense. The reviewer and timestamp only exist once
/// a decision has been made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Review {
    Pending,
    Decided {
        decision: Decision,
        by: Arc<User>,
        at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense {
    pub id: ExpenseId,
    pub description: String,
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    pub category: ExpenseCategory,
    pub comments: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub employee: Arc<User>,
    pub receipt_file_name: Option<String>,
    pub review: Review,
}

impl Expense {
    pub fn status(&self) -> ExpenseStatus {
        match &self.review {
            Review::Pending => ExpenseStatus::Pending,
            Review::Decided { decision, .. } => decision.resulting_status(),
        }
    }

    pub fn approved_by(&self) -> Option<&Arc<User>> {
        match &self.review {
            Review::Pending => None,
            Review::Decided { by, .. } => Some(by),
        }
    }

    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        match &self.review {
            Review::Pending => None,
            Review::Decided { at, .. } => Some(*at),
        }
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.employee.id == user_id
    }
}

/// Unvalidated expense as submitted from the form.
#[derive(Debug, Clone, Default)]
pub struct ExpenseDraft {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub expense_date: Option<NaiveDate>,
    pub category: Option<ExpenseCategory>,
    pub comments: Option<String>,
    pub receipt_file_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub employee_id: Option<UserId>,
    pub status: Option<ExpenseStatus>,
}

impl ExpenseFilter {
    pub fn matches(&self, expense: &Expense) -> bool {
        self.employee_id.map_or(true, |id| expense.is_owned_by(id))
            && self.status.map_or(true, |status| expense.status() == status)
    }
}
