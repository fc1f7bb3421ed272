//! Demo users and expenses loaded at startup when seeding is enabled.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::{ExpenseLedger, IdentityStore};
use crate::{
    error::RegistrationError,
    models::{Decision, Expense, ExpenseCategory, NewUser, Review, Role, User},
};

pub const DEMO_PASSWORD: &str = "password";
pub const DEMO_EMPLOYEE_EMAIL: &str = "employee@demo.com";
pub const DEMO_MANAGER_EMAIL: &str = "manager@demo.com";

pub fn seed_users(identity: &mut IdentityStore) -> Result<(Arc<User>, Arc<User>), RegistrationError> {
    let employee = identity.register(NewUser {
        name: "John Employee".to_string(),
        email: DEMO_EMPLOYEE_EMAIL.to_string(),
        password: DEMO_PASSWORD.to_string(),
        department: "IT".to_string(),
        role: Some(Role::Employee),
    })?;
    let manager = identity.register(NewUser {
        name: "Jane Manager".to_string(),
        email: DEMO_MANAGER_EMAIL.to_string(),
        password: DEMO_PASSWORD.to_string(),
        department: "IT".to_string(),
        role: Some(Role::Manager),
    })?;
    Ok((employee, manager))
}

pub fn seed_ledger(employee: &Arc<User>, manager: &Arc<User>) -> ExpenseLedger {
    let records = vec![
        Expense {
            id: 1,
            description: "Business lunch with client".to_string(),
            amount: Decimal::new(8550, 2),
            expense_date: date(2024, 1, 15),
            category: ExpenseCategory::Food,
            comments: Some("Discussed new project requirements".to_string()),
            submitted_at: timestamp(date(2024, 1, 15), 14, 30),
            employee: Arc::clone(employee),
            receipt_file_name: Some("lunch_receipt.jpg".to_string()),
            review: Review::Pending,
        },
        Expense {
            id: 2,
            description: "Flight to conference".to_string(),
            amount: Decimal::new(45000, 2),
            expense_date: date(2024, 1, 10),
            category: ExpenseCategory::Travel,
            comments: Some("Annual tech conference attendance".to_string()),
            submitted_at: timestamp(date(2024, 1, 10), 9, 15),
            employee: Arc::clone(employee),
            receipt_file_name: Some("flight_ticket.pdf".to_string()),
            review: Review::Decided {
                decision: Decision::Approve,
                by: Arc::clone(manager),
                at: timestamp(date(2024, 1, 11), 10, 30),
            },
        },
    ];
    ExpenseLedger::with_records(records)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn timestamp(day: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    day.and_hms_opt(hour, minute, 0)
        .map(|at| at.and_utc())
        .unwrap_or_default()
}
