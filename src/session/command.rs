use std::sync::Arc;

use crate::models::{Decision, Expense, ExpenseDraft, ExpenseId, LoginRequest, NewUser, User};

/// A user-initiated action. Each maps to exactly one core call.
#[derive(Debug, Clone)]
pub enum Command {
    Login(LoginRequest),
    Register(NewUser),
    Logout,
    Submit(ExpenseDraft),
    /// `confirmed` is the answer to the "are you sure?" prompt; `false`
    /// aborts without touching the ledger.
    Decide {
        expense_id: ExpenseId,
        decision: Decision,
        confirmed: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    LoggedIn(Arc<User>),
    Registered(Arc<User>),
    LoggedOut,
    Submitted(Expense),
    Decided(Expense),
    Cancelled,
}
