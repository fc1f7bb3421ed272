pub mod expense;
pub mod rbac;
pub mod role;
pub mod user;

pub use expense::{
    Decision, Expense, ExpenseCategory, ExpenseDraft, ExpenseFilter, ExpenseId, ExpenseStatus,
    Review,
};
pub use rbac::{authorize, capabilities, ensure_authorized, has_capability, Action, Capability};
pub use role::Role;
pub use user::{LoginRequest, NewUser, User, UserId};
