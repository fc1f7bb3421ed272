use super::{Expense, Role, User};
use crate::error::AuthorizationError;

/// Named permission attached to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    SubmitExpenses,
    ViewOwnExpenses,
    ViewAllExpenses,
    ReviewExpenses,
}

impl Capability {
    pub fn name(self) -> &'static str {
        match self {
            Capability::SubmitExpenses => "Submit Expenses",
            Capability::ViewOwnExpenses => "View Own Expenses",
            Capability::ViewAllExpenses => "View All Expenses",
            Capability::ReviewExpenses => "Approve & Reject",
        }
    }
}

/// Something a signed-in user asks to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SubmitExpense,
    ViewOwnExpenses,
    ViewAllExpenses,
    /// Needs a target expense.
    ViewExpense,
    ApproveExpense,
    RejectExpense,
}

const EMPLOYEE_CAPABILITIES: &[Capability] =
    &[Capability::SubmitExpenses, Capability::ViewOwnExpenses];

const MANAGER_CAPABILITIES: &[Capability] =
    &[Capability::ViewAllExpenses, Capability::ReviewExpenses];

pub fn capabilities(role: Role) -> &'static [Capability] {
    match role {
        Role::Employee => EMPLOYEE_CAPABILITIES,
        Role::Manager => MANAGER_CAPABILITIES,
    }
}

pub fn has_capability(role: Role, capability: Capability) -> bool {
    capabilities(role).contains(&capability)
}

pub fn authorize(identity: &User, action: Action, target: Option<&Expense>) -> bool {
    match (identity.role, action) {
        (Role::Employee, Action::SubmitExpense) => true,
        (Role::Employee, Action::ViewOwnExpenses) => true,
        (Role::Employee, Action::ViewExpense) => {
            target.is_some_and(|expense| expense.is_owned_by(identity.id))
        }
        (Role::Employee, Action::ViewAllExpenses)
        | (Role::Employee, Action::ApproveExpense)
        | (Role::Employee, Action::RejectExpense) => false,

        (Role::Manager, Action::ViewAllExpenses)
        | (Role::Manager, Action::ViewExpense)
        | (Role::Manager, Action::ApproveExpense)
        | (Role::Manager, Action::RejectExpense) => true,
        (Role::Manager, Action::SubmitExpense) | (Role::Manager, Action::ViewOwnExpenses) => false,
    }
}

pub fn ensure_authorized(
    identity: &User,
    action: Action,
    target: Option<&Expense>,
) -> Result<(), AuthorizationError> {
    if authorize(identity, action, target) {
        Ok(())
    } else {
        log::warn!(
            "user {} ({}) denied {:?}{}",
            identity.id,
            identity.role,
            action,
            target.map(|e| format!(" on expense #{}", e.id)).unwrap_or_default()
        );
        Err(AuthorizationError::Forbidden)
    }
}
