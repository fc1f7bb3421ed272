//! Session controller: the single owner of "who is signed in".
//!
//! Every user action enters through [`SessionController::dispatch`], which
//! checks the authorization policy before touching the ledger. Login and
//! registration are also exposed on their own so the web layer can run
//! password hashing without holding the store's write lock.

pub mod command;
pub mod persistence;

use std::sync::Arc;

pub use command::{Command, CommandOutcome};
pub use persistence::{CookieSession, PersistedSession, SessionPersistence, SESSION_COOKIE};

use crate::{
    database::{ExpenseLedger, IdentityStore, PreparedUser, Store},
    error::{ActionError, LedgerError},
    models::{
        capabilities, ensure_authorized, Action, Capability, Decision, ExpenseFilter, ExpenseId,
        LoginRequest, User,
    },
    projection::{self, DashboardView, ExpenseDetail},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated(Arc<User>),
}

pub struct SessionController<P> {
    state: SessionState,
    persistence: P,
}

impl<P: SessionPersistence> SessionController<P> {
    /// Resumes the persisted session, if any. A session whose user no longer
    /// resolves is cleared.
    pub fn restore(persistence: P, identity: &IdentityStore) -> Self {
        let state = match persistence.load_session() {
            Some(saved) => match identity.find_by_id(saved.user_id) {
                Some(user) if user.email == saved.email => SessionState::Authenticated(user),
                _ => {
                    log::info!("clearing stale session for user {}", saved.user_id);
                    persistence.clear_session();
                    SessionState::Anonymous
                }
            },
            None => SessionState::Anonymous,
        };

        Self { state, persistence }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_user(&self) -> Option<&Arc<User>> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            SessionState::Anonymous => None,
        }
    }

    pub fn capabilities(&self) -> &'static [Capability] {
        self.current_user()
            .map(|user| capabilities(user.role))
            .unwrap_or_default()
    }

    pub fn dispatch(
        &mut self,
        store: &mut Store,
        command: Command,
    ) -> Result<CommandOutcome, ActionError> {
        match command {
            Command::Login(request) => self.login(&store.identity, request),
            Command::Register(candidate) => {
                let prepared = IdentityStore::prepare(candidate, store.identity.hash_cost())?;
                self.register(&mut store.identity, prepared)
            }
            Command::Logout => {
                self.persistence.clear_session();
                if let SessionState::Authenticated(user) = &self.state {
                    log::info!("user {} logged out", user.id);
                }
                self.state = SessionState::Anonymous;
                Ok(CommandOutcome::LoggedOut)
            }
            Command::Submit(draft) => {
                let user = self.require_user()?;
                ensure_authorized(&user, Action::SubmitExpense, None)?;
                let expense = store.ledger.submit(Arc::clone(&user), draft)?;
                log::info!(
                    "expense #{} submitted by user {} for {}",
                    expense.id,
                    user.id,
                    expense.amount
                );
                Ok(CommandOutcome::Submitted(expense))
            }
            Command::Decide {
                expense_id,
                decision,
                confirmed,
            } => {
                let user = self.require_user()?;
                ensure_authorized(
                    &user,
                    review_action(decision),
                    store.ledger.find_by_id(expense_id),
                )?;
                if !confirmed {
                    return Ok(CommandOutcome::Cancelled);
                }
                let expense = match decision {
                    Decision::Approve => store.ledger.approve(expense_id, Arc::clone(&user)),
                    Decision::Reject => store.ledger.reject(expense_id, Arc::clone(&user)),
                }
                .map_err(|err| {
                    log::warn!("user {} could not {} expense: {}", user.id, decision.verb(), err);
                    err
                })?;
                log::info!("expense #{} {} by user {}", expense.id, expense.status(), user.id);
                Ok(CommandOutcome::Decided(expense))
            }
        }
    }

    /// Login only reads the identity store, so callers can hold a shared
    /// lock while the password is verified.
    pub fn login(
        &mut self,
        identity: &IdentityStore,
        request: LoginRequest,
    ) -> Result<CommandOutcome, ActionError> {
        let user = match identity.authenticate(&request.email, &request.password) {
            Ok(user) => user,
            Err(err) => {
                log::warn!("failed login attempt for {}", request.email);
                return Err(err.into());
            }
        };
        self.persistence.save_session(&user)?;
        log::info!("user {} ({}) logged in", user.id, user.role);
        self.state = SessionState::Authenticated(Arc::clone(&user));
        Ok(CommandOutcome::LoggedIn(user))
    }

    /// Finishes a registration whose password was hashed beforehand.
    pub fn register(
        &mut self,
        identity: &mut IdentityStore,
        prepared: PreparedUser,
    ) -> Result<CommandOutcome, ActionError> {
        let user = identity.insert(prepared)?;
        log::info!("registered user {} as {}", user.id, user.role);
        Ok(CommandOutcome::Registered(user))
    }

    pub fn dashboard(
        &self,
        ledger: &ExpenseLedger,
        filter: ExpenseFilter,
    ) -> Result<DashboardView, ActionError> {
        let user = self.require_user()?;
        Ok(projection::dashboard(ledger, &user, filter))
    }

    pub fn expense_detail(
        &self,
        ledger: &ExpenseLedger,
        expense_id: ExpenseId,
    ) -> Result<ExpenseDetail, ActionError> {
        let user = self.require_user()?;
        let expense = ledger.find_by_id(expense_id);
        ensure_authorized(&user, Action::ViewExpense, expense)?;
        let expense = expense.ok_or(LedgerError::NotFound(expense_id))?;
        Ok(ExpenseDetail::from(expense))
    }

    /// The expense a reviewer is about to decide on, for the confirmation
    /// prompt. Fails the same way the decision itself would.
    pub fn review_target(
        &self,
        ledger: &ExpenseLedger,
        expense_id: ExpenseId,
        decision: Decision,
    ) -> Result<ExpenseDetail, ActionError> {
        let user = self.require_user()?;
        let expense = ledger.find_by_id(expense_id);
        ensure_authorized(&user, review_action(decision), expense)?;
        let expense = expense.ok_or(LedgerError::NotFound(expense_id))?;
        if expense.status().is_terminal() {
            return Err(LedgerError::InvalidTransition {
                id: expense_id,
                status: expense.status(),
            }
            .into());
        }
        Ok(ExpenseDetail::from(expense))
    }

    fn require_user(&self) -> Result<Arc<User>, ActionError> {
        self.current_user().cloned().ok_or(ActionError::NotAuthenticated)
    }
}

fn review_action(decision: Decision) -> Action {
    match decision {
        Decision::Approve => Action::ApproveExpense,
        Decision::Reject => Action::RejectExpense,
    }
}
