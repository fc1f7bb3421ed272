pub mod identity;
pub mod ledger;
pub mod seed;

use std::sync::Arc;
use tokio::sync::RwLock;

pub use identity::{IdentityStore, PreparedUser};
pub use ledger::ExpenseLedger;

use crate::{config::Config, error::RegistrationError};

/// All process-resident state.
#[derive(Debug)]
pub struct Store {
    pub identity: IdentityStore,
    pub ledger: ExpenseLedger,
}

/// Shared handle. Every mutation runs under the write lock, so a status
/// check and the transition that follows it cannot interleave with another
/// request.
pub type Database = Arc<RwLock<Store>>;

pub fn create_database(config: &Config) -> Result<Database, RegistrationError> {
    let mut identity = IdentityStore::new(config.bcrypt_cost);

    let ledger = if config.seed_demo_data {
        let (employee, manager) = seed::seed_users(&mut identity)?;
        let ledger = seed::seed_ledger(&employee, &manager);
        log::info!(
            "Seeded {} demo users and {} demo expenses",
            identity.len(),
            ledger.len()
        );
        ledger
    } else {
        ExpenseLedger::new()
    };

    Ok(Arc::new(RwLock::new(Store { identity, ledger })))
}
