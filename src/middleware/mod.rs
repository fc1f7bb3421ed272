pub mod permission;

pub use permission::{current_user, get_session, CurrentUser};
