pub mod pool;
pub mod rls;

pub use pool::{create_pool, run_migrations};
pub use rls::{set_current_user, CURRENT_USER_SETTING};
