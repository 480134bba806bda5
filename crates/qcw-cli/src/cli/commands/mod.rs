//! CLI command handlers. Each command is in its own file.

mod check_users;
mod docs;
mod probe;
mod warm;

pub use check_users::run_check_users;
pub use docs::{run_completions, run_man};
pub use probe::run_probe;
pub use warm::run_warm;
