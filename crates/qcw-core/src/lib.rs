pub mod config;
pub mod logging;

pub mod certs;
pub mod qrs;
pub mod scheduler;
pub mod users;
pub mod warm;
