//! `qcw check-users` – parse a user file offline.

use anyhow::Result;
use qcw_core::users;
use std::path::Path;

pub fn run_check_users(path: &Path) -> Result<()> {
    let list = users::load_users(path)?;
    println!("{} valid users", list.identities.len());
    if list.rejected.is_empty() {
        return Ok(());
    }
    println!("{} lines skipped:", list.rejected.len());
    println!("{:<6} {:<22} {}", "LINE", "REASON", "CONTENT");
    for r in &list.rejected {
        println!("{:<6} {:<22} {:?}", r.line_no, r.reason.to_string(), r.content);
    }
    Ok(())
}
