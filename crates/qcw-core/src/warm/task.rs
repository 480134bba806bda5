//! Per-user cache-warm task.

use std::sync::Arc;

use crate::config::ServerSettings;
use crate::qrs::{
    security_header, Count, QrsConnection, QrsError, Table, APP_COUNT_PATH, APP_TABLE_PATH,
    SECURITY_HEADER,
};
use crate::users::UserIdentity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarmOutcome {
    pub app_count: u64,
    pub listed: Option<usize>,
}

/// Opens a new connection impersonating `identity` and issues the app count
/// request, followed by the app table request when `table_body` is given.
pub async fn warm_user(
    server: &ServerSettings,
    identity: &UserIdentity,
    upn_suffix: Option<&str>,
    table_body: Option<&[u8]>,
) -> Result<WarmOutcome, QrsError> {
    let mut conn = QrsConnection::open(server, identity);
    conn.set_header(SECURITY_HEADER, security_header(&identity.user, upn_suffix));
    let conn = Arc::new(conn);

    let count: Count = conn.get_async(APP_COUNT_PATH).await?.json()?;

    let listed = match table_body {
        Some(body) => {
            let table: Table = conn.post_async(APP_TABLE_PATH, body.to_vec()).await?.json()?;
            Some(table.rows.len())
        }
        None => None,
    };

    Ok(WarmOutcome {
        app_count: count.value,
        listed,
    })
}
