//! Active-dialect detection

use thiserror::Error;
use tracing::debug;

use super::{Connection, ConnectionError};
use crate::config::Config;

/// Adapter name reported by SQLite connections.
pub const SQLITE_ADAPTER: &str = "sqlite3";

#[derive(Debug, Error)]
pub enum DialectError {
    #[error("cannot determine database adapter: {0}")]
    Connection(#[from] ConnectionError),
}

/// Decide whether `conn` targets SQLite.
///
/// Before any connection is open, the adapter declared for the `primary`
/// database in `config` decides. Any other connection failure is an error.
pub fn is_sqlite<C>(conn: &C, config: &Config) -> Result<bool, DialectError>
where
    C: Connection + ?Sized,
{
    match conn.adapter_name() {
        Ok(name) => Ok(name == SQLITE_ADAPTER),
        Err(ConnectionError::NotEstablished) => {
            let declared = config.primary_adapter();
            debug!(?declared, "no connection yet, using configured primary adapter");
            Ok(declared == Some(SQLITE_ADAPTER))
        }
        Err(e) => Err(e.into()),
    }
}
