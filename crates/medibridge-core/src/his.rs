//! HIS database lookups.
//!
//! The only query the bridge needs is the latest visit sequence (`HISCSEC`)
//! for a patient key. Real access goes through ODBC (cargo feature `odbc`);
//! without it, [`UnavailableHis`] reports every lookup as a database error.

use crate::error::{BridgeError, BridgeResult};

pub const LATEST_HISCSEC_SQL: &str =
    "SELECT HISCSEC FROM his.hccom1 WHERE HISCKEY = ? ORDER BY HISCSEC DESC";

pub trait HiscsecSource: Send + Sync {
    /// Highest `HISCSEC` for `hisckey`, or `None` when the patient has no rows.
    /// Blocking; call from `spawn_blocking` in async code.
    fn latest_hiscsec(&self, hisckey: &str) -> BridgeResult<Option<String>>;
}

/// Stand-in used when the binary is built without ODBC support.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableHis;

impl HiscsecSource for UnavailableHis {
    fn latest_hiscsec(&self, _hisckey: &str) -> BridgeResult<Option<String>> {
        Err(BridgeError::Database(
            "HIS access is not available (built without the `odbc` feature)".to_string(),
        ))
    }
}

#[cfg(feature = "odbc")]
pub use odbc::OdbcHis;

#[cfg(feature = "odbc")]
mod odbc {
    use odbc_api::{ConnectionOptions, Cursor, Environment, IntoParameter};

    use super::{HiscsecSource, LATEST_HISCSEC_SQL};
    use crate::error::{BridgeError, BridgeResult};

    /// Opens one connection per lookup.
    pub struct OdbcHis {
        env: Environment,
        connection_string: String,
    }

    impl OdbcHis {
        pub fn new(connection_string: impl Into<String>) -> BridgeResult<Self> {
            let env = Environment::new().map_err(db_error)?;
            Ok(Self {
                env,
                connection_string: connection_string.into(),
            })
        }
    }

    impl HiscsecSource for OdbcHis {
        fn latest_hiscsec(&self, hisckey: &str) -> BridgeResult<Option<String>> {
            let conn = self
                .env
                .connect_with_connection_string(&self.connection_string, ConnectionOptions::default())
                .map_err(db_error)?;
            let param = hisckey.into_parameter();
            let Some(mut cursor) = conn
                .execute(LATEST_HISCSEC_SQL, &param, None)
                .map_err(db_error)?
            else {
                return Ok(None);
            };
            let Some(mut row) = cursor.next_row().map_err(db_error)? else {
                return Ok(None);
            };
            let mut buf = Vec::new();
            if !row.get_text(1, &mut buf).map_err(db_error)? {
                return Ok(None);
            }
            Ok(Some(String::from_utf8_lossy(&buf).trim().to_string()))
        }
    }

    fn db_error(e: odbc_api::Error) -> BridgeError {
        BridgeError::Database(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_reports_database_error() {
        let err = UnavailableHis.latest_hiscsec("1001").unwrap_err();
        assert!(matches!(err, BridgeError::Database(_)));
        assert_eq!(err.status_code(), 500);
    }
}
