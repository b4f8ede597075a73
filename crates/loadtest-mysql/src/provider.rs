//! Connection provider over a pool of Galera nodes.

use crate::args::{ConnectionArgs, Endpoint};
use crate::error::MySQLBenchError;
use async_trait::async_trait;
use loadtest_engine::{
    ConnectionError, ConnectionProvider, ErrorCategory, ExecError, Param, ResultSet, Session,
    Statement,
};
use mysql_async::prelude::*;
use mysql_async::{Conn, DriverError, Opts, OptsBuilder, Params, Row, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

// Server error codes, see the MySQL server error reference.
const ER_DUP_ENTRY: u16 = 1062;
const ER_ROW_IS_REFERENCED_2: u16 = 1451;
const ER_NO_REFERENCED_ROW_2: u16 = 1452;
const ER_BAD_NULL_ERROR: u16 = 1048;
const ER_NO_DEFAULT_FOR_FIELD: u16 = 1364;
const ER_LOCK_WAIT_TIMEOUT: u16 = 1205;
const ER_LOCK_DEADLOCK: u16 = 1213;
const ER_QUERY_TIMEOUT: u16 = 3024;
/// Galera node not synced ("WSREP has not yet prepared node for application use").
const ER_UNKNOWN_COM_ERROR: u16 = 1047;

/// Opens one connection per session, spreading sessions across the
/// configured endpoints round-robin.
pub struct MySQLConnectionProvider {
    endpoints: Vec<Endpoint>,
    user: String,
    password: String,
    next: AtomicUsize,
}

impl MySQLConnectionProvider {
    pub fn new(
        endpoints: Vec<Endpoint>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, MySQLBenchError> {
        if endpoints.is_empty() {
            return Err(MySQLBenchError::Config(
                "connection provider needs at least one endpoint".to_string(),
            ));
        }
        Ok(Self {
            endpoints,
            user: user.into(),
            password: password.into(),
            next: AtomicUsize::new(0),
        })
    }

    pub fn from_args(args: &ConnectionArgs) -> Result<Self, MySQLBenchError> {
        Self::new(args.endpoints()?, args.user.clone(), args.password.clone())
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// The endpoint the next `open` call will use.
    fn next_endpoint(&self) -> &Endpoint {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.endpoints.len();
        &self.endpoints[index]
    }

    /// Connection options for `endpoint`, optionally selecting `database`.
    pub fn opts(&self, endpoint: &Endpoint, database: Option<&str>) -> Opts {
        OptsBuilder::default()
            .ip_or_hostname(endpoint.host.clone())
            .tcp_port(endpoint.port)
            .user(Some(self.user.clone()))
            .pass(Some(self.password.clone()))
            .db_name(database.map(str::to_string))
            .into()
    }
}

#[async_trait]
impl ConnectionProvider for MySQLConnectionProvider {
    async fn open(&self, target_name: &str) -> Result<Box<dyn Session>, ConnectionError> {
        let endpoint = self.next_endpoint();
        let conn = Conn::new(self.opts(endpoint, Some(target_name)))
            .await
            .map_err(|e| ConnectionError::new(target_name, format!("{endpoint}: {e}")))?;
        debug!(target = target_name, %endpoint, "Connected");
        Ok(Box::new(MySQLSession {
            conn,
            database: target_name.to_string(),
        }))
    }
}

/// A single connection with its default database selected.
pub struct MySQLSession {
    conn: Conn,
    database: String,
}

#[async_trait]
impl Session for MySQLSession {
    async fn execute(&mut self, statement: &Statement) -> Result<ResultSet, ExecError> {
        let params = Params::Positional(statement.params().iter().map(to_value).collect());
        let rows: Vec<Row> = self
            .conn
            .exec(statement.sql(), params)
            .await
            .map_err(|e| ExecError::new(classify(&e), e.to_string()))?;

        let rows = if rows.is_empty() {
            self.conn.affected_rows()
        } else {
            rows.len() as u64
        };
        Ok(ResultSet { rows })
    }

    async fn close(self: Box<Self>) {
        let MySQLSession { conn, database } = *self;
        if let Err(e) = conn.disconnect().await {
            debug!(database = %database, "Disconnect failed: {e}");
        }
    }
}

fn to_value(param: &Param) -> Value {
    match param {
        Param::Int(v) => Value::Int(*v),
        Param::Text(s) | Param::Decimal(s) => Value::Bytes(s.clone().into_bytes()),
    }
}

/// Map a driver error onto the engine's error categories.
pub fn classify(error: &mysql_async::Error) -> ErrorCategory {
    match error {
        mysql_async::Error::Io(_) => ErrorCategory::Connection,
        mysql_async::Error::Driver(DriverError::ConnectionClosed)
        | mysql_async::Error::Driver(DriverError::PoolDisconnected) => ErrorCategory::Connection,
        mysql_async::Error::Server(server) => match server.code {
            ER_DUP_ENTRY
            | ER_ROW_IS_REFERENCED_2
            | ER_NO_REFERENCED_ROW_2
            | ER_BAD_NULL_ERROR
            | ER_NO_DEFAULT_FOR_FIELD => ErrorCategory::Constraint,
            ER_LOCK_WAIT_TIMEOUT | ER_LOCK_DEADLOCK => ErrorCategory::LockConflict,
            ER_QUERY_TIMEOUT => ErrorCategory::Timeout,
            ER_UNKNOWN_COM_ERROR => ErrorCategory::Connection,
            _ => ErrorCategory::Server,
        },
        _ => ErrorCategory::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mysql_async::ServerError;

    fn server_error(code: u16) -> mysql_async::Error {
        mysql_async::Error::Server(ServerError {
            code,
            message: "injected".to_string(),
            state: "HY000".to_string(),
        })
    }

    #[test]
    fn test_classify_server_errors() {
        assert_eq!(classify(&server_error(1062)), ErrorCategory::Constraint);
        assert_eq!(classify(&server_error(1452)), ErrorCategory::Constraint);
        assert_eq!(classify(&server_error(1213)), ErrorCategory::LockConflict);
        assert_eq!(classify(&server_error(1205)), ErrorCategory::LockConflict);
        assert_eq!(classify(&server_error(3024)), ErrorCategory::Timeout);
        assert_eq!(classify(&server_error(1047)), ErrorCategory::Connection);
        assert_eq!(classify(&server_error(1146)), ErrorCategory::Server);
    }

    #[test]
    fn test_classify_closed_connection() {
        let err = mysql_async::Error::Driver(DriverError::ConnectionClosed);
        assert_eq!(classify(&err), ErrorCategory::Connection);
    }

    #[test]
    fn test_round_robin_over_endpoints() {
        let provider = MySQLConnectionProvider::new(
            vec![Endpoint::new("a", 3306), Endpoint::new("b", 3306)],
            "root",
            "",
        )
        .unwrap();
        let picked: Vec<String> = (0..5)
            .map(|_| provider.next_endpoint().host.clone())
            .collect();
        assert_eq!(picked, vec!["a", "b", "a", "b", "a"]);
    }

    #[test]
    fn test_provider_requires_endpoints() {
        assert!(MySQLConnectionProvider::new(Vec::new(), "root", "").is_err());
    }

    #[test]
    fn test_params_bind_as_values() {
        assert_eq!(to_value(&Param::Int(7)), Value::Int(7));
        assert_eq!(
            to_value(&Param::Decimal("12.50".to_string())),
            Value::Bytes(b"12.50".to_vec())
        );
    }
}
