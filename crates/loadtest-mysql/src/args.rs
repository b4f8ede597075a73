//! CLI argument groups shared by the populate, run, and cleanup commands.

use crate::error::MySQLBenchError;
use clap::Args;
use loadtest_engine::RowCounts;
use std::fmt;

/// Cluster connection settings.
#[derive(Args, Clone, Debug)]
pub struct ConnectionArgs {
    /// Comma-separated cluster endpoints (`host` or `host:port`)
    #[arg(long, env = "DB_HOSTS", value_delimiter = ',', default_value = "127.0.0.1")]
    pub hosts: Vec<String>,

    /// Port used for endpoints that do not name one
    #[arg(long, env = "DB_PORT", default_value = "3306")]
    pub port: u16,

    /// Database user
    #[arg(long, env = "DB_USER", default_value = "root")]
    pub user: String,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    /// Prefix of the benchmark database names (`{prefix}test{i}`)
    #[arg(long, env = "BENCHMARK_DB_PREFIX", default_value = "bench_")]
    pub prefix: String,
}

impl ConnectionArgs {
    /// Parse the host list into endpoints.
    pub fn endpoints(&self) -> Result<Vec<Endpoint>, MySQLBenchError> {
        let endpoints = self
            .hosts
            .iter()
            .map(|h| h.trim())
            .filter(|h| !h.is_empty())
            .map(|h| Endpoint::parse(h, self.port))
            .collect::<Result<Vec<_>, _>>()?;
        if endpoints.is_empty() {
            return Err(MySQLBenchError::Config(
                "at least one host is required".to_string(),
            ));
        }
        Ok(endpoints)
    }

    /// Connection URL for `endpoint`, including the password.
    ///
    /// Only for display after masking.
    pub fn connection_url(&self, endpoint: &Endpoint) -> String {
        format!(
            "mysql://{}:{}@{}:{}",
            self.user, self.password, endpoint.host, endpoint.port
        )
    }
}

/// One cluster node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse `host` or `host:port`.
    pub fn parse(value: &str, default_port: u16) -> Result<Self, MySQLBenchError> {
        match value.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() => {
                let port = port.parse::<u16>().map_err(|_| {
                    MySQLBenchError::Config(format!("invalid port in endpoint '{value}'"))
                })?;
                Ok(Self::new(host, port))
            }
            Some(_) => Err(MySQLBenchError::Config(format!(
                "missing host in endpoint '{value}'"
            ))),
            None => Ok(Self::new(value, default_port)),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Size of the benchmark dataset.
#[derive(Args, Clone, Debug)]
pub struct DatasetArgs {
    /// Number of benchmark databases
    #[arg(long, env = "BENCHMARK_NUM_DATABASES", default_value = "5")]
    pub databases: usize,

    /// Rows in `users` per database
    #[arg(long, env = "BENCHMARK_NUM_USERS", default_value = "1000")]
    pub users: u64,

    /// Rows in `products` per database
    #[arg(long, env = "BENCHMARK_NUM_PRODUCTS", default_value = "500")]
    pub products: u64,

    /// Rows in `orders` per database
    #[arg(long, env = "BENCHMARK_NUM_ORDERS", default_value = "2000")]
    pub orders: u64,

    /// Rows in `order_items` per database
    #[arg(long, env = "BENCHMARK_NUM_ORDER_ITEMS", default_value = "5000")]
    pub order_items: u64,
}

impl DatasetArgs {
    pub fn row_counts(&self) -> RowCounts {
        RowCounts::new(self.users, self.products, self.orders, self.order_items)
    }
}
