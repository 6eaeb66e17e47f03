//! Command-line/environment configuration surface. `structopt`'s `env = "..."` attributes
//! resolve environment variables ahead of flags and flags ahead of defaults, flattening a
//! shared `shared::arguments::Arguments` for the log filter into this binary's own.
use anyhow::Context;
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub struct Arguments {
    #[structopt(flatten)]
    pub shared: shared::arguments::Arguments,

    /// Listen address. Accepts a hostname or an IP, unlike `SocketAddr`'s own parser, which
    /// requires a numeric IP and would reject the documented `localhost:8080` default.
    #[structopt(short = "a", long, env = "RUN_ADDRESS", default_value = "localhost:8080")]
    pub run_address: String,

    #[structopt(short = "d", long, env = "DATABASE_URI")]
    pub database_uri: String,

    #[structopt(short = "r", long, env = "ACCRUAL_SYSTEM_ADDRESS")]
    pub accrual_system_address: url::Url,

    #[structopt(short = "k", long, env = "TOKEN_KEY", default_value = "default")]
    pub token_key: String,

    /// Token lifetime, in seconds.
    #[structopt(short = "t", long, default_value = "3600")]
    pub token_lifetime_seconds: u64,

    /// Database connection pool size.
    #[structopt(long = "pc", default_value = "100")]
    pub pool_size: u32,

    /// Accrual poll interval, in seconds.
    #[structopt(long = "ri", default_value = "1")]
    pub poll_interval_seconds: u64,

    /// Bounded timeout for graceful shutdown of the HTTP listener and the accrual poller.
    #[structopt(long, default_value = "10")]
    pub shutdown_timeout_seconds: u64,
}

impl Arguments {
    /// Resolves `run_address` (a hostname or numeric `IP:port`) to a concrete `SocketAddr`,
    /// taking the first result when a hostname resolves to several.
    pub fn run_address(&self) -> anyhow::Result<SocketAddr> {
        self.run_address
            .to_socket_addrs()
            .with_context(|| format!("resolving RUN_ADDRESS {:?}", self.run_address))?
            .next()
            .with_context(|| format!("RUN_ADDRESS {:?} resolved to no addresses", self.run_address))
    }

    pub fn token_lifetime(&self) -> Duration {
        Duration::from_secs(self.token_lifetime_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_seconds)
    }
}
