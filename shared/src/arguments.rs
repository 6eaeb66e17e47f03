//! Contains command line arguments and related helpers that are shared between the binaries.
use anyhow::Result;
use std::{num::ParseFloatError, time::Duration};

#[derive(Debug, structopt::StructOpt)]
pub struct Arguments {
    #[structopt(
        long,
        env = "LOG_FILTER",
        default_value = "warn,gophermart=debug,shared=debug"
    )]
    pub log_filter: String,

    /// Timeout for http requests made to the accrual service.
    #[structopt(
        long,
        default_value = "10",
        parse(try_from_str = duration_from_seconds),
    )]
    pub http_timeout: Duration,
}

pub fn duration_from_seconds(s: &str) -> Result<Duration, ParseFloatError> {
    Ok(Duration::from_secs_f32(s.parse()?))
}
