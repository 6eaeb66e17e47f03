pub mod arguments;
pub mod tracing;

use std::time::Duration;

/// The standard http client used to call the accrual service.
pub fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::ClientBuilder::new()
        .timeout(timeout)
        .user_agent(concat!("gophermart/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap()
}
