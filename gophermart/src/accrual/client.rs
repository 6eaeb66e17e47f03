//! The external accrual service's documented contract: `GET {base}/api/orders/{number}`.
use model::OrderStatus;
use serde::Deserialize;
use std::error::Error as _;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct AccrualResponse {
    #[allow(dead_code)]
    pub order: String,
    pub status: AccrualStatus,
    #[serde(default)]
    pub accrual: f64,
}

/// The accrual service's own status vocabulary, a superset of `OrderStatus` (it also reports
/// `REGISTERED` for an order it has accepted but not yet started scoring).
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccrualStatus {
    Registered,
    Invalid,
    Processing,
    Processed,
}

impl AccrualStatus {
    pub fn into_order_status(self) -> OrderStatus {
        match self {
            AccrualStatus::Registered => OrderStatus::New,
            AccrualStatus::Invalid => OrderStatus::Invalid,
            AccrualStatus::Processing => OrderStatus::Processing,
            AccrualStatus::Processed => OrderStatus::Processed,
        }
    }
}

pub enum PollOutcome {
    Applied { status: OrderStatus, accrual: f64 },
    RateLimited { retry_after: Duration },
    Skipped,
}

pub struct AccrualClient {
    http: reqwest::Client,
    base_url: reqwest::Url,
}

const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

impl AccrualClient {
    pub fn new(http: reqwest::Client, base_url: reqwest::Url) -> Self {
        Self { http, base_url }
    }

    /// Issues one `GET {base}/api/orders/{number}` and classifies the response. Transport
    /// errors are classified so the caller can log "connection refused" (the accrual system
    /// considered down, not broken) at `debug` and everything else at `warn`.
    pub async fn poll(&self, number: &str) -> Result<PollOutcome, reqwest::Error> {
        let url = self
            .base_url
            .join(&format!("api/orders/{number}"))
            .expect("order numbers are plain ASCII digits and never break URL parsing");
        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                if is_connection_refused(&err) {
                    tracing::debug!(%number, "accrual service unreachable");
                } else {
                    tracing::warn!(%number, error = %err, "accrual request failed");
                }
                return Err(err);
            }
        };
        match response.status() {
            reqwest::StatusCode::OK => {
                let body: AccrualResponse = match response.json().await {
                    Ok(body) => body,
                    Err(err) => {
                        tracing::warn!(%number, error = %err, "malformed accrual response body");
                        return Ok(PollOutcome::Skipped);
                    }
                };
                Ok(PollOutcome::Applied {
                    status: body.status.into_order_status(),
                    accrual: body.accrual,
                })
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_RETRY_AFTER);
                Ok(PollOutcome::RateLimited { retry_after })
            }
            other => {
                tracing::warn!(%number, status = %other, "unexpected accrual response status");
                Ok(PollOutcome::Skipped)
            }
        }
    }
}

fn is_connection_refused(err: &reqwest::Error) -> bool {
    err.source()
        .and_then(|source| source.downcast_ref::<std::io::Error>())
        .map_or(false, |io_err| io_err.kind() == std::io::ErrorKind::ConnectionRefused)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accrual_statuses_map_onto_order_states() {
        assert!(matches!(
            AccrualStatus::Registered.into_order_status(),
            OrderStatus::New
        ));
        assert!(matches!(
            AccrualStatus::Processing.into_order_status(),
            OrderStatus::Processing
        ));
        assert!(matches!(
            AccrualStatus::Invalid.into_order_status(),
            OrderStatus::Invalid
        ));
        assert!(matches!(
            AccrualStatus::Processed.into_order_status(),
            OrderStatus::Processed
        ));
    }
}
