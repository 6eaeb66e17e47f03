use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request body of `POST /api/user/balance/withdraw`.
#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawRequest {
    pub order: String,
    pub sum: f64,
}

/// A debit against a user's balance, as returned by `GET /api/user/withdrawals`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Withdraw {
    pub order: String,
    pub sum: f64,
    pub processed_at: DateTime<Utc>,
}
