use serde::{Deserialize, Serialize};

/// Response body of `GET /api/user/balance`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Balance {
    pub current: f64,
    pub withdrawn: f64,
}
