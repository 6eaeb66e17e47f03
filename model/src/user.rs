use serde::Deserialize;

/// Request body shared by `POST /api/user/register` and `POST /api/user/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.login.is_empty() || self.password.is_empty()
    }
}
