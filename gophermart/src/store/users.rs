use super::Store;
use crate::auth::password as password_hash;
use anyhow::Context;
use model::Balance;

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("login already registered")]
    DuplicateLogin,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum AuthenticateError {
    /// Covers both "no such login" and "wrong password", indistinguishably, so a caller cannot
    /// use this outcome to enumerate registered logins.
    #[error("no matching user")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl Store {
    pub async fn register(
        &self,
        login: &str,
        password: &str,
        user_agent: &str,
        ip: &str,
    ) -> Result<i64, RegisterError> {
        let hash = password_hash::hash(password)?;
        const QUERY: &str = "\
            INSERT INTO users (login, password_hash, last_user_agent, last_ip) \
            VALUES ($1, $2, $3, $4) \
            RETURNING id";
        sqlx::query_scalar::<_, i64>(QUERY)
            .bind(login)
            .bind(hash)
            .bind(user_agent)
            .bind(ip)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                if Store::is_unique_violation(&err) {
                    RegisterError::DuplicateLogin
                } else {
                    RegisterError::Internal(anyhow::Error::new(err).context("register"))
                }
            })
    }

    pub async fn authenticate(
        &self,
        login: &str,
        password: &str,
        user_agent: &str,
        ip: &str,
    ) -> Result<i64, AuthenticateError> {
        const SELECT: &str = "SELECT id, password_hash FROM users WHERE login = $1";
        let row: Option<(i64, String)> = sqlx::query_as(SELECT)
            .bind(login)
            .fetch_optional(&self.pool)
            .await
            .context("authenticate lookup")?;
        let (id, hash) = row.ok_or(AuthenticateError::NotFound)?;
        if !password_hash::verify(password, &hash) {
            return Err(AuthenticateError::NotFound);
        }
        const UPDATE: &str = "\
            UPDATE users SET last_user_agent = $1, last_ip = $2, updated_at = now() \
            WHERE id = $3";
        sqlx::query(UPDATE)
            .bind(user_agent)
            .bind(ip)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("authenticate update")?;
        Ok(id)
    }

    pub async fn get_balance(&self, user_id: i64) -> anyhow::Result<Balance> {
        const QUERY: &str = "SELECT balance, withdrawn FROM users WHERE id = $1";
        let (current, withdrawn): (f64, f64) = sqlx::query_as(QUERY)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .context("get_balance")?;
        Ok(Balance { current, withdrawn })
    }
}
