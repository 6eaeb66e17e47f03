use super::Store;
use anyhow::Context;
use model::Withdraw;

#[derive(Debug, thiserror::Error)]
pub enum AddWithdrawError {
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("withdrawal number already used")]
    DuplicateNumber,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl Store {
    /// Debits `sum` from the user's balance and records a withdrawal tagged with `number`, all
    /// inside one transaction. Locks the user row with `FOR UPDATE` before checking the balance
    /// so this serializes against concurrent `add_withdraw` and `apply_accrual` calls for the
    /// same user.
    pub async fn add_withdraw(
        &self,
        user_id: i64,
        number: &str,
        sum: f64,
    ) -> Result<(), AddWithdrawError> {
        let mut tx = self.pool.begin().await.context("begin add_withdraw")?;
        const LOCK_USER: &str = "SELECT balance FROM users WHERE id = $1 FOR UPDATE";
        let balance: f64 = sqlx::query_scalar(LOCK_USER)
            .bind(user_id)
            .fetch_one(&mut tx)
            .await
            .context("lock user row")?;
        if balance < sum {
            return Err(AddWithdrawError::InsufficientFunds);
        }
        const DEBIT: &str = "\
            UPDATE users SET balance = balance - $1, withdrawn = withdrawn + $1, updated_at = now() \
            WHERE id = $2";
        sqlx::query(DEBIT)
            .bind(sum)
            .bind(user_id)
            .execute(&mut tx)
            .await
            .context("debit balance")?;
        const INSERT: &str = "INSERT INTO withdraws (number, user_id, sum) VALUES ($1, $2, $3)";
        match sqlx::query(INSERT)
            .bind(number)
            .bind(user_id)
            .bind(sum)
            .execute(&mut tx)
            .await
        {
            Ok(_) => {
                tx.commit().await.context("commit add_withdraw")?;
                Ok(())
            }
            Err(err) if Store::is_unique_violation(&err) => Err(AddWithdrawError::DuplicateNumber),
            Err(err) => Err(AddWithdrawError::Internal(
                anyhow::Error::new(err).context("insert withdraw"),
            )),
        }
    }

    pub async fn list_withdraws(&self, user_id: i64) -> anyhow::Result<Vec<Withdraw>> {
        const QUERY: &str = "\
            SELECT number, sum, created_at FROM withdraws \
            WHERE user_id = $1 ORDER BY id DESC";
        let rows: Vec<(String, f64, chrono::DateTime<chrono::Utc>)> = sqlx::query_as(QUERY)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .context("list_withdraws")?;
        Ok(rows
            .into_iter()
            .map(|(order, sum, processed_at)| Withdraw {
                order,
                sum,
                processed_at,
            })
            .collect())
    }
}
