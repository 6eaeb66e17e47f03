use super::Store;
use anyhow::Context;
use model::{Order, OrderStatus};

#[derive(Debug, thiserror::Error)]
pub enum AddOrderError {
    #[error("order owned by another user")]
    Conflict,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AddOrderOutcome {
    Accepted,
    AlreadyYours,
}

const SELECT_OWNER: &str = "SELECT user_id FROM orders WHERE number = $1";

impl Store {
    /// Inserts `number` as a new order owned by `user_id`, or classifies the existing owner if
    /// one is already present. Runs directly against the pool rather than inside a transaction:
    /// Postgres aborts the whole transaction on a unique-constraint violation, which would make
    /// the race re-read below fail too. The unique-constraint race (two callers inserting the
    /// same number concurrently) is instead resolved by re-reading the owner against a fresh
    /// connection after the losing insert fails, exactly as a non-racing lookup would have
    /// classified it.
    pub async fn add_order(
        &self,
        user_id: i64,
        number: &str,
    ) -> Result<AddOrderOutcome, AddOrderError> {
        let existing: Option<i64> = sqlx::query_scalar(SELECT_OWNER)
            .bind(number)
            .fetch_optional(&self.pool)
            .await
            .context("add_order lookup")?;
        if let Some(owner) = existing {
            return classify_owner(owner, user_id);
        }
        const INSERT: &str = "INSERT INTO orders (number, user_id) VALUES ($1, $2)";
        match sqlx::query(INSERT)
            .bind(number)
            .bind(user_id)
            .execute(&self.pool)
            .await
        {
            Ok(_) => Ok(AddOrderOutcome::Accepted),
            Err(err) if Store::is_unique_violation(&err) => {
                let owner: Option<i64> = sqlx::query_scalar(SELECT_OWNER)
                    .bind(number)
                    .fetch_optional(&self.pool)
                    .await
                    .context("add_order race re-read")?;
                classify_owner(owner.context("order vanished after unique violation")?, user_id)
            }
            Err(err) => Err(AddOrderError::Internal(
                anyhow::Error::new(err).context("insert order"),
            )),
        }
    }

    pub async fn list_orders(&self, user_id: i64) -> anyhow::Result<Vec<Order>> {
        const QUERY: &str = "\
            SELECT number, status, accrual, created_at \
            FROM orders WHERE user_id = $1 ORDER BY id DESC";
        let rows: Vec<(String, String, f64, chrono::DateTime<chrono::Utc>)> = sqlx::query_as(QUERY)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .context("list_orders")?;
        rows.into_iter()
            .map(|(number, status, accrual, uploaded_at)| {
                let status: OrderStatus = status.parse().context("parse order status")?;
                Ok(Order {
                    number,
                    status,
                    accrual: matches!(status, OrderStatus::Processed).then_some(accrual),
                    uploaded_at,
                })
            })
            .collect()
    }

    /// Orders in a non-terminal status, oldest first, for the accrual poller to fan out over.
    pub async fn list_open_orders(&self) -> anyhow::Result<Vec<String>> {
        const QUERY: &str = "\
            SELECT number FROM orders \
            WHERE status NOT IN ('INVALID', 'PROCESSED') \
            ORDER BY id ASC";
        sqlx::query_scalar(QUERY)
            .fetch_all(&self.pool)
            .await
            .context("list_open_orders")
    }

    /// Applies a status/amount reported by the accrual service. Re-checks inside the
    /// transaction that the order is still non-terminal before mutating -- a guard against two
    /// concurrent polling ticks both fetching the same order before either applied, which
    /// without this check could double-credit the user's balance, on top of
    /// `list_open_orders` already filtering terminal orders out of future ticks. If the order
    /// has since vanished (should not happen; never deleted), this is a no-op rather than an
    /// error, since there is nothing left to apply to.
    pub async fn apply_accrual(
        &self,
        number: &str,
        status: OrderStatus,
        amount: f64,
    ) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await.context("begin apply_accrual")?;
        const SELECT: &str = "SELECT id, user_id, status FROM orders WHERE number = $1 FOR UPDATE";
        let row: Option<(i64, i64, String)> = sqlx::query_as(SELECT)
            .bind(number)
            .fetch_optional(&mut tx)
            .await
            .context("apply_accrual lookup")?;
        let (order_id, user_id, current_status) = match row {
            Some(row) => row,
            None => return Ok(()),
        };
        let current: OrderStatus = current_status.parse().context("parse current status")?;
        if current.is_terminal() {
            return Ok(());
        }
        const UPDATE_ORDER: &str = "\
            UPDATE orders SET status = $1, accrual = $2, updated_at = now() WHERE id = $3";
        sqlx::query(UPDATE_ORDER)
            .bind(status.as_str())
            .bind(amount)
            .bind(order_id)
            .execute(&mut tx)
            .await
            .context("update order")?;
        if matches!(status, OrderStatus::Processed) && amount > 0.0 {
            const CREDIT: &str = "\
                UPDATE users SET balance = balance + $1, updated_at = now() WHERE id = $2";
            sqlx::query(CREDIT)
                .bind(amount)
                .bind(user_id)
                .execute(&mut tx)
                .await
                .context("credit balance")?;
        }
        tx.commit().await.context("commit apply_accrual")?;
        Ok(())
    }
}

fn classify_owner(owner: i64, user_id: i64) -> Result<AddOrderOutcome, AddOrderError> {
    if owner == user_id {
        Ok(AddOrderOutcome::AlreadyYours)
    } else {
        Err(AddOrderError::Conflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_owner_distinguishes_self_from_others() {
        assert_eq!(classify_owner(1, 1).unwrap(), AddOrderOutcome::AlreadyYours);
        assert!(matches!(classify_owner(1, 2), Err(AddOrderError::Conflict)));
    }
}
