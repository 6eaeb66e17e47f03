use crate::api::{error_reply, internal_error_reply, with_token};
use crate::auth::TokenCodec;
use crate::compression;
use crate::store::{AddWithdrawError, Store};
use model::luhn;
use model::WithdrawRequest;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

pub fn route(
    store: Store,
    codec: Arc<TokenCodec>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("balance" / "withdraw")
        .and(warp::post())
        .and(crate::auth::authenticated(codec))
        .and(compression::json_body::<WithdrawRequest>())
        .and_then(move |user_id: i64, token: String, body: WithdrawRequest| {
            handle(store.clone(), user_id, token, body)
        })
}

async fn handle(
    store: Store,
    user_id: i64,
    token: String,
    body: WithdrawRequest,
) -> Result<Response, Infallible> {
    if body.sum <= 0.0 {
        return Ok(with_token(
            error_reply("sum must be positive", StatusCode::BAD_REQUEST),
            &token,
        )
        .into_response());
    }
    if !luhn::valid(&body.order) {
        return Ok(with_token(
            error_reply("order number fails the Luhn check", StatusCode::UNPROCESSABLE_ENTITY),
            &token,
        )
        .into_response());
    }
    let reply = match store.add_withdraw(user_id, &body.order, body.sum).await {
        Ok(()) => with_token(error_reply("withdrawn", StatusCode::OK), &token).into_response(),
        Err(AddWithdrawError::InsufficientFunds) => with_token(
            error_reply("insufficient funds", StatusCode::PAYMENT_REQUIRED),
            &token,
        )
        .into_response(),
        Err(AddWithdrawError::DuplicateNumber) => with_token(
            error_reply("order number already used for a withdrawal", StatusCode::CONFLICT),
            &token,
        )
        .into_response(),
        Err(AddWithdrawError::Internal(err)) => {
            internal_error_reply(err, "add_withdraw").into_response()
        }
    };
    Ok(reply)
}
