use crate::api::{error_reply, internal_error_reply, text_body, with_token};
use crate::auth::TokenCodec;
use crate::store::{AddOrderError, AddOrderOutcome, Store};
use model::luhn;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

pub fn post_route(
    store: Store,
    codec: Arc<TokenCodec>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("orders")
        .and(warp::post())
        .and(crate::auth::authenticated(codec))
        .and(text_body())
        .and_then(move |user_id: i64, token: String, body: String| {
            handle_post(store.clone(), user_id, token, body)
        })
}

async fn handle_post(
    store: Store,
    user_id: i64,
    token: String,
    body: String,
) -> Result<Response, Infallible> {
    let number = body.trim();
    if number.is_empty() {
        return Ok(with_token(
            error_reply("order number is required", StatusCode::BAD_REQUEST),
            &token,
        )
        .into_response());
    }
    if !luhn::valid(number) {
        return Ok(with_token(
            error_reply("order number fails the Luhn check", StatusCode::UNPROCESSABLE_ENTITY),
            &token,
        )
        .into_response());
    }
    let reply = match store.add_order(user_id, number).await {
        Ok(AddOrderOutcome::Accepted) => with_token(
            error_reply("accepted", StatusCode::ACCEPTED),
            &token,
        )
        .into_response(),
        Ok(AddOrderOutcome::AlreadyYours) => with_token(
            error_reply("already submitted", StatusCode::OK),
            &token,
        )
        .into_response(),
        Err(AddOrderError::Conflict) => with_token(
            error_reply("order belongs to another user", StatusCode::CONFLICT),
            &token,
        )
        .into_response(),
        Err(AddOrderError::Internal(err)) => internal_error_reply(err, "add_order").into_response(),
    };
    Ok(reply)
}

pub fn get_route(
    store: Store,
    codec: Arc<TokenCodec>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("orders")
        .and(warp::get())
        .and(crate::auth::authenticated(codec))
        .and_then(move |user_id: i64, token: String| handle_get(store.clone(), user_id, token))
}

async fn handle_get(store: Store, user_id: i64, token: String) -> Result<Response, Infallible> {
    let reply = match store.list_orders(user_id).await {
        Ok(orders) if orders.is_empty() => {
            with_token(error_reply("no orders", StatusCode::NO_CONTENT), &token).into_response()
        }
        Ok(orders) => with_token(
            warp::reply::with_status(warp::reply::json(&orders), StatusCode::OK),
            &token,
        )
        .into_response(),
        Err(err) => internal_error_reply(err, "list_orders").into_response(),
    };
    Ok(reply)
}
