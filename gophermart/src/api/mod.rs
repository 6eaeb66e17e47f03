mod balance;
mod login;
mod orders;
mod register;
mod withdraw;
mod withdrawals;

use crate::auth::TokenCodec;
use crate::compression;
use crate::store::Store;
use serde::Serialize;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::Filter;

/// All seven user-facing endpoints, aggregated under `/api/user`. The response-compression
/// wrapper is applied by the caller (`serve_task`), since it needs the request's
/// `Accept-Encoding` header, which is easier to thread through once at the top than per route.
pub fn handle_all_routes(
    store: Store,
    codec: Arc<TokenCodec>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("api" / "user" / ..).and(
        register::route(store.clone(), codec.clone())
            .or(login::route(store.clone(), codec.clone()))
            .or(orders::post_route(store.clone(), codec.clone()))
            .or(orders::get_route(store.clone(), codec.clone()))
            .or(balance::route(store.clone(), codec.clone()))
            .or(withdraw::route(store.clone(), codec.clone()))
            .or(withdrawals::route(store, codec)),
    )
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

pub(crate) fn error_reply(message: &str, status: StatusCode) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(&ErrorBody { error: message }), status)
}

pub(crate) fn internal_error_reply(err: anyhow::Error, context: &str) -> WithStatus<Json> {
    tracing::error!(?err, context, "internal error");
    error_reply("internal server error", StatusCode::INTERNAL_SERVER_ERROR)
}

/// Stamps the bearer token the request was authenticated with back onto the response.
pub(crate) fn with_token(
    reply: WithStatus<Json>,
    token: &str,
) -> warp::reply::WithHeader<WithStatus<Json>> {
    warp::reply::with_header(reply, "Authorization", token)
}

pub(crate) use compression::text_body;
