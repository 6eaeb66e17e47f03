use crate::api::{error_reply, internal_error_reply, with_token};
use crate::auth::TokenCodec;
use crate::store::Store;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

pub fn route(
    store: Store,
    codec: Arc<TokenCodec>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("withdrawals")
        .and(warp::get())
        .and(crate::auth::authenticated(codec))
        .and_then(move |user_id: i64, token: String| handle(store.clone(), user_id, token))
}

async fn handle(store: Store, user_id: i64, token: String) -> Result<Response, Infallible> {
    let reply = match store.list_withdraws(user_id).await {
        Ok(withdrawals) if withdrawals.is_empty() => {
            with_token(error_reply("no withdrawals", StatusCode::NO_CONTENT), &token).into_response()
        }
        Ok(withdrawals) => with_token(
            warp::reply::with_status(warp::reply::json(&withdrawals), StatusCode::OK),
            &token,
        )
        .into_response(),
        Err(err) => internal_error_reply(err, "list_withdraws").into_response(),
    };
    Ok(reply)
}
