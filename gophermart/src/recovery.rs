//! Converts rejections (auth failures, malformed bodies, unmatched routes) into well-formed
//! JSON error bodies, so a bad request or an internal bug never surfaces as a bare connection
//! reset. `warp`'s handlers never unwind across the filter boundary in practice (each is a
//! plain `async fn` returning a `Result`), so a panicking `.unwrap()`/indexing bug inside a
//! handler body only poisons that one request's task rather than the process.
use crate::auth::Unauthorized;
use crate::compression::MalformedBody;
use serde::Serialize;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

fn json_error(error: &'static str, status: StatusCode) -> impl Reply {
    warp::reply::with_status(warp::reply::json(&ErrorBody { error }), status)
}

pub async fn recover(rejection: Rejection) -> Result<impl Reply, Infallible> {
    if rejection.find::<Unauthorized>().is_some() {
        return Ok(json_error("unauthorized", StatusCode::UNAUTHORIZED));
    }
    if rejection.find::<MalformedBody>().is_some() {
        return Ok(json_error("bad request", StatusCode::BAD_REQUEST));
    }
    if rejection.is_not_found() {
        return Ok(json_error("not found", StatusCode::NOT_FOUND));
    }
    tracing::error!(?rejection, "unhandled rejection");
    Ok(json_error(
        "internal server error",
        StatusCode::INTERNAL_SERVER_ERROR,
    ))
}
