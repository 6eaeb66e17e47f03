use crate::api::{error_reply, internal_error_reply, with_token};
use crate::auth::TokenCodec;
use crate::compression;
use crate::realip;
use crate::store::{RegisterError, Store};
use model::Credentials;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

pub fn route(
    store: Store,
    codec: Arc<TokenCodec>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("register")
        .and(warp::post())
        .and(compression::json_body::<Credentials>())
        .and(warp::header::optional::<String>("user-agent"))
        .and(realip::client_ip())
        .and_then(move |credentials: Credentials, user_agent: Option<String>, ip: String| {
            handle(store.clone(), codec.clone(), credentials, user_agent.unwrap_or_default(), ip)
        })
}

async fn handle(
    store: Store,
    codec: Arc<TokenCodec>,
    credentials: Credentials,
    user_agent: String,
    ip: String,
) -> Result<Response, Infallible> {
    if credentials.is_empty() || ip.is_empty() {
        return Ok(
            error_reply("login and password are required", StatusCode::BAD_REQUEST).into_response(),
        );
    }
    let reply = match store
        .register(&credentials.login, &credentials.password, &user_agent, &ip)
        .await
    {
        Ok(user_id) => match codec.issue(user_id, &credentials.login, &user_agent, &ip) {
            Ok(token) => with_token(error_reply("registered", StatusCode::OK), &token).into_response(),
            Err(err) => internal_error_reply(err, "issuing token").into_response(),
        },
        Err(RegisterError::DuplicateLogin) => {
            error_reply("login already taken", StatusCode::CONFLICT).into_response()
        }
        Err(RegisterError::Internal(err)) => internal_error_reply(err, "register").into_response(),
    };
    Ok(reply)
}
