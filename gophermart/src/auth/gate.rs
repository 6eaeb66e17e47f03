//! The auth middleware. Protected routes `.and()` this filter ahead of their handler;
//! `/api/user/register` and `/api/user/login` simply never compose with it, which is how the
//! login/register allow-list is expressed here.
use super::token::TokenCodec;
use crate::realip;
use std::sync::Arc;
use warp::Filter;

#[derive(Debug)]
pub struct Unauthorized;
impl warp::reject::Reject for Unauthorized {}

/// Extracts and verifies the bearer token from the `Authorization` header against the current
/// request's user-agent and client IP, yielding `(user_id, token)` on success. The token is
/// threaded through so handlers can echo it back on the response.
pub fn authenticated(
    codec: Arc<TokenCodec>,
) -> impl Filter<Extract = (i64, String), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and(warp::header::optional::<String>("user-agent"))
        .and(realip::client_ip())
        .and_then(move |token: Option<String>, user_agent: Option<String>, ip: String| {
            let codec = codec.clone();
            async move {
                let token = token.ok_or(()).map_err(|_| warp::reject::custom(Unauthorized))?;
                let user_agent = user_agent.unwrap_or_default();
                codec
                    .verify(&token, &user_agent, &ip)
                    .map(|user_id| (user_id, token.clone()))
                    .map_err(|err| {
                        tracing::debug!(?err, "token verification failed");
                        warp::reject::custom(Unauthorized)
                    })
            }
        })
        .untuple_one()
}
