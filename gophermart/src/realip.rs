//! Client IP extraction, ahead of auth gating in the middleware chain (spec C4 runs "after
//! RealIP extraction").
use std::convert::Infallible;
use std::net::SocketAddr;
use warp::Filter;

/// Prefers a proxy-forwarded address (`X-Real-IP`, then the first hop of `X-Forwarded-For`)
/// over the raw socket peer, falling back to an empty string if neither the headers nor the
/// peer address are available (e.g. a unix socket listener).
pub fn client_ip() -> impl Filter<Extract = (String,), Error = Infallible> + Clone {
    warp::header::optional::<String>("x-real-ip")
        .and(warp::header::optional::<String>("x-forwarded-for"))
        .and(warp::filters::addr::remote())
        .map(
            |real_ip: Option<String>, forwarded: Option<String>, remote: Option<SocketAddr>| {
                real_ip
                    .or_else(|| {
                        forwarded.and_then(|header| {
                            header.split(',').next().map(|s| s.trim().to_owned())
                        })
                    })
                    .or_else(|| remote.map(|addr| addr.ip().to_string()))
                    .unwrap_or_default()
            },
        )
}
