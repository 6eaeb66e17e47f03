//! Transparent request decompression and response compression, as plain `flate2` wrapping
//! rather than a framework-bundled layer.
use bytes::Bytes;
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use serde::de::DeserializeOwned;
use std::io::{Read, Write};
use warp::http::{header, Response, StatusCode};
use warp::hyper::Body;
use warp::{Filter, Rejection, Reply};

#[derive(Debug)]
pub struct MalformedBody;
impl warp::reject::Reject for MalformedBody {}

fn gunzip(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Raw request body, transparently gunzipped when `Content-Encoding: gzip` is present.
pub fn body_bytes() -> impl Filter<Extract = (Bytes,), Error = Rejection> + Clone {
    warp::header::optional::<String>("content-encoding")
        .and(warp::body::bytes())
        .and_then(|encoding: Option<String>, bytes: Bytes| async move {
            if encoding.map_or(false, |e| e.contains("gzip")) {
                gunzip(&bytes)
                    .map(Bytes::from)
                    .map_err(|_| warp::reject::custom(MalformedBody))
            } else {
                Ok(bytes)
            }
        })
}

/// A JSON body, decompressed the same way `body_bytes` does for a raw one.
pub fn json_body<T: DeserializeOwned + Send + 'static>(
) -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    body_bytes().and_then(|bytes: Bytes| async move {
        serde_json::from_slice(&bytes).map_err(|_| warp::reject::custom(MalformedBody))
    })
}

/// A plain-text body (used by the order-number submission endpoint, which is not JSON).
pub fn text_body() -> impl Filter<Extract = (String,), Error = Rejection> + Clone {
    body_bytes().and_then(|bytes: Bytes| async move {
        String::from_utf8(bytes.to_vec()).map_err(|_| warp::reject::custom(MalformedBody))
    })
}

/// Wraps the final reply: if the client offered gzip and the *actual* response is a 200 with a
/// `Content-Type` of `application/json` or `text/html`, gzip-compresses the body and sets
/// `Content-Encoding: gzip`. Any other status or content type passes through uncompressed even
/// when gzip was offered.
pub async fn gzip_if_negotiated(
    accept_encoding: Option<String>,
    reply: impl Reply,
) -> Result<Response<Body>, std::convert::Infallible> {
    let response = reply.into_response();
    let wants_gzip = accept_encoding.map_or(false, |h| h.contains("gzip"));
    let compressible = response.status() == StatusCode::OK
        && response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(false, |ct| {
                ct.starts_with("application/json") || ct.starts_with("text/html")
            });
    if !wants_gzip || !compressible {
        return Ok(response);
    }
    let (mut parts, body) = response.into_parts();
    let bytes = match warp::hyper::body::to_bytes(body).await {
        Ok(bytes) => bytes,
        Err(_) => return Ok(Response::from_parts(parts, Body::empty())),
    };
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    let compressed = match encoder.write_all(&bytes).and_then(|_| encoder.finish()) {
        Ok(compressed) => compressed,
        Err(_) => return Ok(Response::from_parts(parts, Body::from(bytes))),
    };
    parts
        .headers
        .insert(header::CONTENT_ENCODING, header::HeaderValue::from_static("gzip"));
    parts
        .headers
        .insert(header::CONTENT_LENGTH, header::HeaderValue::from(compressed.len()));
    Ok(Response::from_parts(parts, Body::from(compressed)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_when_client_did_not_offer_gzip() {
        let reply = warp::reply::with_status(warp::reply::json(&"ok"), StatusCode::OK);
        let response = gzip_if_negotiated(None, reply).await.unwrap();
        assert!(response.headers().get(header::CONTENT_ENCODING).is_none());
    }

    #[tokio::test]
    async fn passes_through_non_200_even_when_gzip_offered() {
        let reply = warp::reply::with_status(warp::reply::json(&"nope"), StatusCode::NOT_FOUND);
        let response = gzip_if_negotiated(Some("gzip".into()), reply).await.unwrap();
        assert!(response.headers().get(header::CONTENT_ENCODING).is_none());
    }

    #[tokio::test]
    async fn compresses_a_200_json_reply_when_gzip_offered() {
        let reply = warp::reply::with_status(warp::reply::json(&"ok"), StatusCode::OK);
        let response = gzip_if_negotiated(Some("gzip, deflate".into()), reply)
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_ENCODING).unwrap(),
            "gzip"
        );
    }

    #[test]
    fn gunzip_inverts_gzip_encoding() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"hello world").unwrap();
        let compressed = encoder.finish().unwrap();
        assert_eq!(gunzip(&compressed).unwrap(), b"hello world");
    }
}
