pub mod accrual;
pub mod api;
pub mod arguments;
pub mod auth;
pub mod compression;
pub mod realip;
pub mod recovery;
pub mod store;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use warp::Filter;

pub use arguments::Arguments;
pub use store::Store;

/// Builds the full HTTP filter (auth gating and route dispatch, with response compression and
/// rejection recovery wrapped around the outside) and spawns it bound to `address`. `shutdown`
/// is a shared signal: notifying it lets the server finish in-flight requests and stop
/// accepting new ones instead of hard-cancelling the task.
pub fn serve_task(
    store: Store,
    token_codec: Arc<auth::TokenCodec>,
    address: SocketAddr,
    shutdown: Arc<Notify>,
) -> JoinHandle<()> {
    let (_, server) = serve_ephemeral(store, token_codec, address, shutdown);
    tokio::task::spawn(server)
}

/// Like `serve_task`, but binds to an OS-assigned port and returns it alongside the bound
/// server future instead of spawning -- used by integration tests that need to know the actual
/// port before issuing requests against it.
pub fn serve_ephemeral(
    store: Store,
    token_codec: Arc<auth::TokenCodec>,
    address: SocketAddr,
    shutdown: Arc<Notify>,
) -> (SocketAddr, impl std::future::Future<Output = ()>) {
    let routes = api::handle_all_routes(store, token_codec);
    let filter = warp::header::optional::<String>("accept-encoding")
        .and(routes)
        .and_then(compression::gzip_if_negotiated)
        .recover(recovery::recover)
        .with(warp::log("gophermart::api"));
    tracing::info!(%address, "serving gophermart");
    warp::serve(filter).bind_with_graceful_shutdown(address, async move {
        shutdown.notified().await;
        tracing::info!("http listener entering graceful shutdown");
    })
}

/// Spawns the accrual poller loop (C7) as a background task. `shutdown` stops the ticker
/// between ticks; a tick already in flight is allowed to finish.
pub fn poller_task(
    store: Store,
    accrual: Arc<accrual::AccrualClient>,
    interval: Duration,
    shutdown: Arc<Notify>,
) -> JoinHandle<()> {
    tokio::task::spawn(async move { accrual::run_poller(store, accrual, interval, shutdown).await })
}
