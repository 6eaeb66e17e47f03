use gophermart::accrual::AccrualClient;
use gophermart::auth::TokenCodec;
use gophermart::{poller_task, serve_task, Arguments, Store};
use std::sync::Arc;
use structopt::StructOpt;
use tokio::sync::Notify;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Arguments::from_args();
    shared::tracing::initialize(args.shared.log_filter.as_str());
    tracing::info!(?args, "starting gophermart");

    let store = Store::new(&args.database_uri, args.pool_size).await?;
    let token_codec = Arc::new(TokenCodec::new(&args.token_key, args.token_lifetime()));
    let http_client = shared::http_client(args.shared.http_timeout);
    let accrual = Arc::new(AccrualClient::new(
        http_client,
        args.accrual_system_address.clone(),
    ));

    let shutdown = Arc::new(Notify::new());
    let serve = serve_task(store.clone(), token_codec, args.run_address()?, shutdown.clone());
    let poller = poller_task(store.clone(), accrual, args.poll_interval(), shutdown.clone());
    tokio::pin!(serve);
    tokio::pin!(poller);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received interrupt, shutting down");
        }
        result = &mut serve => {
            tracing::error!(?result, "HTTP listener exited unexpectedly");
        }
        result = &mut poller => {
            tracing::error!(?result, "accrual poller exited unexpectedly");
        }
    }

    // Wakes both the server's graceful-shutdown future and the poller's ticker loop; neither
    // is hard-cancelled, so an in-flight request or poll tick gets to finish within the timeout.
    shutdown.notify_waiters();
    let _ = tokio::time::timeout(args.shutdown_timeout(), async {
        let _ = (&mut serve).await;
        let _ = (&mut poller).await;
    })
    .await;

    store.close().await;
    Ok(())
}
