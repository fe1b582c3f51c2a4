use std::{future::Future, io, sync::Arc, time::Duration};

use axum::Router;
use tokio::{net::TcpListener, sync::Notify, task::JoinHandle};

/// Serve `app` until `signal` resolves, then allow in-flight requests at most `grace`
///
/// Returns `Ok(true)` when every connection finished inside the grace period
/// and `Ok(false)` when the server had to be cut off.
pub async fn serve_with_grace<F>(
    listener: TcpListener,
    app: Router,
    signal: F,
    grace: Duration,
) -> io::Result<bool>
where
    F: Future<Output = ()> + Send + 'static,
{
    let stopping = Arc::new(Notify::new());
    let notify = stopping.clone();

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        signal.await;
        notify.notify_one();
    });
    let mut server: JoinHandle<io::Result<()>> = tokio::spawn(async move { server.await });

    tokio::select! {
        result = &mut server => return join_result(result).map(|()| true),
        _ = stopping.notified() => {}
    }

    match tokio::time::timeout(grace, &mut server).await {
        Ok(result) => join_result(result).map(|()| true),
        Err(_) => {
            server.abort();
            tracing::warn!(
                grace_secs = grace.as_secs_f64(),
                "Connections still open after grace period, closing them"
            );
            Ok(false)
        }
    }
}

fn join_result(result: Result<io::Result<()>, tokio::task::JoinError>) -> io::Result<()> {
    result.map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}
