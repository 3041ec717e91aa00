use super::handler::{router, MockState};
use crate::domain::contract::Interaction;
use axum::Router;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// How long `stop` waits for in-flight requests before aborting them.
const STOP_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
pub enum MockServerError {
    #[error("failed to bind mock server: {0}")]
    Bind(#[source] std::io::Error),

    #[error("mock server is already running at {0}")]
    AlreadyRunning(String),

    #[error("mock server has not been started")]
    NotStarted,

    #[error("mock server task failed: {0}")]
    Serve(String),
}

struct Running {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

/// HTTP server that answers with the responses of registered interactions.
///
/// Interactions are matched in registration order. Every matched request
/// is recorded, including repeats. Requests that match nothing get a 500
/// naming the method and path and are not recorded.
#[derive(Default)]
pub struct MockServer {
    state: MockState,
    running: Option<Running>,
}

impl MockServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, interaction: Interaction) {
        tracing::debug!(description = %interaction.description, "interaction registered");
        self.state.interactions.write().await.push(interaction);
    }

    /// Drops every registered interaction and the recorded history.
    pub async fn clear(&self) {
        self.state.interactions.write().await.clear();
        self.state.recorded.write().await.clear();
    }

    /// Interactions that served a request, in arrival order.
    pub async fn recorded_interactions(&self) -> Vec<Interaction> {
        self.state.recorded.read().await.clone()
    }

    /// The router serving this mock, for embedding in another server.
    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Binds an ephemeral port on 127.0.0.1 and starts serving.
    ///
    /// The listener is bound before this returns, so the URL accepts
    /// connections immediately.
    pub async fn start(&mut self) -> Result<(), MockServerError> {
        if let Some(running) = &self.running {
            return Err(MockServerError::AlreadyRunning(format!("http://{}", running.addr)));
        }

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(MockServerError::Bind)?;
        let addr = listener.local_addr().map_err(MockServerError::Bind)?;
        let (shutdown, signal) = oneshot::channel::<()>();

        let app = self.router();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = signal.await;
                })
                .await
        });

        tracing::info!(%addr, "mock server started");
        self.running = Some(Running {
            addr,
            shutdown,
            handle,
        });
        Ok(())
    }

    pub fn addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.addr)
    }

    /// `http://127.0.0.1:<port>` while running.
    pub fn base_url(&self) -> Result<String, MockServerError> {
        self.addr()
            .map(|addr| format!("http://{}", addr))
            .ok_or(MockServerError::NotStarted)
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Stops accepting connections and waits briefly for in-flight requests.
    ///
    /// Once this returns the port is closed. Stopping a server that is not
    /// running is a no-op.
    pub async fn stop(&mut self) -> Result<(), MockServerError> {
        let Some(Running {
            addr,
            shutdown,
            mut handle,
        }) = self.running.take()
        else {
            return Ok(());
        };

        let _ = shutdown.send(());
        let outcome = match tokio::time::timeout(STOP_GRACE, &mut handle).await {
            Ok(joined) => joined,
            Err(_) => {
                tracing::warn!(%addr, "mock server did not drain in time; aborting");
                handle.abort();
                handle.await
            }
        };

        tracing::info!(%addr, "mock server stopped");
        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(MockServerError::Serve(e.to_string())),
            Err(e) if e.is_cancelled() => Ok(()),
            Err(e) => Err(MockServerError::Serve(e.to_string())),
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.handle.abort();
        }
    }
}
