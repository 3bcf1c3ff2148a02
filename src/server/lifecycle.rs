//! Starting and stopping the preview server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::{HomePage, SiteSettings};

use super::handler::{ServeState, serve_file};

/// How long `stop` waits for in-flight requests before aborting them.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("refusing to listen on {addr}: the preview server only binds loopback addresses")]
    NotLoopback { addr: SocketAddr },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    /// Port to listen on; 0 picks a free one
    pub port: u16,
    /// Directory the site is served from
    pub root: PathBuf,
    pub home_page: HomePage,
}

impl ServerConfig {
    pub fn from_settings(settings: &SiteSettings, root: impl Into<PathBuf>) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.server_port,
            root: root.into(),
            home_page: settings.home_page,
        }
    }
}

struct Running {
    addr: SocketAddr,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

/// A static file server that can be started and stopped repeatedly.
pub struct SiteServer {
    config: ServerConfig,
    running: Option<Running>,
}

pub fn router(state: Arc<ServeState>) -> Router {
    Router::new()
        .fallback(serve_file)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

impl SiteServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            running: None,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// The bound address while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.addr)
    }

    /// Bind and start accepting connections in the background.
    ///
    /// Does nothing if the server is already running. The host must resolve
    /// to loopback addresses only. On a bind failure the server stays
    /// stopped.
    pub async fn start(&mut self) -> Result<SocketAddr, ServerError> {
        if let Some(running) = &self.running {
            return Ok(running.addr);
        }

        let addr = format!("{}:{}", self.config.host, self.config.port);
        let bind_error = |source| ServerError::Bind {
            addr: addr.clone(),
            source,
        };
        let candidates: Vec<SocketAddr> = tokio::net::lookup_host(&addr)
            .await
            .map_err(bind_error)?
            .collect();
        if let Some(exposed) = candidates.iter().find(|a| !a.ip().is_loopback()) {
            return Err(ServerError::NotLoopback { addr: *exposed });
        }
        let listener = TcpListener::bind(candidates.as_slice())
            .await
            .map_err(bind_error)?;
        let local = listener.local_addr().map_err(bind_error)?;

        let shutdown = CancellationToken::new();
        let state = Arc::new(ServeState {
            root: self.config.root.clone(),
            home_page: self.config.home_page,
            shutdown: shutdown.clone(),
        });
        let app = router(state);
        let signal = shutdown.clone().cancelled_owned();

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(signal).await {
                error!(error = %e, "server error");
            }
        });

        info!(addr = %local, root = %self.config.root.display(), "server listening");
        self.running = Some(Running {
            addr: local,
            shutdown,
            task,
        });
        Ok(local)
    }

    /// Stop accepting connections and wait until the socket is released.
    ///
    /// Does nothing if the server is not running.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        running.shutdown.cancel();
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut running.task).await.is_err() {
            warn!("graceful shutdown timed out, aborting open connections");
            running.task.abort();
            let _ = (&mut running.task).await;
        }

        let addr = running.addr;
        self.running = None;
        info!(%addr, "server stopped");
    }
}
