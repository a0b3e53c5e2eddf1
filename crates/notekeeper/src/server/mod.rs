//! HTTP surface for notekeeper.
//!
//! | Method     | Path                | Handler                    |
//! |------------|---------------------|----------------------------|
//! | GET, POST  | `/`, `/index.html`  | [`handlers::list_titles`]  |
//! | GET, POST  | `/notes`            | [`handlers::get_note`]     |
//! | POST       | `/save`             | [`handlers::save_note`]    |
//! | POST       | `/delete`           | [`handlers::delete_note`]  |
//! | GET        | `/health`           | [`handlers::health`]       |

mod error;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::http_trace_layer;
use crate::notes::Notes;

pub use error::{ApiError, INVALID_REQUEST_MESSAGE};

/// State shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Note adapter over the configured store.
    pub notes: Notes,
}

/// Build the application router.
pub fn router(notes: Notes, compression: bool) -> Router {
    let router = Router::new()
        .route(
            "/",
            get(handlers::list_titles).post(handlers::list_titles),
        )
        .route(
            "/index.html",
            get(handlers::list_titles).post(handlers::list_titles),
        )
        .route("/notes", get(handlers::get_note).post(handlers::get_note))
        .route("/save", post(handlers::save_note))
        .route("/delete", post(handlers::delete_note))
        .route("/health", get(handlers::health))
        .with_state(AppState { notes })
        .layer(http_trace_layer());

    if compression {
        router.layer(CompressionLayer::new())
    } else {
        router
    }
}

/// Bind the configured address and serve until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the address is invalid, cannot be bound, or the
/// server fails while running.
pub async fn serve(config: &Config, notes: Notes) -> Result<()> {
    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| Error::ServerBind {
            addr: addr.to_string(),
            source,
        })?;

    info!(
        "Serving notes from {} store on http://{}",
        notes.store().name(),
        listener.local_addr()?
    );

    axum::serve(listener, router(notes, config.server.compression))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
