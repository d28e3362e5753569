//! HTTP server for the PivotHire chat relay
//!
//! Mounts the chat route and the health probe, then wraps them in the
//! identity, request-context, tracing, and CORS middleware.

mod cors;
mod health;
mod identity;
mod request_context;

use std::net::SocketAddr;

use axum::Router;
use http::HeaderName;
use pivothire_chat::ChatState;
use pivothire_config::{Config, IdentityConfig};
use tower_http::trace::TraceLayer;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the completion provider cannot be built or the
    /// identity header name is invalid
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let chat_state = ChatState::from_config(&config.llm, &config.chat)?;

        let mut app = Router::new();

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        app = app.merge(pivothire_chat::chat_router(chat_state, &config.chat.path));

        // Middleware, innermost first

        app = app.layer(axum::middleware::from_fn(request_context::request_context_middleware));

        // Identity must run before the request context picks the user up
        if let Some(ref identity_config) = config.server.identity {
            let header = identity_header(identity_config)?;
            app = app.layer(axum::middleware::from_fn(move |req, next| {
                let header = header.clone();
                async move { identity::identity_middleware(header, req, next).await }
            }));
        }

        app = app.layer(TraceLayer::new_for_http());

        if let Some(ref cors_config) = config.server.cors {
            app = app.layer(cors::cors_layer(cors_config));
        }

        tracing::debug!(
            chat_path = %config.chat.path,
            model = %config.llm.model,
            skills = config.chat.skills.len(),
            "server assembled"
        );

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Override the listen address
    #[must_use]
    pub const fn with_listen_address(mut self, listen_address: SocketAddr) -> Self {
        self.listen_address = listen_address;
        self
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered. Open chat streams
    /// are dropped on shutdown, which cancels their upstream requests.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}

fn identity_header(config: &IdentityConfig) -> anyhow::Result<HeaderName> {
    HeaderName::try_from(config.header.as_str())
        .map_err(|e| anyhow::anyhow!("invalid identity header {:?}: {e}", config.header))
}
