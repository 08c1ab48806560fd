//! API server: composes the management API with operational endpoints.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::routing::get;
use axum::Router;
use campaign_core::config::AppConfig;
use campaign_management::{management_router, ManagementState};
use campaign_segmentation::CustomerSource;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::rest::{self, OpsState};

pub struct ApiServer {
    config: AppConfig,
    source: Arc<dyn CustomerSource>,
}

impl ApiServer {
    pub fn new(config: AppConfig, source: Arc<dyn CustomerSource>) -> Self {
        Self { config, source }
    }

    /// Full application router with middleware.
    pub fn router(&self) -> Router {
        let ops = Router::new()
            .route("/health", get(rest::health_check))
            .route("/live", get(rest::liveness))
            .with_state(OpsState {
                start_time: Instant::now(),
            });

        let management = management_router(ManagementState::from_config(
            &self.config,
            self.source.clone(),
        ));

        Router::new()
            .merge(ops)
            .merge(management)
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// Start the HTTP REST server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = self.router();
        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the metrics exporter on a separate port.
    pub fn start_metrics(&self) -> anyhow::Result<()> {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use campaign_segmentation::InMemoryCustomerSource;
    use tower::ServiceExt;

    fn server() -> ApiServer {
        ApiServer::new(AppConfig::default(), Arc::new(InMemoryCustomerSource::empty()))
    }

    #[tokio::test]
    async fn test_health_and_live() {
        let response = server()
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = server()
            .router()
            .oneshot(Request::get("/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_management_routes_are_mounted() {
        let response = server()
            .router()
            .oneshot(
                Request::get("/api/v1/campaign-templates")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
