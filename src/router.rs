use crate::handlers::{
    health::health_check,
    load::{get_load_chart, get_load_figure, get_load_figure_html},
    zones::get_zones,
};
use crate::schemas::{ApiDoc, AppState};
use axum::{routing::get, Router};
use axum_prometheus::PrometheusMetricLayer;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    api_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Same as [`create_router`] plus a Prometheus `/metrics` endpoint.
///
/// The metric recorder is process global, so only the server installs it.
pub fn create_router_with_metrics(state: AppState) -> Router {
    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    api_routes()
        .route("/metrics", get(move || async move { metric_handle.render() }))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(prometheus_layer)
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Dataset discovery
        .route("/api/v1/zones", get(get_zones))
        // Demand charts
        .route("/api/v1/load/chart", get(get_load_chart))
        .route("/api/v1/load/figure", get(get_load_figure))
        .route("/api/v1/load/figure.html", get(get_load_figure_html))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
