#[cfg(test)]
pub mod test_utils {
    use crate::config::QueryLimits;
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use chrono::{TimeZone, Utc};
    use compute::testing::synthetic_dataset;
    use compute::DemandPipeline;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Semaphore;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Zones present in the test dataset.
    pub const TEST_ZONES: [&str; 3] = ["ES", "NL", "DE"];

    /// Days of hourly data in the test dataset, starting 2020-01-01.
    pub const TEST_DAYS: usize = 10;

    fn test_pipeline() -> DemandPipeline {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        DemandPipeline::new(Arc::new(synthetic_dataset(start, TEST_DAYS, &TEST_ZONES)))
    }

    /// Create AppState for testing over an in-memory synthetic dataset
    pub fn setup_test_app_state() -> AppState {
        AppState::new(test_pipeline(), &QueryLimits::default())
    }

    /// Create AppState with explicit query limits.
    ///
    /// Built field by field so tests can use limits `AppState::new` would raise.
    pub fn setup_test_app_state_with_limits(permits: usize, query_timeout: Duration) -> AppState {
        AppState {
            pipeline: test_pipeline(),
            query_permits: Arc::new(Semaphore::new(permits)),
            query_timeout,
        }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr) // Output to stderr, which is captured by tests
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub fn setup_test_app() -> Router {
        setup_test_app_with_state(setup_test_app_state())
    }

    /// Create axum app for testing over a prepared state
    pub fn setup_test_app_with_state(state: AppState) -> Router {
        let _ = init_test_tracing();

        create_router(state)
    }
}
