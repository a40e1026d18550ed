/// Path to the JSON document holding users, task lists, and tasks. Created on first write if it
/// doesn't exist yet. Defaults to [defaults::DATA_STORE_PATH].
pub const DATA_STORE_PATH: &str = "DATA_STORE_PATH";
/// Directory containing the built frontend. Defaults to [defaults::STATIC_ASSETS_DIR].
pub const STATIC_ASSETS_DIR: &str = "STATIC_ASSETS_DIR";
/// Socket address the HTTP server binds to. Defaults to [defaults::LISTEN_ADDRESS].
pub const LISTEN_ADDRESS: &str = "LISTEN_ADDRESS";
/// Log level configuration for the application. For formatting info, see [tracing-subscriber's documentation](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html#directives)
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// OpenTelemetry span export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";

pub mod defaults {
    pub const DATA_STORE_PATH: &str = "db.json";
    pub const STATIC_ASSETS_DIR: &str = "dist";
    pub const LISTEN_ADDRESS: &str = "0.0.0.0:3000";
}
