use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Initialize structured logging for a CLI run. JSON output is opt-in; the
/// default human-readable layer goes to stderr so operator-facing stdout
/// narration stays clean.
pub fn init_telemetry(log_level: &str, json_logs: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    if json_logs {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true),
            )
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    tracing::debug!("Aliawan telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking the calls of one workflow run
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create a span carrying the identifiers of one operator workflow run
pub fn create_workflow_span(workflow: &str, request_id: &str) -> tracing::Span {
    tracing::info_span!(
        "operator_workflow",
        workflow = workflow,
        request.id = request_id,
    )
}
