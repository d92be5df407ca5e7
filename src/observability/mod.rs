// Observability: structured logging and Prometheus metrics

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::{init as init_metrics, push_to_gateway};
