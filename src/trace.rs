use tower_http::{
	classify::{ServerErrorsAsFailures, SharedClassifier},
	trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{level_filters::LevelFilter, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes the global tracing subscriber, printing events at or above `level`.
pub fn init_tracing_subscriber(level: LevelFilter) {
	tracing_subscriber::registry()
		.with(level)
		.with(tracing_subscriber::fmt::layer().with_ansi(true))
		.init();
}

/// Constructs a [`TraceLayer`] that opens a span per request and logs
/// each response with its status and latency.
pub fn http_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
	TraceLayer::new_for_http()
		.make_span_with(DefaultMakeSpan::new().level(Level::INFO))
		.on_response(DefaultOnResponse::new().level(Level::INFO))
}
