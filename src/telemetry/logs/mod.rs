use tracing::Level;
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::MakeWriterExt;

pub fn new<S>(filter: EnvFilter) -> Box<dyn Layer<S> + Send + Sync>
where
	S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync,
{
	// Only log INFO, DEBUG, TRACE to stdout
	let stdout = std::io::stdout.with_min_level(Level::INFO);
	// Only log WARN, ERROR to stderr
	let stderr = std::io::stderr.with_max_level(Level::WARN);
	tracing_subscriber::fmt::layer()
		.compact()
		.with_ansi(true)
		.with_file(cfg!(debug_assertions))
		.with_target(false)
		.with_line_number(cfg!(debug_assertions))
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_span_events(FmtSpan::NONE)
		.with_writer(stdout.and(stderr))
		.with_filter(filter)
		.boxed()
}
