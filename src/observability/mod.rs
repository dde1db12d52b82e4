//! OpenTelemetry tracing exported to a local OTLP JSON file.
//!
//! ```text
//! tracing macros → tracing-opentelemetry → SDK TracerProvider → FileSpanExporter → rotating file
//! ```
//!
//! Plugins cannot reach a collector from the sandbox, so spans are written as one
//! OTLP JSON document per line to `reelgrid-otlp.json` in the plugin data
//! directory. The file rotates at 10 MB and keeps three backups.
//!
//! The level comes from the `trace_level` plugin option (default `"info"`) and
//! accepts any `EnvFilter` directive, e.g. `"reelgrid::grid=trace,info"`.
//! `"off"` skips initialization entirely.

mod file_writer;
mod init;
mod span_formatter;
mod tracer;

pub use init::init_tracing;

/// Service and instrumentation scope name attached to every span.
pub const SERVICE_NAME: &str = "Reelgrid";

/// Trace file name inside the plugin data directory.
pub const TRACE_FILE: &str = "reelgrid-otlp.json";
