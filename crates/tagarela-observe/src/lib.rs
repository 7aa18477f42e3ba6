//! Observability setup for Tagarela: tracing subscriber and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
