//! `tidewatch-runtime` – The Periodic Executor
//!
//! Hosts the safety supervisor on the event bus and wires up logging.
//!
//! # Modules
//!
//! - [`supervisor_task`] – [`SupervisorTask`][supervisor_task::SupervisorTask]:
//!   owns a [`Supervisor`][tidewatch_kernel::Supervisor], applies signals from
//!   [`Topic::Signals`][tidewatch_middleware::Topic::Signals] as they arrive
//!   and ticks it at a fixed rate.
//! - [`bus_sink`] – [`BusSink`][bus_sink::BusSink]: publishes plan requests
//!   and status reports back onto the bus.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: installs the
//!   global `tracing` subscriber, with an optional OTLP span exporter when
//!   `OTEL_EXPORTER_OTLP_ENDPOINT` is set.

pub mod bus_sink;
pub mod supervisor_task;
pub mod telemetry;

pub use bus_sink::{BusSink, SUPERVISOR_SOURCE};
pub use supervisor_task::SupervisorTask;
pub use telemetry::{LogFormat, TracerProviderGuard, init_tracing};
