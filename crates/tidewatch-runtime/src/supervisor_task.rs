//! [`SupervisorTask`] – runs the [`Supervisor`] at a fixed rate on the bus.
//!
//! One Tokio task owns the supervisor and `select!`s between the tick
//! interval and the next inbound signal.  A signal update and a tick can
//! therefore never interleave, and signals are applied in the order they were
//! published.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::{Arc, atomic::AtomicBool};
//! use std::time::Duration;
//! use tidewatch_kernel::SafetyConfig;
//! use tidewatch_middleware::EventBus;
//! use tidewatch_runtime::SupervisorTask;
//!
//! #[tokio::main]
//! async fn main() {
//!     let bus = EventBus::default();
//!     let task = SupervisorTask::new(&bus, SafetyConfig::default(), Duration::from_secs(1))
//!         .expect("valid config");
//!     task.run(Arc::new(AtomicBool::new(false))).await;
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tidewatch_kernel::{Decision, SafetyConfig, Supervisor};
use tidewatch_middleware::{EventBus, Topic, TopicReceiver};
use tidewatch_types::{Event, EventPayload, SafetyError};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::bus_sink::BusSink;

pub struct SupervisorTask {
    supervisor: Supervisor<BusSink>,
    signals: TopicReceiver,
    tick_period: Duration,
}

impl SupervisorTask {
    /// Subscribe to [`Topic::Signals`] and build the supervisor.  Signals
    /// published after this call are buffered until [`run`][Self::run].
    ///
    /// # Errors
    ///
    /// [`SafetyError::InvalidConfig`] if `config` is invalid or
    /// `tick_period` is zero.
    pub fn new(
        bus: &EventBus,
        config: SafetyConfig,
        tick_period: Duration,
    ) -> Result<Self, SafetyError> {
        if tick_period.is_zero() {
            return Err(SafetyError::InvalidConfig {
                field: "tick_period".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }
        let signals = bus.subscribe_to(Topic::Signals);
        let supervisor = Supervisor::new(config, BusSink::new(bus.clone()), Instant::now())?;
        Ok(Self {
            supervisor,
            signals,
            tick_period,
        })
    }

    /// Feed one bus event to the supervisor.  Non-signal payloads are
    /// ignored.
    pub fn handle_event(&mut self, event: &Event, now: Instant) {
        match &event.payload {
            EventPayload::Signal(signal) => self.supervisor.handle_signal(signal, now),
            other => debug!(source = %event.source, ?other, "ignoring non-signal event"),
        }
    }

    pub fn tick(&mut self, now: Instant) -> Decision {
        self.supervisor.tick(now)
    }

    pub fn supervisor(&self) -> &Supervisor<BusSink> {
        &self.supervisor
    }

    /// Run until `shutdown` is set or the bus closes.
    pub async fn run(mut self, shutdown: Arc<AtomicBool>) {
        let mut interval = tokio::time::interval(self.tick_period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(tick_period = ?self.tick_period, "supervisor task started");

        loop {
            if shutdown.load(Ordering::SeqCst) {
                info!("supervisor task shutting down");
                break;
            }
            tokio::select! {
                _ = interval.tick() => {
                    self.supervisor.tick(Instant::now());
                }
                received = self.signals.recv() => match received {
                    Ok(event) => self.handle_event(&event, Instant::now()),
                    Err(RecvError::Lagged(n)) => {
                        warn!(lagged_by = n, "signal receiver lagged; oldest signals dropped");
                    }
                    Err(RecvError::Closed) => {
                        info!("signal bus closed; supervisor task exiting");
                        break;
                    }
                },
            }
        }
    }
}
