//! [`BusSink`] – publishes supervisor output onto the [`EventBus`].

use tidewatch_kernel::CommandSink;
use tidewatch_middleware::{EventBus, Topic};
use tidewatch_types::{EntityStatus, Event, EventPayload, PlanGeneration, SafetyError};

/// Source tag stamped on every event the supervisor publishes.
pub const SUPERVISOR_SOURCE: &str = "tidewatch-runtime::supervisor";

/// [`CommandSink`] that routes plan requests to [`Topic::PlanCommands`] and
/// status reports to [`Topic::Status`].
#[derive(Clone, Debug)]
pub struct BusSink {
    bus: EventBus,
}

impl BusSink {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl CommandSink for BusSink {
    fn send_plan(&mut self, request: PlanGeneration) -> Result<(), SafetyError> {
        let event = Event::new(SUPERVISOR_SOURCE, EventPayload::PlanGeneration(request));
        self.bus.publish_to(Topic::PlanCommands, event).map(|_| ())
    }

    fn send_status(&mut self, status: EntityStatus) -> Result<(), SafetyError> {
        let event = Event::new(SUPERVISOR_SOURCE, EventPayload::EntityStatus(status));
        self.bus.publish_to(Topic::Status, event).map(|_| ())
    }
}
