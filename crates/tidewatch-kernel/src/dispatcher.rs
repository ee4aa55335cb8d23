//! [`CommandDispatcher`] – builds and emits the supervisor's outbound
//! messages through a [`CommandSink`].
//!
//! There are no retries here.  A sink error is logged and dropped; backing
//! off after a failed plan is the fail-retry timer's job.

use tidewatch_types::{
    EntityStatus, PlanGeneration, PlanGenerationCmd, PlanGenerationOp, SafetyError, StatusCode,
};
use tracing::{info, warn};

/// Fixed execution parameters attached to every plan request.
pub const PLAN_PARAMS: &str = "calibrate=false;ignore_errors=true";

/// Transport for the supervisor's outbound messages.
///
/// Implement this to connect the supervisor to a message bus, a network link
/// or a test recorder.
pub trait CommandSink {
    /// Emit an execute-plan request.
    fn send_plan(&mut self, request: PlanGeneration) -> Result<(), SafetyError>;

    /// Emit a supervisor status report.
    fn send_status(&mut self, status: EntityStatus) -> Result<(), SafetyError>;
}

/// Packages plan identifiers into [`PlanGeneration`] requests.
pub struct CommandDispatcher<S> {
    sink: S,
}

impl<S: CommandSink> CommandDispatcher<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Build the request for `plan_id` and hand it to the sink.
    pub fn execute_plan(&mut self, plan_id: &str) {
        let request = PlanGeneration {
            plan_id: plan_id.to_string(),
            op: PlanGenerationOp::Request,
            cmd: PlanGenerationCmd::Execute,
            params: PLAN_PARAMS.to_string(),
        };
        info!(plan_id, "requesting plan execution");
        if let Err(e) = self.sink.send_plan(request) {
            warn!(plan_id, error = %e, "plan request was not delivered");
        }
    }

    /// Report supervisor activity.
    pub fn report(&mut self, code: StatusCode) {
        if let Err(e) = self.sink.send_status(EntityStatus::normal(code)) {
            warn!(?code, error = %e, "status report was not delivered");
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

/// In-memory sink that records everything it is given.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub plans: Vec<PlanGeneration>,
    pub statuses: Vec<EntityStatus>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan identifiers in dispatch order.
    pub fn plan_ids(&self) -> Vec<&str> {
        self.plans.iter().map(|p| p.plan_id.as_str()).collect()
    }
}

impl CommandSink for RecordingSink {
    fn send_plan(&mut self, request: PlanGeneration) -> Result<(), SafetyError> {
        self.plans.push(request);
        Ok(())
    }

    fn send_status(&mut self, status: EntityStatus) -> Result<(), SafetyError> {
        self.statuses.push(status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewatch_types::EntityState;

    struct FailingSink;

    impl CommandSink for FailingSink {
        fn send_plan(&mut self, _request: PlanGeneration) -> Result<(), SafetyError> {
            Err(SafetyError::Channel("link down".into()))
        }

        fn send_status(&mut self, _status: EntityStatus) -> Result<(), SafetyError> {
            Err(SafetyError::Channel("link down".into()))
        }
    }

    #[test]
    fn execute_plan_fills_fixed_fields() {
        let mut dispatcher = CommandDispatcher::new(RecordingSink::new());
        dispatcher.execute_plan("safety_zone");

        let sent = &dispatcher.sink().plans;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].plan_id, "safety_zone");
        assert_eq!(sent[0].op, PlanGenerationOp::Request);
        assert_eq!(sent[0].cmd, PlanGenerationCmd::Execute);
        assert_eq!(sent[0].params, "calibrate=false;ignore_errors=true");
    }

    #[test]
    fn report_sends_normal_status() {
        let mut dispatcher = CommandDispatcher::new(RecordingSink::new());
        dispatcher.report(StatusCode::Active);
        let status = dispatcher.sink().statuses[0];
        assert_eq!(status.state, EntityState::Normal);
        assert_eq!(status.code, StatusCode::Active);
    }

    #[test]
    fn sink_errors_are_swallowed() {
        let mut dispatcher = CommandDispatcher::new(FailingSink);
        // Must not panic or retry.
        dispatcher.execute_plan("sk");
        dispatcher.report(StatusCode::Idle);
    }
}
