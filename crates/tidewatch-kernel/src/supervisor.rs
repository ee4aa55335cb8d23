//! [`Supervisor`] – the safety supervisor.
//!
//! Owns the [`SupervisorState`], the [`SafetyConfig`] and a
//! [`CommandDispatcher`].  The caller drives it with two entry points, each a
//! single atomic step:
//!
//! - [`Supervisor::handle_signal`] whenever an input signal arrives;
//! - [`Supervisor::tick`] at a fixed rate.
//!
//! Both take the current instant explicitly, so the supervisor can be driven
//! by a real-time loop or by a test harness stepping synthetic time.
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//! use tidewatch_kernel::{RecordingSink, SafetyConfig, Supervisor};
//! use tidewatch_types::{Medium, OperationMode, PlanControlState, Signal};
//!
//! let now = Instant::now();
//! let mut sup = Supervisor::new(SafetyConfig::default(), RecordingSink::new(), now)
//!     .expect("default config is valid");
//!
//! sup.handle_signal(&Signal::VehicleState { mode: OperationMode::Service }, now);
//! sup.handle_signal(&Signal::PlanControlState(PlanControlState::default()), now);
//! sup.handle_signal(&Signal::Medium { medium: Medium::WaterSurface }, now);
//!
//! // Idle at the surface in service mode: keep station.
//! assert_eq!(sup.tick(now).plan_id().as_deref(), Some("sk"));
//! ```

use std::time::Instant;

use tidewatch_types::{SafetyError, Signal, StatusCode};
use tracing::{Span, debug, field, info, instrument, warn};

use crate::config::SafetyConfig;
use crate::decision::{self, Decision, SAFETY_ZONE_PLAN, Snapshot};
use crate::dispatcher::{CommandDispatcher, CommandSink};
use crate::inputs::SupervisorState;

pub struct Supervisor<S> {
    config: SafetyConfig,
    state: SupervisorState,
    dispatcher: CommandDispatcher<S>,
    last_decision: Option<Decision>,
}

impl<S: CommandSink> Supervisor<S> {
    /// Build a supervisor whose timers start counting at `now`, and report
    /// idle status.
    ///
    /// # Errors
    ///
    /// [`SafetyError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: SafetyConfig, sink: S, now: Instant) -> Result<Self, SafetyError> {
        config.validate()?;
        let state = SupervisorState::new(&config, now);
        let mut dispatcher = CommandDispatcher::new(sink);
        dispatcher.report(StatusCode::Idle);
        info!(
            system_id = %config.system_id,
            lost_comms_timeout_secs = config.lost_comms_timeout_secs,
            keep_station = config.keep_station_at_surface,
            ascend = config.ascend_with_actuation,
            safety_location = ?config.safety_location,
            "safety supervisor initialised"
        );
        Ok(Self {
            config,
            state,
            dispatcher,
            last_decision: None,
        })
    }

    /// Apply a changed configuration.  The lost-comms threshold follows the
    /// new timeout without resetting the elapsed time.
    ///
    /// # Errors
    ///
    /// [`SafetyError::InvalidConfig`] if `config` fails validation; the
    /// previous configuration stays in force.
    pub fn update_config(&mut self, config: SafetyConfig) -> Result<(), SafetyError> {
        config.validate()?;
        if config.lost_comms_timeout_secs != self.config.lost_comms_timeout_secs {
            info!(
                from = self.config.lost_comms_timeout_secs,
                to = config.lost_comms_timeout_secs,
                "lost-comms timeout changed"
            );
        }
        self.state.lost_comms.set_threshold(config.lost_comms_timeout());
        self.config = config;
        Ok(())
    }

    /// Fold an inbound signal into the supervisor state.
    #[instrument(name = "supervisor.signal", skip_all, fields(kind = signal.kind()))]
    pub fn handle_signal(&mut self, signal: &Signal, now: Instant) {
        debug!(kind = signal.kind(), "signal");
        self.state.apply(signal, &self.config, now);
    }

    /// Evaluate the state at `now` and act on the outcome.
    #[instrument(name = "supervisor.tick", skip_all, fields(decision = field::Empty))]
    pub fn tick(&mut self, now: Instant) -> Decision {
        let snapshot = Snapshot::capture(&self.state, &self.config, now);
        let decision = decision::evaluate(&snapshot);

        match decision {
            Decision::GoToSafety(reason) => {
                warn!(?reason, "console link lost; sending vehicle to safety zone");
                self.state.lost_comms.reset(now);
                self.state.safety_mode_active = true;
                self.dispatcher.execute_plan(SAFETY_ZONE_PLAN);
            }
            Decision::Hold(cmd) => {
                self.state.command_issued = true;
                self.dispatcher.execute_plan(&cmd.plan_id());
                self.dispatcher.report(StatusCode::Active);
            }
            Decision::Standby(_) | Decision::NoAction(..) => {}
        }
        if decision::consumes_retry(&snapshot, &decision) {
            self.state.fail_retry.reset(now);
        }

        Span::current().record("decision", field::display(&decision));
        if self.last_decision != Some(decision) {
            info!(%decision, "supervisor decision changed");
        } else {
            debug!(%decision, "supervisor decision");
        }
        self.last_decision = Some(decision);
        decision
    }

    pub fn config(&self) -> &SafetyConfig {
        &self.config
    }

    pub fn state(&self) -> &SupervisorState {
        &self.state
    }

    pub fn sink(&self) -> &S {
        self.dispatcher.sink()
    }

}
