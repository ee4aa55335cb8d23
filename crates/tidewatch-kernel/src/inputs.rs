//! Input aggregation – latest value of every asynchronous signal.
//!
//! [`SupervisorState`] is the single, exclusively-owned bag of state the
//! supervisor reasons over.  Signals are folded into it with
//! [`SupervisorState::apply`] as they arrive ("latest value wins"); the
//! decision engine only ever reads it.
//!
//! | Signal | Effect |
//! |---|---|
//! | position | recompute `near_safety` against the configured safety location |
//! | heartbeat | console heartbeat from another system resets the lost-comms timer |
//! | plan command | foreign issuer clears `command_issued` and `safety_mode_active` |
//! | plan-control state | store snapshot, mark observed |
//! | vehicle state | mark observed unless booting, recompute `service_or_error` |
//! | medium | update tracker, mark observed, underwater resets the lost-comms timer |

use std::time::Instant;

use tidewatch_types::{GeoPoint, Medium, OperationMode, PlanControlState, Signal, SystemId};
use tracing::debug;

use crate::config::SafetyConfig;
use crate::countdown::{CountdownTimer, FAIL_RETRY_TIMEOUT};
use crate::geo;
use crate::medium::MediumTracker;

/// Distance to the safety location under which the vehicle counts as there.
pub const SAFETY_DISTANCE_M: f64 = 50.0;

/// One-way flags recording which gated signal kinds have been observed since
/// startup.  Flags are only ever set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    pub vehicle_state: bool,
    pub medium: bool,
    pub plan_control: bool,
}

impl Readiness {
    /// `true` once every gated signal has been seen at least once.
    pub fn is_complete(&self) -> bool {
        self.vehicle_state && self.medium && self.plan_control
    }
}

/// Everything the supervisor knows about the vehicle.
#[derive(Debug, Clone)]
pub struct SupervisorState {
    pub readiness: Readiness,
    pub medium: MediumTracker,
    pub plan_control: PlanControlState,
    /// Vehicle reports service or error mode.
    pub service_or_error: bool,
    /// Vehicle is within [`SAFETY_DISTANCE_M`] of the safety location, or no
    /// location is configured.
    pub near_safety: bool,
    /// A "go to safety" command is outstanding.
    pub safety_mode_active: bool,
    /// The supervisor issued the outstanding keep-station/surface command.
    pub command_issued: bool,
    pub lost_comms: CountdownTimer,
    pub fail_retry: CountdownTimer,
}

impl SupervisorState {
    /// Initial state at startup: nothing observed, both timers counting from
    /// `now`.
    pub fn new(config: &SafetyConfig, now: Instant) -> Self {
        Self {
            readiness: Readiness::default(),
            medium: MediumTracker::new(),
            plan_control: PlanControlState::default(),
            service_or_error: false,
            near_safety: true,
            safety_mode_active: false,
            command_issued: false,
            lost_comms: CountdownTimer::new(config.lost_comms_timeout(), now),
            fail_retry: CountdownTimer::new(FAIL_RETRY_TIMEOUT, now),
        }
    }

    /// Fold one inbound `signal` into the state.
    pub fn apply(&mut self, signal: &Signal, config: &SafetyConfig, now: Instant) {
        match signal {
            Signal::Position(fix) => self.on_position(*fix, config.safety_location),
            Signal::Heartbeat { sender } => self.on_heartbeat(*sender, config.system_id, now),
            Signal::PlanCommand { issuer } => self.on_plan_command(*issuer, config.system_id),
            Signal::PlanControlState(pcs) => {
                self.readiness.plan_control = true;
                self.plan_control = *pcs;
            }
            Signal::VehicleState { mode } => self.on_vehicle_state(*mode),
            Signal::Medium { medium } => self.on_medium(*medium, now),
        }
    }

    fn on_position(&mut self, fix: GeoPoint, safety_location: Option<GeoPoint>) {
        self.near_safety = match safety_location {
            Some(target) => geo::distance_m(fix, target) <= SAFETY_DISTANCE_M,
            None => true,
        };
    }

    fn on_heartbeat(&mut self, sender: SystemId, own_id: SystemId, now: Instant) {
        if sender == own_id || !sender.is_console() {
            return;
        }
        debug!(%sender, "console heartbeat");
        self.lost_comms.reset(now);
    }

    fn on_plan_command(&mut self, issuer: SystemId, own_id: SystemId) {
        if issuer == own_id {
            return;
        }
        if self.command_issued || self.safety_mode_active {
            debug!(%issuer, "plan control taken over by another system");
        }
        self.command_issued = false;
        self.safety_mode_active = false;
    }

    fn on_vehicle_state(&mut self, mode: OperationMode) {
        if mode != OperationMode::Boot {
            self.readiness.vehicle_state = true;
        }
        self.service_or_error = matches!(mode, OperationMode::Service | OperationMode::Error);
    }

    fn on_medium(&mut self, medium: Medium, now: Instant) {
        self.readiness.medium = true;
        self.medium.update(medium);
        // No link is expected while submerged.
        if self.medium.is_underwater() {
            self.lost_comms.reset(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tidewatch_types::{PlanOutcome, PlanPhase};

    const OWN: SystemId = SystemId(0x0010);
    const CONSOLE: SystemId = SystemId(0x4001);

    fn config() -> SafetyConfig {
        SafetyConfig {
            system_id: OWN,
            ..SafetyConfig::default()
        }
    }

    fn timeout() -> Duration {
        config().lost_comms_timeout()
    }

    #[test]
    fn initial_state() {
        let t0 = Instant::now();
        let state = SupervisorState::new(&config(), t0);
        assert_eq!(state.readiness, Readiness::default());
        assert!(!state.readiness.is_complete());
        assert!(state.near_safety);
        assert!(!state.safety_mode_active);
        assert!(!state.command_issued);
        assert!(!state.service_or_error);
        assert_eq!(state.lost_comms.threshold(), timeout());
        assert_eq!(state.fail_retry.threshold(), FAIL_RETRY_TIMEOUT);
    }

    #[test]
    fn readiness_requires_all_three_signals() {
        let cfg = config();
        let t0 = Instant::now();
        let mut state = SupervisorState::new(&cfg, t0);

        state.apply(&Signal::VehicleState { mode: OperationMode::Service }, &cfg, t0);
        state.apply(&Signal::PlanControlState(PlanControlState::default()), &cfg, t0);
        assert!(!state.readiness.is_complete());

        state.apply(&Signal::Medium { medium: Medium::Air }, &cfg, t0);
        assert!(state.readiness.is_complete());
    }

    #[test]
    fn booting_does_not_mark_vehicle_state_observed() {
        let cfg = config();
        let t0 = Instant::now();
        let mut state = SupervisorState::new(&cfg, t0);
        state.apply(&Signal::VehicleState { mode: OperationMode::Boot }, &cfg, t0);
        assert!(!state.readiness.vehicle_state);
        assert!(!state.service_or_error);
    }

    #[test]
    fn readiness_is_never_cleared() {
        let cfg = config();
        let t0 = Instant::now();
        let mut state = SupervisorState::new(&cfg, t0);
        state.apply(&Signal::VehicleState { mode: OperationMode::Error }, &cfg, t0);
        state.apply(&Signal::VehicleState { mode: OperationMode::Boot }, &cfg, t0);
        assert!(state.readiness.vehicle_state);
    }

    #[test]
    fn service_or_error_classification() {
        let cfg = config();
        let t0 = Instant::now();
        let mut state = SupervisorState::new(&cfg, t0);
        let cases = [
            (OperationMode::Service, true),
            (OperationMode::Error, true),
            (OperationMode::Calibration, false),
            (OperationMode::Maneuver, false),
            (OperationMode::External, false),
            (OperationMode::Boot, false),
        ];
        for (mode, expected) in cases {
            state.apply(&Signal::VehicleState { mode }, &cfg, t0);
            assert_eq!(state.service_or_error, expected, "{mode:?}");
        }
    }

    #[test]
    fn console_heartbeat_resets_lost_comms() {
        let cfg = config();
        let t0 = Instant::now();
        let mut state = SupervisorState::new(&cfg, t0);
        let late = t0 + timeout() + Duration::from_secs(1);
        assert!(state.lost_comms.overflowed(late));

        state.apply(&Signal::Heartbeat { sender: CONSOLE }, &cfg, late);
        assert!(!state.lost_comms.overflowed(late));
    }

    #[test]
    fn own_and_non_console_heartbeats_are_ignored() {
        let cfg = SafetyConfig {
            system_id: SystemId(0x4010),
            ..SafetyConfig::default()
        };
        let t0 = Instant::now();
        let mut state = SupervisorState::new(&cfg, t0);
        let late = t0 + timeout();

        state.apply(&Signal::Heartbeat { sender: SystemId(0x4010) }, &cfg, late);
        assert!(state.lost_comms.overflowed(late), "own heartbeat must not count");

        state.apply(&Signal::Heartbeat { sender: SystemId(0x0022) }, &cfg, late);
        assert!(state.lost_comms.overflowed(late), "non-console heartbeat must not count");
    }

    #[test]
    fn foreign_plan_command_clears_supervisor_ownership() {
        let cfg = config();
        let t0 = Instant::now();
        let mut state = SupervisorState::new(&cfg, t0);
        state.command_issued = true;
        state.safety_mode_active = true;

        state.apply(&Signal::PlanCommand { issuer: OWN }, &cfg, t0);
        assert!(state.command_issued);
        assert!(state.safety_mode_active);

        state.apply(&Signal::PlanCommand { issuer: CONSOLE }, &cfg, t0);
        assert!(!state.command_issued);
        assert!(!state.safety_mode_active);
    }

    #[test]
    fn plan_control_state_is_stored() {
        let cfg = config();
        let t0 = Instant::now();
        let mut state = SupervisorState::new(&cfg, t0);
        let pcs = PlanControlState {
            phase: PlanPhase::Executing,
            last_outcome: PlanOutcome::Failure,
        };
        state.apply(&Signal::PlanControlState(pcs), &cfg, t0);
        assert_eq!(state.plan_control, pcs);
        assert!(state.readiness.plan_control);
    }

    #[test]
    fn underwater_resets_lost_comms_without_heartbeat() {
        let cfg = config();
        let t0 = Instant::now();
        let mut state = SupervisorState::new(&cfg, t0);
        let late = t0 + timeout() * 2;

        state.apply(&Signal::Medium { medium: Medium::WaterSurface }, &cfg, late);
        assert!(state.lost_comms.overflowed(late));

        state.apply(&Signal::Medium { medium: Medium::Underwater }, &cfg, late);
        assert!(!state.lost_comms.overflowed(late));
        assert!(state.medium.is_underwater());
    }

    #[test]
    fn position_without_safety_location_is_always_near() {
        let cfg = config();
        let t0 = Instant::now();
        let mut state = SupervisorState::new(&cfg, t0);
        state.near_safety = false;
        state.apply(&Signal::Position(GeoPoint::new(10.0, 10.0)), &cfg, t0);
        assert!(state.near_safety);
    }

    #[test]
    fn position_against_safety_location() {
        let cfg = SafetyConfig {
            safety_location: Some(GeoPoint::new(41.1850, -8.7060)),
            ..config()
        };
        let t0 = Instant::now();
        let mut state = SupervisorState::new(&cfg, t0);

        state.apply(&Signal::Position(GeoPoint::new(41.1900, -8.7060)), &cfg, t0);
        assert!(!state.near_safety, "~550 m away must be far");

        state.apply(&Signal::Position(GeoPoint::new(41.1853, -8.7060)), &cfg, t0);
        assert!(state.near_safety, "~33 m away must be near");
    }
}
