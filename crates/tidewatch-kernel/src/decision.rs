//! Safety decision engine – pure mapping from a [`Snapshot`] to a
//! [`Decision`].
//!
//! The supervisor captures a [`Snapshot`] of its state at "now" (timers are
//! reduced to overflow flags at that instant) and hands it to [`evaluate`].
//! Nothing here mutates state or reads the clock; the supervisor applies the
//! side effects a [`Decision`] implies.
//!
//! # Evaluation order
//!
//! 1. **Guard** – readiness incomplete or vehicle out of water → [`Decision::Standby`].
//! 2. **Verdict** ([`assess`]) – unsafe → [`Decision::GoToSafety`].
//! 3. **Hold** – while safe, decide whether to (re-)issue a surface or
//!    keep-station plan; the first failing precondition yields
//!    [`Decision::NoAction`].
//!
//! # Plan identifiers
//!
//! | | at surface | underwater |
//! |---|---|---|
//! | first attempt | `sk` | `surface` |
//! | after a failed plan | `safety_sk` | `safety_surface` |

use std::fmt;
use std::time::Instant;

use tidewatch_types::PlanOutcome;

use crate::config::SafetyConfig;
use crate::inputs::SupervisorState;

/// Plan requested when the vehicle must return to the safety location.
pub const SAFETY_ZONE_PLAN: &str = "safety_zone";

/// Prefix selecting the harsher fallback variant after a failed plan.
pub const ESCALATION_PREFIX: &str = "safety_";

/// Everything [`evaluate`] needs, captured at a single instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub ready: bool,
    pub in_water: bool,
    pub underwater: bool,
    pub near_safety: bool,
    pub safety_mode_active: bool,
    pub command_issued: bool,
    pub lost_comms_overflowed: bool,
    pub fail_retry_overflowed: bool,
    pub service_or_error: bool,
    pub plan_idle: bool,
    pub last_plan_failed: bool,
    pub keep_station: bool,
    pub ascend: bool,
}

impl Snapshot {
    /// Reduce `state` and `config` to the flags the engine reads, with both
    /// timers evaluated at `now`.
    pub fn capture(state: &SupervisorState, config: &SafetyConfig, now: Instant) -> Self {
        Self {
            ready: state.readiness.is_complete(),
            in_water: state.medium.in_water(),
            underwater: state.medium.is_underwater(),
            near_safety: state.near_safety,
            safety_mode_active: state.safety_mode_active,
            command_issued: state.command_issued,
            lost_comms_overflowed: state.lost_comms.overflowed(now),
            fail_retry_overflowed: state.fail_retry.overflowed(now),
            service_or_error: state.service_or_error,
            plan_idle: state.plan_control.phase.is_idle(),
            last_plan_failed: state.plan_control.last_outcome == PlanOutcome::Failure,
            keep_station: config.keep_station_at_surface,
            ascend: config.ascend_with_actuation,
        }
    }
}

/// Why the vehicle is considered safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafeReason {
    /// Near the safety location, or none is configured.
    NearSafety,
    /// A "go to safety" command is already outstanding.
    SafetyModeActive,
    /// A console heartbeat arrived within the timeout.
    LinkHealthy,
    /// No evidence of danger.
    NoContraryEvidence,
}

/// Why the vehicle is considered unsafe.  Both imply a lost console link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsafeReason {
    /// Service or error mode with no plan running: the vehicle is drifting.
    Drifting,
    /// Only a self-issued hold/surface plan is running.
    SelfIssuedPlan,
}

/// Outcome of the safety assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Safe(SafeReason),
    Unsafe(UnsafeReason),
}

/// Why the engine is not evaluating at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandbyReason {
    AwaitingSignals,
    OutOfWater,
}

/// Why no hold plan is issued while safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldSkip {
    /// Both keep-station and ascend-with-actuation are disabled.
    HoldingDisabled,
    /// Vehicle is not in service or error mode.
    NotServiceOrError,
    /// A plan is running.
    PlanActive,
    /// Last plan failed and the fail-retry timer has not expired.
    AwaitingRetry,
    /// Underwater but ascend-with-actuation is disabled.
    AscentDisabled,
    /// At surface but keep-station is disabled.
    StationKeepingDisabled,
}

/// Holding behaviour requested while safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldBehavior {
    Surface,
    StationKeep,
}

/// A keep-station or surface request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldCommand {
    pub behavior: HoldBehavior,
    /// The last plan failed; request the fallback variant.
    pub escalated: bool,
}

impl HoldCommand {
    pub fn plan_id(&self) -> String {
        let suffix = match self.behavior {
            HoldBehavior::Surface => "surface",
            HoldBehavior::StationKeep => "sk",
        };
        if self.escalated {
            format!("{ESCALATION_PREFIX}{suffix}")
        } else {
            suffix.to_string()
        }
    }
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Guard failed; nothing evaluated.
    Standby(StandbyReason),
    /// Unsafe: send the vehicle to the safety location.
    GoToSafety(UnsafeReason),
    /// Safe, and a hold plan should be issued.
    Hold(HoldCommand),
    /// Safe, nothing to do.
    NoAction(SafeReason, HoldSkip),
}

impl Decision {
    /// Plan the supervisor must dispatch for this decision, if any.
    pub fn plan_id(&self) -> Option<String> {
        match self {
            Decision::GoToSafety(_) => Some(SAFETY_ZONE_PLAN.to_string()),
            Decision::Hold(cmd) => Some(cmd.plan_id()),
            Decision::Standby(_) | Decision::NoAction(..) => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Standby(reason) => write!(f, "standby ({reason:?})"),
            Decision::GoToSafety(reason) => write!(f, "unsafe ({reason:?})"),
            Decision::Hold(cmd) => write!(f, "acting ({})", cmd.plan_id()),
            Decision::NoAction(SafeReason::SafetyModeActive, _) => {
                write!(f, "safe, already acting")
            }
            Decision::NoAction(reason, skip) => write!(f, "safe ({reason:?}), idle ({skip:?})"),
        }
    }
}

/// Safety verdict for `s`.
pub fn assess(s: &Snapshot) -> Verdict {
    if s.near_safety {
        return Verdict::Safe(SafeReason::NearSafety);
    }
    // Already en route; do not re-issue.
    if s.safety_mode_active {
        return Verdict::Safe(SafeReason::SafetyModeActive);
    }
    if !s.lost_comms_overflowed {
        return Verdict::Safe(SafeReason::LinkHealthy);
    }
    if s.service_or_error && s.plan_idle {
        return Verdict::Unsafe(UnsafeReason::Drifting);
    }
    if s.command_issued {
        return Verdict::Unsafe(UnsafeReason::SelfIssuedPlan);
    }
    Verdict::Safe(SafeReason::NoContraryEvidence)
}

/// Full tick decision for `s`.
pub fn evaluate(s: &Snapshot) -> Decision {
    if !s.ready {
        return Decision::Standby(StandbyReason::AwaitingSignals);
    }
    if !s.in_water {
        return Decision::Standby(StandbyReason::OutOfWater);
    }

    let reason = match assess(s) {
        Verdict::Unsafe(why) => return Decision::GoToSafety(why),
        Verdict::Safe(why) => why,
    };

    match hold(s) {
        Ok(cmd) => Decision::Hold(cmd),
        Err(skip) => Decision::NoAction(reason, skip),
    }
}

/// Whether `decision` got past the fail-retry gate after a failed plan.  The
/// retry window restarts whenever this holds, including when the medium
/// check then vetoes the hold.
pub fn consumes_retry(s: &Snapshot, decision: &Decision) -> bool {
    s.last_plan_failed
        && matches!(
            decision,
            Decision::Hold(HoldCommand { escalated: true, .. })
                | Decision::NoAction(_, HoldSkip::AscentDisabled | HoldSkip::StationKeepingDisabled)
        )
}

fn hold(s: &Snapshot) -> Result<HoldCommand, HoldSkip> {
    if !s.keep_station && !s.ascend {
        return Err(HoldSkip::HoldingDisabled);
    }
    if !s.service_or_error {
        return Err(HoldSkip::NotServiceOrError);
    }
    if !s.plan_idle {
        return Err(HoldSkip::PlanActive);
    }
    if s.last_plan_failed && !s.fail_retry_overflowed {
        return Err(HoldSkip::AwaitingRetry);
    }

    let behavior = if s.underwater {
        if !s.ascend {
            return Err(HoldSkip::AscentDisabled);
        }
        HoldBehavior::Surface
    } else {
        if !s.keep_station {
            return Err(HoldSkip::StationKeepingDisabled);
        }
        HoldBehavior::StationKeep
    };

    Ok(HoldCommand {
        behavior,
        escalated: s.last_plan_failed,
    })
}
