//! `tidewatch-kernel` – Safety Supervisor Core
//!
//! Fuses asynchronous vehicle signals into one safety verdict per tick and,
//! when warranted, requests exactly one plan that moves the vehicle to a safe
//! behaviour: keep station, surface, or return to the safety location.
//!
//! # Modules
//!
//! - [`countdown`] – [`CountdownTimer`][countdown::CountdownTimer]: resettable
//!   count-up-to-threshold timer driven by caller-supplied instants.
//! - [`medium`] – [`MediumTracker`][medium::MediumTracker]: current operating
//!   medium and the in-water / underwater predicates.
//! - [`inputs`] – [`SupervisorState`][inputs::SupervisorState]: latest value
//!   of every input signal plus the one-way readiness flags.
//! - [`decision`] – [`evaluate`][decision::evaluate]: pure mapping from a
//!   captured [`Snapshot`][decision::Snapshot] to a
//!   [`Decision`][decision::Decision].
//! - [`dispatcher`] – [`CommandDispatcher`][dispatcher::CommandDispatcher]
//!   and the [`CommandSink`][dispatcher::CommandSink] transport seam.
//! - [`supervisor`] – [`Supervisor`][supervisor::Supervisor]: owns the state
//!   and applies each decision's side effects.
//! - [`config`] – [`SafetyConfig`][config::SafetyConfig].
//! - [`geo`] – great-circle distance.

pub mod config;
pub mod countdown;
pub mod decision;
pub mod dispatcher;
pub mod geo;
pub mod inputs;
pub mod medium;
pub mod supervisor;

pub use config::SafetyConfig;
pub use countdown::CountdownTimer;
pub use decision::{Decision, HoldBehavior, HoldCommand, HoldSkip, SafeReason, StandbyReason, UnsafeReason};
pub use dispatcher::{CommandDispatcher, CommandSink, RecordingSink};
pub use inputs::{Readiness, SupervisorState};
pub use medium::MediumTracker;
pub use supervisor::Supervisor;
