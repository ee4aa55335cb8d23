use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Role bit carried in the system id of every operator console.
pub const CONSOLE_ROLE_BIT: u16 = 0x4000;

/// Network identity of a system on the vehicle network.
///
/// The high bits encode the system's role; [`CONSOLE_ROLE_BIT`] marks an
/// operator console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemId(pub u16);

impl SystemId {
    /// `true` when this id carries the console role bit.
    pub fn is_console(self) -> bool {
        self.0 & CONSOLE_ROLE_BIT != 0
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

/// A WGS-84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

impl GeoPoint {
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Inbound signals
// ────────────────────────────────────────────────────────────────────────────

/// Physical environment the vehicle currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Medium {
    Air,
    WaterSurface,
    Underwater,
    /// Also what any unrecognised value decodes to.
    #[default]
    #[serde(other)]
    Unknown,
}

/// High-level operation mode reported by the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    Service,
    Calibration,
    Error,
    Maneuver,
    External,
    Boot,
}

/// Execution phase of the plan-control subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanPhase {
    #[default]
    Blocked,
    Ready,
    Initializing,
    Executing,
}

impl PlanPhase {
    /// `true` when no plan is running (blocked or ready).
    pub fn is_idle(self) -> bool {
        matches!(self, PlanPhase::Blocked | PlanPhase::Ready)
    }
}

/// Outcome of the last plan executed by the plan-control subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanOutcome {
    #[default]
    None,
    Success,
    Failure,
}

/// Snapshot of the plan-control subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanControlState {
    pub phase: PlanPhase,
    pub last_outcome: PlanOutcome,
}

/// One asynchronous input consumed by the safety supervisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", content = "payload", rename_all = "snake_case")]
pub enum Signal {
    /// Navigation fix of the vehicle.
    Position(GeoPoint),
    /// Periodic presence announcement from a system on the network.
    Heartbeat { sender: SystemId },
    /// A plan-control request seen on the network, with its issuer.
    PlanCommand { issuer: SystemId },
    /// Latest state of the plan-control subsystem.
    PlanControlState(PlanControlState),
    /// Vehicle operation mode change.
    VehicleState { mode: OperationMode },
    /// Operating medium change.  An absent medium decodes as unknown.
    Medium {
        #[serde(default)]
        medium: Medium,
    },
}

impl Signal {
    /// Short label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Signal::Position(_) => "position",
            Signal::Heartbeat { .. } => "heartbeat",
            Signal::PlanCommand { .. } => "plan_command",
            Signal::PlanControlState(_) => "plan_control_state",
            Signal::VehicleState { .. } => "vehicle_state",
            Signal::Medium { .. } => "medium",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Outbound commands
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanGenerationOp {
    Request,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanGenerationCmd {
    Execute,
}

/// Request for the plan-execution subsystem to generate and run a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanGeneration {
    pub plan_id: String,
    pub op: PlanGenerationOp,
    pub cmd: PlanGenerationCmd,
    /// Free-form `key=value;...` execution parameters.
    pub params: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityState {
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    Idle,
    Active,
}

/// Activity report of the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityStatus {
    pub state: EntityState,
    pub code: StatusCode,
}

impl EntityStatus {
    pub fn normal(code: StatusCode) -> Self {
        Self {
            state: EntityState::Normal,
            code,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Bus envelope
// ────────────────────────────────────────────────────────────────────────────

/// Unified event wrapper for the in-process event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g. `"tidewatch-cli::stdin"`
    pub source: String,
    pub payload: EventPayload,
}

impl Event {
    /// Wrap `payload` in a fresh envelope stamped with the current time.
    pub fn new(source: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            payload,
        }
    }
}

/// Variants of data that can be routed over the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPayload {
    Signal(Signal),
    PlanGeneration(PlanGeneration),
    EntityStatus(EntityStatus),
}

/// Error type shared by every tidewatch crate.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SafetyError {
    #[error("Invalid configuration for {field}: {details}")]
    InvalidConfig { field: String, details: String },

    #[error("Channel Error: {0}")]
    Channel(String),

    #[error("Serialization Error: {0}")]
    Serialization(String),
}
