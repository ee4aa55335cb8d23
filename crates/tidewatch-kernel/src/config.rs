//! [`SafetyConfig`] – tunable parameters of the safety supervisor.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tidewatch_types::{GeoPoint, SafetyError, SystemId};

/// Smallest accepted lost-communications timeout, in seconds.
pub const MIN_LOST_COMMS_TIMEOUT_SECS: u64 = 60;

/// Supervisor parameters.  Every field has a default so a partial TOML table
/// is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Seconds without a console heartbeat before the vehicle is sent to the
    /// safety location.
    #[serde(default = "default_lost_comms_timeout_secs")]
    pub lost_comms_timeout_secs: u64,

    /// Keep station once the vehicle is idle at the surface.
    #[serde(default = "default_true")]
    pub keep_station_at_surface: bool,

    /// Command an active ascent when idle underwater.  When `false` the
    /// vehicle relies on its natural buoyancy.
    #[serde(default = "default_true")]
    pub ascend_with_actuation: bool,

    /// Identity of the system this supervisor runs on.
    #[serde(default = "default_system_id")]
    pub system_id: SystemId,

    /// Where to send the vehicle when the console link is lost.  When absent
    /// the vehicle is always considered near safety.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_location: Option<GeoPoint>,
}

fn default_lost_comms_timeout_secs() -> u64 {
    600
}
fn default_true() -> bool {
    true
}
fn default_system_id() -> SystemId {
    SystemId(0x0001)
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            lost_comms_timeout_secs: default_lost_comms_timeout_secs(),
            keep_station_at_surface: true,
            ascend_with_actuation: true,
            system_id: default_system_id(),
            safety_location: None,
        }
    }
}

impl SafetyConfig {
    pub fn lost_comms_timeout(&self) -> Duration {
        Duration::from_secs(self.lost_comms_timeout_secs)
    }

    /// Check the parameter bounds.
    ///
    /// # Errors
    ///
    /// [`SafetyError::InvalidConfig`] when the lost-comms timeout is below
    /// [`MIN_LOST_COMMS_TIMEOUT_SECS`] or the safety location is not a valid
    /// coordinate.
    pub fn validate(&self) -> Result<(), SafetyError> {
        if self.lost_comms_timeout_secs < MIN_LOST_COMMS_TIMEOUT_SECS {
            return Err(SafetyError::InvalidConfig {
                field: "lost_comms_timeout_secs".to_string(),
                details: format!(
                    "{} s is below the minimum of {MIN_LOST_COMMS_TIMEOUT_SECS} s",
                    self.lost_comms_timeout_secs
                ),
            });
        }
        if let Some(loc) = self.safety_location {
            let lat_ok = loc.latitude_deg.is_finite() && loc.latitude_deg.abs() <= 90.0;
            let lon_ok = loc.longitude_deg.is_finite() && loc.longitude_deg.abs() <= 180.0;
            if !lat_ok || !lon_ok {
                return Err(SafetyError::InvalidConfig {
                    field: "safety_location".to_string(),
                    details: format!(
                        "({}, {}) is not a WGS-84 coordinate",
                        loc.latitude_deg, loc.longitude_deg
                    ),
                });
            }
        }
        Ok(())
    }
}
