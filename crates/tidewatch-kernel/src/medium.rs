//! [`MediumTracker`] – current operating medium of the vehicle.

use tidewatch_types::Medium;

/// Holds the latest reported [`Medium`].  Starts as [`Medium::Unknown`],
/// which counts as out of water.
#[derive(Debug, Clone, Copy, Default)]
pub struct MediumTracker {
    current: Medium,
}

impl MediumTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept the medium reported by the latest medium-update event.
    pub fn update(&mut self, medium: Medium) {
        self.current = medium;
    }

    pub fn current(&self) -> Medium {
        self.current
    }

    /// `true` at the water surface or underwater.
    pub fn in_water(&self) -> bool {
        matches!(self.current, Medium::WaterSurface | Medium::Underwater)
    }

    pub fn is_underwater(&self) -> bool {
        self.current == Medium::Underwater
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unknown_and_dry() {
        let tracker = MediumTracker::new();
        assert_eq!(tracker.current(), Medium::Unknown);
        assert!(!tracker.in_water());
        assert!(!tracker.is_underwater());
    }

    #[test]
    fn predicates_per_medium() {
        let cases = [
            (Medium::Unknown, false, false),
            (Medium::Air, false, false),
            (Medium::WaterSurface, true, false),
            (Medium::Underwater, true, true),
        ];
        let mut tracker = MediumTracker::new();
        for (medium, in_water, underwater) in cases {
            tracker.update(medium);
            assert_eq!(tracker.in_water(), in_water, "{medium:?}");
            assert_eq!(tracker.is_underwater(), underwater, "{medium:?}");
        }
    }

    #[test]
    fn latest_update_wins() {
        let mut tracker = MediumTracker::new();
        tracker.update(Medium::Underwater);
        tracker.update(Medium::Unknown);
        assert!(!tracker.in_water());
    }
}
