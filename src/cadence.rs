//! Sampling cadence policy.
//!
//! Two cadences, one active at a time. Crossing the acceleration threshold
//! upward switches to the fast cadence (flood-risk polling); dropping back
//! below it restores the normal one.
//!
//! ```text
//!            measurement >= threshold
//!   Normal ───────────────────────────▶ Accelerated
//!          ◀───────────────────────────
//!            measurement <  threshold
//! ```
//!
//! There is a single crossing point and no deadband, so a level hovering
//! right at the threshold toggles every cycle. That is a known limitation
//! of the field behaviour, kept as-is.

use core::time::Duration;

use crate::Measurement;

/// Default delay between measurement cycles.
pub const DEFAULT_CADENCE: Duration = Duration::from_millis(5000);
/// Default delay while accelerated mode is active.
pub const DEFAULT_ACCELERATED_CADENCE: Duration = Duration::from_millis(1000);

/// Which of the two cadences is driving the sleep between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CadenceMode {
    #[default]
    Normal,
    Accelerated,
}

impl CadenceMode {
    /// Pure transition: the mode after observing `measurement`.
    pub fn next(self, measurement: Measurement, threshold: Measurement) -> Self {
        match self {
            Self::Normal if measurement >= threshold => Self::Accelerated,
            Self::Accelerated if measurement < threshold => Self::Normal,
            unchanged => unchanged,
        }
    }

    pub fn is_accelerated(self) -> bool {
        self == Self::Accelerated
    }
}

/// A mode switch, reported so adapters can log it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadenceChange {
    pub from: CadenceMode,
    pub to: CadenceMode,
    /// Active delay after the switch.
    pub cadence: Duration,
}

/// Holds both cadence constants and the active mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadencePolicy {
    mode: CadenceMode,
    normal: Duration,
    accelerated: Duration,
}

impl Default for CadencePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_CADENCE, DEFAULT_ACCELERATED_CADENCE)
    }
}

impl CadencePolicy {
    pub fn new(normal: Duration, accelerated: Duration) -> Self {
        Self {
            mode: CadenceMode::Normal,
            normal,
            accelerated,
        }
    }

    pub fn mode(&self) -> CadenceMode {
        self.mode
    }

    /// The delay the driver should sleep before the next cycle.
    pub fn current(&self) -> Duration {
        match self.mode {
            CadenceMode::Normal => self.normal,
            CadenceMode::Accelerated => self.accelerated,
        }
    }

    /// The delay that is *not* active right now.
    pub fn standby(&self) -> Duration {
        match self.mode {
            CadenceMode::Normal => self.accelerated,
            CadenceMode::Accelerated => self.normal,
        }
    }

    /// `(current, standby)`: the pair that trades places on every toggle.
    pub fn pair(&self) -> (Duration, Duration) {
        (self.current(), self.standby())
    }

    pub fn normal(&self) -> Duration {
        self.normal
    }

    pub fn accelerated(&self) -> Duration {
        self.accelerated
    }

    pub fn set_normal(&mut self, cadence: Duration) {
        self.normal = cadence;
    }

    pub fn set_accelerated(&mut self, cadence: Duration) {
        self.accelerated = cadence;
    }

    /// Evaluate the threshold crossing for `measurement`.
    /// Returns the switch if the mode changed.
    pub fn update(&mut self, measurement: Measurement, threshold: Measurement) -> Option<CadenceChange> {
        let from = self.mode;
        let to = from.next(measurement, threshold);
        if to == from {
            return None;
        }
        self.mode = to;
        Some(CadenceChange {
            from,
            to,
            cadence: self.current(),
        })
    }
}
