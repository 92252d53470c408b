//! Host loop configuration.

use std::time::Duration;

/// Errors in a [`TickConfig`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Frames per second must be positive.
    #[error("fps must be greater than zero")]
    ZeroFps,
}

/// Configuration for the host tick loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickConfig {
    /// Target frames per second.
    pub fps: u32,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
    /// Whether to sleep out the remainder of each frame budget.
    pub paced: bool,
}

impl TickConfig {
    /// Create a paced config with the given frame rate and tick limit.
    #[must_use]
    pub fn new(fps: u32, max_ticks: u64) -> Self {
        Self {
            fps,
            max_ticks,
            paced: true,
        }
    }

    /// Enable or disable frame pacing.
    #[must_use]
    pub fn with_pacing(mut self, paced: bool) -> Self {
        self.paced = paced;
        self
    }

    /// Time allotted to one frame. Exact, so rates above 1000 fps still get
    /// a non-zero budget.
    #[must_use]
    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }

    /// Reject configurations the loop cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 {
            return Err(ConfigError::ZeroFps);
        }
        Ok(())
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        Self::new(60, 0)
    }
}
