use crate::config::{ConfigError, NON_NEGATIVE_I32};

/// Minimum `|dy| / |dx|` a stroke sample must exceed to count as part of the V.
pub const MIN_SLOPE: u32 = 1;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GestureConfig {
    /// Horizontal travel each stroke must accumulate before its button is released.
    pub min_x_displacement: i32,
    /// How far a sample may move against the stroke before it breaks the stroke.
    pub tolerance: u32,
    pub min_slope: u32,
}

impl GestureConfig {
    pub fn new(min_x_displacement: i32, tolerance: u32) -> Result<Self, ConfigError> {
        let config = Self {
            min_x_displacement,
            tolerance,
            min_slope: MIN_SLOPE,
        };
        config.validate()?;
        Ok(config)
    }

    pub const fn with_min_slope(mut self, min_slope: u32) -> Self {
        self.min_slope = min_slope;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_x_displacement < 0 {
            return Err(ConfigError::OutOfRange {
                key: "gesture.min_x_displacement",
                requirement: NON_NEGATIVE_I32,
                value: i64::from(self.min_x_displacement),
            });
        }
        Ok(())
    }
}
