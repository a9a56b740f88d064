use serde::{Deserialize, Serialize};

use crate::error::{FibError, FibResult};
use crate::types::{
    DEFAULT_DUAL_LENGTH, DEFAULT_LENGTH, DEFAULT_MAX_DISTANCE, DEFAULT_PASSES,
    DEFAULT_PROGRESS_INTERVAL,
};

/// Parameters for building a co-occurrence model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Largest offset recorded in the tables.
    pub max_distance: usize,
    /// Tokens between progress log lines.
    pub progress_interval: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_DISTANCE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> FibResult<()> {
        if self.max_distance < 2 {
            return Err(FibError::Config(format!(
                "max_distance must be at least 2, got {}",
                self.max_distance
            )));
        }
        if self.progress_interval == 0 {
            return Err(FibError::Config(
                "progress_interval must be greater than or equal to 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parameters for seeded generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Number of output positions.
    pub length: usize,
    /// Diffusion passes. One pass reproduces the multi-seed merge.
    pub passes: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            passes: DEFAULT_PASSES,
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> FibResult<()> {
        validate_length(self.length)
    }
}

/// How far a dual-level run extends past its seed syllables.
///
/// The thresholds are empirically tuned; callers may adjust them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionPolicy {
    pub short_limit: usize,
    pub medium_limit: usize,
    pub short_extension: usize,
    pub medium_extension: usize,
    pub long_extension: usize,
    pub min_length: usize,
}

impl Default for ExtensionPolicy {
    fn default() -> Self {
        Self {
            short_limit: 5,
            medium_limit: 15,
            short_extension: 20,
            medium_extension: 15,
            long_extension: 12,
            min_length: 25,
        }
    }
}

impl ExtensionPolicy {
    pub fn effective_length(&self, requested: usize, seed_count: usize) -> usize {
        let extension = if seed_count <= self.short_limit {
            self.short_extension
        } else if seed_count <= self.medium_limit {
            self.medium_extension
        } else {
            self.long_extension
        };
        requested
            .max(seed_count + extension)
            .max(self.min_length)
    }

    pub fn validate(&self) -> FibResult<()> {
        if self.short_limit > self.medium_limit {
            return Err(FibError::Config(format!(
                "short_limit ({}) must not exceed medium_limit ({})",
                self.short_limit, self.medium_limit
            )));
        }
        Ok(())
    }
}

/// Parameters for dual-level (syllable + word) generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DualLevelConfig {
    pub length: usize,
    pub passes: usize,
    pub extension: ExtensionPolicy,
}

impl Default for DualLevelConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_DUAL_LENGTH,
            passes: 1,
            extension: ExtensionPolicy::default(),
        }
    }
}

impl DualLevelConfig {
    pub fn validate(&self) -> FibResult<()> {
        validate_length(self.length)?;
        self.extension.validate()
    }
}

fn validate_length(length: usize) -> FibResult<()> {
    if length == 0 {
        return Err(FibError::Config(
            "length must be greater than or equal to 1".to_string(),
        ));
    }
    Ok(())
}
