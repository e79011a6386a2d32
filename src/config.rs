use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Engine configuration.
///
/// Missing options take their defaults and unknown options are ignored, so
/// a partial JSON object is always a valid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Longest shingle length indexed (K); queries longer than this take the
    /// indirect path
    #[serde(default = "default_max_shingle_length")]
    pub max_shingle_length: usize,

    /// Fold text to lowercase before indexing and searching
    #[serde(default = "default_case_insensitive")]
    pub case_insensitive: bool,
}

fn default_max_shingle_length() -> usize {
    12
}

fn default_case_insensitive() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_shingle_length: default_max_shingle_length(),
            case_insensitive: default_case_insensitive(),
        }
    }
}

impl EngineConfig {
    pub fn with_max_shingle_length(mut self, k: usize) -> Self {
        self.max_shingle_length = k;
        self
    }

    pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_shingle_length < 1 {
            return Err(Error::InvalidShingleLength(self.max_shingle_length));
        }
        Ok(())
    }
}
