use serde::Deserialize;
use serde::Serialize;

use crate::label::Value;

/// `IndexOpts` controls how an accessor resolves keys and applies
/// writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexOpts {
    /// Relative tolerance within which a float slice bound counts as
    /// an integer position.
    pub float_tolerance: f64,

    /// The value written wherever alignment or enlargement has no
    /// source data.
    pub fill: Value,

    /// Allow label-based writes to append missing keys to an axis.
    pub allow_enlargement: bool,
}

impl IndexOpts {
    // Enlarge on writes, fill with nulls.
    pub fn lenient() -> Self {
        Self {
            float_tolerance: f32::EPSILON as f64,
            fill: Value::Null,
            allow_enlargement: true,
        }
    }

    // Writes must target existing keys under every policy.
    pub fn strict() -> Self {
        Self {
            allow_enlargement: false,
            ..Self::lenient()
        }
    }

    pub fn with_fill(self, fill: impl Into<Value>) -> Self {
        Self {
            fill: fill.into(),
            ..self
        }
    }
}

impl Default for IndexOpts {
    fn default() -> Self {
        Self::lenient()
    }
}
