//! Tunables for segment derivation and interaction queries.

use serde::{Deserialize, Serialize};

use crate::error::{IntersectError, Result};

/// Which visible segments take part in convergence and hit-test scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryScope {
    /// Only the exact plane intersections.
    #[default]
    CenterOnly,
    /// Centers and both slab-band edges of every peer.
    All,
}

/// Overlay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntersectionSettings {
    /// Below this `|dx|` a center segment is treated as vertical when
    /// deriving the slab offset direction (pixels).
    pub angle_epsilon: f64,
    /// Determinant threshold under which two lines count as parallel.
    pub parallel_tolerance: f64,
    /// Slack on the `[0, 1]` segment parameter range, and the distance under
    /// which two plane crossings are merged (pixels).
    pub segment_tolerance: f64,
    /// Pick distance used by `hit_test_default` (pixels).
    pub default_hit_threshold: f64,
    /// Segments considered by convergence and hit-test scans.
    pub query_scope: QueryScope,
}

impl Default for IntersectionSettings {
    fn default() -> Self {
        Self {
            angle_epsilon: 0.01,
            parallel_tolerance: 1e-9,
            segment_tolerance: 1e-6,
            default_hit_threshold: 5.0,
            query_scope: QueryScope::CenterOnly,
        }
    }
}

impl IntersectionSettings {
    /// Parse settings from TOML. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("angle_epsilon", self.angle_epsilon),
            ("parallel_tolerance", self.parallel_tolerance),
            ("segment_tolerance", self.segment_tolerance),
            ("default_hit_threshold", self.default_hit_threshold),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(IntersectError::InvalidSettings(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }
        Ok(())
    }
}
