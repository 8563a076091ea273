//! Tunable navigation policy
//!
//! Zone-score weights, penalty constants and scoring caps are policy, not
//! physics. They live here as named configuration so they can be
//! recalibrated (or loaded from YAML) without touching the search.

use crate::graph::CoverageSource;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors loading or validating a policy
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid policy: {0}")]
    Invalid(String),
}

/// Weights of the composite zone score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneWeights {
    pub coverage: f64,
    pub density: f64,
    /// Weight of "not a blind spot"
    pub clarity: f64,
    pub centrality: f64,
}

impl Default for ZoneWeights {
    fn default() -> Self {
        Self {
            coverage: 0.4,
            density: 0.3,
            clarity: 0.2,
            centrality: 0.1,
        }
    }
}

/// Zone classification thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZonePolicy {
    pub weights: ZoneWeights,
    pub core_min_coverage: f64,
    pub core_min_score: f64,
    pub near_blind_max_coverage: f64,
    pub near_blind_min_severity: f64,
    /// An entity observed through at most this many channels may be a blind spot
    pub blind_spot_max_channels: usize,
    /// ...if its evidence density is also below this value
    pub blind_spot_max_density: f64,
    /// Incident evidence at which density reaches 0.5
    pub density_half_saturation: f64,
}

impl Default for ZonePolicy {
    fn default() -> Self {
        Self {
            weights: ZoneWeights::default(),
            core_min_coverage: 0.66,
            core_min_score: 0.6,
            near_blind_max_coverage: 0.33,
            near_blind_min_severity: 0.5,
            blind_spot_max_channels: 1,
            blind_spot_max_density: 0.5,
            density_half_saturation: 5.0,
        }
    }
}

/// Edge-weight penalties for traversing into weak territory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightPolicy {
    /// Added when the destination is NEAR_BLIND
    pub blind_spot_penalty: f64,
    /// Added when the destination has no coverage source at all
    pub zero_coverage_penalty: f64,
}

impl Default for WeightPolicy {
    fn default() -> Self {
        Self {
            blind_spot_penalty: 0.5,
            zero_coverage_penalty: 1.0,
        }
    }
}

/// Confidence and category scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub hop_penalty_per_hop: f64,
    pub blind_spot_confidence_cap: f64,
    pub long_path_confidence_cap: f64,
    /// Paths with more hops than this are capped by `long_path_confidence_cap`
    pub long_path_hops: usize,
    /// INFORMATIVE requires coverage diversity strictly above this
    pub informative_min_diversity: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            hop_penalty_per_hop: 0.1,
            blind_spot_confidence_cap: 0.7,
            long_path_confidence_cap: 0.6,
            long_path_hops: 5,
            informative_min_diversity: 0.5,
        }
    }
}

/// Search bounds and defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPolicy {
    pub default_max_hops: usize,
    pub default_max_paths: usize,
    /// Near-shortest alternatives collected in goal mode
    pub goal_candidates: usize,
    /// Frontier paths kept in explore mode
    pub explore_candidates: usize,
    pub timeout_ms: u64,
    /// Largest `max_hops` a query may ask for
    pub max_hops_limit: usize,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            default_max_hops: 3,
            default_max_paths: 3,
            goal_candidates: 5,
            explore_candidates: 24,
            timeout_ms: 500,
            max_hops_limit: 16,
        }
    }
}

/// Complete navigation policy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationPolicy {
    pub zone: ZonePolicy,
    pub weights: WeightPolicy,
    pub scoring: ScoringPolicy,
    pub search: SearchPolicy,
}

impl NavigationPolicy {
    /// Parse a policy from YAML. Missing sections and fields keep defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, PolicyError> {
        let policy: NavigationPolicy = serde_yaml::from_str(yaml)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Load a policy from a YAML file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<(), PolicyError> {
        let w = &self.zone.weights;
        let parts = [w.coverage, w.density, w.clarity, w.centrality];
        if parts.iter().any(|p| !(0.0..=1.0).contains(p)) {
            return Err(PolicyError::Invalid("zone weights must lie in [0, 1]".into()));
        }
        let sum: f64 = parts.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(PolicyError::Invalid(format!(
                "zone weights must sum to 1.0, got {:.3}",
                sum
            )));
        }

        let unit = [
            ("core_min_coverage", self.zone.core_min_coverage),
            ("core_min_score", self.zone.core_min_score),
            ("near_blind_max_coverage", self.zone.near_blind_max_coverage),
            ("near_blind_min_severity", self.zone.near_blind_min_severity),
            ("blind_spot_max_density", self.zone.blind_spot_max_density),
            ("blind_spot_confidence_cap", self.scoring.blind_spot_confidence_cap),
            ("long_path_confidence_cap", self.scoring.long_path_confidence_cap),
            ("informative_min_diversity", self.scoring.informative_min_diversity),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(PolicyError::Invalid(format!("{} must lie in [0, 1]", name)));
            }
        }
        if self.zone.near_blind_max_coverage >= self.zone.core_min_coverage {
            return Err(PolicyError::Invalid(
                "near_blind_max_coverage must be below core_min_coverage".into(),
            ));
        }
        if self.zone.blind_spot_max_channels >= CoverageSource::ALL.len() {
            return Err(PolicyError::Invalid(format!(
                "blind_spot_max_channels must be below {}",
                CoverageSource::ALL.len()
            )));
        }
        if self.zone.density_half_saturation <= 0.0 {
            return Err(PolicyError::Invalid("density_half_saturation must be positive".into()));
        }

        let p = &self.weights;
        if p.blind_spot_penalty < 0.0 || p.zero_coverage_penalty < 0.0 {
            return Err(PolicyError::Invalid("penalties must be non-negative".into()));
        }
        if p.zero_coverage_penalty < p.blind_spot_penalty {
            return Err(PolicyError::Invalid(
                "zero_coverage_penalty must be at least blind_spot_penalty".into(),
            ));
        }
        if self.scoring.hop_penalty_per_hop < 0.0 {
            return Err(PolicyError::Invalid("hop_penalty_per_hop must be non-negative".into()));
        }

        let s = &self.search;
        if s.default_max_hops == 0 || s.default_max_paths == 0 {
            return Err(PolicyError::Invalid("default max_hops and max_paths must be at least 1".into()));
        }
        if s.goal_candidates == 0 || s.explore_candidates == 0 {
            return Err(PolicyError::Invalid("candidate limits must be at least 1".into()));
        }
        if s.default_max_hops > s.max_hops_limit {
            return Err(PolicyError::Invalid(
                "default_max_hops must not exceed max_hops_limit".into(),
            ));
        }
        Ok(())
    }
}
