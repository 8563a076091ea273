//! Confidence and risk scoring for classified paths

use super::error::{NavResult, NavigationError};
use super::policy::ScoringPolicy;
use super::search::Candidate;
use super::types::{Path, RiskLevel};

/// Confidence in [0, 1] that following `candidate` stays on solid ground.
///
/// Evidence weight is derived from the mean per-hop resistance
/// `1 / (evidence_count + 1)`: a route whose every edge carries `n` evidence
/// has weight `n`. It is then discounted by node penalties and a linear hop
/// penalty, and capped when the route crosses blind spots or runs long.
pub fn confidence(candidate: &Candidate, scoring: &ScoringPolicy) -> f64 {
    let hops = candidate.hops();
    if hops == 0 {
        return 0.0;
    }

    let mean_resistance = candidate.resistance() / hops as f64;
    let evidence_weight = (1.0 / mean_resistance - 1.0).max(0.0);
    let hop_penalty = scoring.hop_penalty_per_hop * hops as f64;

    let mut confidence =
        evidence_weight / (evidence_weight + candidate.penalty_total + hop_penalty + 1.0);
    if candidate.blind_spot_count() > 0 {
        confidence = confidence.min(scoring.blind_spot_confidence_cap);
    }
    if hops > scoring.long_path_hops {
        confidence = confidence.min(scoring.long_path_confidence_cap);
    }
    confidence.clamp(0.0, 1.0)
}

pub fn risk_level(blind_spot_count: usize, coverage_sources: usize) -> RiskLevel {
    if blind_spot_count == 0 && coverage_sources >= 2 {
        RiskLevel::Low
    } else if blind_spot_count >= 2 || coverage_sources == 0 {
        RiskLevel::High
    } else {
        RiskLevel::Medium
    }
}

/// Reject a path that outruns its evidence or hides its risk
pub fn validate_path(path: &Path) -> NavResult<()> {
    if !path.confidence.is_finite() || !(0.0..=1.0).contains(&path.confidence) {
        return Err(NavigationError::InvariantViolation(format!(
            "{} path has confidence {} outside [0, 1]",
            path.path_type, path.confidence
        )));
    }
    if path.nodes.len() != path.total_hops + 1 {
        return Err(NavigationError::InvariantViolation(format!(
            "{} path reports {} hops over {} nodes",
            path.path_type,
            path.total_hops,
            path.nodes.len()
        )));
    }
    for pair in path.nodes.windows(2) {
        let hop = &pair[1];
        if hop.edge_id.is_none() || hop.evidence_count.unwrap_or(0) == 0 {
            return Err(NavigationError::InvariantViolation(format!(
                "{} path hop {} -> {} is not evidence-backed",
                path.path_type, pair[0].entity.id, hop.entity.id
            )));
        }
    }
    Ok(())
}
