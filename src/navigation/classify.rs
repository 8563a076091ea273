//! Path categorization
//!
//! Each [`PathType`] has its own selection function over the candidate
//! pool. Categories are chosen independently, so one route may be reported
//! under more than one label.

use super::error::NavResult;
use super::policy::ScoringPolicy;
use super::risk::{confidence, risk_level, validate_path};
use super::search::Candidate;
use super::types::{CognitiveZone, Path, PathType};
use crate::graph::CoverageSource;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// How much of the channel universe a route touches, counting channels the
/// seed has not already seen twice. 0 when the route has no sources, 1 when
/// it covers every channel and all of them are new to the seed.
pub fn coverage_diversity(
    path_sources: &BTreeSet<CoverageSource>,
    seed_sources: &BTreeSet<CoverageSource>,
) -> f64 {
    let universe = CoverageSource::ALL.len() as f64;
    let novel = path_sources.difference(seed_sources).count() as f64;
    (path_sources.len() as f64 + novel) / (2.0 * universe)
}

/// Inputs shared by all selection functions
pub struct Selection<'a> {
    pub seed_sources: &'a BTreeSet<CoverageSource>,
    pub scoring: &'a ScoringPolicy,
}

impl PathType {
    /// Pick this category's route from the pool, if any qualifies
    pub fn select<'c>(&self, candidates: &'c [Candidate], ctx: &Selection<'_>) -> Option<&'c Candidate> {
        match self {
            PathType::Safe => select_safe(candidates),
            PathType::Informative => select_informative(candidates, ctx),
            PathType::Conservative => select_conservative(candidates),
        }
    }

    fn describe(&self, candidate: &Candidate, ctx: &Selection<'_>) -> String {
        let summary = format!(
            "{} hops, {} evidence, {} coverage source(s)",
            candidate.hops(),
            candidate.total_evidence,
            candidate.coverage_sources.len()
        );
        match self {
            PathType::Safe => format!("Lowest-weight route with no blind spots ({})", summary),
            PathType::Informative => format!(
                "Route with the broadest provenance relative to the seed, diversity {:.2} ({})",
                coverage_diversity(&candidate.coverage_sources, ctx.seed_sources),
                summary
            ),
            PathType::Conservative => {
                format!(
                    "Lowest-weight route that stays out of NEAR_BLIND territory and blind spots ({})",
                    summary
                )
            }
        }
    }
}

fn lightest<'c>(candidates: impl Iterator<Item = &'c Candidate>) -> Option<&'c Candidate> {
    candidates.min_by(|a, b| a.rank(b))
}

fn select_safe(candidates: &[Candidate]) -> Option<&Candidate> {
    lightest(candidates.iter().filter(|c| c.blind_spot_count() == 0))
}

/// Everything SAFE excludes, plus the whole NEAR_BLIND zone
fn select_conservative(candidates: &[Candidate]) -> Option<&Candidate> {
    lightest(
        candidates
            .iter()
            .filter(|c| c.traversed().iter().all(|n| !n.blind_spot && n.zone != CognitiveZone::NearBlind)),
    )
}

fn select_informative<'c>(candidates: &'c [Candidate], ctx: &Selection<'_>) -> Option<&'c Candidate> {
    let diversity = |c: &Candidate| coverage_diversity(&c.coverage_sources, ctx.seed_sources);
    candidates
        .iter()
        .filter(|c| diversity(c) > ctx.scoring.informative_min_diversity)
        .min_by(|a, b| {
            diversity(b)
                .partial_cmp(&diversity(a))
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.rank(b))
        })
}

/// Classify candidates into at most one path per category, scored and
/// validated, in presentation order (SAFE, INFORMATIVE, CONSERVATIVE).
pub fn categorize_paths(
    candidates: &[Candidate],
    seed_sources: &BTreeSet<CoverageSource>,
    scoring: &ScoringPolicy,
) -> NavResult<Vec<Path>> {
    let ctx = Selection {
        seed_sources,
        scoring,
    };

    let mut paths = Vec::new();
    for path_type in PathType::ALL {
        let Some(candidate) = path_type.select(candidates, &ctx) else {
            tracing::debug!(category = %path_type, "no qualifying candidate");
            continue;
        };

        let blind_spot_count = candidate.blind_spot_count();
        let path = Path {
            path_type,
            nodes: candidate.nodes.clone(),
            confidence: confidence(candidate, scoring),
            risk_level: risk_level(blind_spot_count, candidate.coverage_sources.len()),
            total_hops: candidate.hops(),
            total_evidence: candidate.total_evidence,
            coverage_sources: candidate.coverage_sources.clone(),
            blind_spot_count,
            reason: path_type.describe(candidate, &ctx),
        };
        validate_path(&path)?;
        paths.push(path);
    }
    Ok(paths)
}
