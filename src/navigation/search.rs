//! Evidence-weighted path search
//!
//! The search runs on a bounded local subgraph around the seed: every
//! entity reachable within `max_hops` over evidence-backed edges, with the
//! edges among them treated as undirected. Traversing A -> B costs
//!
//! ```text
//! 1 / (evidence_count + 1) + penalty(B)
//! ```
//!
//! where `penalty(B)` adds `blind_spot_penalty` when B is NEAR_BLIND and
//! `zero_coverage_penalty` when B has no coverage source at all. Hop count
//! is a hard bound, not part of the cost.

use super::classify::coverage_diversity;
use super::deadline::Deadline;
use super::error::{NavResult, NavigationError};
use super::policy::{SearchPolicy, WeightPolicy};
use super::types::{CognitiveZone, EntitySummary, PathNode};
use super::zone::ZoneEvaluator;
use crate::graph::{CoverageSource, EntityId, EvidenceEdge, GraphSnapshot};
use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet};

/// A raw route from the seed, before classification and scoring
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Seed first; every later node records the edge used to reach it
    pub nodes: Vec<PathNode>,
    /// Sum of traversal weights
    pub weight: f64,
    /// Sum of blind-spot and zero-coverage penalties paid along the way
    pub penalty_total: f64,
    pub total_evidence: u64,
    /// Union of the traversed edges' coverage sources
    pub coverage_sources: BTreeSet<CoverageSource>,
}

impl Candidate {
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Nodes after the seed
    pub fn traversed(&self) -> &[PathNode] {
        self.nodes.get(1..).unwrap_or(&[])
    }

    pub fn blind_spot_count(&self) -> usize {
        self.traversed().iter().filter(|n| n.blind_spot).count()
    }

    pub fn near_blind_count(&self) -> usize {
        self.traversed()
            .iter()
            .filter(|n| n.zone == CognitiveZone::NearBlind)
            .count()
    }

    /// Sum of `1 / (evidence_count + 1)` over traversed edges
    pub fn resistance(&self) -> f64 {
        self.traversed()
            .iter()
            .map(|n| 1.0 / (f64::from(n.evidence_count.unwrap_or(0)) + 1.0))
            .sum()
    }

    /// Entity ids along the route, seed first
    pub fn entity_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.entity.id.as_str()).collect()
    }

    /// Deterministic ranking: lighter first, then fewer hops, then by ids
    pub fn rank(&self, other: &Self) -> Ordering {
        self.weight
            .partial_cmp(&other.weight)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.hops().cmp(&other.hops()))
            .then_with(|| self.entity_ids().cmp(&other.entity_ids()))
    }
}

/// Bounded, undirected view of the evidence graph around a seed
struct LocalGraph<'a> {
    ids: Vec<&'a EntityId>,
    index: HashMap<&'a EntityId, usize>,
    adjacency: Vec<Vec<(usize, &'a EvidenceEdge)>>,
}

impl<'a> LocalGraph<'a> {
    /// Breadth-first collection of everything within `max_hops` of `seed`
    fn around(
        snapshot: &'a GraphSnapshot,
        seed: &'a EntityId,
        max_hops: usize,
        deadline: &Deadline,
    ) -> NavResult<Self> {
        let mut ids: Vec<&'a EntityId> = vec![seed];
        let mut index: HashMap<&'a EntityId, usize> = HashMap::from([(seed, 0)]);
        let mut frontier: Vec<&'a EntityId> = vec![seed];

        for _depth in 0..max_hops {
            deadline.check()?;
            let mut next = Vec::new();
            for id in &frontier {
                for neighbor in snapshot.neighbors(id) {
                    if index.contains_key(neighbor.entity) {
                        continue;
                    }
                    index.insert(neighbor.entity, ids.len());
                    ids.push(neighbor.entity);
                    next.push(neighbor.entity);
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        let adjacency = ids
            .iter()
            .map(|id| {
                snapshot
                    .neighbors(id)
                    .into_iter()
                    .filter_map(|n| index.get(n.entity).map(|&j| (j, n.edge)))
                    .collect()
            })
            .collect();

        Ok(Self {
            ids,
            index,
            adjacency,
        })
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn edge(&self, from: usize, to: usize) -> Option<&'a EvidenceEdge> {
        self.adjacency[from]
            .iter()
            .find(|(j, _)| *j == to)
            .map(|(_, e)| *e)
    }
}

/// Zone facts about one local node, computed once per query
#[derive(Debug, Clone, Copy)]
struct NodeFacts {
    zone: CognitiveZone,
    blind_spot: bool,
    penalty: f64,
}

/// Nodes and directed edges excluded from one Dijkstra run
#[derive(Default)]
struct Blocked {
    nodes: HashSet<usize>,
    edges: HashSet<(usize, usize)>,
}

/// Hop-indexed Dijkstra labels: `dist[node][hops]`
struct Labels {
    dist: Vec<Vec<f64>>,
    prev: Vec<Vec<Option<usize>>>,
}

impl Labels {
    /// Cheapest route to `to` over any hop count, fewest hops on ties
    fn route_to(&self, from: usize, to: usize) -> Option<Vec<usize>> {
        let (hops, cost) = self.dist[to]
            .iter()
            .enumerate()
            .fold((0, f64::INFINITY), |best, (h, &d)| if d < best.1 { (h, d) } else { best });
        if !cost.is_finite() {
            return None;
        }

        let mut route = vec![to];
        let (mut current, mut h) = (to, hops);
        while h > 0 {
            current = self.prev[current][h]?;
            route.push(current);
            h -= 1;
        }
        route.reverse();
        (route[0] == from).then_some(route)
    }
}

/// State for Dijkstra's priority queue
#[derive(Debug, Clone, Copy)]
struct SearchState {
    cost: f64,
    node: usize,
    hops: usize,
}

impl PartialEq for SearchState {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchState {}

impl PartialOrd for SearchState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.hops.cmp(&self.hops))
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Route as local indices, with its total weight
#[derive(Debug, Clone)]
struct Route {
    nodes: Vec<usize>,
    weight: f64,
}

impl Route {
    fn order(&self, other: &Self) -> Ordering {
        self.weight
            .partial_cmp(&other.weight)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.nodes.len().cmp(&other.nodes.len()))
            .then_with(|| self.nodes.cmp(&other.nodes))
    }
}

/// Evidence-weighted search over one snapshot
pub struct PathSearch<'a> {
    zones: &'a ZoneEvaluator<'a>,
    weights: &'a WeightPolicy,
    limits: &'a SearchPolicy,
    deadline: Deadline,
}

impl<'a> PathSearch<'a> {
    pub fn new(
        zones: &'a ZoneEvaluator<'a>,
        weights: &'a WeightPolicy,
        limits: &'a SearchPolicy,
        deadline: Deadline,
    ) -> Self {
        Self {
            zones,
            weights,
            limits,
            deadline,
        }
    }

    /// Reachable routes from `seed` within `max_hops` (no goal).
    ///
    /// Returns the cheapest route to each reachable entity, plus routes
    /// that avoid weak territory, trimmed to the explore budget.
    pub fn explore(&self, seed: &EntityId, max_hops: usize) -> NavResult<Vec<Candidate>> {
        self.check_hops(max_hops)?;
        let snapshot = self.zones.snapshot();
        let seed = self.known(seed)?;
        let local = LocalGraph::around(snapshot, seed, max_hops, &self.deadline)?;
        let facts = self.facts(&local)?;

        let mut routes: Vec<Route> = Vec::new();
        for blocked in self.restrictions(&facts, None) {
            let labels = self.shortest(&local, &facts, 0, max_hops, &blocked)?;
            for target in 1..local.len() {
                if blocked.nodes.contains(&target) {
                    continue;
                }
                if let Some(nodes) = labels.route_to(0, target) {
                    push_unique(&mut routes, self.route(&local, &facts, nodes));
                }
            }
        }

        tracing::debug!(seed = %seed, local = local.len(), routes = routes.len(), "explored neighborhood");
        self.finish(&local, &facts, routes, self.limits.explore_candidates)
    }

    /// Cheapest routes from `seed` to `goal` within `max_hops`, plus
    /// near-shortest alternatives. Empty when the goal is unreachable.
    pub fn find_paths(
        &self,
        seed: &EntityId,
        goal: &EntityId,
        max_hops: usize,
    ) -> NavResult<Vec<Candidate>> {
        self.check_hops(max_hops)?;
        let snapshot = self.zones.snapshot();
        let seed = self.known(seed)?;
        let goal = self.known(goal)?;
        let local = LocalGraph::around(snapshot, seed, max_hops, &self.deadline)?;
        let Some(&target) = local.index.get(goal) else {
            tracing::debug!(seed = %seed, goal = %goal, max_hops, "goal outside local graph");
            return Ok(Vec::new());
        };
        if target == 0 {
            return Ok(Vec::new());
        }
        let facts = self.facts(&local)?;

        let mut routes = self.k_shortest(&local, &facts, target, max_hops)?;
        for blocked in self.restrictions(&facts, Some(target)).into_iter().skip(1) {
            let labels = self.shortest(&local, &facts, 0, max_hops, &blocked)?;
            if let Some(nodes) = labels.route_to(0, target) {
                push_unique(&mut routes, self.route(&local, &facts, nodes));
            }
        }

        tracing::debug!(seed = %seed, goal = %goal, local = local.len(), routes = routes.len(), "found goal routes");
        self.finish(&local, &facts, routes, self.limits.goal_candidates)
    }

    /// Label tables grow with `max_hops`, so the bound is capped by policy
    fn check_hops(&self, max_hops: usize) -> NavResult<()> {
        if max_hops > self.limits.max_hops_limit {
            return Err(NavigationError::InvalidQuery(format!(
                "max_hops {} exceeds the limit of {}",
                max_hops, self.limits.max_hops_limit
            )));
        }
        Ok(())
    }

    fn known(&self, id: &EntityId) -> NavResult<&'a EntityId> {
        self.zones
            .snapshot()
            .entity(id)
            .map(|e| &e.id)
            .ok_or_else(|| NavigationError::NotFound(id.to_string()))
    }

    fn facts(&self, local: &LocalGraph<'_>) -> NavResult<Vec<NodeFacts>> {
        local
            .ids
            .iter()
            .map(|id| {
                self.deadline.check()?;
                let metrics = self.zones.compute_zone_metrics(id)?;
                let zone = self.zones.detect_zone(id)?;
                let mut penalty = 0.0;
                if zone == CognitiveZone::NearBlind {
                    penalty += self.weights.blind_spot_penalty;
                }
                if metrics.coverage_sources.is_empty() {
                    penalty += self.weights.zero_coverage_penalty;
                }
                Ok(NodeFacts {
                    zone,
                    blind_spot: metrics.blind_spot,
                    penalty,
                })
            })
            .collect()
    }

    /// Unrestricted, conservative and blind-spot-avoiding block sets. The
    /// conservative set blocks NEAR_BLIND nodes and blind spots in any zone.
    /// The seed and `keep` are never blocked.
    fn restrictions(&self, facts: &[NodeFacts], keep: Option<usize>) -> Vec<Blocked> {
        let avoid = |pred: &dyn Fn(&NodeFacts) -> bool| Blocked {
            nodes: (1..facts.len())
                .filter(|&i| Some(i) != keep && pred(&facts[i]))
                .collect(),
            edges: HashSet::new(),
        };
        vec![
            Blocked::default(),
            avoid(&|f: &NodeFacts| f.zone == CognitiveZone::NearBlind || f.blind_spot),
            avoid(&|f: &NodeFacts| f.blind_spot),
        ]
    }

    fn weight(&self, edge: &EvidenceEdge, facts: &[NodeFacts], to: usize) -> f64 {
        1.0 / (f64::from(edge.evidence_count) + 1.0) + facts[to].penalty
    }

    fn shortest(
        &self,
        local: &LocalGraph<'_>,
        facts: &[NodeFacts],
        from: usize,
        max_hops: usize,
        blocked: &Blocked,
    ) -> NavResult<Labels> {
        let n = local.len();
        let width = max_hops
            .checked_add(1)
            .ok_or_else(|| NavigationError::InvalidQuery(format!("max_hops {} is too large", max_hops)))?;
        let mut dist = vec![vec![f64::INFINITY; width]; n];
        let mut prev = vec![vec![None; width]; n];
        let mut heap = BinaryHeap::new();

        dist[from][0] = 0.0;
        heap.push(SearchState {
            cost: 0.0,
            node: from,
            hops: 0,
        });

        while let Some(SearchState { cost, node, hops }) = heap.pop() {
            self.deadline.check()?;
            if cost > dist[node][hops] || hops == max_hops {
                continue;
            }
            for &(next, edge) in &local.adjacency[node] {
                if blocked.nodes.contains(&next) || blocked.edges.contains(&(node, next)) {
                    continue;
                }
                let next_cost = cost + self.weight(edge, facts, next);
                if next_cost < dist[next][hops + 1] {
                    dist[next][hops + 1] = next_cost;
                    prev[next][hops + 1] = Some(node);
                    heap.push(SearchState {
                        cost: next_cost,
                        node: next,
                        hops: hops + 1,
                    });
                }
            }
        }

        Ok(Labels { dist, prev })
    }

    /// Yen's K-shortest simple routes under the hop bound
    fn k_shortest(
        &self,
        local: &LocalGraph<'_>,
        facts: &[NodeFacts],
        target: usize,
        max_hops: usize,
    ) -> NavResult<Vec<Route>> {
        let labels = self.shortest(local, facts, 0, max_hops, &Blocked::default())?;
        let Some(first) = labels.route_to(0, target) else {
            return Ok(Vec::new());
        };
        let mut accepted = vec![self.route(local, facts, first)];
        let mut pool: Vec<Route> = Vec::new();

        while accepted.len() < self.limits.goal_candidates {
            let last = accepted[accepted.len() - 1].nodes.clone();

            for spur_idx in 0..last.len().saturating_sub(1) {
                self.deadline.check()?;
                let root = &last[..=spur_idx];
                let spur = last[spur_idx];

                let mut blocked = Blocked::default();
                blocked.nodes.extend(root[..spur_idx].iter().copied());
                for route in &accepted {
                    if route.nodes.len() > spur_idx + 1 && route.nodes[..=spur_idx] == *root {
                        blocked.edges.insert((spur, route.nodes[spur_idx + 1]));
                    }
                }

                let labels = self.shortest(local, facts, spur, max_hops - spur_idx, &blocked)?;
                if let Some(spur_route) = labels.route_to(spur, target) {
                    let mut nodes = root[..spur_idx].to_vec();
                    nodes.extend(spur_route);
                    let route = self.route(local, facts, nodes);
                    if !accepted.iter().any(|r| r.nodes == route.nodes) {
                        push_unique(&mut pool, route);
                    }
                }
            }

            let Some(best) = (0..pool.len()).min_by(|&a, &b| pool[a].order(&pool[b])) else {
                break;
            };
            accepted.push(pool.swap_remove(best));
        }

        Ok(accepted)
    }

    fn route(&self, local: &LocalGraph<'_>, facts: &[NodeFacts], nodes: Vec<usize>) -> Route {
        let weight = nodes
            .windows(2)
            .map(|w| match local.edge(w[0], w[1]) {
                Some(edge) => self.weight(edge, facts, w[1]),
                None => f64::INFINITY,
            })
            .sum();
        Route { nodes, weight }
    }

    /// Materialize routes as candidates, keep the lightest `limit`, and
    /// make sure the best route for each category survives the cut.
    fn finish(
        &self,
        local: &LocalGraph<'_>,
        facts: &[NodeFacts],
        routes: Vec<Route>,
        limit: usize,
    ) -> NavResult<Vec<Candidate>> {
        let mut pool = routes
            .into_iter()
            .filter(|r| r.weight.is_finite() && is_simple(&r.nodes))
            .map(|r| self.candidate(local, facts, &r))
            .collect::<NavResult<Vec<_>>>()?;
        pool.sort_by(|a, b| a.rank(b));

        let seed_sources = self
            .zones
            .compute_zone_metrics(local.ids[0])?
            .coverage_sources;
        let reserved = [
            pool.iter()
                .position(|c| c.near_blind_count() == 0 && c.blind_spot_count() == 0),
            pool.iter().position(|c| c.blind_spot_count() == 0),
            (0..pool.len()).max_by(|&a, &b| {
                let da = coverage_diversity(&pool[a].coverage_sources, &seed_sources);
                let db = coverage_diversity(&pool[b].coverage_sources, &seed_sources);
                da.partial_cmp(&db)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| b.cmp(&a))
            }),
        ];

        let mut keep: Vec<usize> = (0..pool.len().min(limit)).collect();
        for idx in reserved.into_iter().flatten() {
            if !keep.contains(&idx) {
                keep.push(idx);
            }
        }
        keep.sort_unstable();

        let mut slots: Vec<Option<Candidate>> = pool.into_iter().map(Some).collect();
        Ok(keep.into_iter().filter_map(|i| slots[i].take()).collect())
    }

    fn candidate(
        &self,
        local: &LocalGraph<'_>,
        facts: &[NodeFacts],
        route: &Route,
    ) -> NavResult<Candidate> {
        let snapshot = self.zones.snapshot();
        let mut nodes = Vec::with_capacity(route.nodes.len());
        let mut penalty_total = 0.0;
        let mut total_evidence = 0;
        let mut coverage_sources = BTreeSet::new();

        for (pos, &idx) in route.nodes.iter().enumerate() {
            let id = local.ids[idx];
            let entity = snapshot
                .entity(id)
                .ok_or_else(|| NavigationError::NotFound(id.to_string()))?;
            let edge = if pos == 0 {
                None
            } else {
                let from = route.nodes[pos - 1];
                let edge = local.edge(from, idx).filter(|e| e.is_evidence_backed());
                let Some(edge) = edge else {
                    return Err(NavigationError::InvariantViolation(format!(
                        "route hop {} -> {} has no evidence-backed edge",
                        local.ids[from], id
                    )));
                };
                penalty_total += facts[idx].penalty;
                total_evidence += u64::from(edge.evidence_count);
                coverage_sources.extend(edge.coverage_sources.iter().copied());
                Some(edge)
            };

            nodes.push(PathNode {
                entity: EntitySummary::from(entity),
                edge_id: edge.map(|e| e.id.clone()),
                relationship: edge.map(|e| e.relationship.clone()),
                evidence_count: edge.map(|e| e.evidence_count),
                zone: facts[idx].zone,
                blind_spot: facts[idx].blind_spot,
            });
        }

        Ok(Candidate {
            nodes,
            weight: route.weight,
            penalty_total,
            total_evidence,
            coverage_sources,
        })
    }
}

fn push_unique(routes: &mut Vec<Route>, route: Route) {
    if !routes.iter().any(|r| r.nodes == route.nodes) {
        routes.push(route);
    }
}

fn is_simple(nodes: &[usize]) -> bool {
    let mut seen = HashSet::with_capacity(nodes.len());
    nodes.iter().all(|n| seen.insert(*n))
}
