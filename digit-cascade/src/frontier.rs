//! The frontier-advancing state machine: drives the work function and the
//! feasibility cascade across digit positions, one full frontier at a time.
//!
//! A transition is a complete barrier — every node of frontier k is
//! evaluated before frontier k + 1 is assembled. Node evaluation is a pure
//! function of `(k, p, q, carry, N, √N, total digits, base)`, so the
//! per-node map runs on rayon without affecting the produced child sets,
//! their order, or the collected statistics.

use log::{debug, info, warn};
use num_bigint::BigUint;
use num_traits::Zero;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use factoring_core::{isqrt, to_base_le, PowerCache};

use crate::branch::{Branch, PathStep};
use crate::cascade::{evaluate, CascadeContext, PruneCounts, Verdict};
use crate::recurrence::extend;

/// The base the search was designed and validated in.
pub const PRIMARY_BASE: u32 = 10;

/// Caller contract violations. Everything else the engine can encounter,
/// including running out of branches, is a normal terminal state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("target must be a positive integer")]
    ZeroTarget,

    #[error("base must be at least 2, got {0}")]
    BaseTooSmall(u32),
}

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchConfig {
    /// Numeral base the digit search runs in.
    pub base: u32,
    /// Restrict the search to the p ≤ q half-space by pruning branches
    /// whose partial values flip that order.
    ///
    /// Off by default: partial ordering does not always predict final
    /// ordering, even in the primary base. For 437 = 19 × 23 the true
    /// branch holds p-digit 9 against q-digit 3 at position 1 and its
    /// mirror flips at position 2, so the reduction discards both. Enable
    /// it only for inputs known to keep partial order stable.
    pub symmetry_reduction: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            base: PRIMARY_BASE,
            symmetry_reduction: false,
        }
    }
}

impl SearchConfig {
    /// Sound configuration for an arbitrary base.
    pub fn for_base(base: u32) -> Self {
        SearchConfig {
            base,
            symmetry_reduction: false,
        }
    }

    /// Opt in to the p ≤ q half-space reduction.
    pub fn with_symmetry_reduction(mut self) -> Self {
        self.symmetry_reduction = true;
        self
    }
}

/// Where the search currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState {
    /// Positions 1..k-1 are resolved; `frontier` holds every live branch.
    Running { k: usize, frontier: Vec<Branch> },
    /// A nontrivial factorization was found.
    Solved {
        p: BigUint,
        q: BigUint,
        /// The digit choices that produced the factors, for external replay.
        path: Vec<PathStep>,
    },
    /// No branch survived: N has no factorization this search can reach.
    Exhausted,
}

impl SearchState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SearchState::Running { .. })
    }
}

/// Observational counters; they never influence verdicts or transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Digit pairs enumerated by the work function.
    pub candidates_visited: u64,
    /// Recurrence survivors that reached the cascade.
    pub cascade_evaluated: u64,
    /// Cascade rejections, by check.
    pub pruned: PruneCounts,
    /// Widest frontier seen so far.
    pub max_frontier_width: usize,
    /// Completed frontier transitions.
    pub positions_advanced: usize,
}

/// Evaluation of one frontier node: its admitted children, the first exact
/// match in candidate-generation order, and local counters.
struct NodeOutcome {
    survivors: Vec<Branch>,
    exact: Option<Branch>,
    visited: u64,
    evaluated: u64,
    pruned: PruneCounts,
}

fn evaluate_node(
    node: &Branch,
    digits: &[u32],
    powers: &PowerCache,
    ctx: &CascadeContext<'_>,
) -> NodeOutcome {
    let children = extend(node, digits, powers);
    let base = powers.base() as u64;
    let mut outcome = NodeOutcome {
        survivors: Vec::new(),
        exact: None,
        visited: base * base,
        evaluated: children.len() as u64,
        pruned: PruneCounts::default(),
    };

    for child in children {
        match evaluate(ctx, &child) {
            Verdict::Feasible => outcome.survivors.push(child),
            Verdict::ExactMatch => {
                if outcome.exact.is_none() {
                    outcome.exact = Some(child);
                }
            }
            Verdict::Pruned(reason) => outcome.pruned.record(reason),
        }
    }

    outcome
}

/// A digit-by-digit factor search over one target in one base.
#[derive(Debug, Clone)]
pub struct DigitSearch {
    n: BigUint,
    digits: Vec<u32>,
    sqrt_n: BigUint,
    powers: PowerCache,
    config: SearchConfig,
    stats: SearchStats,
    state: SearchState,
}

impl DigitSearch {
    /// Set up a search for `n` in `base` with the sound defaults.
    pub fn new(n: BigUint, base: u32) -> Result<Self, SearchError> {
        Self::with_config(n, SearchConfig::for_base(base))
    }

    /// Set up a search with explicit configuration. Computes the target's
    /// digit sequence and ⌊√N⌋ once; the initial state is a single empty
    /// branch at position 1.
    pub fn with_config(n: BigUint, config: SearchConfig) -> Result<Self, SearchError> {
        if config.base < 2 {
            return Err(SearchError::BaseTooSmall(config.base));
        }
        if n.is_zero() {
            return Err(SearchError::ZeroTarget);
        }

        if config.symmetry_reduction && config.base != PRIMARY_BASE {
            warn!(
                "symmetry reduction enabled in base {}: partial ordering is \
                 unstable outside base {} and can discard valid branches",
                config.base, PRIMARY_BASE
            );
        }

        let digits = to_base_le(&n, config.base);
        let sqrt_n = isqrt(&n);
        let powers = PowerCache::new(config.base, digits.len() + 1);

        info!(
            "search initialized: {} digits in base {}, symmetry reduction {}",
            digits.len(),
            config.base,
            if config.symmetry_reduction { "on" } else { "off" }
        );

        Ok(DigitSearch {
            n,
            digits,
            sqrt_n,
            powers,
            config,
            stats: SearchStats {
                max_frontier_width: 1,
                ..SearchStats::default()
            },
            state: SearchState::Running {
                k: 1,
                frontier: vec![Branch::root()],
            },
        })
    }

    pub fn target(&self) -> &BigUint {
        &self.n
    }

    pub fn base(&self) -> u32 {
        self.config.base
    }

    pub fn total_digits(&self) -> usize {
        self.digits.len()
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Perform exactly one frontier transition. Terminal states are
    /// absorbing: calling `advance` on them is a no-op.
    pub fn advance(&mut self) -> &SearchState {
        let (k, frontier) = match std::mem::replace(&mut self.state, SearchState::Exhausted) {
            SearchState::Running { k, frontier } => (k, frontier),
            terminal => {
                self.state = terminal;
                return &self.state;
            }
        };

        let ctx = CascadeContext {
            n: &self.n,
            sqrt_n: &self.sqrt_n,
            total_digits: self.digits.len(),
            powers: &self.powers,
            ordered: self.config.symmetry_reduction,
        };

        // Pure per-node evaluation; the ordered collect keeps the merge
        // identical to a sequential sweep.
        let outcomes: Vec<NodeOutcome> = frontier
            .par_iter()
            .map(|node| evaluate_node(node, &self.digits, &self.powers, &ctx))
            .collect();

        let mut next = Vec::new();
        let mut solution: Option<Branch> = None;
        for outcome in outcomes {
            self.stats.candidates_visited += outcome.visited;
            self.stats.cascade_evaluated += outcome.evaluated;
            self.stats.pruned.merge(&outcome.pruned);
            if solution.is_none() {
                solution = outcome.exact;
            }
            next.extend(outcome.survivors);
        }
        self.stats.positions_advanced += 1;

        self.state = if let Some(branch) = solution {
            info!(
                "solved at position {}: {} x {}",
                k, branch.p_value, branch.q_value
            );
            SearchState::Solved {
                p: branch.p_value.clone(),
                q: branch.q_value.clone(),
                path: branch.path(),
            }
        } else if next.is_empty() {
            info!("exhausted at position {}", k);
            SearchState::Exhausted
        } else {
            self.stats.max_frontier_width = self.stats.max_frontier_width.max(next.len());
            debug!(
                "position {} -> {}: frontier {} -> {}, {} pruned so far",
                k,
                k + 1,
                frontier.len(),
                next.len(),
                self.stats.pruned.total()
            );
            SearchState::Running {
                k: k + 1,
                frontier: next,
            }
        };

        &self.state
    }

    /// Drive the state machine to a terminal state.
    pub fn run(&mut self) -> &SearchState {
        while !self.state.is_terminal() {
            self.advance();
        }
        &self.state
    }
}
