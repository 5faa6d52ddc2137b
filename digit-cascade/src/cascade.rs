//! The feasibility cascade: ordered, short-circuiting checks applied to
//! every candidate child the work function emits. Each check is a sound
//! necessary condition for the branch to complete into a factorization of
//! N — a verdict of `Pruned` proves no completion exists, so the true
//! solution's branch can never be discarded.
//!
//! All comparisons run on unbounded integers. Narrowing any of these
//! quantities to a machine word would silently corrupt verdicts, which is
//! treated as a fatal invariant violation rather than a recoverable error.

use std::fmt;

use factoring_core::PowerCache;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use serde::Serialize;

use crate::branch::Branch;

/// Outcome of evaluating one candidate extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The branch may still complete; admit it to the next frontier.
    Feasible,
    /// Terminal position with p · q == N and both factors nontrivial.
    ExactMatch,
    /// Some bound proved no completion exists.
    Pruned(PruneReason),
}

/// Which bound eliminated a candidate. One variant per check that can fire;
/// the reserved length-split stage cannot fire and has no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PruneReason {
    /// Partial p exceeded partial q while the ordered half-space reduction
    /// was active.
    Symmetry,
    /// Terminal position without an exact nontrivial product.
    FinalMismatch,
    /// The partial product already exceeds the target.
    Overshoot,
    /// Partial p exceeded ⌊√N⌋ under the ordered reduction.
    RootEnvelope,
    /// Even the largest possible completion falls short of the target.
    GrowthEnvelope,
    /// The smallest possible nonzero completion overshoots the remaining gap.
    MinContribution,
    /// Linear-term restatement of the growth bound.
    LinearEnvelope,
    /// The bounded tails cannot stretch q to cover N / p_max.
    TailCoupling,
}

impl PruneReason {
    pub const ALL: [PruneReason; 8] = [
        PruneReason::Symmetry,
        PruneReason::FinalMismatch,
        PruneReason::Overshoot,
        PruneReason::RootEnvelope,
        PruneReason::GrowthEnvelope,
        PruneReason::MinContribution,
        PruneReason::LinearEnvelope,
        PruneReason::TailCoupling,
    ];
}

impl fmt::Display for PruneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PruneReason::Symmetry => write!(f, "symmetry"),
            PruneReason::FinalMismatch => write!(f, "final mismatch"),
            PruneReason::Overshoot => write!(f, "overshoot"),
            PruneReason::RootEnvelope => write!(f, "root envelope"),
            PruneReason::GrowthEnvelope => write!(f, "growth envelope"),
            PruneReason::MinContribution => write!(f, "min contribution"),
            PruneReason::LinearEnvelope => write!(f, "linear envelope"),
            PruneReason::TailCoupling => write!(f, "tail coupling"),
        }
    }
}

/// Fire counters, one per check that can prune.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PruneCounts {
    pub symmetry: u64,
    pub final_mismatch: u64,
    pub overshoot: u64,
    pub root_envelope: u64,
    pub growth_envelope: u64,
    pub min_contribution: u64,
    pub linear_envelope: u64,
    pub tail_coupling: u64,
}

impl PruneCounts {
    pub fn record(&mut self, reason: PruneReason) {
        match reason {
            PruneReason::Symmetry => self.symmetry += 1,
            PruneReason::FinalMismatch => self.final_mismatch += 1,
            PruneReason::Overshoot => self.overshoot += 1,
            PruneReason::RootEnvelope => self.root_envelope += 1,
            PruneReason::GrowthEnvelope => self.growth_envelope += 1,
            PruneReason::MinContribution => self.min_contribution += 1,
            PruneReason::LinearEnvelope => self.linear_envelope += 1,
            PruneReason::TailCoupling => self.tail_coupling += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.symmetry
            + self.final_mismatch
            + self.overshoot
            + self.root_envelope
            + self.growth_envelope
            + self.min_contribution
            + self.linear_envelope
            + self.tail_coupling
    }

    pub fn merge(&mut self, other: &PruneCounts) {
        self.symmetry += other.symmetry;
        self.final_mismatch += other.final_mismatch;
        self.overshoot += other.overshoot;
        self.root_envelope += other.root_envelope;
        self.growth_envelope += other.growth_envelope;
        self.min_contribution += other.min_contribution;
        self.linear_envelope += other.linear_envelope;
        self.tail_coupling += other.tail_coupling;
    }
}

/// Immutable per-search quantities the cascade compares against.
pub struct CascadeContext<'a> {
    pub n: &'a BigUint,
    pub sqrt_n: &'a BigUint,
    pub total_digits: usize,
    pub powers: &'a PowerCache,
    /// Whether the P ≤ Q half-space reduction is active. Partial value
    /// ordering does not always survive to the final position (for
    /// 437 = 19 × 23 it flips between positions 1 and 2), so the reduction
    /// is an opt-in.
    pub ordered: bool,
}

/// Run the cascade on a freshly extended branch. Checks are ordered cheap
/// to expensive and stop at the first that proves infeasibility.
pub fn evaluate(ctx: &CascadeContext<'_>, branch: &Branch) -> Verdict {
    let p = &branch.p_value;
    let q = &branch.q_value;
    let fixed = branch.fixed_digits();
    let remaining = ctx.total_digits - fixed;
    let one = BigUint::one();

    // 1. Ordered half-space: the mirrored branch covers the other half.
    if ctx.ordered && p > q {
        return Verdict::Pruned(PruneReason::Symmetry);
    }

    let product = p * q;

    // 2. Terminal position: only an exact nontrivial product succeeds.
    if remaining == 0 {
        return if *p > one && *q > one && product == *ctx.n {
            Verdict::ExactMatch
        } else {
            Verdict::Pruned(PruneReason::FinalMismatch)
        };
    }

    // 3. Values only grow with further digits.
    if product > *ctx.n {
        return Verdict::Pruned(PruneReason::Overshoot);
    }

    // 4. Under the ordered reduction, p past the root forces the product
    // past N. Cannot actually fire once checks 1 and 3 have passed; kept as
    // a separately counted diagnostic guard.
    if ctx.ordered && p > ctx.sqrt_n {
        return Verdict::Pruned(PruneReason::RootEnvelope);
    }

    let gap = ctx.n - &product;
    // Largest value either tail can contribute at this depth:
    // base^fixed · (base^remaining - 1).
    let tail_reach = ctx.powers.get(fixed) * (ctx.powers.get(remaining) - &one);

    // 5. Largest reachable completion: tails at maximum on both factors.
    let max_gain = &tail_reach * (p + q) + &tail_reach * &tail_reach;
    if max_gain < gap {
        return Verdict::Pruned(PruneReason::GrowthEnvelope);
    }

    // 6. Smallest nonzero completion. A completion must contribute exactly
    // `gap`; with both partials nonzero the cheapest extension is a single
    // unit digit against the smaller value.
    if !gap.is_zero() {
        let place = ctx.powers.get(fixed);
        let min_gain = if !p.is_zero() && !q.is_zero() {
            place * p.min(q)
        } else if !p.is_zero() || !q.is_zero() {
            place * p.max(q)
        } else {
            place * place
        };
        if min_gain > gap {
            return Verdict::Pruned(PruneReason::MinContribution);
        }
    }

    // 7. Growth bound restated through its linear term; subsumed by check 5
    // but counted on its own.
    if gap > &tail_reach * &tail_reach && &gap - &tail_reach * &tail_reach > &tail_reach * (p + q)
    {
        return Verdict::Pruned(PruneReason::LinearEnvelope);
    }

    // 8. If p cannot escape the root even at full stretch, q is pinned from
    // below by N / p_max and must be reachable.
    let p_max = p + &tail_reach;
    if p_max <= *ctx.sqrt_n {
        let q_min = (ctx.n + &p_max - &one) / &p_max;
        let q_max = q + &tail_reach;
        if q_max < q_min {
            return Verdict::Pruned(PruneReason::TailCoupling);
        }
    }

    // 9. Length-split between the factors' digit counts: reserved, never
    // fires.

    Verdict::Feasible
}

#[cfg(test)]
mod tests {
    use super::*;
    use factoring_core::isqrt;

    fn branch(k: usize, p: u64, q: u64, p_digits: Vec<u32>, q_digits: Vec<u32>) -> Branch {
        Branch {
            k,
            p_digits,
            q_digits,
            p_value: BigUint::from(p),
            q_value: BigUint::from(q),
            carry_in: BigUint::zero(),
        }
    }

    fn ctx<'a>(
        n: &'a BigUint,
        sqrt_n: &'a BigUint,
        total_digits: usize,
        powers: &'a PowerCache,
        ordered: bool,
    ) -> CascadeContext<'a> {
        CascadeContext {
            n,
            sqrt_n,
            total_digits,
            powers,
            ordered,
        }
    }

    #[test]
    fn test_symmetry_fires_only_when_ordered() {
        let n = BigUint::from(15u32);
        let sqrt_n = isqrt(&n);
        let powers = PowerCache::new(10, 3);
        let node = branch(2, 5, 3, vec![5], vec![3]);

        let ordered = ctx(&n, &sqrt_n, 2, &powers, true);
        assert_eq!(
            evaluate(&ordered, &node),
            Verdict::Pruned(PruneReason::Symmetry)
        );

        let unordered = ctx(&n, &sqrt_n, 2, &powers, false);
        assert_eq!(evaluate(&unordered, &node), Verdict::Feasible);
    }

    #[test]
    fn test_symmetry_accepts_equal_values() {
        let n = BigUint::from(39601u32);
        let sqrt_n = isqrt(&n);
        let powers = PowerCache::new(10, 6);
        let node = branch(2, 9, 9, vec![9], vec![9]);
        let c = ctx(&n, &sqrt_n, 5, &powers, true);
        assert_eq!(evaluate(&c, &node), Verdict::Feasible);
    }

    #[test]
    fn test_exact_match_at_terminal_position() {
        let n = BigUint::from(15u32);
        let sqrt_n = isqrt(&n);
        let powers = PowerCache::new(10, 3);
        let node = branch(3, 3, 5, vec![3, 0], vec![5, 0]);
        let c = ctx(&n, &sqrt_n, 2, &powers, true);
        assert_eq!(evaluate(&c, &node), Verdict::ExactMatch);
    }

    #[test]
    fn test_terminal_trivial_factor_rejected() {
        let n = BigUint::from(15u32);
        let sqrt_n = isqrt(&n);
        let powers = PowerCache::new(10, 3);
        // 1 × 15 reproduces N but is a trivial split.
        let node = branch(3, 1, 15, vec![1, 0], vec![5, 1]);
        let c = ctx(&n, &sqrt_n, 2, &powers, false);
        assert_eq!(
            evaluate(&c, &node),
            Verdict::Pruned(PruneReason::FinalMismatch)
        );
    }

    #[test]
    fn test_terminal_wrong_product_rejected() {
        let n = BigUint::from(15u32);
        let sqrt_n = isqrt(&n);
        let powers = PowerCache::new(10, 3);
        let node = branch(3, 3, 7, vec![3, 0], vec![7, 0]);
        let c = ctx(&n, &sqrt_n, 2, &powers, false);
        assert_eq!(
            evaluate(&c, &node),
            Verdict::Pruned(PruneReason::FinalMismatch)
        );
    }

    #[test]
    fn test_overshoot() {
        let n = BigUint::from(15u32);
        let sqrt_n = isqrt(&n);
        let powers = PowerCache::new(10, 3);
        let node = branch(2, 5, 5, vec![5], vec![5]);
        let c = ctx(&n, &sqrt_n, 2, &powers, true);
        assert_eq!(
            evaluate(&c, &node),
            Verdict::Pruned(PruneReason::Overshoot)
        );
    }

    #[test]
    fn test_check_order_reports_first_failure() {
        // p > q and p·q > N: the symmetry verdict wins because it runs first.
        let n = BigUint::from(15u32);
        let sqrt_n = isqrt(&n);
        let powers = PowerCache::new(10, 3);
        let node = branch(2, 9, 5, vec![9], vec![5]);
        let c = ctx(&n, &sqrt_n, 2, &powers, true);
        assert_eq!(
            evaluate(&c, &node),
            Verdict::Pruned(PruneReason::Symmetry)
        );
    }

    #[test]
    fn test_growth_envelope() {
        // Two digit positions cannot span a six-digit target: even maximal
        // tails on both factors fall short.
        let n = BigUint::from(999_983u32 * 2u32);
        let sqrt_n = isqrt(&n);
        let powers = PowerCache::new(10, 4);
        let node = branch(2, 1, 1, vec![1], vec![1]);
        let c = ctx(&n, &sqrt_n, 2, &powers, false);
        assert_eq!(
            evaluate(&c, &node),
            Verdict::Pruned(PruneReason::GrowthEnvelope)
        );
    }

    #[test]
    fn test_min_contribution() {
        // 437 with partials 21 × 20 = 420: gap 17, but the cheapest nonzero
        // completion adds 10 · 20 = 200.
        let n = BigUint::from(437u32);
        let sqrt_n = isqrt(&n);
        let powers = PowerCache::new(10, 4);
        let node = branch(2, 21, 20, vec![1], vec![0]);
        // Fake a one-digit state with two-digit values to isolate the check:
        // use fixed = 1 (k = 2) so place = 10.
        let c = ctx(&n, &sqrt_n, 3, &powers, false);
        assert_eq!(
            evaluate(&c, &node),
            Verdict::Pruned(PruneReason::MinContribution)
        );
    }

    #[test]
    fn test_min_contribution_zero_gap_is_feasible() {
        // Partial product already equals N; zero tails can complete.
        let n = BigUint::from(15u32);
        let sqrt_n = isqrt(&n);
        let powers = PowerCache::new(10, 3);
        let node = branch(2, 3, 5, vec![3], vec![5]);
        let c = ctx(&n, &sqrt_n, 2, &powers, true);
        assert_eq!(evaluate(&c, &node), Verdict::Feasible);
    }

    #[test]
    fn test_coupling_shortfall_caught_by_growth_envelope() {
        // A state whose stretched factors cannot cover N trips the growth
        // envelope before the tail-coupling comparison is consulted: with a
        // shared tail bound, q_max falling below ⌈N / p_max⌉ always implies
        // p_max · q_max < N.
        let n = BigUint::from(100u32);
        let sqrt_n = isqrt(&n);
        let powers = PowerCache::new(10, 2);
        let node = branch(1, 0, 0, vec![], vec![]);
        let c = ctx(&n, &sqrt_n, 1, &powers, false);
        assert_eq!(
            evaluate(&c, &node),
            Verdict::Pruned(PruneReason::GrowthEnvelope)
        );
    }

    #[test]
    fn test_feasible_midway() {
        let n = BigUint::from(437u32);
        let sqrt_n = isqrt(&n);
        let powers = PowerCache::new(10, 4);
        let node = branch(2, 3, 9, vec![3], vec![9]);
        let c = ctx(&n, &sqrt_n, 3, &powers, false);
        assert_eq!(evaluate(&c, &node), Verdict::Feasible);
    }

    #[test]
    fn test_prune_counts_accounting() {
        let mut counts = PruneCounts::default();
        for reason in PruneReason::ALL {
            counts.record(reason);
        }
        counts.record(PruneReason::Overshoot);
        assert_eq!(counts.total(), 9);
        assert_eq!(counts.overshoot, 2);

        let mut merged = PruneCounts::default();
        merged.merge(&counts);
        merged.merge(&counts);
        assert_eq!(merged.total(), 18);
        assert_eq!(merged.symmetry, 2);
    }
}
