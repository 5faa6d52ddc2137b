//! Digit-by-digit semiprime factor search.
//!
//! Factoring N = P × Q is modeled as a bounded Diophantine recurrence over
//! positional digit products: at each position k the digit pair (p_k, q_k)
//! must make the convolution of the factor digits, plus the incoming carry,
//! reproduce the k-th digit of N and hand a whole carry to the next
//! position. The engine explores every digit pair per position, filters the
//! survivors through a cascade of sound feasibility bounds, and advances a
//! frontier of live branches until one completes with terminal carry zero
//! (the factorization) or none survive (the target is out of reach, e.g.
//! prime).
//!
//! Everything derived from N, P, or Q stays arbitrary-precision from
//! creation to comparison; verdicts depend only on the branch and the
//! target, never on evaluation order, so frontiers can be mapped in
//! parallel without changing any outcome.

pub mod branch;
pub mod cascade;
pub mod frontier;
pub mod multi_base;
pub mod recurrence;

pub use branch::{Branch, PathStep};
pub use cascade::{CascadeContext, PruneCounts, PruneReason, Verdict};
pub use frontier::{
    DigitSearch, SearchConfig, SearchError, SearchState, SearchStats, PRIMARY_BASE,
};
pub use multi_base::{explore_bases, BaseOutcome, EXPLORATION_BASES};
